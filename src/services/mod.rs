pub mod backup;
pub mod deep_scan;
pub mod executor;
pub mod interrupt;
pub mod locator;
pub mod registry;
pub mod store;
pub mod uninstaller;
