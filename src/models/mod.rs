pub mod config;
pub mod key_path;
pub mod registration;
pub mod report;
