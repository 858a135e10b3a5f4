//! Operator interrupt flag, raised from the console control handler.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

pub fn flag() -> &'static AtomicBool {
    &INTERRUPTED
}

pub fn is_raised(flag: &AtomicBool) -> bool {
    flag.load(Ordering::SeqCst)
}

#[cfg(windows)]
unsafe extern "system" fn on_console_event(event: u32) -> i32 {
    use windows_sys::Win32::System::Console::{CTRL_BREAK_EVENT, CTRL_C_EVENT};
    if event == CTRL_C_EVENT || event == CTRL_BREAK_EVENT {
        INTERRUPTED.store(true, Ordering::SeqCst);
        return 1;
    }
    0
}

/// Ctrl+C / Ctrl+Break raise the flag instead of killing the process, so
/// the run can stop between items.
#[cfg(windows)]
pub fn install() -> anyhow::Result<()> {
    use windows_sys::Win32::System::Console::SetConsoleCtrlHandler;
    let ok = unsafe { SetConsoleCtrlHandler(Some(on_console_event), 1) };
    if ok == 0 {
        anyhow::bail!(
            "Failed to install console handler: {}",
            std::io::Error::last_os_error()
        );
    }
    Ok(())
}

#[cfg(not(windows))]
pub fn install() -> anyhow::Result<()> {
    Ok(())
}
