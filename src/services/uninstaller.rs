use std::io;
use std::process::Command;

pub const SILENT_MARKERS: [&str; 4] = ["/S", "/SILENT", "/VERYSILENT", "/quiet"];
pub const SILENT_FLAG: &str = "/S";

/// An `UninstallString` split into the program and its argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallCommand {
    pub program: String,
    pub args: String,
}

impl UninstallCommand {
    /// A leading quote delimits the program path. Unquoted commands take
    /// everything up to the first `.exe`, or the first token when there is
    /// none.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let (program, args) = if let Some(quoted) = raw.strip_prefix('"') {
            match quoted.split_once('"') {
                Some((program, rest)) => (program, rest),
                None => (quoted, ""),
            }
        } else if let Some(end) = raw.to_ascii_lowercase().find(".exe") {
            raw.split_at(end + ".exe".len())
        } else {
            match raw.split_once(char::is_whitespace) {
                Some((program, rest)) => (program, rest),
                None => (raw, ""),
            }
        };

        let program = program.trim();
        if program.is_empty() {
            return None;
        }
        Some(Self {
            program: program.to_string(),
            args: args.trim().to_string(),
        })
    }

    pub fn has_silent_marker(&self) -> bool {
        SILENT_MARKERS.iter().any(|marker| self.args.contains(marker))
    }

    pub fn with_silent_flag(mut self) -> Self {
        if !self.has_silent_marker() {
            if self.args.is_empty() {
                self.args = SILENT_FLAG.to_string();
            } else {
                self.args = format!("{} {}", self.args, SILENT_FLAG);
            }
        }
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessOutcome {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an uninstaller to completion on the calling thread.
pub trait CommandRunner {
    fn run(&self, command: &UninstallCommand) -> io::Result<ProcessOutcome>;
}

#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn build_command(command: &UninstallCommand) -> Command {
        let mut cmd = Command::new(&command.program);
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            if !command.args.is_empty() {
                cmd.raw_arg(&command.args);
            }
        }
        #[cfg(not(windows))]
        cmd.args(command.args.split_whitespace());
        cmd
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &UninstallCommand) -> io::Result<ProcessOutcome> {
        let output = Self::build_command(command).output()?;
        Ok(ProcessOutcome {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
