use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scrub")]
#[command(about = "Remove an application's registration, data and leftovers", long_about = None)]
#[command(version = env!("BUILD_VERSION"))]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Name (or part of the name) of the application to remove
    #[arg(conflicts_with = "app_name_flag")]
    pub app_name: Option<String>,

    /// Same as the positional application name
    #[arg(long = "app-name", value_name = "NAME")]
    pub app_name_flag: Option<String>,

    /// Also remove matching files and scan the wider registry
    #[arg(short, long)]
    pub thorough: bool,

    /// Report what would be removed without changing anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// Do not back up registry keys and files before deleting them
    #[arg(short, long)]
    pub no_backup: bool,

    /// Only list installed applications
    #[arg(short, long)]
    pub list_only: bool,

    /// Do not ask for confirmation before a real run
    #[arg(short, long)]
    pub yes: bool,

    /// Print the result record as JSON
    #[arg(long)]
    pub json: bool,

    /// Directory that receives per-run backup folders
    #[arg(long, value_name = "DIR")]
    pub backup_root: Option<PathBuf>,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Write the log to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    pub fn target_name(&self) -> Option<&str> {
        self.app_name
            .as_deref()
            .or(self.app_name_flag.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_and_flag_name() {
        let cli = Cli::try_parse_from(["scrub", "Foo", "-t", "-d"]).unwrap();
        assert_eq!(cli.target_name(), Some("Foo"));
        assert!(cli.thorough && cli.dry_run && !cli.no_backup);

        let cli = Cli::try_parse_from(["scrub", "--app-name", "My App", "--no-backup"]).unwrap();
        assert_eq!(cli.target_name(), Some("My App"));
        assert!(cli.no_backup);
    }

    #[test]
    fn test_name_given_twice_is_rejected() {
        assert!(Cli::try_parse_from(["scrub", "Foo", "--app-name", "Bar"]).is_err());
    }

    #[test]
    fn test_list_only() {
        let cli = Cli::try_parse_from(["scrub", "-l"]).unwrap();
        assert!(cli.list_only);
        assert_eq!(cli.target_name(), None);
    }
}
