use anyhow::Context;
use log::LevelFilter;
use std::fs::File;
use std::path::Path;

use crate::cli::parser::Cli;

pub fn level_for(cli: &Cli) -> LevelFilter {
    if cli.debug {
        LevelFilter::Trace
    } else if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    }
}

pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file: {:?}", path))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_level_precedence() {
        let cli = Cli::try_parse_from(["scrub", "-l"]).unwrap();
        assert_eq!(level_for(&cli), LevelFilter::Info);
        let cli = Cli::try_parse_from(["scrub", "-l", "-q"]).unwrap();
        assert_eq!(level_for(&cli), LevelFilter::Warn);
        let cli = Cli::try_parse_from(["scrub", "-l", "-q", "-v"]).unwrap();
        assert_eq!(level_for(&cli), LevelFilter::Debug);
        let cli = Cli::try_parse_from(["scrub", "-l", "--debug"]).unwrap();
        assert_eq!(level_for(&cli), LevelFilter::Trace);
    }
}
