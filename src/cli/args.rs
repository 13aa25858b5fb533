//! Command-line interface definitions.

use clap::builder::PossibleValuesParser;
use clap::{ColorChoice, Parser};
use std::path::PathBuf;

use crate::task::TASK_NAMES;

/// Front-end asset pipeline with a live-reloading preview server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Task to run: build:assets, build:css, build:js, build:html, build,
    /// serve, or default (build, serve and rebuild on change)
    #[arg(default_value = "default", value_parser = PossibleValuesParser::new(TASK_NAMES))]
    pub task: String,

    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, default_value = "kiln.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Do not open a browser when serving
    #[arg(long)]
    pub no_open: bool,

    /// Preview server port
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_task() {
        let cli = Cli::try_parse_from(["kiln"]).unwrap();
        assert_eq!(cli.task, "default");
        assert_eq!(cli.config, PathBuf::from("kiln.toml"));
        assert!(!cli.verbose);
        assert_eq!(cli.port, None);
    }

    #[test]
    fn test_task_and_options() {
        let cli =
            Cli::try_parse_from(["kiln", "build:css", "-C", "site/kiln.toml", "-V", "--no-open", "-p", "3000"])
                .unwrap();
        assert_eq!(cli.task, "build:css");
        assert_eq!(cli.config, PathBuf::from("site/kiln.toml"));
        assert!(cli.verbose);
        assert!(cli.no_open);
        assert_eq!(cli.port, Some(3000));
    }

    #[test]
    fn test_unknown_task_rejected() {
        assert!(Cli::try_parse_from(["kiln", "deploy"]).is_err());
    }
}
