//! CLI argument definitions using clap
//!
//! Commands:
//! - gridtable check-schema --schema <path>
//! - gridtable import --schema <path> --input <path|->
//! - gridtable convert --schema <path> --input <path|-> [--start N] [--max N]
//! - gridtable export-text --input <path|-> [--targets]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gridtable - Convert typed data tables to and from Gridly JSON
#[derive(Parser, Debug)]
#[command(name = "gridtable")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log every conversion problem at trace level
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a schema and describe its row struct
    CheckSchema {
        /// Path to schema definition file
        #[arg(long)]
        schema: PathBuf,
    },

    /// Import a Gridly JSON document and report problems
    Import {
        /// Path to schema definition file
        #[arg(long)]
        schema: PathBuf,

        /// Gridly JSON document, `-` for stdin
        #[arg(long, default_value = "-")]
        input: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Import a Gridly JSON document and export a page of it
    Convert {
        /// Path to schema definition file
        #[arg(long)]
        schema: PathBuf,

        /// Gridly JSON document, `-` for stdin
        #[arg(long, default_value = "-")]
        input: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// First row to export
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Maximum number of rows to export
        #[arg(long)]
        max: Option<usize>,
    },

    /// Export localized text entries as a Gridly JSON document
    ExportText {
        /// JSON array of text entries, `-` for stdin
        #[arg(long, default_value = "-")]
        input: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Include target-culture columns
        #[arg(long)]
        targets: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_args() {
        let cli = Cli::try_parse_from([
            "gridtable", "--verbose", "convert", "--schema", "s.json", "--input", "rows.json",
            "--start", "5", "--max", "3",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Convert { start, max, input, .. } => {
                assert_eq!(start, 5);
                assert_eq!(max, Some(3));
                assert_eq!(input, PathBuf::from("rows.json"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_input_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["gridtable", "import", "--schema", "s.json"]).unwrap();
        match cli.command {
            Command::Import { input, config, .. } => {
                assert_eq!(input, PathBuf::from("-"));
                assert!(config.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["gridtable", "-v", "-q", "check-schema", "--schema", "s"]).is_err());
    }
}
