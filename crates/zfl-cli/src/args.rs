//! Command-line argument definitions for the ZFL CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, which pipeline
//! stage is written, configuration file selection, and logging verbosity.

use clap::{Parser, ValueEnum};

/// Command-line arguments for the ZFL event-flow tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input ZFL file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output JSON file, standard output when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Pipeline stage to write
    #[arg(long, value_enum, default_value_t = Emit::View)]
    pub emit: Emit,

    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Stage output selected with `--emit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Emit {
    /// Raw tree with locations and parse diagnostics
    Raw,
    /// Resolved semantic model
    Semantic,
    /// Flow graph of nodes and edges
    Ir,
    /// Laid-out view model
    View,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["zfl", "flow.zfl"]);
        assert_eq!(args.input, "flow.zfl");
        assert_eq!(args.emit, Emit::View);
        assert!(args.output.is_none());
        assert!(!args.pretty);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_emit_and_output() {
        let args = Args::parse_from([
            "zfl", "flow.zfl", "--emit", "semantic", "-o", "out.json", "--pretty",
        ]);
        assert_eq!(args.emit, Emit::Semantic);
        assert_eq!(args.output.as_deref(), Some("out.json"));
        assert!(args.pretty);
    }

    #[test]
    fn test_rejects_unknown_stage() {
        assert!(Args::try_parse_from(["zfl", "flow.zfl", "--emit", "svg"]).is_err());
    }
}
