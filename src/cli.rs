use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "license-expr",
    about = "Parse, normalize, expand and check license expressions",
    version
)]
pub struct Cli {
    /// Config file [default: ./.license-expr/config.toml, fallback ~/.config/license-expr/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Report format for `check` and `scan`
    #[arg(long, default_value = "terminal", value_name = "FORMAT", global = true)]
    pub report: ReportFormat,

    /// Show allowed licenses too and log resolution steps
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the summary line
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the canonical form of an expression
    Parse {
        expression: String,
    },

    /// Rewrite version ranges into the concrete versions they cover
    Expand {
        expression: String,
    },

    /// Resolve a free-text license title to a standard identifier
    Normalize {
        title: String,

        /// URI associated with the license (repeatable)
        #[arg(long = "uri", value_name = "URI")]
        uris: Vec<String>,
    },

    /// Rank the licenses a text most resembles
    Classify {
        /// Text to classify; read from --file when omitted
        text: Option<String>,

        /// File whose content is classified
        #[arg(long, value_name = "FILE", conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Number of candidates to show
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Evaluate expressions against the policy
    Check {
        #[arg(required = true)]
        expressions: Vec<String>,
    },

    /// Read licenses from pom.xml or MANIFEST.MF files and evaluate them
    Scan {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_with_global_flags() {
        let cli = Cli::try_parse_from([
            "license-expr",
            "check",
            "MIT OR Apache-2.0",
            "GPL-2.0+",
            "--report",
            "json",
            "-q",
        ])
        .unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.report, ReportFormat::Json));
        match cli.command {
            Command::Check { expressions } => {
                assert_eq!(expressions, vec!["MIT OR Apache-2.0", "GPL-2.0+"])
            }
            other => panic!("expected check, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_collects_uris() {
        let cli = Cli::try_parse_from([
            "license-expr",
            "normalize",
            "Apache Software License 1.1",
            "--uri",
            "https://apache.org/licenses/LICENSE-1.1",
        ])
        .unwrap();
        match cli.command {
            Command::Normalize { title, uris } => {
                assert_eq!(title, "Apache Software License 1.1");
                assert_eq!(uris.len(), 1);
            }
            other => panic!("expected normalize, got {other:?}"),
        }
    }

    #[test]
    fn test_check_requires_an_expression() {
        assert!(Cli::try_parse_from(["license-expr", "check"]).is_err());
    }
}
