//! CLI configuration.
//!
//! ```text
//! Cli
//! ├── config: Vec<PathBuf>               # Action-type documents
//! ├── low_priority_config: Vec<PathBuf>  # Overridable action-type documents
//! ├── input: Vec<PathBuf>                # Workflow documents
//! ├── output: PathBuf                    # Output root directory
//! └── graphviz: Option<String>           # Graphviz output format
//! ```
//!
//! # Example
//!
//! ```bash
//! weft -c actions.yaml -i nightly.yaml -o build -g png
//!
//! # Or via environment variables
//! WEFT_OUTPUT=build weft -c actions.yaml -i nightly.yaml
//! ```

use std::path::PathBuf;

use clap::Parser;
use weft_oozie::dot::DEFAULT_FORMAT;

use crate::TRACING_TARGET_CONFIG;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "weft")]
#[command(about = "Compiles workflow documents into Oozie workflow XML")]
#[command(version)]
pub struct Cli {
    /// Action-type configuration documents.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Vec<PathBuf>,

    /// Configuration documents overridden by the regular ones.
    #[arg(short = 'l', long = "low-priority-config", value_name = "FILE")]
    pub low_priority_config: Vec<PathBuf>,

    /// Workflow documents to compile.
    #[arg(short = 'i', long = "input", value_name = "FILE", required = true)]
    pub input: Vec<PathBuf>,

    /// Directory receiving one subdirectory per workflow.
    #[arg(short = 'o', long = "output", value_name = "DIR", env = "WEFT_OUTPUT")]
    pub output: PathBuf,

    /// Writes Graphviz files and renders them in the given format.
    #[arg(
        short = 'g',
        long = "graphviz",
        value_name = "FORMAT",
        num_args = 0..=1,
        default_missing_value = DEFAULT_FORMAT
    )]
    pub graphviz: Option<String>,
}

impl Cli {
    /// Returns every configuration source with its low-precedence flag.
    ///
    /// Regular sources come first so their kill settings win over
    /// low-priority ones.
    pub fn config_sources(&self) -> impl Iterator<Item = (&PathBuf, bool)> {
        self.config
            .iter()
            .map(|path| (path, false))
            .chain(self.low_priority_config.iter().map(|path| (path, true)))
    }

    /// Logs the parsed configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            config = ?self.config,
            low_priority_config = ?self.low_priority_config,
            inputs = self.input.len(),
            output = %self.output.display(),
            graphviz = ?self.graphviz,
            "cli configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("weft").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_repeated_options() {
        let cli = parse(&[
            "-c", "a.yaml", "--config", "b.yaml", "-l", "low.yaml", "-i", "wf1.yaml", "-i",
            "wf2.yaml", "-o", "out",
        ]);

        assert_eq!(cli.config, [PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]);
        assert_eq!(cli.low_priority_config, [PathBuf::from("low.yaml")]);
        assert_eq!(cli.input.len(), 2);
        assert_eq!(cli.output, PathBuf::from("out"));
        assert_eq!(cli.graphviz, None);
    }

    #[test]
    fn test_graphviz_format() {
        let cli = parse(&["-i", "wf.yaml", "-o", "out", "-g"]);
        assert_eq!(cli.graphviz.as_deref(), Some("svg"));

        let cli = parse(&["-i", "wf.yaml", "-o", "out", "--graphviz", "png"]);
        assert_eq!(cli.graphviz.as_deref(), Some("png"));
    }

    #[test]
    fn test_input_is_required() {
        assert!(Cli::try_parse_from(["weft", "-o", "out"]).is_err());
    }

    #[test]
    fn test_config_sources_order() {
        let cli = parse(&["-l", "low.yaml", "-c", "high.yaml", "-i", "wf.yaml", "-o", "out"]);

        let sources: Vec<_> = cli
            .config_sources()
            .map(|(path, low)| (path.to_str().unwrap(), low))
            .collect();
        assert_eq!(sources, [("high.yaml", false), ("low.yaml", true)]);
    }
}
