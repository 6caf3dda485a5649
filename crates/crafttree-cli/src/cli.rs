use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Analyse crafting recipes: total base-material requirements and
/// resource-exploit detection.
#[derive(Parser, Debug)]
#[command(
    name = "crafttree",
    version,
    long_about = "Reads one command per line from stdin (or --script) against an in-memory \
                  recipe registry.\n\n\
                  Commands:\n  \
                  base <name>\n  \
                  craft <name> = <ingredient:qty, ...>\n  \
                  graph <target>\n  \
                  dot <target>\n  \
                  totals <target>\n  \
                  exploit <target>\n  \
                  list\n  \
                  help"
)]
pub struct CliArgs {
    #[arg(long, value_name = "FILE", help = "Preload a recipe set (.ron, .toml or .json)")]
    pub recipes: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Read commands from a file instead of stdin")]
    pub script: Option<PathBuf>,

    #[arg(long, value_name = "N", help = "Maximum recipe nesting depth")]
    pub max_depth: Option<usize>,

    #[arg(long, value_name = "N", help = "Maximum distinct items one analysis may reach")]
    pub max_items: Option<usize>,

    #[arg(short = 'f', long, value_enum, default_value = "text", help = "Output format")]
    pub format: OutputFormat,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, help = "Verbose logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::parse_from(["crafttree"]);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.recipes.is_none());
        assert!(args.max_depth.is_none());
        assert!(args.max_items.is_none());
    }

    #[test]
    fn flags_parse() {
        let args = CliArgs::parse_from([
            "crafttree",
            "--recipes",
            "set.toml",
            "--max-depth",
            "12",
            "--max-items",
            "500",
            "-f",
            "json",
            "-v",
        ]);
        assert_eq!(args.recipes, Some(PathBuf::from("set.toml")));
        assert_eq!(args.max_depth, Some(12));
        assert_eq!(args.max_items, Some(500));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.verbose);
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["crafttree", "-v", "-q"]).is_err());
    }
}
