use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.recast.toml):
  Looked up from the first path upwards.

  [recast]
  rules = [\"RC-S001\", \"RC-N001\"]   # Run only these rules
  ignore = [\"RC-P001\"]              # Never run these rules
  min_duplicates = 2                # Occurrences before a literal is extracted
  format_calls = [\"format\", \"info\"] # Calls whose first argument stays a literal
  recovery_method = \"printStackTrace\"
  exclude_folders = [\"target\", \"build\"]
";

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct OutputOptions {
    /// Output diagnostics as JSON.
    #[arg(long)]
    pub json: bool,

    /// Print rewritten units as source text instead of saving them.
    #[arg(long, conflicts_with = "json")]
    pub print: bool,

    /// Enable debug logging (also enabled by `RUST_LOG`).
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: show only the summary line.
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,
}

/// Options selecting which rules run.
#[derive(Args, Debug, Default, Clone)]
pub struct RuleOptions {
    /// Run only these rules (ids or names, comma separated).
    #[arg(long, value_delimiter = ',')]
    pub rules: Vec<String>,

    /// Skip these rules (ids or names, comma separated).
    #[arg(long, value_delimiter = ',')]
    pub ignore: Vec<String>,
}

/// Command-line interface for recast.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "recast - Scope-aware rewrite rules over serialized syntax trees",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    #[command(subcommand)]
    /// Optional subcommand.
    pub command: Option<Commands>,

    /// Unit files or directories to process.
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Report changes without writing any file.
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Folders to exclude, in addition to the configured ones.
    #[arg(long, short = 'e', alias = "exclude-folder")]
    pub exclude_folders: Vec<String>,

    /// Rule selection.
    #[command(flatten)]
    pub rule_options: RuleOptions,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,
}

#[derive(Subcommand, Debug)]
/// Available subcommands.
pub enum Commands {
    /// List the available rules.
    Rules {
        /// Output raw JSON.
        #[arg(long)]
        json: bool,
    },
}
