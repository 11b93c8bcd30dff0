use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "repoaudit")]
#[command(about = "Static dependency and best-practice audit of a source repository")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to analyze when no subcommand is given
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Enable debug logging (overrides REPOAUDIT_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the dependency graph, evaluate rules and print a report
    Analyze(AnalyzeArgs),

    /// Generate a starter .repoaudit.toml configuration file
    Init(InitArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Repository root (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "markdown")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Technology stack description used for rule selection
    /// (e.g. "Python, FastAPI"); inferred from key files when omitted
    #[arg(long)]
    pub stack: Option<String>,

    /// Languages whose imports feed the graph (comma-separated: python,js,java,rust)
    #[arg(long, value_delimiter = ',')]
    pub lang: Option<Vec<String>>,

    /// Additional directory names to skip
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Maximum number of source files to scan
    #[arg(long)]
    pub max_files: Option<usize>,

    /// In-degree at which a module is reported as highly coupled
    #[arg(long)]
    pub coupling_threshold: Option<usize>,

    /// Hide passing findings in the markdown report
    #[arg(long)]
    pub failures_only: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            format: OutputFormat::default(),
            output: None,
            stack: None,
            lang: None,
            exclude: Vec::new(),
            max_files: None,
            coupling_threshold: None,
            failures_only: false,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Directory to write the config file into
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}
