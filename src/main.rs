use clap::Parser;
use repoaudit::cli::{AnalyzeArgs, Cli, Command};
use repoaudit::{cmd_analyze, cmd_init};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("REPOAUDIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match cli.command {
        Some(Command::Analyze(args)) => cmd_analyze(args),
        Some(Command::Init(args)) => cmd_init(args),
        None => cmd_analyze(AnalyzeArgs {
            path: cli.path,
            ..Default::default()
        }),
    };

    std::process::exit(exit_code);
}
