use clap::Parser;
use tracing_subscriber::EnvFilter;
use tradesignal::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "tradesignal=info".into()),
        )
        .init();

    run(Cli::parse())
}
