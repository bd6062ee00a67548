use clap::Parser;
use regimelab::cli::{Cli, run};
use tracing_subscriber::EnvFilter;

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("regimelab=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    run(Cli::parse())
}
