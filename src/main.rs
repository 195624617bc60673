use clap::Parser;
use tracing_subscriber::EnvFilter;
use treetable::cli::commands::Cli;
use treetable::cli::handlers;

fn main() {
    // Logs go to stderr; stdout carries rows and payloads
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
