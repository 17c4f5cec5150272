#![recursion_limit = "256"]

mod cli;
mod application;
mod domain;
mod data;
mod ml;
mod infra;

use anyhow::Result;
use cli::Cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "rra_summarizer=info";

/// RUST_LOG when set and valid, otherwise info for this crate only
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .init();

    let cli = Cli::parse();
    cli.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_overrides_default_filter() {
        std::env::set_var("RUST_LOG", "rra_summarizer=trace");
        let from_env = log_filter().to_string();
        std::env::remove_var("RUST_LOG");
        let fallback = log_filter().to_string();

        assert!(from_env.contains("trace"), "{from_env}");
        assert!(!from_env.contains("info"), "{from_env}");
        assert!(fallback.contains("rra_summarizer") && fallback.contains("info"), "{fallback}");
    }
}
