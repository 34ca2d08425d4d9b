//! fhirbind CLI - inspect REST method bindings
//!
//! Loads a bindings file and shows how requests are dispatched and how
//! client calls are built.
//!
//! # Examples
//!
//! ```bash
//! # Which binding serves this request?
//! fhirbind route GET Patient/42/_tags --bindings demos/bindings.toml
//!
//! # What does a client call look like?
//! fhirbind client-url patient-search --bindings demos/bindings.toml -p family=Smith
//!
//! # Show configuration
//! fhirbind show-config
//! ```

use clap::Parser;
use fhirbind::cli::{output, run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "fhirbind=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output; logs go to stderr
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(e) = run(cli) {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
