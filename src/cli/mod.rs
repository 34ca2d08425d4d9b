//! CLI adapter for fhirbind
//!
//! Loads declarative bindings and shows what the binding layer does with
//! them: which binding a request routes to, and which request a client
//! call produces. Parallel to `rest/` consumers; depends on `core/` and
//! `rest/` only.
//!
//! # Architecture
//!
//! ```text
//!              +------------------+
//!              |     core/        |
//!              |  (domain logic)  |
//!              +--------+---------+
//!                       |
//!              +--------v---------+
//!              |      rest/       |
//!              | (binding layer)  |
//!              +--------+---------+
//!                       |
//!              +--------v---------+
//!              |      cli/        |
//!              | (clap adapter)   |
//!              +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// fhirbind - REST method binding inspector
///
/// Route requests against a bindings file, or build the client request a
/// binding produces for a set of arguments.
#[derive(Parser, Debug)]
#[command(name = "fhirbind")]
#[command(author = "RHOBIMD HEALTH")]
#[command(version)]
#[command(about = "REST method binding and dispatch inspector", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show which binding a request is dispatched to
    Route(commands::RouteArgs),

    /// Build the outgoing request for a binding
    #[command(name = "client-url", disable_version_flag = true)]
    ClientUrl(commands::ClientUrlArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  fhirbind completions bash > ~/.local/share/bash-completion/completions/fhirbind
    ///   zsh:   fhirbind completions zsh > ~/.zfunc/_fhirbind
    ///   fish:  fhirbind completions fish > ~/.config/fish/completions/fhirbind.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;

    // Completions need no configuration
    let command = match cli.command {
        Commands::Completions(args) => return commands::completions::execute(args),
        other => other,
    };

    let config = Config::load()?;
    config.log_config();

    match command {
        Commands::Route(args) => commands::route::execute(args, &config, cli.format),
        Commands::ClientUrl(args) => commands::client_url::execute(args, &config, cli.format),
        Commands::ShowConfig(args) => commands::config::execute(args, &config, cli.format),
        Commands::Completions(_) => Ok(()),
    }
}
