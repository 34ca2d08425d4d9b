//! Config command - show current configuration

use crate::cli::output;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also show where configuration is looked up
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse<'a> {
    #[serde(flatten)]
    pub config: &'a Config,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_config_file: Option<PathBuf>,
}

/// Execute the config command
pub fn execute(
    args: ConfigArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = ConfigResponse {
        config,
        user_config_file: if args.all {
            Config::user_config_file()
        } else {
            None
        },
    };

    match format {
        OutputFormat::Human => {
            output::print_header("Configuration:");
            println!("  server:");
            println!("    default_encoding: {}", config.server.default_encoding);
            println!("    pretty_print: {}", config.server.pretty_print);
            println!("    powered_by: {}", config.server.powered_by);
            println!(
                "    base_url: {}",
                config.server.base_url.as_deref().unwrap_or("(relative)")
            );
            println!("  client:");
            println!("    encoding: {}", config.client.encoding);
            println!("    pretty_print: {}", config.client.pretty_print);
            println!("    base_url: {}", config.client.base_url);
            if let Some(path) = &response.user_config_file {
                println!("  user_config_file: {}", path.display());
            }
        }
        OutputFormat::Json => output::print_output(&response, format),
    }

    Ok(())
}
