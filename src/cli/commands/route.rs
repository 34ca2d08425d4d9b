//! Route command - show which binding a request dispatches to

use crate::cli::output::{self, colors};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::types::RequestVerb;
use crate::rest::request::IncomingRequest;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the route command
#[derive(Args, Debug)]
pub struct RouteArgs {
    /// HTTP verb (GET, POST, PUT, DELETE)
    pub verb: RequestVerb,

    /// Request target relative to the server base, e.g. Patient/42/_tags
    pub path: String,

    /// Bindings file (TOML, [[binding]] tables)
    #[arg(long, short = 'b')]
    pub bindings: PathBuf,

    /// Register the bindings under a resource-scoped provider
    #[arg(long)]
    pub resource_provider: Option<String>,
}

/// Parsed request parts
#[derive(Debug, Serialize)]
pub struct RequestParts {
    pub verb: RequestVerb,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// Selected binding
#[derive(Debug, Serialize)]
pub struct RouteMatch {
    pub name: String,
    pub kind: String,
    pub route: String,
    pub parameters: Vec<String>,
}

/// Route command response
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub request: RequestParts,
    pub bindings: usize,
    pub matched: Option<RouteMatch>,
}

/// Resolve a request against the bindings file
pub fn resolve(args: &RouteArgs) -> Result<RouteResponse, Box<dyn std::error::Error>> {
    let scope = super::scope_for(args.resource_provider.as_deref());
    let (_, table) = super::load_table(&args.bindings, &scope)?;
    let request = IncomingRequest::parse(args.verb, &args.path)?;

    let matched = table.find(&request).map(|binding| RouteMatch {
        name: binding.name().to_string(),
        kind: binding.kind().to_string(),
        route: binding.match_shape().to_string(),
        parameters: binding
            .parameters()
            .iter()
            .map(|p| format!("[{}] {}", p.index, p.binding.describe()))
            .collect(),
    });

    Ok(RouteResponse {
        request: RequestParts {
            verb: request.verb(),
            resource: request.resource_name().map(str::to_string),
            id: request.id().map(|id| id.id_part().to_string()),
            version: request.version_id().map(str::to_string),
            operation: request.operation().map(str::to_string),
        },
        bindings: table.len(),
        matched,
    })
}

/// Execute the route command
pub fn execute(
    args: RouteArgs,
    _config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = resolve(&args)?;

    match format {
        OutputFormat::Human => {
            output::print_header(&output::format_request_line(args.verb, &args.path));
            let parts = &response.request;
            output::print_field("resource", parts.resource.as_deref().unwrap_or("-"));
            output::print_field("id", parts.id.as_deref().unwrap_or("-"));
            output::print_field("version", parts.version.as_deref().unwrap_or("-"));
            output::print_field("operation", parts.operation.as_deref().unwrap_or("-"));
            println!();

            match &response.matched {
                Some(m) => {
                    output::print_success(&format!("Matched {}", colors::binding(&m.name)));
                    output::print_field("kind", &m.kind);
                    output::print_field("route", &m.route);
                    for param in &m.parameters {
                        println!("    {}", colors::dim(param));
                    }
                }
                None => output::print_warning(&format!(
                    "No binding matches (checked {})",
                    colors::number(&response.bindings.to_string())
                )),
            }
        }
        OutputFormat::Json => output::print_output(&response, format),
    }

    Ok(())
}
