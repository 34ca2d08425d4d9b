//! Client-url command - build the outgoing request for a binding

use crate::cli::output::{self, colors};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::encoding::EncodingFormat;
use crate::core::error::BindError;
use crate::core::types::IdDt;
use crate::rest::context::ClientContext;
use crate::rest::declaration::{BindingDeclaration, ParamDeclaration};
use crate::rest::descriptor::OperationKind;
use crate::rest::param::{Argument, QueryValueType};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Arguments for the client-url command
#[derive(Args, Debug)]
pub struct ClientUrlArgs {
    /// Binding name
    pub name: String,

    /// Bindings file (TOML, [[binding]] tables)
    #[arg(long, short = 'b')]
    pub bindings: PathBuf,

    /// Register the bindings under a resource-scoped provider
    #[arg(long)]
    pub resource_provider: Option<String>,

    /// Resource id
    #[arg(long)]
    pub id: Option<String>,

    /// Resource version
    #[arg(long)]
    pub version: Option<String>,

    /// Query parameter value (repeatable)
    #[arg(long = "param", short = 'p', value_parser = super::parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Header value (repeatable)
    #[arg(long = "header", short = 'H', value_parser = super::parse_key_value)]
    pub headers: Vec<(String, String)>,

    /// File holding the request body (.xml for XML, JSON otherwise)
    #[arg(long)]
    pub body: Option<PathBuf>,

    /// Base URL, overrides client.base_url
    #[arg(long)]
    pub base_url: Option<String>,
}

/// Client-url command response
#[derive(Debug, Serialize)]
pub struct ClientUrlResponse {
    pub binding: String,
    pub verb: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

fn invalid(message: String) -> Box<dyn std::error::Error> {
    Box::new(BindError::InvalidArgument(message))
}

fn query_argument(
    args: &ClientUrlArgs,
    name: &str,
    value_type: QueryValueType,
) -> Result<Argument, Box<dyn std::error::Error>> {
    let values: Vec<&str> = args
        .params
        .iter()
        .filter(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .collect();
    let Some(first) = values.first() else {
        return Ok(Argument::Absent);
    };

    Ok(match value_type {
        QueryValueType::String => Argument::String(first.to_string()),
        QueryValueType::Strings => {
            Argument::Strings(values.iter().map(|v| v.to_string()).collect())
        }
        QueryValueType::Integer => Argument::Integer(
            first
                .parse()
                .map_err(|e| invalid(format!("--param {name}: {e}")))?,
        ),
        QueryValueType::Date => Argument::Date(
            DateTime::parse_from_rfc3339(first)
                .map_err(|e| invalid(format!("--param {name}: {e}")))?
                .with_timezone(&Utc),
        ),
    })
}

fn body_argument(kind: OperationKind, path: &Path) -> Result<Argument, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let encoding = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("xml") => EncodingFormat::Xml,
        _ => EncodingFormat::Json,
    };
    let parser = encoding.new_parser(false);

    Ok(match kind {
        OperationKind::AddTags | OperationKind::DeleteTags => {
            Argument::Tags(parser.parse_tag_list(&content)?)
        }
        _ => Argument::Resource(parser.parse_resource(&content)?),
    })
}

/// Assemble handler arguments from the command line, in declaration order
pub fn build_arguments(
    declaration: &BindingDeclaration,
    args: &ClientUrlArgs,
) -> Result<Vec<Argument>, Box<dyn std::error::Error>> {
    let mut values = Vec::with_capacity(declaration.params.len());

    for param in &declaration.params {
        let value = match param {
            ParamDeclaration::Id => match &args.id {
                Some(id) => Argument::Id(IdDt::new(id.clone())),
                None => return Err(invalid(format!("binding '{}' needs --id", declaration.name))),
            },
            ParamDeclaration::Version => match &args.version {
                Some(version) => Argument::String(version.clone()),
                None => {
                    return Err(invalid(format!(
                        "binding '{}' needs --version",
                        declaration.name
                    )))
                }
            },
            ParamDeclaration::Query {
                name, value_type, ..
            } => query_argument(args, name, *value_type)?,
            ParamDeclaration::Since => {
                query_argument(args, crate::core::constants::PARAM_SINCE, QueryValueType::Date)?
            }
            ParamDeclaration::Count => {
                query_argument(args, crate::core::constants::PARAM_COUNT, QueryValueType::Integer)?
            }
            ParamDeclaration::Header { name } => args
                .headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| Argument::String(v.clone()))
                .unwrap_or(Argument::Absent),
            ParamDeclaration::Body => match &args.body {
                Some(path) => body_argument(declaration.kind, path)?,
                None => return Err(invalid(format!("binding '{}' needs --body", declaration.name))),
            },
        };
        values.push(value);
    }

    Ok(values)
}

/// Build the outgoing request described by the arguments
pub fn build(
    args: &ClientUrlArgs,
    config: &Config,
) -> Result<ClientUrlResponse, Box<dyn std::error::Error>> {
    let scope = super::scope_for(args.resource_provider.as_deref());
    let (file, table) = super::load_table(&args.bindings, &scope)?;

    let declaration = file
        .get(&args.name)
        .ok_or_else(|| invalid(format!("no binding named '{}'", args.name)))?;
    let binding = table
        .get(&args.name)
        .ok_or_else(|| invalid(format!("no binding named '{}'", args.name)))?;

    let values = build_arguments(declaration, args)?;
    let invocation = binding.invoke_client(&values, &ClientContext::from(&config.client))?;
    let base_url = args.base_url.as_deref().unwrap_or(&config.client.base_url);

    Ok(ClientUrlResponse {
        binding: binding.name().to_string(),
        verb: invocation.verb().to_string(),
        url: invocation.url(base_url)?.to_string(),
        headers: invocation.headers().to_vec(),
        body: invocation.body().map(|b| b.content.clone()),
    })
}

/// Execute the client-url command
pub fn execute(
    args: ClientUrlArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = build(&args, config)?;

    match format {
        OutputFormat::Human => {
            println!(
                "{} {}",
                colors::verb(&response.verb),
                colors::path(&response.url)
            );
            for (name, value) in &response.headers {
                println!("{}: {}", colors::label(name), value);
            }
            if let Some(body) = &response.body {
                println!();
                println!("{body}");
            }
        }
        OutputFormat::Json => output::print_output(&response, format),
    }

    Ok(())
}
