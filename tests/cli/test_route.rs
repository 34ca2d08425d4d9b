//! Tests for the route command
//!
//! Resolves request targets against a bindings file and checks the
//! selected binding, its route and the parsed request parts.

use crate::common::{bindings_file, BINDINGS_TOML};
use fhirbind::cli::commands::route::{resolve, RouteArgs};
use fhirbind::core::types::RequestVerb;
use tempfile::NamedTempFile;

fn args(file: &NamedTempFile, verb: RequestVerb, path: &str) -> RouteArgs {
    RouteArgs {
        verb,
        path: path.to_string(),
        bindings: file.path().to_path_buf(),
        resource_provider: None,
    }
}

#[test]
fn test_route_search_with_query() {
    let file = bindings_file(BINDINGS_TOML);
    let response = resolve(&args(&file, RequestVerb::Get, "Patient?family=Doe")).unwrap();

    let matched = response.matched.unwrap();
    assert_eq!(matched.name, "patient-search");
    assert_eq!(matched.kind, "search");
    assert_eq!(matched.route, "GET /Patient");
    assert_eq!(
        matched.parameters,
        vec![
            "[0] query parameter 'family'".to_string(),
            "[1] query parameter 'given'".to_string(),
            "[2] query parameter '_count'".to_string(),
        ]
    );
}

#[test]
fn test_route_server_tags() {
    let file = bindings_file(BINDINGS_TOML);
    let response = resolve(&args(&file, RequestVerb::Get, "_tags")).unwrap();
    assert!(response.request.resource.is_none());
    assert_eq!(response.request.operation.as_deref(), Some("_tags"));
    assert_eq!(response.matched.unwrap().name, "server-tags");
}

#[test]
fn test_route_wrong_verb() {
    let file = bindings_file(BINDINGS_TOML);
    let response = resolve(&args(&file, RequestVerb::Delete, "Patient/42")).unwrap();
    assert!(response.matched.is_none());
    assert_eq!(response.bindings, 4);
}

#[test]
fn test_route_resource_provider_scope() {
    let file = bindings_file(
        r#"
[[binding]]
name = "read"
kind = "read"
params = [{ role = "id" }]
"#,
    );

    // without a scope the id parameter has no resource type
    assert!(resolve(&args(&file, RequestVerb::Get, "Observation/7")).is_err());

    let mut scoped = args(&file, RequestVerb::Get, "Observation/7");
    scoped.resource_provider = Some("Observation".to_string());
    let response = resolve(&scoped).unwrap();
    assert_eq!(response.matched.unwrap().route, "GET /Observation/{id}");
}

#[test]
fn test_route_rejects_malformed_target() {
    let file = bindings_file(BINDINGS_TOML);
    assert!(resolve(&args(&file, RequestVerb::Get, "Patient/42/extra")).is_err());
}
