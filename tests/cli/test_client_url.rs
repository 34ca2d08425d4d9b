//! Tests for the client-url command
//!
//! Builds outgoing requests from command-line style arguments.

use crate::common::{bindings_file, BINDINGS_TOML};
use fhirbind::cli::commands::client_url::{build, ClientUrlArgs};
use fhirbind::core::config::Config;
use tempfile::NamedTempFile;

fn args(file: &NamedTempFile, name: &str) -> ClientUrlArgs {
    ClientUrlArgs {
        name: name.to_string(),
        bindings: file.path().to_path_buf(),
        resource_provider: None,
        id: None,
        version: None,
        params: Vec::new(),
        headers: Vec::new(),
        body: None,
        base_url: None,
    }
}

#[test]
fn test_repeated_param_becomes_list() {
    let file = bindings_file(BINDINGS_TOML);
    let mut a = args(&file, "patient-search");
    a.params = vec![
        ("family".to_string(), "Doe".to_string()),
        ("given".to_string(), "Jane".to_string()),
        ("given".to_string(), "Ann".to_string()),
    ];

    let response = build(&a, &Config::default()).unwrap();
    assert_eq!(
        response.url,
        "http://localhost:8080/fhir/Patient?family=Doe&given=Jane&given=Ann"
    );
}

#[test]
fn test_id_is_percent_encoded() {
    let file = bindings_file(BINDINGS_TOML);
    let mut a = args(&file, "patient-read");
    a.id = Some("a b/c".to_string());

    let response = build(&a, &Config::default()).unwrap();
    assert_eq!(response.verb, "GET");
    assert_eq!(response.url, "http://localhost:8080/fhir/Patient/a%20b%2Fc");
}

#[test]
fn test_missing_id() {
    let file = bindings_file(BINDINGS_TOML);
    assert!(build(&args(&file, "patient-tags"), &Config::default()).is_err());
}

#[test]
fn test_bad_count_value() {
    let file = bindings_file(BINDINGS_TOML);
    let mut a = args(&file, "patient-search");
    a.params = vec![
        ("family".to_string(), "Doe".to_string()),
        ("_count".to_string(), "many".to_string()),
    ];
    assert!(build(&a, &Config::default()).is_err());
}
