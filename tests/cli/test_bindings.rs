//! Tests for the shipped sample bindings
//!
//! Every binding in demos/bindings.toml must load, and each one should
//! route back to itself.

use fhirbind::cli::commands::{load_table, scope_for};
use fhirbind::core::types::RequestVerb;
use fhirbind::rest::IncomingRequest;
use std::path::Path;

fn demo_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/bindings.toml"))
}

#[test]
fn test_demo_bindings_load() {
    let (file, table) = load_table(demo_path(), &scope_for(None)).unwrap();
    assert_eq!(file.bindings.len(), table.len());
    assert!(table.contains("patient-delete-tags"));
}

#[test]
fn test_demo_bindings_route_to_themselves() {
    let (_, table) = load_table(demo_path(), &scope_for(None)).unwrap();

    let cases = [
        (RequestVerb::Get, "Patient/1", "patient-read"),
        (RequestVerb::Get, "Patient/1/_history/2", "patient-vread"),
        (RequestVerb::Post, "Patient", "patient-create"),
        (RequestVerb::Put, "Patient/1", "patient-update"),
        (RequestVerb::Delete, "Patient/1", "patient-delete"),
        (RequestVerb::Get, "Patient?family=Doe", "patient-search"),
        (RequestVerb::Get, "Patient/1/_history", "patient-history"),
        (RequestVerb::Get, "_history", "server-history"),
        (RequestVerb::Get, "_tags", "server-tags"),
        (RequestVerb::Get, "Patient/1/_tags", "patient-tags"),
        (RequestVerb::Get, "Patient/1/_history/2/_tags", "patient-version-tags"),
        (RequestVerb::Post, "Patient/1/_tags", "patient-add-tags"),
        (RequestVerb::Post, "Patient/1/_tags/_delete", "patient-delete-tags"),
        (RequestVerb::Post, "Patient/_validate", "patient-validate"),
    ];

    for (verb, target, expected) in cases {
        let request = IncomingRequest::parse(verb, target).unwrap();
        let binding = table
            .find(&request)
            .unwrap_or_else(|| panic!("{verb} {target} did not route"));
        assert_eq!(binding.name(), expected, "{verb} {target}");
    }
}
