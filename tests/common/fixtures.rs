// Test fixtures: bindings, handlers and documents

use fhirbind::core::translator::{ErrorKind, ServerResponseError};
use fhirbind::core::types::{
    Bundle, IdDt, MethodOutcome, OperationResult, Resource, ResourceType, Tag, TagList,
};
use fhirbind::rest::{
    Argument, DispatchTable, OperationBinding, OperationHandler, OperationKind, ParamDeclaration,
    QueryValueType,
};
use std::sync::{Arc, Mutex};

/// Bindings file used by CLI and dispatch tests
#[allow(dead_code)]
pub const BINDINGS_TOML: &str = r#"
[[binding]]
name = "patient-read"
kind = "read"
resource = "Patient"
params = [{ role = "id" }]

[[binding]]
name = "patient-search"
kind = "search"
resource = "Patient"
params = [
    { role = "query", name = "family", required = true },
    { role = "query", name = "given", type = "strings" },
    { role = "count" },
]

[[binding]]
name = "patient-tags"
kind = "get-tags"
resource = "Patient"
params = [{ role = "id" }]

[[binding]]
name = "server-tags"
kind = "get-tags"
"#;

#[allow(dead_code)]
pub fn sample_tags() -> TagList {
    TagList::new(vec![
        Tag::new("urgent").with_scheme("http://hl7.org/fhir/tag"),
        Tag::new("vip").with_label("Very important"),
    ])
}

/// Handler that records its arguments and returns a fixed result
#[allow(dead_code)]
pub struct RecordingHandler {
    calls: Mutex<Vec<Vec<Argument>>>,
    result: Result<OperationResult, ServerResponseError>,
}

#[allow(dead_code)]
impl RecordingHandler {
    pub fn returning(result: OperationResult) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            result: Ok(result),
        })
    }

    pub fn failing(error: ServerResponseError) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            result: Err(error),
        })
    }

    pub fn last_args(&self) -> Option<Vec<Argument>> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl OperationHandler for RecordingHandler {
    fn invoke(&self, args: &[Argument]) -> Result<OperationResult, ServerResponseError> {
        self.calls.lock().unwrap().push(args.to_vec());
        self.result.clone()
    }
}

/// A Patient provider covering most of the operation family
///
/// Handlers answer with fixed documents; `Patient/404` style lookups are
/// not special-cased, use `RecordingHandler::failing` for error paths.
#[allow(dead_code)]
pub fn patient_provider() -> DispatchTable {
    let patient = || Some(ResourceType::new("Patient"));
    let mut table = DispatchTable::new();

    let bindings = vec![
        OperationBinding::new(
            "read",
            OperationKind::Read,
            patient(),
            &[ParamDeclaration::Id],
            RecordingHandler::returning(OperationResult::Resource(
                Resource::new("Patient").with_id("42").with_text("Jane Doe"),
            )),
        ),
        OperationBinding::new(
            "vread",
            OperationKind::Read,
            patient(),
            &[ParamDeclaration::Id, ParamDeclaration::Version],
            RecordingHandler::failing(ServerResponseError::new(
                ErrorKind::Gone,
                "Version 5 of Patient/42 was deleted",
            )),
        ),
        OperationBinding::new(
            "search",
            OperationKind::Search,
            patient(),
            &[
                ParamDeclaration::required_query("family", QueryValueType::String),
                ParamDeclaration::Count,
            ],
            RecordingHandler::returning(OperationResult::Bundle(Bundle::new(vec![
                Resource::new("Patient").with_id("1"),
                Resource::new("Patient").with_id("2"),
            ]))),
        ),
        OperationBinding::new(
            "create",
            OperationKind::Create,
            patient(),
            &[ParamDeclaration::Body],
            RecordingHandler::returning(OperationResult::Method(MethodOutcome::created(
                IdDt::with_version("43", "1"),
            ))),
        ),
        OperationBinding::new(
            "delete",
            OperationKind::Delete,
            patient(),
            &[ParamDeclaration::Id],
            RecordingHandler::returning(OperationResult::Empty),
        ),
        OperationBinding::new(
            "instance-tags",
            OperationKind::GetTags,
            patient(),
            &[ParamDeclaration::Id],
            RecordingHandler::returning(OperationResult::Tags(sample_tags())),
        ),
        OperationBinding::new(
            "server-tags",
            OperationKind::GetTags,
            None,
            &[],
            RecordingHandler::returning(OperationResult::Tags(TagList::default())),
        ),
        OperationBinding::new(
            "add-tags",
            OperationKind::AddTags,
            patient(),
            &[ParamDeclaration::Id, ParamDeclaration::Body],
            RecordingHandler::returning(OperationResult::Empty),
        ),
    ];

    for binding in bindings {
        table.register(binding.unwrap()).unwrap();
    }
    table
}
