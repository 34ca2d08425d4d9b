// Client call -> wire -> server dispatch -> wire -> client decode

use crate::common::{sample_tags, RecordingHandler};
use chrono::{TimeZone, Utc};
use fhirbind::core::types::{
    Bundle, IdDt, IssueSeverity, MethodOutcome, OperationOutcome, OperationResult, Resource,
    ResourceType,
};
use fhirbind::core::error::BindError;
use fhirbind::rest::{
    Argument, BufferedResponse, ClientContext, DispatchTable, OperationBinding, OperationKind,
    ParamDeclaration, QueryValueType, RestServer, ServerContext,
};

/// Send `args` through a single-binding server and decode the reply
///
/// Returns the arguments the handler saw and the client-side result.
fn round_trip(
    kind: OperationKind,
    params: &[ParamDeclaration],
    args: Vec<Argument>,
    result: OperationResult,
) -> (Vec<Argument>, OperationResult) {
    let handler = RecordingHandler::returning(result);
    let binding = OperationBinding::new(
        "under-test",
        kind,
        Some(ResourceType::new("Patient")),
        params,
        handler.clone(),
    )
    .unwrap();

    let invocation = binding
        .invoke_client(&args, &ClientContext::default())
        .unwrap();

    let mut table = DispatchTable::new();
    table.register(binding).unwrap();
    let server = RestServer::new(table, ServerContext::default());

    let mut request = invocation.to_incoming_request().unwrap();
    let mut response = BufferedResponse::new();
    server.handle(&mut request, &mut response).unwrap();
    assert_eq!(handler.call_count(), 1, "handler was not reached");

    let decoded = server
        .table()
        .get("under-test")
        .unwrap()
        .invoke_client_response(&response.into_client_response())
        .unwrap();

    (handler.last_args().unwrap(), decoded)
}

#[test]
fn test_read() {
    let patient = Resource::new("Patient").with_id("42").with_text("Jane Doe");
    let args = vec![Argument::Id(IdDt::new("42"))];

    let (seen, decoded) = round_trip(
        OperationKind::Read,
        &[ParamDeclaration::Id],
        args.clone(),
        OperationResult::Resource(patient.clone()),
    );

    assert_eq!(seen, args);
    assert_eq!(decoded, OperationResult::Resource(patient));
}

#[test]
fn test_versioned_read() {
    let args = vec![Argument::Id(IdDt::new("42")), Argument::Id(IdDt::new("5"))];

    let (seen, _) = round_trip(
        OperationKind::Read,
        &[ParamDeclaration::Id, ParamDeclaration::Version],
        args.clone(),
        OperationResult::Resource(Resource::new("Patient")),
    );

    assert_eq!(seen, args);
}

#[test]
fn test_search_with_reserved_characters() {
    let args = vec![
        Argument::String("O'Brien & Co/Ltd".to_string()),
        Argument::Strings(vec!["Anne".to_string(), "Marie=Claire".to_string()]),
        Argument::Integer(10),
    ];
    let bundle = Bundle::new(vec![Resource::new("Patient").with_id("1")]);

    let (seen, decoded) = round_trip(
        OperationKind::Search,
        &[
            ParamDeclaration::required_query("family", QueryValueType::String),
            ParamDeclaration::query("given", QueryValueType::Strings),
            ParamDeclaration::Count,
        ],
        args.clone(),
        OperationResult::Bundle(bundle.clone()),
    );

    assert_eq!(seen, args);
    assert_eq!(decoded, OperationResult::Bundle(bundle));
}

#[test]
fn test_history_with_since_and_absent_count() {
    let since = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let args = vec![
        Argument::Id(IdDt::new("42")),
        Argument::Date(since),
        Argument::Absent,
    ];

    let (seen, decoded) = round_trip(
        OperationKind::History,
        &[
            ParamDeclaration::Id,
            ParamDeclaration::Since,
            ParamDeclaration::Count,
        ],
        args.clone(),
        OperationResult::Bundle(Bundle::default()),
    );

    assert_eq!(seen, args);
    assert_eq!(decoded, OperationResult::Bundle(Bundle::default()));
}

#[test]
fn test_create_reports_location() {
    let patient = Resource::new("Patient").with_text("New patient");
    let args = vec![Argument::Resource(patient)];

    let (seen, decoded) = round_trip(
        OperationKind::Create,
        &[ParamDeclaration::Body],
        args.clone(),
        OperationResult::Method(MethodOutcome::created(IdDt::with_version("43", "1"))),
    );

    assert_eq!(seen, args);
    assert_eq!(
        decoded,
        OperationResult::Method(MethodOutcome::created(IdDt::with_version("43", "1")))
    );
}

#[test]
fn test_create_location_with_reserved_characters() {
    let id = IdDt::with_version("a b/c", "1");

    let (_, decoded) = round_trip(
        OperationKind::Create,
        &[ParamDeclaration::Body],
        vec![Argument::Resource(Resource::new("Patient"))],
        OperationResult::Method(MethodOutcome::created(id.clone())),
    );

    assert_eq!(decoded, OperationResult::Method(MethodOutcome::created(id)));
}

#[test]
fn test_empty_optional_list_arrives_absent() {
    let (seen, _) = round_trip(
        OperationKind::Search,
        &[ParamDeclaration::query("code", QueryValueType::Strings)],
        vec![Argument::Strings(vec![])],
        OperationResult::Bundle(Bundle::default()),
    );

    assert_eq!(seen, vec![Argument::Absent]);
}

#[test]
fn test_empty_required_list_rejected_by_client() {
    let handler = RecordingHandler::returning(OperationResult::Bundle(Bundle::default()));
    let binding = OperationBinding::new(
        "search-code",
        OperationKind::Search,
        Some(ResourceType::new("Patient")),
        &[ParamDeclaration::required_query("code", QueryValueType::Strings)],
        handler.clone(),
    )
    .unwrap();

    let err = binding
        .invoke_client(&[Argument::Strings(vec![])], &ClientContext::default())
        .unwrap_err();
    assert!(matches!(err, BindError::InvalidArgument(_)));
    assert_eq!(handler.call_count(), 0);
}

#[test]
fn test_update_without_outcome() {
    let args = vec![
        Argument::Id(IdDt::new("42")),
        Argument::Resource(Resource::new("Patient").with_id("42")),
    ];

    let (seen, decoded) = round_trip(
        OperationKind::Update,
        &[ParamDeclaration::Id, ParamDeclaration::Body],
        args.clone(),
        OperationResult::Method(MethodOutcome::updated(IdDt::with_version("42", "2"))),
    );

    assert_eq!(seen, args);
    assert_eq!(
        decoded,
        OperationResult::Method(MethodOutcome::updated(IdDt::with_version("42", "2")))
    );
}

#[test]
fn test_delete_tags_uses_compound_keyword() {
    let args = vec![Argument::Id(IdDt::new("42")), Argument::Tags(sample_tags())];

    let (seen, decoded) = round_trip(
        OperationKind::DeleteTags,
        &[ParamDeclaration::Id, ParamDeclaration::Body],
        args.clone(),
        OperationResult::Empty,
    );

    assert_eq!(seen, args);
    assert_eq!(decoded, OperationResult::Empty);
}

#[test]
fn test_validate_with_header_and_outcome() {
    let outcome = OperationOutcome::with_issue(IssueSeverity::Warning, "name is missing");
    let args = vec![
        Argument::Resource(Resource::new("Patient")),
        Argument::String("strict".to_string()),
    ];

    let (seen, decoded) = round_trip(
        OperationKind::Validate,
        &[
            ParamDeclaration::Body,
            ParamDeclaration::header("X-Validation-Profile"),
        ],
        args.clone(),
        OperationResult::Outcome(outcome.clone()),
    );

    assert_eq!(seen, args);
    assert_eq!(decoded, OperationResult::Outcome(outcome));
}

#[test]
fn test_client_path_layout() {
    let binding = OperationBinding::new(
        "version-tags",
        OperationKind::AddTags,
        Some(ResourceType::new("Patient")),
        &[
            ParamDeclaration::Id,
            ParamDeclaration::Version,
            ParamDeclaration::Body,
        ],
        RecordingHandler::returning(OperationResult::Empty),
    )
    .unwrap();

    let invocation = binding
        .invoke_client(
            &[
                Argument::Id(IdDt::new("42")),
                Argument::String("7".to_string()),
                Argument::Tags(sample_tags()),
            ],
            &ClientContext::default(),
        )
        .unwrap();

    assert_eq!(invocation.path(), "Patient/42/_history/7/_tags");
    assert!(invocation.body().is_some());
}
