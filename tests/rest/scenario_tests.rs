// End-to-end scenarios for instance tags, client errors and negotiation

use crate::common::{request, sample_tags, serve, RecordingHandler};
use fhirbind::core::encoding::EncodingFormat;
use fhirbind::core::error::BindError;
use fhirbind::core::negotiation::ContentNegotiator;
use fhirbind::core::translator::ErrorKind;
use fhirbind::core::types::{IdDt, OperationResult, RequestVerb, ResourceType};
use fhirbind::rest::{
    Argument, BufferedResponse, ClientResponse, DispatchTable, OperationBinding, OperationKind,
    ParamDeclaration, RestServer, ServerContext,
};
use std::sync::Arc;

fn instance_tags(handler: Arc<RecordingHandler>) -> OperationBinding {
    OperationBinding::new(
        "instance-tags",
        OperationKind::GetTags,
        Some(ResourceType::new("Patient")),
        &[ParamDeclaration::Id],
        handler,
    )
    .unwrap()
}

#[test]
fn test_instance_tags_served() {
    let handler = RecordingHandler::returning(OperationResult::Tags(sample_tags()));
    let binding = instance_tags(handler.clone());
    let mut req = request(RequestVerb::Get, "Patient/42/_tags");
    assert!(binding.matches(&req));

    let mut response = BufferedResponse::new();
    binding
        .invoke_server(&mut req, &ServerContext::default(), &mut response)
        .unwrap();

    let args = handler.last_args().unwrap();
    assert_eq!(args, vec![Argument::Id(IdDt::new("42"))]);
    assert_eq!(response.status(), Some(200));
    assert_eq!(response.content_type(), Some("application/json+fhir"));
    assert_eq!(response.charset(), Some("UTF-8"));

    let body: serde_json::Value = serde_json::from_str(&response.body_text()).unwrap();
    assert_eq!(body["category"][0]["term"], "urgent");
    assert_eq!(body["category"][1]["label"], "Very important");
}

#[test]
fn test_server_level_tags_do_not_match_instance_binding() {
    let binding = instance_tags(RecordingHandler::returning(OperationResult::Empty));
    assert!(!binding.matches(&request(RequestVerb::Get, "_tags")));
}

#[test]
fn test_versioned_tags_do_not_match_unversioned_binding() {
    let binding = instance_tags(RecordingHandler::returning(OperationResult::Empty));
    let req = request(RequestVerb::Get, "Patient/42/_history/5/_tags");
    assert_eq!(req.version_id(), Some("5"));
    assert!(!binding.matches(&req));
}

#[test]
fn test_client_not_found_carries_outcome() {
    let binding = OperationBinding::new(
        "read",
        OperationKind::Read,
        Some(ResourceType::new("Patient")),
        &[ParamDeclaration::Id],
        RecordingHandler::returning(OperationResult::Empty),
    )
    .unwrap();

    let response = ClientResponse::new(
        404,
        Some("application/json+fhir; charset=UTF-8"),
        r#"{"issue":[{"severity":"error","details":"Resource Patient/99 is not known"}]}"#,
    );

    match binding.invoke_client_response(&response) {
        Err(BindError::Server(err)) => {
            assert_eq!(err.kind, ErrorKind::ResourceNotFound);
            assert_eq!(err.status, 404);
            assert_eq!(err.message, "Resource Patient/99 is not known");
            let outcome = err.outcome.expect("outcome should be parsed");
            assert_eq!(outcome.issues.len(), 1);
        }
        other => panic!("expected a not-found error, got {other:?}"),
    }
}

#[test]
fn test_unrecognised_accept_uses_default() {
    let negotiator = ContentNegotiator::new(EncodingFormat::Json);
    assert_eq!(
        negotiator.negotiate(None, Some("text/html, image/png;q=0.5")),
        EncodingFormat::Json
    );
}

#[test]
fn test_unrecognised_accept_on_the_wire() {
    let mut table = DispatchTable::new();
    table
        .register(instance_tags(RecordingHandler::returning(
            OperationResult::Tags(sample_tags()),
        )))
        .unwrap();
    let server = RestServer::new(table, ServerContext::new(EncodingFormat::Json));

    let req = request(RequestVerb::Get, "Patient/42/_tags").with_header("Accept", "text/html");
    let response = serve(&server, req);
    assert_eq!(response.status(), Some(200));
    assert_eq!(response.content_type(), Some("application/json+fhir"));
}
