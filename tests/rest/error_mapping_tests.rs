// Status <-> error kind mapping, checked from both ends of the wire

use crate::common::{request, serve, RecordingHandler};
use fhirbind::core::error::BindError;
use fhirbind::core::translator::{ErrorKind, ErrorTranslator, ServerResponseError};
use fhirbind::core::types::{OperationResult, RequestVerb, ResourceType};
use fhirbind::rest::{
    ClientResponse, DispatchTable, OperationBinding, OperationKind, ParamDeclaration, RestServer,
    ServerContext,
};

const MAPPED: &[(u16, ErrorKind)] = &[
    (400, ErrorKind::InvalidRequest),
    (401, ErrorKind::Unauthorized),
    (404, ErrorKind::ResourceNotFound),
    (409, ErrorKind::Conflict),
    (410, ErrorKind::Gone),
    (422, ErrorKind::UnprocessableEntity),
];

fn read_binding(handler: std::sync::Arc<RecordingHandler>) -> OperationBinding {
    OperationBinding::new(
        "read",
        OperationKind::Read,
        Some(ResourceType::new("Patient")),
        &[ParamDeclaration::Id],
        handler,
    )
    .unwrap()
}

#[test]
fn test_every_mapped_status_translates() {
    for (status, kind) in MAPPED {
        let err = ErrorTranslator::translate(*status, None, "");
        assert_eq!(err.kind, *kind, "status {status}");
        assert_eq!(err.status, *status);
        assert_eq!(err.message, format!("HTTP {status}"));
    }
}

#[test]
fn test_unmapped_statuses_are_generic() {
    for status in [418u16, 500, 503] {
        let err = ErrorTranslator::translate(status, Some("text/plain"), "teapot");
        assert_eq!(err.kind, ErrorKind::Generic(status));
        assert_eq!(err.raw_body.as_deref(), Some("teapot"));
    }
}

#[test]
fn test_handler_errors_become_matching_statuses() {
    let kinds = MAPPED
        .iter()
        .map(|(_, kind)| *kind)
        .chain([ErrorKind::Generic(418), ErrorKind::Generic(503)]);

    for kind in kinds {
        let handler = RecordingHandler::failing(ServerResponseError::new(kind, "handler refused"));
        let mut table = DispatchTable::new();
        table.register(read_binding(handler)).unwrap();
        let server = RestServer::new(table, ServerContext::default());

        let response = serve(&server, request(RequestVerb::Get, "Patient/42"));
        assert_eq!(response.status(), Some(kind.status_code()), "{kind}");

        // the client decodes the same kind back
        let decoded = server
            .table()
            .get("read")
            .unwrap()
            .invoke_client_response(&response.into_client_response());
        match decoded {
            Err(BindError::Server(err)) => {
                assert_eq!(err.kind, kind);
                assert_eq!(err.message, "handler refused");
            }
            other => panic!("expected {kind}, got {other:?}"),
        }
    }
}

#[test]
fn test_success_status_outside_operation_set_is_error() {
    // 204 is a success for delete but not for read
    let binding = read_binding(RecordingHandler::returning(OperationResult::Empty));
    let result = binding.invoke_client_response(&ClientResponse::new(204, None, ""));
    match result {
        Err(BindError::Server(err)) => assert_eq!(err.kind, ErrorKind::Generic(204)),
        other => panic!("expected a generic error, got {other:?}"),
    }
}

#[test]
fn test_error_body_in_xml() {
    let body = r#"<OperationOutcome><issue><severity>error</severity><details>Version conflict</details></issue></OperationOutcome>"#;
    let err = ErrorTranslator::translate(409, Some("application/xml+fhir"), body);
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(err.message, "Version conflict");
    assert!(err.raw_body.is_none());
}
