//! Server façade: dispatch, invoke, and translate errors into responses

use std::time::Instant;
use tracing::{info, warn};

use crate::core::config::ServerConfig;
use crate::core::constants::{CHARSET_UTF_8, HEADER_ACCEPT, PARAM_FORMAT, PARAM_PRETTY};
use crate::core::error::{BindError, Result};
use crate::core::negotiation::pretty_print;
use crate::core::translator::ServerResponseError;
use crate::core::types::{IssueSeverity, OperationOutcome};
use crate::rest::context::ServerContext;
use crate::rest::dispatch::DispatchTable;
use crate::rest::request::IncomingRequest;
use crate::rest::response::ResponseSink;

/// Entry point a transport calls once per request
///
/// Owns the dispatch table and server settings. Both are read-only, so
/// one instance serves any number of concurrent requests.
#[derive(Debug)]
pub struct RestServer {
    table: DispatchTable,
    context: ServerContext,
}

impl RestServer {
    pub fn new(table: DispatchTable, context: ServerContext) -> Self {
        Self { table, context }
    }

    pub fn from_config(table: DispatchTable, config: &ServerConfig) -> Self {
        Self::new(table, ServerContext::from_config(config))
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn context(&self) -> &ServerContext {
        &self.context
    }

    /// Serve one request
    ///
    /// No matching binding answers 404. Handler and binding errors are
    /// written as an outcome document with the status from the shared
    /// error table. I/O errors are returned: the connection is unusable.
    pub fn handle(&self, request: &mut IncomingRequest, sink: &mut dyn ResponseSink) -> Result<()> {
        let start = Instant::now();
        let verb = request.verb();
        let path = request.path();

        let Some(binding) = self.table.find(request) else {
            let error: BindError =
                ServerResponseError::not_found(format!("No operation matches {verb} /{path}")).into();
            warn!(%verb, path = %path, "No binding for request");
            return self.write_error(request, sink, &error);
        };

        match binding.invoke_server(request, &self.context, sink) {
            Ok(()) => {
                info!(
                    %verb,
                    path = %path,
                    binding = binding.name(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request completed"
                );
                Ok(())
            }
            Err(BindError::Io(e)) => {
                warn!(%verb, path = %path, binding = binding.name(), error = %e, "I/O failure");
                Err(BindError::Io(e))
            }
            Err(error) => {
                warn!(
                    %verb,
                    path = %path,
                    binding = binding.name(),
                    status = error.status_code(),
                    error = %error,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request failed"
                );
                self.write_error(request, sink, &error)
            }
        }
    }

    /// Write an error as a status plus outcome document
    pub fn write_error(
        &self,
        request: &IncomingRequest,
        sink: &mut dyn ResponseSink,
        error: &BindError,
    ) -> Result<()> {
        let outcome = match error {
            BindError::Server(e) => e.to_outcome(),
            other => OperationOutcome::with_issue(IssueSeverity::Error, other.message()),
        };

        let encoding = self
            .context
            .negotiator
            .negotiate(request.param(PARAM_FORMAT), request.header(HEADER_ACCEPT));
        let pretty = pretty_print(request.param(PARAM_PRETTY), self.context.pretty_print);

        sink.set_status(error.status_code());
        self.context.add_headers_to_response(sink);
        sink.set_content_type(encoding.content_type());
        sink.set_character_encoding(CHARSET_UTF_8);
        encoding
            .new_parser(pretty)
            .encode_outcome(&outcome, sink.writer())?;
        sink.writer().flush()?;
        Ok(())
    }
}
