//! REST binding layer
//!
//! Binds declared operations to incoming requests and outgoing client
//! calls. Depends on `core/` only; transports sit outside and talk to it
//! through [`IncomingRequest`], [`ResponseSink`] and [`OutgoingInvocation`].
//!
//! # Architecture
//!
//! - **request / response**: Transport-facing request and response models
//! - **context**: Server and client settings handed to bindings
//! - **param**: Parameter bindings (query, header, body)
//! - **invocation**: Outgoing client invocations and their builder
//! - **declaration**: Declarative binding descriptions (TOML)
//! - **handler**: Application handler trait
//! - **descriptor**: Operation bindings (match, server and client paths)
//! - **dispatch**: Ordered dispatch table
//! - **server**: Request entry point with error translation

pub mod context;
pub mod declaration;
pub mod descriptor;
pub mod dispatch;
pub mod handler;
pub mod invocation;
pub mod param;
pub mod request;
pub mod response;
pub mod server;

pub use context::{ClientContext, ServerContext};
pub use declaration::{BindingDeclaration, BindingFile, ParamDeclaration, ProviderScope};
pub use descriptor::{MatchShape, OperationBinding, OperationKind};
pub use dispatch::DispatchTable;
pub use handler::{OperationHandler, UnimplementedHandler};
pub use invocation::{ClientInvocationBuilder, OutgoingInvocation};
pub use param::{Argument, ParameterBinding, QueryValueType};
pub use request::IncomingRequest;
pub use response::{BufferedResponse, ClientResponse, ResponseSink};
pub use server::RestServer;
