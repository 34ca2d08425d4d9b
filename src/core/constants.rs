//! Protocol constants: reserved path segments, control parameters,
//! header names and status codes.

pub const PARAM_TAGS: &str = "_tags";
pub const PARAM_HISTORY: &str = "_history";
pub const PARAM_VALIDATE: &str = "_validate";

/// Compound keyword for tag removal
pub const OPERATION_DELETE_TAGS: &str = "_tags/_delete";

pub const PARAM_FORMAT: &str = "_format";
pub const PARAM_PRETTY: &str = "_pretty";
pub const PARAM_SINCE: &str = "_since";
pub const PARAM_COUNT: &str = "_count";

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_LOCATION: &str = "location";
pub const HEADER_CONTENT_LOCATION: &str = "content-location";
pub const HEADER_POWERED_BY: &str = "x-powered-by";

pub const CHARSET_UTF_8: &str = "UTF-8";

pub const STATUS_HTTP_200_OK: u16 = 200;
pub const STATUS_HTTP_201_CREATED: u16 = 201;
pub const STATUS_HTTP_204_NO_CONTENT: u16 = 204;
pub const STATUS_HTTP_404_NOT_FOUND: u16 = 404;
pub const STATUS_HTTP_500_INTERNAL_ERROR: u16 = 500;
