//! Canonical schema constants for structured logging
//!
//! These constants keep field names consistent between the logging macros,
//! the test capture layer and anything parsing JSON logs downstream.

// Canonical field keys
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Query shape
pub const FIELD_SIGNERS: &str = "signers";
pub const FIELD_PREDICATES: &str = "predicates";
pub const FIELD_FETCHED: &str = "fetched";
pub const FIELD_RETURNED: &str = "returned";
pub const FIELD_HAS_MORE: &str = "has_more";

// Hydration
pub const FIELD_RELATION: &str = "relation";
pub const FIELD_ROWS: &str = "rows";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
