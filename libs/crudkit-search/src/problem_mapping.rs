//! Mapping from search errors to RFC 9457 Problems (pure data).
//!
//! The HTTP layer adds the request path and trace id with
//! `Problem::with_instance` / `Problem::with_trace_id` before rendering.

use crudkit_errors::{ErrDef, Problem, ValidationViolation};
use http::StatusCode;

use crate::error::SearchError;

pub const INVALID_FILTER_KEY: ErrDef = ErrDef {
    status: StatusCode::BAD_REQUEST,
    title: "Invalid Search Filter",
    code: "search.invalid_filter_key",
    type_url: "urn:crudkit:errors:search:invalid_filter_key",
};

pub const INVALID_OPERATOR: ErrDef = ErrDef {
    status: StatusCode::BAD_REQUEST,
    title: "Invalid Search Operator",
    code: "search.invalid_operator",
    type_url: "urn:crudkit:errors:search:invalid_operator",
};

pub const LIMIT_EXCEEDED: ErrDef = ErrDef {
    status: StatusCode::BAD_REQUEST,
    title: "Search Limit Exceeded",
    code: "search.limit_exceeded",
    type_url: "urn:crudkit:errors:search:limit_exceeded",
};

pub const MALFORMED_VALUE: ErrDef = ErrDef {
    status: StatusCode::UNPROCESSABLE_ENTITY,
    title: "Malformed Search Value",
    code: "search.malformed_value",
    type_url: "urn:crudkit:errors:search:malformed_value",
};

pub const UNRESOLVABLE_PATH: ErrDef = ErrDef {
    status: StatusCode::UNPROCESSABLE_ENTITY,
    title: "Unknown Search Field",
    code: "search.unresolvable_path",
    type_url: "urn:crudkit:errors:search:unresolvable_path",
};

pub const INTERNAL: ErrDef = ErrDef {
    status: StatusCode::INTERNAL_SERVER_ERROR,
    title: "Internal Server Error",
    code: "search.internal",
    type_url: "urn:crudkit:errors:search:internal",
};

impl From<SearchError> for Problem {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidFilterKey { ref key } => INVALID_FILTER_KEY
                .as_problem(err.to_string())
                .with_violation(ValidationViolation::new(key, err.to_string())),

            SearchError::InvalidOperator { ref key, .. } => INVALID_OPERATOR
                .as_problem(err.to_string())
                .with_violation(ValidationViolation::new(key, err.to_string())),

            SearchError::LimitExceeded(msg) => LIMIT_EXCEEDED.as_problem(msg),

            SearchError::MalformedSearchValue { ref field, ref reason } => MALFORMED_VALUE
                .as_problem(err.to_string())
                .with_violation(ValidationViolation::new(field, reason.as_str())),

            SearchError::UnresolvableFieldPath { ref path, ref reason } => UNRESOLVABLE_PATH
                .as_problem(err.to_string())
                .with_violation(ValidationViolation::new(path, reason.as_str())),

            // Server-side faults: keep details in the logs, not in the response
            SearchError::SchemaMismatch(msg) | SearchError::Db(msg) => {
                tracing::error!(error = %msg, "search failed on the server side");
                INTERNAL.as_problem("An internal error occurred while processing the search")
            }
        }
    }
}
