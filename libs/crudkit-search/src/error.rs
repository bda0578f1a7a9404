//! Errors raised while turning search parameters into a query.

use thiserror::Error;

use crate::kind::FieldKind;

/// Every failure aborts the whole build; nothing is attached to the query.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    /// Key is not `OPERATOR_fieldPath`.
    #[error("{key} is not a valid search filter name")]
    InvalidFilterKey { key: String },

    #[error("unknown search operator '{token}' in {key}")]
    InvalidOperator { key: String, token: String },

    /// Value could not be converted to the field's type, or the operator
    /// cannot be applied to it.
    #[error("malformed search value for {field}: {reason}")]
    MalformedSearchValue { field: String, reason: String },

    #[error("cannot resolve field path {path}: {reason}")]
    UnresolvableFieldPath { path: String, reason: String },

    #[error("search limit exceeded: {0}")]
    LimitExceeded(String),

    /// The schema registry does not describe an entity a relation points to.
    /// A server-side configuration fault, never caused by client input.
    #[error("entity schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("database error: {0}")]
    Db(String),
}

impl SearchError {
    pub(crate) fn malformed(field: &str, reason: impl Into<String>) -> Self {
        SearchError::MalformedSearchValue {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolvable(path: &str, reason: impl Into<String>) -> Self {
        SearchError::UnresolvableFieldPath {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }

    /// `true` when the error is caused by the request rather than the server.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, SearchError::SchemaMismatch(_) | SearchError::Db(_))
    }
}

pub type SearchResult<T> = Result<T, SearchError>;

/// A raw value could not be converted to the target kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot convert '{raw}' to {expected}")]
pub struct CoercionError {
    pub raw: String,
    pub expected: FieldKind,
}

impl CoercionError {
    pub(crate) fn new(raw: &str, expected: FieldKind) -> Self {
        Self {
            raw: raw.to_owned(),
            expected,
        }
    }
}

impl From<sea_orm::DbErr> for SearchError {
    fn from(e: sea_orm::DbErr) -> Self {
        SearchError::Db(e.to_string())
    }
}
