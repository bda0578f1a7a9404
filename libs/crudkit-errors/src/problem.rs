//! Problem Details body (RFC 9457) returned for rejected requests.

use serde::Serialize;

/// Serialized response body for a failed request.
///
/// Built from an [`ErrDef`](crate::ErrDef); the catalog entry fixes type,
/// title, status and code, the caller supplies the detail. Empty optional
/// members are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub detail: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationViolation>,
}

/// One rejected request input, e.g. a search parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationViolation {
    /// Parameter key or field path as the client sent it.
    pub field: String,
    pub message: String,
}

impl ValidationViolation {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Problem {
    /// Request path the problem occurred on.
    pub fn with_instance(mut self, path: impl Into<String>) -> Self {
        self.instance = path.into();
        self
    }

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    pub fn with_violation(mut self, violation: ValidationViolation) -> Self {
        self.errors.push(violation);
        self
    }

    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}
