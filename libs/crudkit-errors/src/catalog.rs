//! Static error catalog entries.

use http::StatusCode;

use crate::problem::Problem;

/// Fixed part of a problem: one entry per error kind an API can return.
#[derive(Debug, Clone, Copy)]
pub struct ErrDef {
    pub status: StatusCode,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    /// Problem for one occurrence of this error.
    pub fn as_problem(&self, detail: impl Into<String>) -> Problem {
        Problem {
            type_url: self.type_url,
            title: self.title,
            status: self.status.as_u16(),
            detail: detail.into(),
            code: self.code,
            instance: String::new(),
            trace_id: None,
            errors: Vec::new(),
        }
    }
}
