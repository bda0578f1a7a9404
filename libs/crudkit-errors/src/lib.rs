//! Error model shared by the crudkit libraries: catalog entries ([`ErrDef`])
//! and the Problem Details body ([`Problem`]) they render into.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod catalog;
pub mod problem;

pub use catalog::ErrDef;
pub use problem::{Problem, ValidationViolation};
