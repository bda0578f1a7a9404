//! Dynamic search filters for `SeaORM`.
//!
//! Request parameters named `OPERATOR_fieldPath` (for example
//! `EQ_account.username=alice` or `ISNULL_deletedAt`) are translated into LEFT
//! JOINs along the field path and a single AND/OR condition:
//!
//! - `params`: raw key → value map built from query pairs or JSON
//! - `filter`: key parsing into [`SearchFilter`] descriptors
//! - `coerce`: raw values → typed `SeaORM` values
//! - `schema`: per-entity field and relation descriptions
//! - `join`: path resolution with one join per relationship prefix
//! - `builder`: composition into a [`SearchPlan`]
//! - `service`: ready-made `find_*` queries over a connection
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod builder;
pub mod coerce;
pub mod config;
pub mod error;
pub mod ext;
pub mod filter;
pub mod join;
pub mod kind;
pub mod params;
pub mod problem_mapping;
pub mod schema;
pub mod service;

pub use builder::{PredicateBuilder, SearchPlan, SortKey};
pub use coerce::{DATE_FORMAT, DATETIME_FORMAT, TIME_FORMAT, coerce, coerce_many, format_value};
pub use config::SearchConfig;
pub use error::{CoercionError, SearchError, SearchResult};
pub use ext::{SearchExt, SearchStatementExt};
pub use filter::{
    LinkType, Operator, SearchFilter, UnknownOperator, parse_filter_key, parse_search_filters,
};
pub use join::{Cardinality, JoinCache, JoinClause, Leaf, PathState, ResolvedField};
pub use kind::FieldKind;
pub use params::{RawValue, SearchParams};
pub use schema::{EntitySchema, FieldDef, Junction, Relation, SchemaRegistry};
pub use service::{Page, PageInfo, PageRequest, SearchService};
