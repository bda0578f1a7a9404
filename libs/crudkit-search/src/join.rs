//! Join-path resolver.
//!
//! Walks a dot-separated field path from the query root across relations,
//! creating one LEFT JOIN per relationship prefix and caching it, so that all
//! filters touching `account` share a single join on `account`.
//!
//! The walk is a small state machine: it starts [`PathState::AtRoot`], moves
//! to [`PathState::AtJoin`] or [`PathState::AtCollectionJoin`] on every
//! relation segment and stops at the first scalar segment, which must be the
//! last one.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{SearchError, SearchResult};
use crate::kind::FieldKind;
use crate::schema::{EntitySchema, FieldDef, Relation, SchemaRegistry};

/// Position of the path walk, recorded on every join as its origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathState {
    AtRoot,
    AtJoin,
    AtCollectionJoin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    ToOne,
    ToMany,
}

/// One `LEFT JOIN table AS alias ON left_alias.left_col = alias.right_col`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinClause {
    pub table: String,
    pub alias: String,
    pub left_alias: String,
    pub left_col: String,
    pub right_col: String,
    /// Relationship prefix that created the join, e.g. `account.roles`.
    pub path: String,
    pub origin: PathState,
    pub cardinality: Cardinality,
    /// Junction table of a many-to-many relation.
    pub junction: bool,
}

/// What a resolved path ends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leaf {
    Scalar(FieldKind),
    /// The path names a relation; only null checks apply.
    Relation,
}

/// Column a filter compares against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedField {
    pub alias: String,
    pub column: String,
    pub leaf: Leaf,
}

#[derive(Clone, Debug)]
struct JoinHandle {
    alias: String,
    schema: Arc<EntitySchema>,
    collection: bool,
    /// Join key on the joined side; NULL when no related row exists.
    key_column: String,
}

struct Cursor {
    state: PathState,
    alias: String,
    schema: Arc<EntitySchema>,
}

impl JoinHandle {
    fn cursor(&self) -> Cursor {
        Cursor {
            state: if self.collection {
                PathState::AtCollectionJoin
            } else {
                PathState::AtJoin
            },
            alias: self.alias.clone(),
            schema: Arc::clone(&self.schema),
        }
    }
}

/// Joins created for one search, keyed by relationship prefix.
///
/// Scoped to a single predicate build and never shared.
#[derive(Debug, Default)]
pub struct JoinCache {
    handles: HashMap<String, JoinHandle>,
    clauses: Vec<JoinClause>,
    aliases: usize,
}

impl JoinCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `path` from `root`, joining relations not seen before.
    ///
    /// # Errors
    /// `UnresolvableFieldPath` for empty segments, unknown fields and
    /// descending through a scalar; `SchemaMismatch` when a relation's target
    /// is not registered.
    pub fn resolve(
        &mut self,
        registry: &SchemaRegistry,
        root: &Arc<EntitySchema>,
        path: &str,
    ) -> SearchResult<ResolvedField> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(SearchError::unresolvable(path, "empty path segment"));
        }

        let mut cursor = Cursor {
            state: PathState::AtRoot,
            alias: root.table().to_owned(),
            schema: Arc::clone(root),
        };
        let mut last_join: Option<JoinHandle> = None;
        let mut prefix = String::with_capacity(path.len());

        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                prefix.push('.');
            }
            prefix.push_str(segment);

            if let Some(handle) = self.handles.get(&prefix) {
                cursor = handle.cursor();
                last_join = Some(handle.clone());
                continue;
            }

            let schema = Arc::clone(&cursor.schema);
            let def = schema.field(segment).ok_or_else(|| {
                SearchError::unresolvable(
                    path,
                    format!("'{segment}' is not a field of '{}'", schema.table()),
                )
            })?;

            let handle = match def {
                FieldDef::Scalar { column, kind } => {
                    if let Some(next) = segments.get(i + 1) {
                        return Err(SearchError::unresolvable(
                            path,
                            format!("'{segment}' is a scalar field, cannot descend into '{next}'"),
                        ));
                    }
                    return Ok(ResolvedField {
                        alias: cursor.alias,
                        column: column.clone(),
                        leaf: Leaf::Scalar(*kind),
                    });
                }
                FieldDef::ToOne(rel) => {
                    self.join(registry, &cursor, rel, &prefix, Cardinality::ToOne)?
                }
                FieldDef::ToMany(rel) => {
                    self.join(registry, &cursor, rel, &prefix, Cardinality::ToMany)?
                }
            };
            cursor = handle.cursor();
            last_join = Some(handle);
        }

        let handle = last_join.ok_or_else(|| SearchError::unresolvable(path, "empty path"))?;
        Ok(ResolvedField {
            alias: handle.alias,
            column: handle.key_column,
            leaf: Leaf::Relation,
        })
    }

    fn join(
        &mut self,
        registry: &SchemaRegistry,
        from: &Cursor,
        rel: &Relation,
        prefix: &str,
        cardinality: Cardinality,
    ) -> SearchResult<JoinHandle> {
        let target = Arc::clone(registry.require(&rel.target)?);

        let (left_alias, left_col) = match &rel.via {
            Some(junction) => {
                let alias = self.next_alias();
                self.clauses.push(JoinClause {
                    table: junction.table.clone(),
                    alias: alias.clone(),
                    left_alias: from.alias.clone(),
                    left_col: rel.from_col.clone(),
                    right_col: junction.owner_col.clone(),
                    path: prefix.to_owned(),
                    origin: from.state,
                    cardinality,
                    junction: true,
                });
                (alias, junction.target_col.clone())
            }
            None => (from.alias.clone(), rel.from_col.clone()),
        };

        let alias = self.next_alias();
        self.clauses.push(JoinClause {
            table: rel.target.clone(),
            alias: alias.clone(),
            left_alias,
            left_col,
            right_col: rel.to_col.clone(),
            path: prefix.to_owned(),
            origin: from.state,
            cardinality,
            junction: false,
        });
        tracing::trace!(
            path = prefix,
            alias = %alias,
            origin = ?from.state,
            ?cardinality,
            "search join created"
        );

        let handle = JoinHandle {
            alias,
            schema: target,
            collection: cardinality == Cardinality::ToMany,
            key_column: rel.to_col.clone(),
        };
        self.handles.insert(prefix.to_owned(), handle.clone());
        Ok(handle)
    }

    fn next_alias(&mut self) -> String {
        self.aliases += 1;
        format!("sj{}", self.aliases)
    }

    /// Number of distinct relationship prefixes joined so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Join clauses in creation order.
    #[must_use]
    pub fn clauses(&self) -> &[JoinClause] {
        &self.clauses
    }

    #[must_use]
    pub fn into_clauses(self) -> Vec<JoinClause> {
        self.clauses
    }
}
