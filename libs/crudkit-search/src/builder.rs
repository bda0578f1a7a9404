//! Predicate builder: filter descriptors → joins + one composed condition.
//!
//! The builder never touches a query. It produces a [`SearchPlan`] and the
//! plan is attached in one infallible step, so a failing filter leaves the
//! caller's query exactly as it was.

use std::collections::HashSet;
use std::sync::Arc;

use sea_orm::sea_query::{
    Alias, Expr, IntoCondition, JoinType, LikeExpr, SelectStatement, SimpleExpr,
};
use sea_orm::{Condition, DbBackend, EntityTrait, Order, Value};
use serde::{Deserialize, Serialize};

use crate::coerce::{coerce, coerce_many};
use crate::error::{SearchError, SearchResult};
use crate::filter::{LinkType, Operator, SearchFilter};
use crate::join::{Cardinality, JoinCache, JoinClause, Leaf, ResolvedField};
use crate::kind::FieldKind;
use crate::params::RawValue;
use crate::schema::{EntitySchema, FieldDef, SchemaRegistry};

/// Fluent builder for one search.
///
/// ```
/// use crudkit_search::{
///     EntitySchema, FieldKind, LinkType, PredicateBuilder, SchemaRegistry, SearchParams,
///     parse_search_filters,
/// };
///
/// let registry = SchemaRegistry::new()
///     .with(
///         EntitySchema::new("person")
///             .scalar_column("name", "name", FieldKind::String)
///             .to_one_table("account", "account", "account_id", "id"),
///     )
///     .with(
///         EntitySchema::new("account")
///             .scalar_column("username", "username", FieldKind::String),
///     );
///
/// let params = SearchParams::new()
///     .with("EQ_account.username", "alice")
///     .with("LIKE_name", "li");
/// let filters = parse_search_filters(&params).unwrap();
///
/// let plan = PredicateBuilder::new(&registry, "person")
///     .link(LinkType::Or)
///     .build(filters.values())
///     .unwrap();
/// assert_eq!(plan.joins().len(), 1);
/// assert!(plan.condition().is_some());
/// ```
#[must_use]
pub struct PredicateBuilder<'r> {
    registry: &'r SchemaRegistry,
    root: String,
    link: LinkType,
    group_fields: Vec<String>,
    sort: Vec<SortKey>,
    conditions: Vec<Condition>,
    text_type: &'static str,
}

/// One ORDER BY entry on a root scalar field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    #[serde(default)]
    pub descending: bool,
}

impl SortKey {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

impl<'r> PredicateBuilder<'r> {
    #[must_use]
    pub fn new(registry: &'r SchemaRegistry, root_table: impl Into<String>) -> Self {
        Self {
            registry,
            root: root_table.into(),
            link: LinkType::default(),
            group_fields: Vec::new(),
            sort: Vec::new(),
            conditions: Vec::new(),
            text_type: "text",
        }
    }

    /// Builder rooted at a `SeaORM` entity's table.
    #[must_use]
    pub fn for_entity<E: EntityTrait>(registry: &'r SchemaRegistry) -> Self {
        Self::new(registry, E::default().table_name())
    }

    pub fn link(mut self, link: LinkType) -> Self {
        self.link = link;
        self
    }

    /// Target engine. Only decides the type non-text columns are cast to
    /// for LIKE (`char` on `MySQL`, `text` elsewhere).
    pub fn backend(mut self, backend: DbBackend) -> Self {
        self.text_type = if backend == DbBackend::MySql { "char" } else { "text" };
        self
    }

    /// Root fields to project and group by. Duplicates are dropped, first
    /// occurrence wins.
    pub fn group_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Sort keys, applied in order.
    pub fn sort<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = SortKey>,
    {
        self.sort.extend(keys);
        self
    }

    /// Externally supplied predicate, combined with the filters under the
    /// same link.
    pub fn condition(mut self, condition: impl IntoCondition) -> Self {
        self.conditions.push(condition.into_condition());
        self
    }

    /// Translate `filters` into a plan.
    ///
    /// # Errors
    /// The first failing filter aborts the build: `UnresolvableFieldPath`,
    /// `MalformedSearchValue` or `SchemaMismatch`.
    pub fn build<'f, I>(self, filters: I) -> SearchResult<SearchPlan>
    where
        I: IntoIterator<Item = &'f SearchFilter>,
    {
        let root = Arc::clone(self.registry.require(&self.root)?);
        let mut cache = JoinCache::new();
        let mut predicates: Vec<Condition> = Vec::new();

        for filter in filters {
            let field = cache.resolve(self.registry, &root, filter.field_path())?;
            let predicate = predicate_for(filter, &field, self.text_type).inspect_err(|e| {
                tracing::debug!(
                    path = filter.field_path(),
                    operator = %filter.operator(),
                    error = %e,
                    "search filter rejected"
                );
            })?;
            predicates.push(predicate.into_condition());
        }
        let filter_count = predicates.len();

        predicates.extend(self.conditions);
        let condition = (!predicates.is_empty()).then(|| {
            let composed = match self.link {
                LinkType::And => Condition::all(),
                LinkType::Or => Condition::any(),
            };
            predicates.into_iter().fold(composed, Condition::add)
        });

        let group_by = group_columns(&root, &self.group_fields)?;
        let order_by = self
            .sort
            .iter()
            .map(|key| {
                let column = root_column(&root, &key.field, "sort")?;
                let order = if key.descending { Order::Desc } else { Order::Asc };
                Ok((column, order))
            })
            .collect::<SearchResult<Vec<_>>>()?;
        let joins = cache.into_clauses();
        // A to-many join repeats the root row once per matching child.
        let distinct = group_by.is_empty()
            && joins.iter().any(|j| j.cardinality == Cardinality::ToMany);

        tracing::debug!(
            root = root.table(),
            filters = filter_count,
            joins = joins.len(),
            link = %self.link,
            grouped = !group_by.is_empty(),
            distinct,
            "search plan built"
        );

        Ok(SearchPlan {
            root_alias: root.table().to_owned(),
            joins,
            condition,
            group_by,
            order_by,
            distinct,
            filter_count,
        })
    }
}

fn root_column(root: &EntitySchema, name: &str, purpose: &str) -> SearchResult<String> {
    match root.field(name) {
        Some(FieldDef::Scalar { column, .. }) => Ok(column.clone()),
        Some(_) => Err(SearchError::unresolvable(
            name,
            format!("{purpose} fields must be scalar fields of the root entity"),
        )),
        None => Err(SearchError::unresolvable(
            name,
            format!("'{name}' is not a field of '{}'", root.table()),
        )),
    }
}

fn group_columns(root: &EntitySchema, fields: &[String]) -> SearchResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for name in fields {
        if seen.insert(name.as_str()) {
            columns.push(root_column(root, name, "group")?);
        }
    }
    Ok(columns)
}

fn predicate_for(
    filter: &SearchFilter,
    field: &ResolvedField,
    text_type: &str,
) -> SearchResult<SimpleExpr> {
    let col = Expr::col((Alias::new(&field.alias), Alias::new(&field.column)));

    Ok(match filter.operator() {
        Operator::Eq => col.eq(scalar_value(filter, field)?),
        Operator::Like => {
            let pattern = LikeExpr::new(like_contains(&like_text(filter, field)?)).escape('\\');
            match field.leaf {
                Leaf::Scalar(kind) if !kind.is_text() => {
                    Expr::expr(col.cast_as(Alias::new(text_type))).like(pattern)
                }
                _ => col.like(pattern),
            }
        }
        Operator::Gt => col.gt(ordered_value(filter, field)?),
        Operator::Lt => col.lt(ordered_value(filter, field)?),
        Operator::Gte => col.gte(ordered_value(filter, field)?),
        Operator::Lte => col.lte(ordered_value(filter, field)?),
        Operator::In => col.is_in(member_values(filter, field)?),
        Operator::IsNull => col.is_null(),
        Operator::IsNotNull => col.is_not_null(),
    })
}

/// Raw value and scalar kind a value operator compares against.
fn operand<'a>(
    filter: &'a SearchFilter,
    field: &ResolvedField,
) -> SearchResult<(&'a RawValue, FieldKind)> {
    let path = filter.field_path();
    let Some(raw) = filter.value() else {
        return Err(SearchError::malformed(
            path,
            format!("{} requires a value", filter.operator()),
        ));
    };
    match field.leaf {
        Leaf::Scalar(kind) => Ok((raw, kind)),
        Leaf::Relation => Err(SearchError::malformed(
            path,
            format!(
                "{} cannot be applied to a relation, use ISNULL or ISNOTNULL",
                filter.operator()
            ),
        )),
    }
}

fn scalar_value(filter: &SearchFilter, field: &ResolvedField) -> SearchResult<Value> {
    let (raw, kind) = operand(filter, field)?;
    coerce(raw, kind).map_err(|e| SearchError::malformed(filter.field_path(), e.to_string()))
}

fn ordered_value(filter: &SearchFilter, field: &ResolvedField) -> SearchResult<Value> {
    let (_, kind) = operand(filter, field)?;
    if !kind.is_ordered() {
        return Err(SearchError::malformed(
            filter.field_path(),
            format!("{kind} values are not order-comparable"),
        ));
    }
    scalar_value(filter, field)
}

fn member_values(filter: &SearchFilter, field: &ResolvedField) -> SearchResult<Vec<Value>> {
    let (raw, kind) = operand(filter, field)?;
    coerce_many(raw, kind).map_err(|e| SearchError::malformed(filter.field_path(), e.to_string()))
}

/// LIKE works on the raw text whatever the declared kind.
fn like_text(filter: &SearchFilter, field: &ResolvedField) -> SearchResult<String> {
    let (raw, _) = operand(filter, field)?;
    match raw {
        RawValue::List(items) => match items.as_slice() {
            [single] => Ok(single.clone()),
            _ => Err(SearchError::malformed(
                filter.field_path(),
                "LIKE takes a single value",
            )),
        },
        other => Ok(other.to_string()),
    }
}

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}

fn like_contains(s: &str) -> String {
    format!("%{}%", like_escape(s))
}

/// Joins, condition and grouping for one search, ready to attach to a query.
#[derive(Clone, Debug)]
pub struct SearchPlan {
    root_alias: String,
    joins: Vec<JoinClause>,
    condition: Option<Condition>,
    group_by: Vec<String>,
    order_by: Vec<(String, Order)>,
    distinct: bool,
    filter_count: usize,
}

impl SearchPlan {
    /// Install joins, the composed condition and grouping on `stmt`.
    ///
    /// With no filters and no external predicates nothing is added to the
    /// WHERE clause.
    pub fn apply(&self, stmt: &mut SelectStatement) {
        if self.distinct {
            stmt.distinct();
        }

        for join in &self.joins {
            stmt.join_as(
                JoinType::LeftJoin,
                Alias::new(&join.table),
                Alias::new(&join.alias),
                Expr::col((Alias::new(&join.left_alias), Alias::new(&join.left_col)))
                    .equals((Alias::new(&join.alias), Alias::new(&join.right_col))),
            );
        }

        if let Some(condition) = &self.condition {
            stmt.cond_where(condition.clone());
        }

        if !self.group_by.is_empty() {
            stmt.clear_selects();
            for column in &self.group_by {
                stmt.column((Alias::new(&self.root_alias), Alias::new(column)));
                stmt.group_by_col((Alias::new(&self.root_alias), Alias::new(column)));
            }
        }

        for (column, order) in &self.order_by {
            stmt.order_by((Alias::new(&self.root_alias), Alias::new(column)), order.clone());
        }
    }

    /// Table name the root entity is addressed by.
    #[must_use]
    pub fn root_alias(&self) -> &str {
        &self.root_alias
    }

    /// Join clauses in creation order.
    #[must_use]
    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    #[must_use]
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Root columns projected and grouped, in order.
    #[must_use]
    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    /// Root columns sorted on, in order.
    #[must_use]
    pub fn order_by(&self) -> &[(String, Order)] {
        &self.order_by
    }

    /// `true` when a to-many join forces `SELECT DISTINCT` on the root row.
    #[must_use]
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Number of parsed filters turned into predicates.
    #[must_use]
    pub fn filter_count(&self) -> usize {
        self.filter_count
    }
}
