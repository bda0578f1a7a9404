//! Static field-metadata tables.
//!
//! Every searchable entity is described once by an [`EntitySchema`]: its table
//! and, per API field name, whether the field is a scalar column, a to-one
//! relation or a to-many relation. The join-path resolver walks these tables
//! instead of inspecting types at runtime.
//!
//! ```
//! use crudkit_search::{EntitySchema, FieldKind, SchemaRegistry};
//!
//! let registry = SchemaRegistry::new()
//!     .with(
//!         EntitySchema::new("person")
//!             .scalar_column("name", "name", FieldKind::String)
//!             .to_one_table("account", "account", "account_id", "id"),
//!     )
//!     .with(
//!         EntitySchema::new("account")
//!             .scalar_column("username", "username", FieldKind::String),
//!     );
//!
//! assert!(registry.validate().is_ok());
//! assert!(registry.get("person").unwrap().field("account").unwrap().is_relation());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait};

use crate::error::{SearchError, SearchResult};
use crate::kind::FieldKind;

/// Junction table of a many-to-many relation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Junction {
    pub table: String,
    /// Junction column holding the owner's key.
    pub owner_col: String,
    /// Junction column holding the target's key.
    pub target_col: String,
}

/// How an owner row reaches its related rows.
///
/// Direct: `owner.from_col = target.to_col`.
/// Through a junction: `owner.from_col = junction.owner_col` and
/// `junction.target_col = target.to_col`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relation {
    pub target: String,
    pub from_col: String,
    pub to_col: String,
    pub via: Option<Junction>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldDef {
    Scalar { column: String, kind: FieldKind },
    ToOne(Relation),
    ToMany(Relation),
}

impl FieldDef {
    #[must_use]
    pub fn is_relation(&self) -> bool {
        !matches!(self, FieldDef::Scalar { .. })
    }
}

/// Field-metadata table of one entity.
#[derive(Clone, Debug)]
#[must_use]
pub struct EntitySchema {
    table: String,
    fields: HashMap<String, FieldDef>,
}

impl EntitySchema {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: HashMap::new(),
        }
    }

    /// Schema named after a `SeaORM` entity's table.
    pub fn of<E: EntityTrait>() -> Self {
        Self::new(E::default().table_name())
    }

    pub fn insert(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    pub fn scalar_column(
        self,
        name: impl Into<String>,
        column: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        self.insert(
            name,
            FieldDef::Scalar {
                column: column.into(),
                kind,
            },
        )
    }

    pub fn to_one_table(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        from_col: impl Into<String>,
        to_col: impl Into<String>,
    ) -> Self {
        self.insert(
            name,
            FieldDef::ToOne(Relation {
                target: target.into(),
                from_col: from_col.into(),
                to_col: to_col.into(),
                via: None,
            }),
        )
    }

    pub fn to_many_table(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        from_col: impl Into<String>,
        to_col: impl Into<String>,
    ) -> Self {
        self.insert(
            name,
            FieldDef::ToMany(Relation {
                target: target.into(),
                from_col: from_col.into(),
                to_col: to_col.into(),
                via: None,
            }),
        )
    }

    /// Scalar field backed by a `SeaORM` column.
    pub fn scalar(self, name: impl Into<String>, col: impl ColumnTrait, kind: FieldKind) -> Self {
        self.scalar_column(name, col.as_str(), kind)
    }

    /// To-one relation: `owner.from = T.to`.
    pub fn to_one<T: EntityTrait>(
        self,
        name: impl Into<String>,
        from: impl ColumnTrait,
        to: impl ColumnTrait,
    ) -> Self {
        self.to_one_table(name, T::default().table_name(), from.as_str(), to.as_str())
    }

    /// One-to-many relation: `owner.from = T.to`.
    pub fn to_many<T: EntityTrait>(
        self,
        name: impl Into<String>,
        from: impl ColumnTrait,
        to: impl ColumnTrait,
    ) -> Self {
        self.to_many_table(name, T::default().table_name(), from.as_str(), to.as_str())
    }

    /// Many-to-many relation through junction entity `J`:
    /// `owner.from = J.owner_col` and `J.target_col = T.to`.
    pub fn many_to_many<T: EntityTrait, J: EntityTrait>(
        self,
        name: impl Into<String>,
        from: impl ColumnTrait,
        owner_col: impl ColumnTrait,
        target_col: impl ColumnTrait,
        to: impl ColumnTrait,
    ) -> Self {
        self.insert(
            name,
            FieldDef::ToMany(Relation {
                target: T::default().table_name().to_owned(),
                from_col: from.as_str().to_owned(),
                to_col: to.as_str().to_owned(),
                via: Some(Junction {
                    table: J::default().table_name().to_owned(),
                    owner_col: owner_col.as_str().to_owned(),
                    target_col: target_col.as_str().to_owned(),
                }),
            }),
        )
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Field names are matched exactly.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDef)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// All entity schemas reachable by search, keyed by table name.
///
/// Immutable once built and shared between concurrent searches.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct SchemaRegistry {
    entities: HashMap<String, Arc<EntitySchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a schema.
    pub fn with(mut self, schema: EntitySchema) -> Self {
        self.entities
            .insert(schema.table.clone(), Arc::new(schema));
        self
    }

    #[must_use]
    pub fn get(&self, table: &str) -> Option<&Arc<EntitySchema>> {
        self.entities.get(table)
    }

    /// Look up a schema, treating a miss as misconfiguration.
    ///
    /// # Errors
    /// `SchemaMismatch` when `table` is not registered.
    pub fn require(&self, table: &str) -> SearchResult<&Arc<EntitySchema>> {
        self.get(table).ok_or_else(|| {
            SearchError::SchemaMismatch(format!("no schema registered for '{table}'"))
        })
    }

    /// Check that every relation points at a registered entity.
    ///
    /// # Errors
    /// `SchemaMismatch` naming the first dangling relation.
    pub fn validate(&self) -> SearchResult<()> {
        for schema in self.entities.values() {
            for (name, def) in schema.fields() {
                if let FieldDef::ToOne(rel) | FieldDef::ToMany(rel) = def
                    && !self.entities.contains_key(&rel.target)
                {
                    return Err(SearchError::SchemaMismatch(format!(
                        "{}.{name} points at unregistered entity '{}'",
                        schema.table, rel.target
                    )));
                }
            }
        }
        Ok(())
    }
}
