use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use crudkit_search::{EntitySchema, FieldKind, SchemaRegistry};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Set};

pub const STATUS: FieldKind = FieldKind::Enum(&["Active", "Locked"]);

pub mod person {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "person")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub name: String,
        pub age: i32,
        pub status: String,
        pub city: String,
        pub account_id: Option<i64>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod account {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "account")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub username: String,
        pub created_on: Date,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod role {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "role")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub person_id: i64,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod team {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "team")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod person_team {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "person_team")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub person_id: i64,
        #[sea_orm(primary_key, auto_increment = false)]
        pub team_id: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod pair {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "pair")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub a: i32,
        pub b: i32,
        pub label: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Single-connection in-memory database; every pooled connection would
/// otherwise open its own empty database.
pub async fn setup_sqlite_db() -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(opts).await?;
    create_schema(&conn).await?;
    Ok(conn)
}

async fn create_schema(conn: &DatabaseConnection) -> Result<()> {
    for ddl in [
        "CREATE TABLE account (
id INTEGER PRIMARY KEY NOT NULL,
username TEXT NOT NULL,
created_on TEXT NOT NULL
)",
        "CREATE TABLE person (
id INTEGER PRIMARY KEY NOT NULL,
name TEXT NOT NULL,
age INTEGER NOT NULL,
status TEXT NOT NULL,
city TEXT NOT NULL,
account_id INTEGER NULL REFERENCES account(id)
)",
        "CREATE TABLE role (
id INTEGER PRIMARY KEY NOT NULL,
person_id INTEGER NOT NULL REFERENCES person(id),
name TEXT NOT NULL
)",
        "CREATE TABLE team (
id INTEGER PRIMARY KEY NOT NULL,
name TEXT NOT NULL
)",
        "CREATE TABLE person_team (
person_id INTEGER NOT NULL REFERENCES person(id),
team_id INTEGER NOT NULL REFERENCES team(id),
PRIMARY KEY (person_id, team_id)
)",
        "CREATE TABLE pair (
id INTEGER PRIMARY KEY NOT NULL,
a INTEGER NOT NULL,
b INTEGER NOT NULL,
label TEXT NOT NULL
)",
    ] {
        conn.execute_unprepared(ddl).await?;
    }
    Ok(())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// alice (account alice, roles admin+dev, team red), bob (account bob,
/// role dev, teams red+blue), carol (no account, no roles, team blue).
pub async fn seed_people(conn: &DatabaseConnection) -> Result<()> {
    let accounts = [
        (10, "alice", date(2023, 5, 1)),
        (20, "bob", date(2024, 2, 15)),
    ];
    for (id, username, created_on) in accounts {
        account::Entity::insert(account::ActiveModel {
            id: Set(id),
            username: Set(username.to_owned()),
            created_on: Set(created_on),
        })
        .exec(conn)
        .await?;
    }

    for (id, name, age, status, city, account_id) in [
        (1, "alice", 31, "Active", "Oslo", Some(10)),
        (2, "bob", 45, "Locked", "Oslo", Some(20)),
        (3, "carol", 27, "Active", "Bergen", None),
    ] {
        person::Entity::insert(person::ActiveModel {
            id: Set(id),
            name: Set(name.to_owned()),
            age: Set(age),
            status: Set(status.to_owned()),
            city: Set(city.to_owned()),
            account_id: Set(account_id),
        })
        .exec(conn)
        .await?;
    }

    for (id, person_id, name) in [(100, 1, "admin"), (101, 1, "dev"), (102, 2, "dev")] {
        role::Entity::insert(role::ActiveModel {
            id: Set(id),
            person_id: Set(person_id),
            name: Set(name.to_owned()),
        })
        .exec(conn)
        .await?;
    }

    for (id, name) in [(7, "red"), (8, "blue")] {
        team::Entity::insert(team::ActiveModel {
            id: Set(id),
            name: Set(name.to_owned()),
        })
        .exec(conn)
        .await?;
    }

    for (person_id, team_id) in [(1, 7), (2, 7), (2, 8), (3, 8)] {
        person_team::Entity::insert(person_team::ActiveModel {
            person_id: Set(person_id),
            team_id: Set(team_id),
        })
        .exec(conn)
        .await?;
    }
    Ok(())
}

/// {a:1,b:9}, {a:9,b:2}, {a:9,b:9}
pub async fn seed_pairs(conn: &DatabaseConnection) -> Result<()> {
    for (id, a, b, label) in [(1, 1, 9, "xabcx"), (2, 9, 2, "abc"), (3, 9, 9, "zzz")] {
        pair::Entity::insert(pair::ActiveModel {
            id: Set(id),
            a: Set(a),
            b: Set(b),
            label: Set(label.to_owned()),
        })
        .exec(conn)
        .await?;
    }
    Ok(())
}

pub fn registry() -> Arc<SchemaRegistry> {
    let registry = SchemaRegistry::new()
        .with(
            EntitySchema::of::<person::Entity>()
                .scalar("id", person::Column::Id, FieldKind::I64)
                .scalar("name", person::Column::Name, FieldKind::String)
                .scalar("age", person::Column::Age, FieldKind::I32)
                .scalar("status", person::Column::Status, STATUS)
                .scalar("city", person::Column::City, FieldKind::String)
                .to_one::<account::Entity>(
                    "account",
                    person::Column::AccountId,
                    account::Column::Id,
                )
                .to_many::<role::Entity>("roles", person::Column::Id, role::Column::PersonId)
                .many_to_many::<team::Entity, person_team::Entity>(
                    "teams",
                    person::Column::Id,
                    person_team::Column::PersonId,
                    person_team::Column::TeamId,
                    team::Column::Id,
                ),
        )
        .with(
            EntitySchema::of::<account::Entity>()
                .scalar("username", account::Column::Username, FieldKind::String)
                .scalar("createdOn", account::Column::CreatedOn, FieldKind::Date),
        )
        .with(
            EntitySchema::of::<role::Entity>()
                .scalar("name", role::Column::Name, FieldKind::String),
        )
        .with(
            EntitySchema::of::<team::Entity>()
                .scalar("name", team::Column::Name, FieldKind::String),
        )
        .with(
            EntitySchema::of::<pair::Entity>()
                .scalar("a", pair::Column::A, FieldKind::I32)
                .scalar("b", pair::Column::B, FieldKind::I32)
                .scalar("label", pair::Column::Label, FieldKind::String),
        );
    Arc::new(registry)
}

/// Sorted ids of `rows`, duplicates kept.
pub fn ids<T>(rows: &[T], id: impl Fn(&T) -> i64) -> Vec<i64> {
    let mut ids: Vec<i64> = rows.iter().map(id).collect();
    ids.sort_unstable();
    ids
}
