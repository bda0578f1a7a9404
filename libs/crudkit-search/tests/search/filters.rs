use crudkit_search::{LinkType, SearchError, SearchExt, SearchParams};
use sea_orm::{DbBackend, EntityTrait, QueryTrait};

use crate::support::{ids, pair, person, registry, seed_pairs, seed_people, setup_sqlite_db};

async fn pairs(params: &SearchParams, link: LinkType) -> Vec<i64> {
    let conn = setup_sqlite_db().await.unwrap();
    seed_pairs(&conn).await.unwrap();
    let rows = pair::Entity::find()
        .apply_search(&registry(), params, link)
        .unwrap()
        .all(&conn)
        .await
        .unwrap();
    ids(&rows, |r| r.id)
}

#[tokio::test]
async fn and_link_requires_every_filter() {
    let params = SearchParams::new().with("EQ_a", "1").with("EQ_b", "2");

    assert!(pairs(&params, LinkType::And).await.is_empty());
}

#[tokio::test]
async fn or_link_requires_any_filter() {
    let params = SearchParams::new().with("EQ_a", "1").with("EQ_b", "2");

    assert_eq!(pairs(&params, LinkType::Or).await, vec![1, 2]);
}

#[tokio::test]
async fn like_is_an_unanchored_substring_match() {
    let params = SearchParams::new().with("LIKE_label", "abc");

    assert_eq!(pairs(&params, LinkType::And).await, vec![1, 2]);
}

#[tokio::test]
async fn like_treats_wildcards_literally() {
    let params = SearchParams::new().with("LIKE_label", "a_c");

    assert!(pairs(&params, LinkType::And).await.is_empty());
}

#[tokio::test]
async fn ordering_operators_compare_numerically() {
    let gt = SearchParams::new().with("GT_b", "2");
    let lte = SearchParams::new().with("LTE_b", "2");
    let gte = SearchParams::new().with("GTE_a", "9").with("LT_b", "9");

    assert_eq!(pairs(&gt, LinkType::And).await, vec![1, 3]);
    assert_eq!(pairs(&lte, LinkType::And).await, vec![2]);
    assert_eq!(pairs(&gte, LinkType::And).await, vec![2]);
}

#[tokio::test]
async fn in_matches_any_listed_value() {
    let params = SearchParams::from_pairs([("IN_b", "2"), ("IN_b", "7")]);

    assert_eq!(pairs(&params, LinkType::And).await, vec![2]);
}

#[tokio::test]
async fn empty_values_are_ignored() {
    let params = SearchParams::from_pairs([("EQ_a", ""), ("GT_b", "5")]);

    assert_eq!(pairs(&params, LinkType::And).await, vec![1, 3]);
}

#[tokio::test]
async fn null_checks_on_nullable_column() {
    let conn = setup_sqlite_db().await.unwrap();
    seed_people(&conn).await.unwrap();
    let reg = registry();

    let without = person::Entity::find()
        .apply_search(&reg, &SearchParams::new().with_null("ISNULL_account"), LinkType::And)
        .unwrap()
        .all(&conn)
        .await
        .unwrap();
    let with = person::Entity::find()
        .apply_search(&reg, &SearchParams::new().with_null("ISNOTNULL_account"), LinkType::And)
        .unwrap()
        .all(&conn)
        .await
        .unwrap();

    assert_eq!(ids(&without, |p| p.id), vec![3]);
    assert_eq!(ids(&with, |p| p.id), vec![1, 2]);
}

#[tokio::test]
async fn enum_values_are_checked_against_the_domain() {
    let conn = setup_sqlite_db().await.unwrap();
    seed_people(&conn).await.unwrap();
    let reg = registry();

    let locked = person::Entity::find()
        .apply_search(&reg, &SearchParams::new().with("EQ_status", "Locked"), LinkType::And)
        .unwrap()
        .all(&conn)
        .await
        .unwrap();
    let err = person::Entity::find()
        .apply_search(&reg, &SearchParams::new().with("EQ_status", "Gone"), LinkType::And)
        .unwrap_err();

    assert_eq!(ids(&locked, |p| p.id), vec![2]);
    assert!(matches!(err, SearchError::MalformedSearchValue { .. }));
}

#[test]
fn malformed_number_leaves_query_untouched() {
    let reg = registry();
    let base = person::Entity::find();
    let before = base.clone().build(DbBackend::Sqlite).to_string();

    let err = base
        .clone()
        .apply_search(&reg, &SearchParams::new().with("EQ_age", "notanumber"), LinkType::And)
        .unwrap_err();

    assert!(matches!(err, SearchError::MalformedSearchValue { ref field, .. } if field == "age"));
    assert_eq!(base.build(DbBackend::Sqlite).to_string(), before);
}

#[test]
fn unknown_operator_is_rejected() {
    let err = person::Entity::find()
        .apply_search(&registry(), &SearchParams::new().with("XX_name", "bob"), LinkType::And)
        .unwrap_err();

    assert!(matches!(err, SearchError::InvalidOperator { ref token, .. } if token == "XX"));
}

#[test]
fn key_without_operator_is_rejected() {
    let err = person::Entity::find()
        .apply_search(&registry(), &SearchParams::new().with("name", "bob"), LinkType::And)
        .unwrap_err();

    assert!(matches!(err, SearchError::InvalidFilterKey { .. }));
}
