use crudkit_search::{
    LinkType, PageRequest, SearchConfig, SearchError, SearchParams, SearchService, SortKey,
};
use sea_orm::ConnectionTrait;

use crate::support::{ids, person, registry, seed_people, setup_sqlite_db};

fn service() -> SearchService {
    SearchService::new(registry(), SearchConfig::default())
}

#[tokio::test]
async fn find_all_ands_and_find_all_quick_ors() {
    let conn = setup_sqlite_db().await.unwrap();
    seed_people(&conn).await.unwrap();
    let svc = service();
    let params = SearchParams::new().with("EQ_city", "Oslo").with("EQ_status", "Active");

    let all = svc.find_all::<person::Entity, _>(&conn, &params).await.unwrap();
    let quick = svc.find_all_quick::<person::Entity, _>(&conn, &params).await.unwrap();

    assert_eq!(ids(&all, |p| p.id), vec![1]);
    assert_eq!(ids(&quick, |p| p.id), vec![1, 2, 3]);
}

#[tokio::test]
async fn find_one_returns_first_match_or_none() {
    let conn = setup_sqlite_db().await.unwrap();
    seed_people(&conn).await.unwrap();
    let svc = service();

    let by_account = SearchParams::new().with("EQ_account.username", "bob");

    let bob = svc
        .find_one::<person::Entity, _>(&conn, &by_account)
        .await
        .unwrap();
    let nobody = svc
        .find_one::<person::Entity, _>(&conn, &SearchParams::new().with("EQ_name", "dave"))
        .await
        .unwrap();

    assert_eq!(bob.map(|p| p.id), Some(2));
    assert!(nobody.is_none());
}

#[tokio::test]
async fn sorted_find_all_orders_rows() {
    let conn = setup_sqlite_db().await.unwrap();
    seed_people(&conn).await.unwrap();
    let svc = service();

    let rows = svc
        .find_all_linked::<person::Entity, _>(
            &conn,
            &SearchParams::new(),
            LinkType::And,
            &[SortKey::desc("age")],
        )
        .await
        .unwrap();

    let order: Vec<i64> = rows.iter().map(|p| p.id).collect();
    assert_eq!(order, vec![2, 1, 3]);
}

#[tokio::test]
async fn find_page_reports_totals() {
    let conn = setup_sqlite_db().await.unwrap();
    seed_people(&conn).await.unwrap();
    let svc = service();
    let request = PageRequest::new(1, 2).sorted(SortKey::asc("name"));

    let page = svc
        .find_page::<person::Entity, _>(
            &conn,
            &SearchParams::new().with("GT_age", "20"),
            LinkType::And,
            &request,
        )
        .await
        .unwrap();

    assert_eq!(page.page_info.total_items, 3);
    assert_eq!(page.page_info.total_pages, 2);
    assert_eq!(page.page_info.size, 2);
    assert_eq!(page.items.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["carol"]);
}

#[tokio::test]
async fn to_many_matches_return_each_root_once() {
    // Arrange: alice holds admin and dev, bob holds dev
    let conn = setup_sqlite_db().await.unwrap();
    seed_people(&conn).await.unwrap();
    let svc = service();
    let params = SearchParams::new().with("LIKE_roles.name", "d");

    // Act
    let all = svc.find_all::<person::Entity, _>(&conn, &params).await.unwrap();
    let page = svc
        .find_page::<person::Entity, _>(&conn, &params, LinkType::And, &PageRequest::new(0, 10))
        .await
        .unwrap();

    // Assert
    assert_eq!(ids(&all, |p| p.id), vec![1, 2]);
    assert_eq!(ids(&page.items, |p| p.id), vec![1, 2]);
    assert_eq!(page.page_info.total_items, 2);
    assert_eq!(page.page_info.total_pages, 1);
}

#[tokio::test]
async fn limits_are_enforced_before_querying() {
    let conn = setup_sqlite_db().await.unwrap();
    let svc = SearchService::new(
        registry(),
        SearchConfig {
            max_path_depth: 1,
            ..SearchConfig::default()
        },
    );

    let deep = SearchParams::new().with("EQ_account.username", "bob");

    let err = svc
        .find_all::<person::Entity, _>(&conn, &deep)
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::LimitExceeded(_)));
}

#[tokio::test]
async fn prefixed_request_pairs_drive_a_search() {
    let conn = setup_sqlite_db().await.unwrap();
    seed_people(&conn).await.unwrap();
    let svc = service();
    let params = svc.config().params([
        ("search_LIKE_name", "o"),
        ("search_EQ_city", "Oslo"),
        ("page", "3"),
    ]);

    let rows = svc.find_all::<person::Entity, _>(&conn, &params).await.unwrap();

    assert_eq!(ids(&rows, |p| p.id), vec![2]);
}

#[tokio::test]
async fn database_errors_surface_as_db() {
    let conn = setup_sqlite_db().await.unwrap();
    let svc = service();
    conn.execute_unprepared("DROP TABLE role").await.unwrap();

    let err = svc
        .find_all::<person::Entity, _>(&conn, &SearchParams::new().with("EQ_roles.name", "dev"))
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Db(_)));
    assert!(!err.is_client_error());
}
