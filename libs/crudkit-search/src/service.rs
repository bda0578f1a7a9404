//! Read-side query service: search parameters in, models out.

use std::sync::Arc;

use sea_orm::{
    ConnectionTrait, DbBackend, EntityTrait, ItemsAndPagesNumber, PaginatorTrait, Select,
};
use serde::{Deserialize, Serialize};

use crate::builder::{PredicateBuilder, SearchPlan, SortKey};
use crate::config::SearchConfig;
use crate::error::SearchResult;
use crate::ext::SearchExt;
use crate::filter::{LinkType, parse_search_filters};
use crate::params::SearchParams;
use crate::schema::SchemaRegistry;

/// Zero-based page request. `size` falls back to the configured default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub sort: Vec<SortKey>,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size: Some(size),
            sort: Vec::new(),
        }
    }

    #[must_use]
    pub fn sorted(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u64,
    pub size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

/// Searches entities described by a shared [`SchemaRegistry`].
#[derive(Clone, Debug)]
pub struct SearchService {
    registry: Arc<SchemaRegistry>,
    config: SearchConfig,
}

impl SearchService {
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>, config: SearchConfig) -> Self {
        Self { registry, config }
    }

    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Parse, check limits and build a plan rooted at `E`.
    ///
    /// # Errors
    /// Any parse, limit or build error.
    pub fn plan<E: EntityTrait>(
        &self,
        params: &SearchParams,
        link: LinkType,
    ) -> SearchResult<SearchPlan> {
        self.plan_with::<E, _>(params, link, |b| b)
    }

    /// Like [`SearchService::plan`], letting the caller add grouping, sort
    /// keys or external predicates to the builder first.
    ///
    /// # Errors
    /// Any parse, limit or build error.
    pub fn plan_with<E, F>(
        &self,
        params: &SearchParams,
        link: LinkType,
        customize: F,
    ) -> SearchResult<SearchPlan>
    where
        E: EntityTrait,
        F: for<'r> FnOnce(PredicateBuilder<'r>) -> PredicateBuilder<'r>,
    {
        let filters = parse_search_filters(params)?;
        self.config.validate_filters(filters.values())?;
        customize(PredicateBuilder::for_entity::<E>(&self.registry).link(link))
            .build(filters.values())
    }

    fn plan_on<E, F>(
        &self,
        backend: DbBackend,
        params: &SearchParams,
        link: LinkType,
        customize: F,
    ) -> SearchResult<SearchPlan>
    where
        E: EntityTrait,
        F: for<'r> FnOnce(PredicateBuilder<'r>) -> PredicateBuilder<'r>,
    {
        self.plan_with::<E, _>(params, link, |b| customize(b.backend(backend)))
    }

    /// `E::find()` with the search installed.
    ///
    /// # Errors
    /// Any parse, limit or build error.
    pub fn select<E: EntityTrait>(
        &self,
        params: &SearchParams,
        link: LinkType,
    ) -> SearchResult<Select<E>> {
        Ok(E::find().apply_search_plan(&self.plan::<E>(params, link)?))
    }

    /// Every match, filters combined with the configured default link.
    ///
    /// # Errors
    /// Search errors, or `Db` when the query fails.
    pub async fn find_all<E, C>(
        &self,
        conn: &C,
        params: &SearchParams,
    ) -> SearchResult<Vec<E::Model>>
    where
        E: EntityTrait,
        C: ConnectionTrait,
    {
        self.find_all_linked::<E, C>(conn, params, self.config.default_link, &[])
            .await
    }

    /// Every match, filters combined with OR.
    ///
    /// # Errors
    /// Search errors, or `Db` when the query fails.
    pub async fn find_all_quick<E, C>(
        &self,
        conn: &C,
        params: &SearchParams,
    ) -> SearchResult<Vec<E::Model>>
    where
        E: EntityTrait,
        C: ConnectionTrait,
    {
        self.find_all_linked::<E, C>(conn, params, LinkType::Or, &[]).await
    }

    /// Every match, sorted.
    ///
    /// # Errors
    /// Search errors, or `Db` when the query fails.
    pub async fn find_all_linked<E, C>(
        &self,
        conn: &C,
        params: &SearchParams,
        link: LinkType,
        sort: &[SortKey],
    ) -> SearchResult<Vec<E::Model>>
    where
        E: EntityTrait,
        C: ConnectionTrait,
    {
        let backend = conn.get_database_backend();
        let plan = self.plan_on::<E, _>(backend, params, link, |b| b.sort(sort.iter().cloned()))?;
        let rows = E::find().apply_search_plan(&plan).all(conn).await?;
        tracing::debug!(
            rows = rows.len(),
            filters = plan.filter_count(),
            %link,
            "search completed"
        );
        Ok(rows)
    }

    /// First match, filters combined with AND.
    ///
    /// # Errors
    /// Search errors, or `Db` when the query fails.
    pub async fn find_one<E, C>(
        &self,
        conn: &C,
        params: &SearchParams,
    ) -> SearchResult<Option<E::Model>>
    where
        E: EntityTrait,
        C: ConnectionTrait,
    {
        let plan = self.plan_on::<E, _>(conn.get_database_backend(), params, LinkType::And, |b| b)?;
        Ok(E::find().apply_search_plan(&plan).one(conn).await?)
    }

    /// One page of matches plus the total count.
    ///
    /// # Errors
    /// Search errors, or `Db` when a query fails.
    pub async fn find_page<E, C>(
        &self,
        conn: &C,
        params: &SearchParams,
        link: LinkType,
        request: &PageRequest,
    ) -> SearchResult<Page<E::Model>>
    where
        E: EntityTrait,
        E::Model: Sync + 'static,
        C: ConnectionTrait,
    {
        let size = self.config.clamp_page_size(request.size);
        let backend = conn.get_database_backend();
        let plan = self.plan_on::<E, _>(backend, params, link, |b| {
            b.sort(request.sort.iter().cloned())
        })?;
        let paginator = E::find().apply_search_plan(&plan).paginate(conn, size);

        let ItemsAndPagesNumber {
            number_of_items,
            number_of_pages,
        } = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(request.page).await?;

        tracing::debug!(
            page = request.page,
            size,
            total = number_of_items,
            "search page fetched"
        );

        Ok(Page {
            items,
            page_info: PageInfo {
                page: request.page,
                size,
                total_items: number_of_items,
                total_pages: number_of_pages,
            },
        })
    }
}
