use sea_orm::sea_query::SelectStatement;
use sea_orm::{EntityTrait, QueryTrait};

use crate::builder::{PredicateBuilder, SearchPlan};
use crate::error::SearchResult;
use crate::filter::{LinkType, parse_search_filters};
use crate::params::SearchParams;
use crate::schema::SchemaRegistry;

/// Attach search plans to `SeaORM` selects.
pub trait SearchExt<E: EntityTrait>: Sized {
    /// Install an already built plan. Never fails.
    #[must_use]
    fn apply_search_plan(self, plan: &SearchPlan) -> Self;

    /// Parse `params`, build a plan rooted at `E` and install it.
    ///
    /// # Errors
    /// Any parse or build error; the select is dropped untouched.
    fn apply_search(
        self,
        registry: &SchemaRegistry,
        params: &SearchParams,
        link: LinkType,
    ) -> SearchResult<Self>;
}

impl<E> SearchExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
{
    fn apply_search_plan(mut self, plan: &SearchPlan) -> Self {
        plan.apply(QueryTrait::query(&mut self));
        self
    }

    fn apply_search(
        self,
        registry: &SchemaRegistry,
        params: &SearchParams,
        link: LinkType,
    ) -> SearchResult<Self> {
        let filters = parse_search_filters(params)?;
        let plan = PredicateBuilder::for_entity::<E>(registry)
            .link(link)
            .build(filters.values())?;
        Ok(self.apply_search_plan(&plan))
    }
}

/// Plain `sea-query` statements.
pub trait SearchStatementExt {
    fn with_search_plan(self, plan: &SearchPlan) -> Self;
}

impl SearchStatementExt for SelectStatement {
    fn with_search_plan(mut self, plan: &SearchPlan) -> Self {
        plan.apply(&mut self);
        self
    }
}
