//! Search configuration, read from the `search` section of the application
//! figment.
//!
//! ```yaml
//! search:
//!   param_prefix: "search_"
//!   default_link: and
//!   max_filters: 32
//!   max_path_depth: 4
//!   default_page_size: 20
//!   max_page_size: 1000
//! ```

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};
use crate::filter::{LinkType, SearchFilter};
use crate::params::SearchParams;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Prefix stripped from incoming request parameters.
    pub param_prefix: String,
    /// Link used by `SearchService::find_all`.
    pub default_link: LinkType,
    /// Maximum number of filters in one search.
    pub max_filters: usize,
    /// Maximum number of segments in a field path.
    pub max_path_depth: usize,
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            param_prefix: "search_".to_owned(),
            default_link: LinkType::And,
            max_filters: 32,
            max_path_depth: 4,
            default_page_size: 20,
            max_page_size: 1000,
        }
    }
}

impl SearchConfig {
    pub const SECTION: &'static str = "search";

    /// Extract the `search` section; defaults when the section is absent.
    ///
    /// # Errors
    /// Returns the figment error when the section does not deserialize.
    pub fn from_figment(figment: &Figment) -> Result<Self, Box<figment::Error>> {
        if !figment.contains(Self::SECTION) {
            return Ok(Self::default());
        }
        let config: Self = figment.extract_inner(Self::SECTION).map_err(Box::new)?;
        tracing::debug!(
            max_filters = config.max_filters,
            max_path_depth = config.max_path_depth,
            link = %config.default_link,
            "search configuration loaded"
        );
        Ok(config)
    }

    /// Defaults, then the YAML file, then `CRUDKIT_SEARCH__*` environment
    /// variables.
    ///
    /// # Errors
    /// Returns the figment error when a layer fails to parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        let figment = Figment::new()
            .merge(Serialized::default(Self::SECTION, Self::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("CRUDKIT_").split("__"));
        Self::from_figment(&figment)
    }

    /// Strip the configured prefix from request pairs.
    pub fn params<I, K, V>(&self, pairs: I) -> SearchParams
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        SearchParams::with_prefix(pairs, &self.param_prefix)
    }

    /// Enforce `max_filters` and `max_path_depth`.
    ///
    /// # Errors
    /// `LimitExceeded` naming the first violated limit.
    pub fn validate_filters<'a, I>(&self, filters: I) -> SearchResult<()>
    where
        I: IntoIterator<Item = &'a SearchFilter>,
    {
        let mut count = 0usize;
        for filter in filters {
            count += 1;
            if count > self.max_filters {
                return Err(SearchError::LimitExceeded(format!(
                    "too many search filters (max {})",
                    self.max_filters
                )));
            }
            let depth = filter.field_path().split('.').count();
            if depth > self.max_path_depth {
                return Err(SearchError::LimitExceeded(format!(
                    "field path {} is {depth} segments deep (max {})",
                    filter.field_path(),
                    self.max_path_depth
                )));
            }
        }
        Ok(())
    }

    /// Requested page size, or the default, clamped to `1..=max_page_size`.
    #[must_use]
    pub fn clamp_page_size(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}
