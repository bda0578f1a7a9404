//! Filter descriptors and the `OPERATOR_fieldPath` key parser.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};
use crate::params::{RawValue, SearchParams};

/// Comparison requested by a search key.
///
/// Wire tokens are the upper-case variant names, matched exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    /// Unanchored substring match.
    Like,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub const ALL: [Operator; 9] = [
        Operator::Eq,
        Operator::Like,
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::In,
        Operator::IsNull,
        Operator::IsNotNull,
    ];

    /// Wire token used in parameter keys.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Like => "LIKE",
            Operator::Gt => "GT",
            Operator::Lt => "LT",
            Operator::Gte => "GTE",
            Operator::Lte => "LTE",
            Operator::In => "IN",
            Operator::IsNull => "ISNULL",
            Operator::IsNotNull => "ISNOTNULL",
        }
    }

    /// `false` for ISNULL / ISNOTNULL.
    #[must_use]
    pub fn takes_value(self) -> bool {
        !matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// GT, LT, GTE, LTE.
    #[must_use]
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Lt | Operator::Gte | Operator::Lte
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Unknown operator token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.token() == s)
            .ok_or_else(|| UnknownOperator(s.to_owned()))
    }
}

/// How the predicates of one query are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    #[default]
    And,
    Or,
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkType::And => f.write_str("and"),
            LinkType::Or => f.write_str("or"),
        }
    }
}

/// One parsed search condition: field path, operator and optional raw value.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    field_path: String,
    operator: Operator,
    value: Option<RawValue>,
}

impl SearchFilter {
    /// Create a filter with a value.
    ///
    /// Value-less operators drop the value.
    #[must_use]
    pub fn new(
        field_path: impl Into<String>,
        operator: Operator,
        value: impl Into<RawValue>,
    ) -> Self {
        let value = operator.takes_value().then(|| value.into());
        Self {
            field_path: field_path.into(),
            operator,
            value,
        }
    }

    /// ISNULL / ISNOTNULL style filter, or a value operator to be rejected later.
    #[must_use]
    pub fn without_value(field_path: impl Into<String>, operator: Operator) -> Self {
        Self {
            field_path: field_path.into(),
            operator,
            value: None,
        }
    }

    #[must_use]
    pub fn field_path(&self) -> &str {
        &self.field_path
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn value(&self) -> Option<&RawValue> {
        self.value.as_ref()
    }
}

/// Split `OPERATOR_fieldPath` into its operator and field path.
///
/// Empty pieces between underscores are ignored, so exactly two non-empty
/// tokens must remain.
///
/// # Errors
/// `InvalidFilterKey` for a wrong shape, `InvalidOperator` for an unknown token.
pub fn parse_filter_key(key: &str) -> SearchResult<(Operator, &str)> {
    let mut tokens = key.split('_').filter(|t| !t.is_empty());
    let (Some(op_token), Some(field_path), None) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(SearchError::InvalidFilterKey {
            key: key.to_owned(),
        });
    };

    let operator = op_token
        .parse::<Operator>()
        .map_err(|UnknownOperator(token)| SearchError::InvalidOperator {
            key: key.to_owned(),
            token,
        })?;

    Ok((operator, field_path))
}

/// Decode raw search parameters into filter descriptors, keyed by the raw key.
///
/// Value operators with an absent or empty value are skipped so unused form
/// fields do not turn into filters. ISNULL / ISNOTNULL ignore the value.
///
/// ```
/// use crudkit_search::{parse_search_filters, Operator, SearchParams};
///
/// let params = SearchParams::new()
///     .with("EQ_account.username", "alice")
///     .with("LIKE_name", "")
///     .with_null("ISNULL_deletedAt");
///
/// let filters = parse_search_filters(&params).unwrap();
/// assert_eq!(filters.len(), 2);
/// assert_eq!(filters["EQ_account.username"].field_path(), "account.username");
/// assert_eq!(filters["ISNULL_deletedAt"].operator(), Operator::IsNull);
/// ```
///
/// # Errors
/// Fails on the first key that is not `OPERATOR_fieldPath` or names an
/// unknown operator.
pub fn parse_search_filters(params: &SearchParams) -> SearchResult<BTreeMap<String, SearchFilter>> {
    let mut filters = BTreeMap::new();

    for (key, value) in params.iter() {
        let (operator, field_path) = parse_filter_key(key).inspect_err(|e| {
            tracing::debug!(key, error = %e, "rejecting search parameter");
        })?;

        let filter = if operator.takes_value() {
            match value {
                Some(v) if !v.is_empty() => SearchFilter::new(field_path, operator, v.clone()),
                _ => continue,
            }
        } else {
            SearchFilter::without_value(field_path, operator)
        };

        filters.insert(key.to_owned(), filter);
    }

    Ok(filters)
}
