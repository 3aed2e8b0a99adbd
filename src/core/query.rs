//! Query parameters, pagination and search criteria

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::config::PaginationConfig;
use crate::core::entity::SearchScope;
use crate::core::error::{MetaResult, ValidationError};

/// Pagination parameters from the query string
///
/// # Example
/// ```rust,ignore
/// GET /objects?page=2&page_size=10
/// ```
///
/// Missing or unparsable values fall back to the configured defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct QueryParams {
    /// Page number (starts at 1)
    #[serde(deserialize_with = "lenient_count")]
    pub page: Option<usize>,

    /// Number of items per page
    #[serde(deserialize_with = "lenient_count")]
    pub page_size: Option<usize>,
}

/// Read a count from the query string, treating garbage as absent
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse().ok()))
}

/// Resolved pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Resolve query parameters against the configured limits
    pub fn from_params(params: &QueryParams, config: &PaginationConfig) -> Self {
        let page_size = params
            .page_size
            .unwrap_or(config.default_page_size)
            .clamp(1, config.max_page_size.max(1));
        Self::new(params.page.unwrap_or(1), page_size)
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Cut one page out of an already filtered, ordered collection
    pub fn slice<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        let items = items
            .into_iter()
            .skip(self.offset())
            .take(self.page_size)
            .collect();
        Page { items, total }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::from_params(&QueryParams::default(), &PaginationConfig::default())
    }
}

/// One page of results plus the unpaginated total
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// What a search request asks for
///
/// Root kinds (Object, PageList) are searched by exact `id` or by `name`
/// substring; child kinds by `name` substring within a parent, or by parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub id: Option<String>,
    pub name: Option<String>,
    pub parent_id: Option<String>,
}

impl SearchCriteria {
    /// Extract criteria from raw query parameters, reading the parent id
    /// under the scope's query key. Empty values count as absent.
    pub fn from_query(query: &HashMap<String, String>, scope: Option<SearchScope>) -> Self {
        let take = |key: &str| {
            query
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            id: take("id"),
            name: take("name"),
            parent_id: scope.and_then(|scope| take(scope.query_key)),
        }
    }

    /// Reject a request that names nothing to search by
    pub fn ensure_present(&self, scope: Option<SearchScope>) -> MetaResult<()> {
        let present = match scope {
            None => self.id.is_some() || self.name.is_some(),
            Some(_) => self.name.is_some() || self.parent_id.is_some(),
        };
        if present {
            return Ok(());
        }
        let argument = match scope {
            None => "id or name".to_string(),
            Some(scope) => format!("{} or name", scope.query_key),
        };
        Err(ValidationError::MissingArgument { argument }.into())
    }
}

/// Case-insensitive substring match, the equivalent of `LIKE '%needle%'`
pub fn name_matches(name: Option<&str>, needle: &str) -> bool {
    name.is_some_and(|name| name.to_lowercase().contains(&needle.to_lowercase()))
}
