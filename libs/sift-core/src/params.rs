//! Query-parameter reader: splits a decoded query string into filter
//! parameters, a sort specification, paging bounds and expand hints.

use crate::filter::FilterRequest;
use crate::sort::{SortKey, SortSpec};

/// Reserved parameter names. Everything else is treated as a filter key.
pub const SORT_PARAM: &str = "sort";
pub const OFFSET_PARAM: &str = "offset";
pub const LIMIT_PARAM: &str = "limit";
pub const EXPAND_PARAM: &str = "expand";

/// Paging bounds enforced at the request boundary.
#[derive(Clone, Copy, Debug)]
pub struct PageLimits {
    pub default: u64,
    pub max: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default: 10,
            max: 100,
        }
    }
}

impl PageLimits {
    /// Clamp a requested limit into `(0, max]`, substituting the default
    /// when absent. A requested zero is bumped to one.
    pub fn clamp(&self, requested: Option<u64>) -> u64 {
        let mut limit = requested.unwrap_or(self.default);
        if limit == 0 {
            limit = 1;
        }
        if limit > self.max {
            limit = self.max;
        }
        limit
    }
}

/// The engine-facing view of one request's query string.
#[derive(Clone, Debug)]
pub struct QueryParams {
    pub filter: FilterRequest,
    pub sort: SortSpec,
    pub offset: u64,
    pub limit: u64,
    /// Related entities the caller wants eager-loaded. Recognized and passed
    /// through; loading itself is the storage layer's concern.
    pub expand: Vec<String>,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            filter: FilterRequest::new(),
            sort: SortSpec::empty(),
            offset: 0,
            limit: PageLimits::default().default,
            expand: Vec::new(),
        }
    }
}

impl QueryParams {
    /// Read decoded `(key, value)` pairs, in request order.
    ///
    /// `sort` accepts comma-separated tokens and repeated parameters;
    /// `offset`/`limit` take the first parsable value and fall back to
    /// defaults otherwise (malformed paging input degrades, it never
    /// errors). Remaining pairs become the filter request.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>, limits: PageLimits) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = FilterRequest::new();
        let mut sort = SortSpec::empty();
        let mut offset: Option<u64> = None;
        let mut limit: Option<u64> = None;
        let mut expand = Vec::new();

        for (key, value) in pairs {
            let key = key.as_ref().to_lowercase();
            let value = value.as_ref();
            match key.as_str() {
                SORT_PARAM => sort.0.extend(value.split(',').filter_map(SortKey::from_signed)),
                OFFSET_PARAM => offset = offset.or_else(|| value.trim().parse().ok()),
                LIMIT_PARAM => limit = limit.or_else(|| value.trim().parse().ok()),
                EXPAND_PARAM => expand.extend(
                    value
                        .split(',')
                        .map(|s| s.trim().to_lowercase())
                        .filter(|s| !s.is_empty()),
                ),
                _ => filter.append(&key, value),
            }
        }

        Self {
            filter,
            sort,
            offset: offset.unwrap_or(0),
            limit: limits.clamp(limit),
            expand,
        }
    }
}
