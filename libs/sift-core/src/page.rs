use serde::{Deserialize, Serialize};

use crate::field_map::FieldMap;
use crate::filter::Filter;
use crate::params::QueryParams;

/// Position of a page within its unsliced source: the offset/limit that
/// produced it and the total number of matching entities before slicing.
#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pager {
    pub offset: u64,
    pub limit: u64,
    pub count: u64,
}

/// A bounded slice of a filtered and sorted sequence plus paging metadata.
/// `items.len() <= limit` always holds; `count` ignores the slicing.
#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pager: Pager,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pager: Pager) -> Self {
        Self { items, pager }
    }

    /// An empty page at the given position.
    pub fn empty(offset: u64, limit: u64) -> Self {
        Self {
            items: Vec::new(),
            pager: Pager {
                offset,
                limit,
                count: 0,
            },
        }
    }

    /// Map items while preserving the pager (domain→DTO mapping convenience).
    pub fn map_items<U>(self, mut f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(&mut f).collect(),
            pager: self.pager,
        }
    }
}

/// Slice an already filtered (and sorted) sequence into a page.
///
/// The count is taken before slicing, so an offset beyond the end yields an
/// empty page with the correct total. A zero limit yields no items rather
/// than failing; upstream clamping normally prevents it from arriving here.
pub fn paginate<T, U>(
    items: &[T],
    offset: u64,
    limit: u64,
    mut projector: impl FnMut(&T) -> U,
) -> Page<U> {
    let count = items.len() as u64;
    let items = items
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .map(&mut projector)
        .collect();
    Page {
        items,
        pager: Pager {
            offset,
            limit,
            count,
        },
    }
}

/// One-shot in-memory pipeline: filter, sort, slice, project.
///
/// Cross-field combination is AND starting from a constant-true predicate,
/// the default mode for list endpoints. The sort falls back to
/// `(default_sort, Asc)` when the request names no known sort field.
pub fn query_page<T, U>(
    items: &[T],
    map: &FieldMap<T>,
    params: &QueryParams,
    default_sort: &str,
    mut projector: impl FnMut(&T) -> U,
) -> Page<U> {
    let filter = Filter::build(map, &params.filter, true, true);
    let mut kept: Vec<&T> = items.iter().filter(|e| filter.matches(map, e)).collect();

    let spec = params.sort.resolve(map, default_sort);
    let cmp = spec.comparator(map);
    kept.sort_by(|a, b| cmp(a, b));

    let count = kept.len() as u64;
    let page_items = kept
        .into_iter()
        .skip(params.offset as usize)
        .take(params.limit as usize)
        .map(|e| projector(e))
        .collect();
    Page {
        items: page_items,
        pager: Pager {
            offset: params.offset,
            limit: params.limit,
            count,
        },
    }
}
