//! Convention-based query translation for CRUD list endpoints.
//!
//! Turns a flat, attacker-controlled query-string map into a typed filter
//! predicate, a stable multi-key ordering and a bounded result page — with
//! no query grammar. The conventions:
//!
//! - every non-reserved parameter filters the field of the same name; only
//!   names present in the entity's [`FieldMap`] are honored, everything else
//!   is silently ignored;
//! - repeated values for one key are OR-ed, distinct keys are AND-ed;
//! - string values match by case-insensitive containment, `"quoted"` values
//!   by exact equality, a leading `!` negates either;
//! - date fields exposed through `...from`/`...to` keys become inclusive
//!   range bounds;
//! - the reserved `sort` parameter takes signed tokens (`-name` descends),
//!   `offset`/`limit` drive paging, `expand` is passed through.
//!
//! The filter predicate is plain data ([`Filter`]) with two interpreters:
//! [`Filter::matches`] for in-memory sequences and the `sift-orm` crate for
//! SQL lowering, so the same request semantics hold in both execution modes.
//!
//! ```
//! use sift_core::{query_page, FieldKind, FieldMap, FieldValue, PageLimits, QueryParams};
//!
//! struct Company {
//!     name: String,
//!     employees: i64,
//! }
//!
//! let fields = FieldMap::new()
//!     .insert("name", FieldKind::String, |c: &Company| {
//!         FieldValue::Str(c.name.clone())
//!     })
//!     .insert("employees", FieldKind::I64, |c: &Company| {
//!         FieldValue::I64(c.employees)
//!     });
//!
//! let companies = vec![
//!     Company { name: "Acme".into(), employees: 12 },
//!     Company { name: "Globex".into(), employees: 3 },
//! ];
//!
//! let params = QueryParams::from_pairs(
//!     [("name", "acm"), ("sort", "-employees"), ("limit", "20")],
//!     PageLimits::default(),
//! );
//! let page = query_page(&companies, &fields, &params, "name", |c| c.name.clone());
//! assert_eq!(page.items, vec!["Acme".to_string()]);
//! assert_eq!(page.pager.count, 1);
//! ```

pub mod field_map;
pub mod filter;
pub mod page;
pub mod params;
pub mod sort;
pub mod value;

pub use field_map::{Accessor, Field, FieldMap, FieldSchema};
pub use filter::{filter_items, FieldClause, Filter, FilterOp, FilterRequest, ValueMatch};
pub use page::{paginate, query_page, Page, Pager};
pub use params::{PageLimits, QueryParams};
pub use sort::{sort_items, SortDir, SortKey, SortSpec};
pub use value::{cmp_values, FieldKind, FieldValue};
