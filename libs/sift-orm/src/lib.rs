//! SeaORM execution mode for the sift query engine.
//!
//! `sift-core` turns raw query parameters into predicate and sort *data*;
//! this crate lowers that data onto `sea_orm::Select` queries (parameterized
//! WHERE conditions, chained ORDER BY) and runs the count+slice pagination
//! against a live connection. The same request therefore produces the same
//! result set whether it is evaluated in memory or translated to SQL.

pub mod query;

pub use query::{
    fetch_page, filter_to_condition, paginate, Error, Field, FieldMap, Result, SiftQueryExt,
};
