//! sift filter/sort data → `sea_orm::Condition` / ORDER BY lowering, plus the
//! offset/limit pagination combiner. Request normalization belongs to
//! `sift-core`; this module only consumes its predicate and sort data.

use std::collections::HashMap;

use sea_orm::{
    sea_query::{Expr, Func, Order, SimpleExpr},
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use sift_core::{
    FieldKind, FieldSchema, FieldValue, Filter, FilterOp, Page, Pager, QueryParams, SortDir,
    SortSpec, ValueMatch,
};
use thiserror::Error;
use tracing::debug;

/// One whitelisted column: where it lives and how to compare it.
#[derive(Clone)]
pub struct Field<E: EntityTrait> {
    pub col: E::Column,
    pub kind: FieldKind,
}

/// Per-entity mapping from API-facing field names to columns.
///
/// The column-side twin of `sift_core::FieldMap`: same lowercased,
/// case-insensitive keys, so a filter built against either map lowers
/// identically against both interpreters.
#[derive(Clone)]
#[must_use]
pub struct FieldMap<E: EntityTrait> {
    map: HashMap<String, Field<E>>,
}

impl<E: EntityTrait> Default for FieldMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> FieldMap<E> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(mut self, api_name: impl Into<String>, col: E::Column, kind: FieldKind) -> Self {
        self.map
            .insert(api_name.into().to_lowercase(), Field { col, kind });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field<E>> {
        self.map.get(&name.to_lowercase())
    }
}

impl<E: EntityTrait> FieldSchema for FieldMap<E> {
    fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.get(name).map(|f| f.kind)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Only reachable through caller misconfiguration (a default sort field
    /// missing from the map); request input never produces it.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Store-level failure during materialization, propagated unchanged.
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

pub type Result<T> = std::result::Result<T, Error>;

/* ---------- LIKE helpers ---------- */

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}

fn like_contains(s: &str) -> String {
    format!("%{}%", like_escape(s))
}

/* ---------- value coercion ---------- */

fn to_db_value(kind: FieldKind, v: &FieldValue) -> Option<sea_orm::Value> {
    use FieldValue as V;
    Some(match (kind, v) {
        (FieldKind::String | FieldKind::Enum, V::Str(s)) => {
            sea_orm::Value::String(Some(Box::new(s.clone())))
        }
        (FieldKind::I64, V::I64(i)) => sea_orm::Value::BigInt(Some(*i)),
        (FieldKind::F64, V::F64(f)) => sea_orm::Value::Double(Some(*f)),
        (FieldKind::Bool, V::Bool(b)) => sea_orm::Value::Bool(Some(*b)),
        (FieldKind::Uuid, V::Uuid(u)) => sea_orm::Value::Uuid(Some(Box::new(*u))),
        (FieldKind::DateTimeUtc, V::DateTime(dt)) => {
            sea_orm::Value::ChronoDateTimeUtc(Some(Box::new(*dt)))
        }
        (FieldKind::Date, V::Date(d)) => sea_orm::Value::ChronoDate(Some(Box::new(*d))),
        _ => return None,
    })
}

fn is_string_family(kind: FieldKind) -> bool {
    matches!(kind, FieldKind::String | FieldKind::Enum)
}

fn lower_col<E: EntityTrait>(col: E::Column) -> SimpleExpr
where
    E::Column: ColumnTrait + Copy,
{
    Func::lower(Expr::col(col)).into()
}

fn never() -> Condition {
    Condition::all().add(Expr::cust("1=0"))
}

fn always() -> Condition {
    Condition::all().add(Expr::cust("1=1"))
}

/* ---------- ValueMatch / Filter -> Condition ---------- */

fn match_to_condition<E>(field: &Field<E>, m: &ValueMatch) -> Condition
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    let col = field.col;
    match m.op {
        FilterOp::Never => never(),
        FilterOp::IsNull => Condition::all().add(Expr::col(col).is_null()),
        FilterOp::Contains => match &m.value {
            // Values are lowercased at build time; LOWER() the column side.
            FieldValue::Str(s) => Condition::all()
                .add(Expr::expr(lower_col::<E>(col)).like(like_contains(s))),
            _ => never(),
        },
        // NULL OR NOT ..., so negation stays the exact complement in SQL.
        FilterOp::NotContains => match &m.value {
            FieldValue::Str(s) => Condition::any()
                .add(Expr::col(col).is_null())
                .add(Expr::expr(lower_col::<E>(col)).not_like(like_contains(s))),
            _ => always(),
        },
        FilterOp::Eq => match to_db_value(field.kind, &m.value) {
            Some(v) if is_string_family(field.kind) => {
                Condition::all().add(Expr::expr(lower_col::<E>(col)).eq(v))
            }
            Some(v) => Condition::all().add(Expr::col(col).eq(v)),
            None => never(),
        },
        FilterOp::Ne => match to_db_value(field.kind, &m.value) {
            Some(v) if is_string_family(field.kind) => Condition::any()
                .add(Expr::col(col).is_null())
                .add(Expr::expr(lower_col::<E>(col)).ne(v)),
            Some(v) => Condition::any()
                .add(Expr::col(col).is_null())
                .add(Expr::col(col).ne(v)),
            None => always(),
        },
        FilterOp::Gte => match to_db_value(field.kind, &m.value) {
            Some(v) => Condition::all().add(Expr::col(col).gte(v)),
            None => never(),
        },
        FilterOp::Lte => match to_db_value(field.kind, &m.value) {
            Some(v) => Condition::all().add(Expr::col(col).lte(v)),
            None => never(),
        },
    }
}

/// Lower a composed filter to a single `Condition`.
///
/// Clauses naming fields absent from this map are skipped, matching the
/// engine's silent-ignore policy. The `default_match`/`all_must_match`
/// constants lower to `1=1`/`1=0` terms so SQL evaluation agrees exactly
/// with the in-memory interpreter.
pub fn filter_to_condition<E>(filter: &Filter, fmap: &FieldMap<E>) -> Condition
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    let mut cond = if filter.all_must_match {
        Condition::all()
    } else {
        Condition::any()
    };
    if filter.all_must_match && !filter.default_match {
        cond = cond.add(Expr::cust("1=0"));
    }
    if !filter.all_must_match {
        if filter.default_match {
            cond = cond.add(Expr::cust("1=1"));
        } else if filter.clauses.is_empty() {
            cond = cond.add(Expr::cust("1=0"));
        }
    }

    for clause in &filter.clauses {
        let Some(field) = fmap.get(&clause.field) else {
            continue;
        };
        let mut any = Condition::any();
        for m in &clause.any_of {
            any = any.add(match_to_condition::<E>(field, m));
        }
        cond = cond.add(any);
    }
    cond
}

/* ---------- Select<E> extensions ---------- */

/// Apply sift filter/sort data to a plain SeaORM `Select<E>`.
pub trait SiftQueryExt<E: EntityTrait>: Sized {
    fn apply_filter(self, filter: &Filter, fmap: &FieldMap<E>) -> Self;

    /// Chain one ORDER BY per sort key, in order. String-family columns are
    /// ordered on `LOWER(col)` so collation matches the engine's
    /// case-insensitive comparisons.
    fn apply_sort(self, spec: &SortSpec, fmap: &FieldMap<E>) -> Result<Self>;
}

impl<E> SiftQueryExt<E> for Select<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    fn apply_filter(self, filter: &Filter, fmap: &FieldMap<E>) -> Self {
        if filter.is_empty() && filter.default_match && filter.all_must_match {
            return self;
        }
        self.filter(filter_to_condition(filter, fmap))
    }

    fn apply_sort(self, spec: &SortSpec, fmap: &FieldMap<E>) -> Result<Self> {
        let mut query = self;
        for key in &spec.0 {
            let field = fmap
                .get(&key.field)
                .ok_or_else(|| Error::UnknownField(key.field.clone()))?;
            let order = match key.dir {
                SortDir::Asc => Order::Asc,
                SortDir::Desc => Order::Desc,
            };
            query = if is_string_family(field.kind) {
                query.order_by(lower_col::<E>(field.col), order)
            } else {
                query.order_by(field.col, order)
            };
        }
        Ok(query)
    }
}

/* ---------- pagination combiner ---------- */

/// Count plus offset/limit slice over an already filtered+sorted select.
///
/// The count and the slice are two queries sharing identical criteria; under
/// concurrent writes they can disagree. That race is accepted, documented
/// behavior — no transaction is taken here. Cancellation is the caller's
/// request lifetime: dropping the returned future aborts the in-flight
/// fetch, there is no partial page. Store failures propagate unchanged.
pub async fn paginate<E, D, F, C>(
    select: Select<E>,
    conn: &C,
    offset: u64,
    limit: u64,
    project: F,
) -> Result<Page<D>>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    F: Fn(E::Model) -> D,
    C: ConnectionTrait,
{
    let count = select.clone().count(conn).await?;
    let pager = Pager {
        offset,
        limit,
        count,
    };
    // A zero limit should have been clamped upstream; tolerate it anyway.
    if limit == 0 || offset >= count {
        return Ok(Page::new(Vec::new(), pager));
    }

    let rows = select.offset(offset).limit(limit).all(conn).await?;
    debug!(count, returned = rows.len(), offset, limit, "page materialized");

    let items = rows.into_iter().map(project).collect();
    Ok(Page::new(items, pager))
}

/// One-shot combiner: build the predicate and ordering from request data,
/// apply both, then count and slice.
pub async fn fetch_page<E, D, F, C>(
    select: Select<E>,
    conn: &C,
    params: &QueryParams,
    fmap: &FieldMap<E>,
    default_sort: &str,
    project: F,
) -> Result<Page<D>>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    E::Column: ColumnTrait + Copy,
    F: Fn(E::Model) -> D,
    C: ConnectionTrait,
{
    let filter = Filter::build(fmap, &params.filter, true, true);
    let spec = params.sort.resolve(fmap, default_sort);
    let select = select.apply_filter(&filter, fmap).apply_sort(&spec, fmap)?;
    paginate(select, conn, params.offset, params.limit, project).await
}
