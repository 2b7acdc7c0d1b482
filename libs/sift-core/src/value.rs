use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

/// Comparison family of a mapped field.
///
/// The kind decides how a raw filter value is coerced and which comparison
/// semantics apply: containment for strings, exact equality for uuids and
/// enums, range bounds for date fields exposed through `...from`/`...to`
/// parameter keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// Enumeration stored as a string; compared by exact, case-insensitive
    /// equality (never containment).
    Enum,
    I64,
    F64,
    Bool,
    Uuid,
    DateTimeUtc,
    Date,
}

/// A single typed value extracted from an entity or coerced from a raw
/// query-string value.
///
/// `Null` stands in for absent optional fields and missing navigation
/// properties; every comparison is total over it.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Str(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Coerce a raw string value to the field's native type.
    ///
    /// `None` means the value cannot represent the target type; callers treat
    /// that as a comparison that matches nothing, never as an error.
    pub fn coerce(kind: FieldKind, raw: &str) -> Option<FieldValue> {
        match kind {
            FieldKind::String | FieldKind::Enum => Some(FieldValue::Str(raw.to_string())),
            FieldKind::I64 => raw.trim().parse::<i64>().ok().map(FieldValue::I64),
            FieldKind::F64 => raw.trim().parse::<f64>().ok().map(FieldValue::F64),
            FieldKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(FieldValue::Bool(true)),
                "false" | "0" => Some(FieldValue::Bool(false)),
                _ => None,
            },
            FieldKind::Uuid => raw.trim().parse::<Uuid>().ok().map(FieldValue::Uuid),
            FieldKind::DateTimeUtc => parse_datetime(raw.trim()).map(FieldValue::DateTime),
            FieldKind::Date => raw.trim().parse::<NaiveDate>().ok().map(FieldValue::Date),
        }
    }
}

/// RFC 3339 first, then a bare `YYYY-MM-DD` taken as midnight UTC.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = raw.parse::<NaiveDate>().ok()?;
    let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
    Some(DateTime::from_naive_utc_and_offset(
        date.and_time(midnight),
        Utc,
    ))
}

/// Total order over field values used by both filtering and sorting.
///
/// Strings compare case-insensitively. `Null` orders before every non-null
/// value. Values of different kinds never meet for a well-formed field map;
/// if they do, a fixed kind rank keeps the order total.
pub fn cmp_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    use FieldValue as V;
    match (a, b) {
        (V::Null, V::Null) => Ordering::Equal,
        (V::Null, _) => Ordering::Less,
        (_, V::Null) => Ordering::Greater,
        (V::Str(x), V::Str(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (V::I64(x), V::I64(y)) => x.cmp(y),
        (V::F64(x), V::F64(y)) => x.total_cmp(y),
        (V::Bool(x), V::Bool(y)) => x.cmp(y),
        (V::Uuid(x), V::Uuid(y)) => x.cmp(y),
        (V::DateTime(x), V::DateTime(y)) => x.cmp(y),
        (V::Date(x), V::Date(y)) => x.cmp(y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(v: &FieldValue) -> u8 {
    use FieldValue as V;
    match v {
        V::Null => 0,
        V::Bool(_) => 1,
        V::I64(_) => 2,
        V::F64(_) => 3,
        V::Str(_) => 4,
        V::Uuid(_) => 5,
        V::Date(_) => 6,
        V::DateTime(_) => 7,
    }
}
