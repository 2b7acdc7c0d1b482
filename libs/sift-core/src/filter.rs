//! Filter request normalization and the predicate-as-data model.
//!
//! A [`Filter`] is plain data: per-field clauses OR-ed over their values,
//! combined across fields with a single global AND/OR switch. It has two
//! interpreters: [`Filter::matches`] evaluates entities in memory, while the
//! ORM layer lowers the same data to SQL conditions.

use std::cmp::Ordering;

use crate::field_map::{FieldMap, FieldSchema};
use crate::value::{cmp_values, FieldKind, FieldValue};

/// Ordered, multi-valued map of raw filter parameters.
///
/// Keys are lowercased on insertion; repeated keys merge into one entry while
/// preserving first-seen order. Reserved parameter names (`sort`, `offset`,
/// `limit`, `expand`) are split off by the query-parameter reader before a
/// request reaches the filter builder.
#[derive(Clone, Debug, Default)]
pub struct FilterRequest {
    pairs: Vec<(String, Vec<String>)>,
}

impl FilterRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        let key = key.to_lowercase();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into()),
            None => self.pairs.push((key, vec![value.into()])),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for FilterRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut req = FilterRequest::new();
        for (k, v) in iter {
            req.append(k.as_ref(), v);
        }
        req
    }
}

/// Comparison performed by one value of one filter clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOp {
    IsNull,
    Eq,
    Ne,
    Contains,
    NotContains,
    Gte,
    Lte,
    /// A value that failed coercion to the field's type. Matches nothing;
    /// the rest of the request is unaffected.
    Never,
}

/// One comparison against a single supplied value.
#[derive(Clone, Debug)]
pub struct ValueMatch {
    pub op: FilterOp,
    pub value: FieldValue,
}

/// All comparisons requested for one field; an entity matches the clause if
/// any of them matches (repeated values mean "any of these").
#[derive(Clone, Debug)]
pub struct FieldClause {
    pub field: String,
    pub any_of: Vec<ValueMatch>,
}

/// The composed filter predicate, as data.
#[derive(Clone, Debug)]
pub struct Filter {
    /// Value of the predicate when no clause applies.
    pub default_match: bool,
    /// `true`: AND across fields; `false`: OR across fields. One global
    /// switch, never per-field.
    pub all_must_match: bool,
    pub clauses: Vec<FieldClause>,
}

impl Filter {
    /// Build a predicate from raw request parameters.
    ///
    /// Unknown keys are silently dropped. Within a key the supplied values
    /// are OR-ed; across keys clauses combine with AND (or OR when
    /// `all_must_match` is false), starting from `default_match`.
    pub fn build<S: FieldSchema>(
        schema: &S,
        request: &FilterRequest,
        default_match: bool,
        all_must_match: bool,
    ) -> Filter {
        let mut clauses = Vec::new();
        for (key, values) in request.iter() {
            let Some(kind) = schema.kind_of(key) else {
                continue;
            };
            let any_of = values
                .iter()
                .map(|raw| ValueMatch::parse(key, kind, raw))
                .collect::<Vec<_>>();
            if !any_of.is_empty() {
                clauses.push(FieldClause {
                    field: key.to_string(),
                    any_of,
                });
            }
        }
        Filter {
            default_match,
            all_must_match,
            clauses,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// In-memory interpreter: evaluate the predicate against one entity.
    ///
    /// Null-safe by construction; clauses whose field is absent from `map`
    /// are skipped (the build step already drops them for the map it was
    /// given).
    pub fn matches<T>(&self, map: &FieldMap<T>, entity: &T) -> bool {
        let mut acc = self.default_match;
        for clause in &self.clauses {
            let Some(field) = map.get(&clause.field) else {
                continue;
            };
            let value = (field.get)(entity);
            let hit = clause.any_of.iter().any(|m| m.matches(&value));
            acc = if self.all_must_match {
                acc && hit
            } else {
                acc || hit
            };
        }
        acc
    }
}

impl ValueMatch {
    /// Decide the comparison for one raw value, directed by the field's kind
    /// and, for date fields, by the `from`/`to` suffix of the parameter key.
    fn parse(key: &str, kind: FieldKind, raw: &str) -> ValueMatch {
        if raw.is_empty() {
            return ValueMatch {
                op: FilterOp::IsNull,
                value: FieldValue::Null,
            };
        }

        match kind {
            FieldKind::String | FieldKind::Enum => {
                let (negated, body) = split_negation(raw);
                let lowered = body.to_lowercase();
                match unquote(&lowered) {
                    Some(exact) => ValueMatch {
                        op: if negated { FilterOp::Ne } else { FilterOp::Eq },
                        value: FieldValue::Str(exact.to_string()),
                    },
                    None if kind == FieldKind::Enum => ValueMatch {
                        op: if negated { FilterOp::Ne } else { FilterOp::Eq },
                        value: FieldValue::Str(lowered),
                    },
                    None => ValueMatch {
                        op: if negated {
                            FilterOp::NotContains
                        } else {
                            FilterOp::Contains
                        },
                        value: FieldValue::Str(lowered),
                    },
                }
            }
            // One logical date field exposed as two bounds, e.g.
            // `uploadedonfrom` / `uploadedonto`. No negation here; a `!`
            // prefix simply fails coercion below.
            FieldKind::Date | FieldKind::DateTimeUtc if key.ends_with("from") => {
                bound(kind, raw, FilterOp::Gte)
            }
            FieldKind::Date | FieldKind::DateTimeUtc if key.ends_with("to") => {
                bound(kind, raw, FilterOp::Lte)
            }
            _ => {
                let (negated, body) = split_negation(raw);
                match FieldValue::coerce(kind, body) {
                    Some(value) => ValueMatch {
                        op: if negated { FilterOp::Ne } else { FilterOp::Eq },
                        value,
                    },
                    None => ValueMatch {
                        op: FilterOp::Never,
                        value: FieldValue::Null,
                    },
                }
            }
        }
    }

    /// Evaluate against an extracted field value.
    pub fn matches(&self, value: &FieldValue) -> bool {
        match self.op {
            FilterOp::Never => false,
            FilterOp::IsNull => value.is_null(),
            FilterOp::Eq => {
                !value.is_null() && cmp_values(value, &self.value) == Ordering::Equal
            }
            // Exact complement of Eq, including null field values.
            FilterOp::Ne => value.is_null() || cmp_values(value, &self.value) != Ordering::Equal,
            FilterOp::Contains => contains(value, &self.value),
            FilterOp::NotContains => !contains(value, &self.value),
            FilterOp::Gte => {
                !value.is_null() && cmp_values(value, &self.value) != Ordering::Less
            }
            FilterOp::Lte => {
                !value.is_null() && cmp_values(value, &self.value) != Ordering::Greater
            }
        }
    }
}

fn bound(kind: FieldKind, raw: &str, op: FilterOp) -> ValueMatch {
    match FieldValue::coerce(kind, raw) {
        Some(value) => ValueMatch { op, value },
        None => ValueMatch {
            op: FilterOp::Never,
            value: FieldValue::Null,
        },
    }
}

fn contains(field: &FieldValue, needle: &FieldValue) -> bool {
    // Needles are lowercased at build time.
    match (field, needle) {
        (FieldValue::Str(f), FieldValue::Str(n)) => f.to_lowercase().contains(n.as_str()),
        _ => false,
    }
}

fn split_negation(raw: &str) -> (bool, &str) {
    match raw.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, raw),
    }
}

/// A value fully wrapped in double quotes requests exact matching; returns
/// the inner text with the quotes stripped.
fn unquote(raw: &str) -> Option<&str> {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}

/// References to the entities that satisfy the filter, in source order.
pub fn filter_items<'a, T>(items: &'a [T], filter: &Filter, map: &FieldMap<T>) -> Vec<&'a T> {
    items.iter().filter(|e| filter.matches(map, e)).collect()
}
