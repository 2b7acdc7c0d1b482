//! Multi-key sort specifications parsed from signed field-name tokens.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field_map::{Accessor, FieldMap, FieldSchema};
use crate::value::cmp_values;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDir::Asc => write!(f, "asc"),
            SortDir::Desc => write!(f, "desc"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub dir: SortDir,
}

impl SortKey {
    /// Parse one signed token: `-name` descends, `name` (or `+name`)
    /// ascends. Field names are lowercased. Blank tokens yield `None`.
    pub fn from_signed(token: &str) -> Option<SortKey> {
        let token = token.trim();
        let (dir, name) = match token.strip_prefix('-') {
            Some(rest) => (SortDir::Desc, rest),
            None => (SortDir::Asc, token.strip_prefix('+').unwrap_or(token)),
        };
        if name.is_empty() {
            return None;
        }
        Some(SortKey {
            field: name.to_lowercase(),
            dir,
        })
    }

    fn to_signed(&self) -> String {
        match self.dir {
            SortDir::Asc => format!("+{}", self.field),
            SortDir::Desc => format!("-{}", self.field),
        }
    }
}

/// Ordered list of sort keys: first entry is the primary ordering, each
/// following entry breaks ties left by the ones before it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortSpec(pub Vec<SortKey>);

impl SortSpec {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lenient parse of a comma-separated signed token list. Blank segments
    /// are skipped; malformed sort input degrades, it never errors.
    pub fn from_signed_tokens(tokens: &str) -> SortSpec {
        SortSpec(
            tokens
                .split(',')
                .filter_map(SortKey::from_signed)
                .collect(),
        )
    }

    pub fn to_signed_tokens(&self) -> String {
        self.0
            .iter()
            .map(SortKey::to_signed)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Drop keys that are not present in the schema, preserving order. An
    /// empty result falls back to `(default_field, Asc)`.
    ///
    /// The default field existing in the schema is a contract requirement on
    /// callers; it is asserted in debug builds only.
    pub fn resolve<S: FieldSchema>(&self, schema: &S, default_field: &str) -> SortSpec {
        let mut keys: Vec<SortKey> = self
            .0
            .iter()
            .filter(|k| schema.kind_of(&k.field).is_some())
            .cloned()
            .collect();
        if keys.is_empty() {
            let field = default_field.to_lowercase();
            debug_assert!(
                schema.kind_of(&field).is_some(),
                "default sort field `{field}` is not mapped"
            );
            keys.push(SortKey {
                field,
                dir: SortDir::Asc,
            });
        }
        SortSpec(keys)
    }

    /// Fold the key list into one comparator with short-circuit
    /// tie-breaking. Keys absent from `map` are skipped; direction applies
    /// independently per key.
    pub fn comparator<T>(&self, map: &FieldMap<T>) -> impl Fn(&T, &T) -> Ordering {
        let keys: Vec<(Accessor<T>, SortDir)> = self
            .0
            .iter()
            .filter_map(|k| map.get(&k.field).map(|f| (f.get, k.dir)))
            .collect();
        move |a, b| {
            for (get, dir) in &keys {
                let ord = cmp_values(&get(a), &get(b));
                let ord = match dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(none)");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|k| format!("{} {}", k.field, k.dir))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Stable in-place multi-key sort: full ties keep their source order.
pub fn sort_items<T>(items: &mut [T], spec: &SortSpec, map: &FieldMap<T>) {
    if spec.is_empty() {
        return;
    }
    let cmp = spec.comparator(map);
    items.sort_by(|a, b| cmp(a, b));
}
