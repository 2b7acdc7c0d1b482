use std::collections::HashMap;

use crate::value::{FieldKind, FieldValue};

/// Pure projection from an entity instance to one of its field values.
pub type Accessor<T> = fn(&T) -> FieldValue;

/// One whitelisted field: how to read it and how to compare it.
#[derive(Clone, Copy)]
pub struct Field<T> {
    pub get: Accessor<T>,
    pub kind: FieldKind,
}

/// Per-entity mapping from API-facing field names to value accessors.
///
/// Keys are stored lowercased; lookups are case-insensitive. Built once by
/// the mapping layer, then treated as read-only by the engine. Only fields
/// present here are filterable/sortable; everything else is invisible to
/// request input.
#[derive(Clone)]
#[must_use]
pub struct FieldMap<T> {
    map: HashMap<String, Field<T>>,
}

impl<T> Default for FieldMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FieldMap<T> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(mut self, api_name: impl Into<String>, kind: FieldKind, get: Accessor<T>) -> Self {
        self.map
            .insert(api_name.into().to_lowercase(), Field { get, kind });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field<T>> {
        self.map.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Name→kind view of a field map.
///
/// The filter and sort builders only need to know whether a requested name is
/// mapped and which comparison family it belongs to, so they work against
/// this trait rather than a concrete map. The ORM lowering layer provides its
/// own column-based implementation.
pub trait FieldSchema {
    fn kind_of(&self, name: &str) -> Option<FieldKind>;
}

impl<T> FieldSchema for FieldMap<T> {
    fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.get(name).map(|f| f.kind)
    }
}
