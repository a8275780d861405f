use tracing::{debug, trace};

use crate::constants::DEFAULT_ARRAY_LIMIT;
use crate::decode::coerce::coerce;
use crate::decode::path::{numeric_key, parse_key_path, PathSegment};
use crate::options::ValueTypes;
use crate::types::{Map, Value};

/// Concrete slot a path segment resolves to inside the current container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot<'p> {
    Index(usize),
    Name(&'p str),
}

impl Slot<'_> {
    fn to_key(self) -> String {
        match self {
            Slot::Index(index) => itoa::Buffer::new().format(index).to_owned(),
            Slot::Name(name) => name.to_owned(),
        }
    }
}

/// Incrementally builds one decoded tree from `key`/`value` assignments.
///
/// ```
/// use serde_qstree::{Query, ValueTypes};
///
/// let mut query = Query::new();
/// query.assign("user[name]", Some("ada"), ValueTypes::empty());
/// query.assign("user[langs][]", Some("en"), ValueTypes::empty());
/// query.assign("user[langs][]", Some("fr"), ValueTypes::empty());
///
/// let value = query.into_value();
/// assert_eq!(value["user"]["name"].as_str(), Some("ada"));
/// assert_eq!(value["user"]["langs"][1].as_str(), Some("fr"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    root: Value,
    array_limit: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Query {
    pub fn new() -> Self {
        Self::with_array_limit(DEFAULT_ARRAY_LIMIT)
    }

    pub fn with_array_limit(array_limit: usize) -> Self {
        Self {
            root: Value::Object(Map::new()),
            array_limit,
        }
    }

    /// Assigns a decoded `value` at the bracketed `key`. A missing value is
    /// stored as null; a present one is coerced according to `types`.
    pub fn assign(&mut self, key: &str, value: Option<&str>, types: ValueTypes) {
        let value = match value {
            Some(raw) => coerce(raw.to_owned(), types),
            None => Value::Null,
        };
        self.insert(key, value);
    }

    /// Assigns an already typed value at the bracketed `key`.
    pub fn insert(&mut self, key: &str, value: Value) {
        let path = parse_key_path(key);
        self.assign_path(&path, value);
    }

    pub fn is_empty(&self) -> bool {
        self.root.as_object().map_or(true, Map::is_empty)
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    pub fn into_map(self) -> Map {
        match self.root {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn assign_path(&mut self, path: &[PathSegment], value: Value) {
        let Some(last) = path.len().checked_sub(1) else {
            return;
        };
        let array_limit = self.array_limit;
        let mut node = &mut self.root;
        for (depth, segment) in path.iter().enumerate() {
            let next = path.get(depth + 1);
            let slot = resolve_slot(node, segment, next);
            demote_if_needed(node, slot, array_limit);
            if depth == last {
                write_leaf(node, slot, value);
                return;
            }
            node = match descend(node, slot, next) {
                Some(child) => child,
                None => {
                    debug!(
                        depth,
                        "dropping assignment: a scalar already occupies an intermediate path segment"
                    );
                    return;
                }
            };
        }
    }
}

/// Turns an append marker into a concrete index. The last used index is
/// reused unless the entry there already holds the next segment's key.
fn resolve_slot<'p>(node: &Value, segment: &'p PathSegment, next: Option<&PathSegment>) -> Slot<'p> {
    match segment {
        PathSegment::Literal(name) => Slot::Name(name.as_str()),
        PathSegment::Index(index) => Slot::Index(*index),
        PathSegment::Append => {
            let (base, occupant) = match node {
                Value::Array(items) => {
                    let base = items.len().checked_sub(1);
                    (base, base.and_then(|i| items.get(i)))
                }
                Value::Object(map) => {
                    let base = max_numeric_key(map);
                    let occupant = base.and_then(|i| map.get(itoa::Buffer::new().format(i)));
                    (base, occupant)
                }
                _ => (None, None),
            };
            match (base, next) {
                (Some(base), Some(next)) if !has_own_key(occupant, next) => Slot::Index(base),
                (Some(base), _) => Slot::Index(base + 1),
                (None, _) => Slot::Index(0),
            }
        }
    }
}

fn has_own_key(container: Option<&Value>, segment: &PathSegment) -> bool {
    match (container, segment) {
        (Some(Value::Object(map)), PathSegment::Literal(name)) => map.contains_key(name.as_str()),
        (Some(Value::Object(map)), PathSegment::Index(index)) => {
            map.contains_key(itoa::Buffer::new().format(*index))
        }
        (Some(Value::Array(items)), PathSegment::Index(index)) => {
            items.get(*index).is_some_and(|item| !item.is_undefined())
        }
        _ => false,
    }
}

fn max_numeric_key(map: &Map) -> Option<usize> {
    map.keys().filter_map(|key| numeric_key(key)).max()
}

/// Next index after the largest numeric key held by `node`.
fn next_numeric_key(node: &Value) -> usize {
    match node {
        Value::Array(items) => items
            .iter()
            .rposition(|item| !item.is_undefined())
            .map_or(0, |i| i + 1),
        Value::Object(map) => max_numeric_key(map).map_or(0, |i| i + 1),
        _ => 0,
    }
}

/// A sequence cannot hold a named key, nor an index past the array limit;
/// either one rewrites it into an index-keyed mapping for good.
fn demote_if_needed(node: &mut Value, slot: Slot<'_>, array_limit: usize) {
    let Value::Array(items) = node else {
        return;
    };
    match slot {
        Slot::Name(_) => trace!(len = items.len(), "demoting sequence to mapping"),
        Slot::Index(index) if index > array_limit => debug!(
            index,
            array_limit, "index beyond array limit, demoting sequence to mapping"
        ),
        Slot::Index(_) => return,
    }
    let items = std::mem::take(items);
    let map: Map = items
        .into_iter()
        .enumerate()
        .filter(|(_, item)| !item.is_undefined())
        .map(|(i, item)| (Slot::Index(i).to_key(), item))
        .collect();
    *node = Value::Object(map);
}

/// Gets the entry at `slot`, padding sequences with `Undefined` holes.
fn entry<'v>(node: &'v mut Value, slot: Slot<'_>) -> Option<&'v mut Value> {
    match (node, slot) {
        (Value::Object(map), slot) => Some(map.entry(slot.to_key()).or_insert(Value::Undefined)),
        (Value::Array(items), Slot::Index(index)) => {
            if index >= items.len() {
                items.resize(index + 1, Value::Undefined);
            }
            items.get_mut(index)
        }
        _ => None,
    }
}

fn descend<'v>(
    node: &'v mut Value,
    slot: Slot<'_>,
    next: Option<&PathSegment>,
) -> Option<&'v mut Value> {
    let child = entry(node, slot)?;
    if child.is_vacant() {
        *child = if next.is_some_and(PathSegment::is_sequence_key) {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }
    if child.is_container() {
        Some(child)
    } else {
        None
    }
}

fn write_leaf(node: &mut Value, slot: Slot<'_>, value: Value) {
    let sibling_index = next_numeric_key(node);
    let Some(existing) = entry(node, slot) else {
        return;
    };
    match existing {
        Value::Undefined => *existing = value,
        Value::Array(items) => items.push(value),
        Value::Object(map) => {
            map.insert(Slot::Index(sibling_index).to_key(), value);
        }
        scalar => {
            let old = scalar.take();
            *scalar = Value::Array(vec![old, value]);
        }
    }
}
