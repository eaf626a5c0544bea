//! Nested field trees addressed by dotted paths.
//!
//! Collected element values and additional-record fields are both held in
//! a [`FieldMap`]: an ordered tree keyed by path segment. Dotted column
//! names (`address.city`) expand into nested maps via an explicit
//! recursive insert; there is no dynamic property lookup anywhere.
//!
//! Leaves hold arbitrary JSON values. Arrays are leaves: they are never
//! descended into, so an array-valued column counts as a single path for
//! collision checking, matching the merge semantics of the vault API.

use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One node in a field tree: either a leaf value or a nested map.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldNode {
    /// A terminal value (scalars and arrays both land here).
    Leaf(serde_json::Value),
    /// A nested group of fields.
    Map(FieldMap),
}

impl FieldNode {
    /// Returns true if this node is a leaf.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Returns the leaf value, if this node is a leaf.
    #[must_use]
    pub const fn as_leaf(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Leaf(v) => Some(v),
            Self::Map(_) => None,
        }
    }
}

/// An ordered tree of fields keyed by path segment.
///
/// Entries preserve first-insertion order. Order is load-bearing for the
/// records built from these trees, so no sorting happens anywhere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, FieldNode)>,
}

impl FieldMap {
    /// Creates an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of direct entries (not recursive).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the node stored under a direct key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldNode> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    /// Iterates over direct entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldNode)> {
        self.entries.iter().map(|(k, node)| (k.as_str(), node))
    }

    fn set(&mut self, key: &str, node: FieldNode) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k == key) {
            slot.1 = node;
        } else {
            self.entries.push((key.to_string(), node));
        }
    }

    /// Inserts a value at a dotted path, creating intermediate maps.
    ///
    /// Last write wins on the full path. A leaf encountered mid-path is
    /// replaced by a map; two elements targeting the same path is a caller
    /// error and is not guarded here.
    pub fn insert_path(&mut self, path: &str, value: serde_json::Value) {
        let segments: Vec<&str> = path.split('.').collect();
        self.insert_segments(&segments, value);
    }

    fn insert_segments(&mut self, segments: &[&str], value: serde_json::Value) {
        match segments {
            [] => {}
            [leaf] => self.set(leaf, FieldNode::Leaf(value)),
            [head, rest @ ..] => self.child_map_mut(head).insert_segments(rest, value),
        }
    }

    fn child_map_mut(&mut self, key: &str) -> &mut FieldMap {
        let pos = match self.entries.iter().position(|(k, _)| k == key) {
            Some(pos) => pos,
            None => {
                self.entries
                    .push((key.to_string(), FieldNode::Map(FieldMap::new())));
                self.entries.len() - 1
            }
        };
        if !matches!(self.entries[pos].1, FieldNode::Map(_)) {
            self.entries[pos].1 = FieldNode::Map(FieldMap::new());
        }
        match &mut self.entries[pos].1 {
            FieldNode::Map(map) => map,
            FieldNode::Leaf(_) => unreachable!("slot was just replaced with a map"),
        }
    }

    /// Returns true if a dotted path resolves to any node (leaf or subtree).
    #[must_use]
    pub fn contains_path(&self, path: &str) -> bool {
        let segments: Vec<&str> = path.split('.').collect();
        self.lookup(&segments).is_some()
    }

    fn lookup(&self, segments: &[&str]) -> Option<&FieldNode> {
        match segments {
            [] => None,
            [leaf] => self.get(leaf),
            [head, rest @ ..] => match self.get(head)? {
                FieldNode::Map(map) => map.lookup(rest),
                FieldNode::Leaf(_) => None,
            },
        }
    }

    /// Returns the dotted path of every leaf, depth-first in entry order.
    ///
    /// Arrays are leaves and contribute exactly one path.
    #[must_use]
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_leaf_paths("", &mut out);
        out
    }

    fn collect_leaf_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for (key, node) in &self.entries {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match node {
                FieldNode::Leaf(_) => out.push(path),
                FieldNode::Map(map) => map.collect_leaf_paths(&path, out),
            }
        }
    }

    /// Deep-merges `defaults` into this map without overriding.
    ///
    /// Existing entries win; nested maps on both sides merge recursively.
    /// Callers exclude collisions beforehand, so with additional records
    /// this only ever fills in paths that are absent.
    pub fn merge_defaults(&mut self, defaults: &FieldMap) {
        for (key, node) in &defaults.entries {
            match self.entries.iter().position(|(k, _)| k == key) {
                None => self.entries.push((key.clone(), node.clone())),
                Some(pos) => {
                    if let (FieldNode::Map(existing), FieldNode::Map(incoming)) =
                        (&mut self.entries[pos].1, node)
                    {
                        existing.merge_defaults(incoming);
                    }
                }
            }
        }
    }

    /// Converts the tree into a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, node) in &self.entries {
            let value = match node {
                FieldNode::Leaf(v) => v.clone(),
                FieldNode::Map(m) => m.to_json(),
            };
            map.insert(key.clone(), value);
        }
        serde_json::Value::Object(map)
    }

    /// Builds a tree from a JSON object.
    ///
    /// Returns `None` if `value` is not an object. Nested objects become
    /// nested maps; everything else (arrays included) becomes a leaf.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut fields = FieldMap::new();
        for (key, child) in object {
            let node = if child.is_object() {
                FieldNode::Map(Self::from_json(child)?)
            } else {
                FieldNode::Leaf(child.clone())
            };
            fields.entries.push((key.clone(), node));
        }
        Some(fields)
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

impl Serialize for FieldNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Leaf(value) => value.serialize(serializer),
            Self::Map(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value).ok_or_else(|| D::Error::custom("expected a JSON object of fields"))
    }
}
