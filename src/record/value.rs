//! Field values and hashed containers
//!
//! Sets and maps follow a batch discipline: entries are appended with
//! `add_unhashed`, which leaves the hash index stale, and `rehash` restores
//! it once after the batch. Element hashes can depend on contents that are
//! only filled in after the element was added.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::schema::FieldKind;

use super::instance::RecordInstance;

/// The value held in one slot of a record instance.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Underlying integer of an enumeration
    Enum(i64),
    Str(String),
    Array(Vec<FieldValue>),
    Set(SetValue),
    Map(MapValue),
    Struct(RecordInstance),
}

impl FieldValue {
    /// Zero/default value for a field of `kind`
    pub fn default_for(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Bool => FieldValue::Bool(false),
            FieldKind::Int { .. } => FieldValue::Int(0),
            FieldKind::Float(_) => FieldValue::Float(0.0),
            FieldKind::Enum(e) => FieldValue::Enum(e.default_value()),
            FieldKind::String | FieldKind::Name => FieldValue::Str(String::new()),
            FieldKind::Array(_) => FieldValue::Array(Vec::new()),
            FieldKind::Set(_) => FieldValue::Set(SetValue::new()),
            FieldKind::Map { .. } => FieldValue::Map(MapValue::new()),
            FieldKind::Struct(record) => FieldValue::Struct(RecordInstance::new(Arc::clone(record))),
        }
    }

    /// Returns the variant name for messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Enum(_) => "enum",
            FieldValue::Str(_) => "string",
            FieldValue::Array(_) => "array",
            FieldValue::Set(_) => "set",
            FieldValue::Map(_) => "map",
            FieldValue::Struct(_) => "struct",
        }
    }

    /// Shallow check that this value can live in a field of `kind`
    pub fn fits(&self, kind: &FieldKind) -> bool {
        match (kind, self) {
            (FieldKind::Bool, FieldValue::Bool(_))
            | (FieldKind::Int { .. }, FieldValue::Int(_))
            | (FieldKind::Float(_), FieldValue::Float(_))
            | (FieldKind::Enum(_), FieldValue::Enum(_))
            | (FieldKind::String | FieldKind::Name, FieldValue::Str(_))
            | (FieldKind::Array(_), FieldValue::Array(_))
            | (FieldKind::Set(_), FieldValue::Set(_))
            | (FieldKind::Map { .. }, FieldValue::Map(_)) => true,
            (FieldKind::Struct(record), FieldValue::Struct(instance)) => {
                instance.record_type().name() == record.name()
            }
            _ => false,
        }
    }

    /// Integer payload of `Int` and `Enum` values
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) | FieldValue::Enum(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&SetValue> {
        match self {
            FieldValue::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            FieldValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&RecordInstance> {
        match self {
            FieldValue::Struct(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut RecordInstance> {
        match self {
            FieldValue::Struct(instance) => Some(instance),
            _ => None,
        }
    }
}

// Floats compare and hash by bit pattern so values can key sets and maps.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Int(a), FieldValue::Int(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a.to_bits() == b.to_bits(),
            (FieldValue::Enum(a), FieldValue::Enum(b)) => a == b,
            (FieldValue::Str(a), FieldValue::Str(b)) => a == b,
            (FieldValue::Array(a), FieldValue::Array(b)) => a == b,
            (FieldValue::Set(a), FieldValue::Set(b)) => a.elements == b.elements,
            (FieldValue::Map(a), FieldValue::Map(b)) => a.entries == b.entries,
            (FieldValue::Struct(a), FieldValue::Struct(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Bool(b) => b.hash(state),
            FieldValue::Int(v) | FieldValue::Enum(v) => v.hash(state),
            FieldValue::Float(v) => v.to_bits().hash(state),
            FieldValue::Str(s) => s.hash(state),
            FieldValue::Array(items) => items.hash(state),
            FieldValue::Set(set) => set.elements.hash(state),
            FieldValue::Map(map) => map.entries.hash(state),
            FieldValue::Struct(instance) => instance.hash(state),
        }
    }
}

fn hash_of(value: &FieldValue) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Insertion-ordered set with a lazily rebuilt hash index.
#[derive(Debug, Clone, Default)]
pub struct SetValue {
    elements: Vec<FieldValue>,
    buckets: HashMap<u64, Vec<usize>>,
    needs_rehash: bool,
}

impl SetValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldValue> {
        self.elements.iter()
    }

    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.elements.get(index)
    }

    /// Removes every element.
    pub fn empty(&mut self) {
        self.elements.clear();
        self.buckets.clear();
        self.needs_rehash = false;
    }

    /// Appends without indexing. Call `rehash` once the batch is complete.
    pub fn add_unhashed(&mut self, value: FieldValue) -> usize {
        self.elements.push(value);
        self.needs_rehash = true;
        self.elements.len() - 1
    }

    /// Mutable access to an element; leaves the index stale.
    pub fn element_mut(&mut self, index: usize) -> Option<&mut FieldValue> {
        self.needs_rehash = true;
        self.elements.get_mut(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<FieldValue> {
        if index >= self.elements.len() {
            return None;
        }
        self.needs_rehash = true;
        Some(self.elements.remove(index))
    }

    /// Rebuilds the index, dropping later duplicates of an element.
    pub fn rehash(&mut self) {
        let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
        let mut kept: Vec<FieldValue> = Vec::with_capacity(self.elements.len());
        for value in self.elements.drain(..) {
            let bucket = buckets.entry(hash_of(&value)).or_default();
            if bucket.iter().any(|&i| kept[i] == value) {
                continue;
            }
            bucket.push(kept.len());
            kept.push(value);
        }
        self.elements = kept;
        self.buckets = buckets;
        self.needs_rehash = false;
    }

    pub fn needs_rehash(&self) -> bool {
        self.needs_rehash
    }

    pub fn contains(&self, value: &FieldValue) -> bool {
        if self.needs_rehash {
            return self.elements.iter().any(|e| e == value);
        }
        self.buckets
            .get(&hash_of(value))
            .is_some_and(|bucket| bucket.iter().any(|&i| &self.elements[i] == value))
    }
}

/// Insertion-ordered map with a lazily rebuilt hash index over keys.
#[derive(Debug, Clone, Default)]
pub struct MapValue {
    entries: Vec<(FieldValue, FieldValue)>,
    buckets: HashMap<u64, Vec<usize>>,
    needs_rehash: bool,
}

impl MapValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldValue, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Removes every entry.
    pub fn empty(&mut self) {
        self.entries.clear();
        self.buckets.clear();
        self.needs_rehash = false;
    }

    /// Appends without indexing. Call `rehash` once the batch is complete.
    pub fn add_unhashed(&mut self, key: FieldValue, value: FieldValue) -> usize {
        self.entries.push((key, value));
        self.needs_rehash = true;
        self.entries.len() - 1
    }

    /// Mutable access to an entry's key and value; leaves the index stale.
    pub fn entry_mut(&mut self, index: usize) -> Option<(&mut FieldValue, &mut FieldValue)> {
        self.needs_rehash = true;
        self.entries.get_mut(index).map(|(k, v)| (k, v))
    }

    pub fn remove_at(&mut self, index: usize) -> Option<(FieldValue, FieldValue)> {
        if index >= self.entries.len() {
            return None;
        }
        self.needs_rehash = true;
        Some(self.entries.remove(index))
    }

    /// Rebuilds the index. A repeated key keeps its first position and its last value.
    pub fn rehash(&mut self) {
        let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
        let mut kept: Vec<(FieldValue, FieldValue)> = Vec::with_capacity(self.entries.len());
        for (key, value) in self.entries.drain(..) {
            let bucket = buckets.entry(hash_of(&key)).or_default();
            if let Some(&i) = bucket.iter().find(|&&i| kept[i].0 == key) {
                kept[i].1 = value;
                continue;
            }
            bucket.push(kept.len());
            kept.push((key, value));
        }
        self.entries = kept;
        self.buckets = buckets;
        self.needs_rehash = false;
    }

    pub fn needs_rehash(&self) -> bool {
        self.needs_rehash
    }

    pub fn get(&self, key: &FieldValue) -> Option<&FieldValue> {
        if self.needs_rehash {
            return self.entries.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v);
        }
        self.buckets.get(&hash_of(key)).and_then(|bucket| {
            bucket
                .iter()
                .map(|&i| &self.entries[i])
                .find(|(k, _)| k == key)
                .map(|(_, v)| v)
        })
    }
}
