//! Record instances
//!
//! An instance is an arena of value slots laid out by its record type:
//! field `i` owns `arity(i)` consecutive slots. Access is by field index
//! and array index, bounds-checked against the layout.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::schema::RecordType;

use super::value::FieldValue;

#[derive(Debug, Clone)]
pub struct RecordInstance {
    record_type: Arc<RecordType>,
    slots: Vec<FieldValue>,
}

impl RecordInstance {
    /// Allocates a default-initialized instance of `record_type`.
    pub fn new(record_type: Arc<RecordType>) -> Self {
        let mut slots = Vec::with_capacity(record_type.slot_count());
        for field in record_type.fields() {
            for _ in 0..field.arity() {
                slots.push(FieldValue::default_for(field.kind()));
            }
        }
        Self { record_type, slots }
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    /// Value of element `index` of field `field`
    pub fn get(&self, field: usize, index: usize) -> Option<&FieldValue> {
        let slot = self.slot_index(field, index)?;
        self.slots.get(slot)
    }

    pub fn get_mut(&mut self, field: usize, index: usize) -> Option<&mut FieldValue> {
        let slot = self.slot_index(field, index)?;
        self.slots.get_mut(slot)
    }

    /// Stores `value` if the slot exists and the value fits the field's kind.
    pub fn set(&mut self, field: usize, index: usize, value: FieldValue) -> bool {
        let fits = match self.record_type.field(field) {
            Some(descriptor) => value.fits(descriptor.kind()),
            None => return false,
        };
        match self.get_mut(field, index) {
            Some(slot) if fits => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    /// All elements of a field (one for scalar fields)
    pub fn elements(&self, field: usize) -> Option<&[FieldValue]> {
        let range = self.record_type.slot_range(field)?;
        self.slots.get(range)
    }

    /// First element of the field with this export name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        let (index, _) = self.record_type.find_field(name)?;
        self.get(index, 0)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        let (index, _) = self.record_type.find_field(name)?;
        self.get_mut(index, 0)
    }

    fn slot_index(&self, field: usize, index: usize) -> Option<usize> {
        let range = self.record_type.slot_range(field)?;
        if index >= range.len() {
            return None;
        }
        Some(range.start + index)
    }
}

impl PartialEq for RecordInstance {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.record_type, &other.record_type)
            || self.record_type.name() == other.record_type.name())
            && self.slots == other.slots
    }
}

impl Eq for RecordInstance {}

impl Hash for RecordInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.record_type.name().hash(state);
        self.slots.hash(state);
    }
}
