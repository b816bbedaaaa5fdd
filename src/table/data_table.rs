//! Keyed row storage
//!
//! Rows live in an `IndexMap` so enumeration order is insertion order and
//! stays stable across export pages. Replacing an existing key keeps the
//! row's position.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::record::RecordInstance;
use crate::schema::RecordType;

use super::policy::TablePolicy;
use super::row_name::RowName;

#[derive(Debug, Clone, Default)]
pub struct DataTable {
    row_struct: Option<Arc<RecordType>>,
    policy: TablePolicy,
    rows: IndexMap<RowName, RecordInstance>,
}

impl DataTable {
    /// Creates an empty table whose rows are `row_struct` instances.
    pub fn new(row_struct: Arc<RecordType>) -> Self {
        Self {
            row_struct: Some(row_struct),
            policy: TablePolicy::default(),
            rows: IndexMap::new(),
        }
    }

    /// Creates a table with no row struct. Imports into it fail.
    pub fn without_row_struct() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: TablePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn row_struct(&self) -> Option<&Arc<RecordType>> {
        self.row_struct.as_ref()
    }

    pub fn policy(&self) -> &TablePolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_row(&self, name: &str) -> bool {
        self.rows.contains_key(name)
    }

    pub fn row(&self, name: &str) -> Option<&RecordInstance> {
        self.rows.get(name)
    }

    /// Registers a default-initialized row under `name` and returns it.
    ///
    /// An existing row with the same name is replaced in place. Returns
    /// `None` when the table has no row struct.
    pub fn add_row(&mut self, name: RowName) -> Option<&mut RecordInstance> {
        let record_type = Arc::clone(self.row_struct.as_ref()?);
        let (index, _) = self.rows.insert_full(name, RecordInstance::new(record_type));
        self.rows.get_index_mut(index).map(|(_, row)| row)
    }

    /// Drops every row.
    pub fn empty_table(&mut self) {
        self.rows.clear();
    }

    /// Rows in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (&RowName, &RecordInstance)> {
        self.rows.iter()
    }

    pub fn row_names(&self) -> impl Iterator<Item = &RowName> {
        self.rows.keys()
    }

    /// Rows in `[start, start + max)`, clamped to the table.
    pub fn page(&self, start: usize, max: usize) -> impl Iterator<Item = (&RowName, &RecordInstance)> {
        self.rows.iter().skip(start).take(max)
    }
}
