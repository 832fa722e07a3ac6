use core_types::{Record, ViewFilter};

/// The in-memory dataset: every record that survived loading, in file order.
///
/// The table is never mutated after construction. Filtering borrows from it
/// and returns a fresh view.
#[derive(Debug, Clone, Default)]
pub struct CanonicalTable {
    records: Vec<Record>,
}

impl CanonicalTable {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the records matching every predicate in `filter`, preserving order.
    pub fn filter(&self, filter: &ViewFilter) -> Vec<&Record> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }
}
