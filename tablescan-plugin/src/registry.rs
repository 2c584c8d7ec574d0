//! Special column registry

use crate::SpecialColumn;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Header text reduced for matching: lowercase, no whitespace
///
/// `"Wait For"`, `"wait for"` and `"WaitFor"` all normalize to `"waitfor"`.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Special columns by header
#[derive(Clone, Default)]
pub struct ColumnRegistry {
    columns: HashMap<String, Arc<dyn SpecialColumn>>,
    order: Vec<String>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column<C: SpecialColumn + 'static>(mut self, column: C) -> Self {
        self.register(column);
        self
    }

    /// Add a column, replacing any previous one with the same header
    pub fn register<C: SpecialColumn + 'static>(&mut self, column: C) {
        self.insert(Arc::new(column));
    }

    fn insert(&mut self, column: Arc<dyn SpecialColumn>) {
        let key = normalize_header(&column.meta().name);
        if self.columns.insert(key.clone(), column).is_none() {
            self.order.push(key);
        }
    }

    /// Add all columns of another registry; its columns win on conflict
    pub fn merge(mut self, other: ColumnRegistry) -> Self {
        for key in &other.order {
            if let Some(column) = other.columns.get(key) {
                self.insert(Arc::clone(column));
            }
        }
        self
    }

    pub fn get(&self, header: &str) -> Option<Arc<dyn SpecialColumn>> {
        self.columns.get(&normalize_header(header)).cloned()
    }

    pub fn contains(&self, header: &str) -> bool {
        self.columns.contains_key(&normalize_header(header))
    }

    /// Registered headers in registration order
    pub fn names(&self) -> Vec<String> {
        self.order
            .iter()
            .filter_map(|key| self.columns.get(key))
            .map(|c| c.meta().name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column metadata as JSON, for help output
    pub fn list_columns(&self) -> serde_json::Value {
        let metas: Vec<_> = self
            .order
            .iter()
            .filter_map(|key| self.columns.get(key))
            .map(|c| c.meta())
            .collect();
        serde_json::to_value(metas).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Debug for ColumnRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnRegistry")
            .field("columns", &self.names())
            .finish()
    }
}
