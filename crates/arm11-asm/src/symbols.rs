use std::collections::HashMap;

use crate::error::AsmError;

/// String to integer table. Inserting an existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolMap {
    entries: HashMap<String, u32>,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: u32) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn lookup(&self, key: &str) -> Result<u32, AsmError> {
        self.entries
            .get(key)
            .copied()
            .ok_or_else(|| AsmError::UnknownSymbol(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by value, then name.
    pub fn sorted(&self) -> Vec<(&str, u32)> {
        let mut v: Vec<_> = self.entries.iter().map(|(k, &a)| (k.as_str(), a)).collect();
        v.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        v
    }
}
