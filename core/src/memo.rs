//! Memoization of expensive stage results.
//!
//! Keys are `(table content hash, parameter bits)`. Any change to a
//! cell, a column or a parameter yields a different key. A cache lives
//! inside one `TsaEngine`; there is no process-wide cache.

use crate::table::{Cell, TableRegistry};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(u64);

impl ContentHash {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Hash every table name, column and cell. Floats hash by bit pattern.
pub fn hash_registry(registry: &TableRegistry) -> ContentHash {
    let mut hasher = DefaultHasher::new();
    registry.len().hash(&mut hasher);
    for table in registry.tables() {
        table.name().hash(&mut hasher);
        table.key_column().hash(&mut hasher);
        table.columns().hash(&mut hasher);
        table.len().hash(&mut hasher);
        for row in table.rows() {
            row.key.hash(&mut hasher);
            for cell in &row.cells {
                hash_cell(cell, &mut hasher);
            }
        }
    }
    ContentHash(hasher.finish())
}

fn hash_cell<H: Hasher>(cell: &Cell, state: &mut H) {
    match cell {
        Cell::Number(v) => {
            0u8.hash(state);
            v.to_bits().hash(state);
        }
        Cell::Text(s) => {
            1u8.hash(state);
            s.hash(state);
        }
        Cell::Missing => 2u8.hash(state),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
    tables: ContentHash,
    params: Vec<u64>,
}

impl MemoKey {
    pub fn new(tables: ContentHash, params: &[f64]) -> Self {
        Self {
            tables,
            params: params.iter().map(|p| p.to_bits()).collect(),
        }
    }
}

/// Small LRU keyed by `MemoKey`, most recently used first.
#[derive(Debug)]
pub struct MemoCache<V> {
    cap:     NonZeroUsize,
    entries: Vec<(MemoKey, V)>,
    hits:    u64,
    misses:  u64,
}

impl<V: Clone> MemoCache<V> {
    pub fn new(cap: NonZeroUsize) -> Self {
        Self {
            cap,
            entries: Vec::with_capacity(cap.get()),
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn get(&mut self, key: &MemoKey) -> Option<&V> {
        let Some(pos) = self.entries.iter().position(|(k, _)| k == key) else {
            self.misses += 1;
            return None;
        };
        self.hits += 1;
        if pos != 0 {
            let entry = self.entries.remove(pos);
            self.entries.insert(0, entry);
        }
        self.entries.first().map(|(_, value)| value)
    }

    pub fn put(&mut self, key: MemoKey, value: V) -> Option<V> {
        let mut old_value = None;
        if let Some(pos) = self.entries.iter().position(|(k, _)| k == &key) {
            let (_, existing) = self.entries.remove(pos);
            old_value = Some(existing);
        } else if self.entries.len() == self.cap.get() {
            self.entries.pop();
        }
        self.entries.insert(0, (key, value));
        old_value
    }

    /// Cached clone for `key`, or compute, store and return it.
    pub fn get_or_insert_with(&mut self, key: MemoKey, compute: impl FnOnce() -> V) -> V {
        if let Some(v) = self.get(&key) {
            return v.clone();
        }
        let value = compute();
        self.put(key, value.clone());
        value
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
