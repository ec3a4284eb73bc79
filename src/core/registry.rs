//! Deduplicated, insertion-ordered endpoint registry.
//!
//! Each entry pairs the discovered record with its usage weight, so the
//! weight of entry `i` always belongs to record `i`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    Static,
    Probe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_line: Option<usize>,
    pub methods: BTreeSet<String>,
    pub discovery: DiscoveryMethod,
}

impl EndpointRecord {
    pub fn from_source(
        path: impl Into<String>,
        file: impl Into<PathBuf>,
        line: usize,
        methods: BTreeSet<String>,
    ) -> Self {
        Self {
            path: path.into(),
            source_file: Some(file.into()),
            source_line: Some(line),
            methods,
            discovery: DiscoveryMethod::Static,
        }
    }

    pub fn from_probe(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source_file: None,
            source_line: None,
            methods: BTreeSet::from(["GET".to_string()]),
            discovery: DiscoveryMethod::Probe,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryEntry {
    pub record: EndpointRecord,
    pub usage: f64,
}

#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    entries: Vec<RegistryEntry>,
    index: FxHashMap<String, usize>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` unless its path is already known. Returns `true` when
    /// the record was added.
    pub fn insert(&mut self, record: EndpointRecord) -> bool {
        if self.index.contains_key(&record.path) {
            return false;
        }
        self.index.insert(record.path.clone(), self.entries.len());
        self.entries.push(RegistryEntry { record, usage: 0.0 });
        true
    }

    /// Insert every record in order, returning how many were new.
    pub fn extend<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = EndpointRecord>,
    {
        records
            .into_iter()
            .map(|r| self.insert(r))
            .filter(|added| *added)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn position(&self, path: &str) -> Option<usize> {
        self.index.get(path).copied()
    }

    pub fn get(&self, path: &str) -> Option<&RegistryEntry> {
        self.position(path).map(|i| &self.entries[i])
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn records(&self) -> impl Iterator<Item = &EndpointRecord> {
        self.entries.iter().map(|e| &e.record)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.record.path.as_str())
    }

    /// Records of one discovery method, in registry order.
    pub fn discovered_by(&self, method: DiscoveryMethod) -> Vec<EndpointRecord> {
        self.records()
            .filter(|r| r.discovery == method)
            .cloned()
            .collect()
    }

    /// Usage weights in registry order.
    pub fn usage_vector(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.usage).collect()
    }

    pub fn set_usage(&mut self, path: &str, weight: f64) -> bool {
        match self.position(path) {
            Some(i) => {
                self.entries[i].usage = weight;
                true
            }
            None => false,
        }
    }

    /// Mutable view of the usage weights, aligned with `entries()`.
    pub(crate) fn usage_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        self.entries.iter_mut().map(|e| &mut e.usage)
    }

    pub fn into_records(self) -> Vec<EndpointRecord> {
        self.entries.into_iter().map(|e| e.record).collect()
    }
}

impl FromIterator<EndpointRecord> for EndpointRegistry {
    fn from_iter<I: IntoIterator<Item = EndpointRecord>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}
