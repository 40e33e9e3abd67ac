//! FILENAME: core/pivot-engine/src/dictionary.rs
//! Dictionary - column types and display names.
//!
//! One structure serves two lookups: the semantic type of a column (filled
//! by type inference when a table is built) and the short display name of
//! any key (columns, category values, statistic names). Report-specific
//! dictionaries are layered over the built-in one with `add`/`merge`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::types::{SemanticType, StatKind};

/// One dictionary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub key: String,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SemanticType>,

    #[serde(default, rename = "shortName", skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

impl DictionaryEntry {
    pub fn typed(key: impl Into<String>, kind: SemanticType) -> Self {
        DictionaryEntry {
            key: key.into(),
            kind: Some(kind),
            short_name: None,
        }
    }

    pub fn named(key: impl Into<String>, short_name: impl Into<String>) -> Self {
        DictionaryEntry {
            key: key.into(),
            kind: None,
            short_name: Some(short_name.into()),
        }
    }
}

/// Entry property readable through `Dictionary::get_prop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryProp {
    ShortName,
    Type,
}

/// Ordered, key-unique collection of entries.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    index: FxHashMap<String, usize>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary::default()
    }

    /// Display names for the analyzer's statistics.
    pub fn stat_names() -> Self {
        let mut dict = Dictionary::new();
        for (kind, name) in [
            (StatKind::Count, "Count"),
            (StatKind::CountDistinct, "Distinct"),
            (StatKind::CountNonEmpty, "Count"),
            (StatKind::Sum, "Total"),
            (StatKind::Avg, "Average"),
            (StatKind::AvgNonEmpty, "Average"),
            (StatKind::Min, "Min"),
            (StatKind::Max, "Max"),
        ] {
            dict.set(DictionaryEntry::named(kind.name(), name));
        }
        dict
    }

    /// Inserts the entry, replacing any entry with the same key.
    pub fn set(&mut self, entry: DictionaryEntry) {
        match self.index.get(&entry.key) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.index.insert(entry.key.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Short display name of `key`, or `key` itself.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.find(key)
            .and_then(|e| e.short_name.as_deref())
            .unwrap_or(key)
    }

    /// Property `prop` of `key` as text, or `key` itself when absent.
    pub fn get_prop(&self, key: &str, prop: EntryProp) -> String {
        let entry = self.find(key);
        match prop {
            EntryProp::ShortName => entry.and_then(|e| e.short_name.clone()),
            EntryProp::Type => entry.and_then(|e| e.kind).map(|k| k.to_string()),
        }
        .unwrap_or_else(|| key.to_string())
    }

    /// Semantic type of `key`, if the dictionary records one.
    pub fn kind(&self, key: &str) -> Option<SemanticType> {
        self.find(key).and_then(|e| e.kind)
    }

    pub fn find(&self, key: &str) -> Option<&DictionaryEntry> {
        self.index.get(key).map(|&pos| &self.entries[pos])
    }

    pub fn exist(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Bulk upsert.
    pub fn add<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = DictionaryEntry>,
    {
        for entry in entries {
            self.set(entry);
        }
    }

    /// Upserts every entry of `other`.
    pub fn merge(&mut self, other: &Dictionary) {
        self.add(other.entries.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<DictionaryEntry> for Dictionary {
    fn from_iter<T: IntoIterator<Item = DictionaryEntry>>(iter: T) -> Self {
        let mut dict = Dictionary::new();
        dict.add(iter);
        dict
    }
}
