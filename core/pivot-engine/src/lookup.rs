//! FILENAME: core/pivot-engine/src/lookup.rs
//! Canonicalization of categorical labels.
//!
//! Exports spell the same category several ways ("S. KOREA", "S.KOREA").
//! The lookup maps raw variants to one canonical label. A label without an
//! entry passes through unchanged; a miss is never an error.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Maps raw label variants to canonical labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lookup {
    entries: FxHashMap<String, String>,
}

impl Lookup {
    pub fn new() -> Self {
        Lookup::default()
    }

    /// The variants seen in bookings/pipeline exports.
    pub fn builtin() -> Self {
        let mut lookup = Lookup::new();
        for (raw, canonical) in [
            ("S. KOREA", "S.KOREA"),
            ("SOUTH KOREA", "S.KOREA"),
            ("KOREA", "S.KOREA"),
            ("AUSTRALIA & NEW ZEALAND", "ANZ"),
            ("AUSTRALIA/NZ", "ANZ"),
            ("SOUTH EAST ASIA", "ASEAN"),
            ("SE ASIA", "ASEAN"),
            ("GREATER CHINA", "GCR"),
            ("HONG KONG", "HK"),
            ("UNITED STATES", "USA"),
            ("U.S.", "USA"),
            ("UNITED KINGDOM", "UK"),
        ] {
            lookup.insert(raw, canonical);
        }
        lookup
    }

    /// Adds or replaces one mapping.
    pub fn insert(&mut self, raw: impl Into<String>, canonical: impl Into<String>) {
        self.entries.insert(raw.into(), canonical.into());
    }

    /// Layers `other` over this lookup; entries of `other` win.
    pub fn extend(&mut self, other: &Lookup) {
        for (raw, canonical) in &other.entries {
            self.entries.insert(raw.clone(), canonical.clone());
        }
    }

    /// Canonical label for `raw`, or `raw` itself.
    pub fn canonical<'a>(&'a self, raw: &'a str) -> &'a str {
        self.entries.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
