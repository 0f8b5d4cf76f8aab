//! Country reference table.
//!
//! Maps a country key to its [`CountryRecord`]. Lookup is total: any key that
//! is absent (or the literal `"Other"`) resolves to the fallback record, so
//! callers never handle a missing country.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, instrument};

use schoolprompt_shared::{CountryRecord, OTHER_COUNTRY, Result, SchoolPromptError};

/// Reference data compiled into the binary.
const EMBEDDED_DATA: &str = include_str!("../data/countries.toml");

/// On-disk layout of a reference data file.
#[derive(Debug, Deserialize)]
struct ReferenceFile {
    #[serde(default)]
    countries: Vec<CountryRecord>,
}

/// Immutable country lookup table with a guaranteed fallback record.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    records: Vec<CountryRecord>,
    index: HashMap<String, usize>,
    fallback: usize,
}

impl ReferenceTable {
    /// Parse the built-in reference data.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_DATA)
    }

    /// Parse reference data from a TOML document with `[[countries]]` entries.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file = parse_reference_file(content)?;
        Self::from_records(file.countries)
    }

    /// Build a table from records. Requires an `"Other"` record and unique keys.
    pub fn from_records(records: Vec<CountryRecord>) -> Result<Self> {
        let index = build_index(&records)?;

        let fallback = *index.get(OTHER_COUNTRY).ok_or_else(|| {
            SchoolPromptError::reference(format!("missing \"{OTHER_COUNTRY}\" fallback record"))
        })?;

        debug!(countries = records.len(), "reference table built");

        Ok(Self {
            records,
            index,
            fallback,
        })
    }

    /// Overlay records from a TOML file. Returns the number of records applied.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn merge_file(&mut self, path: &Path) -> Result<usize> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SchoolPromptError::io(path, e))?;
        let file = parse_reference_file(&content)?;
        let applied = self.merge_records(file.countries)?;

        info!(applied, "merged reference overlay");
        Ok(applied)
    }

    /// Replace records with matching keys and append new ones.
    pub fn merge_records(&mut self, records: Vec<CountryRecord>) -> Result<usize> {
        // Reject duplicates within the overlay before touching the table.
        build_index(&records)?;

        let applied = records.len();
        for record in records {
            match self.index.get(&record.key) {
                Some(&pos) => {
                    debug!(key = %record.key, "replacing country record");
                    self.records[pos] = record;
                }
                None => {
                    debug!(key = %record.key, "adding country record");
                    self.index.insert(record.key.clone(), self.records.len());
                    self.records.push(record);
                }
            }
        }

        Ok(applied)
    }

    /// Record for `key`, or the fallback record. Never fails.
    pub fn lookup(&self, key: &str) -> &CountryRecord {
        self.get(key).unwrap_or_else(|| self.fallback())
    }

    /// Record for `key` if the table has one (including `"Other"`).
    pub fn get(&self, key: &str) -> Option<&CountryRecord> {
        self.index.get(key).map(|&pos| &self.records[pos])
    }

    /// The generic `"Other"` record.
    pub fn fallback(&self) -> &CountryRecord {
        &self.records[self.fallback]
    }

    /// Whether `key` names a supported country (the fallback does not count).
    pub fn is_known(&self, key: &str) -> bool {
        key != OTHER_COUNTRY && self.index.contains_key(key)
    }

    /// Supported country keys in data order, excluding `"Other"`.
    pub fn known_keys(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .map(|r| r.key.as_str())
            .filter(|key| *key != OTHER_COUNTRY)
    }

    /// All records in data order, including the fallback.
    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_reference_file(content: &str) -> Result<ReferenceFile> {
    toml::from_str(content)
        .map_err(|e| SchoolPromptError::reference(format!("invalid reference data: {e}")))
}

/// Map keys to positions, rejecting blank and duplicate keys.
fn build_index(records: &[CountryRecord]) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(records.len());

    for (pos, record) in records.iter().enumerate() {
        if record.key.trim().is_empty() {
            return Err(SchoolPromptError::reference(format!(
                "country record #{pos} has a blank key"
            )));
        }
        if index.insert(record.key.clone(), pos).is_some() {
            return Err(SchoolPromptError::reference(format!(
                "duplicate country key \"{}\"",
                record.key
            )));
        }
    }

    Ok(index)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
