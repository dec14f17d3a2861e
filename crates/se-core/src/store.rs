//! Histogram store: the external container the engine reads from and the
//! driver writes into.
//!
//! The concrete container is a JSON file holding a flat list of labeled
//! histograms. Lookup is by exact label; a miss is fatal to the run.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::histogram::Histogram;

/// Read access to a flat collection of labeled histograms.
pub trait HistogramStore {
    /// Fetch the histogram with exactly this label.
    fn get(&self, name: &str) -> Result<Histogram>;

    /// Enumerate every stored label. Order carries no meaning.
    fn list_keys(&self) -> Vec<String>;
}

/// On-disk JSON form: a flat list of histograms.
#[derive(Debug, Serialize, Deserialize)]
struct Container {
    histograms: Vec<Histogram>,
}

/// A JSON-backed histogram store.
///
/// Backs both roles: opened read-only as the input store, or created empty
/// and filled via [`JsonStore::put`] as the output store.
#[derive(Debug, Default)]
pub struct JsonStore {
    histograms: BTreeMap<String, Histogram>,
}

impl JsonStore {
    /// Create an empty store.
    pub fn create() -> Self {
        Self::default()
    }

    /// Open an existing store file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let container: Container = serde_json::from_slice(&bytes)?;
        let mut histograms = BTreeMap::new();
        for h in container.histograms {
            histograms.insert(h.name.clone(), h);
        }
        Ok(Self { histograms })
    }

    /// Write or overwrite a histogram under its own current label.
    pub fn put(&mut self, histogram: Histogram) {
        self.histograms.insert(histogram.name.clone(), histogram);
    }

    /// Number of stored histograms.
    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    /// Persist the store to a file, label-sorted for determinism.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let container =
            Container { histograms: self.histograms.values().cloned().collect() };
        let bytes = serde_json::to_vec_pretty(&container)?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }
}

impl HistogramStore for JsonStore {
    fn get(&self, name: &str) -> Result<Histogram> {
        self.histograms
            .get(name)
            .cloned()
            .ok_or_else(|| Error::KeyNotFound(name.to_string()))
    }

    fn list_keys(&self) -> Vec<String> {
        self.histograms.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_overwrites_by_label() {
        let mut store = JsonStore::create();
        store.put(Histogram::new("a", vec![1.0]));
        store.put(Histogram::new("a", vec![2.0]));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().bin_content, vec![2.0]);
    }

    #[test]
    fn missing_key_is_not_found() {
        let store = JsonStore::create();
        match store.get("nope") {
            Err(Error::KeyNotFound(name)) => assert_eq!(name, "nope"),
            other => panic!("expected KeyNotFound, got {:?}", other),
        }
    }

    #[test]
    fn save_and_reopen_roundtrip() {
        let mut store = JsonStore::create();
        let mut h = Histogram::new("data#mt#Nominal#pt_1", vec![1.0, 2.0]);
        h.sumw2 = Some(vec![1.0, 4.0]);
        store.put(h);

        let path = std::env::temp_dir()
            .join(format!("se_store_{}.json", std::process::id()));
        store.save(&path).unwrap();
        let reopened = JsonStore::open(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reopened.list_keys(), vec!["data#mt#Nominal#pt_1".to_string()]);
        let h = reopened.get("data#mt#Nominal#pt_1").unwrap();
        assert_eq!(h.bin_content, vec![1.0, 2.0]);
        assert_eq!(h.sumw2, Some(vec![1.0, 4.0]));
    }
}
