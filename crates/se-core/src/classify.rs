//! Single-pass classification of the input store's keys into the per-method
//! input indices consumed by the driver.

use std::collections::BTreeMap;

use crate::catalog;
use crate::error::Result;
use crate::key::RawKey;
use crate::store::HistogramStore;

/// Variation marker of the fake-factor shape-variation region.
pub const FF_MARKER: &str = "anti_iso";

/// Variation marker of the same-sign QCD control region.
pub const QCD_MARKER: &str = "same_sign";

/// The unshifted variation label.
pub const NOMINAL: &str = "Nominal";

/// Dataset label of observed data.
pub const DATA_DATASET: &str = "data";

/// Dataset label of the embedded sample.
pub const EMB_DATASET: &str = "EMB";

/// Four-level index: channel -> category -> variable -> variation -> observed
/// process labels. Built once per run, read-only afterwards.
#[derive(Debug, Default)]
pub struct ClassificationIndex {
    paths: BTreeMap<String, BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<String>>>>>,
}

impl ClassificationIndex {
    fn insert(&mut self, channel: &str, category: &str, variable: &str, variation: &str, process: &str) {
        let processes = self
            .paths
            .entry(channel.to_string())
            .or_default()
            .entry(category.to_string())
            .or_default()
            .entry(variable.to_string())
            .or_default()
            .entry(variation.to_string())
            .or_default();
        if !processes.iter().any(|p| p == process) {
            processes.push(process.to_string());
        }
    }

    /// Iterate all (channel, category, variable, variation) paths in
    /// deterministic (sorted) order.
    pub fn iter_paths(&self) -> impl Iterator<Item = (&str, &str, &str, &str)> {
        self.paths.iter().flat_map(|(ch, cats)| {
            cats.iter().flat_map(move |(cat, vars)| {
                vars.iter().flat_map(move |(var, variations)| {
                    variations
                        .keys()
                        .map(move |variation| (ch.as_str(), cat.as_str(), var.as_str(), variation.as_str()))
                })
            })
        })
    }

    /// Observed process labels under one path, if present.
    pub fn processes(&self, channel: &str, category: &str, variable: &str, variation: &str) -> Option<&[String]> {
        self.paths
            .get(channel)?
            .get(category)?
            .get(variable)?
            .get(variation)
            .map(Vec::as_slice)
    }

    /// Total number of paths.
    pub fn len(&self) -> usize {
        self.iter_paths().count()
    }

    /// True if no path was recorded.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Three-level index of categories available for the embedded contamination
/// correction: channel -> category -> variables.
#[derive(Debug, Default)]
pub struct EmbeddedIndex {
    paths: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl EmbeddedIndex {
    fn insert(&mut self, channel: &str, category: &str, variable: &str) {
        let variables = self
            .paths
            .entry(channel.to_string())
            .or_default()
            .entry(category.to_string())
            .or_default();
        if !variables.iter().any(|v| v == variable) {
            variables.push(variable.to_string());
        }
    }

    /// Iterate all (channel, category, variable) paths in deterministic order.
    pub fn iter_paths(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.paths.iter().flat_map(|(ch, cats)| {
            cats.iter().flat_map(move |(cat, vars)| {
                vars.iter().map(move |var| (ch.as_str(), cat.as_str(), var.as_str()))
            })
        })
    }

    /// True if no path was recorded.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// The three indices produced by one scan of the input store.
#[derive(Debug, Default)]
pub struct ClassifiedInputs {
    /// Paths with an `anti_iso` variation, for the fake-factor method.
    pub fake_factor: ClassificationIndex,
    /// Paths with a `same_sign` variation, for the QCD method.
    pub qcd: ClassificationIndex,
    /// Nominal embedded-sample categories, for the contamination correction.
    pub embedded: EmbeddedIndex,
}

/// Scan every key in the store once and build the three indices.
///
/// Idempotent and order-independent: the same key set yields the same indices
/// regardless of scan order, since paths and process lists deduplicate on
/// insert and all maps iterate sorted.
pub fn classify_inputs(store: &dyn HistogramStore) -> Result<ClassifiedInputs> {
    let mut inputs = ClassifiedInputs::default();
    for name in store.list_keys() {
        let raw = RawKey::parse(&name)?;
        let is_data = raw.dataset == DATA_DATASET;

        if raw.variation.contains(FF_MARKER) || raw.variation.contains(QCD_MARKER) {
            let sel = raw.decompose_selection(is_data)?;
            if raw.variation.contains(FF_MARKER) {
                inputs.fake_factor.insert(
                    &sel.channel,
                    &sel.category,
                    &raw.variable,
                    &raw.variation,
                    &sel.process,
                );
            }
            if raw.variation.contains(QCD_MARKER) {
                inputs.qcd.insert(
                    &sel.channel,
                    &sel.category,
                    &raw.variable,
                    &raw.variation,
                    &sel.process,
                );
            }
        }

        if raw.variation == NOMINAL && raw.dataset == EMB_DATASET {
            // The remainder after the channel is the merged process label plus
            // an optional category; strip the label and leftover separators.
            let (channel, rest) = raw.selection.split_once('-').unwrap_or((raw.selection.as_str(), ""));
            let emb_process = catalog::lookup("EMB")?.process;
            let category = rest.replace(emb_process, "");
            inputs.embedded.insert(channel, category.trim_matches('-'), &raw.variable);
        }
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::Histogram;
    use crate::store::JsonStore;

    fn synthetic_store() -> JsonStore {
        let mut store = JsonStore::create();
        for ch in ["et", "mt"] {
            for cat in ["catA", "catB"] {
                for variation in [FF_MARKER, QCD_MARKER] {
                    store.put(Histogram::new(
                        format!("data#{ch}-{cat}#{variation}#pt_1"),
                        vec![1.0],
                    ));
                    store.put(Histogram::new(
                        format!("DY#{ch}-DY-ZTT-{cat}#{variation}#pt_1"),
                        vec![1.0],
                    ));
                }
                store.put(Histogram::new(
                    format!("EMB#{ch}-Embedded-{cat}#Nominal#pt_1"),
                    vec![1.0],
                ));
            }
        }
        store
    }

    #[test]
    fn indices_contain_exactly_the_observed_paths() {
        let inputs = classify_inputs(&synthetic_store()).unwrap();

        let ff: Vec<_> = inputs.fake_factor.iter_paths().collect();
        assert_eq!(
            ff,
            vec![
                ("et", "catA", "pt_1", "anti_iso"),
                ("et", "catB", "pt_1", "anti_iso"),
                ("mt", "catA", "pt_1", "anti_iso"),
                ("mt", "catB", "pt_1", "anti_iso"),
            ]
        );

        let qcd: Vec<_> = inputs.qcd.iter_paths().collect();
        assert_eq!(qcd.len(), 4);
        assert!(qcd.iter().all(|(_, _, _, variation)| *variation == "same_sign"));

        let emb: Vec<_> = inputs.embedded.iter_paths().collect();
        assert_eq!(
            emb,
            vec![
                ("et", "catA", "pt_1"),
                ("et", "catB", "pt_1"),
                ("mt", "catA", "pt_1"),
                ("mt", "catB", "pt_1"),
            ]
        );
    }

    #[test]
    fn observed_processes_deduplicate() {
        let mut store = synthetic_store();
        // Two datasets resolving to the same process under the same path.
        store.put(Histogram::new("DYlow#mt-DY-ZTT-catA#anti_iso#pt_1", vec![1.0]));
        let inputs = classify_inputs(&store).unwrap();
        let procs = inputs.fake_factor.processes("mt", "catA", "pt_1", "anti_iso").unwrap();
        // Sorted key order scans the simulation key first.
        assert_eq!(procs, ["DY-ZTT", "data"]);
    }

    #[test]
    fn embedded_category_strips_process_label() {
        let mut store = JsonStore::create();
        store.put(Histogram::new("EMB#tt-Embedded#Nominal#m_vis", vec![1.0]));
        let inputs = classify_inputs(&store).unwrap();
        let emb: Vec<_> = inputs.embedded.iter_paths().collect();
        assert_eq!(emb, vec![("tt", "", "m_vis")]);
    }

    #[test]
    fn nominal_non_embedded_keys_are_ignored() {
        let mut store = JsonStore::create();
        store.put(Histogram::new("data#mt-catA#Nominal#pt_1", vec![1.0]));
        store.put(Histogram::new("DY#mt-DY-ZTT-catA#Nominal#pt_1", vec![1.0]));
        let inputs = classify_inputs(&store).unwrap();
        assert!(inputs.fake_factor.is_empty());
        assert!(inputs.qcd.is_empty());
        assert!(inputs.embedded.is_empty());
    }
}
