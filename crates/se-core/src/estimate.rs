//! The estimation engine: fetch a base histogram, subtract a weighted set of
//! contribution histograms, relabel the result.
//!
//! Output labels are never derived by substring surgery on the input label.
//! The base key is rebuilt as a [`HistogramKey`] record with the method's
//! overrides (new dataset/process, derived variation) and encoded once.

use crate::catalog;
use crate::classify::{FF_MARKER, NOMINAL, QCD_MARKER};
use crate::error::Result;
use crate::histogram::Histogram;
use crate::key::HistogramKey;
use crate::store::HistogramStore;

/// Processes subtracted by the fake-factor method.
pub fn fake_factor_contributions(use_embedded: bool) -> &'static [&'static str] {
    if use_embedded {
        &["EMB", "ZL", "TTL", "VVL"]
    } else {
        &["ZTT", "ZL", "TTT", "TTL", "VVT", "VVL"]
    }
}

/// Processes subtracted by the QCD method. The electron-muon final state has
/// no jet-fake subdivision, so its set drops the J-suffixed processes.
pub fn qcd_contributions(use_embedded: bool, channel: &str) -> &'static [&'static str] {
    let em = channel.contains("em");
    match (use_embedded, em) {
        (true, false) => &["EMB", "ZL", "ZJ", "TTL", "TTJ", "VVL", "VVJ", "W"],
        (true, true) => &["EMB", "ZL", "TTL", "VVL", "W"],
        (false, false) => &["ZTT", "ZL", "ZJ", "TTT", "TTL", "TTJ", "VVT", "VVL", "VVJ", "W"],
        (false, true) => &["ZTT", "ZL", "TTT", "TTL", "VVT", "VVL", "W"],
    }
}

fn subtract_contributions(
    store: &dyn HistogramStore,
    base: &mut Histogram,
    tags: &[&str],
    channel: &str,
    category: &str,
    variation: &str,
    variable: &str,
) -> Result<()> {
    for tag in tags {
        let entry = catalog::lookup(tag)?;
        let key = HistogramKey {
            dataset: entry.dataset.to_string(),
            channel: channel.to_string(),
            process: entry.process.to_string(),
            category: category.to_string(),
            variation: variation.to_string(),
            variable: variable.to_string(),
        };
        let contribution = store.get(&key.encode())?;
        base.add_scaled(&contribution, -1.0)?;
    }
    Ok(())
}

/// Variation label of the estimated histogram: the marker variation itself
/// maps to `Nominal`, a shifted variation keeps its shift with the marker
/// replaced by the `CMS` prefix.
fn derived_variation(variation: &str, marker: &str) -> String {
    if variation == marker {
        NOMINAL.to_string()
    } else {
        variation.replace(marker, "CMS")
    }
}

/// Fake-factor background estimate for one (channel, category, variable,
/// variation) path.
///
/// Subtracts the genuine-lepton contributions from the anti-isolation data
/// histogram and re-emits it as `jetFakes` (embedded subtraction) or
/// `jetFakesMC` (pure simulation subtraction).
pub fn fake_factor_estimation(
    store: &dyn HistogramStore,
    channel: &str,
    category: &str,
    variable: &str,
    variation: &str,
    use_embedded: bool,
) -> Result<Histogram> {
    let base_key = HistogramKey {
        dataset: "data".to_string(),
        channel: channel.to_string(),
        process: String::new(),
        category: category.to_string(),
        variation: variation.to_string(),
        variable: variable.to_string(),
    };
    let mut base = store.get(&base_key.encode())?;
    subtract_contributions(
        store,
        &mut base,
        fake_factor_contributions(use_embedded),
        channel,
        category,
        variation,
        variable,
    )?;

    let proc_name = if use_embedded { "jetFakes" } else { "jetFakesMC" };
    let label = HistogramKey {
        dataset: proc_name.to_string(),
        channel: channel.to_string(),
        process: proc_name.to_string(),
        category: category.to_string(),
        variation: derived_variation(variation, FF_MARKER),
        variable: variable.to_string(),
    };
    base.set_label(label.encode());
    Ok(base)
}

/// QCD multijet estimate for one (channel, category, variable, variation)
/// path, from the same-sign control region.
///
/// After the subtractions the result is scaled by the same-sign to
/// opposite-sign `extrapolation_factor`.
pub fn qcd_estimation(
    store: &dyn HistogramStore,
    channel: &str,
    category: &str,
    variable: &str,
    variation: &str,
    use_embedded: bool,
    extrapolation_factor: f64,
) -> Result<Histogram> {
    let base_key = HistogramKey {
        dataset: "data".to_string(),
        channel: channel.to_string(),
        process: String::new(),
        category: category.to_string(),
        variation: variation.to_string(),
        variable: variable.to_string(),
    };
    let mut base = store.get(&base_key.encode())?;
    subtract_contributions(
        store,
        &mut base,
        qcd_contributions(use_embedded, channel),
        channel,
        category,
        variation,
        variable,
    )?;
    base.scale(extrapolation_factor);

    let proc_name = if use_embedded { "QCD" } else { "QCDMC" };
    let label = HistogramKey {
        dataset: proc_name.to_string(),
        channel: channel.to_string(),
        process: proc_name.to_string(),
        category: category.to_string(),
        variation: derived_variation(variation, QCD_MARKER),
        variable: variable.to_string(),
    };
    base.set_label(label.encode());
    Ok(base)
}

/// Residual ttbar contamination variation of the embedded sample.
///
/// Subtracts the genuine-tau ttbar contribution from the nominal embedded
/// histogram with weight `sub_scale`; a positive scale yields the `Down`
/// variation, a negative one the `Up` variation. Relabeling happens once,
/// after all subtractions.
pub fn emb_ttbar_contamination_estimation(
    store: &dyn HistogramStore,
    channel: &str,
    category: &str,
    variable: &str,
    sub_scale: f64,
) -> Result<Histogram> {
    let emb = catalog::lookup("EMB")?;
    let base_key = HistogramKey {
        dataset: emb.dataset.to_string(),
        channel: channel.to_string(),
        process: emb.process.to_string(),
        category: category.to_string(),
        variation: NOMINAL.to_string(),
        variable: variable.to_string(),
    };
    let mut base = store.get(&base_key.encode())?;

    let ttt = catalog::lookup("TTT")?;
    let contribution_key = HistogramKey {
        dataset: ttt.dataset.to_string(),
        channel: channel.to_string(),
        process: ttt.process.to_string(),
        category: category.to_string(),
        variation: NOMINAL.to_string(),
        variable: variable.to_string(),
    };
    let contribution = store.get(&contribution_key.encode())?;
    base.add_scaled(&contribution, -sub_scale)?;

    let variation =
        if sub_scale > 0.0 { "CMS_htt_emb_ttbarDown" } else { "CMS_htt_emb_ttbarUp" };
    let label = HistogramKey { variation: variation.to_string(), ..base_key };
    base.set_label(label.encode());
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStore;

    fn put(store: &mut JsonStore, label: &str, bins: Vec<f64>) {
        store.put(Histogram::new(label, bins));
    }

    fn ff_store(variation: &str) -> JsonStore {
        let mut store = JsonStore::create();
        put(&mut store, &format!("data#mt-catA#{variation}#pt_1"), vec![10.0]);
        for (label, value) in [
            ("EMB#mt-Embedded-catA", 1.0),
            ("DY#mt-DY-ZL-catA", 0.5),
            ("TT#mt-TT-TTL-catA", 0.25),
            ("VV#mt-VV-VVL-catA", 0.25),
        ] {
            put(&mut store, &format!("{label}#{variation}#pt_1"), vec![value]);
        }
        store
    }

    #[test]
    fn fake_factor_subtracts_and_relabels() {
        let store = ff_store("anti_iso");
        let h = fake_factor_estimation(&store, "mt", "catA", "pt_1", "anti_iso", true).unwrap();
        assert_eq!(h.name, "jetFakes#mt-jetFakes-catA#Nominal#pt_1");
        assert_eq!(h.title, h.name);
        assert_eq!(h.bin_content, vec![8.0]);
    }

    #[test]
    fn fake_factor_is_deterministic() {
        let store = ff_store("anti_iso");
        let a = fake_factor_estimation(&store, "mt", "catA", "pt_1", "anti_iso", true).unwrap();
        let b = fake_factor_estimation(&store, "mt", "catA", "pt_1", "anti_iso", true).unwrap();
        assert_eq!(a.name, b.name);
        assert_eq!(a.bin_content, b.bin_content);
    }

    #[test]
    fn fake_factor_shifted_variation_maps_marker_to_cms() {
        let store = ff_store("anti_iso_up");
        let h =
            fake_factor_estimation(&store, "mt", "catA", "pt_1", "anti_iso_up", true).unwrap();
        assert_eq!(h.name, "jetFakes#mt-jetFakes-catA#CMS_up#pt_1");
    }

    #[test]
    fn fake_factor_mc_subtracts_simulation_set() {
        let mut store = JsonStore::create();
        put(&mut store, "data#mt-catA#anti_iso#pt_1", vec![10.0]);
        for label in [
            "DY#mt-DY-ZTT-catA",
            "DY#mt-DY-ZL-catA",
            "TT#mt-TT-TTT-catA",
            "TT#mt-TT-TTL-catA",
            "VV#mt-VV-VVT-catA",
            "VV#mt-VV-VVL-catA",
        ] {
            put(&mut store, &format!("{label}#anti_iso#pt_1"), vec![1.0]);
        }
        let h = fake_factor_estimation(&store, "mt", "catA", "pt_1", "anti_iso", false).unwrap();
        assert_eq!(h.name, "jetFakesMC#mt-jetFakesMC-catA#Nominal#pt_1");
        assert_eq!(h.bin_content, vec![4.0]);
    }

    #[test]
    fn missing_contribution_is_fatal() {
        let mut store = JsonStore::create();
        put(&mut store, "data#mt-catA#anti_iso#pt_1", vec![10.0]);
        let err =
            fake_factor_estimation(&store, "mt", "catA", "pt_1", "anti_iso", true).unwrap_err();
        assert!(matches!(err, crate::error::Error::KeyNotFound(_)));
    }

    #[test]
    fn qcd_em_channel_drops_jet_fake_processes() {
        assert_eq!(qcd_contributions(true, "em"), ["EMB", "ZL", "TTL", "VVL", "W"]);
        assert_eq!(
            qcd_contributions(true, "mt"),
            ["EMB", "ZL", "ZJ", "TTL", "TTJ", "VVL", "VVJ", "W"]
        );
        assert_eq!(qcd_contributions(false, "em"), ["ZTT", "ZL", "TTT", "TTL", "VVT", "VVL", "W"]);
    }

    #[test]
    fn qcd_scales_by_extrapolation_factor() {
        let mut store = JsonStore::create();
        put(&mut store, "data#mt-catA#same_sign#pt_1", vec![18.0]);
        for label in [
            "EMB#mt-Embedded-catA",
            "DY#mt-DY-ZL-catA",
            "DY#mt-DY-ZJ-catA",
            "TT#mt-TT-TTL-catA",
            "TT#mt-TT-TTJ-catA",
            "VV#mt-VV-VVL-catA",
            "VV#mt-VV-VVJ-catA",
            "W#mt-W-catA",
        ] {
            put(&mut store, &format!("{label}#same_sign#pt_1"), vec![1.0]);
        }
        let h = qcd_estimation(&store, "mt", "catA", "pt_1", "same_sign", true, 1.17).unwrap();
        assert_eq!(h.name, "QCD#mt-QCD-catA#Nominal#pt_1");
        assert!((h.bin_content[0] - 11.7).abs() < 1e-12);
    }

    #[test]
    fn contamination_sign_selects_variation_label() {
        let mut store = JsonStore::create();
        put(&mut store, "EMB#mt-Embedded-catA#Nominal#pt_1", vec![10.0]);
        put(&mut store, "TT#mt-TT-TTT-catA#Nominal#pt_1", vec![5.0]);

        let down =
            emb_ttbar_contamination_estimation(&store, "mt", "catA", "pt_1", 0.1).unwrap();
        assert_eq!(down.name, "EMB#mt-Embedded-catA#CMS_htt_emb_ttbarDown#pt_1");
        assert!((down.bin_content[0] - 9.5).abs() < 1e-12);

        let up =
            emb_ttbar_contamination_estimation(&store, "mt", "catA", "pt_1", -0.1).unwrap();
        assert_eq!(up.name, "EMB#mt-Embedded-catA#CMS_htt_emb_ttbarUp#pt_1");
        assert!((up.bin_content[0] - 10.5).abs() < 1e-12);
    }

    #[test]
    fn empty_category_base_key_has_two_selection_tokens() {
        let mut store = JsonStore::create();
        put(&mut store, "data#mt#anti_iso#pt_1", vec![4.0]);
        for label in ["EMB#mt-Embedded", "DY#mt-DY-ZL", "TT#mt-TT-TTL", "VV#mt-VV-VVL"] {
            put(&mut store, &format!("{label}#anti_iso#pt_1"), vec![0.5]);
        }
        let h = fake_factor_estimation(&store, "mt", "", "pt_1", "anti_iso", true).unwrap();
        assert_eq!(h.name, "jetFakes#mt-jetFakes#Nominal#pt_1");
        assert_eq!(h.bin_content, vec![2.0]);
    }
}
