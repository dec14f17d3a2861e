//! Named, titled, binned histogram with simple bin-wise algebra.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A 1D histogram as stored in the input/output containers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Histogram {
    /// Histogram name (doubles as the store label).
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// Bin contents (excluding under/overflow).
    pub bin_content: Vec<f64>,
    /// Sum of weights squared per bin (for statistical errors), if stored.
    #[serde(default)]
    pub sumw2: Option<Vec<f64>>,
}

impl Histogram {
    /// Create a histogram with the given label and bin contents, no sumw2.
    pub fn new(label: impl Into<String>, bin_content: Vec<f64>) -> Self {
        let label = label.into();
        Self { name: label.clone(), title: label, bin_content, sumw2: None }
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.bin_content.len()
    }

    /// Bin-wise `self += weight * other`.
    ///
    /// Sumw2 propagates as `sumw2 += weight^2 * other.sumw2` when both sides
    /// carry it; a side without sumw2 contributes zero variance.
    pub fn add_scaled(&mut self, other: &Histogram, weight: f64) -> Result<()> {
        if other.bin_content.len() != self.bin_content.len() {
            return Err(Error::Histogram(format!(
                "cannot add {} ({} bins) to {} ({} bins)",
                other.name,
                other.bin_content.len(),
                self.name,
                self.bin_content.len()
            )));
        }
        for (a, b) in self.bin_content.iter_mut().zip(&other.bin_content) {
            *a += weight * b;
        }
        if let (Some(sw2), Some(other_sw2)) = (self.sumw2.as_mut(), other.sumw2.as_ref()) {
            for (a, b) in sw2.iter_mut().zip(other_sw2) {
                *a += weight * weight * b;
            }
        }
        Ok(())
    }

    /// Uniform scaling of all bin contents; sumw2 scales by `factor^2`.
    pub fn scale(&mut self, factor: f64) {
        for a in &mut self.bin_content {
            *a *= factor;
        }
        if let Some(sw2) = self.sumw2.as_mut() {
            for a in sw2 {
                *a *= factor * factor;
            }
        }
    }

    /// Rewrite name and title together.
    pub fn set_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        self.name = label.clone();
        self.title = label;
    }
}
