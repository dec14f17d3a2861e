//! The histogram naming grammar.
//!
//! Every histogram label in the store is a `#`-delimited string
//!
//! ```text
//! <dataset>#<channel>[-<process>][-<category>]#<variation>#<variable>
//! ```
//!
//! with the second field ("selection") itself `-`-delimited. The engine never
//! manipulates the raw string: labels are decoded once into [`HistogramKey`]
//! records, operated on, and encoded once at the end.

use crate::error::{Error, Result};

/// Top-level field separator of the key grammar.
pub const FIELD_SEP: char = '#';

/// Sub-field separator inside the selection field.
pub const SEL_SEP: char = '-';

/// A key split into its four top-level fields, selection still composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKey {
    /// Data source label (e.g. `data`, `DY`, `EMB`).
    pub dataset: String,
    /// Composite channel/process/category field.
    pub selection: String,
    /// Systematic or control-region variation label.
    pub variation: String,
    /// Histogrammed observable.
    pub variable: String,
}

/// The decomposed selection field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Final-state channel, never empty.
    pub channel: String,
    /// Process label; the literal `data` for data keys.
    pub process: String,
    /// Analysis category; empty when no categorization is applied.
    pub category: String,
}

/// A fully decoded histogram key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramKey {
    /// Data source label.
    pub dataset: String,
    /// Final-state channel.
    pub channel: String,
    /// Process label; empty for data base histograms.
    pub process: String,
    /// Analysis category; may be empty.
    pub category: String,
    /// Variation label.
    pub variation: String,
    /// Histogrammed observable.
    pub variable: String,
}

impl RawKey {
    /// Parse a stored label into its four top-level fields.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(FIELD_SEP).collect();
        if parts.len() != 4 {
            return Err(Error::Format(format!(
                "expected 4 '#'-delimited fields, got {} in '{}'",
                parts.len(),
                s
            )));
        }
        Ok(Self {
            dataset: parts[0].to_string(),
            selection: parts[1].to_string(),
            variation: parts[2].to_string(),
            variable: parts[3].to_string(),
        })
    }

    /// Decompose the selection field into channel/process/category.
    ///
    /// Data keys never encode a process subdivision, so the rule is
    /// asymmetric: for data the remainder after the channel is the category;
    /// for simulation the last token is the category when at least two tokens
    /// follow the channel, otherwise the single token is the process.
    pub fn decompose_selection(&self, is_data: bool) -> Result<Selection> {
        let (channel, rest) = match self.selection.split_once(SEL_SEP) {
            Some((ch, rest)) => (ch, Some(rest)),
            None => (self.selection.as_str(), None),
        };
        if channel.is_empty() {
            return Err(Error::Format(format!("empty channel in selection '{}'", self.selection)));
        }
        if is_data {
            return Ok(Selection {
                channel: channel.to_string(),
                process: "data".to_string(),
                category: rest.unwrap_or("").to_string(),
            });
        }
        let rest = rest.ok_or_else(|| {
            Error::Format(format!("missing process in selection '{}'", self.selection))
        })?;
        let tokens: Vec<&str> = rest.split(SEL_SEP).collect();
        let (process, category) = if tokens.len() >= 2 {
            (tokens[..tokens.len() - 1].join("-"), tokens[tokens.len() - 1].to_string())
        } else {
            (rest.to_string(), String::new())
        };
        Ok(Selection { channel: channel.to_string(), process, category })
    }
}

impl HistogramKey {
    /// Encode back into the stored label form. The process and category
    /// segments are emitted only when non-empty.
    pub fn encode(&self) -> String {
        let mut s = String::with_capacity(
            self.dataset.len()
                + self.channel.len()
                + self.process.len()
                + self.category.len()
                + self.variation.len()
                + self.variable.len()
                + 5,
        );
        s.push_str(&self.dataset);
        s.push(FIELD_SEP);
        s.push_str(&self.channel);
        if !self.process.is_empty() {
            s.push(SEL_SEP);
            s.push_str(&self.process);
        }
        if !self.category.is_empty() {
            s.push(SEL_SEP);
            s.push_str(&self.category);
        }
        s.push(FIELD_SEP);
        s.push_str(&self.variation);
        s.push(FIELD_SEP);
        s.push_str(&self.variable);
        s
    }
}
