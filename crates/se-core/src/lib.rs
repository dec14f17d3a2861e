//! # se-core
//!
//! Data-driven background estimations from a flat store of labeled
//! histograms.
//!
//! Three estimation methods are implemented, each a linear combination of
//! existing histograms re-emitted under a systematically derived label:
//! the fake-factor method (anti-isolation control region), the QCD multijet
//! method (same-sign control region), and the residual ttbar contamination
//! correction of the embedded sample.
//!
//! ## Example
//!
//! ```no_run
//! use se_core::classify::classify_inputs;
//! use se_core::estimate::fake_factor_estimation;
//! use se_core::store::JsonStore;
//!
//! let store = JsonStore::open("shapes.json").unwrap();
//! let inputs = classify_inputs(&store).unwrap();
//! for (ch, cat, var, variation) in inputs.fake_factor.iter_paths() {
//!     let h = fake_factor_estimation(&store, ch, cat, var, variation, true).unwrap();
//!     println!("{}", h.name);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod classify;
pub mod era;
pub mod error;
pub mod estimate;
pub mod histogram;
pub mod key;
pub mod store;

pub use classify::{classify_inputs, ClassifiedInputs};
pub use era::Era;
pub use error::{Error, Result};
pub use estimate::{
    emb_ttbar_contamination_estimation, fake_factor_estimation, qcd_estimation,
};
pub use histogram::Histogram;
pub use key::{HistogramKey, RawKey, Selection};
pub use store::{HistogramStore, JsonStore};
