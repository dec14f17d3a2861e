//! Shape-estimations CLI
//!
//! Scans the input histogram store once to classify the available estimation
//! inputs, runs the fake-factor, QCD multijet, and (optionally) embedded
//! ttbar contamination estimations, and writes every result to
//! `<input stem>-estimations.<ext>`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use se_core::classify::classify_inputs;
use se_core::estimate::{
    emb_ttbar_contamination_estimation, fake_factor_estimation, qcd_estimation,
};
use se_core::store::JsonStore;
use se_core::Era;

#[derive(Parser)]
#[command(name = "se-cli")]
#[command(about = "Data-driven background estimations from a labeled histogram store")]
#[command(version)]
struct Cli {
    /// Input histogram store (JSON).
    #[arg(short, long)]
    input: PathBuf,

    /// Experiment era (2016, 2017, 2018).
    #[arg(short, long)]
    era: String,

    /// Also produce the embedded ttbar contamination variations.
    #[arg(long)]
    emb_tt: bool,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

/// `shapes.json` -> `shapes-estimations.json`.
fn output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("shapes");
    match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => input.with_file_name(format!("{stem}-estimations.{ext}")),
        None => input.with_file_name(format!("{stem}-estimations")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    let era: Era = cli.era.parse()?;

    tracing::info!(path = %cli.input.display(), "reading inputs");
    let input = JsonStore::open(&cli.input)
        .with_context(|| format!("failed to open input store {}", cli.input.display()))?;
    let inputs = classify_inputs(&input)?;
    let mut output = JsonStore::create();

    tracing::info!("starting estimations for fake factors and their variations");
    for (ch, cat, var, variation) in inputs.fake_factor.iter_paths() {
        for use_embedded in [true, false] {
            let h = fake_factor_estimation(&input, ch, cat, var, variation, use_embedded)?;
            tracing::debug!(name = %h.name, "estimated");
            output.put(h);
        }
    }

    tracing::info!("starting estimations for the QCD multijet process");
    let extrapolation_factor = era.extrapolation_factor();
    tracing::debug!(extrapolation_factor, "same-sign to opposite-sign transfer factor");
    for (ch, cat, var, variation) in inputs.qcd.iter_paths() {
        for use_embedded in [true, false] {
            let h = qcd_estimation(
                &input,
                ch,
                cat,
                var,
                variation,
                use_embedded,
                extrapolation_factor,
            )?;
            tracing::debug!(name = %h.name, "estimated");
            output.put(h);
        }
    }

    if cli.emb_tt {
        tracing::info!("producing embedded ttbar variations");
        for (ch, cat, var) in inputs.embedded.iter_paths() {
            for sub_scale in [0.1, -0.1] {
                let h = emb_ttbar_contamination_estimation(&input, ch, cat, var, sub_scale)?;
                tracing::debug!(name = %h.name, "estimated");
                output.put(h);
            }
        }
    }

    let out_path = output_path(&cli.input);
    output
        .save(&out_path)
        .with_context(|| format!("failed to write output store {}", out_path.display()))?;
    tracing::info!(
        path = %out_path.display(),
        histograms = output.len(),
        "successfully finished estimations"
    );
    Ok(())
}
