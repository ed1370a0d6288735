use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use scopetrace::alb::AlbOptions;
use scopetrace::export::{write_csv_file, TraceSetSummary};
use scopetrace::pipeline::TransformPipeline;

use super::config::{self, Overrides};
use super::input::{capture_stem, Capture};

/// Default output next to the input: `tek0000CH1.isf` → `tek0000.csv`
fn default_output(input: &Path) -> PathBuf {
    input.with_file_name(format!("{}.csv", capture_stem(input)))
}

/// Decode a capture, run the pipeline and write CSV (plus an optional JSON summary)
pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    overrides: Overrides,
    json: bool,
) -> Result<()> {
    let config = config::resolve(config_path.as_deref(), &overrides)?;
    if let Ok(text) = config.to_toml() {
        debug!("Effective configuration:\n{}", text);
    }

    let output = output.unwrap_or_else(|| default_output(&input));

    info!("scopetrace - capture to CSV");
    info!("===========================");
    info!("Input:  {}", input.display());
    info!("Output: {}", output.display());
    if let Some(path) = &config_path {
        info!("Config: {}", path.display());
    }

    let capture = Capture::load(&input, AlbOptions::from(config.alb))?;
    let decoded = capture.into_traces();
    info!(
        "Decoded {} trace(s) of {} samples",
        decoded.len(),
        decoded.sample_count()
    );

    let pipeline = TransformPipeline::from_config(&config).context("Invalid pipeline")?;
    let traces = pipeline.apply(decoded).context("Transform pipeline failed")?;

    write_csv_file(&traces, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if json {
        let summary_path = output.with_extension("json");
        TraceSetSummary::from_traces(&traces)
            .write_json(&summary_path)
            .with_context(|| format!("Failed to write {}", summary_path.display()))?;
        info!("Summary: {}", summary_path.display());
    }

    info!("Conversion complete!");
    info!("  Traces written: {}", traces.len());
    info!("  Samples per trace: {}", traces.sample_count());

    let file_size = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
    info!(
        "  Output file size: {} bytes ({:.2} MB)",
        file_size,
        file_size as f64 / 1024.0 / 1024.0
    );

    Ok(())
}
