//! Hand-off formats for plotting and storage tools.
//!
//! - CSV: one `time` column followed by one column per trace, in name order
//! - JSON: a [`TraceSetSummary`] with per-trace statistics

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::trace::TraceSet;
use crate::transform::stats;

/// Write a trace set as CSV with a `time` column first.
pub fn write_csv<W: Write>(traces: &TraceSet, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    let mut header = vec!["time"];
    header.extend(traces.names());
    csv_writer.write_record(&header)?;

    let columns: Vec<&[f64]> = traces.iter().map(|(_, trace)| trace.values()).collect();
    let mut record = Vec::with_capacity(columns.len() + 1);
    for (row, t) in traces.time().values().iter().enumerate() {
        record.clear();
        record.push(t.to_string());
        record.extend(columns.iter().map(|column| column[row].to_string()));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a trace set to a CSV file.
pub fn write_csv_file<P: AsRef<Path>>(traces: &TraceSet, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_csv(traces, BufWriter::new(file))?;
    info!(
        "Wrote {} trace(s) x {} samples to {}",
        traces.len(),
        traces.sample_count(),
        path.display()
    );
    Ok(())
}

/// Statistics of one trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSummary {
    pub samples: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// `sum(|x|) / (t_last - t_first)`
    pub voltsec_total: Option<f64>,
}

/// Overview of a trace set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSetSummary {
    pub samples: usize,
    pub sample_interval: Option<f64>,
    pub duration: f64,
    pub traces: BTreeMap<String, TraceSummary>,
}

impl TraceSetSummary {
    pub fn from_traces(traces: &TraceSet) -> Self {
        let time = traces.time();
        let summaries = traces
            .iter()
            .map(|(name, trace)| {
                let (min, max) = trace.min_max().unzip();
                let summary = TraceSummary {
                    samples: trace.len(),
                    min,
                    max,
                    mean: trace.mean(),
                    voltsec_total: stats::voltsec_total(time.values(), trace.values()),
                };
                (name.to_string(), summary)
            })
            .collect();

        Self {
            samples: time.len(),
            sample_interval: time.sample_interval(),
            duration: time.duration(),
            traces: summaries,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the summary as pretty JSON.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
