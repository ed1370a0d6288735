//! Companion `.txt` setup file of an ALB capture.
//!
//! Columns are separated by runs of two or more spaces. Only lines whose
//! first column starts with `Ch` describe channels:
//!
//! ```text
//! Ch 1:  On  500mV/  div  DC  1M Ohm
//! Ch 1:  10.0 : 1
//! ```
//!
//! A line with more than two columns carries state, scale, coupling and
//! termination; a two-column line carries the probe ratio. The unit is the
//! trailing letter of the scale (`500mV` is in `V`).

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::Path;

use log::{debug, warn};
use serde::Serialize;

use super::header::ColumnHeader;
use crate::error::Result;

/// Per-channel front-end settings
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SetupEntry {
    /// `On` / `Off`
    pub state: Option<String>,
    /// Volts (or amps) per division, as written
    pub per_div: Option<String>,
    /// Base unit of the scale, e.g. `V` or `A`
    pub unit: Option<String>,
    pub coupling: Option<String>,
    pub termination: Option<String>,
    /// Probe attenuation, e.g. `10` for a 10:1 probe
    pub probe_ratio: Option<f64>,
}

fn columns(line: &str) -> Vec<&str> {
    line.trim()
        .split("  ")
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// `Ch 1:` → `CH1`
fn channel_key(column: &str) -> String {
    column
        .trim_end_matches(':')
        .replace(' ', "")
        .to_ascii_uppercase()
}

/// Parse setup text into entries keyed by channel name.
pub fn parse_setup(text: &str) -> BTreeMap<String, SetupEntry> {
    let mut entries: BTreeMap<String, SetupEntry> = BTreeMap::new();

    for line in text.lines() {
        let cols = columns(line);
        let Some(first) = cols.first() else {
            continue;
        };
        if !first.starts_with("Ch") {
            continue;
        }
        let entry = entries.entry(channel_key(first)).or_default();

        if cols.len() > 2 {
            entry.state = Some(cols[1].to_string());
            let per_div = cols[2].trim_end_matches('/');
            entry.unit = per_div
                .chars()
                .last()
                .filter(char::is_ascii_alphabetic)
                .map(String::from);
            entry.per_div = Some(per_div.to_string());
            entry.coupling = cols.get(4).map(|c| c.to_string());
            entry.termination = cols.last().map(|c| c.to_string());
        } else if cols.len() == 2 {
            let ratio = cols[1].split(':').next().unwrap_or_default().trim();
            match ratio.parse::<f64>() {
                Ok(value) => entry.probe_ratio = Some(value.trunc()),
                Err(_) => debug!("Unreadable probe ratio in setup line: {}", line),
            }
        }
    }
    entries
}

/// Read the setup file next to an ALB capture.
///
/// A missing file is not an error: the capture decodes without probe
/// metadata.
pub fn read_setup(path: &Path) -> Result<Option<BTreeMap<String, SetupEntry>>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(parse_setup(&text))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(
                "Setup file {} not found; decoding without probe metadata",
                path.display()
            );
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Join setup entries into table schemas by channel name.
///
/// Returns the names of setup entries that matched no table.
pub fn merge_setup(
    tables: &mut [ColumnHeader],
    mut setup: BTreeMap<String, SetupEntry>,
) -> Vec<String> {
    let names: BTreeSet<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    let unmatched: Vec<String> = setup
        .keys()
        .filter(|k| !names.contains(k.as_str()))
        .cloned()
        .collect();

    for table in tables.iter_mut() {
        table.setup = setup.remove(&table.name);
    }
    for name in &unmatched {
        warn!("Setup entry {} matches no table in the capture", name);
    }
    unmatched
}
