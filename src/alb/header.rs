//! ALB header block parsing.
//!
//! The header is line oriented. Each channel is a table block:
//!
//! ```text
//! TABLE_BEGIN "Analog CH1"
//! COLUMN "Voltage" VALUE_BYTES=2 WIDTH_BITS=16
//! NUM_ROWS=10000
//! X_INC=1E-06
//! Y_INC=0.000244
//! Y_ORG=0.0
//! TABLE_END
//! ...
//! HEADER_END
//! ```

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use super::setup::SetupEntry;
use crate::error::{Result, WaveformError};

/// Line that terminates the header block
pub const HEADER_SENTINEL: &str = "HEADER_END";
pub const TABLE_BEGIN: &str = "TABLE_BEGIN";
pub const TABLE_END: &str = "TABLE_END";
pub const COLUMN: &str = "COLUMN";

/// Value of a `key=value` header line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl HeaderValue {
    /// Integer if it parses as one, then float, then text.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if let Ok(i) = value.parse::<i64>() {
            HeaderValue::Int(i)
        } else if let Ok(f) = value.parse::<f64>() {
            HeaderValue::Float(f)
        } else {
            HeaderValue::Text(value.to_string())
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Int(i) => Some(*i as f64),
            HeaderValue::Float(f) => Some(*f),
            HeaderValue::Text(_) => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            HeaderValue::Int(i) => usize::try_from(*i).ok(),
            _ => None,
        }
    }
}

/// Schema of one table (channel) in the binary payload
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ColumnHeader {
    /// Channel name, e.g. `CH1`
    pub name: String,
    /// Bytes per stored value
    pub value_bytes: Option<u32>,
    /// Bits per stored value
    pub width_bits: Option<u32>,
    /// All other `key=value` lines of the table block
    pub fields: BTreeMap<String, HeaderValue>,
    /// Matching entry of the setup file, if any
    pub setup: Option<SetupEntry>,
}

impl ColumnHeader {
    fn numeric(&self, key: &str) -> Result<f64> {
        self.fields
            .get(key)
            .and_then(HeaderValue::as_f64)
            .ok_or_else(|| {
                WaveformError::UnsupportedFormat(format!(
                    "table {} lacks numeric field {}",
                    self.name, key
                ))
            })
    }

    /// Declared row count (`NUM_ROWS`)
    pub fn num_rows(&self) -> Result<usize> {
        self.fields
            .get("NUM_ROWS")
            .and_then(HeaderValue::as_usize)
            .ok_or_else(|| {
                WaveformError::UnsupportedFormat(format!("table {} lacks NUM_ROWS", self.name))
            })
    }

    /// Volts per raw count (`Y_INC`)
    pub fn y_increment(&self) -> Result<f64> {
        self.numeric("Y_INC")
    }

    /// Volts at raw zero (`Y_ORG`)
    pub fn y_origin(&self) -> Result<f64> {
        self.numeric("Y_ORG")
    }

    /// Seconds per row (`X_INC`)
    pub fn x_increment(&self) -> Result<f64> {
        self.numeric("X_INC")
    }

    /// Probe attenuation from the setup file
    pub fn probe_ratio(&self) -> Option<f64> {
        self.setup.as_ref().and_then(|s| s.probe_ratio)
    }
}

/// Table name from a `TABLE_BEGIN "..."` line: the last three characters of
/// the quoted title, upper-cased.
fn table_name(line: &str) -> String {
    let title = line
        .split('"')
        .nth(1)
        .unwrap_or_else(|| line.trim_start_matches(TABLE_BEGIN).trim());
    let chars: Vec<char> = title.chars().collect();
    let start = chars.len().saturating_sub(3);
    chars[start..].iter().collect::<String>().to_ascii_uppercase()
}

fn leading_integer(text: &str) -> Option<u32> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Split header lines into table schemas, in declaration order.
pub fn parse_header<S: AsRef<str>>(lines: &[S]) -> Result<Vec<ColumnHeader>> {
    let mut tables = Vec::new();
    let mut current: Option<ColumnHeader> = None;

    for line in lines {
        let line = line.as_ref().trim();
        if line.starts_with(TABLE_BEGIN) {
            if let Some(open) = &current {
                return Err(WaveformError::UnsupportedFormat(format!(
                    "table {} is not closed before the next TABLE_BEGIN",
                    open.name
                )));
            }
            current = Some(ColumnHeader {
                name: table_name(line),
                ..Default::default()
            });
        } else if line.starts_with(TABLE_END) {
            let table = current.take().ok_or_else(|| {
                WaveformError::UnsupportedFormat("TABLE_END without TABLE_BEGIN".to_string())
            })?;
            debug!("ALB table {}: {:?}", table.name, table.fields);
            tables.push(table);
        } else if line.starts_with(COLUMN) {
            let table = current.as_mut().ok_or_else(|| {
                WaveformError::UnsupportedFormat("COLUMN line outside a table".to_string())
            })?;
            // Positional: first assignment is the value width, second the bit width
            let mut assignments = line.split('=').skip(1);
            table.value_bytes = assignments.next().and_then(leading_integer);
            table.width_bits = assignments.next().and_then(leading_integer);
        } else if let Some((key, value)) = line.split_once('=') {
            match current.as_mut() {
                Some(table) => {
                    table
                        .fields
                        .insert(key.trim().to_string(), HeaderValue::parse(value));
                }
                None => debug!("Ignoring header line outside a table: {}", line),
            }
        }
    }

    if let Some(open) = current {
        return Err(WaveformError::UnsupportedFormat(format!(
            "table {} is not closed",
            open.name
        )));
    }
    Ok(tables)
}
