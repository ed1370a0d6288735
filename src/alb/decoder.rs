use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use log::{debug, info, warn};

use super::header::{parse_header, ColumnHeader, HEADER_SENTINEL};
use super::setup::{merge_setup, parse_setup, read_setup, SetupEntry};
use crate::error::{Result, WaveformError};
use crate::trace::{TimeAxis, Trace, TraceSet};

/// Options for ALB decoding
#[derive(Debug, Clone, Copy, Default)]
pub struct AlbOptions {
    /// Multiply amplitudes by the setup file's probe ratio
    pub apply_probe_attenuation: bool,
}

/// Decoded ALB capture
#[derive(Debug)]
pub struct AlbCapture {
    /// Table schemas in declaration order, with setup entries merged in
    pub tables: Vec<ColumnHeader>,
    pub traces: TraceSet,
    /// Setup entries that named no table
    pub unmatched_setup: Vec<String>,
}

/// Split the header lines off the payload.
///
/// Every line up to and including the one holding the sentinel is header
/// text; the payload starts after that line's newline.
fn split_header(bytes: &[u8]) -> Result<(Vec<String>, &[u8])> {
    let mut lines = Vec::new();
    let mut start = 0;

    while start < bytes.len() {
        let end = bytes[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| start + p + 1)
            .unwrap_or(bytes.len());
        let line = String::from_utf8_lossy(&bytes[start..end]).trim_end().to_string();
        let done = line.contains(HEADER_SENTINEL);
        lines.push(line);
        if done {
            return Ok((lines, &bytes[end..]));
        }
        start = end;
    }

    Err(WaveformError::UnsupportedFormat(format!(
        "no {} line before end of data",
        HEADER_SENTINEL
    )))
}

/// Scale one 16-bit big-endian table: `raw * Y_INC + Y_ORG`.
///
/// Table `index` starts at byte `index * rows * 2` of the payload.
fn decode_table(
    payload: &[u8],
    index: usize,
    table: &ColumnHeader,
    options: AlbOptions,
) -> Result<Vec<f64>> {
    let rows = table.num_rows()?;
    let y_inc = table.y_increment()?;
    let y_org = table.y_origin()?;
    let gain = match (options.apply_probe_attenuation, table.probe_ratio()) {
        (true, Some(ratio)) => ratio,
        _ => 1.0,
    };

    let span = rows.checked_mul(2);
    let start = span.and_then(|s| s.checked_mul(index)).unwrap_or(usize::MAX);
    let end = span.and_then(|s| start.checked_add(s)).unwrap_or(usize::MAX);
    if end > payload.len() {
        return Err(WaveformError::Decode(format!(
            "table {} declares {} rows at byte {} but the payload holds {} bytes",
            table.name,
            rows,
            start,
            payload.len()
        )));
    }

    Ok(payload[start..end]
        .chunks_exact(2)
        .map(|pair| (BigEndian::read_i16(pair) as f64 * y_inc + y_org) * gain)
        .collect())
}

/// Decoder for Agilent/Keysight ALB captures
#[derive(Debug, Clone, Default)]
pub struct AlbDecoder {
    options: AlbOptions,
}

impl AlbDecoder {
    pub fn new(options: AlbOptions) -> Self {
        Self { options }
    }

    /// Decode `<base>.alb` together with its `<base>.txt` setup file.
    pub fn decode_path<P: AsRef<Path>>(&self, base: P) -> Result<AlbCapture> {
        let base = base.as_ref();
        let data_path = base.with_extension("alb");
        let setup_path = base.with_extension("txt");
        info!("Decoding ALB capture {}", data_path.display());

        let bytes = fs::read(&data_path)?;
        let setup = read_setup(&setup_path)?;
        self.decode_with_setup(&bytes, setup)
    }

    /// Decode capture bytes with optional setup text.
    pub fn decode_parts(&self, bytes: &[u8], setup: Option<&str>) -> Result<AlbCapture> {
        self.decode_with_setup(bytes, setup.map(parse_setup))
    }

    fn decode_with_setup(
        &self,
        bytes: &[u8],
        setup: Option<BTreeMap<String, SetupEntry>>,
    ) -> Result<AlbCapture> {
        let (lines, payload) = split_header(bytes)?;
        let mut tables = parse_header(&lines)?;
        let first = tables.first().ok_or_else(|| {
            WaveformError::UnsupportedFormat("header declares no tables".to_string())
        })?;
        let x_increment = first.x_increment()?;

        let unmatched_setup = match setup {
            Some(entries) => merge_setup(&mut tables, entries),
            None => Vec::new(),
        };

        let mut decoded: Vec<(String, Vec<f64>)> = Vec::new();
        let mut consumed = 0;
        for (index, table) in tables.iter().enumerate() {
            if table.width_bits != Some(16) {
                warn!(
                    "Skipping table {}: {:?}-bit values are not supported",
                    table.name, table.width_bits
                );
                continue;
            }
            let samples = decode_table(payload, index, table, self.options)?;
            consumed = consumed.max((index + 1) * samples.len() * 2);
            debug!("Table {}: {} rows", table.name, samples.len());
            decoded.push((table.name.clone(), samples));
        }

        let Some((_, reference)) = decoded.first() else {
            return Err(WaveformError::UnsupportedFormat(
                "capture holds no 16-bit tables".to_string(),
            ));
        };
        if payload.len() > consumed {
            warn!(
                "Ignoring {} payload byte(s) after the last table",
                payload.len() - consumed
            );
        }

        let mut traces = TraceSet::new(TimeAxis::uniform(reference.len(), x_increment)?);
        for (name, samples) in decoded {
            traces.insert(name, Trace::new(samples)).map_err(|e| match e {
                WaveformError::LengthMismatch { .. } => {
                    WaveformError::Decode(format!("tables differ in row count: {}", e))
                }
                other => other,
            })?;
        }

        Ok(AlbCapture {
            tables,
            traces,
            unmatched_setup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn capture(tables: &[(&str, &[i16])], y_inc: &str, y_org: &str) -> Vec<u8> {
        let mut header = String::from("FILE_VERSION=1.0\n");
        for (name, rows) in tables {
            header.push_str(&format!(
                "TABLE_BEGIN \"Analog {}\"\n\
                 COLUMN \"Voltage\" VALUE_BYTES=2 WIDTH_BITS=16\n\
                 NUM_ROWS={}\n\
                 X_INC=0.001\n\
                 Y_INC={}\n\
                 Y_ORG={}\n\
                 TABLE_END\n",
                name,
                rows.len(),
                y_inc,
                y_org
            ));
        }
        header.push_str("HEADER_END\n");
        let mut bytes = header.into_bytes();
        for (_, rows) in tables {
            for v in rows.iter() {
                bytes.extend_from_slice(&v.to_be_bytes());
            }
        }
        bytes
    }

    #[test]
    fn test_decode_two_tables() {
        let bytes = capture(&[("CH1", &[1, 2, 3]), ("CH2", &[-1, 0, 4])], "0.5", "1.0");
        let capture = AlbDecoder::default().decode_parts(&bytes, None).unwrap();

        assert_eq!(capture.traces.get("CH1").unwrap().values(), &[1.5, 2.0, 2.5]);
        assert_eq!(capture.traces.get("CH2").unwrap().values(), &[0.5, 1.0, 3.0]);
        assert_eq!(capture.traces.time().values(), &[0.0, 0.001, 0.002]);
        assert!(capture.unmatched_setup.is_empty());
    }

    #[test]
    fn test_probe_attenuation_is_opt_in() {
        let bytes = capture(&[("CH1", &[2, 4])], "1.0", "0.0");
        let setup = "Ch 1:  10.0 : 1\nCh 3:  On  1.00V/  div  DC  1M Ohm\n";

        let plain = AlbDecoder::default().decode_parts(&bytes, Some(setup)).unwrap();
        assert_eq!(plain.traces.get("CH1").unwrap().values(), &[2.0, 4.0]);
        assert_eq!(plain.tables[0].probe_ratio(), Some(10.0));
        assert_eq!(plain.unmatched_setup, vec!["CH3".to_string()]);

        let scaled = AlbDecoder::new(AlbOptions {
            apply_probe_attenuation: true,
        })
        .decode_parts(&bytes, Some(setup))
        .unwrap();
        assert_eq!(scaled.traces.get("CH1").unwrap().values(), &[20.0, 40.0]);
    }

    #[test]
    fn test_short_payload_is_decode_error() {
        let mut bytes = capture(&[("CH1", &[1, 2]), ("CH2", &[3, 4])], "1.0", "0.0");
        bytes.truncate(bytes.len() - 1);
        let err = AlbDecoder::default().decode_parts(&bytes, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeError);
    }

    #[test]
    fn test_unequal_row_counts() {
        let bytes = capture(&[("CH1", &[1, 2, 3, 4]), ("CH2", &[3, 4])], "1.0", "0.0");
        let err = AlbDecoder::default().decode_parts(&bytes, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeError);
    }

    #[test]
    fn test_missing_sentinel() {
        let err = AlbDecoder::default()
            .decode_parts(b"TABLE_BEGIN \"CH1\"\nTABLE_END\n", None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_decode_path_without_setup() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("scope_7");
        fs::write(base.with_extension("alb"), capture(&[("CH1", &[7])], "1.0", "0.0")).unwrap();

        let capture = AlbDecoder::default().decode_path(&base).unwrap();
        assert_eq!(capture.traces.get("CH1").unwrap().values(), &[7.0]);
        assert!(capture.tables[0].setup.is_none());
    }
}
