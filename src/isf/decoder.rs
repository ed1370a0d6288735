use std::fs;
use std::io::Read;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{debug, warn};

use super::header::{Endianness, IsfHeader};
use crate::error::{Result, WaveformError};
use crate::trace::{DecodedChannel, TimeAxis, Trace, TraceSet};

/// Byte that ends the preamble and opens the binary block
pub const BLOCK_MARKER: u8 = b'#';

/// Where the scanner is within the byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Accumulating preamble text up to the block marker
    Preamble,
    /// Expecting the single ASCII digit giving the length-field width
    DigitCount,
    /// Reading the announced number of length digits
    LengthDigits { remaining: u32 },
}

/// Preamble text and payload split out of an ISF byte stream
struct Scanned<'a> {
    preamble: String,
    declared_bytes: Option<usize>,
    payload: &'a [u8],
}

fn scan(bytes: &[u8]) -> Result<Scanned<'_>> {
    let mut state = ScanState::Preamble;
    let mut text = Vec::new();
    let mut digits = String::new();

    for (pos, &byte) in bytes.iter().enumerate() {
        match state {
            ScanState::Preamble => {
                text.push(byte);
                if byte == BLOCK_MARKER {
                    state = ScanState::DigitCount;
                }
            }
            ScanState::DigitCount => {
                let count = (byte as char).to_digit(10).ok_or_else(|| {
                    WaveformError::UnsupportedFormat(format!(
                        "expected a digit after '#', found byte 0x{:02x}",
                        byte
                    ))
                })?;
                text.push(byte);
                if count == 0 {
                    return Ok(Scanned {
                        preamble: String::from_utf8_lossy(&text).into_owned(),
                        declared_bytes: None,
                        payload: &bytes[pos + 1..],
                    });
                }
                state = ScanState::LengthDigits { remaining: count };
            }
            ScanState::LengthDigits { remaining } => {
                if !byte.is_ascii_digit() {
                    return Err(WaveformError::UnsupportedFormat(format!(
                        "non-digit byte 0x{:02x} in block length",
                        byte
                    )));
                }
                text.push(byte);
                digits.push(byte as char);
                if remaining == 1 {
                    return Ok(Scanned {
                        preamble: String::from_utf8_lossy(&text).into_owned(),
                        declared_bytes: digits.parse().ok(),
                        payload: &bytes[pos + 1..],
                    });
                }
                state = ScanState::LengthDigits {
                    remaining: remaining - 1,
                };
            }
        }
    }

    Err(WaveformError::UnsupportedFormat(match state {
        ScanState::Preamble => "no '#' block marker before end of data".to_string(),
        _ => "data ends inside the block length prefix".to_string(),
    }))
}

/// Scale raw payload bytes into amplitudes: `(raw - YOFF) * YMULT`.
///
/// The number of samples is `payload.len() / bytes_per_sample`; a trailing
/// partial sample is ignored.
pub fn decode_samples(payload: &[u8], header: &IsfHeader) -> Result<Vec<f64>> {
    let width = header.bit_width.ok_or_else(|| {
        WaveformError::UnsupportedFormat("preamble lacks required field BIT_NR".to_string())
    })?;
    if width != 8 && width != 16 {
        return Err(WaveformError::UnsupportedFormat(format!(
            "unsupported bit width {}",
            width
        )));
    }
    let y_mult = IsfHeader::require(header.y_multiplier, "YMULT")?;
    let y_off = IsfHeader::require(header.y_offset, "YOFF")?;

    if width == 8 {
        return Ok(payload
            .iter()
            .map(|&b| (b as i8 as f64 - y_off) * y_mult)
            .collect());
    }

    let chunks = payload.chunks_exact(2);
    if !chunks.remainder().is_empty() {
        warn!(
            "Ignoring {} trailing payload byte(s) after the last 16-bit sample",
            chunks.remainder().len()
        );
    }
    let read: fn(&[u8]) -> i16 = match header.byte_order {
        Endianness::Big => BigEndian::read_i16,
        Endianness::Little => LittleEndian::read_i16,
    };
    Ok(chunks
        .map(|pair| (read(pair) as f64 - y_off) * y_mult)
        .collect())
}

/// One decoded ISF channel
#[derive(Debug, Clone)]
pub struct IsfWaveform {
    pub header: IsfHeader,
    pub samples: Vec<f64>,
}

impl IsfWaveform {
    /// Seconds per sample
    pub fn x_increment(&self) -> Result<f64> {
        IsfHeader::require(self.header.x_increment, "XINCR")
    }

    /// `t[i] = i * XINCR` over the decoded samples
    pub fn time_axis(&self) -> Result<TimeAxis> {
        TimeAxis::uniform(self.samples.len(), self.x_increment()?)
    }

    /// Hand the samples to capture-group assembly under `name`.
    pub fn into_channel(self, name: impl Into<String>) -> Result<DecodedChannel> {
        Ok(DecodedChannel {
            name: name.into(),
            x_increment: self.x_increment()?,
            samples: self.samples,
        })
    }

    /// A single-trace set for this channel
    pub fn into_trace_set(self, name: impl Into<String>) -> Result<TraceSet> {
        let mut set = TraceSet::new(self.time_axis()?);
        set.insert(name, Trace::new(self.samples))?;
        Ok(set)
    }
}

/// Decoder for Tektronix ISF captures
pub struct IsfDecoder;

impl IsfDecoder {
    /// Decode an in-memory capture (file contents or an instrument transfer).
    ///
    /// An empty payload yields an empty waveform, not an error.
    pub fn decode_bytes(bytes: &[u8]) -> Result<IsfWaveform> {
        let scanned = scan(bytes)?;
        let mut header = IsfHeader::parse(&scanned.preamble)?;
        header.declared_bytes = scanned.declared_bytes;
        debug!("ISF preamble fields: {:?}", header.fields);

        // Needed for the time axis, so check before decoding
        IsfHeader::require(header.x_increment, "XINCR")?;
        let samples = decode_samples(scanned.payload, &header)?;

        if let Some(declared) = header.point_count {
            if declared != samples.len() {
                debug!(
                    "Preamble declares {} points, payload holds {}; using payload length",
                    declared,
                    samples.len()
                );
            }
        }

        Ok(IsfWaveform { header, samples })
    }

    /// Decode a capture from any reader.
    pub fn decode_reader<R: Read>(mut reader: R) -> Result<IsfWaveform> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::decode_bytes(&bytes)
    }

    /// Decode a capture file.
    pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<IsfWaveform> {
        let path = path.as_ref();
        debug!("Decoding ISF file {}", path.display());
        let bytes = fs::read(path)?;
        Self::decode_bytes(&bytes)
    }
}

/// Channel name from the trailing three characters of a file stem,
/// upper-cased: `tek0000CH1.isf` → `CH1`.
pub fn channel_name_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let chars: Vec<char> = stem.chars().collect();
    if chars.len() < 3 {
        return None;
    }
    Some(chars[chars.len() - 3..].iter().collect::<String>().to_ascii_uppercase())
}
