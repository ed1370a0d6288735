//! ISF preamble parsing.
//!
//! The preamble is a `;`-separated list of `KEY value` fields, optionally
//! prefixed with a command path (`:WFMPRE:BYT_NR 2`). Instruments emit either
//! the long or the abbreviated key form (`BYT_NR` / `BYT_N`), so each field is
//! looked up by exact key in [`FIELD_SCHEMA`]. Exact matching keeps keys that
//! share a prefix (`XINCR`, `XIN`, `XUNIT`) from shadowing each other.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::error::{Result, WaveformError};

/// Known preamble fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsfField {
    ByteCount,
    BitWidth,
    Encoding,
    BinaryFormat,
    ByteOrder,
    WaveformId,
    PointCount,
    PointFormat,
    XUnit,
    XIncrement,
    XZero,
    PointOffset,
    YUnit,
    YMultiplier,
    YOffset,
    YZero,
    VerticalScale,
    HorizontalScale,
    VerticalPosition,
    VerticalOffset,
    HorizontalDelay,
    Curve,
}

/// Exact key → field table, long and abbreviated forms
pub const FIELD_SCHEMA: &[(&str, IsfField)] = &[
    ("BYT_NR", IsfField::ByteCount),
    ("BYT_N", IsfField::ByteCount),
    ("BIT_NR", IsfField::BitWidth),
    ("BIT_N", IsfField::BitWidth),
    ("ENCDG", IsfField::Encoding),
    ("ENC", IsfField::Encoding),
    ("BN_FMT", IsfField::BinaryFormat),
    ("BN_F", IsfField::BinaryFormat),
    ("BYT_OR", IsfField::ByteOrder),
    ("BYT_O", IsfField::ByteOrder),
    ("WFID", IsfField::WaveformId),
    ("WFI", IsfField::WaveformId),
    ("NR_PT", IsfField::PointCount),
    ("NR_P", IsfField::PointCount),
    ("PT_FMT", IsfField::PointFormat),
    ("PT_F", IsfField::PointFormat),
    ("XUNIT", IsfField::XUnit),
    ("XUN", IsfField::XUnit),
    ("XINCR", IsfField::XIncrement),
    ("XIN", IsfField::XIncrement),
    ("XZERO", IsfField::XZero),
    ("XZE", IsfField::XZero),
    ("PT_OFF", IsfField::PointOffset),
    ("PT_O", IsfField::PointOffset),
    ("YUNIT", IsfField::YUnit),
    ("YUN", IsfField::YUnit),
    ("YMULT", IsfField::YMultiplier),
    ("YMU", IsfField::YMultiplier),
    ("YOFF", IsfField::YOffset),
    ("YOF", IsfField::YOffset),
    ("YZERO", IsfField::YZero),
    ("YZE", IsfField::YZero),
    ("VSCALE", IsfField::VerticalScale),
    ("HSCALE", IsfField::HorizontalScale),
    ("VPOS", IsfField::VerticalPosition),
    ("VOFFSET", IsfField::VerticalOffset),
    ("HDELAY", IsfField::HorizontalDelay),
    ("CURVE", IsfField::Curve),
    ("CURV", IsfField::Curve),
];

impl IsfField {
    /// Resolve a preamble key (already stripped of its command path).
    pub fn from_key(key: &str) -> Option<Self> {
        FIELD_SCHEMA
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, field)| *field)
    }
}

/// Byte order of multi-byte samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Endianness {
    /// Most significant byte first (`MSB`)
    Big,
    /// Least significant byte first (`LSB`)
    #[default]
    Little,
}

impl Endianness {
    /// `MSB` selects big-endian; anything else is little-endian.
    pub fn from_field(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("MSB") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }
}

/// A number with its unit, e.g. `2.000V/div` → (2.0, "V")
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scale {
    pub value: f64,
    pub unit: String,
}

impl Scale {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let split = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(text.len());
        let value = text[..split].parse().ok()?;
        let unit = text[split..].split('/').next().unwrap_or("").trim();
        Some(Self {
            value,
            unit: unit.to_string(),
        })
    }
}

/// Composite waveform identifier, e.g.
/// `"Ch1, DC coupling, 2.000V/div, 4.000us/div, 10000 points, Sample mode"`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WaveformId {
    pub channel: String,
    pub coupling: Option<String>,
    pub y_scale: Option<Scale>,
    pub x_scale: Option<Scale>,
    pub point_count: Option<usize>,
}

impl WaveformId {
    pub fn parse(text: &str) -> Self {
        let parts: Vec<&str> = text.trim().trim_matches('"').split(',').map(str::trim).collect();
        let point_count = parts.get(4).and_then(|p| {
            p.strip_suffix("points")
                .and_then(|n| n.trim().parse().ok())
        });
        Self {
            channel: parts.first().map(|s| s.to_string()).unwrap_or_default(),
            coupling: parts
                .get(1)
                .and_then(|c| c.split_whitespace().next())
                .map(str::to_string),
            y_scale: parts.get(2).and_then(|s| Scale::parse(s)),
            x_scale: parts.get(3).and_then(|s| Scale::parse(s)),
            point_count,
        }
    }
}

/// Resolved ISF preamble
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IsfHeader {
    /// Bytes per sample (`BYT_NR`)
    pub byte_count: Option<u32>,
    /// Bits per sample (`BIT_NR`), 8 or 16
    pub bit_width: Option<u32>,
    /// `ENCDG`, e.g. `BIN`
    pub encoding: Option<String>,
    /// `BN_FMT`, e.g. `RI`
    pub binary_format: Option<String>,
    /// `BYT_OR`
    pub byte_order: Endianness,
    pub waveform_id: Option<WaveformId>,
    /// Declared point count (`NR_PT`)
    pub point_count: Option<usize>,
    pub x_unit: Option<String>,
    /// Seconds per sample
    pub x_increment: Option<f64>,
    pub x_zero: Option<f64>,
    pub y_unit: Option<String>,
    pub y_multiplier: Option<f64>,
    pub y_offset: Option<f64>,
    pub y_zero: Option<f64>,
    pub vertical_scale: Option<f64>,
    pub horizontal_scale: Option<f64>,
    pub vertical_position: Option<f64>,
    pub vertical_offset: Option<f64>,
    pub horizontal_delay: Option<f64>,
    /// Payload size announced by the `#<n><digits>` block prefix
    pub declared_bytes: Option<usize>,
    /// Every `KEY value` pair as found, keyed by upper-cased key
    pub fields: BTreeMap<String, String>,
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        WaveformError::UnsupportedFormat(format!("invalid value for {}: '{}'", key, value))
    })
}

fn unquote(value: &str) -> String {
    value.trim().trim_matches('"').to_string()
}

impl IsfHeader {
    /// Parse the accumulated preamble text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut header = Self::default();
        for segment in text.split(';') {
            let segment = segment.trim();
            let Some((key_token, value)) = segment.split_once(char::is_whitespace) else {
                continue;
            };
            let key = key_token
                .rsplit(':')
                .next()
                .unwrap_or(key_token)
                .to_ascii_uppercase();
            if key.is_empty() {
                continue;
            }
            header.fields.insert(key.clone(), value.trim().to_string());

            match IsfField::from_key(&key) {
                Some(field) => header.apply(field, &key, value)?,
                None => debug!("Unrecognised ISF field {} kept as raw text", key),
            }
        }
        Ok(header)
    }

    fn apply(&mut self, field: IsfField, key: &str, value: &str) -> Result<()> {
        match field {
            IsfField::ByteCount => self.byte_count = Some(parse_number(key, value)?),
            IsfField::BitWidth => self.bit_width = Some(parse_number(key, value)?),
            IsfField::Encoding => self.encoding = Some(unquote(value)),
            IsfField::BinaryFormat => self.binary_format = Some(unquote(value)),
            IsfField::ByteOrder => self.byte_order = Endianness::from_field(value),
            IsfField::WaveformId => self.waveform_id = Some(WaveformId::parse(value)),
            IsfField::PointCount => self.point_count = Some(parse_number(key, value)?),
            IsfField::PointFormat | IsfField::PointOffset | IsfField::Curve => {}
            IsfField::XUnit => self.x_unit = Some(unquote(value)),
            IsfField::XIncrement => self.x_increment = Some(parse_number(key, value)?),
            IsfField::XZero => self.x_zero = Some(parse_number(key, value)?),
            IsfField::YUnit => self.y_unit = Some(unquote(value)),
            IsfField::YMultiplier => self.y_multiplier = Some(parse_number(key, value)?),
            IsfField::YOffset => self.y_offset = Some(parse_number(key, value)?),
            IsfField::YZero => self.y_zero = Some(parse_number(key, value)?),
            IsfField::VerticalScale => self.vertical_scale = Some(parse_number(key, value)?),
            IsfField::HorizontalScale => self.horizontal_scale = Some(parse_number(key, value)?),
            IsfField::VerticalPosition => self.vertical_position = Some(parse_number(key, value)?),
            IsfField::VerticalOffset => self.vertical_offset = Some(parse_number(key, value)?),
            IsfField::HorizontalDelay => self.horizontal_delay = Some(parse_number(key, value)?),
        }
        Ok(())
    }

    /// Raw value of a preamble key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(&key.to_ascii_uppercase()).map(String::as_str)
    }

    /// Channel name from the waveform identifier, upper-cased (`Ch1` → `CH1`)
    pub fn channel(&self) -> Option<String> {
        self.waveform_id
            .as_ref()
            .map(|id| id.channel.to_ascii_uppercase())
            .filter(|c| !c.is_empty())
    }

    pub(crate) fn require(value: Option<f64>, key: &str) -> Result<f64> {
        value.ok_or_else(|| {
            WaveformError::UnsupportedFormat(format!("preamble lacks required field {}", key))
        })
    }
}
