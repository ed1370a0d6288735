//! # Tektronix ISF Decoder
//!
//! An ISF capture is an ASCII preamble followed by an IEEE 488.2 definite
//! length block:
//!
//! ```text
//! :WFMPRE:BYT_NR 2;BIT_NR 16;...;YMULT 80.0E-3;YOFF 0.0;:CURVE #520000<payload>
//! ```
//!
//! In `#520000` the `5` is the width of the length field and `20000` the
//! announced payload size in bytes.
//!
//! Decoding runs in two phases: a byte-level scan splits preamble from
//! payload, then the preamble is resolved into an [`IsfHeader`] and the
//! payload is scaled into amplitudes with `(raw - YOFF) * YMULT`.
//!
//! The payload runs to the end of the data and its length, not the declared
//! point count, decides how many samples are produced.
//!
//! Multi-channel captures are one file per channel; [`decode_group`] merges
//! them into a single [`TraceSet`](crate::trace::TraceSet).

mod decoder;
mod group;
mod header;

pub use decoder::{channel_name_from_path, decode_samples, IsfDecoder, IsfWaveform, BLOCK_MARKER};
pub use group::{decode_group, ChannelInput, ChannelSource, IsfGroup};
pub use header::{Endianness, IsfField, IsfHeader, Scale, WaveformId, FIELD_SCHEMA};
