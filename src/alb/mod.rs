//! # Agilent ALB Decoder
//!
//! An ALB capture is a pair of files:
//!
//! - `<base>.alb`: ASCII header lines up to a `HEADER_END` line, then one
//!   binary payload with a big-endian 16-bit table per channel
//! - `<base>.txt`: optional front-end setup (state, scale, coupling, probe)
//!
//! Tables are laid out back to back in header order. Amplitudes are
//! `raw * Y_INC + Y_ORG`; the time axis comes from the first table's `X_INC`.

mod decoder;
mod header;
mod setup;

pub use decoder::{AlbCapture, AlbDecoder, AlbOptions};
pub use header::{parse_header, ColumnHeader, HeaderValue, HEADER_SENTINEL};
pub use setup::{merge_setup, parse_setup, read_setup, SetupEntry};
