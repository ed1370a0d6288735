//! # scopetrace - Oscilloscope Capture Decoding
//!
//! `scopetrace` turns binary oscilloscope captures into named, time-aligned
//! traces and derives filtered traces from them.
//!
//! ## Supported Capture Formats
//!
//! - **Tektronix ISF**: one file per channel, ASCII preamble followed by an
//!   IEEE 488.2 definite-length block of 8- or 16-bit samples ([`isf`])
//! - **Agilent/Keysight ALB**: one binary file holding a table per channel,
//!   plus an optional `.txt` front-end setup file ([`alb`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scopetrace::isf::{decode_group, ChannelInput};
//! use scopetrace::pipeline::{PipelineConfig, TransformPipeline};
//!
//! let inputs = ["tek0000CH1.isf", "tek0000CH2.isf"]
//!     .iter()
//!     .filter_map(ChannelInput::from_path)
//!     .collect();
//! let group = decode_group(inputs)?;
//! for failure in &group.missing {
//!     eprintln!("skipped {}", failure);
//! }
//!
//! let config = PipelineConfig::from_toml_str("[rms]\nfrequency = 50.0")?;
//! let traces = TransformPipeline::from_config(&config)?.apply(group.traces)?;
//! println!("{:?}", traces.names().collect::<Vec<_>>());
//! # Ok::<(), scopetrace::error::WaveformError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`isf`] / [`alb`]: format decoders producing a [`trace::TraceSet`]
//! - [`trace`]: time axis, traces and capture-group assembly
//! - [`transform`]: smoothing, windowed RMS/mean/volt-second and block averaging
//! - [`pipeline`]: TOML configuration, renaming and transform selection
//! - [`export`]: CSV and JSON summary output
//! - [`error`]: the error type shared by all of the above
//!
//! ## Derived Trace Names
//!
//! | Transform | Suffix |
//! |-----------|--------|
//! | Exponential smoothing | `_alpha` |
//! | Windowed RMS | `_rms` |
//! | Windowed mean | `_avg` |
//! | Windowed volt-second | `_vs` |

#![deny(rustdoc::missing_crate_level_docs)]

pub mod alb;
pub mod error;
pub mod export;
pub mod isf;
pub mod pipeline;
pub mod trace;
pub mod transform;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::alb::{AlbCapture, AlbDecoder, AlbOptions, ColumnHeader, SetupEntry};
    pub use crate::error::{ChannelFailure, ErrorKind, Result, WaveformError};
    pub use crate::export::{write_csv, write_csv_file, TraceSetSummary, TraceSummary};
    pub use crate::isf::{decode_group, ChannelInput, ChannelSource, IsfDecoder, IsfGroup, IsfHeader};
    pub use crate::pipeline::{PipelineConfig, Selection, TransformPipeline, TransformStep};
    pub use crate::trace::{CaptureGroup, TimeAxis, Trace, TraceSet};
    pub use crate::transform::{TransformKind, WindowSpec};
}
