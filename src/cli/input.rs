//! Resolving a capture path on the command line into decoded traces.
//!
//! - `.isf`: the given file plus its `CH1`..`CH4` siblings
//!   (`tek0000CH2.isf` → `tek0000CH1.isf`, `tek0000CH2.isf`, ...)
//! - `.alb`: the binary file plus the `.txt` setup file next to it

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use scopetrace::alb::{AlbCapture, AlbDecoder, AlbOptions};
use scopetrace::isf::{decode_group, ChannelInput, IsfGroup};
use scopetrace::trace::TraceSet;

/// Number of analog channels probed for an ISF capture group
const ISF_CHANNELS: usize = 4;

/// Capture layout, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFormat {
    Isf,
    Alb,
}

impl CaptureFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("isf") => Ok(CaptureFormat::Isf),
            Some("alb") => Ok(CaptureFormat::Alb),
            _ => bail!(
                "Cannot tell the capture format of {} (expected .isf or .alb)",
                path.display()
            ),
        }
    }
}

/// File stem without the trailing channel suffix (`tek0000CH1` → `tek0000`)
pub fn capture_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if CaptureFormat::from_path(path).ok() == Some(CaptureFormat::Isf) {
        let chars: Vec<char> = stem.chars().collect();
        if chars.len() > 3 {
            return chars[..chars.len() - 3].iter().collect();
        }
    }
    stem
}

/// Existing `CH1`..`CH4` sibling files of one ISF channel file.
pub fn isf_group_paths(path: &Path) -> Vec<PathBuf> {
    let prefix = capture_stem(path);
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "isf".to_string());
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    (1..=ISF_CHANNELS)
        .map(|n| dir.join(format!("{}CH{}.{}", prefix, n, ext)))
        .filter(|candidate| {
            let exists = candidate.exists();
            if !exists {
                debug!("No channel file {}", candidate.display());
            }
            exists
        })
        .collect()
}

/// A decoded capture of either format
#[derive(Debug)]
pub enum Capture {
    Isf(IsfGroup),
    Alb(AlbCapture),
}

impl Capture {
    pub fn load(path: &Path, alb_options: AlbOptions) -> Result<Self> {
        if !path.exists() {
            bail!("Input file does not exist: {}", path.display());
        }

        match CaptureFormat::from_path(path)? {
            CaptureFormat::Isf => {
                let mut paths = isf_group_paths(path);
                if paths.is_empty() {
                    // Not named after a channel; decode the file on its own
                    paths.push(path.to_path_buf());
                }
                let inputs: Vec<ChannelInput> = paths
                    .iter()
                    .map(|p| {
                        ChannelInput::from_path(p).with_context(|| {
                            format!("Cannot derive a channel name from {}", p.display())
                        })
                    })
                    .collect::<Result<_>>()?;

                let group = decode_group(inputs)
                    .with_context(|| format!("Failed to decode ISF capture {}", path.display()))?;
                for failure in &group.missing {
                    warn!("Skipped {}", failure);
                }
                Ok(Capture::Isf(group))
            }
            CaptureFormat::Alb => {
                let capture = AlbDecoder::new(alb_options)
                    .decode_path(path)
                    .with_context(|| format!("Failed to decode ALB capture {}", path.display()))?;
                Ok(Capture::Alb(capture))
            }
        }
    }

    pub fn traces(&self) -> &TraceSet {
        match self {
            Capture::Isf(group) => &group.traces,
            Capture::Alb(capture) => &capture.traces,
        }
    }

    pub fn into_traces(self) -> TraceSet {
        match self {
            Capture::Isf(group) => group.traces,
            Capture::Alb(capture) => capture.traces,
        }
    }
}
