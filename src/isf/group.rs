use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::decoder::{channel_name_from_path, IsfDecoder, IsfWaveform};
use super::header::IsfHeader;
use crate::error::{ChannelFailure, Result};
use crate::trace::{CaptureGroup, DecodedChannel, TraceSet};

/// Where a channel's ISF bytes come from
#[derive(Debug, Clone)]
pub enum ChannelSource {
    /// A capture file on disk
    Path(PathBuf),
    /// Bytes already transferred from an instrument
    Bytes(Vec<u8>),
}

/// One named channel of a capture group
#[derive(Debug, Clone)]
pub struct ChannelInput {
    pub name: String,
    pub source: ChannelSource,
}

impl ChannelInput {
    /// Channel named after the file stem (`tek0000CH1.isf` → `CH1`).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        Some(Self {
            name: channel_name_from_path(path)?,
            source: ChannelSource::Path(path.to_path_buf()),
        })
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: ChannelSource::Bytes(bytes),
        }
    }

    fn decode(&self) -> Result<IsfWaveform> {
        match &self.source {
            ChannelSource::Path(path) => IsfDecoder::decode_file(path),
            ChannelSource::Bytes(bytes) => IsfDecoder::decode_bytes(bytes),
        }
    }
}

/// Decoded ISF capture group
#[derive(Debug)]
pub struct IsfGroup {
    /// Channels sharing the canonical time axis
    pub traces: TraceSet,
    /// Preamble of every channel in `traces`
    pub headers: BTreeMap<String, IsfHeader>,
    /// Channels that failed to decode or did not fit the time axis
    pub missing: Vec<ChannelFailure>,
}

fn decode_one(input: ChannelInput) -> (String, Result<IsfWaveform>) {
    let result = input.decode();
    (input.name, result)
}

/// Decode the channel files of one capture.
///
/// A channel that fails is reported in [`IsfGroup::missing`] and the rest of
/// the group proceeds. With the `parallel` feature the files are decoded
/// concurrently; channel order in the result is by name either way.
pub fn decode_group(inputs: Vec<ChannelInput>) -> Result<IsfGroup> {
    info!("Decoding ISF capture group of {} channel(s)", inputs.len());

    #[cfg(feature = "parallel")]
    let results: Vec<_> = inputs.into_par_iter().map(decode_one).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = inputs.into_iter().map(decode_one).collect();

    let mut channels: Vec<DecodedChannel> = Vec::new();
    let mut headers = BTreeMap::new();
    let mut failures = Vec::new();

    for (name, result) in results {
        match result.and_then(|waveform| {
            let header = waveform.header.clone();
            waveform.into_channel(name.clone()).map(|c| (c, header))
        }) {
            Ok((channel, header)) => {
                headers.insert(name, header);
                channels.push(channel);
            }
            Err(error) => {
                warn!("Channel {} could not be decoded: {}", name, error);
                failures.push(ChannelFailure {
                    channel: name,
                    error,
                });
            }
        }
    }

    let group = CaptureGroup::assemble(channels, failures)?;
    headers.retain(|name, _| group.traces.contains(name));

    Ok(IsfGroup {
        traces: group.traces,
        headers,
        missing: group.missing,
    })
}
