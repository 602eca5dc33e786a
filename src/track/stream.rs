//! Audio/video stream tracks
//!
//! Positions are in nanoseconds; a CD-DA sector holds 1/75 s of audio.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fs::File;
use std::path::{Path, PathBuf};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{Track, TrackBackend, TrackSize, TrackType};
use crate::core::BurnResult;

/// Bytes per audio sector
pub const AUDIO_BLOCK_SIZE: u64 = 2352;

const SECTORS_PER_SECOND: u64 = 75;
const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Whole sectors covered by `nanos` of audio
pub fn duration_to_sectors(nanos: u64) -> u64 {
    ((nanos as u128 * SECTORS_PER_SECOND as u128) / NANOS_PER_SECOND as u128) as u64
}

/// Shortest duration that covers `sectors` whole sectors
pub fn sectors_to_duration(sectors: u64) -> u64 {
    ((sectors as u128 * NANOS_PER_SECOND as u128).div_ceil(SECTORS_PER_SECOND as u128)) as u64
}

bitflags! {
    /// Stream contents
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StreamFormat: u32 {
        const AUDIO_UNDEFINED = 1;
        const AUDIO_DTS = 1 << 1;
        const AUDIO_RAW = 1 << 2;
        const AUDIO_RAW_LITTLE_ENDIAN = 1 << 3;
        const VIDEO_UNDEFINED = 1 << 4;
        const VIDEO_VCD = 1 << 5;
        const VIDEO_DVD = 1 << 6;
        const AUDIO_AC3 = 1 << 7;
        const AUDIO_MP2 = 1 << 8;
        const METADATA_INFO = 1 << 10;
        const AUDIO_44100 = 1 << 11;
        const AUDIO_48000 = 1 << 12;
    }
}

const STREAM_NAMES: &[(StreamFormat, &str)] = &[
    (StreamFormat::AUDIO_UNDEFINED, "audio"),
    (StreamFormat::AUDIO_DTS, "dts"),
    (StreamFormat::AUDIO_RAW, "raw"),
    (StreamFormat::AUDIO_RAW_LITTLE_ENDIAN, "raw little endian"),
    (StreamFormat::VIDEO_UNDEFINED, "video"),
    (StreamFormat::VIDEO_VCD, "vcd"),
    (StreamFormat::VIDEO_DVD, "video dvd"),
    (StreamFormat::AUDIO_AC3, "ac3"),
    (StreamFormat::AUDIO_MP2, "mp2"),
    (StreamFormat::METADATA_INFO, "metadata"),
    (StreamFormat::AUDIO_44100, "44100 Hz"),
    (StreamFormat::AUDIO_48000, "48000 Hz"),
];

pub(crate) fn format_stream(format: StreamFormat) -> String {
    if format.is_empty() {
        return "none".to_string();
    }
    STREAM_NAMES
        .iter()
        .filter(|(flag, _)| format.contains(*flag))
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read the playing time of an audio file, in nanoseconds
pub fn probe_duration(path: &Path) -> Result<u64, String> {
    let file = File::open(path).map_err(|e| format!("Failed to open file: {}", e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(&ext.to_string_lossy());
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| format!("Failed to probe audio format: {}", e))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| "No default track found".to_string())?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| "Unknown sample rate".to_string())?;
    let n_frames = track
        .codec_params
        .n_frames
        .ok_or_else(|| "Unknown stream length".to_string())?;

    Ok(((n_frames as u128 * NANOS_PER_SECOND as u128) / sample_rate as u128) as u64)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamTrack {
    source: Option<PathBuf>,
    format: StreamFormat,
    start: u64,
    /// 0 while the length of the source is unknown
    end: u64,
    /// Silence appended after the track
    gap: u64,
}

impl StreamTrack {
    pub fn new(source: impl Into<PathBuf>, format: StreamFormat) -> Self {
        Self {
            source: Some(source.into()),
            format,
            ..Self::default()
        }
    }

    pub fn with_boundaries(mut self, start: u64, end: u64, gap: u64) -> Self {
        self.start = start;
        self.end = end;
        self.gap = gap;
        self
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn format(&self) -> StreamFormat {
        self.format
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn gap(&self) -> u64 {
        self.gap
    }

    /// Playing time including the gap, 0 if the end is unknown
    pub fn length(&self) -> u64 {
        if self.end == 0 {
            return 0;
        }
        self.end.saturating_sub(self.start) + self.gap
    }

    pub fn set_source(&mut self, source: PathBuf) -> BurnResult {
        if self.source.as_deref() == Some(source.as_path()) {
            return BurnResult::NotSupported;
        }
        self.source = Some(source);
        BurnResult::Ok
    }

    pub fn set_format(&mut self, format: StreamFormat) -> BurnResult {
        if self.format == format {
            return BurnResult::NotSupported;
        }
        self.format = format;
        BurnResult::Ok
    }

    /// Change any of start, end and gap; `None` keeps the current value
    pub fn set_boundaries(&mut self, start: Option<u64>, end: Option<u64>, gap: Option<u64>) -> BurnResult {
        let start = start.unwrap_or(self.start);
        let end = end.unwrap_or(self.end);
        let gap = gap.unwrap_or(self.gap);

        if end != 0 && end < start {
            return BurnResult::Error;
        }
        if (start, end, gap) == (self.start, self.end, self.gap) {
            return BurnResult::NotSupported;
        }

        self.start = start;
        self.end = end;
        self.gap = gap;
        BurnResult::Ok
    }

    /// Fill in an unknown end from the source file's duration
    pub fn probe_length(&mut self) -> BurnResult {
        if self.end != 0 {
            return BurnResult::NotSupported;
        }
        let Some(source) = &self.source else {
            return BurnResult::Error;
        };

        match probe_duration(source) {
            Ok(duration) if duration > self.start => {
                self.end = duration;
                BurnResult::Ok
            }
            Ok(_) => {
                log::warn!("{}: stream shorter than its start offset", source.display());
                BurnResult::Error
            }
            Err(e) => {
                log::warn!("{}: {}", source.display(), e);
                BurnResult::Error
            }
        }
    }
}

impl TrackBackend for StreamTrack {
    fn size(&self) -> (BurnResult, TrackSize) {
        if self.source.is_none() {
            return (BurnResult::Error, TrackSize::default());
        }
        if self.end == 0 {
            return (BurnResult::NotReady, TrackSize::default());
        }
        let blocks = duration_to_sectors(self.length());
        (BurnResult::Ok, TrackSize::from_blocks(blocks, AUDIO_BLOCK_SIZE))
    }

    fn track_type(&self) -> TrackType {
        TrackType::Stream { format: self.format }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn changed_or_ok(result: BurnResult) -> BurnResult {
    if result == BurnResult::NotSupported {
        BurnResult::Ok
    } else {
        result
    }
}

impl Track {
    pub fn set_stream_source(&self, source: PathBuf) -> BurnResult {
        changed_or_ok(self.update(|track: &mut StreamTrack| track.set_source(source)))
    }

    pub fn set_stream_format(&self, format: StreamFormat) -> BurnResult {
        changed_or_ok(self.update(|track: &mut StreamTrack| track.set_format(format)))
    }

    pub fn set_stream_boundaries(&self, start: Option<u64>, end: Option<u64>, gap: Option<u64>) -> BurnResult {
        changed_or_ok(self.update(|track: &mut StreamTrack| track.set_boundaries(start, end, gap)))
    }

    /// Read the stream length from the source file if it is not known yet
    pub fn probe_stream_length(&self) -> BurnResult {
        changed_or_ok(self.update(|track: &mut StreamTrack| track.probe_length()))
    }
}
