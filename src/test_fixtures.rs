//! Test fixtures for track, session and spanning tests
//!
//! This module provides track backends with a fixed size, drives holding a
//! chosen medium, event recorders, and small on-disk trees and WAV files.

#![cfg(test)]

use std::any::Any;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use tempfile::TempDir;

use crate::burning::{Drive, DriveRef};
use crate::core::{BurnResult, MediaKind, Medium, Status, DATA_BLOCK_SIZE};
use crate::session::{BurnSession, SessionEvent};
use crate::track::{FsType, StreamFormat, Track, TrackBackend, TrackRef, TrackSize, TrackType};

/// A track backend reporting whatever it is told to
#[derive(Debug, Clone)]
pub struct FixedTrack {
    pub blocks: u64,
    pub block_size: u64,
    pub kind: TrackType,
    /// Result reported along with the size
    pub result: BurnResult,
    pub status: Status,
}

impl FixedTrack {
    fn new(blocks: u64, kind: TrackType) -> Self {
        Self {
            blocks,
            block_size: DATA_BLOCK_SIZE,
            kind,
            result: BurnResult::Ok,
            status: Status::completed(),
        }
    }

    /// A data track of `blocks` 2048-byte blocks
    pub fn data(blocks: u64) -> Self {
        Self::new(blocks, TrackType::Data { fs: FsType::ISO })
    }

    /// An audio track of `blocks` blocks, counted at 2048 bytes for easy sums
    pub fn stream(blocks: u64) -> Self {
        Self::new(
            blocks,
            TrackType::Stream {
                format: StreamFormat::AUDIO_UNDEFINED,
            },
        )
    }

    pub fn with_result(mut self, result: BurnResult) -> Self {
        self.result = result;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_stream_format(mut self, format: StreamFormat) -> Self {
        self.kind = TrackType::Stream { format };
        self
    }

    pub fn into_track(self) -> TrackRef {
        Track::new(self)
    }
}

impl TrackBackend for FixedTrack {
    fn size(&self) -> (BurnResult, TrackSize) {
        (self.result, TrackSize::from_blocks(self.blocks, self.block_size))
    }

    fn track_type(&self) -> TrackType {
        self.kind
    }

    fn status(&self) -> Status {
        self.status.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A physical drive holding a medium of the given kind and sizes (in blocks)
pub fn burner_with(kind: MediaKind, capacity: u64, free: u64) -> DriveRef {
    Drive::with_medium("burner", Medium::new(kind, capacity, free))
}

/// Record every event the session emits from now on
pub fn record_events(session: &BurnSession) -> Rc<RefCell<Vec<SessionEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let recorder = events.clone();
    session.connect(move |event| recorder.borrow_mut().push(event.clone()));
    events
}

/// Create files of the given sizes (in bytes) under a new temp directory
///
/// Paths are relative and may contain `/`; parent directories are created.
pub fn create_data_tree(files: &[(&str, usize)]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for (name, len) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(&path, vec![0u8; *len]).expect("Failed to write file");
    }
    dir
}

/// Write a silent 44.1 kHz 16-bit stereo PCM WAV file
pub fn write_silent_wav(path: &Path, seconds: u32) {
    const SAMPLE_RATE: u32 = 44_100;
    const CHANNELS: u16 = 2;
    const BITS: u16 = 16;
    let block_align = CHANNELS * BITS / 8;
    let byte_rate = SAMPLE_RATE * block_align as u32;
    let data_len = byte_rate * seconds;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&CHANNELS.to_le_bytes());
    wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&BITS.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(44 + data_len as usize, 0);

    fs::write(path, wav).expect("Failed to write WAV file");
}
