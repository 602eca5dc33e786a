//! Medium description: what kind of disc sits in a drive and how much room it has

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Size of one data sector on optical media
pub const DATA_BLOCK_SIZE: u64 = 2048;

/// Blocks on a standard 80 minute CD-R
pub const CD_80_BLOCKS: u64 = 360_000;

/// Blocks advertised by the file pseudo-medium (roughly 2 TiB of sectors)
pub const FILE_MEDIUM_BLOCKS: u64 = 1 << 30;

bitflags! {
    /// Physical or virtual medium status
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MediaKind: u32 {
        /// Image file written by the fake drive
        const FILE = 1;
        const CD = 1 << 1;
        const DVD = 1 << 2;
        const BD = 1 << 3;
        const ROM = 1 << 4;
        const WRITABLE = 1 << 5;
        const REWRITABLE = 1 << 6;
        const BLANK = 1 << 7;
        const APPENDABLE = 1 << 8;
        const CLOSED = 1 << 9;
        const HAS_DATA = 1 << 10;
        const HAS_AUDIO = 1 << 11;
        const UNSUPPORTED = 1 << 12;
    }
}

const MEDIA_NAMES: &[(MediaKind, &str)] = &[
    (MediaKind::FILE, "file"),
    (MediaKind::CD, "CD"),
    (MediaKind::DVD, "DVD"),
    (MediaKind::BD, "BD"),
    (MediaKind::ROM, "ROM"),
    (MediaKind::WRITABLE, "writable"),
    (MediaKind::REWRITABLE, "rewritable"),
    (MediaKind::BLANK, "blank"),
    (MediaKind::APPENDABLE, "appendable"),
    (MediaKind::CLOSED, "closed"),
    (MediaKind::HAS_DATA, "with data"),
    (MediaKind::HAS_AUDIO, "with audio"),
    (MediaKind::UNSUPPORTED, "unsupported"),
];

/// Format a medium kind for diagnostics, e.g. `"CD rewritable appendable"`
pub fn format_media(kind: MediaKind) -> String {
    if kind.is_empty() {
        return "none".to_string();
    }

    MEDIA_NAMES
        .iter()
        .filter(|(flag, _)| kind.contains(*flag))
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A disc (or image file) inserted in a drive
///
/// Capacities are counted in blocks of `DATA_BLOCK_SIZE` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medium {
    pub kind: MediaKind,
    pub capacity_blocks: u64,
    pub free_blocks: u64,
    /// Maximum write speed in bytes per second, 0 if unknown
    pub max_write_rate: u64,
}

impl Medium {
    pub fn new(kind: MediaKind, capacity_blocks: u64, free_blocks: u64) -> Self {
        Self {
            kind,
            capacity_blocks,
            free_blocks: free_blocks.min(capacity_blocks),
            max_write_rate: 0,
        }
    }

    /// A blank medium: everything is free
    pub fn blank(kind: MediaKind, capacity_blocks: u64) -> Self {
        Self::new(kind | MediaKind::BLANK, capacity_blocks, capacity_blocks)
    }

    /// The pseudo-medium of the fake drive
    pub fn file() -> Self {
        Self::blank(MediaKind::FILE, FILE_MEDIUM_BLOCKS)
    }

    pub fn with_max_write_rate(mut self, rate: u64) -> Self {
        self.max_write_rate = rate;
        self
    }

    pub fn capacity(&self) -> u64 {
        self.capacity_blocks
    }

    pub fn free_space(&self) -> u64 {
        self.free_blocks
    }

    /// Blocks already holding data
    pub fn used_blocks(&self) -> u64 {
        self.capacity_blocks.saturating_sub(self.free_blocks)
    }

    pub fn is_blank(&self) -> bool {
        self.kind.contains(MediaKind::BLANK)
    }

    pub fn is_rewritable(&self) -> bool {
        self.kind.contains(MediaKind::REWRITABLE)
    }

    pub fn is_file(&self) -> bool {
        self.kind.contains(MediaKind::FILE)
    }

    /// Whether the medium could be erased to regain its full capacity
    pub fn can_blank(&self) -> bool {
        self.is_rewritable() && !self.is_blank()
    }
}
