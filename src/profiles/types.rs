//! Profile types for saving/loading session configurations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::{BurnFlags, ImageFormat};
use crate::track::{FsType, Graft};

/// Current profile format version
pub const PROFILE_VERSION: &str = "1.0";

/// A saved burn session: what to burn and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionProfile {
    /// Version of the profile format (for future compatibility)
    pub version: String,

    /// User-friendly name for this profile
    pub profile_name: String,

    /// When this profile was created (RFC 3339)
    pub created: String,

    /// When this profile was last modified (RFC 3339)
    pub modified: String,

    /// Disc label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default)]
    pub flags: BurnFlags,

    /// Write an image file instead of burning a disc
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputSpec>,

    /// Ordered tracks
    pub tracks: Vec<TrackSpec>,
}

/// Image file output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub format: ImageFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toc: Option<PathBuf>,
}

/// One saved track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackSpec {
    /// An existing image file
    Image {
        image: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        toc: Option<PathBuf>,
        format: ImageFormat,
        /// 0 to use the file length
        #[serde(default)]
        blocks: u64,
    },
    /// Files laid out as a filesystem
    Data {
        grafts: Vec<Graft>,
        #[serde(default)]
        excluded: Vec<PathBuf>,
        fs: FsType,
        /// Allow the layout to be split over several discs
        #[serde(default)]
        spanning: bool,
    },
    /// An audio file; positions in nanoseconds, `end` 0 to probe the file
    Stream {
        source: PathBuf,
        #[serde(default)]
        start: u64,
        #[serde(default)]
        end: u64,
        #[serde(default)]
        gap: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
}

impl SessionProfile {
    /// Create a new empty profile
    pub fn new(profile_name: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: PROFILE_VERSION.to_string(),
            profile_name,
            created: now.clone(),
            modified: now,
            label: None,
            flags: BurnFlags::empty(),
            output: None,
            tracks: Vec::new(),
        }
    }

    /// Update the modified timestamp
    pub fn touch(&mut self) {
        self.modified = chrono::Utc::now().to_rfc3339();
    }
}
