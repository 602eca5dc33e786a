//! Data tracks: a set of files grafted into a filesystem layout

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{Track, TrackBackend, TrackSize, TrackType};
use crate::core::{BurnResult, DATA_BLOCK_SIZE};

bitflags! {
    /// Filesystem features of a data track
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FsType: u32 {
        const SYMLINK = 1;
        const ISO = 1 << 1;
        const UDF = 1 << 2;
        const JOLIET = 1 << 3;
        const VIDEO = 1 << 4;
        const DEEP_DIRECTORY = 1 << 5;
    }
}

const FS_NAMES: &[(FsType, &str)] = &[
    (FsType::SYMLINK, "symlink"),
    (FsType::ISO, "iso"),
    (FsType::UDF, "udf"),
    (FsType::JOLIET, "joliet"),
    (FsType::VIDEO, "video"),
    (FsType::DEEP_DIRECTORY, "deep directory"),
];

pub(crate) fn format_fs(fs: FsType) -> String {
    if fs.is_empty() {
        return "none".to_string();
    }
    FS_NAMES
        .iter()
        .filter(|(flag, _)| fs.contains(*flag))
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One entry of the disc layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graft {
    /// Path on the disc, e.g. `/photos/2024`
    pub disc_path: String,
    /// Local file or directory; `None` creates an empty directory
    pub source: Option<PathBuf>,
}

impl Graft {
    pub fn new(disc_path: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            disc_path: disc_path.into(),
            source: Some(source.into()),
        }
    }

    pub fn empty_dir(disc_path: impl Into<String>) -> Self {
        Self {
            disc_path: disc_path.into(),
            source: None,
        }
    }
}

/// Files laid out as a filesystem image at burn time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTrack {
    grafts: Vec<Graft>,
    excluded: Vec<PathBuf>,
    fs: FsType,
    file_num: u64,
    data_blocks: u64,
}

/// Blocks a file of `len` bytes occupies
pub(crate) fn blocks_for_len(len: u64) -> u64 {
    len.div_ceil(DATA_BLOCK_SIZE)
}

/// Count the files under `source` and the blocks they occupy
///
/// Directories themselves are not counted; paths under `excluded` are skipped.
pub(crate) fn measure_source(source: &Path, excluded: &[PathBuf]) -> (u64, u64) {
    let mut files = 0;
    let mut blocks = 0;

    for entry in WalkDir::new(source)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !excluded.iter().any(|ex| entry.path().starts_with(ex)))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.metadata() {
            Ok(metadata) => {
                files += 1;
                blocks += blocks_for_len(metadata.len());
            }
            Err(e) => log::warn!("Skipping {}: {}", entry.path().display(), e),
        }
    }

    (files, blocks)
}

impl DataTrack {
    pub fn new(fs: FsType) -> Self {
        Self {
            fs,
            ..Self::default()
        }
    }

    pub fn grafts(&self) -> &[Graft] {
        &self.grafts
    }

    pub fn excluded(&self) -> &[PathBuf] {
        &self.excluded
    }

    pub fn fs(&self) -> FsType {
        self.fs
    }

    pub fn file_num(&self) -> u64 {
        self.file_num
    }

    pub fn data_blocks(&self) -> u64 {
        self.data_blocks
    }

    /// Replace the layout and measure it on disk
    pub fn set_source(&mut self, grafts: Vec<Graft>, excluded: Vec<PathBuf>) -> BurnResult {
        let mut file_num = 0;
        let mut data_blocks = 0;
        for graft in &grafts {
            if let Some(source) = &graft.source {
                let (files, blocks) = measure_source(source, &excluded);
                file_num += files;
                data_blocks += blocks;
            }
        }

        self.grafts = grafts;
        self.excluded = excluded;
        self.file_num = file_num;
        self.data_blocks = data_blocks;
        BurnResult::Ok
    }

    /// Replace the layout with already measured grafts
    pub(crate) fn set_layout(&mut self, grafts: Vec<Graft>, file_num: u64, data_blocks: u64) {
        self.grafts = grafts;
        self.excluded.clear();
        self.file_num = file_num;
        self.data_blocks = data_blocks;
    }

    pub fn add_fs(&mut self, fs: FsType) -> BurnResult {
        if self.fs.contains(fs) {
            return BurnResult::NotSupported;
        }
        self.fs |= fs;
        BurnResult::Ok
    }

    pub fn remove_fs(&mut self, fs: FsType) -> BurnResult {
        if !self.fs.intersects(fs) {
            return BurnResult::NotSupported;
        }
        self.fs.remove(fs);
        BurnResult::Ok
    }

    /// Override the measured size, e.g. with the exact filesystem size
    pub fn set_data_blocks(&mut self, blocks: u64) -> BurnResult {
        self.data_blocks = blocks;
        BurnResult::Ok
    }

    pub fn set_file_num(&mut self, file_num: u64) -> BurnResult {
        self.file_num = file_num;
        BurnResult::Ok
    }
}

impl TrackBackend for DataTrack {
    fn size(&self) -> (BurnResult, TrackSize) {
        if self.grafts.is_empty() {
            return (BurnResult::Error, TrackSize::default());
        }
        (BurnResult::Ok, TrackSize::from_blocks(self.data_blocks, DATA_BLOCK_SIZE))
    }

    fn track_type(&self) -> TrackType {
        TrackType::Data { fs: self.fs }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Track {
    pub fn set_data_source(&self, grafts: Vec<Graft>, excluded: Vec<PathBuf>) -> BurnResult {
        self.update(|track: &mut DataTrack| track.set_source(grafts, excluded))
    }

    pub fn add_data_fs(&self, fs: FsType) -> BurnResult {
        let result = self.update(|track: &mut DataTrack| track.add_fs(fs));
        if result == BurnResult::NotSupported {
            return BurnResult::Ok;
        }
        result
    }

    pub fn remove_data_fs(&self, fs: FsType) -> BurnResult {
        let result = self.update(|track: &mut DataTrack| track.remove_fs(fs));
        if result == BurnResult::NotSupported {
            return BurnResult::Ok;
        }
        result
    }

    pub fn set_data_blocks(&self, blocks: u64) -> BurnResult {
        self.update(|track: &mut DataTrack| track.set_data_blocks(blocks))
    }

    pub fn set_data_file_num(&self, file_num: u64) -> BurnResult {
        self.update(|track: &mut DataTrack| track.set_file_num(file_num))
    }
}
