//! Disc image file tracks

use std::any::Any;
use std::path::{Path, PathBuf};

use super::{Track, TrackBackend, TrackSize, TrackType};
use crate::core::{BurnResult, ImageFormat};

/// An existing image file (and its toc/cue companion) to burn as-is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageTrack {
    image: Option<PathBuf>,
    toc: Option<PathBuf>,
    format: ImageFormat,
    /// 0 when unknown; the size is then derived from the image file length
    blocks: u64,
}

impl ImageTrack {
    pub fn new(image: impl Into<PathBuf>, format: ImageFormat) -> Self {
        Self {
            image: Some(image.into()),
            toc: None,
            format,
            blocks: 0,
        }
    }

    pub fn with_toc(mut self, toc: impl Into<PathBuf>) -> Self {
        self.toc = Some(toc.into());
        self
    }

    pub fn with_block_count(mut self, blocks: u64) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn image(&self) -> Option<&Path> {
        self.image.as_deref()
    }

    pub fn toc(&self) -> Option<&Path> {
        self.toc.as_deref()
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn block_count(&self) -> u64 {
        self.blocks
    }

    /// Replace the source files; `Error` when no path is given at all
    pub fn set_source(
        &mut self,
        image: Option<PathBuf>,
        toc: Option<PathBuf>,
        format: ImageFormat,
    ) -> BurnResult {
        if image.is_none() && toc.is_none() {
            return BurnResult::Error;
        }

        self.image = image;
        self.toc = toc;
        self.format = format;
        // Block count belongs to the previous image
        self.blocks = 0;
        BurnResult::Ok
    }

    pub fn set_block_count(&mut self, blocks: u64) -> BurnResult {
        if blocks == self.blocks {
            return BurnResult::NotSupported;
        }
        self.blocks = blocks;
        BurnResult::Ok
    }
}

impl TrackBackend for ImageTrack {
    fn size(&self) -> (BurnResult, TrackSize) {
        let block_size = self.format.block_size();

        if self.blocks > 0 {
            return (BurnResult::Ok, TrackSize::from_blocks(self.blocks, block_size));
        }

        let Some(image) = &self.image else {
            if self.toc.is_some() {
                // The image is described by its toc; size comes with the block count
                return (BurnResult::NotReady, TrackSize::default());
            }
            return (BurnResult::Error, TrackSize::default());
        };

        match std::fs::metadata(image) {
            Ok(metadata) => {
                let blocks = metadata.len().div_ceil(block_size);
                (BurnResult::Ok, TrackSize::from_blocks(blocks, block_size))
            }
            Err(e) => {
                log::debug!("Image {} not available yet: {}", image.display(), e);
                (BurnResult::NotReady, TrackSize::default())
            }
        }
    }

    fn track_type(&self) -> TrackType {
        TrackType::Image { format: self.format }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Track {
    /// Set the image and toc of an image track
    pub fn set_image_source(
        &self,
        image: Option<PathBuf>,
        toc: Option<PathBuf>,
        format: ImageFormat,
    ) -> BurnResult {
        self.update(|track: &mut ImageTrack| track.set_source(image, toc, format))
    }

    /// Set the block count of an image track
    ///
    /// Setting the current value again is not a change and does not notify.
    pub fn set_image_block_count(&self, blocks: u64) -> BurnResult {
        let result = self.update(|track: &mut ImageTrack| track.set_block_count(blocks));
        if result == BurnResult::NotSupported {
            return BurnResult::Ok;
        }
        result
    }
}
