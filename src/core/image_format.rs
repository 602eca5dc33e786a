//! Disc image formats and their companion files
//!
//! Only the file-name conventions live here; image contents are never parsed.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

bitflags! {
    /// Output image format of a session writing to a file
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ImageFormat: u32 {
        /// Plain 2048-byte sector image (.iso/.bin)
        const BIN = 1;
        /// .bin + .cue pair
        const CUE = 1 << 1;
        /// raw image + .toc written by readcd -clone
        const CLONE = 1 << 2;
        /// .bin + cdrdao .toc pair
        const CDRDAO = 1 << 3;
    }
}

impl ImageFormat {
    /// Bytes per sector stored in an image of this format
    pub fn block_size(self) -> u64 {
        if self.contains(ImageFormat::CLONE) {
            2448
        } else if self.intersects(ImageFormat::CUE | ImageFormat::CDRDAO) {
            2352
        } else {
            2048
        }
    }

    /// Whether this format needs a table-of-contents file next to the image
    pub fn has_toc(self) -> bool {
        self.intersects(ImageFormat::CUE | ImageFormat::CDRDAO | ImageFormat::CLONE)
    }

    pub fn display_text(self) -> &'static str {
        if self.contains(ImageFormat::CLONE) {
            "clone"
        } else if self.contains(ImageFormat::CUE) {
            "cue"
        } else if self.contains(ImageFormat::CDRDAO) {
            "cdrdao"
        } else if self.contains(ImageFormat::BIN) {
            "bin"
        } else {
            "none"
        }
    }
}

fn replace_suffix(path: &Path, from: &str, to: &str) -> PathBuf {
    let text = path.to_string_lossy();
    match text.strip_suffix(from) {
        Some(stem) => PathBuf::from(format!("{}{}", stem, to)),
        None => PathBuf::from(format!("{}{}", text, to)),
    }
}

/// Derive the image path from a toc/cue path
///
/// Returns `None` for formats without a companion file, or for a CLONE toc
/// that does not carry the mandatory `.toc` suffix.
pub fn get_complement(format: ImageFormat, toc: &Path) -> Option<PathBuf> {
    if format.contains(ImageFormat::CLONE) {
        let text = toc.to_string_lossy();
        return text.strip_suffix(".toc").map(PathBuf::from);
    }
    if format.contains(ImageFormat::CUE) {
        return Some(replace_suffix(toc, ".cue", ".bin"));
    }
    if format.contains(ImageFormat::CDRDAO) {
        return Some(replace_suffix(toc, ".toc", ".bin"));
    }
    None
}

/// Derive the toc/cue path from an image path
pub fn get_toc_path(format: ImageFormat, image: &Path) -> Option<PathBuf> {
    if format.contains(ImageFormat::CLONE) {
        return Some(PathBuf::from(format!("{}.toc", image.to_string_lossy())));
    }
    if format.contains(ImageFormat::CUE) {
        return Some(replace_suffix(image, ".bin", ".cue"));
    }
    if format.contains(ImageFormat::CDRDAO) {
        return Some(replace_suffix(image, ".bin", ".toc"));
    }
    None
}

/// Conventional suffix for an image file of the given format
pub fn default_image_suffix(format: ImageFormat) -> &'static str {
    if format.contains(ImageFormat::CLONE) {
        ".raw"
    } else if format.intersects(ImageFormat::CUE | ImageFormat::CDRDAO) {
        ".bin"
    } else {
        ".iso"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_sizes() {
        assert_eq!(ImageFormat::BIN.block_size(), 2048);
        assert_eq!(ImageFormat::CUE.block_size(), 2352);
        assert_eq!(ImageFormat::CDRDAO.block_size(), 2352);
        assert_eq!(ImageFormat::CLONE.block_size(), 2448);
        assert_eq!(ImageFormat::empty().block_size(), 2048);
    }

    #[test]
    fn test_cue_complement_swaps_suffix() {
        let image = get_complement(ImageFormat::CUE, Path::new("/out/disc.cue"));
        assert_eq!(image, Some(PathBuf::from("/out/disc.bin")));

        let toc = get_toc_path(ImageFormat::CUE, Path::new("/out/disc.bin"));
        assert_eq!(toc, Some(PathBuf::from("/out/disc.cue")));
    }

    #[test]
    fn test_cdrdao_complement_appends_when_suffix_missing() {
        let image = get_complement(ImageFormat::CDRDAO, Path::new("/out/disc"));
        assert_eq!(image, Some(PathBuf::from("/out/disc.bin")));

        let toc = get_toc_path(ImageFormat::CDRDAO, Path::new("/out/disc.img"));
        assert_eq!(toc, Some(PathBuf::from("/out/disc.img.toc")));
    }

    #[test]
    fn test_clone_complement() {
        let toc = get_toc_path(ImageFormat::CLONE, Path::new("/out/disc.raw"));
        assert_eq!(toc, Some(PathBuf::from("/out/disc.raw.toc")));

        let image = get_complement(ImageFormat::CLONE, Path::new("/out/disc.raw.toc"));
        assert_eq!(image, Some(PathBuf::from("/out/disc.raw")));

        assert_eq!(get_complement(ImageFormat::CLONE, Path::new("/out/disc.cue")), None);
    }

    #[test]
    fn test_bin_has_no_companion() {
        assert_eq!(get_complement(ImageFormat::BIN, Path::new("/out/disc.iso")), None);
        assert_eq!(get_toc_path(ImageFormat::BIN, Path::new("/out/disc.iso")), None);
        assert!(!ImageFormat::BIN.has_toc());
    }
}
