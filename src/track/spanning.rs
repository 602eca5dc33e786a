//! A data track that splits itself across media
//!
//! The layout is an ordered list of grafts; each `span()` hands out the
//! longest run of remaining grafts that fits, as a plain `DataTrack`. A single
//! graft is never split.

use std::any::Any;

use super::data::{measure_source, DataTrack, FsType, Graft};
use super::{SpanningTrack, Track, TrackBackend, TrackRef, TrackSize, TrackType};
use crate::core::{BurnResult, DATA_BLOCK_SIZE};

/// A graft with its measured size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedGraft {
    pub graft: Graft,
    pub files: u64,
    pub blocks: u64,
}

impl SizedGraft {
    pub fn new(graft: Graft, files: u64, blocks: u64) -> Self {
        Self { graft, files, blocks }
    }

    /// Measure the graft's source on disk
    pub fn measure(graft: Graft) -> Self {
        let (files, blocks) = match &graft.source {
            Some(source) => measure_source(source, &[]),
            None => (0, 0),
        };
        Self { graft, files, blocks }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpanningDataTrack {
    grafts: Vec<SizedGraft>,
    fs: FsType,
    /// First graft not handed out yet
    next: usize,
}

impl SpanningDataTrack {
    pub fn new(grafts: Vec<SizedGraft>, fs: FsType) -> Self {
        Self { grafts, fs, next: 0 }
    }

    pub fn from_grafts(grafts: Vec<Graft>, fs: FsType) -> Self {
        Self::new(grafts.into_iter().map(SizedGraft::measure).collect(), fs)
    }

    pub fn grafts(&self) -> &[SizedGraft] {
        &self.grafts
    }

    fn remaining(&self) -> &[SizedGraft] {
        self.grafts.get(self.next..).unwrap_or(&[])
    }
}

impl TrackBackend for SpanningDataTrack {
    fn size(&self) -> (BurnResult, TrackSize) {
        if self.grafts.is_empty() {
            return (BurnResult::Error, TrackSize::default());
        }
        let blocks = self.grafts.iter().map(|sized| sized.blocks).sum();
        (BurnResult::Ok, TrackSize::from_blocks(blocks, DATA_BLOCK_SIZE))
    }

    fn track_type(&self) -> TrackType {
        TrackType::Data { fs: self.fs }
    }

    fn spanning(&self) -> Option<&dyn SpanningTrack> {
        Some(self)
    }

    fn spanning_mut(&mut self) -> Option<&mut dyn SpanningTrack> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl SpanningTrack for SpanningDataTrack {
    fn span_again(&self) -> BurnResult {
        if self.remaining().is_empty() {
            BurnResult::Ok
        } else {
            BurnResult::Retry
        }
    }

    fn span_possible(&self, max_blocks: u64) -> BurnResult {
        match self.remaining().first() {
            None => BurnResult::Ok,
            Some(sized) if sized.blocks >= max_blocks => BurnResult::Error,
            Some(_) => BurnResult::Retry,
        }
    }

    fn span(&mut self, max_blocks: u64) -> Result<TrackRef, BurnResult> {
        let remaining = self.remaining();
        if remaining.is_empty() {
            return Err(BurnResult::Ok);
        }

        let mut blocks = 0;
        let mut files = 0;
        let mut taken = 0;
        for sized in remaining {
            if blocks + sized.blocks >= max_blocks {
                break;
            }
            blocks += sized.blocks;
            files += sized.files;
            taken += 1;
        }

        if taken == 0 {
            log::warn!(
                "Graft {} ({} blocks) does not fit in {} blocks",
                remaining[0].graft.disc_path,
                remaining[0].blocks,
                max_blocks
            );
            return Err(BurnResult::Error);
        }

        let grafts: Vec<Graft> = remaining[..taken]
            .iter()
            .map(|sized| sized.graft.clone())
            .collect();
        log::debug!("Spanning {} grafts ({} blocks) onto next medium", taken, blocks);

        let mut volume = DataTrack::new(self.fs);
        volume.set_layout(grafts, files, blocks);
        self.next += taken;
        Ok(Track::new(volume))
    }

    fn span_max_space(&self) -> u64 {
        self.remaining()
            .iter()
            .map(|sized| sized.blocks)
            .max()
            .unwrap_or(0)
    }

    fn span_stop(&mut self) {
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::create_data_tree;

    fn graft(name: &str, blocks: u64) -> SizedGraft {
        SizedGraft::new(Graft::new(format!("/{}", name), format!("/src/{}", name)), 1, blocks)
    }

    fn project(sizes: &[u64]) -> SpanningDataTrack {
        let grafts = sizes
            .iter()
            .enumerate()
            .map(|(i, blocks)| graft(&format!("g{}", i), *blocks))
            .collect();
        SpanningDataTrack::new(grafts, FsType::ISO | FsType::JOLIET)
    }

    #[test]
    fn test_size_is_whole_project() {
        let track = project(&[10, 20, 30]);
        assert_eq!(track.size(), (BurnResult::Ok, TrackSize { blocks: 60, bytes: 122_880 }));
        assert_eq!(track.track_type(), TrackType::Data { fs: FsType::ISO | FsType::JOLIET });
    }

    #[test]
    fn test_span_hands_out_prefixes() {
        let mut track = project(&[30, 30, 30, 50]);

        let first = track.span(100).unwrap();
        assert_eq!(first.get_size().1.blocks, 90);
        assert_eq!(track.span_again(), BurnResult::Retry);

        let second = track.span(100).unwrap();
        assert_eq!(second.get_size().1.blocks, 50);
        let grafts = second.with_backend(|data: &DataTrack| data.grafts().to_vec()).unwrap();
        assert_eq!(grafts.len(), 1);
        assert_eq!(grafts[0].disc_path, "/g3");

        assert_eq!(track.span_again(), BurnResult::Ok);
        assert_eq!(track.span(100).unwrap_err(), BurnResult::Ok);
    }

    #[test]
    fn test_span_graft_too_big() {
        let mut track = project(&[150]);
        assert_eq!(track.span_possible(100), BurnResult::Error);
        assert_eq!(track.span(100).unwrap_err(), BurnResult::Error);
    }

    #[test]
    fn test_max_space_and_stop() {
        let mut track = project(&[80, 10, 40]);
        assert_eq!(track.span_max_space(), 80);

        track.span(100).unwrap();
        assert_eq!(track.span_max_space(), 40);
        assert_eq!(track.span_possible(100), BurnResult::Retry);

        track.span_stop();
        assert_eq!(track.span_max_space(), 80);
    }

    #[test]
    fn test_from_grafts_measures_sources() {
        let tree = create_data_tree(&[("one.bin", 4096), ("two.bin", 2049)]);
        let track = SpanningDataTrack::from_grafts(
            vec![
                Graft::new("/one.bin", tree.path().join("one.bin")),
                Graft::new("/two.bin", tree.path().join("two.bin")),
                Graft::empty_dir("/empty"),
            ],
            FsType::ISO,
        );

        let blocks: Vec<u64> = track.grafts().iter().map(|sized| sized.blocks).collect();
        assert_eq!(blocks, vec![2, 2, 0]);
    }

    #[test]
    fn test_is_spanning_through_track_handle() {
        let track = Track::new(project(&[10]));
        assert!(track.is_spanning());
        assert_eq!(track.span_possible(100), BurnResult::Retry);
        assert!(track.span(100).is_ok());
        assert_eq!(track.span_again(), BurnResult::Ok);
        track.span_stop();
        assert_eq!(track.span_again(), BurnResult::Retry);
    }
}
