//! Disc tracks: copy the contents of a disc sitting in another drive

use std::any::Any;

use super::{Track, TrackBackend, TrackSize, TrackType};
use crate::burning::{same_drive, DriveRef};
use crate::core::{BurnResult, Status, DATA_BLOCK_SIZE};

#[derive(Debug, Clone, Default)]
pub struct DiscTrack {
    drive: Option<DriveRef>,
    /// Copy a single track of the source disc instead of the whole disc
    track_num: Option<u32>,
}

impl DiscTrack {
    pub fn new(drive: DriveRef) -> Self {
        Self {
            drive: Some(drive),
            track_num: None,
        }
    }

    pub fn drive(&self) -> Option<&DriveRef> {
        self.drive.as_ref()
    }

    pub fn track_num(&self) -> Option<u32> {
        self.track_num
    }

    pub fn set_drive(&mut self, drive: Option<DriveRef>) -> BurnResult {
        if same_drive(self.drive.as_ref(), drive.as_ref()) {
            return BurnResult::NotSupported;
        }
        self.drive = drive;
        BurnResult::Ok
    }

    pub fn set_track_num(&mut self, track_num: Option<u32>) -> BurnResult {
        if self.track_num == track_num {
            return BurnResult::NotSupported;
        }
        self.track_num = track_num;
        BurnResult::Ok
    }
}

impl TrackBackend for DiscTrack {
    fn size(&self) -> (BurnResult, TrackSize) {
        let Some(drive) = &self.drive else {
            return (BurnResult::Error, TrackSize::default());
        };
        if drive.probing() {
            return (BurnResult::NotReady, TrackSize::default());
        }
        match drive.medium() {
            Some(medium) => (
                BurnResult::Ok,
                TrackSize::from_blocks(medium.used_blocks(), DATA_BLOCK_SIZE),
            ),
            None => (BurnResult::Error, TrackSize::default()),
        }
    }

    fn track_type(&self) -> TrackType {
        TrackType::Disc {
            medium: self
                .drive
                .as_ref()
                .map(|drive| drive.media_kind())
                .unwrap_or_default(),
        }
    }

    fn status(&self) -> Status {
        let Some(drive) = &self.drive else {
            return Status::error(Some("No source drive".to_string()));
        };
        if drive.probing() {
            return Status::not_ready(None, Some("Probing source disc".to_string()));
        }
        if drive.medium().is_none() {
            return Status::error(Some("No disc in source drive".to_string()));
        }
        Status::completed()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Track {
    pub fn set_disc_drive(&self, drive: Option<DriveRef>) -> BurnResult {
        let result = self.update(|track: &mut DiscTrack| track.set_drive(drive));
        if result == BurnResult::NotSupported {
            return BurnResult::Ok;
        }
        result
    }

    pub fn set_disc_track_num(&self, track_num: Option<u32>) -> BurnResult {
        let result = self.update(|track: &mut DiscTrack| track.set_track_num(track_num));
        if result == BurnResult::NotSupported {
            return BurnResult::Ok;
        }
        result
    }

    /// The drive a disc track reads from
    pub fn source_drive(&self) -> Option<DriveRef> {
        self.with_backend(|track: &DiscTrack| track.drive().cloned())
            .flatten()
    }
}
