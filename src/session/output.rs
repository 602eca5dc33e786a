//! Where a session writes: the burner, its medium, or an image file

use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::{BurnSession, SessionEvent};
use crate::burning::{same_drive, DriveEvent, DriveRef};
use crate::core::{get_complement, BurnFlags, ImageFormat, MediaKind, Medium, SessionError};

impl BurnSession {
    pub(super) fn connect_burner(&mut self) {
        let Some(burner) = &self.settings.burner else {
            return;
        };

        let events = Rc::downgrade(&self.events);
        let handler = burner.connect(move |event| {
            let Some(events) = events.upgrade() else {
                return;
            };
            let former = match event {
                DriveEvent::MediumAdded(_) => None,
                DriveEvent::MediumRemoved(medium) => Some(medium.clone()),
            };
            events.emit(&SessionEvent::OutputChanged { former });
        });
        self.burner_handler = Some(handler);
    }

    pub(super) fn disconnect_burner(&mut self) {
        if let Some(handler) = self.burner_handler.take() {
            if let Some(burner) = &self.settings.burner {
                burner.disconnect(handler);
            }
        }
    }

    /// Medium in the burner, if any
    pub(super) fn get_dest_medium_ref(&self) -> Option<Rc<Medium>> {
        self.settings.burner.as_ref().and_then(|burner| burner.medium())
    }

    /// Replace the burner; setting the same drive again does nothing
    pub fn set_burner(&mut self, burner: Option<DriveRef>) {
        if same_drive(self.settings.burner.as_ref(), burner.as_ref()) {
            return;
        }

        let former = self.get_dest_medium_ref();
        self.disconnect_burner();
        self.settings.burner = burner;
        self.connect_burner();

        log::debug!(
            "Burner set to {}",
            self.settings
                .burner
                .as_ref()
                .map(|burner| burner.name())
                .unwrap_or("none")
        );
        self.emit(SessionEvent::OutputChanged { former });
    }

    pub fn get_burner(&self) -> Option<&DriveRef> {
        self.settings.burner.as_ref()
    }

    /// Whether the session writes an image file rather than a disc
    pub fn is_dest_file(&self) -> bool {
        self.settings
            .burner
            .as_ref()
            .is_some_and(|burner| burner.is_fake())
    }

    /// Kind of medium in the burner, empty without one
    pub fn get_dest_media(&self) -> MediaKind {
        self.settings
            .burner
            .as_ref()
            .map(|burner| burner.media_kind())
            .unwrap_or_default()
    }

    /// Drive a disc-copy session reads from
    pub fn get_src_drive(&self) -> Option<DriveRef> {
        self.tracks.first().and_then(|live| live.track.source_drive())
    }

    pub fn get_src_medium(&self) -> Option<Rc<Medium>> {
        self.get_src_drive().and_then(|drive| drive.medium())
    }

    /// Whether the disc is copied in place, with a single drive
    pub fn same_src_dest_drive(&self) -> bool {
        let source = self.get_src_drive();
        source.is_some() && same_drive(source.as_ref(), self.settings.burner.as_ref())
    }

    /// Blocks the next burn may fill
    ///
    /// Merging or appending writes after the existing sessions; otherwise a
    /// medium that can be blanked is counted at its full capacity.
    pub fn get_available_medium_space(&self) -> u64 {
        let Some(medium) = self.get_dest_medium_ref() else {
            return 0;
        };

        if self
            .settings
            .flags
            .intersects(BurnFlags::MERGE | BurnFlags::APPEND)
        {
            return medium.free_space();
        }
        if medium.can_blank() {
            return medium.capacity();
        }
        medium.free_space()
    }

    /// Write to an image file instead of a disc
    ///
    /// Switches the burner to the file drive. `OutputChanged` is only emitted
    /// when the burner or the image settings actually change.
    pub fn set_output_image(
        &mut self,
        format: ImageFormat,
        image: Option<PathBuf>,
        toc: Option<PathBuf>,
    ) {
        let writing_to_file = self.is_dest_file();

        if self.settings.format == format && self.settings.image == image && self.settings.toc == toc {
            if !writing_to_file {
                self.set_burner(Some(self.file_drive.clone()));
            }
            return;
        }

        let former = self.get_dest_medium_ref();
        self.settings.format = format;
        self.settings.image = image;
        self.settings.toc = toc;

        if writing_to_file {
            self.emit(SessionEvent::OutputChanged { former });
        } else {
            self.set_burner(Some(self.file_drive.clone()));
        }
    }

    /// Image and toc paths of a session writing to a file
    ///
    /// Without an image path, the image is derived from the toc path.
    pub fn get_output(&self) -> Result<(PathBuf, Option<PathBuf>), SessionError> {
        if !self.is_dest_file() {
            return Err(SessionError::NotFileOutput);
        }

        let image = match (&self.settings.image, &self.settings.toc) {
            (Some(image), _) => image.clone(),
            (None, Some(toc)) => {
                get_complement(self.settings.format, toc).ok_or(SessionError::NoOutput)?
            }
            (None, None) => return Err(SessionError::NoOutput),
        };

        Ok((image, self.settings.toc.clone()))
    }

    pub fn get_output_format(&self) -> ImageFormat {
        self.settings.format
    }

    pub fn get_image_path(&self) -> Option<&Path> {
        self.settings.image.as_deref()
    }

    pub fn get_toc_path(&self) -> Option<&Path> {
        self.settings.toc.as_deref()
    }

    /// Write rate in bytes per second; 0 selects the medium's maximum
    pub fn set_rate(&mut self, rate: u64) {
        self.settings.rate = rate;
    }

    pub fn get_rate(&self) -> u64 {
        if self.settings.rate > 0 {
            return self.settings.rate;
        }
        self.get_dest_medium_ref()
            .map(|medium| medium.max_write_rate)
            .unwrap_or(0)
    }

    pub fn set_num_copies(&mut self, copies: u32) {
        self.settings.num_copies = copies.max(1);
    }

    pub fn get_num_copies(&self) -> u32 {
        self.settings.num_copies
    }
}
