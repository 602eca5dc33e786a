//! Burn session management
//!
//! Tracks to burn, the destination drive and its settings, and the
//! spanning of oversized sessions over several discs. Writing to the
//! hardware is left to the burning engine consuming a session.

pub mod burning;
pub mod core;
pub mod logging;
pub mod profiles;
pub mod session;
pub mod track;

#[cfg(test)]
mod test_fixtures;

pub use crate::burning::{Drive, DriveEvent, DriveRef};
pub use crate::core::{BurnFlags, BurnResult, ImageFormat, MediaKind, Medium, SessionDefaults, SessionError, Status};
pub use crate::session::{BurnSession, SessionEvent, SessionSpan};
pub use crate::track::{Track, TrackBackend, TrackRef, TrackSize, TrackType};
