//! Shared value types
//!
//! This module contains:
//! - The result vocabulary and readiness status
//! - Burn flags, medium kinds and image formats (with printers)
//! - Observer lists and tag maps used by tracks and sessions
//! - Session defaults persisted on disk

mod config;
mod error;
mod flags;
mod image_format;
mod media;
mod notify;
mod status;
mod tags;

pub use config::SessionDefaults;
pub use error::SessionError;
pub use flags::{format_flags, parse_flag, BurnFlags};
pub use image_format::{default_image_suffix, get_complement, get_toc_path, ImageFormat};
pub use media::{format_media, MediaKind, Medium, CD_80_BLOCKS, DATA_BLOCK_SIZE, FILE_MEDIUM_BLOCKS};
pub use notify::{HandlerId, Notifier};
pub use status::{BurnResult, Status};
pub use tags::{TagValue, Tags, TAG_ARTIST, TAG_ISRC, TAG_STREAM_PREGAP, TAG_TITLE};
