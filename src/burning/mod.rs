//! Burning destinations
//!
//! Low-level writing is out of scope; this module only models the drives a
//! session can target and the medium they hold.

pub mod drive;

pub use drive::{same_drive, Drive, DriveEvent, DriveRef};
