// Profiles module - saved session configurations

pub mod builder;
pub mod storage;
pub mod types;

pub use builder::{build_session, build_track};
pub use storage::{load_profile, save_profile};
pub use types::{OutputSpec, SessionProfile, TrackSpec};
