//! Profile storage on disk

use super::types::SessionProfile;
use std::fs;
use std::path::Path;

/// Save a session profile to a file
pub fn save_profile(profile: &SessionProfile, path: &Path) -> Result<(), String> {
    let json = serde_json::to_string_pretty(profile)
        .map_err(|e| format!("Failed to serialize profile: {}", e))?;

    fs::write(path, json).map_err(|e| format!("Failed to write profile file: {}", e))?;

    log::debug!("Saved profile {:?} to {:?}", profile.profile_name, path);
    Ok(())
}

/// Load a session profile from a file
pub fn load_profile(path: &Path) -> Result<SessionProfile, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read profile file: {}", e))?;

    let profile: SessionProfile = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse profile file: {}", e))?;

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BurnFlags, ImageFormat};
    use crate::profiles::types::{OutputSpec, TrackSpec};
    use crate::track::{FsType, Graft};
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_profile() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("backup.json");

        let mut profile = SessionProfile::new("Backup".to_string());
        profile.label = Some("BACKUP_2024".to_string());
        profile.flags = BurnFlags::DAO | BurnFlags::EJECT;
        profile.output = Some(OutputSpec {
            format: ImageFormat::BIN,
            image: Some("/out/backup.iso".into()),
            toc: None,
        });
        profile.tracks.push(TrackSpec::Data {
            grafts: vec![Graft::new("/photos", "/home/user/photos")],
            excluded: Vec::new(),
            fs: FsType::ISO | FsType::JOLIET,
            spanning: true,
        });

        save_profile(&profile, &path).unwrap();
        let loaded = load_profile(&path).unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn test_load_hand_written_profile() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("audio.json");
        fs::write(
            &path,
            r#"{
                "version": "1.0",
                "profile_name": "Mix",
                "created": "2024-01-01T00:00:00+00:00",
                "modified": "2024-01-01T00:00:00+00:00",
                "tracks": [
                    {"kind": "stream", "source": "/music/a.flac", "end": 1000000000},
                    {"kind": "image", "image": "/img/disc.bin", "format": "CUE", "blocks": 10}
                ]
            }"#,
        )
        .unwrap();

        let profile = load_profile(&path).unwrap();
        assert_eq!(profile.flags, BurnFlags::empty());
        assert!(profile.output.is_none());
        assert_eq!(profile.tracks.len(), 2);
        assert!(matches!(
            &profile.tracks[0],
            TrackSpec::Stream { start: 0, end: 1_000_000_000, gap: 0, title: None, .. }
        ));
        assert!(matches!(
            &profile.tracks[1],
            TrackSpec::Image { format, blocks: 10, .. } if *format == ImageFormat::CUE
        ));
    }

    #[test]
    fn test_load_missing_profile() {
        let err = load_profile(Path::new("/nonexistent/profile.json")).unwrap_err();
        assert!(err.starts_with("Failed to read profile file"));
    }
}
