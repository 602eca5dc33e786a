//! Turn a saved profile into a live session

use super::types::{SessionProfile, TrackSpec};
use crate::core::{BurnResult, SessionDefaults, TAG_TITLE};
use crate::session::BurnSession;
use crate::track::{DataTrack, ImageTrack, SpanningDataTrack, StreamFormat, StreamTrack, Track, TrackRef};

/// Create the track described by `spec`
///
/// Streams without an end are probed; a failed probe leaves the track not
/// ready rather than failing the whole profile.
pub fn build_track(spec: &TrackSpec) -> Result<TrackRef, String> {
    let track = match spec {
        TrackSpec::Image {
            image,
            toc,
            format,
            blocks,
        } => {
            let mut backend = ImageTrack::new(image, *format).with_block_count(*blocks);
            if let Some(toc) = toc {
                backend = backend.with_toc(toc);
            }
            Track::new(backend)
        }
        TrackSpec::Data {
            grafts,
            excluded,
            fs,
            spanning,
        } => {
            if grafts.is_empty() {
                return Err("Data track without grafts".to_string());
            }
            if *spanning {
                Track::new(SpanningDataTrack::from_grafts(grafts.clone(), *fs))
            } else {
                let mut backend = DataTrack::new(*fs);
                backend.set_source(grafts.clone(), excluded.clone());
                Track::new(backend)
            }
        }
        TrackSpec::Stream {
            source,
            start,
            end,
            gap,
            title,
        } => {
            let backend = StreamTrack::new(source, StreamFormat::AUDIO_UNDEFINED)
                .with_boundaries(*start, *end, *gap);
            let track = Track::new(backend);
            if *end == 0 && track.probe_stream_length() != BurnResult::Ok {
                log::warn!("Could not read the length of {}", source.display());
            }
            if let Some(title) = title {
                track.tag_add_string(TAG_TITLE, title);
            }
            track
        }
    };
    Ok(track)
}

/// Build a session from a profile, on top of the persisted defaults
pub fn build_session(profile: &SessionProfile, defaults: &SessionDefaults) -> Result<BurnSession, String> {
    let mut session = BurnSession::with_defaults(defaults);

    let mut previous: Option<TrackRef> = None;
    for spec in &profile.tracks {
        let track = build_track(spec)?;
        session.add_track(Some(track.clone()), previous.as_ref());
        previous = Some(track);
    }

    if profile.tracks.len() != session.track_count() {
        log::warn!(
            "Profile {} mixes track kinds; only {} of {} tracks kept",
            profile.profile_name,
            session.track_count(),
            profile.tracks.len()
        );
    }

    session.add_flag(profile.flags);
    session.set_label(profile.label.as_deref());
    if let Some(output) = &profile.output {
        session.set_output_image(output.format, output.image.clone(), output.toc.clone());
    }

    log::info!(
        "Built session from profile {} with {} tracks",
        profile.profile_name,
        session.track_count()
    );
    Ok(session)
}
