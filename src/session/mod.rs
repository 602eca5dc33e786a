//! Burn sessions
//!
//! A `BurnSession` holds everything one burn needs:
//! - An ordered list of tracks (one kind only, except audio streams which may
//!   be mixed freely)
//! - The output settings: burner, image paths and format, label, rate, flags
//! - Save points for the settings and the track list (push/pop)
//! - Session tags, scratch files and the per-session log
//!
//! Every structural change is reported to listeners registered with
//! `connect()`, synchronously, from within the call that made the change.

mod output;
mod span;
mod tmp;

pub use span::SessionSpan;

use std::fs::File;
use std::path::PathBuf;
use std::rc::Rc;

use crate::burning::{Drive, DriveRef};
use crate::core::{
    BurnFlags, BurnResult, HandlerId, ImageFormat, Medium, Notifier, SessionDefaults, Status,
    TagValue, Tags,
};
use crate::track::{StreamFormat, TrackRef, TrackSize, TrackType};

/// Labels longer than this many characters are truncated
pub const MAX_LABEL_CHARS: usize = 32;

/// Notifications emitted by a session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    TrackAdded(TrackRef),
    TrackRemoved { track: TrackRef, former_index: usize },
    /// A track in the live list changed its kind-specific state
    TrackChanged(TrackRef),
    /// Burner or output settings changed; carries the medium in use before
    OutputChanged { former: Option<Rc<Medium>> },
    TagChanged(String),
}

/// The block saved by `push_settings`
#[derive(Debug, Clone, Default)]
struct SessionSettings {
    burner: Option<DriveRef>,
    image: Option<PathBuf>,
    toc: Option<PathBuf>,
    format: ImageFormat,
    label: Option<String>,
    /// Bytes per second, 0 for the medium's maximum
    rate: u64,
    num_copies: u32,
    flags: BurnFlags,
}

/// A track of the live list and its `changed` listener
struct LiveTrack {
    track: TrackRef,
    handler: HandlerId,
}

pub struct BurnSession {
    events: Rc<Notifier<SessionEvent>>,

    tracks: Vec<LiveTrack>,
    tracks_stack: Vec<Vec<TrackRef>>,

    settings: SessionSettings,
    settings_stack: Vec<SessionSettings>,
    burner_handler: Option<HandlerId>,
    /// The "write to file" drive used by `set_output_image`
    file_drive: DriveRef,

    strict_support: bool,
    tags: Tags,

    tmpdir: Option<PathBuf>,
    tmp_paths: Vec<PathBuf>,
    log_path: Option<PathBuf>,
    session_log: Option<File>,
}

impl BurnSession {
    pub fn new() -> Self {
        Self {
            events: Rc::new(Notifier::new()),
            tracks: Vec::new(),
            tracks_stack: Vec::new(),
            settings: SessionSettings {
                num_copies: 1,
                ..SessionSettings::default()
            },
            settings_stack: Vec::new(),
            burner_handler: None,
            file_drive: Drive::file(),
            strict_support: true,
            tags: Tags::new(),
            tmpdir: None,
            tmp_paths: Vec::new(),
            log_path: None,
            session_log: None,
        }
    }

    /// A new session with persisted defaults applied
    pub fn with_defaults(defaults: &SessionDefaults) -> Self {
        let mut session = Self::new();
        session.settings.flags = defaults.flags;
        session.settings.num_copies = defaults.num_copies.max(1);
        session.strict_support = defaults.strict_checks;
        if let Err(e) = session.set_tmpdir(defaults.tmpdir.clone()) {
            log::warn!("Ignoring default temporary directory: {}", e);
        }
        session
    }

    pub fn connect(&self, handler: impl Fn(&SessionEvent) + 'static) -> HandlerId {
        self.events.connect(handler)
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.events.disconnect(id)
    }

    fn emit(&self, event: SessionEvent) {
        self.events.emit(&event);
    }

    // Track list

    pub fn get_tracks(&self) -> Vec<TrackRef> {
        self.tracks.iter().map(|live| live.track.clone()).collect()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn position(&self, track: &TrackRef) -> Option<usize> {
        self.tracks
            .iter()
            .position(|live| Rc::ptr_eq(&live.track, track))
    }

    /// Forward the track's `changed` notifications as `TrackChanged`
    fn monitor(&self, track: &TrackRef) -> HandlerId {
        let events = Rc::downgrade(&self.events);
        let weak_track = Rc::downgrade(track);
        track.connect_changed(move |_| {
            if let (Some(events), Some(track)) = (events.upgrade(), weak_track.upgrade()) {
                events.emit(&SessionEvent::TrackChanged(track));
            }
        })
    }

    fn insert_monitored(&mut self, index: usize, track: TrackRef) {
        let handler = self.monitor(&track);
        self.tracks.insert(
            index,
            LiveTrack {
                track: track.clone(),
                handler,
            },
        );
        self.emit(SessionEvent::TrackAdded(track));
    }

    fn remove_at(&mut self, index: usize) -> TrackRef {
        let live = self.tracks.remove(index);
        live.track.disconnect_changed(live.handler);
        self.emit(SessionEvent::TrackRemoved {
            track: live.track.clone(),
            former_index: index,
        });
        live.track
    }

    fn clear_tracks(&mut self) {
        while !self.tracks.is_empty() {
            self.remove_at(0);
        }
    }

    /// Add a track after `sibling` (or at the end)
    ///
    /// `None` clears the list. Only stream tracks can share the list; any
    /// other combination replaces the whole list. Adding a track already in
    /// the list does nothing.
    pub fn add_track(&mut self, new_track: Option<TrackRef>, sibling: Option<&TrackRef>) -> BurnResult {
        let Some(new_track) = new_track else {
            self.clear_tracks();
            return BurnResult::Ok;
        };

        if self.position(&new_track).is_some() {
            return BurnResult::Ok;
        }

        if let Some(head) = self.tracks.first() {
            if !new_track.is_stream() || !head.track.is_stream() {
                log::debug!("Replacing {} tracks with a {} track", self.tracks.len(), new_track.get_type());
                self.clear_tracks();
            }
        }

        let index = sibling
            .and_then(|sibling| self.position(sibling))
            .map(|index| index + 1)
            .unwrap_or(self.tracks.len());
        self.insert_monitored(index, new_track);
        BurnResult::Ok
    }

    /// Move a track of the list after `sibling` (or to the end)
    pub fn move_track(&mut self, track: &TrackRef, sibling: Option<&TrackRef>) -> BurnResult {
        let Some(index) = self.position(track) else {
            return BurnResult::Error;
        };
        let track = self.remove_at(index);

        let index = sibling
            .filter(|sibling| !Rc::ptr_eq(sibling, &track))
            .and_then(|sibling| self.position(sibling))
            .map(|index| index + 1)
            .unwrap_or(self.tracks.len());
        self.insert_monitored(index, track);
        BurnResult::Ok
    }

    pub fn remove_track(&mut self, track: &TrackRef) -> BurnResult {
        match self.position(track) {
            Some(index) => {
                self.remove_at(index);
                BurnResult::Ok
            }
            None => BurnResult::Error,
        }
    }

    /// Total size of the tracks
    ///
    /// Tracks still computing their size contribute what they know so far;
    /// invalid tracks are skipped.
    pub fn get_size(&self) -> TrackSize {
        let mut total = TrackSize::default();
        for live in &self.tracks {
            let (result, size) = live.track.get_size();
            match result {
                BurnResult::Ok | BurnResult::NotReady => total += size,
                other => log::debug!("Skipping {} track in size: {}", live.track.get_type(), other),
            }
        }
        total
    }

    /// Aggregate readiness of the burner and the tracks
    pub fn get_status(&self) -> Status {
        if self.settings.burner.as_ref().is_some_and(|burner| burner.probing()) {
            return Status::not_ready(None, None);
        }

        let mut not_ready = 0;
        let mut reported = 0;
        let mut progress = 0.0;
        for live in &self.tracks {
            let status = live.track.get_status();
            match status.result {
                BurnResult::Ok => {}
                BurnResult::NotReady | BurnResult::Running => not_ready += 1,
                _ => return status,
            }
            if let Some(fraction) = status.progress {
                reported += 1;
                progress += fraction;
            }
        }

        if not_ready == 0 {
            return Status::completed();
        }
        let progress = (reported > 0).then(|| progress / reported as f64);
        Status::not_ready(progress, None)
    }

    /// Type of the session input
    ///
    /// For audio sessions the stream formats of all tracks are merged.
    pub fn get_input_type(&self) -> TrackType {
        let Some(first) = self.tracks.first() else {
            return TrackType::None;
        };

        let mut merged = StreamFormat::empty();
        for live in &self.tracks {
            match live.track.get_type() {
                TrackType::Stream { format } => merged |= format,
                _ => return first.track.get_type(),
            }
        }
        TrackType::Stream { format: merged }
    }

    // Flags

    pub fn get_flags(&self) -> BurnFlags {
        self.settings.flags
    }

    pub fn set_flags(&mut self, flags: BurnFlags) {
        if self.settings.flags == flags {
            return;
        }
        log::debug!("Session flags set to {}", crate::core::format_flags(flags));
        self.settings.flags = flags;
    }

    pub fn add_flag(&mut self, flags: BurnFlags) {
        self.set_flags(self.settings.flags | flags);
    }

    pub fn remove_flag(&mut self, flags: BurnFlags) {
        self.set_flags(self.settings.flags - flags);
    }

    pub fn get_strict_support(&self) -> bool {
        self.strict_support
    }

    pub fn set_strict_support(&mut self, strict: bool) {
        self.strict_support = strict;
    }

    // Label

    /// Set the disc label, keeping at most `MAX_LABEL_CHARS` characters
    pub fn set_label(&mut self, label: Option<&str>) {
        self.settings.label = label.map(|label| {
            if label.chars().count() > MAX_LABEL_CHARS {
                log::warn!("Label truncated to {} characters", MAX_LABEL_CHARS);
            }
            label.chars().take(MAX_LABEL_CHARS).collect()
        });
    }

    pub fn get_label(&self) -> Option<&str> {
        self.settings.label.as_deref()
    }

    // Save points

    /// Save the current settings; nothing changes and nothing is emitted
    pub fn push_settings(&mut self) {
        self.settings_stack.push(self.settings.clone());
    }

    /// Restore the settings saved last
    pub fn pop_settings(&mut self) {
        let Some(saved) = self.settings_stack.pop() else {
            return;
        };

        let former = self.get_dest_medium_ref();
        self.disconnect_burner();
        self.settings = saved;
        self.connect_burner();
        self.emit(SessionEvent::OutputChanged { former });
    }

    /// Move the live tracks aside, leaving the session empty
    pub fn push_tracks(&mut self) {
        let mut saved = Vec::with_capacity(self.tracks.len());
        for live in std::mem::take(&mut self.tracks) {
            live.track.disconnect_changed(live.handler);
            self.emit(SessionEvent::TrackRemoved {
                track: live.track.clone(),
                former_index: 0,
            });
            saved.push(live.track);
        }
        self.tracks_stack.push(saved);
    }

    /// Bring back the tracks saved last
    ///
    /// `Ok` when there was nothing to restore, `Retry` once tracks were restored.
    pub fn pop_tracks(&mut self) -> BurnResult {
        let Some(saved) = self.tracks_stack.pop() else {
            return BurnResult::Ok;
        };

        self.clear_tracks();
        for track in saved {
            let index = self.tracks.len();
            self.insert_monitored(index, track);
        }
        BurnResult::Retry
    }

    // Tags

    pub fn tag_add(&mut self, tag: &str, value: TagValue) {
        self.tags.insert(tag, value);
        self.emit(SessionEvent::TagChanged(tag.to_string()));
    }

    pub fn tag_add_int(&mut self, tag: &str, value: i64) {
        self.tag_add(tag, TagValue::Int(value));
    }

    pub fn tag_add_string(&mut self, tag: &str, value: &str) {
        self.tag_add(tag, TagValue::Str(value.to_string()));
    }

    pub fn tag_lookup(&self, tag: &str) -> Option<&TagValue> {
        self.tags.get(tag)
    }

    pub fn tag_lookup_int(&self, tag: &str) -> Option<i64> {
        self.tags.get_int(tag)
    }

    pub fn tag_remove(&mut self, tag: &str) -> Option<TagValue> {
        let removed = self.tags.remove(tag);
        self.emit(SessionEvent::TagChanged(tag.to_string()));
        removed
    }
}

impl Default for BurnSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BurnSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BurnSession")
            .field("tracks", &self.tracks.len())
            .field("settings", &self.settings)
            .field("pushed_tracks", &self.tracks_stack.len())
            .field("pushed_settings", &self.settings_stack.len())
            .field("tmp_paths", &self.tmp_paths)
            .finish()
    }
}

impl Drop for BurnSession {
    fn drop(&mut self) {
        for live in self.tracks.drain(..) {
            live.track.disconnect_changed(live.handler);
        }
        self.tracks_stack.clear();
        self.disconnect_burner();
        self.settings_stack.clear();
        self.session_stop();
        self.remove_tmp_paths();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MediaKind, Medium};
    use crate::test_fixtures::{record_events, FixedTrack};
    use crate::track::Track;

    fn streams(sizes: &[u64]) -> Vec<TrackRef> {
        sizes
            .iter()
            .map(|blocks| FixedTrack::stream(*blocks).into_track())
            .collect()
    }

    fn session_with(tracks: &[TrackRef]) -> BurnSession {
        let mut session = BurnSession::new();
        for track in tracks {
            session.add_track(Some(track.clone()), None);
        }
        session
    }

    #[test]
    fn test_add_null_clears_with_notifications() {
        let tracks = streams(&[1, 2, 3]);
        let mut session = session_with(&tracks);
        let events = record_events(&session);

        assert_eq!(session.add_track(None, None), BurnResult::Ok);
        assert_eq!(session.track_count(), 0);

        let removed: Vec<_> = events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                SessionEvent::TrackRemoved { track, .. } => Some(track.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(removed.len(), 3);
        assert!(removed.iter().zip(&tracks).all(|(a, b)| Rc::ptr_eq(a, b)));

        // Already empty: nothing to report
        events.borrow_mut().clear();
        assert_eq!(session.add_track(None, None), BurnResult::Ok);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_add_same_track_twice_is_idempotent() {
        let track = FixedTrack::stream(10).into_track();
        let mut session = BurnSession::new();
        let events = record_events(&session);

        assert_eq!(session.add_track(Some(track.clone()), None), BurnResult::Ok);
        assert_eq!(session.add_track(Some(track.clone()), None), BurnResult::Ok);

        assert_eq!(session.track_count(), 1);
        assert_eq!(events.borrow().len(), 1);
        assert_eq!(track.changed_listener_count(), 1);
    }

    #[test]
    fn test_data_track_replaces_streams() {
        let tracks = streams(&[1, 2]);
        let mut session = session_with(&tracks);
        let events = record_events(&session);

        let data = FixedTrack::data(5).into_track();
        assert_eq!(session.add_track(Some(data.clone()), None), BurnResult::Ok);

        let events = events.borrow();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], SessionEvent::TrackRemoved { track, .. } if Rc::ptr_eq(track, &tracks[0])));
        assert!(matches!(&events[1], SessionEvent::TrackRemoved { track, .. } if Rc::ptr_eq(track, &tracks[1])));
        assert!(matches!(&events[2], SessionEvent::TrackAdded(track) if Rc::ptr_eq(track, &data)));
        assert_eq!(session.track_count(), 1);

        // Removed tracks are no longer monitored
        assert_eq!(tracks[0].changed_listener_count(), 0);
    }

    #[test]
    fn test_stream_after_data_replaces_data() {
        let data = FixedTrack::data(5).into_track();
        let mut session = session_with(&[data.clone()]);
        let stream = FixedTrack::stream(5).into_track();

        session.add_track(Some(stream.clone()), None);
        let tracks = session.get_tracks();
        assert_eq!(tracks.len(), 1);
        assert!(Rc::ptr_eq(&tracks[0], &stream));
    }

    #[test]
    fn test_insert_after_sibling() {
        let tracks = streams(&[1, 2]);
        let mut session = session_with(&tracks);
        let middle = FixedTrack::stream(3).into_track();

        session.add_track(Some(middle.clone()), Some(&tracks[0]));
        let order = session.get_tracks();
        assert!(Rc::ptr_eq(&order[1], &middle));
        assert!(Rc::ptr_eq(&order[2], &tracks[1]));

        // Unknown sibling appends
        let stranger = FixedTrack::stream(1).into_track();
        let last = FixedTrack::stream(4).into_track();
        session.add_track(Some(last.clone()), Some(&stranger));
        assert!(Rc::ptr_eq(&session.get_tracks()[3], &last));
    }

    #[test]
    fn test_move_track() {
        let tracks = streams(&[1, 2, 3]);
        let mut session = session_with(&tracks);
        let events = record_events(&session);

        assert_eq!(session.move_track(&tracks[2], None), BurnResult::Ok);
        assert_eq!(session.move_track(&tracks[0], Some(&tracks[2])), BurnResult::Ok);
        let order = session.get_tracks();
        assert!(Rc::ptr_eq(&order[0], &tracks[1]));
        assert!(Rc::ptr_eq(&order[1], &tracks[2]));
        assert!(Rc::ptr_eq(&order[2], &tracks[0]));

        let events = events.borrow();
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], SessionEvent::TrackRemoved { former_index: 2, .. }));
        assert!(matches!(&events[1], SessionEvent::TrackAdded(_)));
        assert!(matches!(&events[2], SessionEvent::TrackRemoved { former_index: 0, .. }));

        let stranger = FixedTrack::stream(1).into_track();
        assert_eq!(session.move_track(&stranger, None), BurnResult::Error);
    }

    #[test]
    fn test_remove_track_reports_index() {
        let tracks = streams(&[1, 2, 3]);
        let mut session = session_with(&tracks);
        let events = record_events(&session);

        assert_eq!(session.remove_track(&tracks[1]), BurnResult::Ok);
        assert!(matches!(
            &events.borrow()[0],
            SessionEvent::TrackRemoved { track, former_index: 1 } if Rc::ptr_eq(track, &tracks[1])
        ));
        assert_eq!(tracks[1].changed_listener_count(), 0);
        assert_eq!(session.remove_track(&tracks[1]), BurnResult::Error);
    }

    #[test]
    fn test_track_changes_are_forwarded() {
        let track = FixedTrack::stream(10).into_track();
        let session = session_with(&[track.clone()]);
        let events = record_events(&session);

        track.update(|fixed: &mut FixedTrack| {
            fixed.blocks = 11;
            BurnResult::Ok
        });
        assert!(matches!(&events.borrow()[0], SessionEvent::TrackChanged(changed) if Rc::ptr_eq(changed, &track)));
    }

    #[test]
    fn test_get_size_sums_tracks() {
        let session = session_with(&streams(&[10, 20, 30]));
        assert_eq!(session.get_size(), TrackSize { blocks: 60, bytes: 122_880 });
    }

    #[test]
    fn test_get_size_skips_errors_keeps_not_ready() {
        let ok = FixedTrack::stream(10).into_track();
        let partial = FixedTrack::stream(5).with_result(BurnResult::NotReady).into_track();
        let broken = FixedTrack::stream(100).with_result(BurnResult::Error).into_track();
        let session = session_with(&[ok, partial, broken]);

        assert_eq!(session.get_size().blocks, 15);
    }

    #[test]
    fn test_get_status_aggregates() {
        let done = FixedTrack::stream(1).into_track();
        let half = FixedTrack::stream(1)
            .with_status(Status::not_ready(Some(0.5), None))
            .into_track();
        let session = session_with(&[done.clone(), half]);

        let status = session.get_status();
        assert_eq!(status.result, BurnResult::NotReady);
        // (1.0 + 0.5) / 2
        assert_eq!(status.progress, Some(0.75));

        let session = session_with(&[done]);
        assert_eq!(session.get_status(), Status::completed());
    }

    #[test]
    fn test_get_status_short_circuits_on_error() {
        let waiting = FixedTrack::stream(1).with_status(Status::not_ready(None, None)).into_track();
        let failed = FixedTrack::stream(1)
            .with_status(Status::error(Some("unreadable".to_string())))
            .into_track();
        let session = session_with(&[waiting, failed]);

        let status = session.get_status();
        assert_eq!(status.result, BurnResult::Error);
        assert_eq!(status.current_action.as_deref(), Some("unreadable"));
    }

    #[test]
    fn test_get_status_probing_burner() {
        let mut session = session_with(&streams(&[1]));
        let burner = Drive::new("burner");
        burner.set_probing(true);
        session.set_burner(Some(burner));
        assert_eq!(session.get_status().result, BurnResult::NotReady);
        assert_eq!(session.get_status().progress, None);
    }

    #[test]
    fn test_get_input_type() {
        assert_eq!(BurnSession::new().get_input_type(), TrackType::None);

        let first = FixedTrack::stream(1).with_stream_format(StreamFormat::AUDIO_UNDEFINED).into_track();
        let second = FixedTrack::stream(1).with_stream_format(StreamFormat::METADATA_INFO).into_track();
        let session = session_with(&[first, second]);
        assert_eq!(
            session.get_input_type(),
            TrackType::Stream {
                format: StreamFormat::AUDIO_UNDEFINED | StreamFormat::METADATA_INFO
            }
        );

        let session = session_with(&[FixedTrack::data(1).into_track()]);
        assert!(session.get_input_type().is_data());
    }

    #[test]
    fn test_flags() {
        let mut session = BurnSession::new();
        session.set_flags(BurnFlags::DAO | BurnFlags::RAW);
        assert_eq!(session.get_flags(), BurnFlags::DAO | BurnFlags::RAW);

        session.add_flag(BurnFlags::EJECT);
        session.remove_flag(BurnFlags::RAW);
        assert_eq!(session.get_flags(), BurnFlags::DAO | BurnFlags::EJECT);
    }

    #[test]
    fn test_label_truncated_by_characters() {
        let mut session = BurnSession::new();

        session.set_label(Some(&"A".repeat(40)));
        assert_eq!(session.get_label().unwrap().chars().count(), 32);

        session.set_label(Some(&"Ω".repeat(40)));
        let label = session.get_label().unwrap();
        assert_eq!(label.chars().count(), 32);
        assert_eq!(label.len(), 64);

        session.set_label(Some("Short"));
        assert_eq!(session.get_label(), Some("Short"));
        session.set_label(None);
        assert_eq!(session.get_label(), None);
    }

    #[test]
    fn test_push_pop_settings() {
        let mut session = BurnSession::new();
        let burner = Drive::with_medium("burner", Medium::blank(MediaKind::CD, 1000));
        session.set_burner(Some(burner.clone()));
        session.set_label(Some("Before"));
        session.set_flags(BurnFlags::DAO);

        let events = record_events(&session);
        session.push_settings();
        assert!(events.borrow().is_empty());

        session.set_label(Some("After"));
        session.set_flags(BurnFlags::MERGE);
        session.set_burner(None);
        assert_eq!(burner.listener_count(), 0);
        events.borrow_mut().clear();

        session.pop_settings();
        assert_eq!(session.get_label(), Some("Before"));
        assert_eq!(session.get_flags(), BurnFlags::DAO);
        assert!(Rc::ptr_eq(session.get_burner().unwrap(), &burner));
        assert_eq!(burner.listener_count(), 1);
        assert!(matches!(&events.borrow()[0], SessionEvent::OutputChanged { former: None }));

        // Nothing left to pop
        events.borrow_mut().clear();
        session.pop_settings();
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_push_pop_tracks() {
        let tracks = streams(&[1, 2]);
        let mut session = session_with(&tracks);
        let events = record_events(&session);

        session.push_tracks();
        assert_eq!(session.track_count(), 0);
        assert_eq!(tracks[0].changed_listener_count(), 0);
        assert_eq!(events.borrow().len(), 2);

        let temporary = FixedTrack::data(3).into_track();
        session.add_track(Some(temporary.clone()), None);

        events.borrow_mut().clear();
        assert_eq!(session.pop_tracks(), BurnResult::Retry);
        let restored = session.get_tracks();
        assert_eq!(restored.len(), 2);
        assert!(Rc::ptr_eq(&restored[0], &tracks[0]));
        assert_eq!(tracks[0].changed_listener_count(), 1);
        assert_eq!(temporary.changed_listener_count(), 0);

        let events = events.borrow();
        assert!(matches!(&events[0], SessionEvent::TrackRemoved { track, .. } if Rc::ptr_eq(track, &temporary)));
        assert_eq!(
            events.iter().filter(|event| matches!(event, SessionEvent::TrackAdded(_))).count(),
            2
        );
    }

    #[test]
    fn test_pop_tracks_empty_stack() {
        let tracks = streams(&[1, 2]);
        let mut session = session_with(&tracks);
        assert_eq!(session.pop_tracks(), BurnResult::Ok);
        assert_eq!(session.track_count(), 2);
    }

    #[test]
    fn test_session_tags_notify() {
        let mut session = BurnSession::new();
        let events = record_events(&session);

        session.tag_add_int("burn::copies", 2);
        session.tag_add_string("burn::title", "Backup");
        assert_eq!(session.tag_lookup_int("burn::copies"), Some(2));
        assert_eq!(session.tag_lookup("burn::title"), Some(&TagValue::from("Backup")));
        assert!(session.tag_remove("burn::copies").is_some());
        assert_eq!(session.tag_lookup_int("burn::copies"), None);

        let changed: Vec<_> = events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                SessionEvent::TagChanged(tag) => Some(tag.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(changed, vec!["burn::copies", "burn::title", "burn::copies"]);
    }

    #[test]
    fn test_with_defaults() {
        let defaults = SessionDefaults {
            tmpdir: Some(PathBuf::from("/var/tmp")),
            flags: BurnFlags::EJECT | BurnFlags::BURNPROOF,
            strict_checks: false,
            num_copies: 3,
        };
        let session = BurnSession::with_defaults(&defaults);
        assert_eq!(session.get_flags(), BurnFlags::EJECT | BurnFlags::BURNPROOF);
        assert!(!session.get_strict_support());
        assert_eq!(session.get_num_copies(), 3);
        assert_eq!(session.get_tmpdir(), Some(std::path::Path::new("/var/tmp")));

        let relative = SessionDefaults {
            tmpdir: Some(PathBuf::from("scratch")),
            ..SessionDefaults::default()
        };
        assert_eq!(BurnSession::with_defaults(&relative).get_tmpdir(), None);
    }

    #[test]
    fn test_drop_detaches_track_listeners() {
        let track: TrackRef = Track::new(FixedTrack::stream(1));
        {
            let _session = session_with(&[track.clone()]);
            assert_eq!(track.changed_listener_count(), 1);
        }
        assert_eq!(track.changed_listener_count(), 0);
    }
}
