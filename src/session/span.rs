//! Spreading a session over several media
//!
//! `SessionSpan` walks the tracks captured by `start()` and, on each
//! `next()`, makes the longest run of remaining tracks that fits the medium
//! the session's only content. The full list is pushed aside with
//! `push_tracks()`; the caller burns the batch, calls `pop_tracks()` and asks
//! for the next batch until `next()` returns `Ok`.
//!
//! Tracks are never split, except by a track that implements
//! `SpanningTrack`: it is asked for a piece of the right size instead.

use super::BurnSession;
use crate::core::BurnResult;
use crate::track::{position_of, TrackRef};

#[derive(Debug)]
pub struct SessionSpan {
    session: BurnSession,
    /// Tracks captured by `start()`
    pending: Option<Vec<TrackRef>>,
    /// Last track of the last batch; always an element of `pending`
    cursor: Option<TrackRef>,
    /// Every captured track was handed out
    finished: bool,
}

/// Blocks of `track`, or the result that makes it unusable
fn track_blocks(track: &TrackRef) -> Result<u64, BurnResult> {
    match track.get_size() {
        (BurnResult::Ok | BurnResult::NotReady, size) => Ok(size.blocks),
        (result, _) => Err(result),
    }
}

impl SessionSpan {
    pub fn new(session: BurnSession) -> Self {
        Self {
            session,
            pending: None,
            cursor: None,
            finished: false,
        }
    }

    pub fn session(&self) -> &BurnSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut BurnSession {
        &mut self.session
    }

    pub fn into_session(self) -> BurnSession {
        self.session
    }

    pub fn pending(&self) -> Option<&[TrackRef]> {
        self.pending.as_deref()
    }

    pub fn cursor(&self) -> Option<&TrackRef> {
        self.cursor.as_ref()
    }

    /// Tracks of `tracks` after the cursor
    fn remaining<'a>(&self, tracks: &'a [TrackRef]) -> &'a [TrackRef] {
        let Some(cursor) = &self.cursor else {
            return tracks;
        };
        match position_of(tracks, cursor) {
            Some(index) => &tracks[index + 1..],
            None => &[],
        }
    }

    /// Capture the session tracks to span
    pub fn start(&mut self) -> BurnResult {
        self.cursor = None;
        self.finished = false;
        self.pending = Some(self.session.get_tracks());
        log::debug!("Spanning {} tracks", self.session.track_count());
        BurnResult::Ok
    }

    /// Make the next batch the session content
    ///
    /// `Retry` when a batch was produced, `Ok` when every track has been
    /// handed out, `Error` when nothing fits (or `start()` was not called).
    pub fn next(&mut self) -> BurnResult {
        if self.finished {
            return BurnResult::Ok;
        }
        let Some(pending) = self.pending.clone().filter(|pending| !pending.is_empty()) else {
            log::warn!("Spanning requested without tracks; call start() first");
            return BurnResult::Error;
        };

        let available = self.session.get_available_medium_space();
        if available == 0 {
            log::warn!("No space available on the medium for spanning");
            return BurnResult::Error;
        }

        let remaining = self.remaining(&pending);
        if self.cursor.is_some() && remaining.is_empty() {
            log::debug!("Spanning finished");
            self.cursor = None;
            self.pending = Some(Vec::new());
            self.finished = true;
            return BurnResult::Ok;
        }

        let mut total = 0;
        let mut pushed = false;
        for track in remaining {
            if track.is_spanning() {
                if pushed {
                    break;
                }
                return match track.span(available) {
                    Ok(piece) => {
                        self.session.push_tracks();
                        self.session.add_track(Some(piece), None);
                        BurnResult::Retry
                    }
                    Err(result) => result,
                };
            }

            let blocks = match track_blocks(track) {
                Ok(blocks) => blocks,
                Err(_) if pushed => break,
                Err(result) => {
                    log::warn!("Cannot span a track whose size is unknown ({})", result);
                    return result;
                }
            };
            if total + blocks >= available {
                break;
            }

            if !pushed {
                self.session.push_tracks();
                pushed = true;
            }
            total += blocks;
            self.session.add_track(Some(track.clone()), None);
            self.cursor = Some(track.clone());
        }

        if !pushed {
            log::warn!("Next track does not fit in {} blocks", available);
            return BurnResult::Error;
        }
        log::debug!("Spanning batch of {} blocks", total);
        BurnResult::Retry
    }

    /// Whether tracks are left to span, without spanning them
    pub fn again(&self) -> BurnResult {
        let Some(pending) = &self.pending else {
            return BurnResult::Ok;
        };
        match self.remaining(pending).first() {
            None => BurnResult::Ok,
            Some(track) if track.is_spanning() => track.span_again(),
            Some(_) => BurnResult::Retry,
        }
    }

    /// Whether the next track fits on the current medium
    ///
    /// Before `start()` the session's live tracks are checked.
    pub fn possible(&self) -> BurnResult {
        let available = self.session.get_available_medium_space();
        if available == 0 {
            return BurnResult::Error;
        }

        let live;
        let tracks = match &self.pending {
            Some(pending) => self.remaining(pending),
            None => {
                live = self.session.get_tracks();
                live.as_slice()
            }
        };

        let Some(track) = tracks.first() else {
            return BurnResult::Ok;
        };
        if track.is_spanning() {
            return track.span_possible(available);
        }

        match track_blocks(track) {
            Ok(blocks) if blocks >= available => {
                log::debug!("Track of {} blocks cannot fit in {} blocks", blocks, available);
                BurnResult::Error
            }
            Ok(_) => BurnResult::Retry,
            Err(result) => result,
        }
    }

    /// Blocks of the largest track still to burn
    pub fn get_max_space(&self) -> u64 {
        let live;
        let tracks = match &self.pending {
            Some(pending) => self.remaining(pending),
            None => {
                live = self.session.get_tracks();
                live.as_slice()
            }
        };

        tracks
            .iter()
            .filter_map(|track| {
                if track.is_spanning() {
                    Some(track.span_max_space())
                } else {
                    track_blocks(track).ok()
                }
            })
            .max()
            .unwrap_or(0)
    }

    /// Forget the spanning progress; the live session tracks are left alone
    pub fn stop(&mut self) {
        if self.cursor.take().is_none() {
            if let Some(head) = self.pending.as_ref().and_then(|pending| pending.first()) {
                if head.is_spanning() {
                    head.span_stop();
                }
            }
        }
        self.pending = None;
        self.finished = false;
    }
}
