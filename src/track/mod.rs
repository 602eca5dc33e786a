//! Tracks: the units of source content a session burns
//!
//! A `Track` is a shared handle around a `TrackBackend` (the kind-specific
//! part: image file, data tree, another disc, audio stream, ...) plus what
//! every track has in common: a checksum, tags and a `changed` notifier.

mod data;
mod disc;
mod image;
mod spanning;
mod stream;

pub use data::{DataTrack, FsType, Graft};
pub use disc::DiscTrack;
pub use image::ImageTrack;
pub use spanning::{SizedGraft, SpanningDataTrack};
pub use stream::{duration_to_sectors, probe_duration, sectors_to_duration, StreamFormat, StreamTrack, AUDIO_BLOCK_SIZE};

use std::any::Any;
use std::cell::RefCell;
use std::ops::{Add, AddAssign};
use std::rc::Rc;

use crate::core::{BurnResult, HandlerId, ImageFormat, MediaKind, Notifier, Status, TagValue, Tags};

/// Shared handle to a track
pub type TrackRef = Rc<Track>;

/// Size of a track in blocks and bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackSize {
    pub blocks: u64,
    pub bytes: u64,
}

impl TrackSize {
    pub fn from_blocks(blocks: u64, block_size: u64) -> Self {
        Self {
            blocks,
            bytes: blocks * block_size,
        }
    }
}

impl Add for TrackSize {
    type Output = TrackSize;

    fn add(self, other: TrackSize) -> TrackSize {
        TrackSize {
            blocks: self.blocks + other.blocks,
            bytes: self.bytes + other.bytes,
        }
    }
}

impl AddAssign for TrackSize {
    fn add_assign(&mut self, other: TrackSize) {
        *self = *self + other;
    }
}

/// What a track carries, with its kind-specific subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackType {
    #[default]
    None,
    /// Files to be laid out as a filesystem
    Data { fs: FsType },
    /// Contents of a physical disc
    Disc { medium: MediaKind },
    /// Audio/video stream
    Stream { format: StreamFormat },
    /// Existing disc image file
    Image { format: ImageFormat },
}

impl TrackType {
    pub fn is_stream(&self) -> bool {
        matches!(self, TrackType::Stream { .. })
    }

    pub fn is_data(&self) -> bool {
        matches!(self, TrackType::Data { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self, TrackType::Image { .. })
    }

    pub fn is_disc(&self) -> bool {
        matches!(self, TrackType::Disc { .. })
    }
}

impl std::fmt::Display for TrackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackType::None => f.write_str("none"),
            TrackType::Data { fs } => write!(f, "data ({})", data::format_fs(*fs)),
            TrackType::Disc { medium } => write!(f, "disc ({})", crate::core::format_media(*medium)),
            TrackType::Stream { format } => write!(f, "stream ({})", stream::format_stream(*format)),
            TrackType::Image { format } => write!(f, "image ({})", format.display_text()),
        }
    }
}

/// Checksum algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChecksumKind {
    #[default]
    None,
    Detect,
    Md5,
    Md5File,
    Sha1,
    Sha1File,
    Sha256,
    Sha256File,
}

impl ChecksumKind {
    /// Kinds whose value is a digest of the track itself
    fn is_digest(self) -> bool {
        matches!(self, ChecksumKind::Md5 | ChecksumKind::Sha1 | ChecksumKind::Sha256)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Checksum {
    kind: ChecksumKind,
    value: Option<String>,
}

/// Kind-specific part of a track
pub trait TrackBackend: 'static {
    /// Size in blocks and bytes
    ///
    /// `NotReady` may come with a partial size; `Error` means the track is
    /// invalid. Kinds without size accounting report an empty track.
    fn size(&self) -> (BurnResult, TrackSize) {
        (BurnResult::Ok, TrackSize::default())
    }

    fn track_type(&self) -> TrackType;

    fn status(&self) -> Status {
        Status::completed()
    }

    /// Present for kinds that can split themselves across several media
    fn spanning(&self) -> Option<&dyn SpanningTrack> {
        None
    }

    fn spanning_mut(&mut self) -> Option<&mut dyn SpanningTrack> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A track able to produce, on request, a smaller track that fits a medium
pub trait SpanningTrack {
    /// `Retry` while some content has not been handed out yet, `Ok` otherwise
    fn span_again(&self) -> BurnResult;

    /// `Retry` if the next piece fits in `max_blocks`, `Error` if it cannot,
    /// `Ok` if nothing is left
    fn span_possible(&self, max_blocks: u64) -> BurnResult;

    /// Produce the next piece; `Err` carries `Ok` when nothing is left
    fn span(&mut self, max_blocks: u64) -> Result<TrackRef, BurnResult>;

    /// Largest indivisible piece left, in blocks
    fn span_max_space(&self) -> u64;

    /// Forget any spanning progress
    fn span_stop(&mut self);
}

/// Notification that a track's kind-specific state changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackChanged;

pub struct Track {
    backend: RefCell<Box<dyn TrackBackend>>,
    checksum: RefCell<Checksum>,
    tags: RefCell<Tags>,
    changed: Notifier<TrackChanged>,
}

impl Track {
    pub fn new(backend: impl TrackBackend) -> TrackRef {
        Self::from_boxed(Box::new(backend))
    }

    pub fn from_boxed(backend: Box<dyn TrackBackend>) -> TrackRef {
        Rc::new(Self {
            backend: RefCell::new(backend),
            checksum: RefCell::new(Checksum::default()),
            tags: RefCell::new(Tags::new()),
            changed: Notifier::new(),
        })
    }

    pub fn get_size(&self) -> (BurnResult, TrackSize) {
        self.backend.borrow().size()
    }

    pub fn get_type(&self) -> TrackType {
        self.backend.borrow().track_type()
    }

    pub fn get_status(&self) -> Status {
        self.backend.borrow().status()
    }

    pub fn is_stream(&self) -> bool {
        self.get_type().is_stream()
    }

    /// Run `f` against the backend if it is a `B`
    pub fn with_backend<B: TrackBackend, R>(&self, f: impl FnOnce(&B) -> R) -> Option<R> {
        let backend = self.backend.borrow();
        backend.as_any().downcast_ref::<B>().map(f)
    }

    /// Run a kind-specific mutator; `changed` fires once if it returns `Ok`
    ///
    /// Returns `Error` without calling `f` when the backend is not a `B`.
    pub fn update<B: TrackBackend>(&self, f: impl FnOnce(&mut B) -> BurnResult) -> BurnResult {
        let result = {
            let mut backend = self.backend.borrow_mut();
            if !backend.as_any().is::<B>() {
                log::warn!("Track mutator called on a {} track", backend.track_type());
                return BurnResult::Error;
            }
            match backend.as_any_mut().downcast_mut::<B>() {
                Some(backend) => f(backend),
                None => return BurnResult::Error,
            }
        };

        if result.is_ok() {
            self.changed.emit(&TrackChanged);
        }
        result
    }

    /// Emit `changed`, for backends mutated through other means
    pub fn notify_changed(&self) {
        self.changed.emit(&TrackChanged);
    }

    pub fn connect_changed(&self, handler: impl Fn(&TrackChanged) + 'static) -> HandlerId {
        self.changed.connect(handler)
    }

    pub fn disconnect_changed(&self, id: HandlerId) -> bool {
        self.changed.disconnect(id)
    }

    pub fn changed_listener_count(&self) -> usize {
        self.changed.handler_count()
    }

    /// Set the checksum
    ///
    /// A digest (md5/sha1/sha256) of the same kind can only be replaced by an
    /// identical value; a conflicting one is rejected with `Error`. Passing
    /// `None` clears the value.
    pub fn set_checksum(&self, kind: ChecksumKind, value: Option<&str>) -> BurnResult {
        let mut checksum = self.checksum.borrow_mut();

        if let (Some(new), Some(current)) = (value, checksum.value.as_deref()) {
            if kind == checksum.kind && kind.is_digest() && new != current {
                log::warn!("Conflicting {:?} checksum rejected", kind);
                return BurnResult::Error;
            }
        }

        checksum.kind = kind;
        checksum.value = value.map(str::to_string);
        BurnResult::Ok
    }

    pub fn get_checksum(&self) -> Option<String> {
        self.checksum.borrow().value.clone()
    }

    pub fn get_checksum_kind(&self) -> ChecksumKind {
        self.checksum.borrow().kind
    }

    pub fn tag_add(&self, tag: &str, value: TagValue) {
        self.tags.borrow_mut().insert(tag, value);
    }

    pub fn tag_add_int(&self, tag: &str, value: i64) {
        self.tag_add(tag, TagValue::Int(value));
    }

    pub fn tag_add_string(&self, tag: &str, value: &str) {
        self.tag_add(tag, TagValue::Str(value.to_string()));
    }

    pub fn tag_lookup(&self, tag: &str) -> Option<TagValue> {
        self.tags.borrow().get(tag).cloned()
    }

    pub fn tag_lookup_int(&self, tag: &str) -> Option<i64> {
        self.tags.borrow().get_int(tag)
    }

    pub fn tag_lookup_string(&self, tag: &str) -> Option<String> {
        self.tags.borrow().get_str(tag).map(str::to_string)
    }

    pub fn tag_remove(&self, tag: &str) -> Option<TagValue> {
        self.tags.borrow_mut().remove(tag)
    }

    /// Copy the tags of `source` this track does not have yet
    pub fn tag_copy_missing(&self, source: &Track) {
        if std::ptr::eq(self, source) {
            return;
        }
        let source_tags = source.tags.borrow();
        self.tags.borrow_mut().copy_missing(&source_tags);
    }

    pub fn is_spanning(&self) -> bool {
        self.backend.borrow().spanning().is_some()
    }

    pub fn span_again(&self) -> BurnResult {
        match self.backend.borrow().spanning() {
            Some(spanning) => spanning.span_again(),
            None => BurnResult::NotSupported,
        }
    }

    pub fn span_possible(&self, max_blocks: u64) -> BurnResult {
        match self.backend.borrow().spanning() {
            Some(spanning) => spanning.span_possible(max_blocks),
            None => BurnResult::NotSupported,
        }
    }

    pub fn span(&self, max_blocks: u64) -> Result<TrackRef, BurnResult> {
        match self.backend.borrow_mut().spanning_mut() {
            Some(spanning) => spanning.span(max_blocks),
            None => Err(BurnResult::NotSupported),
        }
    }

    pub fn span_max_space(&self) -> u64 {
        self.backend
            .borrow()
            .spanning()
            .map(|spanning| spanning.span_max_space())
            .unwrap_or(0)
    }

    pub fn span_stop(&self) {
        if let Some(spanning) = self.backend.borrow_mut().spanning_mut() {
            spanning.span_stop();
        }
    }
}

impl std::fmt::Debug for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Track")
            .field("type", &self.get_type())
            .field("checksum", &*self.checksum.borrow())
            .field("listeners", &self.changed.handler_count())
            .finish()
    }
}

/// Position of `track` (by identity) in `tracks`
pub fn position_of(tracks: &[TrackRef], track: &TrackRef) -> Option<usize> {
    tracks.iter().position(|candidate| Rc::ptr_eq(candidate, track))
}
