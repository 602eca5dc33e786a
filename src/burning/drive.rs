//! Drives: a physical burner or the fake drive that writes image files
//!
//! Device enumeration lives elsewhere; a `Drive` here is the state the session
//! needs to see (current medium, probing flag) plus medium change events.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::core::{HandlerId, MediaKind, Medium, Notifier};

/// Shared handle to a drive
pub type DriveRef = Rc<Drive>;

/// Medium changes reported by a drive
#[derive(Debug, Clone)]
pub enum DriveEvent {
    MediumAdded(Rc<Medium>),
    MediumRemoved(Rc<Medium>),
}

#[derive(Debug)]
pub struct Drive {
    name: String,
    fake: bool,
    probing: Cell<bool>,
    medium: RefCell<Option<Rc<Medium>>>,
    events: Notifier<DriveEvent>,
}

impl Drive {
    /// A physical drive, initially empty
    pub fn new(name: impl Into<String>) -> DriveRef {
        Rc::new(Self {
            name: name.into(),
            fake: false,
            probing: Cell::new(false),
            medium: RefCell::new(None),
            events: Notifier::new(),
        })
    }

    /// A physical drive holding `medium`
    pub fn with_medium(name: impl Into<String>, medium: Medium) -> DriveRef {
        let drive = Self::new(name);
        *drive.medium.borrow_mut() = Some(Rc::new(medium));
        drive
    }

    /// The "write to file" pseudo-drive; it always holds the file medium
    pub fn file() -> DriveRef {
        Rc::new(Self {
            name: "File".to_string(),
            fake: true,
            probing: Cell::new(false),
            medium: RefCell::new(Some(Rc::new(Medium::file()))),
            events: Notifier::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_fake(&self) -> bool {
        self.fake
    }

    pub fn medium(&self) -> Option<Rc<Medium>> {
        self.medium.borrow().clone()
    }

    /// Kind of the current medium, empty when there is none
    pub fn media_kind(&self) -> MediaKind {
        self.medium
            .borrow()
            .as_ref()
            .map(|medium| medium.kind)
            .unwrap_or_default()
    }

    /// True while the drive is still identifying its medium
    pub fn probing(&self) -> bool {
        self.probing.get()
    }

    pub fn set_probing(&self, probing: bool) {
        self.probing.set(probing);
    }

    /// Insert a medium, replacing (and reporting the removal of) any current one
    pub fn insert_medium(&self, medium: Medium) -> Rc<Medium> {
        self.eject();

        let medium = Rc::new(medium);
        *self.medium.borrow_mut() = Some(medium.clone());
        log::debug!("{}: medium inserted", self.name);
        self.events.emit(&DriveEvent::MediumAdded(medium.clone()));
        medium
    }

    /// Remove the current medium; returns it if there was one
    pub fn eject(&self) -> Option<Rc<Medium>> {
        let removed = self.medium.borrow_mut().take();
        if let Some(medium) = &removed {
            log::debug!("{}: medium removed", self.name);
            self.events.emit(&DriveEvent::MediumRemoved(medium.clone()));
        }
        removed
    }

    pub fn connect(&self, handler: impl Fn(&DriveEvent) + 'static) -> HandlerId {
        self.events.connect(handler)
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.events.disconnect(id)
    }

    pub fn listener_count(&self) -> usize {
        self.events.handler_count()
    }
}

/// Whether two optional drive handles are the same drive object
pub fn same_drive(a: Option<&DriveRef>, b: Option<&DriveRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
