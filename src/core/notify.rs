//! Synchronous observer lists
//!
//! Listeners run inside the call that emitted the event. A listener may
//! connect or disconnect other listeners while it runs; the change takes
//! effect from the next emission.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle returned by `Notifier::connect`, used to disconnect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler<E> = Rc<dyn Fn(&E)>;

/// List of callbacks for one kind of event
pub struct Notifier<E> {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(HandlerId, Handler<E>)>>,
}

impl<E> Notifier<E> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            handlers: RefCell::new(Vec::new()),
        }
    }

    pub fn connect(&self, handler: impl Fn(&E) + 'static) -> HandlerId {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Returns false if the handler was not (or no longer) connected
    pub fn disconnect(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    pub fn emit(&self, event: &E) {
        // Snapshot so listeners can (dis)connect while being called
        let handlers: Vec<Handler<E>> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("handlers", &self.handler_count())
            .finish()
    }
}
