//! Host event dispatch
//!
//! The [`EventBus`] stands in for the host's event system: the host feeds raw
//! input in through [`EventBus::dispatch`], and components subscribe for the
//! lifetime of a mount. Listeners are plain closures; the bus is meant for a
//! single UI thread, so it hands out `Rc` handles and uses interior mutability.
//!
//! Listeners may add or remove listeners (or drop a whole [`Subscription`])
//! while an event is being dispatched. A listener removed mid-dispatch is not
//! called again; one added mid-dispatch first sees the next event.

use crate::input::events::{EventHandled, EventKind, EventTarget, InputEvent};
use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

/// Event listener callback type
pub type Listener = Box<dyn FnMut(&InputEvent) -> EventHandled>;

/// Identifies one registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    target: EventTarget,
    kind: EventKind,
    listener: Rc<RefCell<Listener>>,
}

/// Routes input events to the listeners registered for them
#[derive(Default)]
pub struct EventBus {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<Registration>>,
}

impl EventBus {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Register a listener for one kind of event on one target
    pub fn add_listener<F>(&self, target: EventTarget, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&InputEvent) -> EventHandled + 'static,
    {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push(Registration {
            id,
            target,
            kind,
            listener: Rc::new(RefCell::new(Box::new(listener))),
        });
        id
    }

    /// Unregister a listener; returns whether it was registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|registration| registration.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.listeners.borrow().iter().any(|registration| registration.id == id)
    }

    /// Deliver an event to every matching listener, in registration order.
    ///
    /// The matching listeners are collected up front and the registry is not
    /// borrowed while they run. A listener that is already running (the event
    /// was re-dispatched from inside it) is skipped.
    pub fn dispatch(&self, target: EventTarget, event: &InputEvent) -> EventHandled {
        let kind = event.kind();
        let matching: Vec<(ListenerId, Rc<RefCell<Listener>>)> = self
            .listeners
            .borrow()
            .iter()
            .filter(|registration| {
                (registration.target == target || registration.target == EventTarget::Window)
                    && registration.kind == kind
            })
            .map(|registration| (registration.id, Rc::clone(&registration.listener)))
            .collect();

        let mut handled = EventHandled::NotHandled;
        for (id, listener) in matching {
            if !self.is_registered(id) {
                continue;
            }
            let Ok(mut listener) = listener.try_borrow_mut() else {
                log::trace!("listener {:?} is already running, skipped", id);
                continue;
            };
            handled = handled.or((&mut *listener)(event));
        }
        handled
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// A set of listeners that is removed from its bus when dropped
#[derive(Debug)]
pub struct Subscription {
    bus: Weak<EventBus>,
    ids: Vec<ListenerId>,
}

impl Subscription {
    pub fn new(bus: &Rc<EventBus>) -> Self {
        Self {
            bus: Rc::downgrade(bus),
            ids: Vec::new(),
        }
    }

    /// Register a listener that lives as long as this subscription
    pub fn listen<F>(&mut self, target: EventTarget, kind: EventKind, listener: F) -> &mut Self
    where
        F: FnMut(&InputEvent) -> EventHandled + 'static,
    {
        if let Some(bus) = self.bus.upgrade() {
            self.ids.push(bus.add_listener(target, kind, listener));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // A bus that is already gone took its listeners with it.
        if let Some(bus) = self.bus.upgrade() {
            for id in self.ids.drain(..) {
                bus.remove_listener(id);
            }
        }
    }
}
