use crate::core::geo::{LatLng, Point};
use serde::{Deserialize, Serialize};

/// Pointer and wheel input consumed by the map. Positions are in pixels;
/// only their differences matter, so any fixed origin works.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Primary button pressed
    PointerDown { position: Point },
    /// Pointer moved, pressed or not
    PointerMove { position: Point },
    /// Primary button released
    PointerUp { position: Point },
    /// Scroll wheel tick; positive `delta_y` scrolls down
    Wheel { delta_y: f64, position: Point },
}

/// Event categories a listener can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Press,
    Move,
    Release,
    Wheel,
}

/// Where an event is dispatched. Events aimed at the container also reach
/// window listeners; events aimed at the window reach only those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTarget {
    Container,
    Window,
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl EventHandled {
    pub fn is_handled(self) -> bool {
        self == EventHandled::Handled
    }

    /// Handled if either side was
    pub fn or(self, other: EventHandled) -> EventHandled {
        if self.is_handled() || other.is_handled() {
            EventHandled::Handled
        } else {
            EventHandled::NotHandled
        }
    }
}

/// Map event types that can be emitted by the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapEvent {
    /// Pan started
    MoveStart { focus: LatLng },
    /// Pan ended
    MoveEnd { focus: LatLng },
    /// Zoom level changed
    ZoomChanged { from: u8, to: u8 },
}

impl InputEvent {
    /// Gets the position associated with this event
    pub fn position(&self) -> Point {
        match self {
            InputEvent::PointerDown { position }
            | InputEvent::PointerMove { position }
            | InputEvent::PointerUp { position }
            | InputEvent::Wheel { position, .. } => *position,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::PointerDown { .. } => EventKind::Press,
            InputEvent::PointerMove { .. } => EventKind::Move,
            InputEvent::PointerUp { .. } => EventKind::Release,
            InputEvent::Wheel { .. } => EventKind::Wheel,
        }
    }
}
