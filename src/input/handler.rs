use crate::{
    core::{geo::Point, viewport::Viewport},
    input::events::{EventHandled, InputEvent, MapEvent},
};
use std::collections::VecDeque;

/// Pan gesture bookkeeping: whether a drag is active and where the pointer last was
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    dragging: bool,
    last_position: Point,
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn last_position(&self) -> Point {
        self.last_position
    }

    pub fn start(&mut self, position: Point) {
        self.dragging = true;
        self.last_position = position;
    }

    /// Returns the movement since the previous pointer position, or `None`
    /// when no drag is active
    pub fn advance(&mut self, position: Point) -> Option<Point> {
        if !self.dragging {
            return None;
        }
        let delta = position.subtract(&self.last_position);
        self.last_position = position;
        Some(delta)
    }

    /// Ends the gesture; returns whether one was active
    pub fn end(&mut self) -> bool {
        std::mem::replace(&mut self.dragging, false)
    }
}

/// Turns pointer and wheel input into viewport changes
#[derive(Debug, Clone)]
pub struct InputHandler {
    pub enabled: bool,
    pub pan_on_drag: bool,
    pub zoom_on_wheel: bool,
    drag: DragState,
    events: VecDeque<MapEvent>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            enabled: true,
            pan_on_drag: true,
            zoom_on_wheel: true,
            drag: DragState::default(),
            events: VecDeque::new(),
        }
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Applies one event to the viewport.
    ///
    /// Press starts a drag, each move while dragging pans by the pointer delta,
    /// release ends the drag and a wheel tick steps the zoom by one level.
    pub fn handle_event(&mut self, event: &InputEvent, viewport: &mut Viewport) -> EventHandled {
        if !self.enabled {
            return EventHandled::NotHandled;
        }

        match *event {
            InputEvent::PointerDown { position } if self.pan_on_drag => {
                self.drag.start(position);
                self.events.push_back(MapEvent::MoveStart {
                    focus: viewport.focal_lat_lng(),
                });
                EventHandled::Handled
            }
            InputEvent::PointerMove { position } => match self.drag.advance(position) {
                Some(delta) => {
                    log::trace!("drag by ({}, {})", delta.x, delta.y);
                    viewport.pan_by(delta);
                    EventHandled::Handled
                }
                None => EventHandled::NotHandled,
            },
            InputEvent::PointerUp { .. } => {
                if self.drag.end() {
                    self.events.push_back(MapEvent::MoveEnd {
                        focus: viewport.focal_lat_lng(),
                    });
                    EventHandled::Handled
                } else {
                    EventHandled::NotHandled
                }
            }
            InputEvent::Wheel { delta_y, .. } if self.zoom_on_wheel => {
                let from = viewport.zoom();
                if viewport.zoom_by_wheel(delta_y) {
                    self.events.push_back(MapEvent::ZoomChanged {
                        from,
                        to: viewport.zoom(),
                    });
                }
                // Consumed even at the zoom limits so the host does not scroll the page.
                EventHandled::Handled
            }
            _ => EventHandled::NotHandled,
        }
    }

    /// Drains the map events produced since the last call
    pub fn take_events(&mut self) -> Vec<MapEvent> {
        self.events.drain(..).collect()
    }

    /// Forgets any drag in progress, e.g. when the map is unmounted mid-gesture
    pub fn cancel_drag(&mut self) {
        self.drag.end();
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
