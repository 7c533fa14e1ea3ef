pub mod bus;
pub mod events;
pub mod handler;

// Re-export the essential types
pub use bus::{EventBus, Listener, ListenerId, Subscription};
pub use events::{EventHandled, EventKind, EventTarget, InputEvent, MapEvent};
pub use handler::{DragState, InputHandler};
