//! # mapplot
//!
//! A slippy-map tile engine in the OpenStreetMap style.
//!
//! The crate projects geographic coordinates onto the Web Mercator tile
//! raster, keeps a pan/zoom viewport in pixel space and derives the grid of
//! tiles needed to cover it. Drawing the tiles (and fetching their images)
//! is left to the host; see `mapplot-app` for an egui viewer.

pub mod core;
pub mod input;
pub mod prelude;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    builder::MapPlotBuilder,
    config::{MapPlotConfig, PlotPoint, ZoomAnchor},
    geo::{LatLng, Point, TileCoord},
    map::{Frame, MapPlot, MountGuard, RenderedTile, ScreenMarker},
    viewport::Viewport,
};

pub use input::{
    bus::{EventBus, Subscription},
    events::{EventHandled, EventKind, EventTarget, InputEvent, MapEvent},
    handler::InputHandler,
};

pub use tiles::{
    grid::{TileDescriptor, TileGrid, TileSetDiff},
    source::{OpenStreetMapSource, TileSource, UrlTemplateSource},
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid tile URL template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// Error type alias for convenience
pub type Error = MapError;
