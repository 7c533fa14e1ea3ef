//! Prelude module for common mapplot types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapplot::prelude::*;`

pub use crate::core::{
    builder::MapPlotBuilder,
    config::{MapPlotConfig, PlotPoint, ZoomAnchor},
    geo::{lat_to_tile_y, lon_to_tile_x, wrap_tile_x, LatLng, Point, TileCoord},
    map::{Frame, MapPlot, MountGuard},
    viewport::Viewport,
};

pub use crate::input::{
    bus::EventBus,
    events::{EventHandled, EventKind, EventTarget, InputEvent, MapEvent},
};

pub use crate::tiles::{
    grid::{TileDescriptor, TileGrid, TileSetDiff},
    source::{OpenStreetMapSource, TileSource, UrlTemplateSource},
};

pub use crate::{Error as MapError, Result};

pub use std::rc::Rc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
