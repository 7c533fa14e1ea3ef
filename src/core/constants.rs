//! Core constants derived from OpenStreetMap defaults and common web-map conventions.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Lowest zoom level a viewport accepts by default.
pub const MIN_ZOOM: u8 = 1;

/// Highest zoom level a viewport accepts by default.
pub const MAX_ZOOM: u8 = 19;

/// Zoom level used when none is configured.
pub const DEFAULT_ZOOM: u8 = 4;

/// Default map center as `[lat, lng]` (continental United States).
pub const DEFAULT_CENTER: [f64; 2] = [37.8, -96.0];

/// Default display area in pixels.
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Latitude at which the Web Mercator square ends (atan(sinh(π)) in degrees).
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Public OpenStreetMap tile server.
pub const OSM_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Extra tiles added to each grid dimension so sub-tile panning never shows an edge.
pub const GRID_OVERSCAN: u32 = 2;

/// Highest zoom the engine can represent: tile indices are `u32` and the
/// pixel raster (`2^zoom * tile_size`) must stay well inside `f64` precision.
pub const ZOOM_LIMIT: u8 = 30;

/// Largest viewport edge in pixels; bigger sizes are clamped to it.
pub const MAX_VIEWPORT_SIZE: u32 = 16384;
