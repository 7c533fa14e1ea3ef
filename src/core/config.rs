//! Configuration for a map plot
//!
//! A [`MapPlotConfig`] carries every option the map component recognizes. It can
//! be built in code, or loaded from JSON where any omitted field falls back to
//! its default. Out-of-range numbers are never rejected; [`MapPlotConfig::normalized`]
//! clamps them into something the engine can render.

use crate::{
    core::{
        constants::{
            DEFAULT_CENTER, DEFAULT_HEIGHT, DEFAULT_WIDTH, DEFAULT_ZOOM, MAX_LATITUDE,
            MAX_VIEWPORT_SIZE, MAX_ZOOM, MIN_ZOOM, OSM_TILE_URL, TILE_SIZE, ZOOM_LIMIT,
        },
        geo::LatLng,
    },
    Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What a zoom change keeps fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZoomAnchor {
    /// Re-project the configured center at the new zoom; any pan offset is dropped
    LogicalCenter,
    /// Rescale the current pixel center so the point under the view center stays put
    #[default]
    PixelCenter,
}

/// A data point drawn as a marker on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub label: Option<String>,
}

impl PlotPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Popup text in the `"<lat column>: <lat>, <lon column>: <lon>"` form
    pub fn describe(lat: f64, lon: f64, lat_column: &str, lon_column: &str) -> Self {
        Self::new(lat, lon).with_label(format!("{lat_column}: {lat}, {lon_column}: {lon}"))
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat, self.lon)
    }

    /// Points with non-finite or out-of-range coordinates are not plotted
    pub fn is_plottable(&self) -> bool {
        self.lat_lng().is_valid()
    }
}

/// Options recognized by the map plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapPlotConfig {
    /// Initial center as `[lat, lng]`
    pub center: [f64; 2],
    pub zoom: u8,
    /// Tile edge length in pixels
    pub tile_size: u32,
    pub width: u32,
    pub height: u32,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub zoom_anchor: ZoomAnchor,
    /// Template with `{z}`, `{x}` and `{y}` placeholders
    pub tile_url: String,
    pub points: Vec<PlotPoint>,
}

impl Default for MapPlotConfig {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            tile_size: TILE_SIZE,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_anchor: ZoomAnchor::default(),
            tile_url: OSM_TILE_URL.to_string(),
            points: Vec::new(),
        }
    }
}

impl MapPlotConfig {
    /// Parses a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Reads and parses a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading map config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn center_lat_lng(&self) -> LatLng {
        LatLng::from(self.center)
    }

    /// Returns a copy with every numeric option clamped into a renderable range
    pub fn normalized(mut self) -> Self {
        let (lo, hi) = if self.min_zoom <= self.max_zoom {
            (self.min_zoom, self.max_zoom)
        } else {
            log::warn!(
                "zoom range {}..={} is inverted, swapping",
                self.min_zoom,
                self.max_zoom
            );
            (self.max_zoom, self.min_zoom)
        };
        self.min_zoom = lo.min(ZOOM_LIMIT);
        self.max_zoom = hi.min(ZOOM_LIMIT);

        let zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
        if zoom != self.zoom {
            log::warn!("zoom {} outside {}..={}, clamped to {}", self.zoom, lo, hi, zoom);
            self.zoom = zoom;
        }

        if self.tile_size == 0 {
            log::warn!("tile size 0 clamped to 1");
            self.tile_size = 1;
        }

        if self.width > MAX_VIEWPORT_SIZE || self.height > MAX_VIEWPORT_SIZE {
            log::warn!(
                "viewport {}x{} clamped to {MAX_VIEWPORT_SIZE}px per side",
                self.width,
                self.height
            );
            self.width = self.width.min(MAX_VIEWPORT_SIZE);
            self.height = self.height.min(MAX_VIEWPORT_SIZE);
        }

        let [lat, lng] = self.center;
        let lat = if lat.is_finite() { lat } else { 0.0 };
        let lng = if lng.is_finite() { lng } else { 0.0 };
        self.center = [lat.clamp(-MAX_LATITUDE, MAX_LATITUDE), lng];

        self
    }
}
