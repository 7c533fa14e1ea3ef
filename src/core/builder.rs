//! Map builder for fluent API configuration
//!
//! This module provides a MapPlotBuilder that allows for fluent configuration
//! of map instances: view, zoom range, tile source and interaction options.

use crate::{
    core::{
        config::{MapPlotConfig, PlotPoint, ZoomAnchor},
        geo::LatLng,
        map::MapPlot,
        viewport::Viewport,
    },
    tiles::source::{source_for_template, TileSource},
    Result,
};

/// Builder for creating and configuring MapPlot instances
pub struct MapPlotBuilder {
    config: MapPlotConfig,
    /// Overrides the URL template from the config when set
    tile_source: Option<Box<dyn TileSource>>,
    dragging: bool,
    scroll_wheel_zoom: bool,
}

impl MapPlotBuilder {
    /// Create a new MapPlotBuilder with default settings
    pub fn new() -> Self {
        Self::from_config(MapPlotConfig::default())
    }

    /// Start from an existing configuration
    pub fn from_config(config: MapPlotConfig) -> Self {
        Self {
            config,
            tile_source: None,
            dragging: true,
            scroll_wheel_zoom: true,
        }
    }

    /// Set the initial center and zoom level
    pub fn with_view(mut self, center: LatLng, zoom: u8) -> Self {
        self.config.center = [center.lat, center.lng];
        self.config.zoom = zoom;
        self
    }

    /// Set the display size in pixels
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.config.tile_size = tile_size;
        self
    }

    /// Set zoom limits
    pub fn with_zoom_limits(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.config.min_zoom = min_zoom;
        self.config.max_zoom = max_zoom;
        self
    }

    pub fn with_zoom_anchor(mut self, anchor: ZoomAnchor) -> Self {
        self.config.zoom_anchor = anchor;
        self
    }

    /// Set the tile URL template (`{z}`, `{x}`, `{y}`)
    pub fn with_tile_url(mut self, template: impl Into<String>) -> Self {
        self.config.tile_url = template.into();
        self
    }

    /// Set the tile source directly, bypassing the URL template
    pub fn with_tile_source(mut self, source: Box<dyn TileSource>) -> Self {
        self.tile_source = Some(source);
        self
    }

    pub fn with_points(mut self, points: impl IntoIterator<Item = PlotPoint>) -> Self {
        self.config.points.extend(points);
        self
    }

    /// Enable or disable dragging
    pub fn with_dragging(mut self, enabled: bool) -> Self {
        self.dragging = enabled;
        self
    }

    /// Enable or disable scroll wheel zoom
    pub fn with_scroll_wheel_zoom(mut self, enabled: bool) -> Self {
        self.scroll_wheel_zoom = enabled;
        self
    }

    /// Build the map
    pub fn build(self) -> Result<MapPlot> {
        let config = self.config.normalized();
        let source = match self.tile_source {
            Some(source) => source,
            None => source_for_template(&config.tile_url)?,
        };

        let mut map = MapPlot::with_source(Viewport::from_config(&config), source);
        map.set_points(config.points);
        map.set_interaction(self.dragging, self.scroll_wheel_zoom);
        Ok(map)
    }
}

impl Default for MapPlotBuilder {
    fn default() -> Self {
        Self::new()
    }
}
