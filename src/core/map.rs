use crate::{
    core::{
        config::{MapPlotConfig, PlotPoint, ZoomAnchor},
        geo::{LatLng, Point, TileCoord},
        viewport::Viewport,
    },
    input::{
        bus::{EventBus, Subscription},
        events::{EventHandled, EventKind, EventTarget, InputEvent, MapEvent},
        handler::InputHandler,
    },
    prelude::HashSet,
    tiles::{
        grid::{TileGrid, TileSetDiff},
        source::{source_for_template, TileSource},
    },
    Result,
};
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, rc::Rc};

/// A tile ready to draw: where it goes and which image to put there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedTile {
    pub coord: TileCoord,
    pub url: String,
    pub left: f64,
    pub top: f64,
    pub size: u32,
}

/// A plot point projected into the viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenMarker {
    pub position: Point,
    pub lat_lng: LatLng,
    pub label: Option<String>,
}

/// Everything needed to draw the map once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub zoom: u8,
    pub width: f64,
    pub height: f64,
    pub pixel_center: Point,
    pub focus: LatLng,
    pub tiles: Vec<RenderedTile>,
    pub markers: Vec<ScreenMarker>,
}

/// State shared between the map and the listeners it registers while mounted
#[derive(Debug, Default)]
struct MapState {
    viewport: Viewport,
    input: InputHandler,
}

impl MapState {
    fn handle(&mut self, event: &InputEvent) -> EventHandled {
        let MapState { viewport, input } = self;
        input.handle_event(event, viewport)
    }
}

/// Pannable, zoomable tile map with optional point markers
pub struct MapPlot {
    state: Rc<RefCell<MapState>>,
    source: Box<dyn TileSource>,
    points: Vec<PlotPoint>,
    /// Tiles of the last frame, for enter/leave bookkeeping
    shown: HashSet<TileCoord>,
}

impl MapPlot {
    /// Creates a map from a configuration. Numbers are clamped; only an
    /// unusable tile URL template is an error.
    pub fn new(config: MapPlotConfig) -> Result<Self> {
        let config = config.normalized();
        let source = source_for_template(&config.tile_url)?;
        let mut map = Self::with_source(Viewport::from_config(&config), source);
        map.set_points(config.points);
        Ok(map)
    }

    pub fn with_source(viewport: Viewport, source: Box<dyn TileSource>) -> Self {
        Self {
            state: Rc::new(RefCell::new(MapState {
                viewport,
                input: InputHandler::new(),
            })),
            source,
            points: Vec::new(),
            shown: HashSet::default(),
        }
    }

    /// Subscribes to the host's input for as long as the returned guard lives.
    ///
    /// Press and wheel are taken from the container; move and release from
    /// the window, so a drag keeps tracking after the pointer leaves the map.
    pub fn mount(&self, bus: &Rc<EventBus>) -> MountGuard {
        let mut subscription = Subscription::new(bus);
        for (target, kind) in [
            (EventTarget::Container, EventKind::Press),
            (EventTarget::Window, EventKind::Move),
            (EventTarget::Window, EventKind::Release),
            (EventTarget::Container, EventKind::Wheel),
        ] {
            let state = Rc::clone(&self.state);
            subscription.listen(target, kind, move |event| state.borrow_mut().handle(event));
        }
        log::info!("map mounted with {} listeners", subscription.len());

        MountGuard {
            state: Rc::clone(&self.state),
            _subscription: subscription,
        }
    }

    /// Applies an event directly, without going through a bus
    pub fn handle_event(&self, event: &InputEvent) -> EventHandled {
        self.state.borrow_mut().handle(event)
    }

    /// Drains view events (drag start/end, zoom changes) since the last call
    pub fn take_events(&self) -> Vec<MapEvent> {
        self.state.borrow_mut().input.take_events()
    }

    /// Snapshot of the current viewport
    pub fn viewport(&self) -> Viewport {
        self.state.borrow().viewport.clone()
    }

    /// Enables or disables drag panning and wheel zoom
    pub fn set_interaction(&self, dragging: bool, scroll_wheel_zoom: bool) {
        let mut state = self.state.borrow_mut();
        state.input.pan_on_drag = dragging;
        state.input.zoom_on_wheel = scroll_wheel_zoom;
        if !dragging {
            state.input.cancel_drag();
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.state.borrow().input.drag_state().is_dragging()
    }

    pub fn set_center(&self, center: LatLng) {
        log::debug!("center set to ({}, {})", center.lat, center.lng);
        self.state.borrow_mut().viewport.set_center(center);
    }

    pub fn set_zoom(&self, zoom: u8) -> bool {
        self.state.borrow_mut().viewport.set_zoom(zoom)
    }

    pub fn set_tile_size(&self, tile_size: u32) {
        self.state.borrow_mut().viewport.set_tile_size(tile_size);
    }

    pub fn set_zoom_anchor(&self, anchor: ZoomAnchor) {
        self.state.borrow_mut().viewport.set_zoom_anchor(anchor);
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.state
            .borrow_mut()
            .viewport
            .resize(Point::new(width.max(0.0), height.max(0.0)));
    }

    /// Replaces the plotted points, dropping any that cannot be projected
    pub fn set_points(&mut self, points: impl IntoIterator<Item = PlotPoint>) {
        let points: Vec<PlotPoint> = points.into_iter().collect();
        let total = points.len();
        self.points = points.into_iter().filter(PlotPoint::is_plottable).collect();
        let dropped = total - self.points.len();
        if dropped > 0 {
            log::warn!("dropped {dropped} points with invalid coordinates");
        }
    }

    pub fn points(&self) -> &[PlotPoint] {
        &self.points
    }

    /// Image URL of one tile, from the map's tile source
    pub fn tile_url(&self, coord: TileCoord) -> String {
        self.source.url(coord)
    }

    /// Computes the tile grid for the current view
    pub fn tile_grid(&self) -> TileGrid {
        TileGrid::compute(&self.state.borrow().viewport)
    }

    /// Builds the draw list for the current view.
    pub fn frame(&self) -> Frame {
        let viewport = self.viewport();
        let grid = TileGrid::compute(&viewport);

        let tiles = grid
            .iter()
            .map(|tile| {
                let coord = tile.coord(grid.zoom);
                RenderedTile {
                    coord,
                    url: self.tile_url(coord),
                    left: tile.left,
                    top: tile.top,
                    size: grid.tile_size,
                }
            })
            .collect();

        let markers = self
            .points
            .iter()
            .filter_map(|point| {
                let lat_lng = point.lat_lng();
                let position = viewport.lat_lng_to_screen(&lat_lng);
                viewport.contains_screen_point(&position).then(|| ScreenMarker {
                    position,
                    lat_lng,
                    label: point.label.clone(),
                })
            })
            .collect();

        let size = viewport.size();
        Frame {
            zoom: viewport.zoom(),
            width: size.x,
            height: size.y,
            pixel_center: viewport.pixel_center(),
            focus: viewport.focal_lat_lng(),
            tiles,
            markers,
        }
    }

    /// Tiles that entered and left the view since the previous call, so a
    /// host image loader knows what to request and what to release.
    pub fn update_visible_tiles(&mut self) -> TileSetDiff {
        let current = self.tile_grid().keys();
        let diff = TileSetDiff::between(&self.shown, &current);
        if !diff.is_empty() {
            log::debug!(
                "visible tiles: +{} -{} ({} total)",
                diff.added.len(),
                diff.removed.len(),
                current.len()
            );
        }
        self.shown = current;
        diff
    }
}

impl std::fmt::Debug for MapPlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapPlot")
            .field("viewport", &self.state.borrow().viewport)
            .field("points", &self.points.len())
            .finish()
    }
}

/// Keeps a map subscribed to its host's input. Dropping it removes every
/// listener the mount registered and abandons any drag in progress.
#[must_use = "the map stops receiving input when the guard is dropped"]
#[derive(Debug)]
pub struct MountGuard {
    state: Rc<RefCell<MapState>>,
    _subscription: Subscription,
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.input.cancel_drag();
        }
        log::info!("map unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equator_map() -> MapPlot {
        MapPlot::new(MapPlotConfig {
            center: [0.0, 0.0],
            zoom: 1,
            width: 512,
            height: 512,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_frame_urls_and_offsets() {
        let map = equator_map();
        let frame = map.frame();
        assert_eq!(frame.zoom, 1);
        assert_eq!(frame.pixel_center, Point::new(256.0, 256.0));
        assert_eq!(frame.tiles.len(), 8);

        let origin = frame
            .tiles
            .iter()
            .find(|t| t.left == 0.0 && t.top == 0.0)
            .unwrap();
        assert_eq!(origin.url, "https://tile.openstreetmap.org/1/0/0.png");
        assert_eq!(origin.size, 256);
    }

    #[test]
    fn test_custom_template() {
        let map = MapPlot::new(MapPlotConfig {
            tile_url: "https://tiles.example.com/{z}/{x}/{y}.webp".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert!(map
            .frame()
            .tiles
            .iter()
            .all(|t| t.url.starts_with("https://tiles.example.com/4/")));
    }

    #[test]
    fn test_bad_template_is_rejected() {
        let result = MapPlot::new(MapPlotConfig {
            tile_url: "https://tiles.example.com/static.png".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(crate::MapError::InvalidTemplate(_))));
    }

    #[test]
    fn test_markers() {
        let mut map = equator_map();
        map.set_points(vec![
            PlotPoint::new(0.0, 0.0).with_label("null island"),
            PlotPoint::new(f64::NAN, 1.0),
            PlotPoint::new(0.0, 200.0),
        ]);
        assert_eq!(map.points().len(), 1);

        let frame = map.frame();
        assert_eq!(frame.markers.len(), 1);
        assert_eq!(frame.markers[0].position, Point::new(256.0, 256.0));
        assert_eq!(frame.markers[0].label.as_deref(), Some("null island"));
    }

    #[test]
    fn test_markers_outside_view_are_skipped() {
        let mut map = MapPlot::new(MapPlotConfig {
            center: [48.85, 2.35],
            zoom: 12,
            ..Default::default()
        })
        .unwrap();
        map.set_points(vec![PlotPoint::new(48.85, 2.35), PlotPoint::new(-33.9, 151.2)]);
        assert_eq!(map.frame().markers.len(), 1);
    }

    #[test]
    fn test_update_visible_tiles() {
        let mut map = equator_map();
        let first = map.update_visible_tiles();
        assert_eq!(first.added.len(), 4);
        assert!(first.removed.is_empty());
        assert!(map.update_visible_tiles().is_empty());

        map.set_zoom(2);
        let zoomed = map.update_visible_tiles();
        assert_eq!(zoomed.removed.len(), 4);
        assert!(zoomed.added.iter().all(|c| c.z == 2));

        let url = map.tile_url(zoomed.added[0]);
        assert!(url.starts_with("https://tile.openstreetmap.org/2/"));
    }

    #[test]
    fn test_mount_guard_releases_listeners() {
        let map = equator_map();
        let bus = EventBus::new();
        {
            let _guard = map.mount(&bus);
            assert_eq!(bus.listener_count(), 4);
        }
        assert_eq!(bus.listener_count(), 0);
    }
}
