use crate::core::{
    config::{MapPlotConfig, ZoomAnchor},
    constants::{MAX_VIEWPORT_SIZE, MAX_ZOOM, MIN_ZOOM, TILE_SIZE, ZOOM_LIMIT},
    geo::{tiles_per_axis, LatLng, Point},
};
use serde::{Deserialize, Serialize};

/// Manages the current view of the map: logical center, zoom, tile size and
/// screen dimensions, plus the focal point in tile-pixel space.
///
/// The pixel center is reset from `(center, zoom, tile_size)` whenever one of
/// them changes, and moved directly by panning. Panning never writes back to
/// `center`; [`Viewport::focal_lat_lng`] reports where the view actually is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The configured center of the map view
    center: LatLng,
    zoom: u8,
    tile_size: u32,
    /// The size of the viewport in pixels
    size: Point,
    min_zoom: u8,
    max_zoom: u8,
    zoom_anchor: ZoomAnchor,
    /// View center in absolute tile-pixel coordinates at the current zoom
    pixel_center: Point,
}

impl Viewport {
    /// Creates a new viewport; the zoom is clamped to the default range
    pub fn new(center: LatLng, zoom: u8, size: Point) -> Self {
        let mut viewport = Self {
            center: clamp_center(center),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            tile_size: TILE_SIZE,
            size: clamp_size(size),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_anchor: ZoomAnchor::default(),
            pixel_center: Point::default(),
        };
        viewport.recompute_pixel_center();
        viewport
    }

    /// Builds a viewport from a (normalized) configuration
    pub fn from_config(config: &MapPlotConfig) -> Self {
        let config = config.clone().normalized();
        let mut viewport = Self {
            center: config.center_lat_lng(),
            zoom: config.zoom,
            tile_size: config.tile_size,
            size: Point::new(config.width as f64, config.height as f64),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            zoom_anchor: config.zoom_anchor,
            pixel_center: Point::default(),
        };
        viewport.recompute_pixel_center();
        viewport
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn zoom_range(&self) -> (u8, u8) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn zoom_anchor(&self) -> ZoomAnchor {
        self.zoom_anchor
    }

    pub fn pixel_center(&self) -> Point {
        self.pixel_center
    }

    /// Edge length of the whole world raster in pixels at the current zoom
    pub fn world_size(&self) -> f64 {
        tiles_per_axis(self.zoom) as f64 * self.tile_size as f64
    }

    /// Sets the center of the viewport and resets the pixel center.
    ///
    /// Latitude is clamped to the Web Mercator range.
    pub fn set_center(&mut self, center: LatLng) {
        self.center = clamp_center(center);
        self.recompute_pixel_center();
    }

    /// Sets the zoom level, clamping to the configured range.
    ///
    /// Returns whether the zoom actually changed.
    pub fn set_zoom(&mut self, zoom: u8) -> bool {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if new_zoom == self.zoom {
            return false;
        }

        let old_zoom = self.zoom;
        self.zoom = new_zoom;
        match self.zoom_anchor {
            ZoomAnchor::LogicalCenter => self.recompute_pixel_center(),
            ZoomAnchor::PixelCenter => {
                let scale = 2_f64.powi(new_zoom as i32 - old_zoom as i32);
                self.pixel_center = self.pixel_center.multiply(scale);
            }
        }
        log::debug!(
            "zoom {} -> {} ({:?}), pixel center ({:.1}, {:.1})",
            old_zoom,
            new_zoom,
            self.zoom_anchor,
            self.pixel_center.x,
            self.pixel_center.y
        );
        true
    }

    /// Steps the zoom by one level for a wheel tick.
    ///
    /// A positive `delta_y` (scrolling down) zooms out, anything else zooms in.
    pub fn zoom_by_wheel(&mut self, delta_y: f64) -> bool {
        let target = if delta_y > 0.0 {
            self.zoom.saturating_sub(1)
        } else {
            self.zoom.saturating_add(1)
        };
        self.set_zoom(target)
    }

    /// Sets the tile edge length (at least one pixel) and resets the pixel center
    pub fn set_tile_size(&mut self, tile_size: u32) {
        self.tile_size = tile_size.max(1);
        self.recompute_pixel_center();
    }

    /// Sets the zoom limits; an inverted range is swapped and both ends are
    /// capped at [`ZOOM_LIMIT`]
    pub fn set_zoom_limits(&mut self, min_zoom: u8, max_zoom: u8) {
        self.min_zoom = min_zoom.min(max_zoom).min(ZOOM_LIMIT);
        self.max_zoom = max_zoom.max(min_zoom).min(ZOOM_LIMIT);
        self.set_zoom(self.zoom);
    }

    pub fn set_zoom_anchor(&mut self, anchor: ZoomAnchor) {
        self.zoom_anchor = anchor;
    }

    /// Sets the viewport size, at most [`MAX_VIEWPORT_SIZE`] per side.
    /// The pixel center is independent of the size.
    pub fn resize(&mut self, size: Point) {
        self.size = clamp_size(size);
    }

    /// Moves the view by a pointer delta: the content follows the pointer,
    /// so the pixel center moves the opposite way.
    pub fn pan_by(&mut self, delta: Point) {
        self.pixel_center = self.pixel_center.subtract(&delta);
    }

    /// Recenters on the logical center, discarding any pan offset
    pub fn reset_view(&mut self) {
        self.recompute_pixel_center();
    }

    fn recompute_pixel_center(&mut self) {
        self.pixel_center = self
            .center
            .to_tile_point(self.zoom)
            .multiply(self.tile_size as f64);
    }

    /// Geographic location under the pixel center, longitude wrapped to [-180, 180)
    pub fn focal_lat_lng(&self) -> LatLng {
        let tile_point = self.pixel_center.multiply(1.0 / self.tile_size as f64);
        let lat_lng = LatLng::from_tile_point(tile_point, self.zoom);
        LatLng::new(lat_lng.lat, LatLng::wrap_lng(lat_lng.lng))
    }

    /// Converts a geographical coordinate to a container-relative pixel.
    ///
    /// Horizontally the world repeats, so the copy nearest the focal point is used.
    pub fn lat_lng_to_screen(&self, lat_lng: &LatLng) -> Point {
        let world = lat_lng.to_tile_point(self.zoom).multiply(self.tile_size as f64);
        let world_size = self.world_size();
        let mut offset = world.subtract(&self.pixel_center);
        offset.x -= world_size * (offset.x / world_size).round();
        offset.add(&self.half_size())
    }

    /// Converts a container-relative pixel back to a geographical coordinate
    pub fn screen_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let world = pixel.subtract(&self.half_size()).add(&self.pixel_center);
        let lat_lng = LatLng::from_tile_point(world.multiply(1.0 / self.tile_size as f64), self.zoom);
        LatLng::new(lat_lng.lat, LatLng::wrap_lng(lat_lng.lng))
    }

    /// Whether a container-relative pixel lies inside the display area
    pub fn contains_screen_point(&self, pixel: &Point) -> bool {
        pixel.x >= 0.0 && pixel.y >= 0.0 && pixel.x <= self.size.x && pixel.y <= self.size.y
    }

    fn half_size(&self) -> Point {
        self.size.multiply(0.5)
    }
}

fn clamp_center(center: LatLng) -> LatLng {
    let lat = if center.lat.is_finite() { center.lat } else { 0.0 };
    let lng = if center.lng.is_finite() { center.lng } else { 0.0 };
    LatLng::new(LatLng::clamp_lat(lat), lng)
}

fn clamp_size(size: Point) -> Point {
    let side = |v: f64| {
        if v.is_finite() {
            v.clamp(0.0, MAX_VIEWPORT_SIZE as f64)
        } else {
            0.0
        }
    };
    Point::new(side(size.x), side(size.y))
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&MapPlotConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::MAX_LATITUDE;

    fn equator_viewport() -> Viewport {
        Viewport::new(LatLng::new(0.0, 0.0), 1, Point::new(512.0, 512.0))
    }

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::default();
        assert_eq!(viewport.zoom(), 4);
        assert_eq!(viewport.center(), LatLng::new(37.8, -96.0));
        assert_eq!(viewport.size(), Point::new(800.0, 600.0));
        assert_eq!(viewport.tile_size(), 256);
    }

    #[test]
    fn test_pixel_center_at_equator() {
        let viewport = equator_viewport();
        assert_eq!(viewport.pixel_center(), Point::new(256.0, 256.0));
    }

    #[test]
    fn test_pan_moves_pixel_center_opposite() {
        let mut viewport = equator_viewport();
        viewport.pan_by(Point::new(10.0, -5.0));
        assert_eq!(viewport.pixel_center(), Point::new(246.0, 261.0));
        // Panning leaves the logical center alone.
        assert_eq!(viewport.center(), LatLng::new(0.0, 0.0));
    }

    #[test]
    fn test_wheel_zoom_steps_and_clamps() {
        let mut viewport = Viewport::default();
        assert!(viewport.zoom_by_wheel(120.0));
        assert_eq!(viewport.zoom(), 3);

        viewport.set_zoom(1);
        assert!(!viewport.zoom_by_wheel(120.0));
        assert_eq!(viewport.zoom(), 1);

        viewport.set_zoom(19);
        assert!(!viewport.zoom_by_wheel(-120.0));
        assert_eq!(viewport.zoom(), 19);

        viewport.set_zoom(10);
        viewport.zoom_by_wheel(-1.0);
        assert_eq!(viewport.zoom(), 11);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(2, 15);

        viewport.set_zoom(1);
        assert_eq!(viewport.zoom(), 2);

        viewport.set_zoom(20);
        assert_eq!(viewport.zoom(), 15);
    }

    #[test]
    fn test_zoom_limits_are_capped() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(1, 40);
        assert_eq!(viewport.zoom_range(), (1, ZOOM_LIMIT));

        viewport.set_zoom(35);
        assert_eq!(viewport.zoom(), ZOOM_LIMIT);
        assert!(viewport.world_size().is_finite());
        assert!(viewport.pixel_center().x.is_finite());

        viewport.set_zoom_limits(50, 45);
        assert_eq!(viewport.zoom_range(), (ZOOM_LIMIT, ZOOM_LIMIT));
    }

    #[test]
    fn test_center_latitude_is_clamped() {
        let mut viewport = equator_viewport();
        viewport.set_center(LatLng::new(89.9, 0.0));
        assert_eq!(viewport.center().lat, MAX_LATITUDE);
        assert!(viewport.pixel_center().y.abs() < 1e-6);

        viewport.set_center(LatLng::new(-90.0, 0.0));
        assert!((viewport.pixel_center().y - viewport.world_size()).abs() < 1e-6);

        viewport.set_center(LatLng::new(f64::NAN, 10.0));
        assert_eq!(viewport.center(), LatLng::new(0.0, 10.0));
    }

    #[test]
    fn test_resize_is_clamped() {
        let mut viewport = equator_viewport();
        viewport.resize(Point::new(1e12, -5.0));
        assert_eq!(viewport.size(), Point::new(MAX_VIEWPORT_SIZE as f64, 0.0));
    }

    #[test]
    fn test_logical_anchor_discards_pan() {
        let mut viewport = equator_viewport();
        viewport.set_zoom_anchor(ZoomAnchor::LogicalCenter);
        viewport.pan_by(Point::new(100.0, 40.0));
        viewport.set_zoom(2);
        assert_eq!(viewport.pixel_center(), Point::new(512.0, 512.0));
    }

    #[test]
    fn test_pixel_anchor_keeps_focal_point() {
        let mut viewport = equator_viewport();
        viewport.pan_by(Point::new(100.0, 40.0));
        let before = viewport.focal_lat_lng();

        viewport.set_zoom(3);
        assert_eq!(viewport.pixel_center(), Point::new(624.0, 864.0));
        let after = viewport.focal_lat_lng();
        assert!((before.lat - after.lat).abs() < 1e-9);
        assert!((before.lng - after.lng).abs() < 1e-9);
    }

    #[test]
    fn test_center_and_tile_size_reset_pan() {
        let mut viewport = equator_viewport();
        viewport.pan_by(Point::new(30.0, 30.0));
        viewport.set_tile_size(512);
        assert_eq!(viewport.pixel_center(), Point::new(512.0, 512.0));

        viewport.pan_by(Point::new(30.0, 30.0));
        viewport.set_center(LatLng::new(0.0, 0.0));
        assert_eq!(viewport.pixel_center(), Point::new(512.0, 512.0));
    }

    #[test]
    fn test_screen_round_trip() {
        let viewport = Viewport::new(LatLng::new(48.85, 2.35), 12, Point::new(800.0, 600.0));
        let screen_center = viewport.lat_lng_to_screen(&LatLng::new(48.85, 2.35));
        assert!((screen_center.x - 400.0).abs() < 1e-6);
        assert!((screen_center.y - 300.0).abs() < 1e-6);

        let pixel = Point::new(123.0, 456.0);
        let lat_lng = viewport.screen_to_lat_lng(&pixel);
        let back = viewport.lat_lng_to_screen(&lat_lng);
        assert!((back.x - pixel.x).abs() < 1e-6);
        assert!((back.y - pixel.y).abs() < 1e-6);
    }

    #[test]
    fn test_screen_position_uses_nearest_world_copy() {
        // Looking at the antimeridian from the west: a point just east of it
        // must show up to the right of the center, not a world away.
        let viewport = Viewport::new(LatLng::new(0.0, 179.0), 3, Point::new(800.0, 600.0));
        let east = viewport.lat_lng_to_screen(&LatLng::new(0.0, -179.0));
        assert!(east.x > 400.0 && east.x < 800.0);
    }

    #[test]
    fn test_focal_point_wraps_longitude() {
        let mut viewport = equator_viewport();
        viewport.pan_by(Point::new(-512.0, 0.0));
        let focal = viewport.focal_lat_lng();
        assert!(focal.lng.abs() < 1e-9 || (focal.lng + 180.0).abs() < 1e-9);
    }
}
