use crate::{
    core::constants::{MAX_LATITUDE, ZOOM_LIMIT},
    MapError,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Number of tiles along one axis at `zoom` (`2^zoom`).
///
/// Zooms above [`ZOOM_LIMIT`] are treated as the limit.
pub fn tiles_per_axis(zoom: u8) -> u32 {
    1u32 << zoom.min(ZOOM_LIMIT)
}

/// Fractional tile column of a longitude at `zoom`.
///
/// Linear in longitude: `-180` maps to `0` and `180` maps to `2^zoom`.
/// Values outside `[-180, 180]` are not wrapped here; wrapping happens when
/// the tile grid is built.
pub fn lon_to_tile_x(lng: f64, zoom: u8) -> f64 {
    (lng + 180.0) / 360.0 * tiles_per_axis(zoom) as f64
}

/// Fractional tile row of a latitude at `zoom` (Web Mercator).
///
/// Decreases as latitude grows. Diverges towards ±90°, where the projection
/// has no finite tile coordinate, so callers keep latitudes inside
/// [`MAX_LATITUDE`].
pub fn lat_to_tile_y(lat: f64, zoom: u8) -> f64 {
    let lat_rad = lat.to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * tiles_per_axis(zoom) as f64
}

/// Longitude of a fractional tile column at `zoom`.
pub fn tile_x_to_lon(x: f64, zoom: u8) -> f64 {
    x / tiles_per_axis(zoom) as f64 * 360.0 - 180.0
}

/// Latitude of a fractional tile row at `zoom`.
pub fn tile_y_to_lat(y: f64, zoom: u8) -> f64 {
    let n = tiles_per_axis(zoom) as f64;
    (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees()
}

/// Wraps a raw tile column into `[0, 2^zoom)`, whatever its sign or magnitude.
pub fn wrap_tile_x(raw: i64, zoom: u8) -> u32 {
    let n = tiles_per_axis(zoom) as i64;
    raw.rem_euclid(n) as u32
}

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are finite and within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Wraps longitude to the [-180, 180) range
    pub fn wrap_lng(lng: f64) -> f64 {
        (lng + 180.0).rem_euclid(360.0) - 180.0
    }

    /// Clamps latitude to the Web Mercator range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Projects to fractional tile coordinates at `zoom`
    pub fn to_tile_point(&self, zoom: u8) -> Point {
        Point::new(lon_to_tile_x(self.lng, zoom), lat_to_tile_y(self.lat, zoom))
    }

    /// Inverse of [`LatLng::to_tile_point`]
    pub fn from_tile_point(point: Point, zoom: u8) -> Self {
        Self::new(tile_y_to_lat(point.y, zoom), tile_x_to_lon(point.x, zoom))
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Parses `"lat,lng"`, e.g. `"48.85, 2.35"`
impl std::str::FromStr for LatLng {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MapError::InvalidCoordinates(s.to_string());
        let (lat, lng) = s.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;
        let lat_lng = Self::new(lat, lng);
        if lat_lng.is_valid() {
            Ok(lat_lng)
        } else {
            Err(invalid())
        }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self::new(lat, lng)
    }
}

/// Represents a point in screen, tile or tile-pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a tile coordinate in the slippy map tile system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Creates the tile containing a LatLng at the given zoom level
    pub fn from_lat_lng(lat_lng: &LatLng, zoom: u8) -> Self {
        let lat = LatLng::clamp_lat(lat_lng.lat);
        let x = lon_to_tile_x(lat_lng.lng, zoom).floor() as i64;
        let max = tiles_per_axis(zoom) - 1;
        let y = (lat_to_tile_y(lat, zoom).floor().max(0.0) as u32).min(max);

        Self::new(wrap_tile_x(x, zoom), y, zoom)
    }

    /// Converts tile coordinate to LatLng (northwest corner)
    pub fn to_lat_lng(&self) -> LatLng {
        LatLng::new(
            tile_y_to_lat(self.y as f64, self.z),
            tile_x_to_lon(self.x as f64, self.z),
        )
    }

    /// Checks if the tile is valid for its zoom level
    pub fn is_valid(&self) -> bool {
        let max_coord = tiles_per_axis(self.z);
        self.x < max_coord && self.y < max_coord
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}
