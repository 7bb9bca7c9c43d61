//! Projection adapter between geographic coordinates and map pixels
//!
//! The host map library owns the real projection; [`MapProjection`] is the contract the
//! engine consumes. [`WebMercatorView`] implements it for the usual EPSG:3857 tile maps.

use crate::LatLng;
use geo::Coord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Web Mercator bounds in meters (EPSG:3857)
pub const EARTH_MERCATOR_MAX: f64 = 20037508.342789244;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Size of one tile in pixels, the whole world at zoom 0
pub const TILE_SIZE: f64 = 256.0;

/// Geo <-> planar pixel conversion supplied by the host map
pub trait MapProjection {
    /// Project a coordinate to absolute pixels at `zoom`
    fn project(&self, lat_lng: LatLng, zoom: f64) -> Coord<f64>;

    /// Inverse of [`MapProjection::project`]
    fn unproject(&self, point: Coord<f64>, zoom: f64) -> LatLng;

    /// Current zoom level of the map
    fn zoom(&self) -> f64;

    /// Maximum zoom level, `None` when unbounded
    fn max_zoom(&self) -> Option<f64>;

    /// Pixel position relative to the visible map container
    fn lat_lng_to_container_point(&self, lat_lng: LatLng) -> Coord<f64>;

    /// Inverse of [`MapProjection::lat_lng_to_container_point`]
    fn container_point_to_lat_lng(&self, point: Coord<f64>) -> LatLng;

    /// Zoom used for locating points on lines
    ///
    /// Projecting at the deepest zoom keeps the segment ordering stable regardless of the
    /// zoom the user is currently looking at.
    fn locate_zoom(&self) -> f64 {
        match self.max_zoom() {
            Some(max_zoom) if max_zoom.is_finite() => max_zoom,
            _ => self.zoom(),
        }
    }
}

/// Convert WGS84 (lat, lon) to Web Mercator (x, y) in meters
///
/// Latitude is clamped to the valid Web Mercator range.
#[inline(always)]
pub fn wgs84_to_mercator(lat: f64, lon: f64) -> Coord<f64> {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let lat_rad = lat.to_radians();
    Coord {
        x: lon * EARTH_MERCATOR_MAX / 180.0,
        y: (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() * EARTH_MERCATOR_MAX
            / std::f64::consts::PI,
    }
}

/// Convert Web Mercator (x, y) in meters to WGS84 (lat, lon)
#[inline(always)]
pub fn mercator_to_wgs84(x: f64, y: f64) -> LatLng {
    let lng = x * 180.0 / EARTH_MERCATOR_MAX;
    let lat = (std::f64::consts::FRAC_PI_2
        - 2.0 * (-y * std::f64::consts::PI / EARTH_MERCATOR_MAX).exp().atan())
    .to_degrees();
    LatLng::new(lat, lng)
}

/// A Web Mercator map view: zoom level plus the pixel position of the container origin
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WebMercatorView {
    /// Current zoom level
    pub zoom: f64,
    /// Maximum zoom level, `None` when the map has no limit
    pub max_zoom: Option<f64>,
    /// Absolute pixel at the top-left corner of the container
    pub pixel_origin: Coord<f64>,
}

impl WebMercatorView {
    /// Create a view at `zoom` with the container origin at the world origin
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            max_zoom: None,
            pixel_origin: Coord { x: 0.0, y: 0.0 },
        }
    }

    pub fn with_max_zoom(mut self, max_zoom: f64) -> Self {
        self.max_zoom = Some(max_zoom);
        self
    }

    /// Place `center` in the middle of a container of `size` pixels
    pub fn centered_on(mut self, center: LatLng, size: Coord<f64>) -> Self {
        let center_px = self.project(center, self.zoom);
        self.pixel_origin = Coord {
            x: center_px.x - size.x / 2.0,
            y: center_px.y - size.y / 2.0,
        };
        self
    }

    #[inline]
    fn scale(zoom: f64) -> f64 {
        TILE_SIZE * zoom.exp2()
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl MapProjection for WebMercatorView {
    fn project(&self, lat_lng: LatLng, zoom: f64) -> Coord<f64> {
        let meters = wgs84_to_mercator(lat_lng.lat, lat_lng.lng);
        let scale = Self::scale(zoom);
        // x grows eastwards, y grows southwards
        Coord {
            x: scale * (0.5 + meters.x / (2.0 * EARTH_MERCATOR_MAX)),
            y: scale * (0.5 - meters.y / (2.0 * EARTH_MERCATOR_MAX)),
        }
    }

    fn unproject(&self, point: Coord<f64>, zoom: f64) -> LatLng {
        let scale = Self::scale(zoom);
        let x = (point.x / scale - 0.5) * 2.0 * EARTH_MERCATOR_MAX;
        let y = (0.5 - point.y / scale) * 2.0 * EARTH_MERCATOR_MAX;
        mercator_to_wgs84(x, y)
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn max_zoom(&self) -> Option<f64> {
        self.max_zoom
    }

    fn lat_lng_to_container_point(&self, lat_lng: LatLng) -> Coord<f64> {
        self.project(lat_lng, self.zoom) - self.pixel_origin
    }

    fn container_point_to_lat_lng(&self, point: Coord<f64>) -> LatLng {
        self.unproject(point + self.pixel_origin, self.zoom)
    }
}
