use crate::constants::{
    DEFAULT_BOUNDS, DEFAULT_CENTER, DEFAULT_ZOOM, MAX_MERCATOR_LAT, MIN_BOUNDS_SPAN_DEG, TILE_SIZE,
};
use crate::geometry::{LatLon, ScreenPoint};
use std::f64::consts::PI;

/// Maps a geographic position into canvas CSS pixels for the current view.
///
/// Implementations are cheap value types; callers project every point on
/// every frame instead of caching screen coordinates across frames.
pub trait GeoProjector {
    fn project(&self, position: LatLon) -> ScreenPoint;
}

/// Geographic bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for GeoBounds {
    fn default() -> Self {
        let (min_lat, max_lat, min_lon, max_lon) = DEFAULT_BOUNDS;
        Self { min_lat, max_lat, min_lon, max_lon }
    }
}

impl GeoBounds {
    /// Bounds of the finite points, or `None` when there are none
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LatLon>) -> Option<Self> {
        points
            .into_iter()
            .filter(|p| p.is_finite())
            .fold(None, |bounds: Option<Self>, p| {
                Some(match bounds {
                    None => Self { min_lat: p.lat, max_lat: p.lat, min_lon: p.lon, max_lon: p.lon },
                    Some(b) => Self {
                        min_lat: b.min_lat.min(p.lat),
                        max_lat: b.max_lat.max(p.lat),
                        min_lon: b.min_lon.min(p.lon),
                        max_lon: b.max_lon.max(p.lon),
                    },
                })
            })
    }

    #[must_use]
    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    #[must_use]
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.lat_span() < MIN_BOUNDS_SPAN_DEG || self.lon_span() < MIN_BOUNDS_SPAN_DEG
    }

    /// Widen any span below the minimum symmetrically about its center
    #[must_use]
    pub fn with_min_span(self) -> Self {
        let widen = |min: f64, max: f64| {
            if max - min >= MIN_BOUNDS_SPAN_DEG {
                (min, max)
            } else {
                let mid = (min + max) / 2.0;
                (mid - MIN_BOUNDS_SPAN_DEG / 2.0, mid + MIN_BOUNDS_SPAN_DEG / 2.0)
            }
        };
        let (min_lat, max_lat) = widen(self.min_lat, self.max_lat);
        let (min_lon, max_lon) = widen(self.min_lon, self.max_lon);
        Self { min_lat, max_lat, min_lon, max_lon }
    }
}

fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

fn mercator_y(lat: f64) -> f64 {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0
}

fn inverse_mercator_x(x: f64) -> f64 {
    x * 360.0 - 180.0
}

fn inverse_mercator_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

/// Pan/zoom state of the slippy map: spherical Web Mercator with 256 px tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapTransform {
    pub center: LatLon,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for MapTransform {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            width: 0.0,
            height: 0.0,
            min_zoom: 3.0,
            max_zoom: 18.0,
        }
    }
}

impl MapTransform {
    #[must_use]
    pub fn new(min_zoom: f64, max_zoom: f64) -> Self {
        Self { min_zoom, max_zoom, ..Self::default() }
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    fn world_point(&self, position: LatLon) -> ScreenPoint {
        let size = self.world_size();
        ScreenPoint::new(mercator_x(position.lon) * size, mercator_y(position.lat) * size)
    }

    fn from_world(&self, world: ScreenPoint) -> LatLon {
        let size = self.world_size();
        LatLon::new(inverse_mercator_y(world.y / size), inverse_mercator_x(world.x / size))
    }

    fn viewport_center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }

    /// Geographic position under a canvas pixel
    #[must_use]
    pub fn unproject(&self, point: ScreenPoint) -> LatLon {
        let center = self.world_point(self.center);
        let offset = self.viewport_center();
        self.from_world(ScreenPoint::new(
            center.x + point.x - offset.x,
            center.y + point.y - offset.y,
        ))
    }

    /// Drag the map by a pixel delta
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let offset = self.viewport_center();
        let center = self.unproject(ScreenPoint::new(offset.x - dx, offset.y - dy));
        self.center = LatLon::new(center.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT), center.lon);
    }

    /// Scale by `factor` keeping the geographic point under `anchor` fixed on screen
    pub fn zoom_around(&mut self, factor: f64, anchor: ScreenPoint) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let fixed = self.unproject(anchor);
        self.zoom = (self.zoom + factor.log2()).clamp(self.min_zoom, self.max_zoom);

        let world = self.world_point(fixed);
        let offset = self.viewport_center();
        self.center = self.from_world(ScreenPoint::new(
            world.x - (anchor.x - offset.x),
            world.y - (anchor.y - offset.y),
        ));
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// Center and zoom so `bounds` fills the viewport minus `padding` on every side.
    ///
    /// Degenerate bounds (a single point) center on that point at the maximum zoom.
    pub fn fit_bounds(&mut self, bounds: GeoBounds, padding: f64) {
        if bounds.is_degenerate() {
            self.center = bounds.center();
            self.zoom = self.max_zoom;
            return;
        }

        let available_w = (self.width - 2.0 * padding).max(1.0);
        let available_h = (self.height - 2.0 * padding).max(1.0);

        let left = mercator_x(bounds.min_lon);
        let right = mercator_x(bounds.max_lon);
        let top = mercator_y(bounds.max_lat);
        let bottom = mercator_y(bounds.min_lat);

        let scale = (available_w / ((right - left) * TILE_SIZE))
            .min(available_h / ((bottom - top) * TILE_SIZE));
        self.zoom = scale.log2().clamp(self.min_zoom, self.max_zoom);
        self.center = LatLon::new(
            inverse_mercator_y((top + bottom) / 2.0),
            inverse_mercator_x((left + right) / 2.0),
        );
    }
}

impl GeoProjector for MapTransform {
    fn project(&self, position: LatLon) -> ScreenPoint {
        let world = self.world_point(position);
        let center = self.world_point(self.center);
        let offset = self.viewport_center();
        ScreenPoint::new(world.x - center.x + offset.x, world.y - center.y + offset.y)
    }
}

/// Fits a bounding box into a fixed pixel box with one uniform, north-up scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsProjector {
    bounds: GeoBounds,
    height: f64,
    scale: f64,
    extra_x: f64,
    extra_y: f64,
}

impl BoundsProjector {
    #[must_use]
    pub fn new(bounds: GeoBounds, width: f64, height: f64) -> Self {
        let bounds = bounds.with_min_span();
        let scale = (width / bounds.lon_span()).min(height / bounds.lat_span());
        Self {
            bounds,
            height,
            scale,
            extra_x: (width - bounds.lon_span() * scale) / 2.0,
            extra_y: (height - bounds.lat_span() * scale) / 2.0,
        }
    }

    /// Projector over the bounds of `points`, or the default box when there are none
    pub fn fit<'a>(points: impl IntoIterator<Item = &'a LatLon>, width: f64, height: f64) -> Self {
        Self::new(GeoBounds::from_points(points).unwrap_or_default(), width, height)
    }
}

impl GeoProjector for BoundsProjector {
    fn project(&self, position: LatLon) -> ScreenPoint {
        let x = (position.lon - self.bounds.min_lon) * self.scale + self.extra_x;
        let y = self.height - ((position.lat - self.bounds.min_lat) * self.scale + self.extra_y);
        ScreenPoint::new(x, y)
    }
}

/// CSS size of the canvas plus its device-pixel backing store size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub css_width: f64,
    pub css_height: f64,
    pub device_pixel_ratio: f64,
    pub backing_width: u32,
    pub backing_height: u32,
}

impl CanvasSize {
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> Self {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        let css_width = if css_width.is_finite() { css_width.max(0.0) } else { 0.0 };
        let css_height = if css_height.is_finite() { css_height.max(0.0) } else { 0.0 };

        Self {
            css_width,
            css_height,
            device_pixel_ratio: dpr,
            backing_width: (css_width * dpr).round() as u32,
            backing_height: (css_height * dpr).round() as u32,
        }
    }

    /// A zero-sized container means layout has not happened yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backing_width == 0 || self.backing_height == 0
    }
}
