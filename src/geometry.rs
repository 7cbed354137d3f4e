use crate::constants::EARTH_RADIUS_KM;
use serde::{Deserialize, Serialize};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Linear interpolation in degrees; adequate for the sub-kilometre hops between two polls.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }
}

/// A point in CSS pixel space of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Great-circle distance between two positions in kilometres (haversine formula).
///
/// # Examples
/// ```
/// use transit_flow::geometry::{haversine_km, LatLon};
///
/// let a = LatLon::new(28.6139, 77.2090);
/// assert_eq!(haversine_km(a, a), 0.0);
/// ```
#[must_use]
pub fn haversine_km(a: LatLon, b: LatLon) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Total length of a polyline in kilometres
#[must_use]
pub fn polyline_length_km(points: &[LatLon]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_km(pair[0], pair[1]))
        .sum()
}

/// Evaluates a quadratic Bézier curve at `t` in [0, 1].
#[must_use]
pub fn quadratic_point(start: ScreenPoint, control: ScreenPoint, end: ScreenPoint, t: f64) -> ScreenPoint {
    let u = 1.0 - t;
    ScreenPoint {
        x: u * u * start.x + 2.0 * u * t * control.x + t * t * end.x,
        y: u * u * start.y + 2.0 * u * t * control.y + t * t * end.y,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Moves north by `km` along a meridian
    pub(crate) fn offset_north_km(origin: LatLon, km: f64) -> LatLon {
        LatLon {
            lat: origin.lat + (km / EARTH_RADIUS_KM).to_degrees(),
            lon: origin.lon,
        }
    }

    #[test]
    fn test_haversine_zero_distance() {
        let p = LatLon::new(28.6, 77.2);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        let a = LatLon::new(0.0, 0.0);
        let b = LatLon::new(1.0, 0.0);
        // One degree of arc on a 6371 km sphere
        assert!((haversine_km(a, b) - 111.194_9).abs() < 1e-3);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = LatLon::new(28.61, 77.20);
        let b = LatLon::new(28.70, 77.10);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-12);
    }

    #[test]
    fn test_offset_north_matches_haversine() {
        let origin = LatLon::new(28.6, 77.2);
        let moved = offset_north_km(origin, 0.1);
        assert!((haversine_km(origin, moved) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_polyline_length() {
        let origin = LatLon::new(28.6, 77.2);
        let a = offset_north_km(origin, 1.0);
        let b = offset_north_km(a, 2.0);
        assert!((polyline_length_km(&[origin, a, b]) - 3.0).abs() < 1e-9);
        assert_eq!(polyline_length_km(&[origin]), 0.0);
        assert_eq!(polyline_length_km(&[]), 0.0);
    }

    #[test]
    fn test_quadratic_endpoints_and_midpoint() {
        let start = ScreenPoint::new(0.0, 0.0);
        let control = ScreenPoint::new(50.0, 100.0);
        let end = ScreenPoint::new(100.0, 0.0);
        assert_eq!(quadratic_point(start, control, end, 0.0), start);
        assert_eq!(quadratic_point(start, control, end, 1.0), end);
        let mid = quadratic_point(start, control, end, 0.5);
        assert_eq!(mid, ScreenPoint::new(50.0, 50.0));
    }

    #[test]
    fn test_screen_point_distance() {
        let a = ScreenPoint::new(0.0, 0.0);
        let b = ScreenPoint::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(a.midpoint(b), ScreenPoint::new(1.5, 2.0));
    }
}
