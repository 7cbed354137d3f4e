use super::station::Station;
use crate::constants::{NO_COLOR_SENTINELS, UNKNOWN_ROUTE_COLOR};
use crate::geometry::{polyline_length_km, LatLon};
use std::rc::Rc;

const METRO_COLORS: &[(&str, &str)] = &[
    ("RED", "#FF0000"),
    ("YELLOW", "#FFD500"),
    ("BLUE", "#1E90FF"),
    ("GREEN", "#008000"),
    ("VIOLET", "#9400D3"),
    ("PINK", "#ff66b2"),
    ("MAGENTA", "#FF00FF"),
    ("ORANGE", "#FFA500"),
    ("AQUA", "#00FFFF"),
    ("GREY", "#94a3b8"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Metro,
    Rapid,
    Bus,
}

impl RouteKind {
    /// Infer the kind from the route's raw color key ("RAPID", "GRAY", "BLUE", …)
    #[must_use]
    pub fn infer(color_key: &str) -> Self {
        let key = color_key.to_ascii_uppercase();
        if key.contains("RAPID") {
            Self::Rapid
        } else if key.contains("GRAY") || key.contains("GREY") || key.contains("BUS") {
            Self::Bus
        } else {
            Self::Metro
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Metro => "metro",
            Self::Rapid => "rapid",
            Self::Bus => "bus",
        }
    }
}

/// Resolve a route color key through the metro palette.
///
/// `GRAY` is folded to `GREY`, any key mentioning `RAPID` is aqua, and an
/// unknown key falls back to grey. CSS colors and no-color sentinels pass
/// through unchanged.
#[must_use]
pub fn route_color_css(color_key: &str) -> String {
    let trimmed = color_key.trim();
    if is_no_color(trimmed) || trimmed.starts_with('#') || trimmed.starts_with("rgb") || trimmed.starts_with("hsl") {
        return trimmed.to_string();
    }

    let key = trimmed.to_ascii_uppercase().replace("GRAY", "GREY");
    let lookup = |name: &str| {
        METRO_COLORS
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, css)| (*css).to_string())
    };

    lookup(&key)
        .or_else(|| key.contains("RAPID").then(|| lookup("AQUA")).flatten())
        .unwrap_or_else(|| UNKNOWN_ROUTE_COLOR.to_string())
}

/// Whether a color string marks a line that should not be drawn at all
#[must_use]
pub fn is_no_color(color: &str) -> bool {
    let color = color.trim();
    color.is_empty()
        || NO_COLOR_SENTINELS
            .iter()
            .any(|sentinel| sentinel.eq_ignore_ascii_case(color))
}

/// A route polyline with its stops, ready for drawing and particle spawning.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteShape {
    pub id: String,
    pub name: String,
    /// Resolved CSS color
    pub color: String,
    pub kind: RouteKind,
    /// Shared with the particle paths spawned along it
    pub path: Rc<[LatLon]>,
    pub stations: Vec<Station>,
}

impl RouteShape {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, color_key: &str, path: Vec<LatLon>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: route_color_css(color_key),
            kind: RouteKind::infer(color_key),
            path: path.into(),
            stations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_stations(mut self, stations: Vec<Station>) -> Self {
        self.stations = stations;
        self
    }

    /// Degenerate (fewer than two points) and sentinel-colored lines are skipped
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.path.len() >= 2 && !is_no_color(&self.color)
    }

    #[must_use]
    pub fn length_km(&self) -> f64 {
        polyline_length_km(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_color_palette() {
        assert_eq!(route_color_css("Blue"), "#1E90FF");
        assert_eq!(route_color_css("GRAY"), "#94a3b8");
        assert_eq!(route_color_css("RAPID_METRO"), "#00FFFF");
        assert_eq!(route_color_css("CHARTREUSE"), UNKNOWN_ROUTE_COLOR);
        assert_eq!(route_color_css("#0b1220"), "#0b1220");
        assert_eq!(route_color_css("black"), "black");
    }

    #[test]
    fn test_route_kind_inference() {
        assert_eq!(RouteKind::infer("RAPID"), RouteKind::Rapid);
        assert_eq!(RouteKind::infer("gray"), RouteKind::Bus);
        assert_eq!(RouteKind::infer("Yellow"), RouteKind::Metro);
        assert_eq!(RouteKind::Rapid.label(), "rapid");
    }

    #[test]
    fn test_sentinel_colors_not_drawable() {
        let path = vec![LatLon::new(28.6, 77.2), LatLon::new(28.7, 77.3)];
        for sentinel in ["#000000", "black", "#0B1220", ""] {
            let route = RouteShape::new("r", "R", sentinel, path.clone());
            assert!(!route.is_drawable(), "{sentinel} should be skipped");
        }
        assert!(RouteShape::new("r", "R", "Blue", path).is_drawable());
    }

    #[test]
    fn test_single_point_route_not_drawable() {
        let route = RouteShape::new("r", "R", "Blue", vec![LatLon::new(28.6, 77.2)]);
        assert!(!route.is_drawable());
        assert_eq!(route.length_km(), 0.0);
    }
}
