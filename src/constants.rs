use crate::geometry::LatLon;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Web Mercator tile edge in CSS pixels
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the spherical Mercator projection
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_6;

/// Map center used before any geometry has been loaded
pub const DEFAULT_CENTER: LatLon = LatLon { lat: 28.6139, lon: 77.2090 };

/// Zoom level used before any geometry has been loaded
pub const DEFAULT_ZOOM: f64 = 11.0;

/// Fallback bounding box (min lat, max lat, min lon, max lon) when no shape points exist
pub const DEFAULT_BOUNDS: (f64, f64, f64, f64) = (28.40, 28.90, 76.80, 77.50);

/// Smallest lat/lon span treated as non-degenerate when fitting bounds
pub const MIN_BOUNDS_SPAN_DEG: f64 = 0.0001;

/// Padding around the network when the map first fits to the loaded routes
pub const FIT_PADDING_PX: f64 = 100.0;

/// Route colors that mean "no color assigned"; such lines are never drawn
pub const NO_COLOR_SENTINELS: &[&str] = &["#000000", "black", "#0b1220"];

/// Route color used when a vehicle's route is unknown
pub const UNKNOWN_ROUTE_COLOR: &str = "#808080";

/// A station counts as lying on a route when this close (in degrees) to one of its points
pub const STATION_ROUTE_TOLERANCE_DEG: f64 = 0.002;
