//! Wire records exactly as the backend serves them, and the one place they
//! are turned into model types. Nothing outside this module looks at raw
//! field names.

use crate::geometry::LatLon;
use crate::models::{
    FlowArc, FlowDataset, LiveVehicle, MonthOption, PassengerFlowDataset, RouteShape, Station,
    StationEntry,
};
use crate::time::parse_time_hms;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct LiveVehicleRecord {
    pub trip_id: String,
    #[serde(default)]
    pub route_id: String,
    #[serde(default)]
    pub progress: f64,
    pub current_lat: Option<f64>,
    pub current_lon: Option<f64>,
    #[serde(default)]
    pub from_stop: Option<String>,
    #[serde(default)]
    pub to_stop: Option<String>,
    #[serde(default)]
    pub next_stop: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OdStationRecord {
    pub name: String,
    pub lat: Option<f64>,
    #[serde(alias = "lon")]
    pub lng: Option<f64>,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub line_color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OdArcRecord {
    pub origin: OdStationRecord,
    pub destination: OdStationRecord,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OdFlowRecord {
    #[serde(default)]
    pub arcs: Vec<OdArcRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthRecord {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlowStationRecord {
    pub name: String,
    pub lat: Option<f64>,
    #[serde(alias = "lng")]
    pub lon: Option<f64>,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub line_color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationEntryRecord {
    pub station: String,
    #[serde(default)]
    pub entry: f64,
    #[serde(default)]
    pub exit: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PassengerFlowRecord {
    #[serde(default)]
    pub stations: Vec<FlowStationRecord>,
    #[serde(default, rename = "hourlyData")]
    pub hourly_data: HashMap<String, Vec<StationEntryRecord>>,
    #[serde(default, rename = "maxFlow")]
    pub max_flow: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteRecord {
    pub route_id: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub clean_name: Option<String>,
    #[serde(default)]
    pub route_short_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoutePageRecord {
    #[serde(default)]
    pub results: Vec<RouteRecord>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShapePointRecord {
    pub shape_pt_lat: f64,
    pub shape_pt_lon: f64,
    #[serde(default)]
    pub shape_pt_sequence: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteShapeRecord {
    #[serde(default)]
    pub shape_path: Vec<ShapePointRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteStopRecord {
    #[serde(default)]
    pub stop_sequence: f64,
    #[serde(alias = "stop_lat")]
    pub lat: Option<f64>,
    #[serde(alias = "stop_lon")]
    pub lon: Option<f64>,
    #[serde(default, alias = "stopName")]
    pub stop_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteStopsRecord {
    #[serde(default)]
    pub stops: Vec<RouteStopRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetroStationRecord {
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetroRouteRecord {
    pub route_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub path: Vec<[f64; 2]>,
    #[serde(default)]
    pub stations: Vec<MetroStationRecord>,
}

fn position(lat: Option<f64>, lon: Option<f64>) -> Option<LatLon> {
    let point = LatLon::new(lat?, lon?);
    (point.is_finite() && point.lat.abs() <= 90.0 && point.lon.abs() <= 180.0).then_some(point)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Normalize one live vehicle; records without a usable fix or service window are dropped.
///
/// # Errors
///
/// Returns an error naming the trip if the position or the times are unusable.
pub fn normalize_live_vehicle(record: LiveVehicleRecord) -> Result<LiveVehicle, String> {
    let position = position(record.current_lat, record.current_lon)
        .ok_or_else(|| format!("Trip {} has no valid position", record.trip_id))?;
    let start_time = parse_time_hms(&record.start_time)
        .map_err(|e| format!("Trip {} start time {:?}: {e}", record.trip_id, record.start_time))?;
    let end_time = parse_time_hms(&record.end_time)
        .map_err(|e| format!("Trip {} end time {:?}: {e}", record.trip_id, record.end_time))?;

    let next_stop = non_blank(record.next_stop)
        .or_else(|| non_blank(record.to_stop))
        .unwrap_or_default();

    Ok(LiveVehicle {
        trip_id: record.trip_id,
        route_id: record.route_id,
        position,
        progress: if record.progress.is_finite() { record.progress.clamp(0.0, 100.0) } else { 0.0 },
        from_stop: non_blank(record.from_stop).unwrap_or_default(),
        next_stop,
        start_time,
        end_time,
    })
}

#[must_use]
pub fn normalize_live_vehicles(records: Vec<LiveVehicleRecord>) -> Vec<LiveVehicle> {
    records
        .into_iter()
        .filter_map(|record| {
            normalize_live_vehicle(record)
                .map_err(|e| leptos::logging::warn!("Skipping live vehicle: {e}"))
                .ok()
        })
        .collect()
}

fn normalize_od_station(record: OdStationRecord) -> Option<Station> {
    let position = position(record.lat, record.lng)?;
    Some(
        Station::new(record.name.trim(), position, record.line_color.as_deref())
            .with_line(record.line),
    )
}

/// Normalize an OD flow response. Arcs whose stations cannot be placed are dropped.
#[must_use]
pub fn normalize_od_flow(month: Option<String>, record: OdFlowRecord) -> FlowDataset {
    let arcs = record
        .arcs
        .into_iter()
        .filter_map(|arc| {
            let value = count(arc.value);
            let origin = normalize_od_station(arc.origin)?;
            let destination = normalize_od_station(arc.destination)?;
            Some(FlowArc::new(origin, destination, value))
        })
        .collect();

    FlowDataset::new(month, arcs)
}

#[must_use]
pub fn normalize_months(records: Vec<MonthRecord>) -> Vec<MonthOption> {
    records
        .into_iter()
        .filter(|record| !record.value.trim().is_empty())
        .map(|record| {
            let label = non_blank(record.label).unwrap_or_else(|| record.value.clone());
            MonthOption { value: record.value, label }
        })
        .collect()
}

#[must_use]
pub fn normalize_passenger_flow(month: &str, record: PassengerFlowRecord) -> PassengerFlowDataset {
    let stations = record
        .stations
        .into_iter()
        .filter_map(|station| {
            let position = position(station.lat, station.lon)?;
            Some(
                Station::new(station.name.trim(), position, station.line_color.as_deref())
                    .with_line(station.line),
            )
        })
        .collect();

    let hourly = record
        .hourly_data
        .into_iter()
        .map(|(key, entries)| {
            let entries = entries
                .into_iter()
                .map(|entry| StationEntry {
                    station: entry.station.trim().to_string(),
                    entry: count(entry.entry),
                    exit: count(entry.exit),
                })
                .collect();
            (key, entries)
        })
        .collect();

    PassengerFlowDataset::new(month, stations, hourly, count(record.max_flow))
}

/// Build a route from its catalog entry, shape and stops. Points are ordered by sequence.
#[must_use]
pub fn normalize_route(route: RouteRecord, shape: RouteShapeRecord, stops: RouteStopsRecord) -> RouteShape {
    let mut points = shape.shape_path;
    points.sort_by(|a, b| a.shape_pt_sequence.total_cmp(&b.shape_pt_sequence));
    let path = points
        .into_iter()
        .filter_map(|p| position(Some(p.shape_pt_lat), Some(p.shape_pt_lon)))
        .collect();

    let color_key = route.color.unwrap_or_default();
    let name = non_blank(route.clean_name)
        .or_else(|| non_blank(route.route_short_name))
        .unwrap_or_else(|| route.route_id.clone());

    let shape = RouteShape::new(route.route_id, name, &color_key, path);

    let mut stops = stops.stops;
    stops.sort_by(|a, b| a.stop_sequence.total_cmp(&b.stop_sequence));
    let stations = stops
        .into_iter()
        .filter_map(|stop| {
            let position = position(stop.lat, stop.lon)?;
            let name = non_blank(stop.stop_name)?;
            Some(Station::new(name, position, Some(shape.color.as_str())))
        })
        .collect();

    shape.with_stations(stations)
}

/// `[lat, lon]`, or `[lon, lat]` when the first value cannot be a latitude
fn path_pair([first, second]: [f64; 2]) -> Option<LatLon> {
    if first.abs() > 90.0 {
        position(Some(second), Some(first))
    } else {
        position(Some(first), Some(second))
    }
}

#[must_use]
pub fn normalize_metro_route(record: MetroRouteRecord) -> RouteShape {
    let path = record.path.into_iter().filter_map(path_pair).collect();
    let name = non_blank(record.name).unwrap_or_else(|| record.route_id.clone());
    let color_key = record.color.unwrap_or_default();

    let shape = RouteShape::new(record.route_id, name, &color_key, path);
    let stations = record
        .stations
        .into_iter()
        .filter_map(|station| {
            let position = position(station.lat, station.lon)?;
            Some(Station::new(station.name.trim(), position, Some(shape.color.as_str())))
        })
        .collect();

    shape.with_stations(stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn live(value: serde_json::Value) -> LiveVehicleRecord {
        serde_json::from_value(value).expect("valid live record")
    }

    #[test]
    fn test_live_vehicle_normalized() {
        let vehicle = normalize_live_vehicle(live(json!({
            "trip_id": "T100",
            "route_id": "33",
            "progress": 42.5,
            "current_lat": 28.6328,
            "current_lon": 77.2197,
            "from_stop": "Rajiv Chowk",
            "to_stop": "Barakhamba Road",
            "next_stop": "",
            "start_time": "08:00:00",
            "end_time": "08:03:00"
        })))
        .expect("valid vehicle");

        assert_eq!(vehicle.trip_id, "T100");
        assert_eq!(vehicle.position, LatLon::new(28.6328, 77.2197));
        assert_eq!(vehicle.next_stop, "Barakhamba Road");
        assert_eq!(vehicle.progress, 42.5);
    }

    #[test]
    fn test_live_vehicle_without_fix_or_times_is_dropped() {
        let records = vec![
            live(json!({"trip_id": "A", "current_lat": null, "current_lon": 77.2, "start_time": "08:00:00", "end_time": "09:00:00"})),
            live(json!({"trip_id": "B", "current_lat": 28.6, "current_lon": 77.2, "start_time": "8am", "end_time": "09:00:00"})),
            live(json!({"trip_id": "C", "current_lat": 28.6, "current_lon": 77.2, "start_time": "23:30:00", "end_time": "00:45:00"})),
        ];
        let vehicles = normalize_live_vehicles(records);
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].trip_id, "C");
    }

    #[test]
    fn test_od_flow_skips_unplaceable_stations() {
        let record: OdFlowRecord = serde_json::from_value(json!({
            "arcs": [
                {
                    "origin": {"code": "1", "name": "Rajiv Chowk", "lat": 28.6328, "lng": 77.2197, "line": "Blue", "line_color": "Blue"},
                    "destination": {"code": "2", "name": "Kashmere Gate", "lat": 28.6675, "lng": 77.2283, "line_color": "Red"},
                    "value": 1000
                },
                {
                    "origin": {"name": "Nowhere", "lat": null, "lng": null},
                    "destination": {"name": "Kashmere Gate", "lat": 28.6675, "lng": 77.2283},
                    "value": 5000
                }
            ],
            "maxPassengers": 5000
        }))
        .expect("valid od record");

        let dataset = normalize_od_flow(Some("DEC24".into()), record);
        assert_eq!(dataset.arcs().len(), 1);
        assert_eq!(dataset.max_value(), 1000);
        assert_eq!(dataset.normalized_value(&dataset.arcs()[0]), 1.0);
        let origin = dataset.station("Rajiv Chowk").expect("station present");
        assert_eq!(origin.line.as_deref(), Some("Blue"));
        assert_eq!(origin.line_color, "#2563EB");
    }

    #[test]
    fn test_passenger_flow_normalized() {
        let record: PassengerFlowRecord = serde_json::from_value(json!({
            "stations": [{"id": "1", "name": "Dwarka", "lat": 28.5921, "lon": 77.0460, "line": "Blue", "line_color": "Blue"}],
            "hourlyData": {"DEC24-8": [{"station": "Dwarka", "entry": 120, "exit": 80}]},
            "maxFlow": 200
        }))
        .expect("valid passenger flow record");

        let dataset = normalize_passenger_flow("DEC24", record);
        assert_eq!(dataset.stations().len(), 1);
        assert_eq!(dataset.max_flow(), 200);
        assert_eq!(dataset.entries_for_hour(8)[0].total(), 200);
    }

    #[test]
    fn test_route_points_sorted_and_stop_aliases() {
        let route: RouteRecord = serde_json::from_value(json!({"route_id": "R1", "color": "GRAY", "clean_name": ""}))
            .expect("valid route");
        let shape: RouteShapeRecord = serde_json::from_value(json!({"shape_path": [
            {"shape_pt_lat": 28.62, "shape_pt_lon": 77.22, "shape_pt_sequence": 2},
            {"shape_pt_lat": 28.61, "shape_pt_lon": 77.21, "shape_pt_sequence": 1}
        ]}))
        .expect("valid shape");
        let stops: RouteStopsRecord = serde_json::from_value(json!({"stops": [
            {"stop_sequence": 2, "stop_lat": 28.62, "stop_lon": 77.22, "stopName": "Second"},
            {"stop_sequence": 1, "lat": 28.61, "lon": 77.21, "stop_name": "First"}
        ]}))
        .expect("valid stops");

        let route = normalize_route(route, shape, stops);
        assert_eq!(route.name, "R1");
        assert_eq!(route.path[0], LatLon::new(28.61, 77.21));
        assert_eq!(route.stations[0].name, "First");
        assert_eq!(route.stations[1].name, "Second");
        assert_eq!(route.color, "#94a3b8");
    }

    #[test]
    fn test_missing_shape_degrades_to_empty_route() {
        let route: RouteRecord = serde_json::from_value(json!({"route_id": "R2", "color": "BLUE"}))
            .expect("valid route");
        let route = normalize_route(route, RouteShapeRecord::default(), RouteStopsRecord::default());
        assert!(route.path.is_empty());
        assert!(!route.is_drawable());
    }

    #[test]
    fn test_metro_route_swaps_lon_lat_pairs() {
        let record: MetroRouteRecord = serde_json::from_value(json!({
            "route_id": "M1",
            "name": "Blue Line",
            "color": "#1E90FF",
            "path": [[28.61, 77.21], [77.22, 28.62]],
            "stations": [{"stop_id": "1", "name": "First", "lat": 28.61, "lon": 77.21}]
        }))
        .expect("valid metro route");

        let route = normalize_metro_route(record);
        assert_eq!(route.path[..], [LatLon::new(28.61, 77.21), LatLon::new(28.62, 77.22)]);
        assert_eq!(route.stations[0].line_color, "#1E90FF");
    }

    #[test]
    fn test_months_fall_back_to_value_label() {
        let months = normalize_months(vec![
            MonthRecord { value: "NOV24".into(), label: Some("NOV 2024".into()) },
            MonthRecord { value: "DEC24".into(), label: None },
            MonthRecord { value: " ".into(), label: None },
        ]);
        assert_eq!(months.len(), 2);
        assert_eq!(months[1].label, "DEC24");
    }
}
