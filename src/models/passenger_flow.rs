use super::station::Station;
use crate::constants::STATION_ROUTE_TOLERANCE_DEG;
use crate::geometry::LatLon;
use std::collections::HashMap;

/// Boarding (entry) and alighting (exit) counts at one station for one hour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationEntry {
    pub station: String,
    pub entry: u64,
    pub exit: u64,
}

impl StationEntry {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entry + self.exit
    }
}

/// Hourly station flow for one month, keyed by `"<month>-<hour>"` as served by the backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PassengerFlowDataset {
    month: String,
    stations: Vec<Station>,
    hourly: HashMap<String, Vec<StationEntry>>,
    max_flow: u64,
}

#[must_use]
pub fn hour_key(month: &str, hour: u32) -> String {
    format!("{month}-{hour}")
}

impl PassengerFlowDataset {
    /// The maximum is the larger of the server's `maxFlow` and the busiest entry present.
    #[must_use]
    pub fn new(
        month: impl Into<String>,
        stations: Vec<Station>,
        hourly: HashMap<String, Vec<StationEntry>>,
        reported_max: u64,
    ) -> Self {
        let observed_max = hourly
            .values()
            .flatten()
            .map(StationEntry::total)
            .max()
            .unwrap_or(0);

        Self {
            month: month.into(),
            stations,
            hourly,
            max_flow: reported_max.max(observed_max),
        }
    }

    #[must_use]
    pub fn month(&self) -> &str {
        &self.month
    }

    #[must_use]
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    #[must_use]
    pub fn max_flow(&self) -> u64 {
        self.max_flow
    }

    /// Entries for an hour of the day; an hour without data is empty, not an error.
    #[must_use]
    pub fn entries_for_hour(&self, hour: u32) -> &[StationEntry] {
        self.hourly
            .get(&hour_key(&self.month, hour % 24))
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn hour_totals(&self, hour: u32) -> HashMap<&str, &StationEntry> {
        self.entries_for_hour(hour)
            .iter()
            .map(|entry| (entry.station.as_str(), entry))
            .collect()
    }

    /// `(entry + exit) / maxFlow` for one station in one hour
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn station_intensity(&self, entry: &StationEntry) -> f64 {
        if self.max_flow == 0 {
            return 0.0;
        }
        (entry.total() as f64 / self.max_flow as f64).min(1.0)
    }

    /// Intensity of a route polyline in an hour: combined flow of the stations lying on it.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn route_intensity(&self, path: &[LatLon], hour: u32) -> f64 {
        if self.max_flow == 0 || path.len() < 2 {
            return 0.0;
        }

        let totals = self.hour_totals(hour);
        let route_flow: u64 = self
            .stations
            .iter()
            .filter(|station| station_on_path(station.position, path))
            .filter_map(|station| totals.get(station.name.as_str()))
            .map(|entry| entry.total())
            .sum();

        (route_flow as f64 / self.max_flow as f64).min(1.0)
    }
}

fn station_on_path(position: LatLon, path: &[LatLon]) -> bool {
    path.iter().any(|point| {
        (point.lat - position.lat).abs() < STATION_ROUTE_TOLERANCE_DEG
            && (point.lon - position.lon).abs() < STATION_ROUTE_TOLERANCE_DEG
    })
}
