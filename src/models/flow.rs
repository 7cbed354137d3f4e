use super::station::Station;
use indexmap::IndexMap;
use std::cmp::Reverse;

/// Directional origin-destination passenger volume between two stations.
///
/// The normalized value is deliberately not a field: it is derived from
/// `value` by the owning [`FlowDataset`] so the two can never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowArc {
    pub origin: Station,
    pub destination: Station,
    pub value: u64,
}

impl FlowArc {
    #[must_use]
    pub fn new(origin: Station, destination: Station, value: u64) -> Self {
        Self { origin, destination, value }
    }

    #[must_use]
    pub fn touches(&self, station: &str) -> bool {
        self.origin.name == station || self.destination.name == station
    }
}

/// Aggregate passenger counts for one station in the OD view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StationTotals {
    pub origin_total: u64,
    pub destination_total: u64,
    /// Passengers travelling from the selected station to this one
    pub from_selected: u64,
    /// Passengers travelling from this station to the selected one
    pub to_selected: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisualizationStats {
    pub total_passengers: u64,
    pub total_flows: usize,
    pub top_origins: Vec<(String, u64)>,
    pub top_destinations: Vec<(String, u64)>,
    pub top_pairs: Vec<(String, String, u64)>,
}

/// One month of OD flows plus the stations they reference.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowDataset {
    month: Option<String>,
    arcs: Vec<FlowArc>,
    stations: IndexMap<String, Station>,
    max_value: u64,
}

impl FlowDataset {
    /// Build a dataset; stations are collected from the arcs, first occurrence wins.
    #[must_use]
    pub fn new(month: Option<String>, arcs: Vec<FlowArc>) -> Self {
        let mut stations = IndexMap::new();
        for arc in &arcs {
            stations
                .entry(arc.origin.name.clone())
                .or_insert_with(|| arc.origin.clone());
            stations
                .entry(arc.destination.name.clone())
                .or_insert_with(|| arc.destination.clone());
        }

        let max_value = arcs.iter().map(|arc| arc.value).max().unwrap_or(0);

        Self {
            month,
            arcs,
            stations,
            max_value,
        }
    }

    #[must_use]
    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }

    #[must_use]
    pub fn arcs(&self) -> &[FlowArc] {
        &self.arcs
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    #[must_use]
    pub fn station(&self, name: &str) -> Option<&Station> {
        self.stations.get(name)
    }

    #[must_use]
    pub fn max_value(&self) -> u64 {
        self.max_value
    }

    /// `value / max(value)` over this dataset, in [0, 1]. An all-zero dataset yields 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn normalized_value(&self, arc: &FlowArc) -> f64 {
        if self.max_value == 0 {
            return 0.0;
        }
        (arc.value as f64 / self.max_value as f64).min(1.0)
    }

    /// Per-station totals; the selected station adds the directional breakdown.
    #[must_use]
    pub fn station_totals(&self, selected: Option<&str>) -> IndexMap<String, StationTotals> {
        let mut totals: IndexMap<String, StationTotals> = self
            .stations
            .keys()
            .map(|name| (name.clone(), StationTotals::default()))
            .collect();

        for arc in &self.arcs {
            let origin = arc.origin.name.as_str();
            let destination = arc.destination.name.as_str();

            if let Some(entry) = totals.get_mut(origin) {
                entry.origin_total += arc.value;
                if selected == Some(destination) {
                    entry.to_selected += arc.value;
                }
            }
            if let Some(entry) = totals.get_mut(destination) {
                entry.destination_total += arc.value;
                if selected == Some(origin) {
                    entry.from_selected += arc.value;
                }
            }
        }

        totals
    }

    #[must_use]
    pub fn stats(&self) -> VisualizationStats {
        if self.arcs.is_empty() {
            return VisualizationStats::default();
        }

        let mut origins: IndexMap<&str, u64> = IndexMap::new();
        let mut destinations: IndexMap<&str, u64> = IndexMap::new();
        let mut total_passengers = 0;

        for arc in &self.arcs {
            total_passengers += arc.value;
            *origins.entry(arc.origin.name.as_str()).or_default() += arc.value;
            *destinations.entry(arc.destination.name.as_str()).or_default() += arc.value;
        }

        let mut top_pairs: Vec<(String, String, u64)> = self
            .arcs
            .iter()
            .map(|arc| (arc.origin.name.clone(), arc.destination.name.clone(), arc.value))
            .collect();
        top_pairs.sort_by_key(|(_, _, value)| Reverse(*value));

        VisualizationStats {
            total_passengers,
            total_flows: self.arcs.len(),
            top_origins: ranked(origins),
            top_destinations: ranked(destinations),
            top_pairs,
        }
    }
}

fn ranked(totals: IndexMap<&str, u64>) -> Vec<(String, u64)> {
    let mut ranked: Vec<(String, u64)> = totals
        .into_iter()
        .map(|(name, total)| (name.to_string(), total))
        .collect();
    ranked.sort_by_key(|(_, total)| Reverse(*total));
    ranked
}

/// Compact passenger count for panels: `4.6M`, `12.3K`, `950`
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_count(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::LatLon;

    pub(crate) fn station(name: &str, lat: f64, lon: f64) -> Station {
        Station::new(name, LatLon::new(lat, lon), Some("Blue"))
    }

    pub(crate) fn arc(from: &str, to: &str, value: u64) -> FlowArc {
        FlowArc::new(station(from, 28.60, 77.20), station(to, 28.70, 77.10), value)
    }

    pub(crate) fn sample_dataset() -> FlowDataset {
        FlowDataset::new(
            Some("DEC24".to_string()),
            vec![
                arc("A", "B", 1000),
                arc("B", "A", 250),
                arc("A", "C", 40),
                arc("C", "B", 600),
            ],
        )
    }

    #[test]
    fn test_stations_collected_once_by_name() {
        let dataset = sample_dataset();
        let names: Vec<_> = dataset.stations().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_normalized_value_bounds() {
        let dataset = sample_dataset();
        for arc in dataset.arcs() {
            let normalized = dataset.normalized_value(arc);
            assert!((0.0..=1.0).contains(&normalized));
            assert_eq!(normalized == 1.0, arc.value == dataset.max_value());
        }
    }

    #[test]
    fn test_normalized_value_recomputed_per_dataset() {
        let first = FlowDataset::new(None, vec![arc("A", "B", 500), arc("B", "A", 250)]);
        let second = FlowDataset::new(None, vec![arc("A", "B", 500), arc("B", "A", 2000)]);
        let probe = arc("A", "B", 500);
        assert_eq!(first.normalized_value(&probe), 1.0);
        assert_eq!(second.normalized_value(&probe), 0.25);
    }

    #[test]
    fn test_all_zero_dataset_normalizes_to_zero() {
        let dataset = FlowDataset::new(None, vec![arc("A", "B", 0)]);
        assert_eq!(dataset.max_value(), 0);
        assert_eq!(dataset.normalized_value(&dataset.arcs()[0]), 0.0);
    }

    #[test]
    fn test_station_totals_with_selection() {
        let dataset = sample_dataset();
        let totals = dataset.station_totals(Some("A"));

        let a = totals["A"];
        assert_eq!(a.origin_total, 1040);
        assert_eq!(a.destination_total, 250);

        let b = totals["B"];
        assert_eq!(b.from_selected, 1000);
        assert_eq!(b.to_selected, 250);

        let c = totals["C"];
        assert_eq!(c.from_selected, 40);
        assert_eq!(c.to_selected, 0);
    }

    #[test]
    fn test_stats_rankings() {
        let stats = sample_dataset().stats();
        assert_eq!(stats.total_passengers, 1890);
        assert_eq!(stats.total_flows, 4);
        assert_eq!(stats.top_origins[0], ("A".to_string(), 1040));
        assert_eq!(stats.top_destinations[0], ("B".to_string(), 1600));
        assert_eq!(stats.top_pairs[0], ("A".to_string(), "B".to_string(), 1000));
        assert_eq!(stats.top_pairs.last().map(|p| p.2), Some(40));
    }

    #[test]
    fn test_empty_stats() {
        assert_eq!(FlowDataset::default().stats(), VisualizationStats::default());
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(950), "950");
        assert_eq!(format_count(12_345), "12.3K");
        assert_eq!(format_count(4_630_000), "4.6M");
    }
}
