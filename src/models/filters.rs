use super::flow::{FlowArc, FlowDataset};

/// Which arcs of the selected station are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowDirection {
    /// Arcs leaving the selected station
    Outbound,
    /// Arcs arriving at the selected station
    Inbound,
    #[default]
    Both,
}

impl FlowDirection {
    pub const ALL: [Self; 3] = [Self::Outbound, Self::Inbound, Self::Both];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Outbound => "Outbound",
            Self::Inbound => "Inbound",
            Self::Both => "Both",
        }
    }

    #[must_use]
    pub fn admits(self, arc: &FlowArc, selected: &str) -> bool {
        match self {
            Self::Outbound => arc.origin.name == selected,
            Self::Inbound => arc.destination.name == selected,
            Self::Both => arc.touches(selected),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub selected_station: Option<String>,
    pub min_passengers: u64,
    pub direction: FlowDirection,
    /// Multiplier applied to particle speed and the hourly autoplay cadence
    pub animation_speed: f64,
    pub is_playing: bool,
    pub month: Option<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            selected_station: None,
            min_passengers: 0,
            direction: FlowDirection::Both,
            animation_speed: 1.0,
            is_playing: true,
            month: None,
        }
    }
}

impl FilterState {
    /// Selecting the already selected station clears the selection
    pub fn toggle_station(&mut self, name: &str) {
        if self.selected_station.as_deref() == Some(name) {
            self.selected_station = None;
        } else {
            self.selected_station = Some(name.to_string());
        }
    }
}

/// Arcs passing the passenger threshold and, with a station selected, the direction constraint.
///
/// A fresh vector is derived on every call; the dataset is never modified.
#[must_use]
pub fn filter_arcs(dataset: &FlowDataset, filters: &FilterState) -> Vec<FlowArc> {
    dataset
        .arcs()
        .iter()
        .filter(|arc| arc.value >= filters.min_passengers)
        .filter(|arc| {
            filters
                .selected_station
                .as_deref()
                .is_none_or(|selected| filters.direction.admits(arc, selected))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::flow::tests::sample_dataset;

    fn pairs(arcs: &[FlowArc]) -> Vec<(&str, &str)> {
        arcs.iter()
            .map(|arc| (arc.origin.name.as_str(), arc.destination.name.as_str()))
            .collect()
    }

    #[test]
    fn test_no_filters_keeps_everything() {
        let dataset = sample_dataset();
        assert_eq!(filter_arcs(&dataset, &FilterState::default()).len(), 4);
    }

    #[test]
    fn test_min_passengers_threshold_is_inclusive() {
        let dataset = sample_dataset();
        let filters = FilterState { min_passengers: 250, ..FilterState::default() };
        let arcs = filter_arcs(&dataset, &filters);
        assert_eq!(pairs(&arcs), vec![("A", "B"), ("B", "A"), ("C", "B")]);
    }

    #[test]
    fn test_direction_with_selection() {
        let dataset = sample_dataset();
        let mut filters = FilterState {
            selected_station: Some("B".to_string()),
            direction: FlowDirection::Outbound,
            ..FilterState::default()
        };
        assert_eq!(pairs(&filter_arcs(&dataset, &filters)), vec![("B", "A")]);

        filters.direction = FlowDirection::Inbound;
        assert_eq!(pairs(&filter_arcs(&dataset, &filters)), vec![("A", "B"), ("C", "B")]);

        filters.direction = FlowDirection::Both;
        assert_eq!(
            pairs(&filter_arcs(&dataset, &filters)),
            vec![("A", "B"), ("B", "A"), ("C", "B")]
        );
    }

    #[test]
    fn test_direction_ignored_without_selection() {
        let dataset = sample_dataset();
        let filters = FilterState { direction: FlowDirection::Outbound, ..FilterState::default() };
        assert_eq!(filter_arcs(&dataset, &filters).len(), 4);
    }

    #[test]
    fn test_filter_does_not_touch_dataset() {
        let dataset = sample_dataset();
        let filters = FilterState { min_passengers: 10_000, ..FilterState::default() };
        assert!(filter_arcs(&dataset, &filters).is_empty());
        assert_eq!(dataset.arcs().len(), 4);
    }

    #[test]
    fn test_toggle_station() {
        let mut filters = FilterState::default();
        filters.toggle_station("A");
        assert_eq!(filters.selected_station.as_deref(), Some("A"));
        filters.toggle_station("B");
        assert_eq!(filters.selected_station.as_deref(), Some("B"));
        filters.toggle_station("B");
        assert_eq!(filters.selected_station, None);
    }
}
