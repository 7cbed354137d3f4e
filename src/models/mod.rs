mod filters;
mod flow;
mod passenger_flow;
mod route;
mod settings;
mod station;
mod vehicle;

pub use filters::{filter_arcs, FilterState, FlowDirection};
pub use flow::{format_count, FlowArc, FlowDataset, StationTotals, VisualizationStats};
pub use passenger_flow::{hour_key, PassengerFlowDataset, StationEntry};
pub use route::{is_no_color, route_color_css, RouteKind, RouteShape};
pub use settings::{EngineSettings, SETTINGS_ELEMENT_ID};
pub use station::{resolve_line_color, Station, DEFAULT_LINE_COLOR};
pub use vehicle::LiveVehicle;

/// Month available in the OD flow feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthOption {
    pub value: String,
    pub label: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub(crate) use super::flow::tests::{arc, sample_dataset, station};
    pub(crate) use super::vehicle::tests::vehicle;
    pub(crate) use crate::geometry::tests::offset_north_km;
}
