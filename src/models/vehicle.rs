use crate::geometry::LatLon;
use crate::time::ServiceWindow;
use chrono::NaiveTime;

/// One live trip as reported by a single poll. Never mutated; the next poll supersedes it.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveVehicle {
    pub trip_id: String,
    pub route_id: String,
    pub position: LatLon,
    /// Percentage along the trip, 0..=100
    pub progress: f64,
    pub from_stop: String,
    pub next_stop: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl LiveVehicle {
    #[must_use]
    pub fn service_window(&self) -> ServiceWindow {
        ServiceWindow::new(self.start_time, self.end_time)
    }

    #[must_use]
    pub fn is_active_at(&self, now: NaiveTime) -> bool {
        self.service_window().contains(now)
    }
}
