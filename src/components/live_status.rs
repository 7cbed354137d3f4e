use crate::live::{FleetMotion, LiveVehicleTracker};
use chrono::NaiveTime;
use leptos::{component, view, IntoView, ReadSignal, RwSignal, SignalGet, SignalWith};

/// Status dot shown next to the live vehicle count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveIndicator {
    Connecting,
    Live,
    Stale,
}

impl LiveIndicator {
    #[must_use]
    pub fn for_tracker(tracker: &LiveVehicleTracker) -> Self {
        let status = tracker.status();
        if status.is_stale() {
            Self::Stale
        } else if status.last_success.is_some() {
            Self::Live
        } else {
            Self::Connecting
        }
    }

    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Connecting => "status-dot connecting",
            Self::Live => "status-dot live",
            Self::Stale => "status-dot stale",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::Live => "Live",
            Self::Stale => "Stale",
        }
    }
}

#[component]
#[must_use]
pub fn LiveStatus(tracker: RwSignal<LiveVehicleTracker>, clock: ReadSignal<NaiveTime>) -> impl IntoView {
    let fleet = move || -> FleetMotion { tracker.with(|t| t.fleet_motion(clock.get())) };
    let indicator = move || tracker.with(LiveIndicator::for_tracker);
    let last_error = move || tracker.with(|t| t.status().last_error.clone());

    view! {
        <div class="live-status">
            <div class="live-status-header">
                <span class=move || indicator().class()></span>
                <span class="live-status-label">{move || indicator().label()}</span>
                <span class="time-display">{move || clock.get().format("%H:%M:%S").to_string()}</span>
            </div>
            <div class="live-stat">
                <span class="stat-label">"Active vehicles"</span>
                <span class="stat-value">{move || fleet().active_count}</span>
            </div>
            <div class="live-stat">
                <span class="stat-label">"Average speed"</span>
                <span class="stat-value">{move || format!("{} km/h", fleet().rounded_average())}</span>
            </div>
            <div class="live-stat">
                <span class="stat-label">"Stopped"</span>
                <span class="stat-value">{move || fleet().stopped_count}</span>
            </div>
            {move || last_error().map(|error| view! { <p class="live-status-error">{error}</p> })}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchError;
    use crate::live::SpeedModel;
    use chrono::NaiveDate;

    #[test]
    fn test_indicator_follows_poll_outcomes() {
        let mut tracker = LiveVehicleTracker::new(SpeedModel::default(), 3.0);
        assert_eq!(LiveIndicator::for_tracker(&tracker), LiveIndicator::Connecting);

        let now = NaiveDate::from_ymd_opt(2024, 12, 2)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid datetime");
        let ticket = tracker.begin_poll();
        assert!(tracker.apply_poll(ticket, Vec::new(), now));
        assert_eq!(LiveIndicator::for_tracker(&tracker), LiveIndicator::Live);

        let ticket = tracker.begin_poll();
        tracker.record_failure(ticket, &FetchError::Network("offline".into()));
        assert_eq!(LiveIndicator::for_tracker(&tracker), LiveIndicator::Stale);
    }
}
