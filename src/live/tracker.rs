use super::sequencer::{RequestSequencer, RequestTicket};
use super::speed::{FleetMotion, SpeedModel, VehicleMotion};
use crate::api::FetchError;
use crate::geometry::LatLon;
use crate::models::LiveVehicle;
use chrono::{NaiveDateTime, NaiveTime};
use indexmap::IndexMap;

/// The vehicles of one successful poll, keyed by trip id in feed order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub vehicles: IndexMap<String, LiveVehicle>,
    pub received_at: Option<NaiveDateTime>,
}

impl Snapshot {
    /// Duplicate trip ids keep the last record of the feed
    #[must_use]
    pub fn new(vehicles: Vec<LiveVehicle>, received_at: NaiveDateTime) -> Self {
        Self {
            vehicles: vehicles
                .into_iter()
                .map(|vehicle| (vehicle.trip_id.clone(), vehicle))
                .collect(),
            received_at: Some(received_at),
        }
    }

    #[must_use]
    pub fn get(&self, trip_id: &str) -> Option<&LiveVehicle> {
        self.vehicles.get(trip_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

/// The live snapshot and the one it replaced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotBuffer {
    pub previous: Snapshot,
    pub current: Snapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollStatus {
    pub loading: bool,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub last_success: Option<NaiveDateTime>,
}

impl PollStatus {
    /// The displayed vehicles are from an older poll than the last attempt
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }
}

/// Marker for one active vehicle, gliding from its previous fix to its current one
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleGlyph {
    pub trip_id: String,
    pub route_id: String,
    pub from: LatLon,
    pub to: LatLon,
    pub fix_at: Option<NaiveDateTime>,
    pub glide_secs: f64,
    pub stopped: bool,
}

impl VehicleGlyph {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn position_at(&self, now: NaiveDateTime) -> LatLon {
        let Some(fix_at) = self.fix_at else {
            return self.to;
        };
        if self.glide_secs <= 0.0 {
            return self.to;
        }
        let elapsed = (now - fix_at).num_milliseconds() as f64 / 1000.0;
        self.from.lerp(self.to, (elapsed / self.glide_secs).clamp(0.0, 1.0))
    }
}

/// Polled live positions with previous/current double buffering.
///
/// A poll takes a ticket with [`begin_poll`](Self::begin_poll) and reports back with
/// [`apply_poll`](Self::apply_poll) or [`record_failure`](Self::record_failure).
/// Responses that arrive after a newer one has been applied are dropped.
#[derive(Debug, Clone)]
pub struct LiveVehicleTracker {
    sequencer: RequestSequencer,
    buffer: SnapshotBuffer,
    status: PollStatus,
    model: SpeedModel,
    poll_interval_secs: f64,
}

impl LiveVehicleTracker {
    #[must_use]
    pub fn new(model: SpeedModel, poll_interval_secs: f64) -> Self {
        Self {
            sequencer: RequestSequencer::new(),
            buffer: SnapshotBuffer::default(),
            status: PollStatus::default(),
            model,
            poll_interval_secs,
        }
    }

    #[must_use]
    pub fn buffer(&self) -> &SnapshotBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn status(&self) -> &PollStatus {
        &self.status
    }

    #[must_use]
    pub fn model(&self) -> &SpeedModel {
        &self.model
    }

    pub fn begin_poll(&mut self) -> RequestTicket {
        self.status.loading = true;
        self.sequencer.issue()
    }

    fn finish(&mut self, ticket: RequestTicket) {
        if self.sequencer.is_latest(ticket) {
            self.status.loading = false;
        }
    }

    /// Install a poll result. The outgoing current snapshot becomes `previous`
    /// in the same assignment that installs the new one.
    ///
    /// Returns `false` when a newer poll has already been applied.
    pub fn apply_poll(&mut self, ticket: RequestTicket, vehicles: Vec<LiveVehicle>, now: NaiveDateTime) -> bool {
        self.finish(ticket);
        if !self.sequencer.accept(ticket) {
            crate::log!("Dropping out-of-order live poll");
            return false;
        }

        let old = std::mem::take(&mut self.buffer);
        self.buffer = SnapshotBuffer {
            previous: old.current,
            current: Snapshot::new(vehicles, now),
        };

        self.status.last_error = None;
        self.status.consecutive_failures = 0;
        self.status.last_success = Some(now);
        true
    }

    /// Record a failed poll; the buffer, and so the display, stays as it was
    pub fn record_failure(&mut self, ticket: RequestTicket, error: &FetchError) {
        self.finish(ticket);
        if !self.sequencer.is_current(ticket) {
            return;
        }
        if !error.is_transient() {
            leptos::logging::warn!("Live poll failed: {error}");
        }
        self.status.last_error = Some(error.to_string());
        self.status.consecutive_failures += 1;
    }

    /// Seconds between the two buffered snapshots, or the poll interval when unknown
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn elapsed_secs(&self) -> f64 {
        match (self.buffer.previous.received_at, self.buffer.current.received_at) {
            (Some(previous), Some(current)) => {
                let secs = (current - previous).num_milliseconds() as f64 / 1000.0;
                if secs > 0.0 { secs } else { self.poll_interval_secs }
            }
            _ => self.poll_interval_secs,
        }
    }

    /// Current vehicles whose service window contains `now`
    pub fn active_vehicles(&self, now: NaiveTime) -> impl Iterator<Item = &LiveVehicle> {
        self.buffer
            .current
            .vehicles
            .values()
            .filter(move |vehicle| vehicle.is_active_at(now))
    }

    #[must_use]
    pub fn motion(&self, vehicle: &LiveVehicle) -> VehicleMotion {
        self.model.motion(
            self.buffer.previous.get(&vehicle.trip_id),
            vehicle,
            self.elapsed_secs(),
        )
    }

    #[must_use]
    pub fn fleet_motion(&self, now: NaiveTime) -> FleetMotion {
        let motions: Vec<VehicleMotion> = self
            .active_vehicles(now)
            .map(|vehicle| self.motion(vehicle))
            .collect();
        FleetMotion::from_motions(&self.model, &motions)
    }

    #[must_use]
    pub fn glyphs(&self, now: NaiveTime) -> Vec<VehicleGlyph> {
        let glide_secs = self.poll_interval_secs;
        self.active_vehicles(now)
            .map(|vehicle| {
                let previous = self.buffer.previous.get(&vehicle.trip_id);
                VehicleGlyph {
                    trip_id: vehicle.trip_id.clone(),
                    route_id: vehicle.route_id.clone(),
                    from: previous.map_or(vehicle.position, |p| p.position),
                    to: vehicle.position,
                    fix_at: self.buffer.current.received_at,
                    glide_secs,
                    stopped: self.motion(vehicle).stopped,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{offset_north_km, vehicle};
    use chrono::{Duration, NaiveDate};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 12, 2)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .expect("valid datetime")
    }

    fn tracker() -> LiveVehicleTracker {
        LiveVehicleTracker::new(SpeedModel::default(), 3.0)
    }

    fn origin() -> LatLon {
        LatLon::new(28.6, 77.2)
    }

    #[test]
    fn test_previous_is_the_snapshot_live_before_the_poll() {
        let mut tracker = tracker();
        let first = tracker.begin_poll();
        assert!(tracker.apply_poll(first, vec![vehicle("T1", origin(), 10.0)], at(8, 0, 0)));
        let second = tracker.begin_poll();
        assert!(tracker.apply_poll(second, vec![vehicle("T1", offset_north_km(origin(), 0.1), 11.0)], at(8, 0, 4)));

        let buffer = tracker.buffer();
        assert_eq!(buffer.previous.get("T1").map(|v| v.progress), Some(10.0));
        assert_eq!(buffer.current.get("T1").map(|v| v.progress), Some(11.0));
        assert_eq!(tracker.elapsed_secs(), 4.0);

        let motion = tracker.motion(buffer.current.get("T1").expect("present"));
        assert!(motion.measured);
        assert!((motion.speed_kmh - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_failed_poll_keeps_buffer_and_sets_flag() {
        let mut tracker = tracker();
        let ok = tracker.begin_poll();
        tracker.apply_poll(ok, vec![vehicle("T1", origin(), 10.0)], at(8, 0, 0));
        let before = tracker.buffer().clone();

        let failing = tracker.begin_poll();
        tracker.record_failure(failing, &FetchError::Status(502));
        assert_eq!(tracker.buffer(), &before);
        assert!(tracker.status().is_stale());
        assert_eq!(tracker.status().consecutive_failures, 1);
        assert!(!tracker.status().loading);

        let recovered = tracker.begin_poll();
        tracker.apply_poll(recovered, vec![vehicle("T1", origin(), 10.0)], at(8, 0, 6));
        assert!(!tracker.status().is_stale());
        assert_eq!(tracker.status().consecutive_failures, 0);
    }

    #[test]
    fn test_out_of_order_response_is_dropped() {
        let mut tracker = tracker();
        let slow = tracker.begin_poll();
        let fast = tracker.begin_poll();

        assert!(tracker.apply_poll(fast, vec![vehicle("NEW", origin(), 50.0)], at(8, 0, 3)));
        assert!(!tracker.apply_poll(slow, vec![vehicle("OLD", origin(), 10.0)], at(8, 0, 4)));
        assert!(tracker.buffer().current.get("NEW").is_some());
        assert!(tracker.buffer().previous.is_empty());

        // A late failure of the older request does not flag the fresh data as stale
        tracker.record_failure(slow, &FetchError::Network("timeout".into()));
        assert!(!tracker.status().is_stale());
    }

    #[test]
    fn test_elapsed_falls_back_to_poll_interval() {
        let mut tracker = tracker();
        assert_eq!(tracker.elapsed_secs(), 3.0);
        let first = tracker.begin_poll();
        tracker.apply_poll(first, Vec::new(), at(8, 0, 0));
        let second = tracker.begin_poll();
        tracker.apply_poll(second, Vec::new(), at(8, 0, 0));
        assert_eq!(tracker.elapsed_secs(), 3.0);
    }

    #[test]
    fn test_active_filter_uses_wall_clock() {
        let mut tracker = tracker();
        let mut night = vehicle("NIGHT", origin(), 5.0);
        night.start_time = NaiveTime::from_hms_opt(23, 30, 0).expect("valid time");
        night.end_time = NaiveTime::from_hms_opt(0, 45, 0).expect("valid time");
        let day = vehicle("DAY", origin(), 5.0);

        let ticket = tracker.begin_poll();
        tracker.apply_poll(ticket, vec![night, day], at(0, 15, 0));

        let ids = |t: NaiveTime| tracker.active_vehicles(t).map(|v| v.trip_id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(NaiveTime::from_hms_opt(0, 15, 0).expect("valid time")), vec!["NIGHT"]);
        assert!(ids(NaiveTime::from_hms_opt(1, 0, 0).expect("valid time")).is_empty());
        assert_eq!(ids(NaiveTime::from_hms_opt(12, 0, 0).expect("valid time")), vec!["DAY"]);
    }

    #[test]
    fn test_fleet_motion_and_stopped_glyph() {
        let mut tracker = tracker();
        let first = tracker.begin_poll();
        tracker.apply_poll(
            first,
            vec![vehicle("MOVING", origin(), 10.0), vehicle("HALTED", origin(), 20.0)],
            at(8, 0, 0),
        );
        let second = tracker.begin_poll();
        tracker.apply_poll(
            second,
            vec![
                vehicle("MOVING", offset_north_km(origin(), 0.05), 11.0),
                vehicle("HALTED", origin(), 20.0),
            ],
            at(8, 0, 4),
        );

        let noon = NaiveTime::from_hms_opt(12, 0, 0).expect("valid time");
        let fleet = tracker.fleet_motion(noon);
        assert_eq!(fleet.active_count, 2);
        assert_eq!(fleet.stopped_count, 1);
        assert_eq!(fleet.measured_count, 1);
        assert!((fleet.average_kmh - 45.0).abs() < 1e-3);

        let glyphs = tracker.glyphs(noon);
        let halted = glyphs.iter().find(|g| g.trip_id == "HALTED").expect("halted glyph");
        assert!(halted.stopped);
    }

    #[test]
    fn test_glyph_glides_between_fixes() {
        let to = offset_north_km(origin(), 0.3);
        let glyph = VehicleGlyph {
            trip_id: "T1".into(),
            route_id: "BLUE".into(),
            from: origin(),
            to,
            fix_at: Some(at(8, 0, 0)),
            glide_secs: 3.0,
            stopped: false,
        };

        assert_eq!(glyph.position_at(at(8, 0, 0)), origin());
        let halfway = glyph.position_at(at(8, 0, 0) + Duration::milliseconds(1500));
        assert!((halfway.lat - (origin().lat + to.lat) / 2.0).abs() < 1e-12);
        assert_eq!(glyph.position_at(at(8, 0, 10)), to);
    }
}
