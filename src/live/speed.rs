use crate::geometry::haversine_km;
use crate::models::{EngineSettings, LiveVehicle};

/// Great-circle speed between two fixes taken `elapsed_secs` apart.
///
/// `None` when the interval is not a positive, finite duration.
#[must_use]
pub fn estimate_speed_kmh(previous: &LiveVehicle, current: &LiveVehicle, elapsed_secs: f64) -> Option<f64> {
    if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
        return None;
    }
    let distance_km = haversine_km(previous.position, current.position);
    Some(distance_km / (elapsed_secs / 3600.0))
}

/// Thresholds that decide which speed samples are believed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedModel {
    /// Progress change in percentage points that must be exceeded to count as movement
    pub progress_noise: f64,
    /// Exclusive plausibility band in km/h
    pub min_kmh: f64,
    pub max_kmh: f64,
    /// Reported when no sample survives
    pub default_kmh: f64,
}

impl Default for SpeedModel {
    fn default() -> Self {
        Self {
            progress_noise: 0.1,
            min_kmh: 5.0,
            max_kmh: 120.0,
            default_kmh: 34.0,
        }
    }
}

impl From<&EngineSettings> for SpeedModel {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            progress_noise: settings.progress_noise,
            min_kmh: settings.min_plausible_kmh,
            max_kmh: settings.max_plausible_kmh,
            default_kmh: settings.default_speed_kmh,
        }
    }
}

impl SpeedModel {
    #[must_use]
    pub fn is_plausible(&self, speed_kmh: f64) -> bool {
        speed_kmh > self.min_kmh && speed_kmh < self.max_kmh
    }

    /// An accepted speed sample, or `None` for noise-level movement and implausible speeds
    #[must_use]
    pub fn sample(&self, previous: &LiveVehicle, current: &LiveVehicle, elapsed_secs: f64) -> Option<f64> {
        if (current.progress - previous.progress).abs() <= self.progress_noise {
            return None;
        }
        estimate_speed_kmh(previous, current, elapsed_secs).filter(|speed| self.is_plausible(*speed))
    }

    /// Motion of one trip given its previous fix, if it had one
    #[must_use]
    pub fn motion(&self, previous: Option<&LiveVehicle>, current: &LiveVehicle, elapsed_secs: f64) -> VehicleMotion {
        let Some(previous) = previous else {
            return VehicleMotion::unmeasured(self.default_kmh);
        };

        let stopped = (current.progress - previous.progress).abs() < f64::EPSILON;
        match self.sample(previous, current, elapsed_secs) {
            Some(speed_kmh) => VehicleMotion { speed_kmh, measured: true, stopped },
            None => VehicleMotion { stopped, ..VehicleMotion::unmeasured(self.default_kmh) },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleMotion {
    pub speed_kmh: f64,
    /// `false` when `speed_kmh` is the default rather than a measurement
    pub measured: bool,
    /// Progress did not change since the previous poll
    pub stopped: bool,
}

impl VehicleMotion {
    #[must_use]
    pub fn unmeasured(default_kmh: f64) -> Self {
        Self { speed_kmh: default_kmh, measured: false, stopped: false }
    }
}

/// Aggregate motion of the active fleet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FleetMotion {
    pub average_kmh: f64,
    pub measured_count: usize,
    pub active_count: usize,
    pub stopped_count: usize,
}

impl FleetMotion {
    /// Mean of the measured speeds, or the model default when nothing was measured
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_motions<'a>(model: &SpeedModel, motions: impl IntoIterator<Item = &'a VehicleMotion>) -> Self {
        let mut total = 0.0;
        let mut measured_count = 0;
        let mut active_count = 0;
        let mut stopped_count = 0;

        for motion in motions {
            active_count += 1;
            if motion.stopped {
                stopped_count += 1;
            }
            if motion.measured {
                total += motion.speed_kmh;
                measured_count += 1;
            }
        }

        let average_kmh = if measured_count > 0 {
            total / measured_count as f64
        } else {
            model.default_kmh
        };

        Self { average_kmh, measured_count, active_count, stopped_count }
    }

    /// Average speed rounded for display
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn rounded_average(&self) -> i64 {
        self.average_kmh.round() as i64
    }
}
