pub mod arc;
pub mod color;
pub mod particles;
pub mod projector;

pub use arc::{lane_count, lane_offsets, ArcGeometry, ArcStyle};
pub use color::{intensity_color, IntensityBin};
pub use particles::{
    Heading, Particle, ParticleConfig, ParticlePath, ParticleSystem, SpawnCandidate, StepReport,
};
pub use projector::{BoundsProjector, CanvasSize, GeoBounds, GeoProjector, MapTransform};

use crate::models::EngineSettings;

impl From<&EngineSettings> for ParticleConfig {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            cap: settings.particle_cap,
            spawn_rate: settings.spawn_rate,
            spawn_window: settings.spawn_window,
            base_speed: settings.particle_base_speed,
            speed_gain: settings.particle_speed_gain,
            base_radius: settings.particle_base_radius,
            radius_gain: settings.particle_radius_gain,
        }
    }
}

impl From<&EngineSettings> for ArcStyle {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            curvature: settings.arc_curvature,
            max_height: settings.arc_max_height,
            min_width: settings.arc_min_width,
            max_width: settings.arc_max_width,
        }
    }
}
