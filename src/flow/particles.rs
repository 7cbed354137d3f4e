use super::arc::{ArcGeometry, ArcStyle};
use super::projector::GeoProjector;
use crate::geometry::{LatLon, ScreenPoint};
use std::rc::Rc;

/// Alpha of particles travelling against the path's natural direction
pub const REVERSE_ALPHA: f64 = 0.65;

/// Geographic path a particle travels; shared by every particle on the same corridor.
///
/// Paths are kept in lat/lon so positions follow the map through pan and zoom.
#[derive(Debug, Clone, PartialEq)]
pub enum ParticlePath {
    /// Route polyline, one segment per consecutive point pair
    Polyline(Rc<[LatLon]>),
    /// Curved OD arc, a single segment
    Arc {
        origin: LatLon,
        destination: LatLon,
        lane_offset: f64,
    },
}

impl ParticlePath {
    #[must_use]
    pub fn segment_count(&self) -> usize {
        match self {
            Self::Polyline(points) => points.len().saturating_sub(1),
            Self::Arc { .. } => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    /// First point towards last point
    Forward,
    /// Last point towards first point
    Reverse,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub id: u64,
    pub path: Rc<ParticlePath>,
    /// Segment currently travelled, counted in the direction of travel
    pub path_index: usize,
    /// Position along the current segment, in [0, 1)
    pub progress: f64,
    pub speed: f64,
    pub intensity: f64,
    pub heading: Heading,
}

impl Particle {
    /// Current position in canvas pixels under the given projection
    #[must_use]
    pub fn screen_position<P: GeoProjector>(&self, projector: &P, style: &ArcStyle) -> Option<ScreenPoint> {
        match self.path.as_ref() {
            ParticlePath::Polyline(points) => {
                let last = points.len().checked_sub(1)?;
                let (from, to) = match self.heading {
                    Heading::Forward => (self.path_index, self.path_index + 1),
                    Heading::Reverse => (last.checked_sub(self.path_index)?, last.checked_sub(self.path_index + 1)?),
                };
                let from = projector.project(*points.get(from)?);
                let to = projector.project(*points.get(to)?);
                Some(from.lerp(to, self.progress))
            }
            ParticlePath::Arc { origin, destination, lane_offset } => {
                let geometry = ArcGeometry::between(
                    projector.project(*origin),
                    projector.project(*destination),
                    *lane_offset,
                    style,
                );
                let t = match self.heading {
                    Heading::Forward => self.progress,
                    Heading::Reverse => 1.0 - self.progress,
                };
                Some(geometry.point_at(t))
            }
        }
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        match self.heading {
            Heading::Forward => 1.0,
            Heading::Reverse => REVERSE_ALPHA,
        }
    }
}

/// A path that may receive a new particle this frame
#[derive(Debug, Clone)]
pub struct SpawnCandidate {
    pub path: Rc<ParticlePath>,
    pub intensity: f64,
}

impl SpawnCandidate {
    #[must_use]
    pub fn new(path: Rc<ParticlePath>, intensity: f64) -> Self {
        Self { path, intensity }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleConfig {
    /// Hard population ceiling
    pub cap: usize,
    /// Spawn probability per frame at intensity 1
    pub spawn_rate: f64,
    /// New particles start at a random progress in `[0, spawn_window)`
    pub spawn_window: f64,
    pub base_speed: f64,
    pub speed_gain: f64,
    pub base_radius: f64,
    pub radius_gain: f64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            cap: 1200,
            spawn_rate: 0.08,
            spawn_window: 0.3,
            base_speed: 0.003,
            speed_gain: 0.01,
            base_radius: 3.0,
            radius_gain: 3.0,
        }
    }
}

impl ParticleConfig {
    #[must_use]
    pub fn spawn_probability(&self, intensity: f64) -> f64 {
        clamp_intensity(intensity) * self.spawn_rate
    }

    /// Progress per frame at animation speed 1
    #[must_use]
    pub fn speed(&self, intensity: f64) -> f64 {
        self.base_speed + clamp_intensity(intensity) * self.speed_gain
    }

    #[must_use]
    pub fn radius(&self, intensity: f64) -> f64 {
        self.base_radius + clamp_intensity(intensity) * self.radius_gain
    }
}

fn clamp_intensity(intensity: f64) -> f64 {
    if intensity.is_finite() {
        intensity.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// What one call to [`ParticleSystem::step`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    pub spawned: usize,
    pub retired: usize,
    pub evicted: usize,
}

/// Bounded particle population driven once per animation frame.
pub struct ParticleSystem {
    config: ParticleConfig,
    rng: fastrand::Rng,
    particles: Vec<Particle>,
    next_id: u64,
}

impl ParticleSystem {
    #[must_use]
    pub fn new(config: ParticleConfig, seed: u64) -> Self {
        Self {
            config,
            rng: fastrand::Rng::with_seed(seed),
            particles: Vec::new(),
            next_id: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Drop every particle, e.g. when the dataset behind the paths changes
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Advance, then spawn, then enforce the cap.
    ///
    /// `speed_multiplier` scales every particle's per-frame progress.
    pub fn step(&mut self, candidates: &[SpawnCandidate], speed_multiplier: f64) -> StepReport {
        let multiplier = if speed_multiplier.is_finite() { speed_multiplier.max(0.0) } else { 1.0 };

        let retired = self.advance(multiplier);
        let spawned = self.spawn(candidates);
        let evicted = self.enforce_cap();

        StepReport { spawned, retired, evicted }
    }

    fn advance(&mut self, multiplier: f64) -> usize {
        let before = self.particles.len();
        self.particles.retain_mut(|particle| {
            particle.progress += particle.speed * multiplier;
            while particle.progress >= 1.0 {
                particle.progress -= 1.0;
                particle.path_index += 1;
            }
            particle.path_index < particle.path.segment_count()
        });
        before - self.particles.len()
    }

    fn spawn(&mut self, candidates: &[SpawnCandidate]) -> usize {
        let mut spawned = 0;

        for candidate in candidates {
            let segments = candidate.path.segment_count();
            if segments == 0 {
                continue;
            }
            if self.rng.f64() >= self.config.spawn_probability(candidate.intensity) {
                continue;
            }

            let (path_index, heading) = match candidate.path.as_ref() {
                ParticlePath::Polyline(_) => {
                    let heading = if self.rng.bool() { Heading::Forward } else { Heading::Reverse };
                    (self.rng.usize(..segments), heading)
                }
                ParticlePath::Arc { .. } => (0, Heading::Forward),
            };

            let intensity = clamp_intensity(candidate.intensity);
            self.particles.push(Particle {
                id: self.next_id,
                path: Rc::clone(&candidate.path),
                path_index,
                progress: self.rng.f64() * self.config.spawn_window,
                speed: self.config.speed(intensity),
                intensity,
                heading,
            });
            self.next_id += 1;
            spawned += 1;
        }

        spawned
    }

    /// Over the cap, keep only the newest `min(len / 2, cap)` particles.
    fn enforce_cap(&mut self) -> usize {
        let len = self.particles.len();
        if len <= self.config.cap {
            return 0;
        }
        let keep = (len / 2).min(self.config.cap);
        // Particles are pushed in id order, so the oldest are at the front
        self.particles.drain(..len - keep);
        len - keep
    }
}
