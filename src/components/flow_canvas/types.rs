use super::layers::FlowLayers;
use crate::flow::{ArcStyle, CanvasSize, MapTransform, ParticleConfig, ParticleSystem, SpawnCandidate, StepReport};
use crate::geometry::ScreenPoint;
use crate::live::VehicleGlyph;
use chrono::NaiveDateTime;
use std::fmt;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use web_sys::HtmlCanvasElement;

#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// No canvas yet, or its container has not been laid out
    NotReady,
    Draw(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "Canvas not ready"),
            Self::Draw(message) => write!(f, "Draw failed: {message}"),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<JsValue> for FrameError {
    fn from(value: JsValue) -> Self {
        Self::Draw(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Reactive state read once at the start of a frame
#[derive(Debug, Clone)]
pub struct FrameScene {
    pub layers: Rc<FlowLayers>,
    pub vehicles: Vec<VehicleGlyph>,
    pub transform: MapTransform,
    pub now: NaiveDateTime,
    pub animation_speed: f64,
    pub is_playing: bool,
}

/// State that lives across frames, owned by the canvas component
pub struct RenderContext {
    canvas: Option<HtmlCanvasElement>,
    particles: ParticleSystem,
    candidates: Vec<SpawnCandidate>,
    layers: Option<Rc<FlowLayers>>,
    pointer: Option<ScreenPoint>,
    size: Option<CanvasSize>,
    style: ArcStyle,
    hover_radius: f64,
}

impl RenderContext {
    #[must_use]
    pub fn new(config: ParticleConfig, style: ArcStyle, hover_radius: f64, seed: u64) -> Self {
        Self {
            canvas: None,
            particles: ParticleSystem::new(config, seed),
            candidates: Vec::new(),
            layers: None,
            pointer: None,
            size: None,
            style,
            hover_radius,
        }
    }

    pub fn attach(&mut self, canvas: HtmlCanvasElement) {
        self.canvas = Some(canvas);
        self.size = None;
    }

    /// # Errors
    ///
    /// Returns `FrameError::NotReady` until a canvas has been attached
    pub fn canvas(&self) -> Result<HtmlCanvasElement, FrameError> {
        self.canvas.clone().ok_or(FrameError::NotReady)
    }

    #[must_use]
    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    #[must_use]
    pub fn style(&self) -> &ArcStyle {
        &self.style
    }

    #[must_use]
    pub fn hover_radius(&self) -> f64 {
        self.hover_radius
    }

    #[must_use]
    pub fn pointer(&self) -> Option<ScreenPoint> {
        self.pointer
    }

    pub fn set_pointer(&mut self, pointer: Option<ScreenPoint>) {
        self.pointer = pointer;
    }

    /// Forget the applied size so the next frame resizes the backing store
    pub fn invalidate_size(&mut self) {
        self.size = None;
    }

    /// Record `size`; returns `true` when it differs from the size last applied
    pub fn apply_size(&mut self, size: CanvasSize) -> bool {
        if self.size == Some(size) {
            return false;
        }
        self.size = Some(size);
        true
    }

    /// Switch to new layers and rebuild the spawn candidates. Particles survive
    /// an intensity-only change and are dropped when the geometry changed.
    /// Returns `true` when the particles were dropped.
    pub fn sync_layers(&mut self, layers: &Rc<FlowLayers>) -> bool {
        if self.layers.as_ref().is_some_and(|current| Rc::ptr_eq(current, layers)) {
            return false;
        }
        let reset = !self.layers.as_ref().is_some_and(|current| current.same_paths(layers));
        if reset {
            self.particles.clear();
        }
        self.candidates = layers.spawn_candidates();
        self.layers = Some(Rc::clone(layers));
        reset
    }

    /// Run the simulation for one frame; a paused scene keeps its particles frozen
    pub fn advance(&mut self, scene: &FrameScene) -> Option<StepReport> {
        self.sync_layers(&scene.layers);
        if !scene.is_playing {
            return None;
        }
        Some(self.particles.step(&self.candidates, scene.animation_speed))
    }
}
