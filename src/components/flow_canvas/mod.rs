pub mod arcs;
pub mod layers;
pub mod particle_layer;
pub mod route_lines;
pub mod scheduler;
pub mod station_glyphs;
pub mod tooltip;
pub mod types;
pub mod vehicles;
mod canvas;

pub use canvas::*;
pub use layers::{FlowLayers, LayerInputs};
pub use scheduler::{BrowserFrameHost, FrameHost, RenderLoop};
pub use types::{FrameError, FrameScene, RenderContext};
