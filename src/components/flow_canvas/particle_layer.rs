use super::types::FrameError;
use crate::flow::{ArcStyle, GeoProjector, Heading, IntensityBin, ParticleSystem};
use std::f64::consts::TAU;
use web_sys::CanvasRenderingContext2d;

/// Fill every live particle at its projected position
///
/// # Errors
///
/// Returns `FrameError::Draw` if the canvas rejects an arc
pub fn draw_particles<P: GeoProjector>(
    ctx: &CanvasRenderingContext2d,
    system: &ParticleSystem,
    projector: &P,
    style: &ArcStyle,
) -> Result<(), FrameError> {
    let config = system.config();

    for particle in system.particles() {
        let Some(position) = particle.screen_position(projector, style) else {
            continue;
        };

        let bin = IntensityBin::from_intensity(particle.intensity);
        let fill = match particle.heading {
            Heading::Forward => bin.color(),
            Heading::Reverse => bin.color_with_alpha(particle.alpha()),
        };
        ctx.set_fill_style_str(&fill);
        ctx.begin_path();
        ctx.arc(position.x, position.y, config.radius(particle.intensity), 0.0, TAU)?;
        ctx.fill();
    }

    Ok(())
}
