use super::layers::StationGlyph;
use super::types::FrameError;
use crate::flow::GeoProjector;
use crate::geometry::ScreenPoint;
use std::f64::consts::TAU;
use web_sys::CanvasRenderingContext2d;

const OUTLINE_COLOR: &str = "#fff";
const OUTLINE_WIDTH: f64 = 2.0;
const SELECTED_OUTLINE_WIDTH: f64 = 3.0;

/// First station whose projected position lies within `radius` pixels of `pointer` on both axes.
///
/// Testing against projected positions keeps hovering correct at every zoom level.
#[must_use]
pub fn hit_test<'a, P: GeoProjector>(
    glyphs: &'a [StationGlyph],
    projector: &P,
    pointer: ScreenPoint,
    radius: f64,
) -> Option<&'a StationGlyph> {
    glyphs.iter().find(|glyph| {
        let point = projector.project(glyph.position);
        (point.x - pointer.x).abs() < radius && (point.y - pointer.y).abs() < radius
    })
}

/// # Errors
///
/// Returns `FrameError::Draw` if the canvas rejects an arc
pub fn draw_station_glyphs<P: GeoProjector>(
    ctx: &CanvasRenderingContext2d,
    glyphs: &[StationGlyph],
    projector: &P,
) -> Result<(), FrameError> {
    ctx.set_stroke_style_str(OUTLINE_COLOR);

    for glyph in glyphs {
        let center = projector.project(glyph.position);
        ctx.set_fill_style_str(&glyph.fill);
        ctx.set_line_width(if glyph.selected { SELECTED_OUTLINE_WIDTH } else { OUTLINE_WIDTH });
        ctx.begin_path();
        ctx.arc(center.x, center.y, glyph.radius, 0.0, TAU)?;
        ctx.fill();
        ctx.stroke();
    }

    Ok(())
}
