use super::layers::ArcLayer;
use crate::flow::arc::{GLOW_ALPHA, MAIN_ALPHA};
use crate::flow::{ArcGeometry, ArcStyle, GeoProjector};
use web_sys::CanvasRenderingContext2d;

fn stroke_curve(ctx: &CanvasRenderingContext2d, geometry: &ArcGeometry, width: f64) {
    ctx.set_line_width(width);
    ctx.begin_path();
    ctx.move_to(geometry.start.x, geometry.start.y);
    ctx.quadratic_curve_to(geometry.control.x, geometry.control.y, geometry.end.x, geometry.end.y);
    ctx.stroke();
}

/// Draw each OD arc lane as a wide faint glow under a narrower main stroke
pub fn draw_arcs<P: GeoProjector>(ctx: &CanvasRenderingContext2d, arcs: &[ArcLayer], projector: &P, style: &ArcStyle) {
    ctx.set_line_cap("round");

    for arc in arcs {
        let start = projector.project(arc.origin);
        let end = projector.project(arc.destination);
        ctx.set_stroke_style_str(&arc.color);

        for lane_offset in &arc.lanes {
            let geometry = ArcGeometry::between(start, end, *lane_offset, style);

            ctx.set_global_alpha(GLOW_ALPHA);
            stroke_curve(ctx, &geometry, arc.glow_width);

            ctx.set_global_alpha(MAIN_ALPHA);
            stroke_curve(ctx, &geometry, arc.width);
        }
    }

    ctx.set_global_alpha(1.0);
}
