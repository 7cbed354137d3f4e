use crate::flow::GeoProjector;
use crate::models::RouteShape;
use std::rc::Rc;
use web_sys::CanvasRenderingContext2d;

const ROUTE_LINE_WIDTH: f64 = 6.0;

/// Stroke every drawable route polyline in its line color
pub fn draw_route_lines<P: GeoProjector>(ctx: &CanvasRenderingContext2d, routes: &[Rc<RouteShape>], projector: &P) {
    ctx.set_line_width(ROUTE_LINE_WIDTH);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");

    for route in routes.iter().filter(|route| route.is_drawable()) {
        let mut points = route.path.iter().map(|position| projector.project(*position));
        let Some(first) = points.next() else { continue };

        ctx.begin_path();
        ctx.move_to(first.x, first.y);
        for point in points {
            ctx.line_to(point.x, point.y);
        }
        ctx.set_stroke_style_str(&route.color);
        ctx.stroke();
    }
}
