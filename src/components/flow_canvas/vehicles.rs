use super::types::FrameError;
use crate::constants::UNKNOWN_ROUTE_COLOR;
use crate::flow::GeoProjector;
use crate::live::VehicleGlyph;
use chrono::{NaiveDateTime, Timelike};
use std::collections::HashMap;
use std::f64::consts::TAU;
use web_sys::CanvasRenderingContext2d;

const VEHICLE_RADIUS: f64 = 7.0;
const VEHICLE_OUTLINE_COLOR: &str = "#fff";
const VEHICLE_OUTLINE_WIDTH: f64 = 2.0;
const PULSE_PERIOD_MS: u32 = 1500;
const PULSE_SPREAD: f64 = 10.0;

/// Position in the stopped-vehicle pulse cycle, in [0, 1)
#[must_use]
pub fn pulse_phase(now: NaiveDateTime) -> f64 {
    let time = now.time();
    let millis = time.num_seconds_from_midnight() * 1000 + time.nanosecond() / 1_000_000;
    f64::from(millis % PULSE_PERIOD_MS) / f64::from(PULSE_PERIOD_MS)
}

/// Draw live vehicles in their route color; stopped ones get an expanding ring
///
/// # Errors
///
/// Returns `FrameError::Draw` if the canvas rejects an arc
pub fn draw_vehicles<P: GeoProjector>(
    ctx: &CanvasRenderingContext2d,
    vehicles: &[VehicleGlyph],
    route_colors: &HashMap<String, String>,
    projector: &P,
    now: NaiveDateTime,
) -> Result<(), FrameError> {
    let phase = pulse_phase(now);

    for vehicle in vehicles {
        let center = projector.project(vehicle.position_at(now));
        let color = route_colors
            .get(&vehicle.route_id)
            .map_or(UNKNOWN_ROUTE_COLOR, String::as_str);

        if vehicle.stopped {
            ctx.set_global_alpha(1.0 - phase);
            ctx.set_stroke_style_str(color);
            ctx.set_line_width(VEHICLE_OUTLINE_WIDTH);
            ctx.begin_path();
            ctx.arc(center.x, center.y, VEHICLE_RADIUS + phase * PULSE_SPREAD, 0.0, TAU)?;
            ctx.stroke();
            ctx.set_global_alpha(1.0);
        }

        ctx.set_fill_style_str(color);
        ctx.set_stroke_style_str(VEHICLE_OUTLINE_COLOR);
        ctx.set_line_width(VEHICLE_OUTLINE_WIDTH);
        ctx.begin_path();
        ctx.arc(center.x, center.y, VEHICLE_RADIUS, 0.0, TAU)?;
        ctx.fill();
        ctx.stroke();
    }

    Ok(())
}
