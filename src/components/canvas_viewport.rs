use crate::flow::MapTransform;
use crate::geometry::ScreenPoint;
use leptos::{batch, create_signal, ReadSignal, RwSignal, SignalGet, SignalGetUntracked, SignalSet, SignalUpdate, WriteSignal};
use web_sys::WheelEvent;

/// Pointer travel below which a press-release counts as a click rather than a drag
const CLICK_TOLERANCE_PX: f64 = 4.0;

#[derive(Clone, Copy)]
pub struct ViewportSignals {
    pub transform: RwSignal<MapTransform>,
    pub is_panning: ReadSignal<bool>,
    pub set_is_panning: WriteSignal<bool>,
    pub last_mouse_pos: ReadSignal<(f64, f64)>,
    pub set_last_mouse_pos: WriteSignal<(f64, f64)>,
    pub drag_distance: ReadSignal<f64>,
    pub set_drag_distance: WriteSignal<f64>,
}

#[must_use]
pub fn create_viewport_signals(transform: RwSignal<MapTransform>) -> ViewportSignals {
    let (is_panning, set_is_panning) = create_signal(false);
    let (last_mouse_pos, set_last_mouse_pos) = create_signal((0.0, 0.0));
    let (drag_distance, set_drag_distance) = create_signal(0.0);

    ViewportSignals {
        transform,
        is_panning,
        set_is_panning,
        last_mouse_pos,
        set_last_mouse_pos,
        drag_distance,
        set_drag_distance,
    }
}

pub fn handle_pan_start(x: f64, y: f64, viewport: &ViewportSignals) {
    batch(move || {
        viewport.set_is_panning.set(true);
        viewport.set_last_mouse_pos.set((x, y));
        viewport.set_drag_distance.set(0.0);
    });
}

pub fn handle_pan_move(x: f64, y: f64, viewport: &ViewportSignals) {
    if !viewport.is_panning.get_untracked() {
        return;
    }

    let (last_x, last_y) = viewport.last_mouse_pos.get_untracked();
    let dx = x - last_x;
    let dy = y - last_y;
    let travelled = viewport.drag_distance.get_untracked() + dx.hypot(dy);

    batch(move || {
        viewport.transform.update(|transform| transform.pan_by(dx, dy));
        viewport.set_last_mouse_pos.set((x, y));
        viewport.set_drag_distance.set(travelled);
    });
}

/// End a pan; returns `true` when the gesture was short enough to be a click
pub fn handle_pan_end(viewport: &ViewportSignals) -> bool {
    let was_panning = viewport.is_panning.get_untracked();
    viewport.set_is_panning.set(false);
    was_panning && viewport.drag_distance.get_untracked() < CLICK_TOLERANCE_PX
}

pub fn handle_zoom(ev: &WheelEvent, mouse_x: f64, mouse_y: f64, viewport: &ViewportSignals) {
    let zoom_factor = if ev.delta_y() < 0.0 { 1.1 } else { 0.9 };
    apply_zoom(zoom_factor, mouse_x, mouse_y, viewport);
}

fn apply_zoom(zoom_factor: f64, mouse_x: f64, mouse_y: f64, viewport: &ViewportSignals) {
    viewport
        .transform
        .update(|transform| transform.zoom_around(zoom_factor, ScreenPoint::new(mouse_x, mouse_y)));
}

#[must_use]
pub fn is_panning(viewport: &ViewportSignals) -> bool {
    viewport.is_panning.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::GeoProjector;
    use leptos::{create_runtime, create_rw_signal};

    fn viewport() -> ViewportSignals {
        let mut transform = MapTransform::default();
        transform.resize(800.0, 600.0);
        create_viewport_signals(create_rw_signal(transform))
    }

    #[test]
    fn test_drag_pans_the_map() {
        let runtime = create_runtime();
        let viewport = viewport();
        let before = viewport.transform.get_untracked();
        let grabbed = before.unproject(ScreenPoint::new(400.0, 300.0));

        handle_pan_start(400.0, 300.0, &viewport);
        handle_pan_move(450.0, 320.0, &viewport);
        assert!(!handle_pan_end(&viewport));

        let after = viewport.transform.get_untracked();
        let moved_to = after.project(grabbed);
        assert!((moved_to.x - 450.0).abs() < 1e-6);
        assert!((moved_to.y - 320.0).abs() < 1e-6);
        runtime.dispose();
    }

    #[test]
    fn test_short_press_is_a_click() {
        let runtime = create_runtime();
        let viewport = viewport();
        handle_pan_start(100.0, 100.0, &viewport);
        handle_pan_move(101.0, 101.0, &viewport);
        assert!(handle_pan_end(&viewport));
        assert!(!handle_pan_end(&viewport));
        runtime.dispose();
    }

    #[test]
    fn test_zoom_keeps_point_under_cursor() {
        let runtime = create_runtime();
        let viewport = viewport();
        let anchor = ScreenPoint::new(200.0, 150.0);
        let fixed = viewport.transform.get_untracked().unproject(anchor);

        apply_zoom(1.1, anchor.x, anchor.y, &viewport);

        let transform = viewport.transform.get_untracked();
        assert!(transform.zoom > MapTransform::default().zoom);
        let projected = transform.project(fixed);
        assert!((projected.x - anchor.x).abs() < 1e-6);
        assert!((projected.y - anchor.y).abs() < 1e-6);
        runtime.dispose();
    }
}
