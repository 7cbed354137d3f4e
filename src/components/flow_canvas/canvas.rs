use super::arcs::draw_arcs;
use super::layers::FlowLayers;
use super::particle_layer::draw_particles;
use super::route_lines::draw_route_lines;
use super::scheduler::{BrowserFrameHost, RenderLoop};
use super::station_glyphs::{draw_station_glyphs, hit_test};
use super::tooltip::draw_tooltip;
use super::types::{FrameError, FrameScene, RenderContext};
use super::vehicles::draw_vehicles;
use crate::components::canvas_viewport;
use crate::flow::{ArcStyle, CanvasSize, GeoProjector, MapTransform, ParticleConfig};
use crate::geometry::ScreenPoint;
use crate::live::LiveVehicleTracker;
use crate::models::{EngineSettings, FilterState};
use leptos::{
    component, create_node_ref, html, on_cleanup, use_context, view, Callable, Callback, IntoView, Memo, RwSignal,
    SignalGetUntracked, SignalUpdate, SignalWithUntracked,
};
use leptos_use::{use_event_listener, use_window};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

const BACKGROUND: &str = "rgba(10,14,23,0.25)";

#[cfg(all(target_arch = "wasm32", feature = "perf_timing"))]
const FRAME_BUDGET_MS: f64 = 16.7;

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, FrameError> {
    canvas
        .get_context("2d")?
        .ok_or(FrameError::NotReady)?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| FrameError::Draw("not a 2D rendering context".to_string()))
}

/// Bring the backing store in line with the container size and device pixel ratio
fn sync_canvas_size(ctx: &mut RenderContext, canvas: &HtmlCanvasElement) -> Result<CanvasSize, FrameError> {
    let device_pixel_ratio = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
    let size = CanvasSize::new(
        f64::from(canvas.client_width()),
        f64::from(canvas.client_height()),
        device_pixel_ratio,
    );
    if size.is_empty() {
        return Err(FrameError::NotReady);
    }
    if ctx.apply_size(size) {
        canvas.set_width(size.backing_width);
        canvas.set_height(size.backing_height);
    }
    Ok(size)
}

/// Draw one frame: background, routes, arcs, particles, vehicles, stations, tooltip
fn render_frame(ctx: &mut RenderContext, scene: &FrameScene) -> Result<CanvasSize, FrameError> {
    let canvas = ctx.canvas()?;
    let size = sync_canvas_size(ctx, &canvas)?;
    let g = context_2d(&canvas)?;

    let dpr = size.device_pixel_ratio;
    g.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    g.clear_rect(0.0, 0.0, size.css_width, size.css_height);
    g.set_fill_style_str(BACKGROUND);
    g.fill_rect(0.0, 0.0, size.css_width, size.css_height);

    let mut transform = scene.transform;
    transform.resize(size.css_width, size.css_height);

    let style = *ctx.style();
    draw_route_lines(&g, &scene.layers.routes, &transform);
    draw_arcs(&g, &scene.layers.arcs, &transform, &style);

    ctx.advance(scene);
    draw_particles(&g, ctx.particles(), &transform, &style)?;
    draw_vehicles(&g, &scene.vehicles, &scene.layers.route_colors, &transform, scene.now)?;
    draw_station_glyphs(&g, &scene.layers.stations, &transform)?;

    if let Some(pointer) = ctx.pointer() {
        if let Some(glyph) = hit_test(&scene.layers.stations, &transform, pointer, ctx.hover_radius()) {
            draw_tooltip(&g, &glyph.tooltip, transform.project(glyph.position), size.css_width)?;
        }
    }

    Ok(size)
}

#[cfg(all(target_arch = "wasm32", feature = "perf_timing"))]
fn performance() -> Option<web_sys::Performance> {
    web_sys::window()?.performance()
}

fn pointer_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> ScreenPoint {
    let rect = canvas.get_bounding_client_rect();
    ScreenPoint::new(f64::from(ev.client_x()) - rect.left(), f64::from(ev.client_y()) - rect.top())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::needless_pass_by_value)]
#[component]
#[must_use]
pub fn FlowCanvas(
    layers: Memo<Rc<FlowLayers>>,
    tracker: RwSignal<LiveVehicleTracker>,
    transform: RwSignal<MapTransform>,
    filters: RwSignal<FilterState>,
    on_station_click: Callback<String>,
) -> impl IntoView {
    let settings = use_context::<EngineSettings>().unwrap_or_default();
    let canvas_ref = create_node_ref::<html::Canvas>();
    let viewport = canvas_viewport::create_viewport_signals(transform);

    let seed = js_sys::Date::now() as u64;
    let context = Rc::new(RefCell::new(RenderContext::new(
        ParticleConfig::from(&settings),
        ArcStyle::from(&settings),
        settings.hover_radius_px,
        seed,
    )));

    canvas_ref.on_load({
        let context = Rc::clone(&context);
        move |canvas| {
            let element: &HtmlCanvasElement = &canvas;
            context.borrow_mut().attach(element.clone());
        }
    });

    let frame_context = Rc::clone(&context);
    let render_loop = RenderLoop::new(BrowserFrameHost, move || {
        #[cfg(all(target_arch = "wasm32", feature = "perf_timing"))]
        let started = performance().map(|p| p.now());

        let now = chrono::Local::now().naive_local();
        let scene = filters.with_untracked(|f| FrameScene {
            layers: layers.get_untracked(),
            vehicles: tracker.with_untracked(|t| t.glyphs(now.time())),
            transform: transform.get_untracked(),
            now,
            animation_speed: f.animation_speed,
            is_playing: f.is_playing,
        });

        let size = render_frame(&mut frame_context.borrow_mut(), &scene)?;
        if scene.transform.width != size.css_width || scene.transform.height != size.css_height {
            transform.update(|t| t.resize(size.css_width, size.css_height));
        }

        #[cfg(all(target_arch = "wasm32", feature = "perf_timing"))]
        if let (Some(perf), Some(started)) = (performance(), started) {
            let elapsed = perf.now() - started;
            if elapsed > FRAME_BUDGET_MS {
                crate::log!("Slow frame: {elapsed:.1} ms, {} particles", frame_context.borrow().particles().len());
            }
        }

        Ok(())
    });
    render_loop.start();
    on_cleanup(move || render_loop.stop());

    // A DPR change can leave the CSS size untouched, so force a resize
    let _ = use_event_listener(use_window(), leptos::ev::resize, {
        let context = Rc::clone(&context);
        move |_| context.borrow_mut().invalidate_size()
    });

    let handle_mouse_down = move |ev: MouseEvent| {
        if let Some(canvas) = canvas_ref.get_untracked() {
            let point = pointer_position(&canvas, &ev);
            canvas_viewport::handle_pan_start(point.x, point.y, &viewport);
        }
    };

    let handle_mouse_move = {
        let context = Rc::clone(&context);
        move |ev: MouseEvent| {
            if let Some(canvas) = canvas_ref.get_untracked() {
                let point = pointer_position(&canvas, &ev);
                canvas_viewport::handle_pan_move(point.x, point.y, &viewport);
                context.borrow_mut().set_pointer(Some(point));
            }
        }
    };

    let handle_mouse_up = {
        let context = Rc::clone(&context);
        move |ev: MouseEvent| {
            if !canvas_viewport::handle_pan_end(&viewport) {
                return;
            }
            let Some(canvas) = canvas_ref.get_untracked() else { return };
            let point = pointer_position(&canvas, &ev);
            let radius = context.borrow().hover_radius();
            let current = transform.get_untracked();
            let clicked = layers.with_untracked(|layers| {
                hit_test(&layers.stations, &current, point, radius).map(|glyph| glyph.name.clone())
            });
            if let Some(name) = clicked {
                on_station_click.call(name);
            }
        }
    };

    let handle_mouse_leave = {
        let context = Rc::clone(&context);
        move |_ev: MouseEvent| {
            canvas_viewport::handle_pan_end(&viewport);
            context.borrow_mut().set_pointer(None);
        }
    };

    let handle_wheel = move |ev: WheelEvent| {
        ev.prevent_default();
        if let Some(canvas) = canvas_ref.get_untracked() {
            let point = pointer_position(&canvas, &ev);
            canvas_viewport::handle_zoom(&ev, point.x, point.y, &viewport);
        }
    };

    let cursor = move || {
        if canvas_viewport::is_panning(&viewport) {
            "cursor: grabbing;"
        } else {
            "cursor: grab;"
        }
    };

    view! {
        <div class="flow-canvas-container">
            <canvas
                node_ref=canvas_ref
                class="flow-canvas"
                on:mousedown=handle_mouse_down
                on:mousemove=handle_mouse_move
                on:mouseup=handle_mouse_up
                on:mouseleave=handle_mouse_leave
                on:wheel=handle_wheel
                on:contextmenu=|ev| ev.prevent_default()
                style=cursor
            ></canvas>
        </div>
    }
}
