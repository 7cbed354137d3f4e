use crate::api::client::{
    fetch_live_vehicles, fetch_metro_routes, fetch_months, fetch_od_flow, fetch_passenger_flow, fetch_route_catalog,
};
use crate::api::{FetchError, LoadState};
use crate::components::controls::FlowControls;
use crate::components::flow_canvas::{FlowCanvas, FlowLayers, LayerInputs};
use crate::components::legend::Legend;
use crate::components::live_status::LiveStatus;
use crate::components::stats_panel::StatsPanel;
use crate::constants::FIT_PADDING_PX;
use crate::flow::{ArcStyle, GeoBounds, MapTransform};
use crate::live::{LiveVehicleTracker, RequestSequencer, SpeedModel};
use crate::models::{
    filter_arcs, EngineSettings, FilterState, FlowDataset, MonthOption, PassengerFlowDataset, RouteShape,
};
use chrono::{Local, Timelike};
use gloo_timers::callback::Interval;
use leptos::logging::warn;
use leptos::{
    component, create_effect, create_memo, create_rw_signal, on_cleanup, spawn_local, store_value, use_context, view,
    Callback, IntoView, Signal, SignalGet, SignalGetUntracked, SignalSet, SignalUpdate, SignalWith,
    SignalWithUntracked,
};
use std::rc::Rc;

/// Interval between automatic hour steps at the given animation speed
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn autoplay_period_ms(base_ms: u32, animation_speed: f64) -> u32 {
    let speed = if animation_speed.is_finite() && animation_speed > 0.0 {
        animation_speed
    } else {
        1.0
    };
    (f64::from(base_ms) / speed).round().clamp(50.0, 60_000.0) as u32
}

/// The hour after `hour`, wrapping at midnight
#[must_use]
pub fn next_hour(hour: u32) -> u32 {
    (hour + 1) % 24
}

/// OD state to show when the month list leaves nothing to load.
///
/// An empty or failed month list means no OD request will ever run, so the
/// view settles on an empty dataset; a failed list surfaces its own error.
#[must_use]
pub fn od_without_month(months: &LoadState<Vec<MonthOption>>) -> Option<LoadState<FlowDataset>> {
    let settled = match months {
        LoadState::Loading => false,
        LoadState::Ready(list) => list.is_empty(),
        LoadState::Failed(_) => true,
    };
    settled.then(|| LoadState::Ready(FlowDataset::default()))
}

/// Metro routes, falling back to the full route catalog when they are unavailable
async fn load_routes(settings: &EngineSettings) -> Result<Vec<Rc<RouteShape>>, FetchError> {
    let shapes = match fetch_metro_routes(settings).await {
        Ok(routes) if !routes.is_empty() => Ok(routes),
        Ok(_) => {
            crate::log!("No metro routes, loading the route catalog");
            fetch_route_catalog(settings).await
        }
        Err(e) => {
            warn!("Metro routes unavailable ({e}); loading the route catalog");
            fetch_route_catalog(settings).await
        }
    }?;
    Ok(shapes.into_iter().map(Rc::new).collect())
}

#[allow(clippy::too_many_lines)]
#[component]
#[must_use]
pub fn FlowMap() -> impl IntoView {
    let settings = store_value(use_context::<EngineSettings>().unwrap_or_default());
    let (live_poll_ms, clock_tick_ms, autoplay_ms) =
        settings.with_value(|s| (s.live_poll_ms, s.clock_tick_ms, s.autoplay_ms));

    let routes = create_rw_signal(LoadState::<Vec<Rc<RouteShape>>>::Loading);
    let months = create_rw_signal(LoadState::<Vec<MonthOption>>::Loading);
    let od = create_rw_signal(LoadState::<FlowDataset>::Loading);
    let passenger_flow = create_rw_signal(None::<PassengerFlowDataset>);
    let filters = create_rw_signal(FilterState::default());
    let hour = create_rw_signal(Local::now().hour());
    let clock = create_rw_signal(Local::now().time());
    let transform = create_rw_signal(settings.with_value(|s| MapTransform::new(s.min_zoom, s.max_zoom)));
    let tracker = create_rw_signal(settings.with_value(|s| {
        LiveVehicleTracker::new(SpeedModel::from(s), f64::from(s.live_poll_ms) / 1000.0)
    }));

    let od_requests = store_value(RequestSequencer::new());
    let flow_requests = store_value(RequestSequencer::new());

    let load_route_data = move || {
        routes.set(LoadState::Loading);
        spawn_local(async move {
            let result = load_routes(&settings.get_value()).await;
            if let Ok(shapes) = &result {
                crate::log!("Loaded {} routes", shapes.len());
            }
            routes.set(LoadState::from_result(result));
        });
    };

    let load_months = move || {
        months.set(LoadState::Loading);
        spawn_local(async move {
            let result = fetch_months(&settings.get_value()).await;
            months.set(LoadState::from_result(result));
        });
    };

    // OD arcs block the view; the hourly station flow only enriches it
    let load_month = move |month: String| {
        let Some(od_ticket) = od_requests.try_update_value(RequestSequencer::issue) else {
            return;
        };
        let Some(flow_ticket) = flow_requests.try_update_value(RequestSequencer::issue) else {
            return;
        };
        od.set(LoadState::Loading);

        let od_month = month.clone();
        spawn_local(async move {
            let result = fetch_od_flow(&settings.get_value(), &od_month).await;
            if od_requests.try_update_value(|s| s.accept(od_ticket)).unwrap_or(false) {
                od.set(LoadState::from_result(result));
            }
        });

        spawn_local(async move {
            let result = fetch_passenger_flow(&settings.get_value(), &month).await;
            if !flow_requests.try_update_value(|s| s.accept(flow_ticket)).unwrap_or(false) {
                return;
            }
            match result {
                Ok(flow) => passenger_flow.set(Some(flow)),
                Err(e) => {
                    warn!("Hourly station flow unavailable for {month}: {e}");
                    passenger_flow.set(None);
                }
            }
        });
    };

    load_route_data();
    load_months();

    // Latest month is the last one the feed lists
    create_effect(move |_| {
        let latest = months.with(|state| state.ready().and_then(|list| list.last().map(|m| m.value.clone())));
        if let Some(latest) = latest {
            if filters.with_untracked(|f| f.month.is_none()) {
                filters.update(|f| f.month = Some(latest));
            }
        }
    });

    create_effect(move |_| {
        if let Some(state) = months.with(od_without_month) {
            if filters.with_untracked(|f| f.month.is_none()) {
                od.set(state);
            }
        }
    });

    let selected_month = create_memo(move |_| filters.with(|f| f.month.clone()));
    create_effect(move |_| {
        if let Some(month) = selected_month.get() {
            load_month(month);
        }
    });

    // Fit once, after both the routes and the canvas size are known
    let fitted = store_value(false);
    create_effect(move |_| {
        if fitted.get_value() || transform.with(|t| t.width <= 0.0 || t.height <= 0.0) {
            return;
        }
        let Some(bounds) = routes.with(|state| {
            state
                .ready()
                .map(|shapes| GeoBounds::from_points(shapes.iter().flat_map(|r| r.path.iter())))
        }) else {
            return;
        };
        fitted.set_value(true);
        if let Some(bounds) = bounds {
            transform.update(|t| t.fit_bounds(bounds, FIT_PADDING_PX));
        }
    });

    // Play state and speed do not change which arcs are shown
    let arc_filters = create_memo(move |_| filters.with(|f| (f.selected_station.clone(), f.min_passengers, f.direction)));
    let filtered_arcs = create_memo(move |_| {
        let _ = arc_filters.get();
        od.with(|state| {
            state
                .ready()
                .map(|dataset| filters.with_untracked(|f| filter_arcs(dataset, f)))
                .unwrap_or_default()
        })
    });

    let layers = create_memo(move |_| {
        let (selected, _, _) = arc_filters.get();
        let current_hour = hour.get();
        let style = settings.with_value(|s| ArcStyle::from(s));
        filtered_arcs.with(|arcs| {
            routes.with(|route_state| {
                od.with(|od_state| {
                    passenger_flow.with(|flow| {
                        Rc::new(FlowLayers::build(&LayerInputs {
                            routes: route_state.ready().map_or(&[], Vec::as_slice),
                            dataset: od_state.ready(),
                            arcs,
                            selected: selected.as_deref(),
                            hourly: flow.as_ref().map(|flow| (flow, current_hour)),
                            style,
                        }))
                    })
                })
            })
        })
    });

    let stats = create_memo(move |_| od.with(|state| state.ready().map(FlowDataset::stats).unwrap_or_default()));
    let month_options = Signal::derive(move || months.with(|state| state.ready().cloned().unwrap_or_default()));
    let station_names = Signal::derive(move || {
        od.with(|state| {
            state
                .ready()
                .map(|dataset| dataset.stations().map(|s| s.name.clone()).collect())
                .unwrap_or_default()
        })
    });

    let poll_live = move || {
        let Some(ticket) = tracker.try_update(LiveVehicleTracker::begin_poll) else {
            return;
        };
        spawn_local(async move {
            let result = fetch_live_vehicles(&settings.get_value()).await;
            let now = Local::now().naive_local();
            tracker.update(|t| match result {
                Ok(vehicles) => {
                    t.apply_poll(ticket, vehicles, now);
                }
                Err(e) => t.record_failure(ticket, &e),
            });
        });
    };

    poll_live();
    let timers = store_value(Some((
        Interval::new(live_poll_ms, poll_live),
        Interval::new(clock_tick_ms, move || clock.set(Local::now().time())),
    )));

    let playback = create_memo(move |_| filters.with(|f| (f.is_playing, f.animation_speed)));
    let autoplay = store_value(None::<Interval>);
    create_effect(move |_| {
        let (is_playing, speed) = playback.get();
        // Dropping the previous interval clears it
        autoplay.set_value(None);
        if is_playing {
            let period = autoplay_period_ms(autoplay_ms, speed);
            autoplay.set_value(Some(Interval::new(period, move || hour.update(|h| *h = next_hour(*h)))));
        }
    });

    on_cleanup(move || {
        let _ = timers.try_update_value(Option::take);
        let _ = autoplay.try_update_value(Option::take);
    });

    let on_station_click = Callback::new(move |name: String| filters.update(|f| f.toggle_station(&name)));

    let is_loading = move || routes.with(LoadState::is_loading) || od.with(LoadState::is_loading);

    let failure = move || {
        let route_error = routes.with(|s| s.error().map(str::to_string));
        let month_error = months.with(|s| s.error().map(str::to_string));
        let od_error = od.with(|s| s.error().map(str::to_string));

        let (title, message, retry): (&str, String, Box<dyn Fn()>) = if let Some(e) = route_error {
            ("Could not load the network", e, Box::new(load_route_data))
        } else if let Some(e) = month_error {
            ("Could not load the month list", e, Box::new(load_months))
        } else if let Some(e) = od_error {
            let retry = move || {
                if let Some(month) = selected_month.get_untracked() {
                    load_month(month);
                }
            };
            ("Could not load passenger flows", e, Box::new(retry))
        } else {
            return None;
        };

        Some(view! {
            <div class="error-overlay">
                <div class="error-panel">
                    <h3>{title}</h3>
                    <p>{message}</p>
                    <button on:click=move |_| retry()>"Retry"</button>
                </div>
            </div>
        })
    };

    view! {
        <div class="flow-map">
            <FlowCanvas layers=layers tracker=tracker transform=transform filters=filters on_station_click=on_station_click/>
            <aside class="flow-sidebar">
                <FlowControls months=month_options stations=station_names filters=filters hour=hour/>
                <LiveStatus tracker=tracker clock=clock.read_only()/>
                <StatsPanel stats=stats/>
                <Legend/>
            </aside>
            {move || is_loading().then(|| view! { <div class="loading-indicator">"Loading…"</div> })}
            {failure}
        </div>
    }
}
