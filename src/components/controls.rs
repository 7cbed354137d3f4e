use crate::models::{FilterState, FlowDirection, MonthOption};
use crate::time::hour_label;
use leptos::{
    component, event_target_value, view, CollectView, IntoView, RwSignal, Signal, SignalGet, SignalUpdate, SignalWith,
};

/// Animation speed multipliers offered in the speed picker
pub const SPEED_STEPS: [f64; 4] = [0.5, 1.0, 2.0, 4.0];

/// Parse the passenger threshold input; anything that is not a count means no threshold
#[must_use]
pub fn parse_min_passengers(value: &str) -> u64 {
    value.trim().parse().unwrap_or(0)
}

#[allow(clippy::needless_pass_by_value)]
#[component]
#[must_use]
pub fn FlowControls(
    months: Signal<Vec<MonthOption>>,
    stations: Signal<Vec<String>>,
    filters: RwSignal<FilterState>,
    hour: RwSignal<u32>,
) -> impl IntoView {
    let selected_month = move || filters.with(|f| f.month.clone().unwrap_or_default());
    let selected_station = move || filters.with(|f| f.selected_station.clone().unwrap_or_default());
    let has_selection = move || filters.with(|f| f.selected_station.is_some());

    let month_options = move || {
        months
            .get()
            .into_iter()
            .map(|month| {
                let is_selected = selected_month() == month.value;
                view! { <option value=month.value selected=is_selected>{month.label}</option> }
            })
            .collect_view()
    };

    let station_options = move || {
        stations
            .get()
            .into_iter()
            .map(|name| {
                let is_selected = selected_station() == name;
                view! { <option value=name.clone() selected=is_selected>{name}</option> }
            })
            .collect_view()
    };

    let direction_buttons = FlowDirection::ALL
        .iter()
        .map(|direction| {
            let direction = *direction;
            view! {
                <button
                    class="direction-button"
                    class:active=move || filters.with(|f| f.direction == direction)
                    disabled=move || !has_selection()
                    on:click=move |_| filters.update(|f| f.direction = direction)
                >
                    {direction.label()}
                </button>
            }
        })
        .collect_view();

    let speed_options = SPEED_STEPS
        .iter()
        .map(|speed| {
            let speed = *speed;
            view! {
                <option
                    value=speed.to_string()
                    selected=move || filters.with(|f| f.animation_speed == speed)
                >
                    {format!("{speed}×")}
                </option>
            }
        })
        .collect_view();

    view! {
        <div class="flow-controls">
            <div class="control-row">
                <label for="month-select">"Month"</label>
                <select
                    id="month-select"
                    on:change=move |ev| {
                        let value = event_target_value(&ev);
                        filters.update(|f| f.month = (!value.is_empty()).then_some(value));
                    }
                >
                    {month_options}
                </select>
            </div>

            <div class="control-row">
                <label for="station-select">"Station"</label>
                <select
                    id="station-select"
                    on:change=move |ev| {
                        let value = event_target_value(&ev);
                        filters.update(|f| f.selected_station = (!value.is_empty()).then_some(value));
                    }
                >
                    <option value="" selected=move || !has_selection()>"All stations"</option>
                    {station_options}
                </select>
                <button
                    class="clear-selection"
                    disabled=move || !has_selection()
                    on:click=move |_| filters.update(|f| f.selected_station = None)
                >
                    "Clear"
                </button>
            </div>

            <div class="control-row direction-row">{direction_buttons}</div>

            <div class="control-row">
                <label for="min-passengers">"Min passengers"</label>
                <input
                    id="min-passengers"
                    type="number"
                    min="0"
                    prop:value=move || filters.with(|f| f.min_passengers.to_string())
                    on:input=move |ev| {
                        let min = parse_min_passengers(&event_target_value(&ev));
                        filters.update(|f| f.min_passengers = min);
                    }
                />
            </div>

            <div class="control-row playback-row">
                <button
                    class="play-button"
                    title=move || if filters.with(|f| f.is_playing) { "Pause" } else { "Play" }
                    on:click=move |_| filters.update(|f| f.is_playing = !f.is_playing)
                >
                    <i class=move || {
                        if filters.with(|f| f.is_playing) { "fa-solid fa-pause" } else { "fa-solid fa-play" }
                    }></i>
                </button>
                <select
                    class="speed-select"
                    on:change=move |ev| {
                        if let Ok(speed) = event_target_value(&ev).parse::<f64>() {
                            filters.update(|f| f.animation_speed = speed);
                        }
                    }
                >
                    {speed_options}
                </select>
            </div>

            <div class="control-row hour-row">
                <label for="hour-slider">"Hour"</label>
                <input
                    id="hour-slider"
                    type="range"
                    min="0"
                    max="23"
                    prop:value=move || hour.get().to_string()
                    on:input=move |ev| {
                        if let Ok(value) = event_target_value(&ev).parse::<u32>() {
                            hour.update(|h| *h = value.min(23));
                        }
                    }
                />
                <span class="hour-label">{move || hour_label(hour.get())}</span>
            </div>
        </div>
    }
}
