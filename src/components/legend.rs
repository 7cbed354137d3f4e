use crate::flow::IntensityBin;
use leptos::{component, create_signal, view, CollectView, IntoView, SignalGet, SignalUpdate};

#[component]
#[must_use]
pub fn Legend() -> impl IntoView {
    let (is_open, set_is_open) = create_signal(true);

    let bins = IntensityBin::ALL
        .iter()
        .map(|bin| {
            let swatch = format!("background: {};", bin.color());
            view! {
                <div class="legend-item">
                    <span class="legend-swatch" style=swatch></span>
                    <span class="legend-label">{bin.label()}</span>
                    <span class="legend-range">{bin.range_label()}</span>
                </div>
            }
        })
        .collect_view();

    view! {
        <div class="legend-container">
            <div class="legend-header">
                <h3>"Intensity"</h3>
                <button
                    class="legend-button"
                    title=move || if is_open.get() { "Hide legend" } else { "Show legend" }
                    on:click=move |_| set_is_open.update(|open| *open = !*open)
                >
                    {move || if is_open.get() { "−" } else { "+" }}
                </button>
            </div>

            <div class="legend-items" class:hidden=move || !is_open.get()>
                {bins}
                <div class="legend-item">
                    <span class="legend-icon vehicle-icon"></span>
                    <span class="legend-label">"Live vehicle"</span>
                </div>
                <div class="legend-item">
                    <span class="legend-icon vehicle-icon stopped"></span>
                    <span class="legend-label">"Stopped vehicle"</span>
                </div>
                <p class="legend-description">"Click a station to show its flows; click it again to clear"</p>
            </div>
        </div>
    }
}
