use crate::models::{format_count, VisualizationStats};
use leptos::{component, view, CollectView, IntoView, Memo, SignalWith};

fn ranking(title: &'static str, rows: Vec<(String, u64)>) -> impl IntoView {
    view! {
        <div class="stats-ranking">
            <h4>{title}</h4>
            <ol>
                {rows
                    .into_iter()
                    .map(|(name, count)| {
                        view! {
                            <li>
                                <span class="stat-label">{name}</span>
                                <span class="stat-value">{format_count(count)}</span>
                            </li>
                        }
                    })
                    .collect_view()}
            </ol>
        </div>
    }
}

#[component]
#[must_use]
pub fn StatsPanel(stats: Memo<VisualizationStats>) -> impl IntoView {
    let origins = move || ranking("Top origins", stats.with(|s| s.top_origins.clone()));
    let destinations = move || ranking("Top destinations", stats.with(|s| s.top_destinations.clone()));
    let pairs = move || {
        let rows = stats.with(|s| {
            s.top_pairs
                .iter()
                .map(|(origin, destination, count)| (format!("{origin} → {destination}"), *count))
                .collect()
        });
        ranking("Top pairs", rows)
    };

    view! {
        <div class="stats-panel">
            <div class="stats-summary">
                <div class="live-stat">
                    <span class="stat-label">"Passengers"</span>
                    <span class="stat-value">{move || stats.with(|s| format_count(s.total_passengers))}</span>
                </div>
                <div class="live-stat">
                    <span class="stat-label">"Flows"</span>
                    <span class="stat-value">{move || stats.with(|s| s.total_flows)}</span>
                </div>
            </div>
            {origins}
            {destinations}
            {pairs}
        </div>
    }
}
