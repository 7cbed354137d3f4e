use crate::components::flow_map::FlowMap;
use crate::models::EngineSettings;
use leptos::{component, provide_context, view, IntoView};
use leptos_meta::{provide_meta_context, Stylesheet, Title};

#[component]
#[must_use]
pub fn App() -> impl IntoView {
    provide_meta_context();

    #[cfg(target_arch = "wasm32")]
    let settings = EngineSettings::from_document();
    #[cfg(not(target_arch = "wasm32"))]
    let settings = EngineSettings::default();

    crate::log!("Using API base {}", settings.api_base);
    provide_context(settings);

    view! {
        <Stylesheet id="leptos" href="/pkg/transit_flow.css"/>
        <Title text="Transit Flow"/>

        <div class="app">
            <FlowMap />
        </div>
    }
}
