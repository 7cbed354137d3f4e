use serde::{Deserialize, Serialize};

/// Id of the optional JSON block in the host page that overrides these settings
pub const SETTINGS_ELEMENT_ID: &str = "transit-flow-settings";

/// Every tunable of the engine. Missing fields take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub api_base: String,
    pub live_poll_ms: u32,
    pub clock_tick_ms: u32,
    /// Hourly autoplay period at animation speed 1
    pub autoplay_ms: u32,

    pub particle_cap: usize,
    pub spawn_rate: f64,
    pub spawn_window: f64,
    pub particle_base_speed: f64,
    pub particle_speed_gain: f64,
    pub particle_base_radius: f64,
    pub particle_radius_gain: f64,

    pub arc_curvature: f64,
    pub arc_max_height: f64,
    pub arc_min_width: f64,
    pub arc_max_width: f64,

    pub min_plausible_kmh: f64,
    pub max_plausible_kmh: f64,
    /// Progress change (percentage points) below which two fixes count as noise
    pub progress_noise: f64,
    pub default_speed_kmh: f64,

    pub hover_radius_px: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            api_base: "/api".to_string(),
            live_poll_ms: 3000,
            clock_tick_ms: 1000,
            autoplay_ms: 3000,
            particle_cap: 1200,
            spawn_rate: 0.08,
            spawn_window: 0.3,
            particle_base_speed: 0.003,
            particle_speed_gain: 0.01,
            particle_base_radius: 3.0,
            particle_radius_gain: 3.0,
            arc_curvature: 0.3,
            arc_max_height: 100.0,
            arc_min_width: 1.0,
            arc_max_width: 8.0,
            min_plausible_kmh: 5.0,
            max_plausible_kmh: 120.0,
            progress_noise: 0.1,
            default_speed_kmh: 34.0,
            hover_radius_px: 10.0,
            min_zoom: 3.0,
            max_zoom: 18.0,
        }
    }
}

impl EngineSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings JSON, merged over the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong type
    pub fn from_json(json: &str) -> Result<Self, String> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse engine settings: {e}"))?;
        Ok(settings.sanitized())
    }

    /// Read the settings block from the host page, falling back to defaults
    #[cfg(target_arch = "wasm32")]
    #[must_use]
    pub fn from_document() -> Self {
        let text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(SETTINGS_ELEMENT_ID))
            .and_then(|el| el.text_content())
            .unwrap_or_else(|| "{}".to_string());

        let mut settings = Self::from_json(&text).unwrap_or_else(|e| {
            leptos::logging::warn!("{e}; using default settings");
            Self::default()
        });

        // reqwest needs absolute URLs; resolve a path-only base against the page origin
        if settings.api_base.starts_with('/') {
            if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
                settings.api_base = format!("{origin}{}", settings.api_base);
            }
        }

        settings
    }

    /// Clamp values that would stall timers, starve the particle cap or invert ranges
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.api_base.trim().is_empty() {
            self.api_base = defaults.api_base;
        }
        self.api_base = self.api_base.trim_end_matches('/').to_string();

        self.live_poll_ms = self.live_poll_ms.max(500);
        self.clock_tick_ms = self.clock_tick_ms.max(100);
        self.autoplay_ms = self.autoplay_ms.max(100);
        self.particle_cap = self.particle_cap.max(2);

        self.spawn_rate = clamp_or(self.spawn_rate, 0.0, 1.0, defaults.spawn_rate);
        self.spawn_window = clamp_or(self.spawn_window, 0.0, 0.99, defaults.spawn_window);
        self.progress_noise = clamp_or(self.progress_noise, 0.0, 100.0, defaults.progress_noise);

        let widths_ok = self.arc_min_width > 0.0 && self.arc_min_width <= self.arc_max_width;
        if !widths_ok {
            self.arc_min_width = defaults.arc_min_width;
            self.arc_max_width = defaults.arc_max_width;
        }
        let band_ok = self.min_plausible_kmh >= 0.0 && self.min_plausible_kmh < self.max_plausible_kmh;
        if !band_ok {
            self.min_plausible_kmh = defaults.min_plausible_kmh;
            self.max_plausible_kmh = defaults.max_plausible_kmh;
        }
        let zoom_ok = self.min_zoom >= 0.0 && self.min_zoom < self.max_zoom;
        if !zoom_ok {
            self.min_zoom = defaults.min_zoom;
            self.max_zoom = defaults.max_zoom;
        }
        if self.default_speed_kmh.is_nan() || self.default_speed_kmh <= 0.0 {
            self.default_speed_kmh = defaults.default_speed_kmh;
        }

        self
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_merges_over_defaults() {
        let settings = EngineSettings::from_json(r#"{"particle_cap": 800, "api_base": "http://127.0.0.1:8000/api/"}"#)
            .expect("valid settings");
        assert_eq!(settings.particle_cap, 800);
        assert_eq!(settings.api_base, "http://127.0.0.1:8000/api");
        assert_eq!(settings.live_poll_ms, 3000);
        assert_eq!(settings.default_speed_kmh, 34.0);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(EngineSettings::from_json("{not json").is_err());
        assert!(EngineSettings::from_json(r#"{"particle_cap": "many"}"#).is_err());
    }

    #[test]
    fn test_sanitize_clamps_degenerate_values() {
        let settings = EngineSettings {
            live_poll_ms: 0,
            particle_cap: 0,
            spawn_rate: f64::NAN,
            min_plausible_kmh: 200.0,
            min_zoom: 20.0,
            ..EngineSettings::default()
        }
        .sanitized();

        assert_eq!(settings.live_poll_ms, 500);
        assert_eq!(settings.particle_cap, 2);
        assert_eq!(settings.spawn_rate, 0.08);
        assert_eq!((settings.min_plausible_kmh, settings.max_plausible_kmh), (5.0, 120.0));
        assert_eq!((settings.min_zoom, settings.max_zoom), (3.0, 18.0));
    }

    #[test]
    fn test_url_joins_paths() {
        let settings = EngineSettings::default();
        assert_eq!(settings.url("/live-metro/"), "/api/live-metro/");
        assert_eq!(settings.url("od-flow/months/"), "/api/od-flow/months/");
    }
}
