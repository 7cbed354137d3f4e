use crate::geometry::LatLon;

/// Color assigned to stations whose line color is missing or unknown
pub const DEFAULT_LINE_COLOR: &str = "#22D3EE";

const LINE_COLOR_MAP: &[(&str, &str)] = &[
    ("red", "#E11D48"),
    ("yellow", "#FACC15"),
    ("blue", "#2563EB"),
    ("green", "#16A34A"),
    ("violet", "#7C3AED"),
    // The backend spells it both ways
    ("megenta", "#D946EF"),
    ("magenta", "#D946EF"),
    ("pink", "#EC4899"),
    ("aqua", "#00FFFF"),
    ("grey", "#9CA3AF"),
    ("gray", "#9CA3AF"),
];

/// Resolve a backend line color ("Red", "Megenta", "#ff0000", …) to a CSS color
#[must_use]
pub fn resolve_line_color(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_LINE_COLOR.to_string();
    };

    if raw.starts_with('#') || raw.starts_with("rgb") || raw.starts_with("hsl") {
        return raw.to_string();
    }

    let lower = raw.to_ascii_lowercase();
    LINE_COLOR_MAP
        .iter()
        .find(|(name, _)| *name == lower)
        .map_or_else(|| DEFAULT_LINE_COLOR.to_string(), |(_, css)| (*css).to_string())
}

/// A named station; identity is the name, which is unique within one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub name: String,
    pub position: LatLon,
    /// Resolved CSS color of the station's line
    pub line_color: String,
    pub line: Option<String>,
}

impl Station {
    #[must_use]
    pub fn new(name: impl Into<String>, position: LatLon, line_color: Option<&str>) -> Self {
        Self {
            name: name.into(),
            position,
            line_color: resolve_line_color(line_color),
            line: None,
        }
    }

    #[must_use]
    pub fn with_line(mut self, line: Option<String>) -> Self {
        self.line = line.filter(|l| !l.trim().is_empty());
        self
    }
}
