/// Five-step heat scale shared by arcs, particles, station glyphs and the legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntensityBin {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl IntensityBin {
    pub const ALL: [Self; 5] = [Self::VeryLow, Self::Low, Self::Medium, Self::High, Self::VeryHigh];

    /// Total over `f64`: NaN and negatives land in the lowest bin, anything above 0.8 in the highest.
    #[must_use]
    pub fn from_intensity(intensity: f64) -> Self {
        if intensity.is_nan() || intensity <= 0.2 {
            Self::VeryLow
        } else if intensity <= 0.4 {
            Self::Low
        } else if intensity <= 0.6 {
            Self::Medium
        } else if intensity <= 0.8 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    fn hsl(self) -> (u16, u8, u8) {
        match self {
            Self::VeryLow => (145, 80, 50),
            Self::Low => (80, 90, 55),
            Self::Medium => (50, 100, 55),
            Self::High => (30, 100, 55),
            Self::VeryHigh => (0, 100, 60),
        }
    }

    #[must_use]
    pub fn color(self) -> String {
        let (h, s, l) = self.hsl();
        format!("hsl({h}, {s}%, {l}%)")
    }

    #[must_use]
    pub fn color_with_alpha(self, alpha: f64) -> String {
        let (h, s, l) = self.hsl();
        format!("hsla({h}, {s}%, {l}%, {:.2})", alpha.clamp(0.0, 1.0))
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::VeryLow => "Very low",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very high",
        }
    }

    /// Range label for the legend, e.g. `"20–40%"`
    #[must_use]
    pub fn range_label(self) -> &'static str {
        match self {
            Self::VeryLow => "0–20%",
            Self::Low => "20–40%",
            Self::Medium => "40–60%",
            Self::High => "60–80%",
            Self::VeryHigh => "80–100%",
        }
    }
}

/// Shorthand for `IntensityBin::from_intensity(intensity).color()`
#[must_use]
pub fn intensity_color(intensity: f64) -> String {
    IntensityBin::from_intensity(intensity).color()
}
