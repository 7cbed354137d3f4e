use crate::geometry::{quadratic_point, ScreenPoint};

/// Width multiplier of the soft stroke drawn under each arc
pub const GLOW_WIDTH_FACTOR: f64 = 2.2;
pub const GLOW_ALPHA: f64 = 0.12;
pub const MAIN_ALPHA: f64 = 0.45;

/// Pixels of extra curvature per unit of lane offset
const LANE_SPACING_PX: f64 = 40.0;
/// Lane offset step between neighbouring parallel lanes
const LANE_STEP: f64 = 0.15;
/// Floor on the curvature height so reverse arcs never share the straight chord
const MIN_ARC_HEIGHT_PX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcStyle {
    /// Curvature height as a fraction of the chord length
    pub curvature: f64,
    /// Cap on the curvature height in pixels
    pub max_height: f64,
    pub min_width: f64,
    pub max_width: f64,
}

impl Default for ArcStyle {
    fn default() -> Self {
        Self {
            curvature: 0.3,
            max_height: 100.0,
            min_width: 1.0,
            max_width: 8.0,
        }
    }
}

impl ArcStyle {
    /// Square-root width law, so a tenfold flow is only ~3x as wide
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stroke_width(&self, value: u64, max_value: u64) -> f64 {
        if max_value == 0 {
            return self.min_width;
        }
        let ratio = (value as f64 / max_value as f64).clamp(0.0, 1.0);
        self.min_width + ratio.sqrt() * (self.max_width - self.min_width)
    }

    #[must_use]
    pub fn glow_width(&self, value: u64, max_value: u64) -> f64 {
        self.stroke_width(value, max_value) * GLOW_WIDTH_FACTOR
    }
}

/// Quadratic curve between two projected stations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub start: ScreenPoint,
    pub control: ScreenPoint,
    pub end: ScreenPoint,
    /// Height of the control point along the left normal of `start → end`
    pub offset: f64,
}

impl ArcGeometry {
    /// Bend the chord `p1 → p2` to its left.
    ///
    /// Because the normal is taken relative to the travel direction, A→B and
    /// B→A bend to opposite sides. The offset is always positive, so the two
    /// never meet. Coincident endpoints give a straight, zero-offset "curve".
    #[must_use]
    pub fn between(p1: ScreenPoint, p2: ScreenPoint, lane_offset: f64, style: &ArcStyle) -> Self {
        let mid = p1.midpoint(p2);
        let dx = p2.x - p1.x;
        let dy = p2.y - p1.y;
        let dist = (dx * dx + dy * dy).sqrt();

        if dist.is_nan() || dist <= f64::EPSILON {
            return Self { start: p1, control: mid, end: p2, offset: 0.0 };
        }

        let height = (dist * style.curvature).min(style.max_height).max(MIN_ARC_HEIGHT_PX);
        let offset = height + lane_offset.max(0.0) * LANE_SPACING_PX;
        let control = ScreenPoint::new(mid.x - (dy / dist) * offset, mid.y + (dx / dist) * offset);

        Self { start: p1, control, end: p2, offset }
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> ScreenPoint {
        quadratic_point(self.start, self.control, self.end, t.clamp(0.0, 1.0))
    }
}

/// Parallel lanes drawn for an arc of the selected station, by passenger volume
#[must_use]
pub fn lane_count(value: u64) -> usize {
    match value {
        0..=99 => 1,
        100..=499 => 2,
        500..=999 => 4,
        1000..=2999 => 6,
        _ => 8,
    }
}

/// Offsets of `lanes` parallel lanes, fanning outward from the base curve
#[allow(clippy::cast_precision_loss)]
pub fn lane_offsets(lanes: usize) -> impl Iterator<Item = f64> {
    (0..lanes).map(|k| k as f64 * LANE_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_arcs_share_width_and_mirror() {
        let style = ArcStyle::default();
        let a = ScreenPoint::new(100.0, 100.0);
        let b = ScreenPoint::new(400.0, 300.0);

        let ab = ArcGeometry::between(a, b, 0.0, &style);
        let ba = ArcGeometry::between(b, a, 0.0, &style);

        assert_eq!(style.stroke_width(700, 1000), style.stroke_width(700, 1000));
        assert_ne!(ab.control, ba.control);
        let mid = a.midpoint(b);
        assert!((ab.control.x + ba.control.x - 2.0 * mid.x).abs() < 1e-9);
        assert!((ab.control.y + ba.control.y - 2.0 * mid.y).abs() < 1e-9);
    }

    #[test]
    fn test_curvature_height_is_capped() {
        let style = ArcStyle::default();
        let short = ArcGeometry::between(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(100.0, 0.0), 0.0, &style);
        assert!((short.offset - 30.0).abs() < 1e-9);
        assert_eq!(short.control, ScreenPoint::new(50.0, 30.0));

        let long = ArcGeometry::between(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(2000.0, 0.0), 0.0, &style);
        assert_eq!(long.offset, 100.0);
    }

    #[test]
    fn test_coincident_endpoints_do_not_divide_by_zero() {
        let p = ScreenPoint::new(10.0, 10.0);
        let arc = ArcGeometry::between(p, p, 0.5, &ArcStyle::default());
        assert_eq!(arc.offset, 0.0);
        assert_eq!(arc.control, p);
        assert!(arc.point_at(0.5).is_finite());
    }

    #[test]
    fn test_stroke_width_is_sublinear_and_bounded() {
        let style = ArcStyle::default();
        assert_eq!(style.stroke_width(0, 1000), 1.0);
        assert_eq!(style.stroke_width(1000, 1000), 8.0);
        assert!((style.stroke_width(250, 1000) - 4.5).abs() < 1e-12);
        assert_eq!(style.stroke_width(5, 0), 1.0);
        assert!((style.glow_width(1000, 1000) - 17.6).abs() < 1e-12);
    }

    #[test]
    fn test_point_at_endpoints() {
        let arc = ArcGeometry::between(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(100.0, 0.0), 0.0, &ArcStyle::default());
        assert_eq!(arc.point_at(0.0), arc.start);
        assert_eq!(arc.point_at(1.0), arc.end);
        assert_eq!(arc.point_at(0.5), ScreenPoint::new(50.0, 15.0));
    }

    #[test]
    fn test_lane_count_and_offsets() {
        assert_eq!(lane_count(99), 1);
        assert_eq!(lane_count(100), 2);
        assert_eq!(lane_count(999), 4);
        assert_eq!(lane_count(2999), 6);
        assert_eq!(lane_count(3000), 8);

        let offsets: Vec<f64> = lane_offsets(2).collect();
        assert_eq!(offsets.len(), 2);
        assert!(offsets[0].abs() < 1e-12);
        assert!((offsets[1] - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_lanes_stay_on_their_own_side_for_short_chords() {
        let styles = [
            ArcStyle::default(),
            ArcStyle { curvature: 0.0, ..ArcStyle::default() },
        ];
        let a = ScreenPoint::new(0.0, 0.0);
        for style in &styles {
            for chord in [2.0, 10.0, 40.0, 80.0, 120.0, 400.0, 2000.0] {
                let b = ScreenPoint::new(chord, 0.0);
                for value in [50, 300, 700, 2000, 5000] {
                    for lane in lane_offsets(lane_count(value)) {
                        let ab = ArcGeometry::between(a, b, lane, style);
                        let ba = ArcGeometry::between(b, a, lane, style);
                        assert!(ab.offset > 0.0 && ba.offset > 0.0, "chord {chord}, lane {lane}");
                        // Opposite normals put the controls on either side of the chord
                        assert!(ab.control.y > 0.0 && ba.control.y < 0.0, "chord {chord}, lane {lane}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_neighbouring_lanes_do_not_overlap() {
        let style = ArcStyle::default();
        let a = ScreenPoint::new(0.0, 0.0);
        let b = ScreenPoint::new(80.0, 0.0);
        let heights: Vec<f64> = lane_offsets(8).map(|lane| ArcGeometry::between(a, b, lane, &style).offset).collect();
        assert!(heights.windows(2).all(|pair| pair[1] - pair[0] > 5.0));
        assert!((heights[0] - 24.0).abs() < 1e-9);
    }
}
