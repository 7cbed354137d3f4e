use super::types::FrameError;
use crate::geometry::ScreenPoint;
use web_sys::CanvasRenderingContext2d;

const FONT: &str = "12px Inter, sans-serif";
const PADDING: f64 = 6.0;
const LINE_HEIGHT: f64 = 16.0;
const OFFSET: f64 = 12.0;
const BACKGROUND: &str = "rgba(0,0,0,0.8)";
const TEXT_COLOR: &str = "#fff";

/// Top-left corner and size of a tooltip box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Place the box above and right of `anchor`, flipping to the other side of
/// an axis where it would leave the canvas.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn tooltip_box(anchor: ScreenPoint, text_width: f64, lines: usize, canvas_width: f64) -> TooltipBox {
    let width = text_width + PADDING * 2.0;
    let height = lines as f64 * LINE_HEIGHT + PADDING * 2.0;

    let mut x = anchor.x + OFFSET;
    if x + width > canvas_width {
        x = anchor.x - OFFSET - width;
    }
    let mut y = anchor.y - OFFSET - height;
    if y < 0.0 {
        y = anchor.y + OFFSET;
    }

    TooltipBox { x, y, width, height }
}

/// # Errors
///
/// Returns `FrameError::Draw` if text cannot be measured or drawn
#[allow(clippy::cast_precision_loss)]
pub fn draw_tooltip(
    ctx: &CanvasRenderingContext2d,
    lines: &[String],
    anchor: ScreenPoint,
    canvas_width: f64,
) -> Result<(), FrameError> {
    if lines.is_empty() {
        return Ok(());
    }

    ctx.set_font(FONT);
    let mut text_width: f64 = 0.0;
    for line in lines {
        text_width = text_width.max(ctx.measure_text(line)?.width());
    }

    let frame = tooltip_box(anchor, text_width, lines.len(), canvas_width);
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(frame.x, frame.y, frame.width, frame.height);

    ctx.set_fill_style_str(TEXT_COLOR);
    for (i, line) in lines.iter().enumerate() {
        // Baseline sits a little above the bottom of each line box
        let baseline = frame.y + PADDING + (i + 1) as f64 * LINE_HEIGHT - 4.0;
        ctx.fill_text(line, frame.x + PADDING, baseline)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_sits_above_right_of_anchor() {
        let frame = tooltip_box(ScreenPoint::new(100.0, 200.0), 80.0, 3, 800.0);
        assert_eq!(frame, TooltipBox { x: 112.0, y: 128.0, width: 92.0, height: 60.0 });
    }

    #[test]
    fn test_box_flips_at_canvas_edges() {
        let frame = tooltip_box(ScreenPoint::new(780.0, 20.0), 80.0, 3, 800.0);
        assert_eq!(frame.x, 780.0 - 12.0 - 92.0);
        assert_eq!(frame.y, 32.0);
    }
}
