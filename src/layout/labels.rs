//! Label records and their initial angular placement. Records are rebuilt
//! from scratch on every layout call and mutated in place by the collision
//! resolver; nothing here survives a pass.

use serde::Serialize;

use crate::error::Result;
use crate::geometry::{point_at_angle, Point, Rect};

use super::wrap::wrap_block;
use super::{LayoutContext, Segment};

/// Which side of the center the label box sits on. Purely x-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Hemisphere {
    Left,
    Right,
}

/// Quadrant of the label's segment midpoint, numbered clockwise from the
/// upper-right. Drives the vertical stacking direction and leader-line bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quadrant {
    UpperRight,
    LowerRight,
    LowerLeft,
    UpperLeft,
}

impl Quadrant {
    /// Classify a midpoint angle (degrees clockwise from 12 o'clock).
    pub fn from_angle(deg: f32) -> Self {
        let deg = deg.rem_euclid(360.0);
        if deg < 90.0 {
            Quadrant::UpperRight
        } else if deg < 180.0 {
            Quadrant::LowerRight
        } else if deg <= 270.0 {
            Quadrant::LowerLeft
        } else {
            Quadrant::UpperLeft
        }
    }

    pub fn hemisphere(self) -> Hemisphere {
        match self {
            Quadrant::UpperRight | Quadrant::LowerRight => Hemisphere::Right,
            Quadrant::LowerLeft | Quadrant::UpperLeft => Hemisphere::Left,
        }
    }
}

/// Vertical band (on the box's top edge) a label may occupy without leaving
/// its segment's natural angular region.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct YLimit {
    pub min: f32,
    pub max: f32,
}

impl YLimit {
    pub fn contains(&self, y: f32) -> bool {
        y >= self.min && y <= self.max
    }
}

/// One outer label, keyed by segment index. `x`/`y` is the top-left corner
/// of the bounding box and is rewritten repeatedly during collision
/// resolution; `radius` is fixed at build time and preserved when the box
/// moves so the label stays on its original leader-line circle.
#[derive(Debug, Clone, Serialize)]
pub struct LabelRecord {
    pub index: usize,
    pub text: String,
    pub value_text: Option<String>,
    pub lines: Vec<String>,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub hemisphere: Hemisphere,
    pub quadrant: Quadrant,
    pub mid_angle: f32,
    pub arc_fraction: f32,
    pub font_size: f32,
    pub value_font_size: f32,
    pub hidden: bool,
    /// Set once this label's horizontal position has been adjusted; blocks
    /// further font growth so repaired labels do not oscillate.
    pub x_changed: bool,
    pub radius: f32,
    pub y_limit: YLimit,
    pub color: String,
}

impl LabelRecord {
    pub fn bbox(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Corner of the bounding box nearest the circle center.
    pub fn anchor(&self) -> Point {
        match self.quadrant {
            Quadrant::UpperRight => Point::new(self.x, self.y + self.h),
            Quadrant::LowerRight => Point::new(self.x, self.y),
            Quadrant::LowerLeft => Point::new(self.x + self.w, self.y),
            Quadrant::UpperLeft => Point::new(self.x + self.w, self.y + self.h),
        }
    }

    /// Reposition the box so its anchor corner lands on `anchor`.
    pub fn place_at_anchor(&mut self, anchor: Point) {
        match self.quadrant {
            Quadrant::UpperRight => {
                self.x = anchor.x;
                self.y = anchor.y - self.h;
            }
            Quadrant::LowerRight => {
                self.x = anchor.x;
                self.y = anchor.y;
            }
            Quadrant::LowerLeft => {
                self.x = anchor.x - self.w;
                self.y = anchor.y;
            }
            Quadrant::UpperLeft => {
                self.x = anchor.x - self.w;
                self.y = anchor.y - self.h;
            }
        }
    }
}

/// Group annotation on the inner ring. Placed at the group's angular
/// midpoint; group labels do not participate in collision resolution.
#[derive(Debug, Clone, Serialize)]
pub struct GroupLabel {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub mid_angle: f32,
    pub font_size: f32,
}

pub(crate) fn format_value(value: f32, prefix: &str, suffix: &str) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let number = if (rounded - rounded.round()).abs() < 0.001 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.2}")
    };
    format!("{prefix}{number}{suffix}")
}

/// Build one record per segment at its ideal position: measured at the
/// minimum font size, wrapped against the free horizontal span on its side
/// of the canvas, and anchored `pie_distance` outside the ring at the
/// segment's midpoint angle.
pub(crate) fn build_labels(ctx: &LayoutContext<'_>, segments: &[Segment]) -> Result<Vec<LabelRecord>> {
    let cfg = &ctx.config.labels;
    let total: f32 = segments.iter().map(|s| s.value).sum();
    let label_radius = ctx.outer_radius + cfg.pie_distance;
    let mut records = Vec::with_capacity(segments.len());

    for segment in segments {
        let mid_angle = segment.mid_angle();
        let quadrant = Quadrant::from_angle(mid_angle);
        let hemisphere = quadrant.hemisphere();

        let value_text = if cfg.show_values {
            Some(format_value(
                segment.value,
                &cfg.value_prefix,
                &cfg.value_suffix,
            ))
        } else {
            None
        };

        // Widest the box may ever get on this side of the canvas.
        let ideal = point_at_angle(ctx.center, label_radius, mid_angle);
        let max_width = match hemisphere {
            Hemisphere::Right => {
                ctx.config.width - cfg.canvas_margin - (ideal.x + cfg.horizontal_padding)
            }
            Hemisphere::Left => ideal.x - cfg.horizontal_padding - cfg.canvas_margin,
        }
        .max(cfg.min_font_size);

        let (lines, w, h) =
            measure_record(&segment.label, value_text.as_deref(), cfg.min_font_size, cfg.min_font_size, max_width, ctx)?;

        let x = match hemisphere {
            Hemisphere::Right => ideal.x + cfg.horizontal_padding,
            Hemisphere::Left => ideal.x - cfg.horizontal_padding - w,
        };
        let y = ideal.y - h / 2.0;

        let mut record = LabelRecord {
            index: segment.index,
            text: segment.label.clone(),
            value_text,
            lines,
            x,
            y,
            w,
            h,
            hemisphere,
            quadrant,
            mid_angle,
            arc_fraction: segment.value / total,
            font_size: cfg.min_font_size,
            value_font_size: cfg.min_font_size,
            hidden: false,
            x_changed: false,
            radius: 0.0,
            y_limit: y_limit_for(ctx, segment, h),
            color: segment.color.clone(),
        };
        record.radius = crate::geometry::distance(ctx.center, record.anchor());
        records.push(record);
    }
    Ok(records)
}

/// Wrap and measure a label's text block at the given font sizes.
/// Returns (lines, width, height) where the value line, if any, is appended
/// after the wrapped label lines.
pub(crate) fn measure_record(
    text: &str,
    value_text: Option<&str>,
    font_size: f32,
    value_font_size: f32,
    max_width: f32,
    ctx: &LayoutContext<'_>,
) -> Result<(Vec<String>, f32, f32)> {
    let (lines, mut w, mut h) = wrap_block(text, max_width, font_size, ctx.measurer)?;
    if let Some(value) = value_text {
        w = w.max(ctx.measurer.text_width(value, value_font_size)?);
        h += ctx.measurer.line_height(value_font_size);
    }
    Ok((lines, w, h))
}

/// Vertical band derived from the segment's own angular region at the label
/// ring, widened by the label height so a box may straddle the boundary
/// without being considered out of region.
fn y_limit_for(ctx: &LayoutContext<'_>, segment: &Segment, h: f32) -> YLimit {
    let radius = ctx.outer_radius + ctx.config.labels.pie_distance;
    let start = point_at_angle(ctx.center, radius, segment.start_angle).y;
    let end = point_at_angle(ctx.center, radius, segment.end_angle).y;
    let min = start.min(end);
    let mut max = start.max(end);
    // A segment that spans 6 o'clock reaches the ring's lowest point
    // between its edge angles, not at them.
    if segment.start_angle < 180.0 && segment.end_angle > 180.0 {
        max = max.max(ctx.center.y + radius);
    }
    YLimit {
        min: min - h,
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrants_follow_clockwise_numbering() {
        assert_eq!(Quadrant::from_angle(45.0), Quadrant::UpperRight);
        assert_eq!(Quadrant::from_angle(135.0), Quadrant::LowerRight);
        assert_eq!(Quadrant::from_angle(225.0), Quadrant::LowerLeft);
        assert_eq!(Quadrant::from_angle(315.0), Quadrant::UpperLeft);
        assert_eq!(Quadrant::from_angle(405.0), Quadrant::UpperRight);
    }

    #[test]
    fn hemisphere_tracks_x_side() {
        assert_eq!(Quadrant::from_angle(10.0).hemisphere(), Hemisphere::Right);
        assert_eq!(Quadrant::from_angle(170.0).hemisphere(), Hemisphere::Right);
        assert_eq!(Quadrant::from_angle(190.0).hemisphere(), Hemisphere::Left);
        assert_eq!(Quadrant::from_angle(350.0).hemisphere(), Hemisphere::Left);
    }

    #[test]
    fn anchor_is_nearest_corner() {
        let mut record = LabelRecord {
            index: 0,
            text: String::new(),
            value_text: None,
            lines: Vec::new(),
            x: 10.0,
            y: 20.0,
            w: 40.0,
            h: 10.0,
            hemisphere: Hemisphere::Right,
            quadrant: Quadrant::UpperRight,
            mid_angle: 45.0,
            arc_fraction: 0.5,
            font_size: 10.0,
            value_font_size: 10.0,
            hidden: false,
            x_changed: false,
            radius: 0.0,
            y_limit: YLimit {
                min: 0.0,
                max: 100.0,
            },
            color: String::new(),
        };
        assert_eq!(record.anchor(), Point::new(10.0, 30.0));
        record.quadrant = Quadrant::LowerLeft;
        assert_eq!(record.anchor(), Point::new(50.0, 20.0));
    }

    #[test]
    fn place_at_anchor_roundtrips() {
        let mut record = LabelRecord {
            index: 0,
            text: String::new(),
            value_text: None,
            lines: Vec::new(),
            x: 0.0,
            y: 0.0,
            w: 30.0,
            h: 12.0,
            hemisphere: Hemisphere::Left,
            quadrant: Quadrant::UpperLeft,
            mid_angle: 300.0,
            arc_fraction: 0.1,
            font_size: 10.0,
            value_font_size: 10.0,
            hidden: false,
            x_changed: false,
            radius: 0.0,
            y_limit: YLimit {
                min: -100.0,
                max: 100.0,
            },
            color: String::new(),
        };
        let target = Point::new(77.0, 33.0);
        record.place_at_anchor(target);
        assert_eq!(record.anchor(), target);
    }

    #[test]
    fn format_value_drops_trailing_zeroes() {
        assert_eq!(format_value(15.0, "", ""), "15");
        assert_eq!(format_value(15.25, "", "%"), "15.25%");
        assert_eq!(format_value(7.0, "$", ""), "$7");
    }
}
