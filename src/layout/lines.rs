//! Leader lines from each segment's rim midpoint to its label anchor.
//! Hidden labels get no path at all, so a renderer cannot accidentally
//! paint a line into empty space.

use serde::Serialize;

use crate::config::LineStyle;
use crate::geometry::{distance, point_at_angle, Point};

use super::labels::{LabelRecord, Quadrant};
use super::LayoutContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PathKind {
    /// Two points, rendered as a line segment.
    Straight,
    /// Three points, rendered as a quadratic curve through the middle one.
    Curved,
    /// Three points, rendered as a polyline elbow.
    Aligned,
}

/// Painted path for one visible label. `points` runs from the rim to the
/// label anchor.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderLine {
    pub index: usize,
    pub kind: PathKind,
    pub points: Vec<Point>,
    pub color: String,
}

/// Compute paths for every visible label.
pub fn leader_line_paths(ctx: &LayoutContext<'_>, records: &[LabelRecord]) -> Vec<LeaderLine> {
    let style = ctx.config.labels.line_style;
    records
        .iter()
        .filter(|record| !record.hidden)
        .map(|record| {
            let rim = point_at_angle(ctx.center, ctx.outer_radius, record.mid_angle);
            let anchor = record.anchor();
            let (kind, points) = match style {
                LineStyle::Straight => (PathKind::Straight, vec![rim, anchor]),
                LineStyle::Curved => (
                    PathKind::Curved,
                    vec![rim, curve_control(ctx, record, rim, anchor), anchor],
                ),
                LineStyle::Aligned => {
                    let elbow =
                        point_at_angle(ctx.center, elbow_radius(ctx), record.mid_angle);
                    (PathKind::Aligned, vec![rim, elbow, anchor])
                }
            };
            LeaderLine {
                index: record.index,
                kind,
                points,
                color: record.color.clone(),
            }
        })
        .collect()
}

fn elbow_radius(ctx: &LayoutContext<'_>) -> f32 {
    ctx.outer_radius + ctx.config.labels.pie_distance * 0.5
}

/// Control point for the curved style: the chord midpoint pushed
/// perpendicular to the chord. Upper quadrants bow outward, lower ones bow
/// inward, so lines sweep with the ring instead of cutting across it.
fn curve_control(
    ctx: &LayoutContext<'_>,
    record: &LabelRecord,
    rim: Point,
    anchor: Point,
) -> Point {
    let mid = Point::new((rim.x + anchor.x) / 2.0, (rim.y + anchor.y) / 2.0);
    let chord = distance(rim, anchor);
    if chord < 1.0 {
        return mid;
    }
    let magnitude = (chord * 0.2).min(12.0);
    // Unit perpendicular of the chord.
    let px = -(anchor.y - rim.y) / chord;
    let py = (anchor.x - rim.x) / chord;
    let a = Point::new(mid.x + px * magnitude, mid.y + py * magnitude);
    let b = Point::new(mid.x - px * magnitude, mid.y - py * magnitude);
    let outward = matches!(
        record.quadrant,
        Quadrant::UpperRight | Quadrant::UpperLeft
    );
    let a_farther = distance(a, ctx.center) >= distance(b, ctx.center);
    match (outward, a_farther) {
        (true, true) | (false, false) => a,
        _ => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::ir::{ChartData, SegmentData};
    use crate::layout::{build_labels, build_segments, LayoutContext};
    use crate::measure::MetricsTable;
    use crate::theme::Theme;

    fn fixture(style: LineStyle) -> (ChartConfig, Theme, ChartData) {
        let mut config = ChartConfig::default();
        config.labels.line_style = style;
        let data = ChartData {
            title: None,
            segments: [30.0, 30.0, 25.0, 15.0]
                .iter()
                .enumerate()
                .map(|(i, v)| SegmentData {
                    label: format!("part {i}"),
                    value: *v,
                    group: None,
                })
                .collect(),
        };
        (config, Theme::modern(), data)
    }

    fn paths(style: LineStyle, hide_first: bool) -> Vec<LeaderLine> {
        let (config, theme, data) = fixture(style);
        let ctx = LayoutContext {
            center: Point::new(config.width / 2.0, config.height / 2.0),
            outer_radius: config.outer_radius(),
            inner_radius: config.inner_radius(),
            config: &config,
            theme: &theme,
            measurer: &MetricsTable,
        };
        let segments = build_segments(&data, &theme).unwrap();
        let mut records = build_labels(&ctx, &segments).unwrap();
        if hide_first {
            records[0].hidden = true;
        }
        leader_line_paths(&ctx, &records)
    }

    #[test]
    fn straight_lines_have_two_points() {
        for line in paths(LineStyle::Straight, false) {
            assert_eq!(line.kind, PathKind::Straight);
            assert_eq!(line.points.len(), 2);
        }
    }

    #[test]
    fn curved_and_aligned_have_three_points() {
        for line in paths(LineStyle::Curved, false) {
            assert_eq!(line.points.len(), 3);
        }
        for line in paths(LineStyle::Aligned, false) {
            assert_eq!(line.points.len(), 3);
        }
    }

    #[test]
    fn hidden_labels_produce_no_path() {
        let lines = paths(LineStyle::Straight, true);
        assert!(lines.iter().all(|line| line.index != 0));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn path_starts_on_the_rim() {
        let (config, _, _) = fixture(LineStyle::Straight);
        let center = Point::new(config.width / 2.0, config.height / 2.0);
        for line in paths(LineStyle::Straight, false) {
            let rim = line.points[0];
            assert!((distance(rim, center) - config.outer_radius()).abs() < 1e-3);
        }
    }

    #[test]
    fn line_color_matches_segment_color() {
        let theme = Theme::modern();
        for (i, line) in paths(LineStyle::Straight, false).iter().enumerate() {
            assert_eq!(line.color, theme.segment_color(i));
        }
    }
}
