//! Collision resolution for outer labels: a single forward pass in segment
//! order with bounded backward repair, followed by an iterative font growth
//! pass. Earlier labels are never moved once placed; a conflicting pair is
//! resolved by adjusting the newer label or hiding the lower-priority one.

use crate::error::Result;
use crate::geometry::Point;

use super::labels::{measure_record, Hemisphere, LabelRecord, Quadrant};
use super::LayoutContext;

/// Repair attempts per label before the resolver gives up and hides the
/// lower-priority member of the stuck pair.
const MAX_REPAIR_ROUNDS: usize = 12;

/// Geometric relationship that flagged a pair of labels as conflicting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionTrigger {
    /// Bounding boxes overlap outright.
    DirectOverlap,
    /// Same hemisphere and quadrant, but the newer label sits on the wrong
    /// side of its predecessor in stacking order.
    OrderViolationSame,
    /// Same hemisphere, different quadrant, stacking order violated.
    OrderViolationOpposite,
    /// The newer label opened a new hemisphere and ran into a label across
    /// the boundary.
    HemisphereBoundary,
}

/// Labels whose arc fraction falls strictly below the threshold are hidden
/// before collision resolution and never participate in it. A fraction
/// exactly at the threshold survives.
pub(super) fn hide_below_min_angle(records: &mut [LabelRecord], min_angle: f32) {
    for record in records {
        if record.arc_fraction < min_angle {
            record.hidden = true;
        }
    }
}

/// Stacking runs downward on the right hemisphere (angles 0..180 sweep top
/// to bottom) and upward on the left.
fn stacks_down(hemisphere: Hemisphere) -> bool {
    hemisphere == Hemisphere::Right
}

fn center_y(record: &LabelRecord) -> f32 {
    record.y + record.h / 2.0
}

/// Classify the conflict between a newer label and an already-placed one,
/// if any. Stacking-order violations count as conflicts even before the
/// boxes touch, so repaired labels cannot leapfrog their neighbors.
pub(super) fn classify(newer: &LabelRecord, placed: &LabelRecord) -> Option<CollisionTrigger> {
    let overlap = newer.bbox().intersects(&placed.bbox());
    if newer.hemisphere != placed.hemisphere {
        return overlap.then_some(CollisionTrigger::HemisphereBoundary);
    }
    let order_violated = if stacks_down(newer.hemisphere) {
        center_y(newer) < center_y(placed)
    } else {
        center_y(newer) > center_y(placed)
    };
    if order_violated {
        if newer.quadrant == placed.quadrant {
            return Some(CollisionTrigger::OrderViolationSame);
        }
        return Some(CollisionTrigger::OrderViolationOpposite);
    }
    overlap.then_some(CollisionTrigger::DirectOverlap)
}

/// Hide the lower-priority label of a conflicting pair. Larger arc
/// fractions always win; a tie hides the later index.
fn hide_smaller(records: &mut [LabelRecord], i: usize, j: usize) {
    if records[i].arc_fraction < records[j].arc_fraction {
        records[i].hidden = true;
    } else if records[j].arc_fraction < records[i].arc_fraction {
        records[j].hidden = true;
    } else {
        records[i.max(j)].hidden = true;
    }
}

/// Move the label to `new_y`, recomputing x so the anchor corner keeps its
/// original distance from the center. Fails when the requested y is beyond
/// the label's leader-line circle.
fn reposition_on_radius(ctx: &LayoutContext<'_>, record: &mut LabelRecord, new_y: f32) -> bool {
    let anchor_y = match record.quadrant {
        Quadrant::UpperRight | Quadrant::UpperLeft => new_y + record.h,
        Quadrant::LowerRight | Quadrant::LowerLeft => new_y,
    };
    let dy = ctx.center.y - anchor_y;
    let disc = record.radius * record.radius - dy * dy;
    if disc < 0.0 {
        return false;
    }
    let dx = disc.sqrt();
    let anchor_x = match record.hemisphere {
        Hemisphere::Right => ctx.center.x + dx,
        Hemisphere::Left => ctx.center.x - dx,
    };
    record.place_at_anchor(Point::new(anchor_x, anchor_y));
    record.x_changed = true;
    true
}

/// If the box leaks past the canvas margin, wrap the text against the space
/// actually available on its side instead of failing.
fn clamp_to_canvas(ctx: &LayoutContext<'_>, record: &mut LabelRecord) -> Result<()> {
    let margin = ctx.config.labels.canvas_margin;
    let max_x = ctx.config.width - margin;
    if record.x >= margin && record.x + record.w <= max_x {
        return Ok(());
    }
    let anchor = record.anchor();
    let budget = side_budget(ctx, record);
    let (lines, w, h) = measure_record(
        &record.text,
        record.value_text.as_deref(),
        record.font_size,
        record.value_font_size,
        budget,
        ctx,
    )?;
    record.lines = lines;
    record.w = w;
    record.h = h;
    record.place_at_anchor(anchor);
    record.x_changed = true;
    Ok(())
}

/// Horizontal space between the label's anchor and the canvas margin on its
/// side.
fn side_budget(ctx: &LayoutContext<'_>, record: &LabelRecord) -> f32 {
    let margin = ctx.config.labels.canvas_margin;
    let anchor = record.anchor();
    let budget = match record.hemisphere {
        Hemisphere::Right => ctx.config.width - margin - anchor.x,
        Hemisphere::Left => anchor.x - margin,
    };
    budget.max(ctx.config.labels.min_font_size)
}

/// Forward pass in segment index order. Each label is checked against every
/// previously placed visible label; conflicts shift the new label along its
/// hemisphere with its leader-line radius preserved, and hide the smaller
/// label when no valid shift exists.
pub(super) fn resolve(ctx: &LayoutContext<'_>, records: &mut [LabelRecord]) -> Result<()> {
    for i in 0..records.len() {
        if records[i].hidden {
            continue;
        }
        let mut rounds = 0;
        loop {
            let conflict = (0..i)
                .filter(|&j| !records[j].hidden)
                .find_map(|j| classify(&records[i], &records[j]).map(|t| (j, t)));
            let Some((j, trigger)) = conflict else {
                break;
            };
            rounds += 1;
            if rounds > MAX_REPAIR_ROUNDS {
                hide_smaller(records, i, j);
                if records[i].hidden {
                    break;
                }
                continue;
            }

            let down = stacks_down(records[i].hemisphere);
            let new_y = match trigger {
                CollisionTrigger::HemisphereBoundary => {
                    // Align with the neighbor first; if that was already
                    // tried, fall back to a vertical shift on our own side.
                    if (records[i].y - records[j].y).abs() < 0.5 {
                        shifted_y(&records[i], &records[j], down)
                    } else {
                        records[j].y
                    }
                }
                _ => shifted_y(&records[i], &records[j], down),
            };

            if !records[i].y_limit.contains(new_y)
                || !reposition_on_radius(ctx, &mut records[i], new_y)
            {
                hide_smaller(records, i, j);
                if records[i].hidden {
                    break;
                }
                continue;
            }
            clamp_to_canvas(ctx, &mut records[i])?;
        }
    }
    Ok(())
}

fn shifted_y(newer: &LabelRecord, placed: &LabelRecord, down: bool) -> f32 {
    if down {
        placed.y + placed.h + 1.0
    } else {
        placed.y - newer.h - 1.0
    }
}

/// Second pass: grow fonts from the minimum, one point per iteration, in
/// descending value order. A label stops growing permanently the moment a
/// new collision (or a canvas overflow) appears; labels whose x was already
/// repaired never grow. Bounded by the larger of the two font maxima.
pub(super) fn grow_fonts(ctx: &LayoutContext<'_>, records: &mut [LabelRecord]) -> Result<()> {
    let cfg = &ctx.config.labels;
    let max_size = cfg.max_label_font_size.max(cfg.max_value_font_size);
    if max_size <= cfg.min_font_size {
        return Ok(());
    }

    let mut order: Vec<usize> = (0..records.len())
        .filter(|&i| !records[i].hidden && !records[i].x_changed)
        .collect();
    order.sort_by(|&a, &b| {
        records[b]
            .arc_fraction
            .partial_cmp(&records[a].arc_fraction)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });

    let steps = (max_size - cfg.min_font_size).ceil() as usize;
    for _ in 0..steps {
        let mut grew_any = false;
        for &i in &order {
            if records[i].hidden || records[i].x_changed {
                continue;
            }
            let new_font = (records[i].font_size + 1.0).min(cfg.max_label_font_size);
            let new_value_font = (records[i].value_font_size + 1.0).min(cfg.max_value_font_size);
            if new_font <= records[i].font_size && new_value_font <= records[i].value_font_size {
                // Fully grown.
                records[i].x_changed = true;
                continue;
            }

            let snapshot = records[i].clone();
            let anchor = records[i].anchor();
            let budget = side_budget(ctx, &records[i]);
            let (lines, w, h) = measure_record(
                &records[i].text,
                records[i].value_text.as_deref(),
                new_font,
                new_value_font,
                budget,
                ctx,
            )?;
            records[i].font_size = new_font;
            records[i].value_font_size = new_value_font;
            records[i].lines = lines;
            records[i].w = w;
            records[i].h = h;
            records[i].place_at_anchor(anchor);

            if grown_label_conflicts(ctx, records, i) {
                records[i] = snapshot;
                records[i].x_changed = true;
            } else {
                grew_any = true;
            }
        }
        if !grew_any {
            break;
        }
    }
    Ok(())
}

fn grown_label_conflicts(ctx: &LayoutContext<'_>, records: &[LabelRecord], i: usize) -> bool {
    let margin = ctx.config.labels.canvas_margin;
    let record = &records[i];
    if record.x < margin
        || record.x + record.w > ctx.config.width - margin
        || record.y < margin
        || record.y + record.h > ctx.config.height - margin
    {
        return true;
    }
    records.iter().enumerate().any(|(j, other)| {
        j != i && !other.hidden && record.bbox().intersects(&other.bbox())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::ir::{ChartData, SegmentData};
    use crate::layout::{build_labels, build_segments, LayoutContext};
    use crate::measure::MetricsTable;
    use crate::theme::Theme;

    fn chart(values: &[f32]) -> ChartData {
        ChartData {
            title: None,
            segments: values
                .iter()
                .enumerate()
                .map(|(i, v)| SegmentData {
                    label: format!("segment {i}"),
                    value: *v,
                    group: None,
                })
                .collect(),
        }
    }

    fn run_pipeline(values: &[f32], config: &ChartConfig) -> Vec<LabelRecord> {
        let theme = Theme::modern();
        let ctx = LayoutContext {
            center: Point::new(config.width / 2.0, config.height / 2.0),
            outer_radius: config.outer_radius(),
            inner_radius: config.inner_radius(),
            config,
            theme: &theme,
            measurer: &MetricsTable,
        };
        let segments = build_segments(&chart(values), &theme).unwrap();
        let mut records = build_labels(&ctx, &segments).unwrap();
        hide_below_min_angle(&mut records, config.labels.min_angle);
        resolve(&ctx, &mut records).unwrap();
        grow_fonts(&ctx, &mut records).unwrap();
        records
    }

    #[test]
    fn visible_labels_never_overlap() {
        let config = ChartConfig::default();
        let records = run_pipeline(&[50.0, 20.0, 15.0, 10.0, 5.0], &config);
        let visible: Vec<_> = records.iter().filter(|r| !r.hidden).collect();
        for a in 0..visible.len() {
            for b in (a + 1)..visible.len() {
                assert!(
                    !visible[a].bbox().intersects(&visible[b].bbox()),
                    "labels {} and {} overlap",
                    visible[a].index,
                    visible[b].index
                );
            }
        }
    }

    #[test]
    fn many_thin_segments_degrade_by_hiding_not_overlapping() {
        let config = ChartConfig {
            width: 260.0,
            height: 260.0,
            margin: 60.0,
            ..ChartConfig::default()
        };
        let values: Vec<f32> = (0..24).map(|i| 1.0 + (i % 3) as f32).collect();
        let records = run_pipeline(&values, &config);
        let visible: Vec<_> = records.iter().filter(|r| !r.hidden).collect();
        assert!(visible.len() < records.len(), "expected some labels hidden");
        for a in 0..visible.len() {
            for b in (a + 1)..visible.len() {
                assert!(!visible[a].bbox().intersects(&visible[b].bbox()));
            }
        }
    }

    #[test]
    fn hidden_labels_have_no_larger_survivor_neighbors() {
        // Priority preservation: a hidden label never has a strictly larger
        // arc fraction than a visible one it collided with. Weaker global
        // check: the largest segment is always visible.
        let config = ChartConfig {
            width: 240.0,
            height: 240.0,
            margin: 50.0,
            ..ChartConfig::default()
        };
        let records = run_pipeline(&[40.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 40.0], &config);
        let max_fraction = records
            .iter()
            .map(|r| r.arc_fraction)
            .fold(0.0f32, f32::max);
        assert!(records
            .iter()
            .any(|r| !r.hidden && (r.arc_fraction - max_fraction).abs() < 1e-6));
    }

    #[test]
    fn below_threshold_is_hidden_before_resolution() {
        let mut config = ChartConfig::default();
        config.labels.min_angle = 0.05;
        let records = run_pipeline(&[99.0, 1.0], &config);
        assert!(records[1].hidden, "1% segment must hide at 5% threshold");
        assert!(!records[0].hidden);
    }

    #[test]
    fn exactly_at_threshold_survives() {
        let mut config = ChartConfig::default();
        config.labels.min_angle = 0.05;
        let records = run_pipeline(&[50.0, 20.0, 15.0, 10.0, 5.0], &config);
        // 5/100 == 0.05: boundary case must not hide.
        assert!(!records[4].hidden);
    }

    #[test]
    fn growth_stops_at_configured_maximum() {
        let config = ChartConfig::default();
        let records = run_pipeline(&[1.0, 1.0, 1.0], &config);
        for record in records.iter().filter(|r| !r.hidden) {
            assert!(record.font_size <= config.labels.max_label_font_size);
            assert!(record.value_font_size <= config.labels.max_value_font_size);
            assert!(record.font_size >= config.labels.min_font_size);
        }
    }

    #[test]
    fn uncontested_labels_grow_beyond_minimum() {
        let config = ChartConfig {
            width: 900.0,
            height: 900.0,
            margin: 250.0,
            ..ChartConfig::default()
        };
        let records = run_pipeline(&[60.0, 40.0], &config);
        assert!(records
            .iter()
            .any(|r| !r.hidden && r.font_size > config.labels.min_font_size));
    }

    #[test]
    fn classify_reports_order_violation() {
        let config = ChartConfig::default();
        let records = run_pipeline(&[30.0, 30.0, 40.0], &config);
        let mut newer = records[1].clone();
        let placed = records[0].clone();
        if newer.hemisphere == placed.hemisphere {
            // Force the newer label well above its predecessor.
            newer.y = placed.y - newer.h - 50.0;
            let trigger = classify(&newer, &placed).expect("expected a conflict");
            assert!(matches!(
                trigger,
                CollisionTrigger::OrderViolationSame | CollisionTrigger::OrderViolationOpposite
            ));
        }
    }
}
