//! Layout pipeline: segment angles, label records, collision resolution,
//! font growth, leader lines. Everything runs synchronously in one call and
//! rebuilds all records from scratch; nothing is kept between renders.

mod collide;
mod labels;
mod lines;
mod segment;
mod wrap;

pub use collide::CollisionTrigger;
pub use labels::{GroupLabel, Hemisphere, LabelRecord, Quadrant, YLimit};
pub use lines::{leader_line_paths, LeaderLine, PathKind};
pub use segment::{build_segments, segment_angle, AngleOptions, Segment};
pub use wrap::{split_lines, wrap_block, wrap_line};

pub(crate) use labels::build_labels;

use serde::Serialize;

use crate::config::ChartConfig;
use crate::error::Result;
use crate::geometry::{point_at_angle, Point};
use crate::ir::ChartData;
use crate::measure::TextMeasurer;
use crate::theme::Theme;

/// Shared read-only state threaded through every layout phase.
pub struct LayoutContext<'a> {
    pub center: Point,
    pub outer_radius: f32,
    pub inner_radius: f32,
    pub config: &'a ChartConfig,
    pub theme: &'a Theme,
    pub measurer: &'a dyn TextMeasurer,
}

impl<'a> LayoutContext<'a> {
    pub fn new(
        config: &'a ChartConfig,
        theme: &'a Theme,
        measurer: &'a dyn TextMeasurer,
    ) -> Self {
        let (cx, cy) = config.center();
        Self {
            center: Point::new(cx, cy),
            outer_radius: config.outer_radius(),
            inner_radius: config.inner_radius(),
            config,
            theme,
            measurer,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TitleLayout {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Complete layout for one render: segments with angles, resolved label
/// records, leader-line paths and inner-ring group labels.
#[derive(Debug, Clone, Serialize)]
pub struct ChartLayout {
    pub width: f32,
    pub height: f32,
    pub center: (f32, f32),
    pub outer_radius: f32,
    pub inner_radius: f32,
    pub title: Option<TitleLayout>,
    pub segments: Vec<Segment>,
    pub labels: Vec<LabelRecord>,
    pub lines: Vec<LeaderLine>,
    pub groups: Vec<GroupLabel>,
}

/// Outer-label layout only: validates the data, builds one record per
/// segment and resolves all collisions. The returned records are final;
/// hidden ones carry `hidden = true` rather than being removed, so indices
/// stay aligned with segments.
pub fn compute_outer_label_layout(
    data: &ChartData,
    config: &ChartConfig,
    theme: &Theme,
    measurer: &dyn TextMeasurer,
) -> Result<Vec<LabelRecord>> {
    data.validate()?;
    let segments = build_segments(data, theme)?;
    let ctx = LayoutContext::new(config, theme, measurer);
    resolve_labels(&ctx, &segments)
}

/// Label pipeline over pre-built segments: place, hide tiny arcs, resolve
/// collisions, grow fonts.
fn resolve_labels(ctx: &LayoutContext<'_>, segments: &[Segment]) -> Result<Vec<LabelRecord>> {
    let mut records = build_labels(ctx, segments)?;
    collide::hide_below_min_angle(&mut records, ctx.config.labels.min_angle);
    collide::resolve(ctx, &mut records)?;
    collide::grow_fonts(ctx, &mut records)?;
    Ok(records)
}

/// Full chart layout: everything the SVG renderer needs. Validates once and
/// builds the segment list once, sharing it between the label pipeline and
/// the returned layout.
pub fn compute_layout(
    data: &ChartData,
    config: &ChartConfig,
    theme: &Theme,
    measurer: &dyn TextMeasurer,
) -> Result<ChartLayout> {
    data.validate()?;
    let segments = build_segments(data, theme)?;
    let ctx = LayoutContext::new(config, theme, measurer);
    let labels = resolve_labels(&ctx, &segments)?;
    let lines = leader_line_paths(&ctx, &labels);
    let groups = group_labels(&ctx, &segments);
    let title = data.title.as_ref().map(|text| TitleLayout {
        text: text.clone(),
        x: ctx.center.x,
        y: (config.margin * 0.4).max(config.title_text_size),
    });
    Ok(ChartLayout {
        width: config.width,
        height: config.height,
        center: (ctx.center.x, ctx.center.y),
        outer_radius: ctx.outer_radius,
        inner_radius: ctx.inner_radius,
        title,
        segments,
        labels,
        lines,
        groups,
    })
}

/// One label per contiguous run of segments sharing a group name, centered
/// on the run's angular midpoint inside the inner ring.
fn group_labels(ctx: &LayoutContext<'_>, segments: &[Segment]) -> Vec<GroupLabel> {
    let mut groups: Vec<GroupLabel> = Vec::new();
    let radius = ctx.inner_radius * 0.7;
    let mut run: Option<(String, f32, f32)> = None;

    let mut flush = |run: &mut Option<(String, f32, f32)>, groups: &mut Vec<GroupLabel>| {
        if let Some((name, start, end)) = run.take() {
            let mid_angle = (start + end) / 2.0;
            let at = point_at_angle(ctx.center, radius, mid_angle);
            groups.push(GroupLabel {
                name,
                x: at.x,
                y: at.y,
                mid_angle,
                font_size: ctx.config.group_text_size,
            });
        }
    };

    for segment in segments {
        let extends_run = matches!(
            (&segment.group, &run),
            (Some(name), Some((current, _, _))) if name == current
        );
        if extends_run {
            if let Some((_, _, end)) = run.as_mut() {
                *end = segment.end_angle;
            }
            continue;
        }
        flush(&mut run, &mut groups);
        if let Some(name) = &segment.group {
            run = Some((name.clone(), segment.start_angle, segment.end_angle));
        }
    }
    flush(&mut run, &mut groups);
    groups
}
