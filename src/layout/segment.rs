use serde::Serialize;

use crate::error::{ChartError, Result};
use crate::ir::ChartData;
use crate::theme::Theme;

/// One chart segment with derived angles. Immutable once built; angles come
/// from cumulative value ratios over the total, measured clockwise in
/// degrees with 0 at 12 o'clock.
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub index: usize,
    pub label: String,
    pub value: f32,
    pub color: String,
    pub start_angle: f32,
    pub end_angle: f32,
    pub group: Option<String>,
}

impl Segment {
    pub fn mid_angle(&self) -> f32 {
        (self.start_angle + self.end_angle) / 2.0
    }

    pub fn span(&self) -> f32 {
        self.end_angle - self.start_angle
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AngleOptions {
    /// Sum all segment values from 0 through `index` (the trailing edge).
    /// When false, only the segment's own span is returned.
    pub compounded: bool,
    /// Subtract half the segment's own span, yielding the angle at the
    /// segment's center rather than its trailing edge.
    pub midpoint: bool,
}

impl Default for AngleOptions {
    fn default() -> Self {
        Self {
            compounded: true,
            midpoint: false,
        }
    }
}

/// Angle in degrees for segment `index` over `values`.
///
/// Fails with [`ChartError::InvalidChartData`] for a non-positive total
/// rather than silently producing NaN.
pub fn segment_angle(index: usize, values: &[f32], total: f32, opts: AngleOptions) -> Result<f32> {
    if total <= 0.0 || !total.is_finite() {
        return Err(ChartError::InvalidChartData(format!(
            "cannot compute angles over total {total}"
        )));
    }
    let Some(own) = values.get(index) else {
        return Err(ChartError::InvalidChartData(format!(
            "segment index {index} out of range ({} segments)",
            values.len()
        )));
    };
    let own_span = own / total * 360.0;
    let mut angle = if opts.compounded {
        let cumulative: f32 = values[..=index].iter().sum();
        cumulative / total * 360.0
    } else {
        own_span
    };
    if opts.midpoint {
        angle -= own_span / 2.0;
    }
    Ok(angle)
}

/// Build the segment list from validated chart data, assigning palette
/// colors in input order.
pub fn build_segments(data: &ChartData, theme: &Theme) -> Result<Vec<Segment>> {
    let total = data.total();
    let values: Vec<f32> = data.segments.iter().map(|s| s.value).collect();
    let mut segments = Vec::with_capacity(data.segments.len());
    let mut start = 0.0f32;
    for (index, segment) in data.segments.iter().enumerate() {
        let end = segment_angle(index, &values, total, AngleOptions::default())?;
        segments.push(Segment {
            index,
            label: segment.label.clone(),
            value: segment.value,
            color: theme.segment_color(index).to_string(),
            start_angle: start,
            end_angle: end,
            group: segment.group.clone(),
        });
        start = end;
    }
    Ok(segments)
}
