use thiserror::Error;

/// Errors surfaced by chart validation and layout.
///
/// Layout non-convergence is deliberately not represented here: when labels
/// cannot all fit, the resolver hides the lowest-priority ones and returns a
/// degraded but valid layout.
#[derive(Debug, Error)]
pub enum ChartError {
    /// The input data cannot produce a chart: zero or negative total, or a
    /// segment with a negative value. Raised before any layout work begins.
    #[error("invalid chart data: {0}")]
    InvalidChartData(String),

    /// The text measurer could not measure a label. Aborts the whole layout
    /// pass; callers should retry once the measurement backend is ready.
    #[error("label measurement failed: {0}")]
    LabelMeasurement(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;
