use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};

/// One input slice of the chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentData {
    pub label: String,
    pub value: f32,
    /// Optional secondary-ring grouping. Segments sharing a group name are
    /// annotated with one group label on the inner ring.
    #[serde(default)]
    pub group: Option<String>,
}

/// Chart input as supplied by the caller (or parsed from a JSON/JSON5 file
/// by the CLI). Immutable once validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub title: Option<String>,
    pub segments: Vec<SegmentData>,
}

impl ChartData {
    /// Sum of all segment values. Only meaningful after [`validate`].
    ///
    /// [`validate`]: ChartData::validate
    pub fn total(&self) -> f32 {
        self.segments.iter().map(|s| s.value).sum()
    }

    /// Fail-fast check run before any layout work. A chart whose total is
    /// zero or negative has no defined angles, and a negative segment value
    /// would silently corrupt every cumulative angle after it.
    pub fn validate(&self) -> Result<()> {
        if self.segments.is_empty() {
            return Err(ChartError::InvalidChartData(
                "chart has no segments".to_string(),
            ));
        }
        for segment in &self.segments {
            if segment.value < 0.0 || !segment.value.is_finite() {
                return Err(ChartError::InvalidChartData(format!(
                    "segment {:?} has invalid value {}",
                    segment.label, segment.value
                )));
            }
        }
        let total = self.total();
        if total <= 0.0 {
            return Err(ChartError::InvalidChartData(format!(
                "total value must be positive, got {total}"
            )));
        }
        Ok(())
    }
}
