use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How leader lines are routed from the segment rim to the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Straight,
    Curved,
    Aligned,
}

/// Outer-label layout knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Font size every label starts at; the growth pass never goes below it.
    pub min_font_size: f32,
    pub max_label_font_size: f32,
    /// Value text grows independently of the main label text.
    pub max_value_font_size: f32,
    /// Horizontal gap between the circle and the near edge of a label box.
    pub horizontal_padding: f32,
    /// Radial distance between the outer radius and the label's ideal anchor.
    pub pie_distance: f32,
    /// Segments whose value/total falls strictly below this fraction are
    /// hidden before collision resolution starts.
    pub min_angle: f32,
    pub line_style: LineStyle,
    /// Labels are kept at least this far inside the canvas edge before text
    /// wrapping kicks in.
    pub canvas_margin: f32,
    pub show_values: bool,
    pub value_prefix: String,
    pub value_suffix: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            min_font_size: 10.0,
            max_label_font_size: 16.0,
            max_value_font_size: 14.0,
            horizontal_padding: 8.0,
            pie_distance: 16.0,
            min_angle: 0.0,
            line_style: LineStyle::Curved,
            canvas_margin: 5.0,
            show_values: true,
            value_prefix: String::new(),
            value_suffix: String::new(),
        }
    }
}

/// Canvas and ring geometry plus the label knobs. The center point and radii
/// are owned by the chart engine; the label layout only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f32,
    pub height: f32,
    /// Outer radius. `None` derives one from the canvas size and margin.
    pub outer_radius: Option<f32>,
    /// Inner radius as a fraction of the outer radius; 0 renders a full pie.
    pub inner_radius_ratio: f32,
    pub margin: f32,
    pub title_text_size: f32,
    pub group_text_size: f32,
    pub labels: LabelConfig,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
            outer_radius: None,
            inner_radius_ratio: 0.55,
            margin: 90.0,
            title_text_size: 18.0,
            group_text_size: 12.0,
            labels: LabelConfig::default(),
        }
    }
}

impl ChartConfig {
    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn outer_radius(&self) -> f32 {
        match self.outer_radius {
            Some(radius) => radius.max(1.0),
            None => (self.width.min(self.height) / 2.0 - self.margin).max(1.0),
        }
    }

    pub fn inner_radius(&self) -> f32 {
        self.outer_radius() * self.inner_radius_ratio.clamp(0.0, 0.95)
    }
}

/// Everything the CLI threads through a render: geometry, labels and theme.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub theme: Theme,
}

/// Optional JSON config file; unknown keys are rejected so typos surface
/// instead of silently falling back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    chart: Option<ChartConfig>,
    theme: Option<Theme>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;
    if let Some(chart) = parsed.chart {
        config.chart = chart;
    }
    if let Some(theme) = parsed.theme {
        config.theme = theme;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_radius_derived_from_canvas() {
        let config = ChartConfig {
            width: 500.0,
            height: 400.0,
            margin: 50.0,
            outer_radius: None,
            ..ChartConfig::default()
        };
        assert_eq!(config.outer_radius(), 150.0);
    }

    #[test]
    fn explicit_outer_radius_wins() {
        let config = ChartConfig {
            outer_radius: Some(120.0),
            ..ChartConfig::default()
        };
        assert_eq!(config.outer_radius(), 120.0);
        assert!(config.inner_radius() < 120.0);
    }

    #[test]
    fn line_style_parses_lowercase() {
        let style: LineStyle = serde_json::from_str("\"aligned\"").unwrap();
        assert_eq!(style, LineStyle::Aligned);
    }

    #[test]
    fn load_config_without_path_is_default() {
        let config = load_config(None).unwrap();
        assert_eq!(config.chart.width, 500.0);
    }
}
