use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub font_family: String,
    pub background: String,
    pub title_color: String,
    pub label_color: String,
    pub value_color: String,
    pub segment_stroke: String,
    pub segment_colors: Vec<String>,
}

impl Theme {
    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            background: "#FFFFFF".to_string(),
            title_color: "#1C2430".to_string(),
            label_color: "#1C2430".to_string(),
            value_color: "#5B6B82".to_string(),
            segment_stroke: "#FFFFFF".to_string(),
            segment_colors: vec![
                "#4E79A7".to_string(),
                "#F28E2B".to_string(),
                "#E15759".to_string(),
                "#76B7B2".to_string(),
                "#59A14F".to_string(),
                "#EDC948".to_string(),
                "#B07AA1".to_string(),
                "#FF9DA7".to_string(),
                "#9C755F".to_string(),
                "#BAB0AC".to_string(),
            ],
        }
    }

    /// Color for segment `index`, cycling through the palette.
    pub fn segment_color(&self, index: usize) -> &str {
        if self.segment_colors.is_empty() {
            return "#888888";
        }
        &self.segment_colors[index % self.segment_colors.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::modern()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_color_cycles() {
        let theme = Theme::modern();
        let n = theme.segment_colors.len();
        assert_eq!(theme.segment_color(0), theme.segment_color(n));
    }
}
