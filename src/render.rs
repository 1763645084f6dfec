use crate::config::ChartConfig;
use crate::geometry::{point_at_angle, Point};
use crate::layout::{ChartLayout, LabelRecord, LeaderLine, PathKind};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(layout: &ChartLayout, theme: &Theme, config: &ChartConfig) -> String {
    let mut svg = String::new();
    let width = layout.width.max(1.0);
    let height = layout.height.max(1.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    let center = Point::new(layout.center.0, layout.center.1);
    for segment in &layout.segments {
        let d = annular_path(
            center,
            layout.outer_radius,
            layout.inner_radius,
            segment.start_angle,
            segment.end_angle,
        );
        svg.push_str(&format!(
            "<path d=\"{d}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            segment.color, theme.segment_stroke
        ));
    }

    for line in &layout.lines {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\"/>",
            leader_path(line),
            line.color
        ));
    }

    for record in &layout.labels {
        if record.hidden {
            continue;
        }
        svg.push_str(&label_svg(record, theme));
    }

    for group in &layout.groups {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            group.x,
            group.y,
            theme.font_family,
            group.font_size,
            theme.label_color,
            escape_xml(&group.name)
        ));
    }

    if let Some(title) = &layout.title {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
            title.x,
            title.y,
            theme.font_family,
            config.title_text_size,
            theme.title_color,
            escape_xml(&title.text)
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// SVG path for an annular sector (or a full pie wedge when the inner
/// radius is zero). A full-circle segment is clamped just short of 360 so
/// the arc endpoints stay distinct.
fn annular_path(center: Point, outer: f32, inner: f32, start_deg: f32, end_deg: f32) -> String {
    let span = (end_deg - start_deg).min(359.99);
    let end_deg = start_deg + span;
    let large = if span > 180.0 { 1 } else { 0 };
    let o1 = point_at_angle(center, outer, start_deg);
    let o2 = point_at_angle(center, outer, end_deg);
    if inner <= 0.0 {
        return format!(
            "M {:.2} {:.2} L {:.2} {:.2} A {outer:.2} {outer:.2} 0 {large} 1 {:.2} {:.2} Z",
            center.x, center.y, o1.x, o1.y, o2.x, o2.y
        );
    }
    let i1 = point_at_angle(center, inner, start_deg);
    let i2 = point_at_angle(center, inner, end_deg);
    format!(
        "M {:.2} {:.2} A {outer:.2} {outer:.2} 0 {large} 1 {:.2} {:.2} L {:.2} {:.2} A {inner:.2} {inner:.2} 0 {large} 0 {:.2} {:.2} Z",
        o1.x, o1.y, o2.x, o2.y, i2.x, i2.y, i1.x, i1.y
    )
}

fn leader_path(line: &LeaderLine) -> String {
    let p = &line.points;
    match (line.kind, p.len()) {
        (PathKind::Curved, 3) => format!(
            "M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
            p[0].x, p[0].y, p[1].x, p[1].y, p[2].x, p[2].y
        ),
        _ => {
            let mut d = String::new();
            for (idx, point) in p.iter().enumerate() {
                let op = if idx == 0 { 'M' } else { 'L' };
                d.push_str(&format!("{op} {:.2} {:.2} ", point.x, point.y));
            }
            d.trim_end().to_string()
        }
    }
}

fn label_svg(record: &LabelRecord, theme: &Theme) -> String {
    // Text grows away from the circle: left-hemisphere labels anchor on
    // their right edge.
    let (anchor, x) = match record.hemisphere {
        crate::layout::Hemisphere::Right => ("start", record.x),
        crate::layout::Hemisphere::Left => ("end", record.x + record.w),
    };
    let line_height = record.font_size * 1.1;
    let mut text = String::new();
    text.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{:.2}\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        record.y + record.font_size,
        theme.font_family,
        record.font_size,
        theme.label_color
    ));
    for (idx, line) in record.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    if let Some(value) = &record.value_text {
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{:.2}\" font-size=\"{}\" fill=\"{}\">{}</tspan>",
            record.value_font_size * 1.1,
            record.value_font_size,
            theme.value_color,
            escape_xml(value)
        ));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{svg}");
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .unwrap_or("sans-serif")
        .trim()
        .to_string();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::ir::{ChartData, SegmentData};
    use crate::layout::compute_layout;
    use crate::measure::MetricsTable;

    fn sample_layout() -> (ChartLayout, Theme, ChartConfig) {
        let config = ChartConfig::default();
        let theme = Theme::modern();
        let data = ChartData {
            title: Some("Browsers".to_string()),
            segments: vec![
                SegmentData {
                    label: "Chrome & co".to_string(),
                    value: 65.0,
                    group: None,
                },
                SegmentData {
                    label: "Firefox".to_string(),
                    value: 20.0,
                    group: None,
                },
                SegmentData {
                    label: "Safari".to_string(),
                    value: 15.0,
                    group: None,
                },
            ],
        };
        let layout = compute_layout(&data, &config, &theme, &MetricsTable).unwrap();
        (layout, theme, config)
    }

    #[test]
    fn render_svg_basic() {
        let (layout, theme, config) = sample_layout();
        let svg = render_svg(&layout, &theme, &config);
        assert!(svg.contains("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Firefox"));
        assert!(svg.contains("Browsers"));
    }

    #[test]
    fn render_escapes_markup_in_labels() {
        // The label may be re-wrapped across tspans, so check the escaped
        // entity and the absence of a raw ampersand rather than the full
        // contiguous string.
        let (layout, theme, config) = sample_layout();
        let svg = render_svg(&layout, &theme, &config);
        assert!(svg.contains("&amp;"));
        assert!(!svg.contains("& co"));
    }

    #[test]
    fn hidden_labels_are_not_painted() {
        let (mut layout, theme, config) = sample_layout();
        layout.labels[2].hidden = true;
        layout.lines.retain(|line| line.index != 2);
        let svg = render_svg(&layout, &theme, &config);
        assert!(!svg.contains("Safari"));
    }

    #[test]
    fn annular_path_is_closed_and_arced() {
        let d = annular_path(Point::new(100.0, 100.0), 80.0, 40.0, 0.0, 120.0);
        assert!(d.starts_with('M'));
        assert!(d.ends_with('Z'));
        assert_eq!(d.matches('A').count(), 2);
    }

    #[test]
    fn zero_inner_radius_renders_a_wedge() {
        let d = annular_path(Point::new(0.0, 0.0), 50.0, 0.0, 0.0, 90.0);
        assert_eq!(d.matches('A').count(), 1);
        assert!(d.contains('L'));
    }
}
