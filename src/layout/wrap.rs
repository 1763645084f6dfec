//! Greedy word wrapping against a pixel budget. All widths come from the
//! caller's [`TextMeasurer`], so the same code serves both the system-font
//! backend and the deterministic test table.

use crate::error::Result;
use crate::measure::TextMeasurer;

pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\\n", "\n")
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}

/// Break `line` into lines no wider than `max_width`. A line that already
/// fits is returned unchanged. A single word wider than the budget gets a
/// line of its own; wrapping cannot shrink below one word per line.
pub fn wrap_line(
    line: &str,
    max_width: f32,
    font_size: f32,
    measurer: &dyn TextMeasurer,
) -> Result<Vec<String>> {
    if measurer.text_width(line, font_size)? <= max_width {
        return Ok(vec![line.to_string()]);
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measurer.text_width(&candidate, font_size)? > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    Ok(lines)
}

/// Wrap every raw line of `text` and report the block's measured extent.
/// Height advances by the measurer's line height per wrapped line.
pub fn wrap_block(
    text: &str,
    max_width: f32,
    font_size: f32,
    measurer: &dyn TextMeasurer,
) -> Result<(Vec<String>, f32, f32)> {
    let mut lines = Vec::new();
    for raw in split_lines(text) {
        lines.extend(wrap_line(&raw, max_width, font_size, measurer)?);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    let mut width = 0.0f32;
    for line in &lines {
        width = width.max(measurer.text_width(line, font_size)?);
    }
    let height = lines.len() as f32 * measurer.line_height(font_size);
    Ok((lines, width, height))
}
