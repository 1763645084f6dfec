//! Text measurement behind a capability trait so layout code never touches
//! a font backend directly. Production code uses [`SystemFonts`]; tests use
//! the deterministic [`MetricsTable`] so layouts are reproducible on any
//! machine.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

use crate::error::{ChartError, Result};

pub trait TextMeasurer {
    /// Width in px of a single line of `text` at `font_size`.
    fn text_width(&self, text: &str, font_size: f32) -> Result<f32>;

    /// Vertical advance per wrapped line.
    fn line_height(&self, font_size: f32) -> f32 {
        font_size * 1.1
    }
}

/// Deterministic width table, no font backend required. Widths are em
/// fractions bucketed by glyph class; coarse, but stable across platforms,
/// which is what collision tests need.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsTable;

impl MetricsTable {
    fn char_em(ch: char) -> f32 {
        match ch {
            'i' | 'j' | 'l' | 'I' | '!' | '|' | '.' | ',' | ':' | ';' | '\'' => 0.28,
            'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.36,
            ' ' => 0.32,
            'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' => 0.92,
            'A'..='Z' => 0.68,
            '0'..='9' => 0.60,
            _ => 0.55,
        }
    }
}

impl TextMeasurer for MetricsTable {
    fn text_width(&self, text: &str, font_size: f32) -> Result<f32> {
        if font_size <= 0.0 {
            return Ok(0.0);
        }
        let em: f32 = text.chars().map(Self::char_em).sum();
        Ok(em * font_size)
    }
}

/// Measurer backed by the system font database. Face metrics are captured
/// once per family and reduced to an ASCII advance table; characters outside
/// ASCII fall back to an average width.
pub struct SystemFonts {
    font_family: String,
    inner: Mutex<Inner>,
}

struct Inner {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FaceMetrics>>,
}

struct FaceMetrics {
    units_per_em: u16,
    ascii_advances: [u16; 128],
}

static SHARED: Lazy<SystemFonts> = Lazy::new(|| SystemFonts::new("sans-serif"));

impl SystemFonts {
    pub fn new(font_family: &str) -> Self {
        Self {
            font_family: font_family.to_string(),
            inner: Mutex::new(Inner {
                db: Database::new(),
                loaded_system_fonts: false,
                faces: HashMap::new(),
            }),
        }
    }

    /// Process-wide instance over the default sans-serif stack.
    pub fn shared() -> &'static SystemFonts {
        &SHARED
    }
}

impl TextMeasurer for SystemFonts {
    fn text_width(&self, text: &str, font_size: f32) -> Result<f32> {
        if text.is_empty() || font_size <= 0.0 {
            return Ok(0.0);
        }
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| ChartError::LabelMeasurement("font cache poisoned".to_string()))?;
        let family = self.font_family.clone();
        let metrics = inner.face_metrics(&family).ok_or_else(|| {
            ChartError::LabelMeasurement(format!("no face found for {:?}", self.font_family))
        })?;
        let scale = font_size / metrics.units_per_em.max(1) as f32;
        let fallback = font_size * 0.56;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                metrics.ascii_advances[ch as usize]
            } else {
                0
            };
            if advance == 0 {
                width += fallback;
            } else {
                width += advance as f32 * scale;
            }
        }
        Ok(width.max(0.0))
    }
}

impl Inner {
    fn face_metrics(&mut self, font_family: &str) -> Option<&FaceMetrics> {
        let key = normalize_family_key(font_family);
        if !self.faces.contains_key(&key) {
            let loaded = self.load_face(font_family);
            self.faces.insert(key.clone(), loaded);
        }
        self.faces.get(&key).and_then(|m| m.as_ref())
    }

    fn load_face(&mut self, font_family: &str) -> Option<FaceMetrics> {
        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = Vec::with_capacity(names.len() + 1);
        for name in &names {
            match name.to_ascii_lowercase().as_str() {
                "serif" => families.push(Family::Serif),
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    families.push(Family::SansSerif)
                }
                "monospace" | "ui-monospace" => families.push(Family::Monospace),
                "cursive" => families.push(Family::Cursive),
                "fantasy" => families.push(Family::Fantasy),
                _ => families.push(Family::Name(name.as_str())),
            }
        }
        families.push(Family::SansSerif);

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut metrics: Option<FaceMetrics> = None;
        self.db.with_face_data(id, |data, index| {
            if let Ok(face) = Face::parse(data, index) {
                let mut advances = [0u16; 128];
                for byte in 0u8..=127 {
                    if let Some(glyph) = face.glyph_index(byte as char) {
                        advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
                    }
                }
                metrics = Some(FaceMetrics {
                    units_per_em: face.units_per_em().max(1),
                    ascii_advances: advances,
                });
            }
        });
        metrics
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_width_scales_linearly() {
        let table = MetricsTable;
        let w10 = table.text_width("Revenue", 10.0).unwrap();
        let w20 = table.text_width("Revenue", 20.0).unwrap();
        assert!((w20 - w10 * 2.0).abs() < 1e-3);
    }

    #[test]
    fn table_width_is_monotone_in_length() {
        let table = MetricsTable;
        let short = table.text_width("ab", 12.0).unwrap();
        let long = table.text_width("abcd", 12.0).unwrap();
        assert!(long > short);
    }

    #[test]
    fn empty_text_measures_zero() {
        assert_eq!(MetricsTable.text_width("", 12.0).unwrap(), 0.0);
    }

    #[test]
    fn line_height_default_is_one_point_one_em() {
        assert!((MetricsTable.line_height(10.0) - 11.0).abs() < 1e-3);
    }
}
