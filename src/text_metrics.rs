//! Text width measurement for deriving label footprints.
//!
//! With the `fonts` feature the width comes from real glyph advances of the
//! first installed font matching the configured family list. Without it, or
//! when fast metrics are requested, an average character width estimate is
//! used, which keeps results identical across machines.

#[cfg(feature = "fonts")]
use std::collections::HashMap;
#[cfg(feature = "fonts")]
use std::sync::Mutex;

#[cfg(feature = "fonts")]
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
#[cfg(feature = "fonts")]
use once_cell::sync::Lazy;
#[cfg(feature = "fonts")]
use ttf_parser::Face;

/// Average glyph advance relative to the font size used by the estimate.
const AVERAGE_CHAR_EM: f64 = 0.56;
const WIDE_CHAR_EM: f64 = 1.0;

#[cfg(feature = "fonts")]
static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Width of `text` in pixels. Never fails: falls back to the estimate when no
/// font can be loaded.
pub fn measure_text_width(text: &str, font_size: f64, font_family: &str, fast: bool) -> f64 {
    if text.is_empty() || font_size <= 0.0 {
        return 0.0;
    }
    if !fast && let Some(width) = measure_with_font(text, font_size, font_family) {
        return width;
    }
    estimate_text_width(text, font_size)
}

pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(|ch| {
            if is_wide(ch) {
                WIDE_CHAR_EM
            } else {
                AVERAGE_CHAR_EM
            }
        })
        .sum::<f64>()
        * font_size
}

fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF | 0xFF00..=0xFF60)
}

#[cfg(feature = "fonts")]
fn measure_with_font(text: &str, font_size: f64, font_family: &str) -> Option<f64> {
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

#[cfg(not(feature = "fonts"))]
fn measure_with_font(_text: &str, _font_size: f64, _font_family: &str) -> Option<f64> {
    None
}

#[cfg(feature = "fonts")]
struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

#[cfg(feature = "fonts")]
impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f64, font_family: &str) -> Option<f64> {
        let key = font_family.trim().to_string();
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font_family);
            self.faces.insert(key.clone(), face);
        }
        self.faces.get(&key)?.as_ref()?.measure_width(text, font_size)
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "ui-sans-serif" => Family::SansSerif,
                "monospace" | "ui-monospace" => Family::Monospace,
                _ => Family::Name(name.as_str()),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
            .flatten()
    }
}

/// Parsed font bytes plus a precomputed ASCII advance table.
#[cfg(feature = "fonts")]
struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
}

#[cfg(feature = "fonts")]
impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
        })
    }

    fn measure_width(&self, text: &str, font_size: f64) -> Option<f64> {
        let scale = font_size / self.units_per_em as f64;
        let fallback = font_size * AVERAGE_CHAR_EM;
        if text.is_ascii() {
            let width = text
                .bytes()
                .filter(|byte| *byte != b'\n')
                .map(|byte| match self.ascii_advances[byte as usize] {
                    0 => fallback,
                    advance => advance as f64 * scale,
                })
                .sum::<f64>();
            return Some(width);
        }

        let face = Face::parse(&self.data, self.index).ok()?;
        let width = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map(|advance| advance as f64 * scale)
                    .unwrap_or(fallback)
            })
            .sum::<f64>();
        Some(width)
    }
}
