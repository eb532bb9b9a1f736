//! Label measurement.
//!
//! [`TextMetrics`] is built once at start-up and then only read, so a
//! single instance can be shared by any number of concurrent renders.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use ttf_parser::Face;

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("no installed font matches '{0}'")]
    FontNotFound(String),
    #[error("failed to read font file {path}")]
    FontFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("font data for '{0}' could not be parsed")]
    InvalidFont(String),
}

/// Where to find the font used for measuring labels.
#[derive(Debug, Clone)]
pub struct FontSettings<'a> {
    pub family: &'a str,
    pub font_file: Option<&'a Path>,
    pub font_size: f32,
    pub line_height: f32,
}

#[derive(Debug, Clone)]
pub struct TextMetrics {
    font: Option<FontFace>,
    font_size: f32,
    line_height: f32,
}

impl TextMetrics {
    /// Resolves a real font and reads its glyph advances.
    pub fn load(settings: &FontSettings<'_>) -> Result<Self, MetricsError> {
        let mut db = Database::new();
        let face = match settings.font_file {
            Some(path) => {
                let data = std::fs::read(path).map_err(|source| MetricsError::FontFile {
                    path: path.to_path_buf(),
                    source,
                })?;
                db.load_font_data(data);
                let id = db
                    .faces()
                    .next()
                    .map(|info| info.id)
                    .ok_or_else(|| MetricsError::InvalidFont(path.display().to_string()))?;
                load_face(&db, id, &path.display().to_string())?
            }
            None => {
                db.load_system_fonts();
                let names = family_names(settings.family);
                let families = families_for(&names);
                let query = Query {
                    families: &families,
                    weight: Weight::NORMAL,
                    stretch: Stretch::Normal,
                    style: Style::Normal,
                };
                let id = db
                    .query(&query)
                    .ok_or_else(|| MetricsError::FontNotFound(settings.family.to_string()))?;
                load_face(&db, id, settings.family)?
            }
        };
        tracing::debug!(
            family = settings.family,
            units_per_em = face.units_per_em,
            "loaded measurement font"
        );
        Ok(Self {
            font: Some(face),
            font_size: settings.font_size,
            line_height: settings.line_height,
        })
    }

    /// Measures with a calibrated per-character width table instead of a
    /// font. Never fails.
    pub fn approximate(font_size: f32, line_height: f32) -> Self {
        Self {
            font: None,
            font_size,
            line_height,
        }
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn is_approximate(&self) -> bool {
        self.font.is_none()
    }

    /// Returns `(width, line_height)` of a single-line label.
    pub fn measure(&self, text: &str) -> (f32, f32) {
        (self.text_width(text), self.line_height)
    }

    pub fn text_width(&self, text: &str) -> f32 {
        if text.is_empty() || self.font_size <= 0.0 {
            return 0.0;
        }
        let normalized = text.replace('\t', "    ");
        match &self.font {
            Some(face) => face.measure_width(&normalized, self.font_size),
            None => fallback_text_width(&normalized, self.font_size),
        }
    }
}

fn load_face(db: &Database, id: fontdb::ID, name: &str) -> Result<FontFace, MetricsError> {
    db.with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
        .flatten()
        .ok_or_else(|| MetricsError::InvalidFont(name.to_string()))
}

#[derive(Clone, Copy)]
enum FamilyToken<'a> {
    Generic(Family<'static>),
    Name(&'a str),
}

fn family_names(font_family: &str) -> Vec<FamilyToken<'_>> {
    let mut order = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        let lower = raw.to_ascii_lowercase();
        match lower.as_str() {
            "serif" => order.push(FamilyToken::Generic(Family::Serif)),
            "sans-serif" => order.push(FamilyToken::Generic(Family::SansSerif)),
            "monospace" | "ui-monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
            "cursive" => order.push(FamilyToken::Generic(Family::Cursive)),
            "fantasy" => order.push(FamilyToken::Generic(Family::Fantasy)),
            "system-ui" | "-apple-system" | "ui-sans-serif" => {
                order.push(FamilyToken::Generic(Family::SansSerif))
            }
            _ => order.push(FamilyToken::Name(raw)),
        }
    }
    if order.is_empty() {
        order.push(FamilyToken::Generic(Family::SansSerif));
    }
    order
}

fn families_for<'a>(tokens: &[FamilyToken<'a>]) -> Vec<Family<'a>> {
    tokens
        .iter()
        .map(|token| match *token {
            FamilyToken::Generic(family) => family,
            FamilyToken::Name(name) => Family::Name(name),
        })
        .collect()
}

#[derive(Clone)]
struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    /// Advances for non-ASCII characters seen while loading. Anything else
    /// is looked up through a fresh parse of `data`.
    extra_advances: HashMap<char, u16>,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("bytes", &self.data.len())
            .field("index", &self.index)
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        let mut extra_advances = HashMap::new();
        for ch in ['\u{a0}', '\u{2264}', '\u{2265}', '\u{2260}', '\u{2190}', '\u{2192}'] {
            if let Some(advance) = face
                .glyph_index(ch)
                .and_then(|glyph| face.glyph_hor_advance(glyph))
            {
                extra_advances.insert(ch, advance);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            extra_advances,
        })
    }

    fn measure_width(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;

        if text.is_ascii() {
            let mut width = 0.0f32;
            for byte in text.as_bytes() {
                if *byte == b'\n' {
                    continue;
                }
                let advance = self.ascii_advances[*byte as usize];
                if advance == 0 {
                    width += fallback;
                } else {
                    width += advance as f32 * scale;
                }
            }
            return width.max(0.0);
        }

        let face = Face::parse(&self.data, self.index).ok();
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                Some(self.ascii_advances[ch as usize]).filter(|a| *a > 0)
            } else if let Some(advance) = self.extra_advances.get(&ch) {
                Some(*advance)
            } else {
                face.as_ref().and_then(|face| {
                    face.glyph_index(ch)
                        .and_then(|glyph| face.glyph_hor_advance(glyph))
                })
            };
            match advance {
                Some(advance) => width += advance as f32 * scale,
                None => width += fallback,
            }
        }
        width.max(0.0)
    }
}

pub(crate) fn char_width_factor(ch: char) -> f32 {
    // Per-character widths of a humanist sans at 1px, calibrated against
    // DejaVu Sans / Go Regular.
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        '\'' | '"' | '`' => 0.275,
        '=' | '+' | '<' | '>' | '-' | '*' | '/' => 0.584,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'q' => 0.585,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'u' => 0.585,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        'z' => 0.550,
        '0' => 0.613,
        '1' => 0.396,
        '2' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '9' => 0.595,
        '@' | '#' | '%' | '&' => 0.946,
        _ => 0.568,
    }
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(char_width_factor)
        .sum::<f32>()
        * font_size
}
