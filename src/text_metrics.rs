use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use ttf_parser::Face;

static FONT_DATABASE: Lazy<Mutex<FontDatabase>> = Lazy::new(|| Mutex::new(FontDatabase::new()));

/// Text roles used inside chart boxes. Each role has its own size and weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextStyle {
    Name,
    Details,
    Id,
    Languages,
    Ethnicity,
}

impl TextStyle {
    pub fn font_size(self) -> f32 {
        match self {
            TextStyle::Name => 12.0,
            TextStyle::Id => 10.0,
            TextStyle::Details | TextStyle::Languages | TextStyle::Ethnicity => 11.0,
        }
    }

    pub fn bold(self) -> bool {
        matches!(self, TextStyle::Name)
    }

    /// CSS class used for this role in the rendered SVG.
    pub fn class(self) -> &'static str {
        match self {
            TextStyle::Name => "name",
            TextStyle::Details => "details",
            TextStyle::Id => "id",
            TextStyle::Languages => "languages",
            TextStyle::Ethnicity => "ethnicity",
        }
    }
}

/// Measures text for one chart build. Results are cached until `reset`.
#[derive(Debug)]
pub struct TextMeasurer {
    font_family: String,
    fast_metrics: bool,
    cache: HashMap<(TextStyle, String), f32>,
}

impl TextMeasurer {
    pub fn new(font_family: &str, fast_metrics: bool) -> Self {
        Self {
            font_family: font_family.to_string(),
            fast_metrics,
            cache: HashMap::new(),
        }
    }

    pub fn measure(&mut self, text: &str, style: TextStyle) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let key = (style, text.to_string());
        if let Some(width) = self.cache.get(&key) {
            return *width;
        }
        let width = text_width(
            text,
            style.font_size(),
            style.bold(),
            &self.font_family,
            self.fast_metrics,
        );
        self.cache.insert(key, width);
        width
    }

    pub fn reset(&mut self) {
        self.cache.clear();
    }
}

impl Default for TextMeasurer {
    fn default() -> Self {
        Self::new("verdana, sans-serif", false)
    }
}

pub fn text_width(
    text: &str,
    font_size: f32,
    bold: bool,
    font_family: &str,
    fast_metrics: bool,
) -> f32 {
    if fast_metrics && text.is_ascii() {
        return fallback_text_width(text, font_size, bold);
    }
    measure_text_width(text, font_size, font_family, bold)
        .unwrap_or_else(|| fallback_text_width(text, font_size, bold))
}

pub fn measure_text_width(text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = FONT_DATABASE.lock().ok()?;
    guard.measure(text, font_size, font_family, bold)
}

fn fallback_text_width(text: &str, font_size: f32, bold: bool) -> f32 {
    let width = text.chars().map(char_width_factor).sum::<f32>() * font_size;
    if bold { width * 1.07 } else { width }
}

fn char_width_factor(ch: char) -> f32 {
    // Average advances of a common sans-serif face, in ems.
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
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
        '-' | '–' => 0.5,
        _ => 0.568,
    }
}

struct FontDatabase {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontFace>>,
}

impl FontDatabase {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
        let family_key = normalize_family_key(font_family, bold);
        if !self.cache.contains_key(&family_key) {
            let face = self.load_face(font_family, bold);
            self.cache.insert(family_key.clone(), face);
        }
        let face = self.cache.get_mut(&family_key).and_then(|face| face.as_mut())?;
        face.measure_width(text, font_size)
    }

    fn load_face(&mut self, font_family: &str, bold: bool) -> Option<FontFace> {
        let family_key = normalize_family_key(font_family, bold);
        if let Some(face) = load_cached_face(&family_key) {
            return Some(face);
        }

        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" => Family::SansSerif,
                "monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
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
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded: Option<FontFace> = None;
        self.db.with_face_data(id, |data, index| {
            let bytes = data.to_vec();
            if Face::parse(&bytes, index).is_ok() {
                if let Some((font_path, meta_path)) = cache_paths(&family_key)
                    && !font_path.exists()
                {
                    if let Some(parent) = font_path.parent() {
                        let _ = fs::create_dir_all(parent);
                    }
                    let _ = fs::write(&font_path, &bytes);
                    let _ = fs::write(&meta_path, index.to_string());
                }
                loaded = FontFace::new(bytes, index);
            }
        });
        if loaded.is_none() {
            tracing::debug!(family = font_family, "no usable font face, using fallback widths");
        }
        loaded
    }
}

/// Font bytes plus the advances needed for measuring. The face itself is
/// parsed again only for characters outside ASCII.
struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;

        let missing: Vec<char> = text
            .chars()
            .filter(|ch| !ch.is_ascii() && !self.advance_cache.contains_key(ch))
            .collect();
        if !missing.is_empty() {
            let face = Face::parse(&self.data, self.index).ok()?;
            for ch in missing {
                let advance = face
                    .glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph));
                self.advance_cache.insert(ch, advance);
            }
        }

        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                Some(self.ascii_advances[ch as usize]).filter(|advance| *advance > 0)
            } else {
                self.advance_cache.get(&ch).copied().flatten()
            };
            width += match advance {
                Some(advance) => advance as f32 * scale,
                None => fallback,
            };
        }
        Some(width.max(0.0))
    }
}

fn normalize_family_key(font_family: &str, bold: bool) -> String {
    let trimmed = font_family.trim();
    let family = if trimmed.is_empty() { "sans-serif" } else { trimmed };
    if bold {
        format!("{family}#bold")
    } else {
        family.to_string()
    }
}

fn cache_paths(family_key: &str) -> Option<(PathBuf, PathBuf)> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    family_key.hash(&mut hasher);
    let hash = hasher.finish();
    let dir = base.join("kinchart").join("font-cache");
    let font_path = dir.join(format!("{hash:x}.font"));
    let meta_path = dir.join(format!("{hash:x}.meta"));
    Some((font_path, meta_path))
}

fn load_cached_face(family_key: &str) -> Option<FontFace> {
    let (font_path, meta_path) = cache_paths(family_key)?;
    if !font_path.exists() || !meta_path.exists() {
        return None;
    }
    let bytes = fs::read(font_path).ok()?;
    let index: u32 = fs::read_to_string(meta_path).ok()?.trim().parse().ok()?;
    FontFace::new(bytes, index)
}
