//! Font database, CSS font parsing and text shaping.

use std::fmt;
use std::sync::Arc;

use cosmic_text::{
    fontdb, Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, SwashCache, Weight, Wrap,
};
use parking_lot::{Mutex, MutexGuard};

use super::options::FontStyle;

/// Family name of the fonts compiled into the crate.
pub const BUNDLED_FAMILY: &str = "DejaVu Sans";

const BUNDLED_FONTS: [&[u8]; 3] = [
    include_bytes!("../../assets/fonts/DejaVuSans.ttf"),
    include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf"),
    include_bytes!("../../assets/fonts/DejaVuSans-Oblique.ttf"),
];

const LOCALE: &str = "en-US";

pub(crate) struct FontContext {
    pub(crate) system: FontSystem,
    pub(crate) swash: SwashCache,
}

/// Shared font system and glyph cache used by software surfaces.
#[derive(Clone)]
pub struct FontLibrary {
    inner: Arc<Mutex<FontContext>>,
}

impl FontLibrary {
    /// Only the bundled faces. Layout is identical on every machine.
    pub fn bundled() -> Self {
        let mut db = bundled_database();
        db.set_serif_family(BUNDLED_FAMILY);
        db.set_monospace_family(BUNDLED_FAMILY);
        db.set_cursive_family(BUNDLED_FAMILY);
        db.set_fantasy_family(BUNDLED_FAMILY);
        Self::from_database(db)
    }

    /// Bundled faces plus every font installed on the system.
    pub fn with_system_fonts() -> Self {
        let mut db = bundled_database();
        db.load_system_fonts();
        Self::from_database(db)
    }

    fn from_database(db: fontdb::Database) -> Self {
        let system = FontSystem::new_with_locale_and_db(LOCALE.to_string(), db);
        Self {
            inner: Arc::new(Mutex::new(FontContext {
                system,
                swash: SwashCache::new(),
            })),
        }
    }

    pub fn has_family(&self, family: &str) -> bool {
        has_family(self.lock().system.db(), family)
    }

    pub fn face_count(&self) -> usize {
        self.lock().system.db().len()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, FontContext> {
        self.inner.lock()
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::bundled()
    }
}

impl fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontLibrary")
            .field("faces", &self.face_count())
            .finish()
    }
}

fn bundled_database() -> fontdb::Database {
    let mut db = fontdb::Database::new();
    for data in BUNDLED_FONTS {
        db.load_font_data(data.to_vec());
    }
    db.set_sans_serif_family(BUNDLED_FAMILY);
    db
}

fn has_family(db: &fontdb::Database, family: &str) -> bool {
    db.faces()
        .any(|face| face.families.iter().any(|(name, _)| name.eq_ignore_ascii_case(family)))
}

/// Parsed CSS font shorthand, e.g. `bold 50px "Helvetica Neue", Arial`.
#[derive(Debug, Clone, PartialEq)]
pub struct CssFont {
    pub style: FontStyle,
    pub size: f32,
    pub families: Vec<String>,
}

impl Default for CssFont {
    fn default() -> Self {
        Self {
            style: FontStyle::Normal,
            size: 10.0,
            families: vec!["sans-serif".to_string()],
        }
    }
}

impl CssFont {
    /// Returns `None` when the shorthand has no positive pixel size.
    pub fn parse(font: &str) -> Option<Self> {
        let mut style = FontStyle::Normal;
        let mut rest = font.trim_start();
        loop {
            let (token, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if let Some(size) = token.strip_suffix("px").and_then(|v| v.parse::<f32>().ok()) {
                let families = tail
                    .split(',')
                    .map(|family| family.trim().trim_matches(|c| c == '"' || c == '\''))
                    .filter(|family| !family.is_empty())
                    .map(str::to_string)
                    .collect();
                return (size > 0.0).then_some(Self {
                    style,
                    size,
                    families,
                });
            }
            // Weights, variants and stretches other than the known styles are ignored.
            if let Ok(parsed) = token.parse::<FontStyle>() {
                style = parsed;
            }
            if tail.is_empty() {
                return None;
            }
            rest = tail.trim_start();
        }
    }

    fn attrs<'a>(&self, family: Family<'a>) -> Attrs<'a> {
        let attrs = Attrs::new().family(family);
        match self.style {
            FontStyle::Normal => attrs,
            FontStyle::Bold => attrs.weight(Weight::BOLD),
            FontStyle::Italic => attrs.style(Style::Italic),
            FontStyle::Oblique => attrs.style(Style::Oblique),
        }
    }
}

/// First family of the list the database can serve; generic names map to
/// their fontdb counterparts.
fn resolve_family<'a>(db: &fontdb::Database, families: &'a [String]) -> Family<'a> {
    for name in families {
        match name.to_ascii_lowercase().as_str() {
            "sans-serif" => return Family::SansSerif,
            "serif" => return Family::Serif,
            "monospace" => return Family::Monospace,
            "cursive" => return Family::Cursive,
            "fantasy" => return Family::Fantasy,
            _ if has_family(db, name) => return Family::Name(name),
            _ => {}
        }
    }
    Family::SansSerif
}

/// Shapes `text` as a single unwrapped line whose line box equals the em box.
pub(crate) fn shape_line(ctx: &mut FontContext, text: &str, font: &CssFont) -> Buffer {
    let system = &mut ctx.system;
    let mut buffer = Buffer::new(system, Metrics::new(font.size, font.size));
    buffer.set_wrap(system, Wrap::None);
    buffer.set_size(system, None, None);
    let family = resolve_family(system.db(), &font.families);
    buffer.set_text(system, text, font.attrs(family), Shaping::Advanced);
    buffer.shape_until_scroll(system, false);
    buffer
}

/// Advance width of the widest laid out line.
pub(crate) fn line_width(buffer: &Buffer) -> f32 {
    buffer
        .layout_runs()
        .map(|run| run.line_w)
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_style_size_and_families() {
        let font = CssFont::parse(r#"bold 50px "Helvetica Neue", Helvetica, Arial, sans-serif"#)
            .unwrap();
        assert_eq!(font.style, FontStyle::Bold);
        assert_eq!(font.size, 50.0);
        assert_eq!(
            font.families,
            vec!["Helvetica Neue", "Helvetica", "Arial", "sans-serif"]
        );

        let plain = CssFont::parse("12.5px serif").unwrap();
        assert_eq!(plain.style, FontStyle::Normal);
        assert_eq!(plain.size, 12.5);
    }

    #[test]
    fn parse_rejects_fonts_without_pixel_size() {
        assert!(CssFont::parse("Arial").is_none());
        assert!(CssFont::parse("bold 0px Arial").is_none());
        assert!(CssFont::parse("").is_none());
    }

    #[test]
    fn bundled_library_serves_its_family() {
        let fonts = FontLibrary::bundled();
        assert!(fonts.has_family(BUNDLED_FAMILY));
        assert!(fonts.has_family("dejavu sans"));
        assert_eq!(fonts.face_count(), 3);
    }

    #[test]
    fn unknown_families_fall_back_to_sans_serif() {
        let fonts = FontLibrary::bundled();
        let ctx = fonts.lock();
        let families = vec!["Nope".to_string(), BUNDLED_FAMILY.to_string()];
        assert_eq!(
            resolve_family(ctx.system.db(), &families),
            Family::Name(BUNDLED_FAMILY)
        );
        let missing = vec!["Courier New".to_string()];
        assert_eq!(resolve_family(ctx.system.db(), &missing), Family::SansSerif);
    }
}
