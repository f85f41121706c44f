//! Offscreen drawing surfaces.

use cosmic_text::{Buffer, Color};
use glam::Vec2;
use image::{Pixel, Rgba, RgbaImage};
use log::warn;

use super::color::parse_hex;
use super::fonts::{line_width, shape_line, CssFont, FontContext, FontLibrary};
use super::options::{TextAlign, VerticalAlign};

const DEFAULT_WIDTH: u32 = 300;
const DEFAULT_HEIGHT: u32 = 150;
const DEFAULT_FONT: &str = "10px sans-serif";

/// Raster target with a 2D-canvas style drawing API.
pub trait DrawingSurface: Send {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Changes the surface size. Resizing always clears the contents and
    /// resets the drawing state.
    fn resize(&mut self, width: u32, height: u32);

    /// Sets the CSS font shorthand used for measuring and drawing text.
    fn set_font(&mut self, font: &str);

    fn set_text_align(&mut self, align: TextAlign);

    fn set_text_baseline(&mut self, baseline: VerticalAlign);

    /// Sets the fill color from a CSS hex string. Unparseable values are
    /// ignored.
    fn set_fill_style(&mut self, style: &str);

    fn measure_text(&self, text: &str) -> f32;

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    fn fill_text(&mut self, text: &str, x: f32, y: f32);

    /// Reads the current contents back as a bitmap.
    fn snapshot(&self) -> RgbaImage;
}

/// Drawing call recorded by [`RasterCanvas`] since its last resize.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear { origin: Vec2, size: Vec2 },
    Rect { origin: Vec2, size: Vec2, color: Rgba<u8> },
    Text { text: String, position: Vec2, color: Rgba<u8> },
}

/// Software surface backed by an RGBA bitmap.
///
/// Text is shaped and rasterized through cosmic-text against the fonts of
/// its [`FontLibrary`]. Families the library does not know fall back to
/// its sans-serif face.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    fonts: FontLibrary,
    image: RgbaImage,
    font: String,
    parsed_font: CssFont,
    text_align: TextAlign,
    baseline: VerticalAlign,
    fill: Rgba<u8>,
    ops: Vec<DrawOp>,
}

impl RasterCanvas {
    pub fn new(fonts: FontLibrary) -> Self {
        Self::with_size(fonts, DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    pub fn with_size(fonts: FontLibrary, width: u32, height: u32) -> Self {
        Self {
            fonts,
            image: RgbaImage::new(width, height),
            font: DEFAULT_FONT.to_string(),
            parsed_font: CssFont::default(),
            text_align: TextAlign::Left,
            baseline: VerticalAlign::Bottom,
            fill: Rgba([0, 0, 0, 255]),
            ops: Vec::new(),
        }
    }

    pub fn font(&self) -> &str {
        &self.font
    }

    pub fn font_size(&self) -> f32 {
        self.parsed_font.size
    }

    pub fn fill_color(&self) -> Rgba<u8> {
        self.fill
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        (x < self.image.width() && y < self.image.height()).then(|| *self.image.get_pixel(x, y))
    }

    fn pixel_span(&self, start: f32, length: f32, limit: u32) -> (u32, u32) {
        let lo = start.round().clamp(0.0, limit as f32) as u32;
        let hi = (start + length).round().clamp(0.0, limit as f32) as u32;
        (lo, hi)
    }

    fn blend_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba<u8>) {
        let (x0, x1) = self.pixel_span(x, width, self.image.width());
        let (y0, y1) = self.pixel_span(y, height, self.image.height());
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.get_pixel_mut(px, py).blend(&color);
            }
        }
    }

    /// Rasterizes a shaped line whose em box starts at `(left, top)`.
    fn draw_line(&mut self, ctx: &mut FontContext, buffer: &Buffer, left: f32, top: f32) {
        let FontContext { system, swash } = ctx;
        let [r, g, b, a] = self.fill.0;
        let base = Color::rgba(r, g, b, a);
        let image = &mut self.image;
        let (width, height) = image.dimensions();

        for run in buffer.layout_runs() {
            for glyph in run.glyphs {
                let physical = glyph.physical((left, top + run.line_y), 1.0);
                swash.with_pixels(system, physical.cache_key, base, |dx, dy, color| {
                    let x = physical.x + dx;
                    let y = physical.y + dy;
                    if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
                        return;
                    }
                    let src = Rgba([color.r(), color.g(), color.b(), color.a()]);
                    image.get_pixel_mut(x as u32, y as u32).blend(&src);
                });
            }
        }
    }
}

impl DrawingSurface for RasterCanvas {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        *self = Self::with_size(self.fonts.clone(), width, height);
    }

    fn set_font(&mut self, font: &str) {
        match CssFont::parse(font) {
            Some(parsed) => {
                self.font = font.to_string();
                self.parsed_font = parsed;
            }
            None => warn!("ignoring font without a pixel size: {font}"),
        }
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.text_align = align;
    }

    fn set_text_baseline(&mut self, baseline: VerticalAlign) {
        self.baseline = baseline;
    }

    fn set_fill_style(&mut self, style: &str) {
        match parse_hex(style) {
            Some(color) => self.fill = color,
            None => warn!("ignoring unsupported fill style {style}"),
        }
    }

    fn measure_text(&self, text: &str) -> f32 {
        let mut ctx = self.fonts.lock();
        line_width(&shape_line(&mut ctx, text, &self.parsed_font))
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let (x0, x1) = self.pixel_span(x, width, self.image.width());
        let (y0, y1) = self.pixel_span(y, height, self.image.height());
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px, py, Rgba([0, 0, 0, 0]));
            }
        }
        self.ops.push(DrawOp::Clear {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let color = self.fill;
        self.blend_rect(x, y, width, height, color);
        self.ops.push(DrawOp::Rect {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
            color,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        let fonts = self.fonts.clone();
        let mut ctx = fonts.lock();
        let size = self.parsed_font.size;
        let buffer = shape_line(&mut ctx, text, &self.parsed_font);
        let width = line_width(&buffer);
        let left = match self.text_align {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::Right => x - width,
        };
        let top = match self.baseline {
            VerticalAlign::Top => y,
            VerticalAlign::Middle => y - size / 2.0,
            VerticalAlign::Bottom => y - size,
        };
        self.draw_line(&mut ctx, &buffer, left, top);
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            position: Vec2::new(x, y),
            color: self.fill,
        });
    }

    fn snapshot(&self) -> RgbaImage {
        self.image.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(width: u32, height: u32) -> RasterCanvas {
        RasterCanvas::with_size(FontLibrary::bundled(), width, height)
    }

    #[test]
    fn resize_clears_pixels_and_state() {
        let mut canvas = canvas(8, 8);
        canvas.set_fill_style("#ff0000");
        canvas.fill_rect(0.0, 0.0, 8.0, 8.0);
        assert_eq!(canvas.pixel(4, 4), Some(Rgba([255, 0, 0, 255])));

        canvas.resize(16, 16);
        assert_eq!((canvas.width(), canvas.height()), (16, 16));
        assert_eq!(canvas.pixel(4, 4), Some(Rgba([0, 0, 0, 0])));
        assert!(canvas.ops().is_empty());
    }

    #[test]
    fn set_font_keeps_previous_font_when_size_is_missing() {
        let mut canvas = canvas(8, 8);
        canvas.set_font("bold 50px \"Helvetica Neue\", Arial");
        assert_eq!(canvas.font_size(), 50.0);

        canvas.set_font("Arial");
        assert_eq!(canvas.font_size(), 50.0);
        assert_eq!(canvas.font(), "bold 50px \"Helvetica Neue\", Arial");
    }

    #[test]
    fn measurement_follows_glyph_advances() {
        let mut canvas = canvas(8, 8);
        canvas.set_font("50px sans-serif");
        let narrow = canvas.measure_text("iiii");
        let wide = canvas.measure_text("MMMM");
        assert!(narrow > 0.0);
        assert!(narrow < wide, "{narrow} should be narrower than {wide}");
        assert!(canvas.measure_text("a b") > canvas.measure_text("ab"));
        assert_eq!(canvas.measure_text(""), 0.0);

        canvas.set_font("bold 50px sans-serif");
        assert!(canvas.measure_text("MMMM") > wide);
    }

    #[test]
    fn measurement_scales_with_font_size() {
        let mut canvas = canvas(8, 8);
        canvas.set_font("50px sans-serif");
        let small = canvas.measure_text("hello world");
        canvas.set_font("100px sans-serif");
        let large = canvas.measure_text("hello world");
        assert!((large - 2.0 * small).abs() < 2.0, "{small} vs {large}");
    }

    #[test]
    fn unknown_families_measure_like_sans_serif() {
        let mut canvas = canvas(8, 8);
        canvas.set_font("30px sans-serif");
        let fallback = canvas.measure_text("Surface text");
        canvas.set_font("30px \"Courier New\"");
        assert_eq!(canvas.measure_text("Surface text"), fallback);
    }

    #[test]
    fn translucent_background_blends_with_cleared_surface() {
        let mut canvas = canvas(4, 4);
        canvas.set_fill_style("#00ff0080");
        canvas.fill_rect(0.0, 0.0, 4.0, 4.0);
        let Rgba([r, g, b, a]) = canvas.pixel(0, 0).unwrap();
        assert_eq!((r, g, b), (0, 255, 0));
        assert!((127..=128).contains(&a), "alpha {a}");

        canvas.set_fill_style("#0000ff");
        canvas.fill_rect(0.0, 0.0, 4.0, 4.0);
        assert_eq!(canvas.pixel(1, 1), Some(Rgba([0, 0, 255, 255])));
    }

    #[test]
    fn centered_glyph_outline_surrounds_the_anchor() {
        let mut canvas = canvas(100, 100);
        canvas.set_font("normal 80px sans-serif");
        canvas.set_text_align(TextAlign::Center);
        canvas.set_text_baseline(VerticalAlign::Middle);
        canvas.set_fill_style("#ffffff");
        canvas.fill_text("O", 50.0, 50.0);

        // The counter of the "O" stays empty while its ring crosses column 50.
        assert_eq!(canvas.pixel(50, 50).map(|p| p[3]), Some(0));
        let column: Vec<u8> = (0..100).filter_map(|y| canvas.pixel(50, y)).map(|p| p[3]).collect();
        assert!(column.iter().any(|&alpha| alpha > 200));
        assert_eq!(canvas.pixel(0, 0), Some(Rgba([0, 0, 0, 0])));
        assert_eq!(canvas.pixel(99, 99), Some(Rgba([0, 0, 0, 0])));
        assert!(matches!(
            canvas.ops().last(),
            Some(DrawOp::Text { text, .. }) if text == "O"
        ));
    }

    #[test]
    fn alignment_moves_ink_to_the_matching_side() {
        let ink_columns = |align: TextAlign| {
            let mut canvas = canvas(200, 40);
            canvas.set_font("20px sans-serif");
            canvas.set_text_align(align);
            canvas.set_text_baseline(VerticalAlign::Top);
            canvas.set_fill_style("#ffffff");
            canvas.fill_text("MMM", 100.0, 10.0);
            let painted: Vec<u32> = (0..200)
                .filter(|&x| (0..40).any(|y| canvas.pixel(x, y).is_some_and(|p| p[3] > 0)))
                .collect();
            (painted[0], painted[painted.len() - 1])
        };
        let (left_min, _) = ink_columns(TextAlign::Left);
        let (_, right_max) = ink_columns(TextAlign::Right);
        let (center_min, center_max) = ink_columns(TextAlign::Center);
        assert!(left_min >= 99);
        assert!(right_max <= 101);
        assert!(center_min < 100 && center_max > 100);
    }
}
