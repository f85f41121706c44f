use std::fmt;
use std::str::FromStr;

use glam::{DVec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::PropertyError;

/// Texture edge lengths offered to content authors.
pub const TEXTURE_SIZES: [u32; 5] = [256, 512, 1024, 2048, 4096];

pub const DEFAULT_FONT_FAMILY: &str = r#""Helvetica Neue", Helvetica, Arial, sans-serif"#;
pub const DEFAULT_TEXT: &str = "SurfaceText :)";
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    Oblique,
}

macro_rules! keyword_enum {
    ($ty:ident, $option:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const NAMES: &'static [&'static str] = &[$($name),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = PropertyError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim() {
                    $($name => Ok(Self::$variant),)+
                    other => Err(PropertyError::UnknownChoice {
                        name: $option.to_string(),
                        value: other.to_string(),
                        choices: Self::NAMES.join(", "),
                    }),
                }
            }
        }
    };
}

keyword_enum!(TextAlign, "textAlign", { Left => "left", Center => "center", Right => "right" });
keyword_enum!(VerticalAlign, "verticalAlign", { Top => "top", Middle => "middle", Bottom => "bottom" });
keyword_enum!(FontStyle, "fontStyle", {
    Normal => "normal",
    Bold => "bold",
    Italic => "italic",
    Oblique => "oblique",
});

/// Fully resolved options for one render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub texture_size: u32,
    pub text_offset: DVec2,
    pub background_opacity: f32,
    pub background_color: Vec3,
    pub text_color: Vec3,
    pub font_family: String,
    pub font_style: FontStyle,
    pub font_size: u32,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    pub text: String,
    /// Explicit CSS font string replacing the composed one.
    pub font: Option<String>,
    pub line_height: Option<f64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            texture_size: 512,
            text_offset: DVec2::ZERO,
            background_opacity: 0.0,
            background_color: Vec3::ONE,
            text_color: Vec3::ONE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_style: FontStyle::Normal,
            font_size: 50,
            text_align: TextAlign::Center,
            vertical_align: VerticalAlign::Middle,
            text: DEFAULT_TEXT.to_string(),
            font: None,
            line_height: None,
        }
    }
}

impl RenderOptions {
    /// Folds override layers over the declared defaults; later layers win.
    pub fn resolve<'a, I>(layers: I) -> Self
    where
        I: IntoIterator<Item = &'a TextOverrides>,
    {
        layers
            .into_iter()
            .fold(Self::default(), |options, layer| options.merged(layer))
    }

    pub fn merged(mut self, layer: &TextOverrides) -> Self {
        if let Some(value) = layer.texture_size {
            self.texture_size = value;
        }
        if let Some(value) = layer.text_offset {
            self.text_offset = value;
        }
        if let Some(value) = layer.background_opacity {
            self.background_opacity = value;
        }
        if let Some(value) = layer.background_color {
            self.background_color = value;
        }
        if let Some(value) = layer.text_color {
            self.text_color = value;
        }
        if let Some(value) = &layer.font_family {
            self.font_family = value.clone();
        }
        if let Some(value) = layer.font_style {
            self.font_style = value;
        }
        if let Some(value) = layer.font_size {
            self.font_size = value;
        }
        if let Some(value) = layer.text_align {
            self.text_align = value;
        }
        if let Some(value) = layer.vertical_align {
            self.vertical_align = value;
        }
        if let Some(value) = &layer.text {
            self.text = value.clone();
        }
        if let Some(value) = &layer.font {
            self.font = Some(value.clone());
        }
        if let Some(value) = layer.line_height {
            self.line_height = Some(value);
        }
        self
    }

    /// CSS font shorthand, e.g. `bold 50px Arial`.
    pub fn css_font(&self) -> String {
        match &self.font {
            Some(font) => font.clone(),
            None => format!(
                "{} {}px {}",
                self.font_style, self.font_size, self.font_family
            ),
        }
    }

    /// Distance between baselines. Kept in double precision so that
    /// `fontSize * 1.2` lands on the same pixel rows a browser would use.
    pub fn line_height(&self) -> f64 {
        self.line_height
            .unwrap_or(f64::from(self.font_size) * LINE_HEIGHT_FACTOR)
    }
}

/// Partial [`RenderOptions`]; unset fields fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOverrides {
    pub texture_size: Option<u32>,
    pub text_offset: Option<DVec2>,
    pub background_opacity: Option<f32>,
    pub background_color: Option<Vec3>,
    pub text_color: Option<Vec3>,
    pub font_family: Option<String>,
    pub font_style: Option<FontStyle>,
    pub font_size: Option<u32>,
    pub text_align: Option<TextAlign>,
    pub vertical_align: Option<VerticalAlign>,
    pub text: Option<String>,
    pub font: Option<String>,
    pub line_height: Option<f64>,
}

impl TextOverrides {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layers_win() {
        let component = TextOverrides {
            font_size: Some(32),
            text: Some("configured".into()),
            text_align: Some(TextAlign::Left),
            ..TextOverrides::default()
        };
        let call_site = TextOverrides::text("override");
        let options = RenderOptions::resolve([&component, &call_site]);
        assert_eq!(options.font_size, 32);
        assert_eq!(options.text, "override");
        assert_eq!(options.text_align, TextAlign::Left);
        assert_eq!(options.texture_size, 512);
        assert_eq!(options.vertical_align, VerticalAlign::Middle);
    }

    #[test]
    fn css_font_composes_style_size_and_family() {
        let options = RenderOptions {
            font_style: FontStyle::Bold,
            font_size: 24,
            font_family: "Arial".into(),
            ..RenderOptions::default()
        };
        assert_eq!(options.css_font(), "bold 24px Arial");

        let explicit = options.merged(&TextOverrides {
            font: Some("italic 10px serif".into()),
            ..TextOverrides::default()
        });
        assert_eq!(explicit.css_font(), "italic 10px serif");
    }

    #[test]
    fn line_height_defaults_to_font_size_ratio() {
        let options = RenderOptions::default();
        assert_eq!(options.line_height(), 60.0);
        let small = options.clone().merged(&TextOverrides {
            font_size: Some(14),
            ..TextOverrides::default()
        });
        assert_eq!(small.line_height(), 14.0 * 1.2);
        let explicit = options.merged(&TextOverrides {
            line_height: Some(12.0),
            ..TextOverrides::default()
        });
        assert_eq!(explicit.line_height(), 12.0);
    }

    #[test]
    fn keywords_parse_and_reject_unknown_values() {
        assert_eq!("right".parse::<TextAlign>().unwrap(), TextAlign::Right);
        assert_eq!(" bottom ".parse::<VerticalAlign>().unwrap(), VerticalAlign::Bottom);
        assert_eq!("oblique".parse::<FontStyle>().unwrap(), FontStyle::Oblique);
        assert!("justify".parse::<TextAlign>().is_err());
    }
}
