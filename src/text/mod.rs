//! Text layout and rasterization for on-surface text.

pub mod canvas;
pub mod color;
pub mod fonts;
pub mod layout;
pub mod options;
pub mod wrap;

pub use canvas::{DrawOp, DrawingSurface, RasterCanvas};
pub use fonts::{CssFont, FontLibrary, BUNDLED_FAMILY};
pub use options::{FontStyle, RenderOptions, TextAlign, TextOverrides, VerticalAlign};
pub use wrap::{wrap_text, ESCAPED_NEWLINE};
