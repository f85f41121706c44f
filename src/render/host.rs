use std::sync::Arc;

use crate::text::canvas::{DrawingSurface, RasterCanvas};
use crate::text::fonts::FontLibrary;

use super::texture::{Texture, TextureDescriptor, TextureHandle};

/// Graphics services the behaviors borrow from the hosting engine.
///
/// Either constructor may return `None` when the host cannot provide the
/// resource; callers treat that as a failed render, not a panic.
pub trait GraphicsHost: Send + Sync {
    fn create_surface(&self) -> Option<Box<dyn DrawingSurface>>;

    fn create_texture(&self, descriptor: TextureDescriptor) -> Option<TextureHandle>;
}

/// Headless host backed by [`RasterCanvas`] and CPU textures.
///
/// Every surface it creates shares one [`FontLibrary`].
#[derive(Debug, Clone, Default)]
pub struct SoftwareHost {
    fonts: FontLibrary,
}

impl SoftwareHost {
    /// Host that only knows the bundled fonts.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fonts(fonts: FontLibrary) -> Self {
        Self { fonts }
    }

    /// Host that also resolves fonts installed on this machine.
    pub fn with_system_fonts() -> Self {
        Self::with_fonts(FontLibrary::with_system_fonts())
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }
}

impl GraphicsHost for SoftwareHost {
    fn create_surface(&self) -> Option<Box<dyn DrawingSurface>> {
        Some(Box::new(RasterCanvas::new(self.fonts.clone())))
    }

    fn create_texture(&self, descriptor: TextureDescriptor) -> Option<TextureHandle> {
        Some(Texture::new(descriptor).into_handle())
    }
}

impl<T> GraphicsHost for Arc<T>
where
    T: GraphicsHost + ?Sized,
{
    fn create_surface(&self) -> Option<Box<dyn DrawingSurface>> {
        (**self).create_surface()
    }

    fn create_texture(&self, descriptor: TextureDescriptor) -> Option<TextureHandle> {
        (**self).create_texture(descriptor)
    }
}
