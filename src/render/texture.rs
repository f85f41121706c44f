use std::sync::Arc;

use image::RgbaImage;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Shared reference to a texture object.
pub type TextureHandle = Arc<RwLock<Texture>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    #[default]
    Repeat,
    EdgeClamp,
}

/// Creation parameters for a [`Texture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub premultiply_alpha: bool,
}

impl TextureDescriptor {
    pub fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
            wrap_s: WrapMode::default(),
            wrap_t: WrapMode::default(),
            premultiply_alpha: false,
        }
    }

    /// Edge-clamped, premultiplied square texture suitable for text overlays.
    pub fn text_overlay(size: u32) -> Self {
        Self {
            wrap_s: WrapMode::EdgeClamp,
            wrap_t: WrapMode::EdgeClamp,
            premultiply_alpha: true,
            ..Self::square(size)
        }
    }
}

/// CPU-side texture that receives bitmaps read back from a drawing surface.
#[derive(Debug, Clone)]
pub struct Texture {
    descriptor: TextureDescriptor,
    image: Option<RgbaImage>,
    uploads: u32,
}

impl Texture {
    pub fn new(descriptor: TextureDescriptor) -> Self {
        Self {
            descriptor,
            image: None,
            uploads: 0,
        }
    }

    pub fn into_handle(self) -> TextureHandle {
        Arc::new(RwLock::new(self))
    }

    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    pub fn width(&self) -> u32 {
        self.descriptor.width
    }

    pub fn height(&self) -> u32 {
        self.descriptor.height
    }

    /// Number of times a bitmap has been uploaded into this texture.
    pub fn uploads(&self) -> u32 {
        self.uploads
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// Replaces the texture contents. The texture takes the bitmap's size.
    pub fn set_image(&mut self, mut image: RgbaImage) {
        if self.descriptor.premultiply_alpha {
            premultiply(&mut image);
        }
        self.descriptor.width = image.width();
        self.descriptor.height = image.height();
        self.image = Some(image);
        self.uploads += 1;
    }
}

fn premultiply(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let alpha = u16::from(pixel[3]);
        for channel in 0..3 {
            pixel[channel] = ((u16::from(pixel[channel]) * alpha + 127) / 255) as u8;
        }
    }
}
