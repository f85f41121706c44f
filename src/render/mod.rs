//! Materials, textures and the graphics services a host provides.

pub mod host;
pub mod material;
pub mod texture;

pub use host::{GraphicsHost, SoftwareHost};
pub use material::{
    Blending, Material, MaterialHandle, RenderQueue, ShaderDescriptor, ShaderKind, TextureSlot,
};
pub use texture::{Texture, TextureDescriptor, TextureHandle, WrapMode};
