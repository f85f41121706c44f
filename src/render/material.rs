use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::texture::TextureHandle;

/// Shared, mutable reference to a material. Entities that point at the same
/// handle render with the same material.
pub type MaterialHandle = Arc<RwLock<Material>>;

/// Name of the physically based shader in the host shader library.
pub const PBR_SHADER_NAME: &str = "ShaderLib.pbr";
/// Name of the classic (diffuse/specular) shader in the host shader library.
pub const CLASSIC_SHADER_NAME: &str = "ShaderLib.uber";

/// Shader descriptor attached to a material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderDescriptor {
    pub name: String,
}

impl ShaderDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn classic() -> Self {
        Self::new(CLASSIC_SHADER_NAME)
    }

    pub fn pbr() -> Self {
        Self::new(PBR_SHADER_NAME)
    }

    pub fn kind(&self) -> ShaderKind {
        ShaderKind::from_descriptor(self)
    }
}

/// Shader families that differ in where the color texture is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderKind {
    Classic,
    Pbr,
}

impl ShaderKind {
    pub fn from_descriptor(descriptor: &ShaderDescriptor) -> Self {
        if descriptor.name == PBR_SHADER_NAME {
            Self::Pbr
        } else {
            Self::Classic
        }
    }

    /// Texture slot that carries the surface color for this shader family.
    pub fn color_slot(self) -> TextureSlot {
        match self {
            Self::Classic => TextureSlot::DiffuseMap,
            Self::Pbr => TextureSlot::BaseColorMap,
        }
    }
}

/// Named texture binding points of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TextureSlot {
    DiffuseMap,
    BaseColorMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Blending {
    #[default]
    NoBlending,
    TransparencyBlending,
}

/// Draw-order bucket of a material. Lower queues draw first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderQueue(pub i32);

impl RenderQueue {
    pub const OPAQUE: Self = Self(2000);
    pub const TRANSPARENT: Self = Self(3000);
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// Shading configuration bound to an entity's geometry.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub shader: ShaderDescriptor,
    pub blending: Blending,
    pub render_queue: RenderQueue,
    pub opacity: f32,
    textures: BTreeMap<TextureSlot, TextureHandle>,
}

impl Material {
    pub fn new(name: impl Into<String>, shader: ShaderDescriptor) -> Self {
        Self {
            name: name.into(),
            shader,
            blending: Blending::default(),
            render_queue: RenderQueue::default(),
            opacity: 1.0,
            textures: BTreeMap::new(),
        }
    }

    pub fn into_handle(self) -> MaterialHandle {
        Arc::new(RwLock::new(self))
    }

    pub fn set_texture(&mut self, slot: TextureSlot, texture: TextureHandle) {
        self.textures.insert(slot, texture);
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<&TextureHandle> {
        self.textures.get(&slot)
    }

    /// Texture bound to the color slot of this material's shader family.
    pub fn color_texture(&self) -> Option<&TextureHandle> {
        self.texture(self.shader.kind().color_slot())
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::texture::{Texture, TextureDescriptor};

    #[test]
    fn shader_kind_selects_color_slot() {
        assert_eq!(ShaderDescriptor::pbr().kind(), ShaderKind::Pbr);
        assert_eq!(ShaderDescriptor::classic().kind(), ShaderKind::Classic);
        assert_eq!(
            ShaderDescriptor::new("custom.toon").kind(),
            ShaderKind::Classic
        );
        assert_eq!(ShaderKind::Pbr.color_slot(), TextureSlot::BaseColorMap);
        assert_eq!(ShaderKind::Classic.color_slot(), TextureSlot::DiffuseMap);
    }

    #[test]
    fn new_materials_are_opaque_and_draw_before_transparent_ones() {
        let material = Material::new("card", ShaderDescriptor::classic());
        assert_eq!(material.blending, Blending::NoBlending);
        assert_eq!(material.render_queue, RenderQueue::OPAQUE);
        assert!(RenderQueue::OPAQUE < RenderQueue::TRANSPARENT);
    }

    #[test]
    fn cloned_material_does_not_affect_original() {
        let original = Material::new("card", ShaderDescriptor::classic()).into_handle();
        let mut copy = original.read().clone();
        copy.blending = Blending::TransparencyBlending;
        copy.set_texture(
            TextureSlot::DiffuseMap,
            Texture::new(TextureDescriptor::square(64)).into_handle(),
        );

        let original = original.read();
        assert_eq!(original.blending, Blending::NoBlending);
        assert_eq!(original.texture_count(), 0);
        assert!(copy.color_texture().is_some());
    }
}
