use std::collections::HashMap;

use anyhow::{Context, Result};
use glam::IVec2;
use log::{debug, error, warn};

use crate::error::{PropertyError, RenderError};
use crate::events::{Event, EventKey, UPDATE_TEXT_EVENT};
use crate::render::{
    Blending, GraphicsHost, MaterialHandle, RenderQueue, TextureDescriptor, TextureHandle,
};
use crate::text::canvas::DrawingSurface;
use crate::text::color::{rgb_to_hex, rgba_to_hex};
use crate::text::layout::{line_positions, text_anchor};
use crate::text::options::{
    FontStyle, RenderOptions, TextAlign, TextOverrides, VerticalAlign, DEFAULT_FONT_FAMILY,
    DEFAULT_TEXT, TEXTURE_SIZES,
};
use crate::text::wrap::wrap_text;
use crate::world::{EntityId, World};

use super::properties::{PropertyDef, PropertyKind, PropertySheet};
use super::{Behavior, BehaviorContext, Signal};

/// Resources reused across renders of one entity.
#[derive(Default)]
pub struct TextCache {
    surface: Option<Box<dyn DrawingSurface>>,
    texture: Option<TextureHandle>,
    material: Option<MaterialHandle>,
}

impl TextCache {
    pub fn surface(&self) -> Option<&dyn DrawingSurface> {
        self.surface.as_deref()
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }

    pub fn material(&self) -> Option<&MaterialHandle> {
        self.material.as_ref()
    }
}

/// Outcome of a successful render.
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub options: RenderOptions,
    pub lines: Vec<String>,
    pub anchor: IVec2,
    pub line_height: f64,
    pub texture: TextureHandle,
    pub material: MaterialHandle,
}

/// Renders word-wrapped text into a texture bound to the entity's material.
#[derive(Default)]
pub struct SurfaceTextRenderer {
    configured: TextOverrides,
    caches: HashMap<EntityId, TextCache>,
}

impl SurfaceTextRenderer {
    pub const PROPERTIES: &'static [PropertyDef] = &[
        PropertyDef {
            name: "textureSize",
            kind: PropertyKind::Select(&["256", "512", "1024", "2048", "4096"]),
            default: Some("512"),
            description: "Texture dimensions in pixels. Smaller values save memory, larger values give smoother text",
        },
        PropertyDef {
            name: "textOffset",
            kind: PropertyKind::Vector2,
            default: Some("0 0"),
            description: "Text offset, scaled from 0 to 1",
        },
        PropertyDef {
            name: "backgroundOpacity",
            kind: PropertyKind::Float,
            default: Some("0"),
            description: "Opacity of the background fill, from 0 to 1",
        },
        PropertyDef {
            name: "backgroundColor",
            kind: PropertyKind::Color,
            default: Some("1 1 1"),
            description: "Normalized RGB background color",
        },
        PropertyDef {
            name: "textColor",
            kind: PropertyKind::Color,
            default: Some("1 1 1"),
            description: "Normalized RGB text color",
        },
        PropertyDef {
            name: "fontFamily",
            kind: PropertyKind::String,
            default: Some(DEFAULT_FONT_FAMILY),
            description: "CSS font family list",
        },
        PropertyDef {
            name: "fontStyle",
            kind: PropertyKind::Select(FontStyle::NAMES),
            default: Some("normal"),
            description: "Face of the font family to use",
        },
        PropertyDef {
            name: "fontSize",
            kind: PropertyKind::Integer,
            default: Some("50"),
            description: "Font size in texture pixels, 1 to 512",
        },
        PropertyDef {
            name: "textAlign",
            kind: PropertyKind::Select(TextAlign::NAMES),
            default: Some("center"),
            description: "Horizontal alignment",
        },
        PropertyDef {
            name: "verticalAlign",
            kind: PropertyKind::Select(VerticalAlign::NAMES),
            default: Some("middle"),
            description: "Vertical alignment, also used as the text baseline",
        },
        PropertyDef {
            name: "text",
            kind: PropertyKind::String,
            default: Some(DEFAULT_TEXT),
            description: "Text to display, use \\n for multi-line text",
        },
        PropertyDef {
            name: "font",
            kind: PropertyKind::String,
            default: None,
            description: "Explicit CSS font shorthand replacing style, size and family",
        },
        PropertyDef {
            name: "lineHeight",
            kind: PropertyKind::Float,
            default: None,
            description: "Distance between baselines in pixels; defaults to 1.2 x fontSize",
        },
    ];

    pub fn new(configured: TextOverrides) -> Self {
        Self {
            configured,
            caches: HashMap::new(),
        }
    }

    pub fn from_properties(properties: &PropertySheet) -> Result<Self> {
        let configured = overrides_from(properties).context("SurfaceText")?;
        if let Some(size) = configured.texture_size {
            if !TEXTURE_SIZES.contains(&size) {
                warn!("SurfaceText: textureSize {size} is not one of {TEXTURE_SIZES:?}");
            }
        }
        Ok(Self::new(configured))
    }

    pub fn configured(&self) -> &TextOverrides {
        &self.configured
    }

    pub fn cache(&self, entity: EntityId) -> Option<&TextCache> {
        self.caches.get(&entity)
    }

    pub fn cached_entities(&self) -> usize {
        self.caches.len()
    }

    /// Draws text for `entity` and binds the result to its first material.
    ///
    /// Option layers resolve as declared defaults, then the configured
    /// properties, then `overrides`. The surface, texture and material clone
    /// are created on the first call and reused afterwards.
    pub fn render(
        &mut self,
        world: &World,
        host: &dyn GraphicsHost,
        entity: EntityId,
        overrides: &TextOverrides,
    ) -> Result<RenderReport, RenderError> {
        let target = world.get(entity).ok_or(RenderError::MissingEntity(entity))?;
        let options = RenderOptions::resolve([&self.configured, overrides]);
        let fill_style = rgb_to_hex(options.text_color);
        let background = rgba_to_hex(options.background_color, options.background_opacity);

        let cache = self.caches.entry(entity).or_default();
        if cache.surface.is_none() {
            cache.surface = host.create_surface();
        }
        let surface = cache
            .surface
            .as_deref_mut()
            .ok_or(RenderError::MissingSurface(entity))?;

        let size = options.texture_size;
        surface.resize(size, size);
        surface.set_font(&options.css_font());
        surface.set_text_align(options.text_align);
        surface.set_text_baseline(options.vertical_align);
        surface.set_fill_style(&fill_style);

        let width = surface.width() as f32;
        let height = surface.height() as f32;
        let lines = wrap_text(&options.text, width, |line| surface.measure_text(line));
        let line_height = options.line_height();
        let anchor = text_anchor(
            (surface.width(), surface.height()),
            options.text_align,
            options.vertical_align,
            line_height,
            lines.len(),
            options.text_offset,
        );
        debug!(
            "{entity}: {} line(s) at {anchor} with font `{}`",
            lines.len(),
            options.css_font()
        );

        surface.clear_rect(0.0, 0.0, width, height);
        surface.set_fill_style(&background);
        surface.fill_rect(0.0, 0.0, width, height);
        surface.set_fill_style(&fill_style);
        for (line, position) in lines
            .iter()
            .zip(line_positions(anchor, line_height, lines.len()))
        {
            surface.fill_text(line, position.x, position.y);
        }
        let bitmap = surface.snapshot();

        // The material is resolved before any texture work so that a missing
        // material leaves texture and material state untouched.
        if target.mesh_renderer.is_none() {
            return Err(RenderError::MissingMaterial(entity));
        }
        let material = match &cache.material {
            Some(material) => material.clone(),
            None => target
                .first_material()
                .map(|shared| shared.read().clone().into_handle())
                .ok_or(RenderError::MissingMaterial(entity))?,
        };

        let texture = match &cache.texture {
            Some(texture) => texture.clone(),
            None => host
                .create_texture(TextureDescriptor::text_overlay(size))
                .ok_or(RenderError::MissingTexture(entity))?,
        };
        texture.write().set_image(bitmap);
        cache.texture = Some(texture.clone());
        cache.material = Some(material.clone());

        if !world.set_material(entity, 0, material.clone()) {
            return Err(RenderError::MissingMaterial(entity));
        }
        {
            let mut material = material.write();
            material.blending = Blending::TransparencyBlending;
            material.render_queue = RenderQueue::TRANSPARENT;
            material.opacity = 1.0;
            let slot = material.shader.kind().color_slot();
            material.set_texture(slot, texture.clone());
        }

        Ok(RenderReport {
            options,
            lines,
            anchor,
            line_height,
            texture,
            material,
        })
    }

    fn render_and_signal(&mut self, ctx: &mut BehaviorContext<'_>, overrides: &TextOverrides) {
        let result = self.render(ctx.world(), ctx.host(), ctx.entity(), overrides);
        match result {
            Ok(report) => {
                debug!(
                    "{}: rendered {:?} into a {}px texture",
                    ctx.entity(),
                    report.lines,
                    report.options.texture_size
                );
                ctx.signal(Signal::Success);
            }
            Err(err) => {
                error!("[surface text] {err}. Aborting surface text render");
                ctx.signal(Signal::Failure);
            }
        }
    }
}

fn overrides_from(properties: &PropertySheet) -> Result<TextOverrides, PropertyError> {
    Ok(TextOverrides {
        texture_size: properties.u32("textureSize")?,
        text_offset: properties.vec2("textOffset")?,
        background_opacity: properties.f32("backgroundOpacity")?,
        background_color: properties.vec3("backgroundColor")?,
        text_color: properties.vec3("textColor")?,
        font_family: properties.string("fontFamily"),
        font_style: properties.choice("fontStyle")?,
        font_size: properties.u32("fontSize")?,
        text_align: properties.choice("textAlign")?,
        vertical_align: properties.choice("verticalAlign")?,
        text: properties.string("text"),
        font: properties.string("font"),
        line_height: properties.f64("lineHeight")?,
    })
}

impl Behavior for SurfaceTextRenderer {
    fn name(&self) -> &'static str {
        "SurfaceText"
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_>) -> Result<()> {
        let entity = ctx.entity();
        ctx.subscribe(EventKey::entity(entity, UPDATE_TEXT_EVENT));
        self.render_and_signal(ctx, &TextOverrides::default());
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut BehaviorContext<'_>, event: &Event) -> Result<()> {
        match (&event.key, event.payload.as_text()) {
            (EventKey::Entity(_, name), Some(text)) if name == UPDATE_TEXT_EVENT => {
                self.render_and_signal(ctx, &TextOverrides::text(text));
            }
            _ => warn!(
                "SurfaceText on {}: ignoring {} with payload {:?}",
                ctx.entity(),
                event.key,
                event.payload
            ),
        }
        Ok(())
    }
}
