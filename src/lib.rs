//! Event-driven behaviors for 3D scene entities.
//!
//! The crate provides three independent behaviors (a click emitter, a
//! visibility toggle and a surface text renderer) together with the small
//! host surface they need: a world of entities, a synchronous event queue,
//! materials and textures, and an offscreen drawing surface. Everything runs
//! headless so scenes can be driven and inspected from tests and tools.

pub mod app;
pub mod behavior;
pub mod error;
pub mod events;
pub mod render;
pub mod runtime;
pub mod scene;
pub mod text;
pub mod world;

pub use behavior::{
    Behavior, BehaviorContext, BehaviorKind, ClickEmitter, PropertySheet, Signal, SignalRecord,
    SurfaceTextRenderer, Visibility, VisibilityToggle,
};
pub use error::{PropertyError, RenderError};
pub use events::{Event, EventKey, EventPayload};
pub use render::{GraphicsHost, SoftwareHost};
pub use runtime::Runtime;
pub use scene::Scene;
pub use text::{FontLibrary, RenderOptions, TextOverrides};
pub use world::{Entity, EntityId, MeshRenderer, World};
