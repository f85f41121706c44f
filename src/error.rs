use thiserror::Error;

use crate::world::EntityId;

/// Reasons a surface text render is aborted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("entity {0} does not exist")]
    MissingEntity(EntityId),
    #[error("can't get a drawing surface for entity {0}")]
    MissingSurface(EntityId),
    #[error("cannot get a texture for entity {0}")]
    MissingTexture(EntityId),
    #[error("cannot find a material on entity {0}")]
    MissingMaterial(EntityId),
}

/// Problems reading a behavior's property sheet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("required property `{0}` is missing")]
    Missing(String),
    #[error("property `{name}` expects {expected}, got `{value}`")]
    Malformed {
        name: String,
        expected: &'static str,
        value: String,
    },
    #[error("property `{name}` must be one of [{choices}], got `{value}`")]
    UnknownChoice {
        name: String,
        value: String,
        choices: String,
    },
}
