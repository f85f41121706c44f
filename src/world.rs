use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::render::MaterialHandle;

/// Stable identifier of an entity inside a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The facet of an entity that holds its render materials.
#[derive(Debug, Clone, Default)]
pub struct MeshRenderer {
    pub materials: Vec<MaterialHandle>,
}

impl MeshRenderer {
    pub fn new(materials: Vec<MaterialHandle>) -> Self {
        Self { materials }
    }
}

/// Addressable object in the scene.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub hidden: bool,
    pub mesh_renderer: Option<MeshRenderer>,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            hidden: false,
            mesh_renderer: None,
        }
    }

    /// Returns the first material of the mesh renderer, if there is one.
    pub fn first_material(&self) -> Option<MaterialHandle> {
        self.mesh_renderer
            .as_ref()
            .and_then(|renderer| renderer.materials.first())
            .cloned()
    }
}

/// Thread-safe container holding the mutable state of every entity.
#[derive(Debug, Default)]
pub struct World {
    entities: Arc<RwLock<Vec<Entity>>>,
}

impl Clone for World {
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
        }
    }
}

impl World {
    /// Creates an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity and returns its identifier.
    pub fn spawn(&self, name: impl Into<String>, mesh_renderer: Option<MeshRenderer>) -> EntityId {
        let mut guard = self.entities.write();
        let id = EntityId::new(guard.len() as u32);
        let mut entity = Entity::new(id, name);
        entity.mesh_renderer = mesh_renderer;
        guard.push(entity);
        id
    }

    /// Returns a snapshot of all stored entities.
    pub fn all_entities(&self) -> Vec<Entity> {
        self.entities.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }

    /// Returns a clone of the requested entity.
    pub fn get(&self, id: EntityId) -> Option<Entity> {
        self.entities
            .read()
            .iter()
            .find(|entity| entity.id == id)
            .cloned()
    }

    /// Looks up an entity identifier by name.
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.entities
            .read()
            .iter()
            .find(|entity| entity.name == name)
            .map(|entity| entity.id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.read().iter().any(|entity| entity.id == id)
    }

    /// Applies a mutation to the requested entity.
    pub fn update<F, R>(&self, id: EntityId, mut updater: F) -> Option<R>
    where
        F: FnMut(&mut Entity) -> R,
    {
        let mut guard = self.entities.write();
        let entity = guard.iter_mut().find(|entity| entity.id == id)?;
        Some(updater(entity))
    }

    pub fn show(&self, id: EntityId) -> bool {
        self.update(id, |entity| entity.hidden = false).is_some()
    }

    pub fn hide(&self, id: EntityId) -> bool {
        self.update(id, |entity| entity.hidden = true).is_some()
    }

    pub fn is_hidden(&self, id: EntityId) -> Option<bool> {
        self.get(id).map(|entity| entity.hidden)
    }

    /// Replaces material `index` of the entity's mesh renderer.
    ///
    /// Returns `false` when the entity has no mesh renderer or the renderer
    /// holds fewer than `index` materials.
    pub fn set_material(&self, id: EntityId, index: usize, material: MaterialHandle) -> bool {
        self.update(id, |entity| {
            let Some(renderer) = entity.mesh_renderer.as_mut() else {
                return false;
            };
            if index < renderer.materials.len() {
                renderer.materials[index] = material.clone();
                true
            } else if index == renderer.materials.len() {
                renderer.materials.push(material.clone());
                true
            } else {
                false
            }
        })
        .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Material, ShaderDescriptor};

    #[test]
    fn spawn_and_find_entity() {
        let world = World::new();
        let card = world.spawn("Card", None);
        assert_eq!(world.find("Card"), Some(card));
        assert!(world.find("Missing").is_none());
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn show_and_hide_update_visibility() {
        let world = World::new();
        let card = world.spawn("Card", None);
        assert_eq!(world.is_hidden(card), Some(false));
        assert!(world.hide(card));
        assert_eq!(world.is_hidden(card), Some(true));
        assert!(world.show(card));
        assert_eq!(world.is_hidden(card), Some(false));
    }

    #[test]
    fn update_returns_false_for_missing_entity() {
        let world = World::new();
        assert!(!world.hide(EntityId::new(7)));
        assert!(world.is_hidden(EntityId::new(7)).is_none());
    }

    #[test]
    fn set_material_requires_mesh_renderer() {
        let world = World::new();
        let bare = world.spawn("Bare", None);
        let material = Material::new("m", ShaderDescriptor::classic()).into_handle();
        assert!(!world.set_material(bare, 0, material.clone()));

        let meshed = world.spawn("Meshed", Some(MeshRenderer::default()));
        assert!(world.set_material(meshed, 0, material.clone()));
        let first = world.get(meshed).unwrap().first_material().unwrap();
        assert!(Arc::ptr_eq(&first, &material));
    }
}
