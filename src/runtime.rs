use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info, warn};

use crate::behavior::{Behavior, BehaviorContext, SignalRecord};
use crate::events::{EventKey, EventPayload, EventQueue, ListenerId, Subscriptions, UPDATE_TEXT_EVENT};
use crate::render::{GraphicsHost, Material, MaterialHandle, ShaderDescriptor};
use crate::scene::Scene;
use crate::world::{EntityId, MeshRenderer, World};

/// Upper bound on events delivered by a single [`Runtime::pump`].
pub const MAX_EVENTS_PER_PUMP: usize = 10_000;

struct BehaviorSlot {
    entity: EntityId,
    behavior: Box<dyn Behavior>,
}

/// Owns the world and drives every attached behavior.
///
/// Dispatch is single threaded: each event is handed to its listeners one
/// at a time and every handler runs to completion before the next one.
/// Events raised by handlers are queued and delivered within the same pump.
pub struct Runtime {
    world: World,
    host: Arc<dyn GraphicsHost>,
    slots: Vec<BehaviorSlot>,
    subscriptions: Subscriptions,
    queue: EventQueue,
    signals: Vec<SignalRecord>,
    started: bool,
}

impl Runtime {
    pub fn new(world: World, host: Arc<dyn GraphicsHost>) -> Self {
        Self {
            world,
            host,
            slots: Vec::new(),
            subscriptions: Subscriptions::new(),
            queue: EventQueue::new(),
            signals: Vec::new(),
            started: false,
        }
    }

    /// Builds the world described by `scene` and instantiates its behaviors.
    pub fn from_scene(scene: &Scene, host: Arc<dyn GraphicsHost>) -> Result<Self> {
        let mut runtime = Self::new(World::new(), host);
        let materials: HashMap<&str, MaterialHandle> = scene
            .materials
            .iter()
            .map(|def| {
                let material = Material::new(&def.name, ShaderDescriptor::new(&def.shader));
                (def.name.as_str(), material.into_handle())
            })
            .collect();

        for entity in &scene.entities {
            let mesh = entity
                .mesh
                .as_ref()
                .map(|names| {
                    names
                        .iter()
                        .map(|name| {
                            materials
                                .get(name.as_str())
                                .cloned()
                                .ok_or_else(|| anyhow!("unknown material `{name}`"))
                        })
                        .collect::<Result<Vec<_>>>()
                        .map(MeshRenderer::new)
                })
                .transpose()
                .with_context(|| format!("entity `{}`", entity.name))?;
            let id = runtime.world.spawn(&entity.name, mesh);
            for def in &entity.behaviors {
                let behavior = def
                    .kind
                    .instantiate(&def.properties)
                    .with_context(|| format!("{} on entity `{}`", def.kind, entity.name))?;
                runtime.attach(id, behavior)?;
            }
        }
        info!(
            "built world with {} entities and {} behaviors",
            runtime.world.len(),
            runtime.slots.len()
        );
        Ok(runtime)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn signals(&self) -> &[SignalRecord] {
        &self.signals
    }

    pub fn behavior_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Attaches a behavior to an existing entity. Behaviors attached after
    /// [`Runtime::start`] are started immediately.
    pub fn attach(&mut self, entity: EntityId, behavior: Box<dyn Behavior>) -> Result<ListenerId> {
        if !self.world.contains(entity) {
            bail!("cannot attach {} to missing entity {entity}", behavior.name());
        }
        let listener = self.slots.len();
        self.slots.push(BehaviorSlot { entity, behavior });
        if self.started {
            self.start_slot(listener)?;
            self.pump()?;
        }
        Ok(listener)
    }

    /// Starts every attached behavior, then delivers the events they raised.
    pub fn start(&mut self) -> Result<usize> {
        if self.started {
            bail!("behaviors are already running");
        }
        self.started = true;
        for listener in 0..self.slots.len() {
            self.start_slot(listener)?;
        }
        info!("started {} behavior(s)", self.slots.len());
        self.pump()?;
        Ok(self.slots.len())
    }

    fn start_slot(&mut self, listener: ListenerId) -> Result<()> {
        let slot = &mut self.slots[listener];
        let name = slot.behavior.name();
        let mut ctx = BehaviorContext::new(
            slot.entity,
            listener,
            name,
            &self.world,
            self.host.as_ref(),
            &mut self.queue,
            &mut self.subscriptions,
            &mut self.signals,
        );
        slot.behavior
            .start(&mut ctx)
            .with_context(|| format!("failed to start {name} on {}", slot.entity))
    }

    /// Queues an event without delivering it.
    pub fn emit(&mut self, key: EventKey, payload: EventPayload) {
        self.queue.emit(key, payload);
    }

    /// Delivers queued events until the queue is empty. Returns the number of
    /// events processed.
    ///
    /// A handler error aborts the pump and discards whatever is still queued,
    /// so the next pump starts from an empty queue.
    pub fn pump(&mut self) -> Result<usize> {
        let mut delivered = 0;
        while let Some(event) = self.queue.pop() {
            if delivered == MAX_EVENTS_PER_PUMP {
                warn!(
                    "dropping {} queued event(s) after {MAX_EVENTS_PER_PUMP} deliveries",
                    self.queue.len() + 1
                );
                self.queue.clear();
                break;
            }
            delivered += 1;

            let listeners = self.subscriptions.listeners(&event.key).to_vec();
            if listeners.is_empty() {
                debug!("no listeners for {}", event.key);
                continue;
            }
            for listener in listeners {
                let slot = &mut self.slots[listener];
                let name = slot.behavior.name();
                debug!("delivering {} to {name} on {}", event.key, slot.entity);
                let mut ctx = BehaviorContext::new(
                    slot.entity,
                    listener,
                    name,
                    &self.world,
                    self.host.as_ref(),
                    &mut self.queue,
                    &mut self.subscriptions,
                    &mut self.signals,
                );
                let entity = slot.entity;
                if let Err(err) = slot.behavior.on_event(&mut ctx, &event) {
                    if !self.queue.is_empty() {
                        warn!(
                            "dropping {} queued event(s) after {name} failed",
                            self.queue.len()
                        );
                        self.queue.clear();
                    }
                    return Err(err.context(format!(
                        "{name} on {entity} failed to handle {}",
                        event.key
                    )));
                }
            }
        }
        Ok(delivered)
    }

    fn entity(&self, name: &str) -> Result<EntityId> {
        self.world
            .find(name)
            .ok_or_else(|| anyhow!("no entity named `{name}`"))
    }

    /// Simulates a click on the named entity.
    pub fn click(&mut self, name: &str) -> Result<()> {
        let entity = self.entity(name)?;
        self.emit(EventKey::Click(entity), EventPayload::Empty);
        self.pump().map(|_| ())
    }

    /// Raises a world event.
    pub fn emit_global(&mut self, name: &str, payload: EventPayload) -> Result<()> {
        self.emit(EventKey::global(name), payload);
        self.pump().map(|_| ())
    }

    /// Raises an event scoped to the named entity.
    pub fn emit_entity(&mut self, entity: &str, name: &str, payload: EventPayload) -> Result<()> {
        let entity = self.entity(entity)?;
        self.emit(EventKey::entity(entity, name), payload);
        self.pump().map(|_| ())
    }

    /// Sends new text to the surface text behaviors of the named entity.
    pub fn update_text(&mut self, entity: &str, text: &str) -> Result<()> {
        self.emit_entity(entity, UPDATE_TEXT_EVENT, EventPayload::Text(text.to_string()))
    }
}
