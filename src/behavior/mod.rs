//! Behaviors attached to scene entities.
//!
//! A behavior is started once by the runtime, registers the events it cares
//! about through its [`BehaviorContext`], and is then invoked synchronously
//! for every matching event.

mod click_emitter;
pub mod properties;
mod surface_text;
mod visibility_toggle;

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::events::{Event, EventKey, EventPayload, EventQueue, ListenerId, Subscriptions};
use crate::render::GraphicsHost;
use crate::world::{EntityId, World};

pub use click_emitter::ClickEmitter;
pub use properties::{PropertyDef, PropertyKind, PropertySheet};
pub use surface_text::{RenderReport, SurfaceTextRenderer, TextCache};
pub use visibility_toggle::{Visibility, VisibilityToggle};

/// Completion signal raised by a behavior for higher-level sequencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Success,
    Failure,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure => f.write_str("failure"),
        }
    }
}

/// A signal together with the behavior and entity that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalRecord {
    pub entity: EntityId,
    pub behavior: &'static str,
    pub signal: Signal,
}

/// Script attached to an entity.
pub trait Behavior: Send {
    fn name(&self) -> &'static str;

    /// Runs once when the runtime starts.
    fn start(&mut self, ctx: &mut BehaviorContext<'_>) -> Result<()>;

    /// Handles one event this behavior subscribed to.
    fn on_event(&mut self, ctx: &mut BehaviorContext<'_>, event: &Event) -> Result<()>;
}

/// Host services available to a behavior while it runs.
pub struct BehaviorContext<'a> {
    entity: EntityId,
    listener: ListenerId,
    behavior: &'static str,
    world: &'a World,
    host: &'a dyn GraphicsHost,
    events: &'a mut EventQueue,
    subscriptions: &'a mut Subscriptions,
    signals: &'a mut Vec<SignalRecord>,
}

impl<'a> BehaviorContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entity: EntityId,
        listener: ListenerId,
        behavior: &'static str,
        world: &'a World,
        host: &'a dyn GraphicsHost,
        events: &'a mut EventQueue,
        subscriptions: &'a mut Subscriptions,
        signals: &'a mut Vec<SignalRecord>,
    ) -> Self {
        Self {
            entity,
            listener,
            behavior,
            world,
            host,
            events,
            subscriptions,
            signals,
        }
    }

    /// Entity the behavior is attached to.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn world(&self) -> &World {
        self.world
    }

    pub fn host(&self) -> &dyn GraphicsHost {
        self.host
    }

    pub fn subscribe(&mut self, key: EventKey) {
        self.subscriptions.subscribe(key, self.listener);
    }

    pub fn emit(&mut self, key: EventKey, payload: EventPayload) {
        self.events.emit(key, payload);
    }

    pub fn signal(&mut self, signal: Signal) {
        log::debug!("{} on {} signalled {signal}", self.behavior, self.entity);
        self.signals.push(SignalRecord {
            entity: self.entity,
            behavior: self.behavior,
            signal,
        });
    }

    /// Hides the attached entity. A missing entity is unrecoverable.
    pub fn hide(&self) -> Result<()> {
        self.world
            .hide(self.entity)
            .then_some(())
            .ok_or_else(|| anyhow!("entity {} vanished from the world", self.entity))
    }

    pub fn show(&self) -> Result<()> {
        self.world
            .show(self.entity)
            .then_some(())
            .ok_or_else(|| anyhow!("entity {} vanished from the world", self.entity))
    }

    pub fn is_hidden(&self) -> Result<bool> {
        self.world
            .is_hidden(self.entity)
            .ok_or_else(|| anyhow!("entity {} vanished from the world", self.entity))
    }
}

/// Behaviors that can be named in a scene description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorKind {
    ClickEmitter,
    VisibilityToggle,
    SurfaceText,
}

impl BehaviorKind {
    pub const ALL: [Self; 3] = [Self::ClickEmitter, Self::VisibilityToggle, Self::SurfaceText];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClickEmitter => "ClickEmitter",
            Self::VisibilityToggle => "VisibilityToggle",
            Self::SurfaceText => "SurfaceText",
        }
    }

    pub fn properties(self) -> &'static [PropertyDef] {
        match self {
            Self::ClickEmitter => ClickEmitter::PROPERTIES,
            Self::VisibilityToggle => VisibilityToggle::PROPERTIES,
            Self::SurfaceText => SurfaceTextRenderer::PROPERTIES,
        }
    }

    /// Builds a behavior instance from its property sheet.
    pub fn instantiate(self, properties: &PropertySheet) -> Result<Box<dyn Behavior>> {
        properties.warn_unknown(self.as_str(), self.properties());
        let behavior: Box<dyn Behavior> = match self {
            Self::ClickEmitter => Box::new(ClickEmitter::from_properties(properties)?),
            Self::VisibilityToggle => Box::new(VisibilityToggle::from_properties(properties)?),
            Self::SurfaceText => Box::new(SurfaceTextRenderer::from_properties(properties)?),
        };
        Ok(behavior)
    }
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BehaviorKind {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim() {
            "ClickEmitter" | "EmitMessageClickTap" => Ok(Self::ClickEmitter),
            "VisibilityToggle" => Ok(Self::VisibilityToggle),
            "SurfaceText" | "SurfaceTextRenderer" => Ok(Self::SurfaceText),
            other => Err(anyhow!("unknown behavior type `{other}`")).with_context(|| {
                let known: Vec<_> = Self::ALL.iter().map(|kind| kind.as_str()).collect();
                format!("expected one of {}", known.join(", "))
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::render::SoftwareHost;

    /// Owns everything a [`BehaviorContext`] borrows.
    #[derive(Default)]
    pub struct Harness {
        pub world: World,
        pub host: SoftwareHost,
        pub events: EventQueue,
        pub subscriptions: Subscriptions,
        pub signals: Vec<SignalRecord>,
    }

    impl Harness {
        pub fn context(&mut self, entity: EntityId, behavior: &'static str) -> BehaviorContext<'_> {
            BehaviorContext::new(
                entity,
                0,
                behavior,
                &self.world,
                &self.host,
                &mut self.events,
                &mut self.subscriptions,
                &mut self.signals,
            )
        }

        pub fn drain(&mut self) -> Vec<Event> {
            std::iter::from_fn(|| self.events.pop()).collect()
        }
    }
}
