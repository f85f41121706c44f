use anyhow::{Context, Result};
use log::debug;

use crate::events::{Event, EventKey, EventPayload};

use super::properties::{PropertyDef, PropertyKind, PropertySheet};
use super::{Behavior, BehaviorContext};

/// Emits a world event every time its entity is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEmitter {
    event_name: String,
}

impl ClickEmitter {
    pub const PROPERTIES: &'static [PropertyDef] = &[PropertyDef {
        name: "eventName",
        kind: PropertyKind::String,
        default: None,
        description: "The event to emit",
    }];

    pub fn new(event_name: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
        }
    }

    pub fn from_properties(properties: &PropertySheet) -> Result<Self> {
        let event_name = properties
            .required_string("eventName")
            .context("ClickEmitter")?;
        Ok(Self::new(event_name))
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }
}

impl Behavior for ClickEmitter {
    fn name(&self) -> &'static str {
        "ClickEmitter"
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_>) -> Result<()> {
        let entity = ctx.entity();
        ctx.subscribe(EventKey::Click(entity));
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut BehaviorContext<'_>, event: &Event) -> Result<()> {
        if event.key != EventKey::Click(ctx.entity()) {
            return Ok(());
        }
        debug!("{} clicked, emitting {}", ctx.entity(), self.event_name);
        ctx.emit(EventKey::global(&self.event_name), EventPayload::Flag(true));
        Ok(())
    }
}
