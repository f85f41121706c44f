use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::events::{Event, EventKey, EventPayload};

use super::properties::{PropertyDef, PropertyKind, PropertySheet};
use super::{Behavior, BehaviorContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn from_hidden(hidden: bool) -> Self {
        if hidden {
            Self::Hidden
        } else {
            Self::Visible
        }
    }

    /// Script-originated events flip the state; anything else hides.
    pub fn next(self, payload: &EventPayload) -> Self {
        if !payload.is_script_origin() {
            return Self::Hidden;
        }
        match self {
            Self::Visible => Self::Hidden,
            Self::Hidden => Self::Visible,
        }
    }
}

/// Starts its entity hidden and toggles it on a world event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityToggle {
    toggle_event_name: String,
}

impl VisibilityToggle {
    pub const PROPERTIES: &'static [PropertyDef] = &[PropertyDef {
        name: "toggleEventName",
        kind: PropertyKind::String,
        default: None,
        description: "World event that toggles the visibility of the entity",
    }];

    pub fn new(toggle_event_name: impl Into<String>) -> Self {
        Self {
            toggle_event_name: toggle_event_name.into(),
        }
    }

    pub fn from_properties(properties: &PropertySheet) -> Result<Self> {
        let name = properties
            .required_string("toggleEventName")
            .context("VisibilityToggle")?;
        Ok(Self::new(name))
    }
}

impl Behavior for VisibilityToggle {
    fn name(&self) -> &'static str {
        "VisibilityToggle"
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_>) -> Result<()> {
        ctx.hide()?;
        ctx.subscribe(EventKey::global(&self.toggle_event_name));
        Ok(())
    }

    fn on_event(&mut self, ctx: &mut BehaviorContext<'_>, event: &Event) -> Result<()> {
        let current = Visibility::from_hidden(ctx.is_hidden()?);
        let next = current.next(&event.payload);
        debug!(
            "{} {:?} -> {:?} on {}",
            ctx.entity(),
            current,
            next,
            event.key
        );
        match next {
            Visibility::Visible => ctx.show(),
            Visibility::Hidden => ctx.hide(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::test_support::Harness;
    use crate::world::EntityId;

    fn deliver(
        harness: &mut Harness,
        toggle: &mut VisibilityToggle,
        entity: EntityId,
        payload: EventPayload,
    ) {
        let event = Event {
            key: EventKey::global("flip"),
            payload,
        };
        let mut ctx = harness.context(entity, "VisibilityToggle");
        toggle.on_event(&mut ctx, &event).unwrap();
    }

    fn started(harness: &mut Harness) -> (EntityId, VisibilityToggle) {
        let card = harness.world.spawn("Card", None);
        let mut toggle = VisibilityToggle::new("flip");
        toggle
            .start(&mut harness.context(card, "VisibilityToggle"))
            .unwrap();
        (card, toggle)
    }

    #[test]
    fn transition_table() {
        let script = EventPayload::Flag(true);
        let external = EventPayload::Empty;
        assert_eq!(Visibility::Hidden.next(&script), Visibility::Visible);
        assert_eq!(Visibility::Visible.next(&script), Visibility::Hidden);
        assert_eq!(Visibility::Hidden.next(&external), Visibility::Hidden);
        assert_eq!(Visibility::Visible.next(&external), Visibility::Hidden);
        assert_eq!(
            Visibility::Visible.next(&EventPayload::Text("x".into())),
            Visibility::Hidden
        );
    }

    #[test]
    fn starts_hidden_and_subscribes() {
        let mut harness = Harness::default();
        let (card, _) = started(&mut harness);
        assert_eq!(harness.world.is_hidden(card), Some(true));
        assert_eq!(
            harness.subscriptions.listeners(&EventKey::global("flip")),
            &[0]
        );
    }

    #[test]
    fn script_events_toggle_once_each() {
        let mut harness = Harness::default();
        let (card, mut toggle) = started(&mut harness);

        deliver(&mut harness, &mut toggle, card, EventPayload::Flag(true));
        assert_eq!(harness.world.is_hidden(card), Some(false));
        deliver(&mut harness, &mut toggle, card, EventPayload::Flag(true));
        assert_eq!(harness.world.is_hidden(card), Some(true));
    }

    #[test]
    fn other_payloads_force_hidden() {
        let mut harness = Harness::default();
        let (card, mut toggle) = started(&mut harness);

        deliver(&mut harness, &mut toggle, card, EventPayload::Flag(true));
        assert_eq!(harness.world.is_hidden(card), Some(false));
        deliver(&mut harness, &mut toggle, card, EventPayload::Flag(false));
        assert_eq!(harness.world.is_hidden(card), Some(true));
        deliver(&mut harness, &mut toggle, card, EventPayload::Empty);
        assert_eq!(harness.world.is_hidden(card), Some(true));
    }

    #[test]
    fn missing_entity_is_fatal() {
        let mut harness = Harness::default();
        let mut toggle = VisibilityToggle::new("flip");
        let result = toggle.start(&mut harness.context(EntityId::new(9), "VisibilityToggle"));
        assert!(result.is_err());
    }
}
