use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::world::EntityId;

/// Name of the entity-scoped event that re-renders surface text.
pub const UPDATE_TEXT_EVENT: &str = "updateText";

/// Address an event is delivered to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKey {
    /// Click interaction on an entity.
    Click(EntityId),
    /// World-wide named event.
    Global(String),
    /// Named event scoped to a single entity.
    Entity(EntityId, String),
}

impl EventKey {
    pub fn global(name: impl Into<String>) -> Self {
        Self::Global(name.into())
    }

    pub fn entity(entity: EntityId, name: impl Into<String>) -> Self {
        Self::Entity(entity, name.into())
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click(entity) => write!(f, "click({entity})"),
            Self::Global(name) => write!(f, "world:{name}"),
            Self::Entity(entity, name) => write!(f, "{entity}:{name}"),
        }
    }
}

/// Value carried by an event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EventPayload {
    #[default]
    Empty,
    Flag(bool),
    Text(String),
}

impl EventPayload {
    /// Only a `true` flag marks an event as raised by a behavior script.
    pub fn is_script_origin(&self) -> bool {
        matches!(self, Self::Flag(true))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Parses a command-line payload: `true`/`false` become flags, anything
    /// else is text, and an absent value is empty.
    pub fn from_arg(value: Option<&str>) -> Self {
        match value {
            None => Self::Empty,
            Some("true") => Self::Flag(true),
            Some("false") => Self::Flag(false),
            Some(text) => Self::Text(text.to_string()),
        }
    }
}

/// Pending event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub key: EventKey,
    pub payload: EventPayload,
}

/// FIFO of events waiting to be dispatched.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, key: EventKey, payload: EventPayload) {
        self.pending.push_back(Event { key, payload });
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Index of a behavior instance inside the runtime.
pub type ListenerId = usize;

/// Callback table mapping event keys to the listeners registered for them.
#[derive(Debug, Default)]
pub struct Subscriptions {
    table: HashMap<EventKey, Vec<ListenerId>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `key`. Registering twice is a no-op, so each
    /// event reaches a listener at most once.
    pub fn subscribe(&mut self, key: EventKey, listener: ListenerId) {
        let listeners = self.table.entry(key).or_default();
        if !listeners.contains(&listener) {
            listeners.push(listener);
        }
    }

    pub fn listeners(&self, key: &EventKey) -> &[ListenerId] {
        self.table.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_true_flag_is_script_origin() {
        assert!(EventPayload::Flag(true).is_script_origin());
        assert!(!EventPayload::Flag(false).is_script_origin());
        assert!(!EventPayload::Empty.is_script_origin());
        assert!(!EventPayload::Text("true".into()).is_script_origin());
    }

    #[test]
    fn queue_is_fifo() {
        let mut queue = EventQueue::new();
        queue.emit(EventKey::global("a"), EventPayload::Empty);
        queue.emit(EventKey::global("b"), EventPayload::Flag(true));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().key, EventKey::global("a"));
        assert_eq!(queue.pop().unwrap().payload, EventPayload::Flag(true));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn duplicate_subscriptions_are_ignored() {
        let mut subscriptions = Subscriptions::new();
        let key = EventKey::entity(EntityId::new(0), UPDATE_TEXT_EVENT);
        subscriptions.subscribe(key.clone(), 3);
        subscriptions.subscribe(key.clone(), 3);
        subscriptions.subscribe(key.clone(), 1);
        assert_eq!(subscriptions.listeners(&key), &[3, 1]);
        assert!(subscriptions.listeners(&EventKey::global("other")).is_empty());
    }

    #[test]
    fn payload_from_arg() {
        assert_eq!(EventPayload::from_arg(None), EventPayload::Empty);
        assert_eq!(EventPayload::from_arg(Some("true")), EventPayload::Flag(true));
        assert_eq!(
            EventPayload::from_arg(Some("hello")),
            EventPayload::Text("hello".into())
        );
    }
}
