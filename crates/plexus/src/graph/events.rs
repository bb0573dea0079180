//! Graph notifications and the listener bus.

use std::fmt;

use plexus_core::identifier::Id;

use crate::model::Change;

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Add,
    Remove,
    /// A top-level property changed; carries the property name.
    Change(String),
    Focus,
    Unfocus,
    Reset,
}

impl EventKind {
    /// True when a listener registered under `key` should receive this kind.
    ///
    /// `"change"` matches every property change, `"change:<field>"` only
    /// changes of that field, and `"all"` matches everything.
    pub fn matches(&self, key: &str) -> bool {
        if key == "all" {
            return true;
        }
        match self {
            Self::Add => key == "add",
            Self::Remove => key == "remove",
            Self::Focus => key == "focus",
            Self::Unfocus => key == "unfocus",
            Self::Reset => key == "reset",
            Self::Change(field) => {
                key == "change"
                    || key
                        .strip_prefix("change:")
                        .is_some_and(|wanted| wanted == field)
            }
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
            Self::Change(field) => write!(f, "change:{field}"),
            Self::Focus => write!(f, "focus"),
            Self::Unfocus => write!(f, "unfocus"),
            Self::Reset => write!(f, "reset"),
        }
    }
}

/// A graph notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    /// The affected cell; `None` for `Reset`.
    pub cell: Option<Id>,
    /// The committed change for `Change` events.
    pub change: Option<Change>,
}

impl Event {
    pub fn new(kind: EventKind, cell: Id) -> Self {
        Self {
            kind,
            cell: Some(cell),
            change: None,
        }
    }

    pub fn change(cell: Id, change: Change) -> Self {
        Self {
            kind: EventKind::Change(change.top.clone()),
            cell: Some(cell),
            change: Some(change),
        }
    }

    pub fn reset() -> Self {
        Self {
            kind: EventKind::Reset,
            cell: None,
            change: None,
        }
    }
}

/// Handle returned by [`EventBus::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn FnMut(&Event)>;

/// Listener lists keyed by event name, called synchronously in
/// subscription order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, String, Listener)>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field(
                "keys",
                &self.listeners.iter().map(|(_, key, _)| key).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, key: impl Into<String>, listener: impl FnMut(&Event) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, key.into(), Box::new(listener)));
        id
    }

    /// Unsubscribes a listener. Returns `false` when it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &Event) {
        for (_, key, listener) in &mut self.listeners {
            if event.kind.matches(key) {
                listener(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
