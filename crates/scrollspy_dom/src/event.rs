//! Event listener storage
//!
//! Listeners are registered against an [`EventTarget`] (an element or the
//! window) and an [`EventType`], and are removed individually through the
//! [`ListenerId`] returned at registration.
//!
//! # Architecture
//!
//! ```text
//! Document::add_listener(target, type, callback)
//!     ↓
//! HandlerRegistry (listeners keyed by ListenerId, indexed by target + type)
//!     ↓ Document::dispatch / flush_events
//! callbacks cloned out of the registry, then invoked with &mut Document
//! ```
//!
//! Callbacks are cloned out before they run, so a callback may freely add or
//! remove listeners (including itself) on the document it receives.

use std::cell::Cell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::document::Document;
use crate::tree::ElementId;

new_key_type! {
    /// Handle to a registered listener
    pub struct ListenerId;
}

/// Kinds of events delivered to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Scroll offset of the target changed (does not bubble)
    Scroll,
    /// Element was activated (bubbles to ancestors, then the window)
    Click,
}

impl EventType {
    pub fn bubbles(self) -> bool {
        matches!(self, EventType::Click)
    }
}

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The window / document viewport
    Window,
    Element(ElementId),
}

/// Callback for handling events
///
/// Uses Rc since UI is single-threaded.
pub type EventCallback = Rc<dyn Fn(&mut Document, &EventContext)>;

/// Context passed to event listeners
#[derive(Debug)]
pub struct EventContext {
    /// The type of event that occurred
    pub event_type: EventType,
    /// The target the event was dispatched at
    pub target: EventTarget,
    current_target: Cell<EventTarget>,
    default_prevented: Cell<bool>,
}

impl EventContext {
    pub fn new(event_type: EventType, target: EventTarget) -> Self {
        Self {
            event_type,
            target,
            current_target: Cell::new(target),
            default_prevented: Cell::new(false),
        }
    }

    pub fn click(element: ElementId) -> Self {
        Self::new(EventType::Click, EventTarget::Element(element))
    }

    /// The target whose listeners are currently running (differs from
    /// `target` while bubbling)
    pub fn current_target(&self) -> EventTarget {
        self.current_target.get()
    }

    pub(crate) fn set_current_target(&self, target: EventTarget) {
        self.current_target.set(target);
    }

    /// Suppress the host's default action for this event
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

struct Listener {
    target: EventTarget,
    event_type: EventType,
    callback: EventCallback,
}

/// Listener registry for a document
#[derive(Default)]
pub struct HandlerRegistry {
    listeners: SlotMap<ListenerId, Listener>,
    /// Registration order per (target, type)
    index: FxHashMap<(EventTarget, EventType), Vec<ListenerId>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn add(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        callback: EventCallback,
    ) -> ListenerId {
        let id = self.listeners.insert(Listener {
            target,
            event_type,
            callback,
        });
        self.index.entry((target, event_type)).or_default().push(id);
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let Some(listener) = self.listeners.remove(id) else {
            return false;
        };
        let key = (listener.target, listener.event_type);
        if let Some(ids) = self.index.get_mut(&key) {
            ids.retain(|&l| l != id);
            if ids.is_empty() {
                self.index.remove(&key);
            }
        }
        true
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(id)
    }

    /// Check if a target has listeners for an event type
    pub fn has_listener(&self, target: EventTarget, event_type: EventType) -> bool {
        self.index.contains_key(&(target, event_type))
    }

    /// Number of listeners on a target for an event type
    pub fn count(&self, target: EventTarget, event_type: EventType) -> usize {
        self.index
            .get(&(target, event_type))
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Clone the callbacks registered for a target and type, in registration order
    pub fn callbacks(&self, target: EventTarget, event_type: EventType) -> Vec<EventCallback> {
        self.index
            .get(&(target, event_type))
            .map(|ids| {
                ids.iter()
                    .filter_map(|&id| self.listeners.get(id))
                    .map(|l| Rc::clone(&l.callback))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ElementTree;

    fn noop() -> EventCallback {
        Rc::new(|_: &mut Document, _: &EventContext| {})
    }

    #[test]
    fn test_add_and_remove() {
        let mut registry = HandlerRegistry::new();
        let a = registry.add(EventTarget::Window, EventType::Scroll, noop());
        let b = registry.add(EventTarget::Window, EventType::Scroll, noop());

        assert_eq!(registry.count(EventTarget::Window, EventType::Scroll), 2);
        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        assert!(registry.contains(b));
        assert!(registry.remove(b));
        assert!(!registry.has_listener(EventTarget::Window, EventType::Scroll));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_callbacks_keep_registration_order() {
        let mut tree = ElementTree::new();
        let el = tree.create_element("a");
        let mut registry = HandlerRegistry::new();
        let first = registry.add(EventTarget::Element(el), EventType::Click, noop());
        registry.add(EventTarget::Element(el), EventType::Click, noop());
        registry.add(EventTarget::Element(el), EventType::Scroll, noop());

        assert_eq!(registry.callbacks(EventTarget::Element(el), EventType::Click).len(), 2);
        registry.remove(first);
        assert_eq!(registry.callbacks(EventTarget::Element(el), EventType::Click).len(), 1);
        assert_eq!(registry.count(EventTarget::Element(el), EventType::Scroll), 1);
        assert!(registry.callbacks(EventTarget::Window, EventType::Click).is_empty());
    }

    #[test]
    fn test_prevent_default() {
        let ctx = EventContext::new(EventType::Click, EventTarget::Window);
        assert!(!ctx.default_prevented());
        ctx.prevent_default();
        assert!(ctx.default_prevented());
        assert!(EventType::Click.bubbles());
        assert!(!EventType::Scroll.bubbles());
    }
}
