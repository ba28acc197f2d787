//! Document: element tree, listeners and scroll surfaces
//!
//! The document owns the window viewport alongside the element tree. Scroll
//! offsets are written through [`Document::set_scroll_top`], which clamps to
//! the scrollable range and queues a scroll event for the target. Queued
//! events are delivered by [`Document::flush_events`]; clicks are delivered
//! immediately by [`Document::click`].
//!
//! Native smooth scrolling is not performed here. Requests are recorded as
//! [`PendingScroll`] entries for the host to carry out, the same way a
//! renderer drains pending scroll operations each frame.

use std::collections::VecDeque;

use crate::error::{DomError, Result};
use crate::event::{
    EventCallback, EventContext, EventTarget, EventType, HandlerRegistry, ListenerId,
};
use crate::selector::Selector;
use crate::tree::{ElementId, ElementTree};

/// A surface whose scroll offset can be read and written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollTarget {
    /// The window (document scrolling element)
    Viewport,
    /// A scrollable element
    Element(ElementId),
}

impl From<ScrollTarget> for EventTarget {
    fn from(target: ScrollTarget) -> Self {
        match target {
            ScrollTarget::Viewport => EventTarget::Window,
            ScrollTarget::Element(id) => EventTarget::Element(id),
        }
    }
}

/// Window scroll state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub scroll_top: f32,
    /// Height of the visible window area
    pub inner_height: f32,
}

/// Snapshot of a scroll surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Current scroll offset
    pub scroll_top: f32,
    /// Visible extent of the surface
    pub viewport_extent: f32,
    /// Total scrollable extent of the content
    pub scroll_extent: f32,
}

impl ScrollMetrics {
    /// Largest reachable scroll offset
    pub fn max_scroll(&self) -> f32 {
        (self.scroll_extent - self.viewport_extent).max(0.0)
    }
}

/// A native scroll request waiting for the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingScroll {
    pub target: ScrollTarget,
    /// Destination scroll offset
    pub top: f32,
    pub smooth: bool,
}

/// Element tree plus the event and scroll state around it
pub struct Document {
    tree: ElementTree,
    handlers: HandlerRegistry,
    viewport: Viewport,
    user_agent: String,
    queued: VecDeque<(EventType, EventTarget)>,
    pending_scrolls: Vec<PendingScroll>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            tree: ElementTree::new(),
            handlers: HandlerRegistry::new(),
            viewport: Viewport::default(),
            user_agent: String::new(),
            queued: VecDeque::new(),
            pending_scrolls: Vec::new(),
        }
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Set the visible window height
    pub fn set_viewport_height(&mut self, inner_height: f32) {
        self.viewport.inner_height = inner_height.max(0.0);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Descendants of `scope` matching a selector, in document order
    pub fn query_selector_all(&self, scope: ElementId, selector: &str) -> Result<Vec<ElementId>> {
        if !self.tree.exists(scope) {
            return Err(DomError::UnknownElement(scope));
        }
        Ok(Selector::parse(selector)?.query_all(&self.tree, scope))
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    pub fn scroll_top(&self, target: ScrollTarget) -> f32 {
        self.scroll_metrics(target).scroll_top
    }

    /// Current offset and extents of a scroll surface
    ///
    /// The window's scroll extent is the root element's scroll height.
    /// Unknown elements report zeroed metrics.
    pub fn scroll_metrics(&self, target: ScrollTarget) -> ScrollMetrics {
        match target {
            ScrollTarget::Viewport => ScrollMetrics {
                scroll_top: self.viewport.scroll_top,
                viewport_extent: self.viewport.inner_height,
                scroll_extent: self
                    .tree
                    .geometry(self.tree.root())
                    .map(|g| g.scroll_height)
                    .unwrap_or(0.0),
            },
            ScrollTarget::Element(id) => self
                .tree
                .geometry(id)
                .map(|g| ScrollMetrics {
                    scroll_top: g.scroll_top,
                    viewport_extent: g.offset_height,
                    scroll_extent: g.scroll_height,
                })
                .unwrap_or_default(),
        }
    }

    /// Write a scroll offset, clamped to the reachable range
    ///
    /// Queues a scroll event when the offset actually changes. Returns the
    /// offset that was applied.
    pub fn set_scroll_top(&mut self, target: ScrollTarget, top: f32) -> f32 {
        let metrics = self.scroll_metrics(target);
        let clamped = if top.is_nan() {
            metrics.scroll_top
        } else {
            top.clamp(0.0, metrics.max_scroll())
        };
        if clamped == metrics.scroll_top {
            return clamped;
        }

        match target {
            ScrollTarget::Viewport => self.viewport.scroll_top = clamped,
            ScrollTarget::Element(id) => match self.tree.geometry_mut(id) {
                Some(geometry) => geometry.scroll_top = clamped,
                None => return metrics.scroll_top,
            },
        }
        tracing::trace!("Document: {:?} scrolled to {}", target, clamped);
        self.queue_event(EventType::Scroll, target.into());
        clamped
    }

    /// Record a native smooth-scroll request for the host
    pub fn request_smooth_scroll(&mut self, target: ScrollTarget, top: f32) {
        self.pending_scrolls.push(PendingScroll {
            target,
            top,
            smooth: true,
        });
    }

    /// Take all pending native scroll requests
    pub fn take_pending_scrolls(&mut self) -> Vec<PendingScroll> {
        std::mem::take(&mut self.pending_scrolls)
    }

    pub fn has_pending_scrolls(&self) -> bool {
        !self.pending_scrolls.is_empty()
    }

    /// Complete every pending native scroll by jumping to its destination
    pub fn apply_pending_scrolls(&mut self) {
        for scroll in self.take_pending_scrolls() {
            self.set_scroll_top(scroll.target, scroll.top);
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn add_listener(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        callback: EventCallback,
    ) -> ListenerId {
        self.handlers.add(target, event_type, callback)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.handlers.remove(id)
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Queue an event for the next [`flush_events`](Self::flush_events)
    ///
    /// A scroll event already waiting for the same target is not queued
    /// twice.
    pub fn queue_event(&mut self, event_type: EventType, target: EventTarget) {
        if event_type == EventType::Scroll && self.queued.contains(&(event_type, target)) {
            return;
        }
        self.queued.push_back((event_type, target));
    }

    pub fn has_queued_events(&self) -> bool {
        !self.queued.is_empty()
    }

    /// Deliver queued events until the queue is empty
    ///
    /// Events queued by listeners during the flush are delivered in the same
    /// call. Returns the number of events delivered.
    pub fn flush_events(&mut self) -> usize {
        let mut delivered = 0;
        while let Some((event_type, target)) = self.queued.pop_front() {
            let ctx = EventContext::new(event_type, target);
            self.dispatch(&ctx);
            delivered += 1;
        }
        delivered
    }

    /// Deliver an event immediately
    ///
    /// Bubbling events visit the target, then each ancestor element, then
    /// the window.
    pub fn dispatch(&mut self, ctx: &EventContext) {
        let path: Vec<EventTarget> = match (ctx.target, ctx.event_type.bubbles()) {
            (EventTarget::Element(id), true) => std::iter::once(id)
                .chain(self.tree.ancestors(id))
                .map(EventTarget::Element)
                .chain(std::iter::once(EventTarget::Window))
                .collect(),
            (target, _) => vec![target],
        };

        for target in path {
            ctx.set_current_target(target);
            for callback in self.handlers.callbacks(target, ctx.event_type) {
                callback(self, ctx);
            }
        }
        ctx.set_current_target(ctx.target);
    }

    /// Click an element; returns true if a listener prevented the default action
    pub fn click(&mut self, element: ElementId) -> bool {
        let ctx = EventContext::click(element);
        self.dispatch(&ctx);
        ctx.default_prevented()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn scrollable_doc() -> (Document, ElementId) {
        let mut doc = Document::new();
        let root = doc.tree().root();
        let pane = doc
            .tree_mut()
            .element("div")
            .height(200.0)
            .scroll_height(1000.0)
            .append_to(root);
        (doc, pane)
    }

    #[test]
    fn test_set_scroll_top_clamps_and_queues() {
        let (mut doc, pane) = scrollable_doc();
        let target = ScrollTarget::Element(pane);

        assert_eq!(doc.set_scroll_top(target, 5000.0), 800.0);
        assert_eq!(doc.scroll_top(target), 800.0);
        assert!(doc.has_queued_events());

        assert_eq!(doc.set_scroll_top(target, -10.0), 0.0);
        // Both writes coalesce into one pending scroll event
        assert_eq!(doc.flush_events(), 1);
    }

    #[test]
    fn test_unchanged_offset_queues_nothing() {
        let (mut doc, pane) = scrollable_doc();
        doc.set_scroll_top(ScrollTarget::Element(pane), 0.0);
        assert!(!doc.has_queued_events());
    }

    #[test]
    fn test_viewport_metrics_use_root_scroll_height() {
        let mut doc = Document::new();
        doc.set_viewport_height(600.0);
        let root = doc.tree().root();
        doc.tree_mut().geometry_mut(root).unwrap().scroll_height = 2000.0;

        doc.set_scroll_top(ScrollTarget::Viewport, 1500.0);
        let metrics = doc.scroll_metrics(ScrollTarget::Viewport);
        assert_eq!(metrics.scroll_top, 1400.0);
        assert_eq!(metrics.viewport_extent, 600.0);
        assert_eq!(metrics.scroll_extent, 2000.0);
    }

    #[test]
    fn test_scroll_listener_fires_on_flush() {
        let (mut doc, pane) = scrollable_doc();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        doc.add_listener(
            EventTarget::Element(pane),
            EventType::Scroll,
            Rc::new(move |doc: &mut Document, _: &EventContext| {
                seen_clone
                    .borrow_mut()
                    .push(doc.scroll_top(ScrollTarget::Element(pane)));
            }),
        );

        doc.set_scroll_top(ScrollTarget::Element(pane), 120.0);
        assert!(seen.borrow().is_empty());
        doc.flush_events();
        assert_eq!(*seen.borrow(), vec![120.0]);
    }

    #[test]
    fn test_listener_can_scroll_during_flush() {
        let (mut doc, pane) = scrollable_doc();
        let count = Rc::new(Cell::new(0));
        let count_clone = Rc::clone(&count);
        doc.add_listener(
            EventTarget::Element(pane),
            EventType::Scroll,
            Rc::new(move |doc: &mut Document, _: &EventContext| {
                count_clone.set(count_clone.get() + 1);
                let target = ScrollTarget::Element(pane);
                if doc.scroll_top(target) < 300.0 {
                    let next = doc.scroll_top(target) + 100.0;
                    doc.set_scroll_top(target, next);
                }
            }),
        );

        doc.set_scroll_top(ScrollTarget::Element(pane), 100.0);
        assert_eq!(doc.flush_events(), 3);
        assert_eq!(count.get(), 3);
        assert_eq!(doc.scroll_top(ScrollTarget::Element(pane)), 300.0);
    }

    #[test]
    fn test_click_bubbles_to_window() {
        let mut doc = Document::new();
        let root = doc.tree().root();
        let nav = doc.tree_mut().element("nav").append_to(root);
        let link = doc.tree_mut().element("a").append_to(nav);

        let order = Rc::new(RefCell::new(Vec::new()));
        for target in [
            EventTarget::Window,
            EventTarget::Element(nav),
            EventTarget::Element(link),
        ] {
            let order = Rc::clone(&order);
            doc.add_listener(
                target,
                EventType::Click,
                Rc::new(move |_: &mut Document, ctx: &EventContext| {
                    order.borrow_mut().push(ctx.current_target())
                }),
            );
        }

        assert!(!doc.click(link));
        assert_eq!(
            *order.borrow(),
            vec![
                EventTarget::Element(link),
                EventTarget::Element(nav),
                EventTarget::Window
            ]
        );
    }

    #[test]
    fn test_click_prevent_default() {
        let mut doc = Document::new();
        let root = doc.tree().root();
        let link = doc.tree_mut().element("a").append_to(root);
        doc.add_listener(
            EventTarget::Element(link),
            EventType::Click,
            Rc::new(|_: &mut Document, ctx: &EventContext| ctx.prevent_default()),
        );
        assert!(doc.click(link));
    }

    #[test]
    fn test_listener_removes_itself() {
        let mut doc = Document::new();
        let root = doc.tree().root();
        let link = doc.tree_mut().element("a").append_to(root);
        let id = Rc::new(Cell::new(None));
        let id_clone = Rc::clone(&id);
        let registered = doc.add_listener(
            EventTarget::Element(link),
            EventType::Click,
            Rc::new(move |doc: &mut Document, _: &EventContext| {
                if let Some(id) = id_clone.get() {
                    doc.remove_listener(id);
                }
            }),
        );
        id.set(Some(registered));

        doc.click(link);
        assert!(doc.handlers().is_empty());
    }

    #[test]
    fn test_pending_smooth_scrolls() {
        let (mut doc, pane) = scrollable_doc();
        doc.request_smooth_scroll(ScrollTarget::Element(pane), 450.0);
        assert!(doc.has_pending_scrolls());

        doc.apply_pending_scrolls();
        assert!(!doc.has_pending_scrolls());
        assert_eq!(doc.scroll_top(ScrollTarget::Element(pane)), 450.0);
    }

    #[test]
    fn test_query_selector_all_errors() {
        let doc = Document::new();
        let root = doc.tree().root();
        assert!(matches!(
            doc.query_selector_all(root, "a >"),
            Err(DomError::InvalidSelector { .. })
        ));
        assert_eq!(doc.query_selector_all(root, "a").unwrap(), vec![]);
    }
}
