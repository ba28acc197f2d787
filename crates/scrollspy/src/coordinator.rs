//! Binding coordinator
//!
//! A [`ScrollSpy`] owns every binding it creates:
//!
//! - **Containers** produce an active index from scroll events on their
//!   scroll surface.
//! - **Marker sets** carry the active class on the element at the active
//!   index.
//! - **Link sets** turn clicks into scroll-to-section commands.
//!
//! Marker and link sets follow an explicit container, or else the most
//! recently attached one. All per-binding state lives in side tables keyed
//! by the bound element; nothing is stored on the elements themselves.
//!
//! # Example
//!
//! ```rust
//! use scrollspy::{OptionsPatch, ScrollSpy};
//! use scrollspy_dom::{Document, Position, ScrollTarget};
//!
//! let mut doc = Document::new();
//! let body = doc.tree().root();
//! let container = doc
//!     .tree_mut()
//!     .element("div")
//!     .position(Position::Relative)
//!     .height(200.0)
//!     .scroll_height(1000.0)
//!     .append_to(body);
//! for top in [0.0, 300.0, 800.0] {
//!     doc.tree_mut().element("section").offset_top(top).append_to(container);
//! }
//!
//! let spy = ScrollSpy::new();
//! spy.attach_container(&mut doc, container, &OptionsPatch::new()).unwrap();
//! assert_eq!(spy.current_index(container), Some(0));
//!
//! doc.set_scroll_top(ScrollTarget::Element(container), 350.0);
//! doc.flush_events();
//! assert_eq!(spy.current_index(container), Some(1));
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use scrollspy_dom::{
    Document, ElementId, ElementTree, EventCallback, EventContext, EventTarget, EventType,
    ListenerId,
};

use crate::engine::{self, EngineState};
use crate::error::{Result, SpyError};
use crate::offset::offset_top;
use crate::options::{ActiveOptions, ActivePatch, LinkPatch, Options, OptionsPatch};
use crate::scroll_context::ScrollContext;
use crate::scroll_to::{ScrollDriver, ScrollMethod};

/// The three bindable behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Container,
    Markers,
    Links,
}

impl Behavior {
    /// Properties emitted when rendering a bound element on the server
    pub fn server_render_props(self) -> IndexMap<String, String> {
        let mut props = IndexMap::new();
        if self == Behavior::Container {
            props.insert("window".to_string(), String::new());
        }
        props
    }
}

struct ContainerBinding {
    options: Options,
    engine: EngineState,
    sections: Vec<ElementId>,
    context: ScrollContext,
    listener: ListenerId,
}

struct MarkerSet {
    container: Option<ElementId>,
    options: ActiveOptions,
    elements: Vec<ElementId>,
    /// Element carrying the class, with the class that was added
    marked: Option<(ElementId, String)>,
}

impl MarkerSet {
    fn recalculate(&mut self, tree: &mut ElementTree, index: Option<usize>) {
        if let Some((element, class)) = self.marked.take() {
            tree.remove_class(element, &class);
        }
        let Some(&element) = index.and_then(|i| self.elements.get(i)) else {
            return;
        };
        tree.add_class(element, &self.options.class);
        self.marked = Some((element, self.options.class.clone()));
    }

    fn clear(&mut self, tree: &mut ElementTree) {
        self.recalculate(tree, None);
    }
}

struct LinkSet {
    container: Option<ElementId>,
    elements: Vec<ElementId>,
    listeners: Vec<ListenerId>,
}

struct SpyInner {
    defaults: Options,
    containers: FxHashMap<ElementId, ContainerBinding>,
    marker_sets: FxHashMap<ElementId, MarkerSet>,
    link_sets: FxHashMap<ElementId, LinkSet>,
    last_container: Option<ElementId>,
    driver: ScrollDriver,
}

impl SpyInner {
    fn container_index(&self, container: Option<ElementId>) -> Option<usize> {
        container
            .or(self.last_container)
            .and_then(|c| self.containers.get(&c))
            .and_then(|binding| binding.engine.current_index())
    }

    /// Move the active class of every marker set following `container`
    fn apply_markers(&mut self, tree: &mut ElementTree, container: ElementId, index: Option<usize>) {
        let last = self.last_container;
        for set in self.marker_sets.values_mut() {
            if set.container.or(last) == Some(container) {
                set.recalculate(tree, index);
            }
        }
    }
}

/// Weak reference held by event listeners
#[derive(Clone)]
struct SpyHandle {
    inner: Weak<RefCell<SpyInner>>,
}

impl SpyHandle {
    fn upgrade(&self) -> Option<ScrollSpy> {
        self.inner.upgrade().map(|inner| ScrollSpy { inner })
    }
}

/// Scroll-spy coordinator
///
/// Cloning yields another handle to the same coordinator.
#[derive(Clone)]
pub struct ScrollSpy {
    inner: Rc<RefCell<SpyInner>>,
}

impl ScrollSpy {
    pub fn new() -> Self {
        Self::with_defaults(Options::default())
    }

    /// Create a coordinator whose bindings start from `defaults`
    pub fn with_defaults(defaults: Options) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SpyInner {
                defaults,
                containers: FxHashMap::default(),
                marker_sets: FxHashMap::default(),
                link_sets: FxHashMap::default(),
                last_container: None,
                driver: ScrollDriver::new(),
            })),
        }
    }

    fn handle(&self) -> SpyHandle {
        SpyHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn defaults(&self) -> Options {
        self.inner.borrow().defaults.clone()
    }

    // =========================================================================
    // Container binding
    // =========================================================================

    /// Bind `element` as a scroll-spy container and run a first resolution
    ///
    /// Re-attaching an attached container rebinds it from scratch.
    pub fn attach_container(
        &self,
        doc: &mut Document,
        element: ElementId,
        patch: &OptionsPatch,
    ) -> Result<()> {
        if !doc.tree().exists(element) {
            return Err(SpyError::UnknownElement(element));
        }

        {
            let mut inner = self.inner.borrow_mut();
            if let Some(old) = inner.containers.remove(&element) {
                doc.remove_listener(old.listener);
            }

            let options = inner.defaults.merged(patch);
            let sections = find_elements(doc, element, options.section_selector.as_deref());
            let context = ScrollContext::detect(doc.tree(), element, &sections);
            let listener = self.listen(doc, element, context);

            tracing::debug!(
                "ScrollSpy: attached container {:?} with {} sections ({})",
                element,
                sections.len(),
                if context.is_window() { "window" } else { "element" }
            );

            inner.containers.insert(
                element,
                ContainerBinding {
                    options,
                    engine: EngineState::new(),
                    sections,
                    context,
                    listener,
                },
            );
            inner.last_container = Some(element);
        }

        self.refresh(doc, element);
        Ok(())
    }

    /// Re-merge options, rediscover sections and re-resolve
    ///
    /// The published index is kept; the scroll listener moves if the scroll
    /// surface changed.
    pub fn update_container(
        &self,
        doc: &mut Document,
        element: ElementId,
        patch: &OptionsPatch,
    ) -> Result<()> {
        {
            let mut inner = self.inner.borrow_mut();
            let options = inner.defaults.merged(patch);
            let binding = inner
                .containers
                .get_mut(&element)
                .ok_or(SpyError::NotAttached(element))?;

            let sections = find_elements(doc, element, options.section_selector.as_deref());
            let context = ScrollContext::detect(doc.tree(), element, &sections);
            if context != binding.context {
                doc.remove_listener(binding.listener);
                binding.listener = self.listen(doc, element, context);
                binding.context = context;
            }
            binding.options = options;
            binding.sections = sections;
        }

        self.refresh(doc, element);
        Ok(())
    }

    /// Remove the scroll listener and forget the container
    ///
    /// Marker sets following the container lose their active class.
    pub fn detach_container(&self, doc: &mut Document, element: ElementId) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        let binding = inner
            .containers
            .remove(&element)
            .ok_or(SpyError::NotAttached(element))?;
        doc.remove_listener(binding.listener);
        inner.apply_markers(doc.tree_mut(), element, None);
        if inner.last_container == Some(element) {
            inner.last_container = None;
        }
        tracing::debug!("ScrollSpy: detached container {:?}", element);
        Ok(())
    }

    fn listen(&self, doc: &mut Document, container: ElementId, context: ScrollContext) -> ListenerId {
        self.add_listener(
            doc,
            context.event_target(),
            EventType::Scroll,
            move |spy: &ScrollSpy, doc: &mut Document, _: &EventContext| {
                spy.refresh(doc, container);
            },
        )
    }

    /// Register a listener holding only a weak handle to this spy
    ///
    /// Once the spy is dropped the listener does nothing and removes itself
    /// on its next delivery.
    fn add_listener<F>(
        &self,
        doc: &mut Document,
        target: EventTarget,
        event_type: EventType,
        handler: F,
    ) -> ListenerId
    where
        F: Fn(&ScrollSpy, &mut Document, &EventContext) + 'static,
    {
        let handle = self.handle();
        let slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
        let slot_clone = Rc::clone(&slot);
        let callback: EventCallback = Rc::new(move |doc: &mut Document, ctx: &EventContext| {
            match handle.upgrade() {
                Some(spy) => handler(&spy, doc, ctx),
                None => {
                    if let Some(id) = slot_clone.take() {
                        tracing::trace!("ScrollSpy: removing orphaned listener {:?}", id);
                        doc.remove_listener(id);
                    }
                }
            }
        });
        let id = doc.add_listener(target, event_type, callback);
        slot.set(Some(id));
        id
    }

    /// Resolve the active section of a container and publish it
    ///
    /// Runs on every scroll event of the container's scroll surface.
    pub fn refresh(&self, doc: &mut Document, container: ElementId) {
        let notify = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let Some(binding) = inner.containers.get_mut(&container) else {
                return;
            };

            let metrics = doc.scroll_metrics(binding.context.target);
            let resolved = engine::resolve(
                &metrics,
                binding.sections.as_slice(),
                doc.tree(),
                binding.context.until,
                &binding.options,
            );
            if !binding
                .engine
                .publish(resolved, binding.options.allow_no_active_section)
            {
                return;
            }

            tracing::trace!(
                "ScrollSpy: container {:?} active index {:?} at {}",
                container,
                resolved,
                metrics.scroll_top
            );
            let callback = binding.options.index_changed.clone();
            inner.apply_markers(doc.tree_mut(), container, resolved);
            callback.map(|callback| (callback, resolved))
        };

        if let Some((callback, index)) = notify {
            callback(index);
        }
    }

    /// Last published index of a container
    pub fn current_index(&self, container: ElementId) -> Option<usize> {
        self.inner
            .borrow()
            .containers
            .get(&container)
            .and_then(|binding| binding.engine.current_index())
    }

    /// Sections discovered for a container, in index order
    pub fn sections(&self, container: ElementId) -> Vec<ElementId> {
        self.inner
            .borrow()
            .containers
            .get(&container)
            .map(|binding| binding.sections.clone())
            .unwrap_or_default()
    }

    pub fn scroll_context(&self, container: ElementId) -> Option<ScrollContext> {
        self.inner
            .borrow()
            .containers
            .get(&container)
            .map(|binding| binding.context)
    }

    pub fn is_attached(&self, container: ElementId) -> bool {
        self.inner.borrow().containers.contains_key(&container)
    }

    /// Scroll a container's surface so that section `index` sits at the
    /// configured offset
    ///
    /// Returns `None` if the container is not attached or has no such
    /// section.
    pub fn scroll_to_section(
        &self,
        doc: &mut Document,
        container: ElementId,
        index: usize,
    ) -> Option<ScrollMethod> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let binding = inner.containers.get(&container)?;
        let &section = binding.sections.get(index)?;

        let destination = offset_top(doc.tree(), Some(section), None) - binding.options.offset;
        Some(
            inner
                .driver
                .scroll_to(doc, binding.context.target, destination, &binding.options),
        )
    }

    // =========================================================================
    // Marker binding
    // =========================================================================

    /// Bind the activatable elements under `element`
    pub fn attach_markers(
        &self,
        doc: &mut Document,
        element: ElementId,
        patch: &ActivePatch,
    ) -> Result<()> {
        self.bind_markers(doc, element, patch)
    }

    /// Rediscover markers with new options; binds them if not yet bound
    ///
    /// The class is always removed under the name it was added with.
    pub fn update_markers(
        &self,
        doc: &mut Document,
        element: ElementId,
        patch: &ActivePatch,
    ) -> Result<()> {
        self.bind_markers(doc, element, patch)
    }

    fn bind_markers(&self, doc: &mut Document, element: ElementId, patch: &ActivePatch) -> Result<()> {
        if !doc.tree().exists(element) {
            return Err(SpyError::UnknownElement(element));
        }

        let mut inner = self.inner.borrow_mut();
        let options = inner.defaults.active.merged(patch);
        let elements = find_elements(doc, element, options.selector.as_deref());
        let marked = inner
            .marker_sets
            .remove(&element)
            .and_then(|set| set.marked);
        let index = inner.container_index(patch.container);

        let mut set = MarkerSet {
            container: patch.container,
            options,
            elements,
            marked,
        };
        set.recalculate(doc.tree_mut(), index);
        tracing::debug!(
            "ScrollSpy: {} markers under {:?}, active {:?}",
            set.elements.len(),
            element,
            index
        );
        inner.marker_sets.insert(element, set);
        Ok(())
    }

    /// Forget a marker set, clearing its active class
    pub fn detach_markers(&self, doc: &mut Document, element: ElementId) -> Result<()> {
        let mut set = self
            .inner
            .borrow_mut()
            .marker_sets
            .remove(&element)
            .ok_or(SpyError::NotAttached(element))?;
        set.clear(doc.tree_mut());
        Ok(())
    }

    /// Element of a marker set currently carrying the active class
    pub fn marked_element(&self, markers: ElementId) -> Option<ElementId> {
        self.inner
            .borrow()
            .marker_sets
            .get(&markers)
            .and_then(|set| set.marked.as_ref().map(|(element, _)| *element))
    }

    // =========================================================================
    // Link binding
    // =========================================================================

    /// Bind click-to-scroll on the links under `element`
    pub fn attach_links(
        &self,
        doc: &mut Document,
        element: ElementId,
        patch: &LinkPatch,
    ) -> Result<()> {
        self.bind_links(doc, element, patch)
    }

    /// Rediscover links and rebind their click listeners
    pub fn update_links(
        &self,
        doc: &mut Document,
        element: ElementId,
        patch: &LinkPatch,
    ) -> Result<()> {
        self.bind_links(doc, element, patch)
    }

    fn bind_links(&self, doc: &mut Document, element: ElementId, patch: &LinkPatch) -> Result<()> {
        if !doc.tree().exists(element) {
            return Err(SpyError::UnknownElement(element));
        }

        let mut inner = self.inner.borrow_mut();
        if let Some(old) = inner.link_sets.remove(&element) {
            for listener in old.listeners {
                doc.remove_listener(listener);
            }
        }

        let options = inner.defaults.link.merged(patch);
        let elements = find_elements(doc, element, Some(&options.selector));
        let listeners = elements
            .iter()
            .enumerate()
            .map(|(index, &link)| {
                self.add_listener(
                    doc,
                    EventTarget::Element(link),
                    EventType::Click,
                    move |spy: &ScrollSpy, doc: &mut Document, ctx: &EventContext| {
                        ctx.prevent_default();
                        spy.link_clicked(doc, element, index);
                    },
                )
            })
            .collect();

        tracing::debug!(
            "ScrollSpy: bound {} links under {:?}",
            elements.len(),
            element
        );
        inner.link_sets.insert(
            element,
            LinkSet {
                container: patch.container,
                elements,
                listeners,
            },
        );
        Ok(())
    }

    fn link_clicked(&self, doc: &mut Document, links: ElementId, index: usize) {
        let container = {
            let inner = self.inner.borrow();
            inner
                .link_sets
                .get(&links)
                .and_then(|set| set.container)
                .or(inner.last_container)
        };
        let Some(container) = container else {
            tracing::debug!("ScrollSpy: link {} clicked with no container", index);
            return;
        };
        self.scroll_to_section(doc, container, index);
    }

    /// Remove every click listener of a link set
    pub fn detach_links(&self, doc: &mut Document, element: ElementId) -> Result<()> {
        let set = self
            .inner
            .borrow_mut()
            .link_sets
            .remove(&element)
            .ok_or(SpyError::NotAttached(element))?;
        for listener in set.listeners {
            doc.remove_listener(listener);
        }
        Ok(())
    }

    /// Links bound under `element`, in index order
    pub fn links(&self, element: ElementId) -> Vec<ElementId> {
        self.inner
            .borrow()
            .link_sets
            .get(&element)
            .map(|set| set.elements.clone())
            .unwrap_or_default()
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Advance scroll animations by one frame and deliver the resulting
    /// scroll events
    ///
    /// Returns true while animations are still running.
    pub fn tick(&self, doc: &mut Document, dt_ms: f32) -> bool {
        let more = self.inner.borrow_mut().driver.tick(doc, dt_ms);
        doc.flush_events();
        more
    }

    pub fn is_animating(&self) -> bool {
        !self.inner.borrow().driver.is_idle()
    }
}

impl Default for ScrollSpy {
    fn default() -> Self {
        Self::new()
    }
}

/// Direct children of `scope`, or its descendants matching `selector`
///
/// An invalid selector is logged and matches nothing.
fn find_elements(doc: &Document, scope: ElementId, selector: Option<&str>) -> Vec<ElementId> {
    match selector {
        None => doc.tree().children(scope).to_vec(),
        Some(selector) => doc.query_selector_all(scope, selector).unwrap_or_else(|err| {
            tracing::warn!("ScrollSpy: {}, no elements matched", err);
            Vec::new()
        }),
    }
}
