//! Scrollspy element tree
//!
//! A retained, DOM-like element tree for hosting scroll-spy behaviors:
//!
//! - `ElementTree` - elements with classes, attributes and pre-computed
//!   offset geometry (offset parents, offset top/height, scroll extents)
//! - `Selector` - CSS selector subset for element discovery
//! - `HandlerRegistry` - scroll/click listeners keyed by event target
//! - `Document` - tree + listeners + window viewport + queued events
//!
//! # Example
//!
//! ```rust
//! use scrollspy_dom::{Document, Position};
//!
//! let mut doc = Document::new();
//! let body = doc.tree().root();
//! let container = doc
//!     .tree_mut()
//!     .element("div")
//!     .position(Position::Relative)
//!     .append_to(body);
//! let section = doc
//!     .tree_mut()
//!     .element("section")
//!     .class("chapter")
//!     .offset_top(300.0)
//!     .append_to(container);
//!
//! assert_eq!(doc.tree().offset_parent(section), Some(container));
//! assert_eq!(doc.query_selector_all(container, ".chapter").unwrap(), vec![section]);
//! ```

pub mod document;
pub mod error;
pub mod event;
pub mod selector;
pub mod tree;

pub use document::{Document, PendingScroll, ScrollMetrics, ScrollTarget, Viewport};
pub use error::{DomError, Result};
pub use event::{EventCallback, EventContext, EventTarget, EventType, HandlerRegistry, ListenerId};
pub use selector::Selector;
pub use tree::{ElementBuilder, ElementId, ElementNode, ElementTree, Geometry, Position};
