//! Scroll-spy behaviors
//!
//! Tracks which section of a scrollable container is currently active and
//! keeps navigation in sync with it:
//!
//! - **Offset resolution** (`offset`): cumulative offsets along the
//!   offset-parent chain
//! - **Active-section engine** (`engine`): scroll position to active index,
//!   published only when it changes
//! - **Coordinator** (`coordinator`): container, marker and link bindings
//! - **Scroll driver** (`scroll_to`): eased, stepped or native scrolling to a
//!   section
//!
//! Everything runs on the UI thread. Scroll events are delivered by
//! [`scrollspy_dom::Document::flush_events`] and animation frames by
//! [`ScrollSpy::tick`].

pub mod coordinator;
pub mod engine;
pub mod error;
pub mod offset;
pub mod options;
pub mod scroll_context;
pub mod scroll_to;

pub use coordinator::{Behavior, ScrollSpy};
pub use engine::{resolve, EngineState, END_SLACK};
pub use error::{Result, SpyError};
pub use offset::{offset_top, OffsetGeometry};
pub use options::{
    ActiveOptions, ActivePatch, IndexChangedCallback, LinkOptions, LinkPatch, Options,
    OptionsPatch,
};
pub use scroll_context::ScrollContext;
pub use scroll_to::{is_legacy_engine, ScrollDriver, ScrollMethod};

pub use scrollspy_animation::Easing;
