//! Active-section resolution
//!
//! Maps a scroll position onto the index of the active section. A section
//! is active once its top (less the configured offset) has scrolled to or
//! above the top of the scroll surface. Reaching the end of the surface
//! (within [`END_SLACK`]) activates the last section.

use scrollspy_dom::ScrollMetrics;

use crate::offset::{offset_top, OffsetGeometry};
use crate::options::Options;

/// Distance from the end of the scroll surface treated as "at the end"
pub const END_SLACK: f32 = 10.0;

/// Resolve the active section index
///
/// `until` is the scroll container when it is the sections' offset parent,
/// `None` when the window is the scroll surface.
pub fn resolve<G>(
    metrics: &ScrollMetrics,
    sections: &[G::Id],
    geometry: &G,
    until: Option<G::Id>,
    options: &Options,
) -> Option<usize>
where
    G: OffsetGeometry + ?Sized,
{
    let len = sections.len() as isize;

    let at_end = metrics.viewport_extent + metrics.scroll_top >= metrics.scroll_extent - END_SLACK;
    let raw = if at_end {
        len
    } else {
        sections
            .iter()
            .position(|&section| {
                offset_top(geometry, Some(section), until) - options.offset > metrics.scroll_top
            })
            .map_or(len, |i| i as isize)
    };

    let index = raw - 1;
    if index < 0 {
        return if options.allow_no_active_section {
            None
        } else {
            Some(0)
        };
    }

    let index = index as usize;
    if options.allow_no_active_section && index + 1 >= sections.len() {
        // Past the bottom edge of the last section
        let last = sections[index];
        let bottom = offset_top(geometry, Some(last), None) + geometry.offset_height(last);
        if bottom < metrics.scroll_top {
            return None;
        }
    }
    Some(index)
}

/// Last published index of a container binding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineState {
    current_index: Option<usize>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Forget the published index
    pub fn reset(&mut self) {
        self.current_index = None;
    }

    /// Commit a resolved index; returns true if listeners must be notified
    ///
    /// A changed index is always published. Without `allow_none`, index 0 is
    /// re-announced on every pass.
    pub fn publish(&mut self, resolved: Option<usize>, allow_none: bool) -> bool {
        if (!allow_none && resolved == Some(0)) || resolved != self.current_index {
            self.current_index = resolved;
            true
        } else {
            false
        }
    }
}
