//! Offset resolution
//!
//! Cumulative vertical offset of an element relative to one of its offset
//! ancestors, found by walking the offset-parent chain and summing each
//! element's offset from its own offset parent.

use scrollspy_dom::{Document, ElementId, ElementTree};

/// Read-only access to offset-parent geometry
pub trait OffsetGeometry {
    type Id: Copy + PartialEq;

    /// Offset from the element's offset parent (NaN when unknown)
    fn offset_top(&self, id: Self::Id) -> f32;

    fn offset_height(&self, id: Self::Id) -> f32;

    fn offset_parent(&self, id: Self::Id) -> Option<Self::Id>;
}

impl OffsetGeometry for ElementTree {
    type Id = ElementId;

    fn offset_top(&self, id: ElementId) -> f32 {
        self.geometry(id).map(|g| g.offset_top).unwrap_or(f32::NAN)
    }

    fn offset_height(&self, id: ElementId) -> f32 {
        self.geometry(id).map(|g| g.offset_height).unwrap_or(0.0)
    }

    fn offset_parent(&self, id: ElementId) -> Option<ElementId> {
        ElementTree::offset_parent(self, id)
    }
}

impl OffsetGeometry for Document {
    type Id = ElementId;

    fn offset_top(&self, id: ElementId) -> f32 {
        OffsetGeometry::offset_top(self.tree(), id)
    }

    fn offset_height(&self, id: ElementId) -> f32 {
        OffsetGeometry::offset_height(self.tree(), id)
    }

    fn offset_parent(&self, id: ElementId) -> Option<ElementId> {
        self.tree().offset_parent(id)
    }
}

/// Vertical offset of `element` relative to `until`
///
/// The starting element always contributes its own offset. The walk stops
/// when the chain ends or when it reaches `until`, whose offset is not
/// added. If `until` is not on the chain (or is the element itself) the
/// whole chain is summed. NaN offsets count as 0.
pub fn offset_top<G>(geometry: &G, element: Option<G::Id>, until: Option<G::Id>) -> f32
where
    G: OffsetGeometry + ?Sized,
{
    let Some(mut current) = element else {
        return 0.0;
    };

    let mut total = 0.0;
    loop {
        let top = geometry.offset_top(current);
        if !top.is_nan() {
            total += top;
        }
        let Some(parent) = geometry.offset_parent(current) else {
            break;
        };
        current = parent;
        if until == Some(current) {
            break;
        }
    }
    total
}
