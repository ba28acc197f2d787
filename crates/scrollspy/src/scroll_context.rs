//! Scroll surface selection for a container binding

use scrollspy_dom::{ElementId, ElementTree, EventTarget, ScrollTarget};

/// The surface whose scroll position drives a container binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollContext {
    /// Surface read for metrics and written by scroll commands
    pub target: ScrollTarget,
    /// Ancestor at which section offsets stop accumulating
    pub until: Option<ElementId>,
}

impl ScrollContext {
    pub fn element(container: ElementId) -> Self {
        Self {
            target: ScrollTarget::Element(container),
            until: Some(container),
        }
    }

    pub fn window() -> Self {
        Self {
            target: ScrollTarget::Viewport,
            until: None,
        }
    }

    /// Pick the surface for a container and its discovered sections
    ///
    /// The container scrolls its sections only when it is the offset parent
    /// of the first section; otherwise the window does.
    pub fn detect(tree: &ElementTree, container: ElementId, sections: &[ElementId]) -> Self {
        match sections.first() {
            Some(&first) if tree.offset_parent(first) != Some(container) => Self::window(),
            _ => Self::element(container),
        }
    }

    /// Where scroll listeners for this surface are registered
    pub fn event_target(&self) -> EventTarget {
        self.target.into()
    }

    pub fn is_window(&self) -> bool {
        self.target == ScrollTarget::Viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollspy_dom::Position;

    #[test]
    fn test_positioned_container_scrolls_itself() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let container = tree.element("div").position(Position::Relative).append_to(root);
        let section = tree.element("section").append_to(container);

        let context = ScrollContext::detect(&tree, container, &[section]);
        assert_eq!(context, ScrollContext::element(container));
        assert_eq!(context.event_target(), EventTarget::Element(container));
    }

    #[test]
    fn test_static_container_falls_back_to_window() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let container = tree.element("div").append_to(root);
        let section = tree.element("section").append_to(container);

        let context = ScrollContext::detect(&tree, container, &[section]);
        assert!(context.is_window());
        assert_eq!(context.until, None);
        assert_eq!(context.event_target(), EventTarget::Window);
    }

    #[test]
    fn test_no_sections_keeps_container() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let container = tree.element("div").append_to(root);
        assert!(!ScrollContext::detect(&tree, container, &[]).is_window());
    }
}
