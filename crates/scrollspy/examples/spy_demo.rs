//! Scroll-Spy Demo
//!
//! Builds a small page with a scrollable article and a table of contents,
//! binds the spy to both, then clicks through the contents while driving
//! animation frames at 60fps.
//!
//! Features demonstrated:
//! - Options loaded from a TOML document
//! - Active class following the scroll position
//! - Click-to-scroll links with an eased tween
//!
//! Run with: RUST_LOG=scrollspy=debug cargo run -p scrollspy --example spy_demo

use anyhow::{Context, Result};
use scrollspy::{ActivePatch, LinkPatch, OptionsPatch, ScrollSpy};
use scrollspy_dom::{Document, ElementId, Position, ScrollTarget};
use tracing_subscriber::EnvFilter;

const OPTIONS: &str = r#"
offset = 20
time = 400
easing = "cubic-in-out"
"#;

const FRAME_MS: f32 = 1000.0 / 60.0;

const CHAPTERS: [(&str, f32); 4] = [
    ("Introduction", 400.0),
    ("Installation", 650.0),
    ("Usage", 900.0),
    ("Reference", 500.0),
];

struct Page {
    doc: Document,
    article: ElementId,
    toc: ElementId,
    links: Vec<ElementId>,
}

fn build_page() -> Page {
    let mut doc = Document::new();
    doc.set_viewport_height(800.0);
    let body = doc.tree().root();

    let total: f32 = CHAPTERS.iter().map(|(_, height)| height).sum();
    let article = doc
        .tree_mut()
        .element("article")
        .position(Position::Relative)
        .height(600.0)
        .scroll_height(total)
        .append_to(body);

    let toc = doc.tree_mut().element("ul").class("toc").append_to(body);
    let mut links = Vec::new();
    let mut top = 0.0;
    for (i, (title, height)) in CHAPTERS.iter().enumerate() {
        doc.tree_mut()
            .element("section")
            .id(&format!("chapter-{}", i))
            .offset_top(top)
            .height(*height)
            .append_to(article);
        top += height;

        let item = doc.tree_mut().element("li").append_to(toc);
        let link = doc
            .tree_mut()
            .element("a")
            .attr("href", &format!("#chapter-{}", i))
            .attr("title", title)
            .append_to(item);
        links.push(link);
    }

    Page {
        doc,
        article,
        toc,
        links,
    }
}

fn active_item(page: &Page) -> Option<usize> {
    page.doc
        .tree()
        .children(page.toc)
        .iter()
        .position(|&item| page.doc.tree().has_class(item, "active"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scrollspy=info")),
        )
        .init();

    let mut page = build_page();
    let spy = ScrollSpy::new();

    let patch = OptionsPatch::from_toml(OPTIONS)
        .context("Failed to parse scroll-spy options")?
        .on_index_changed(|index| tracing::info!("Active chapter: {:?}", index));

    spy.attach_container(&mut page.doc, page.article, &patch)
        .context("Failed to bind article")?;
    spy.attach_markers(&mut page.doc, page.toc, &ActivePatch::new())
        .context("Failed to bind table of contents")?;
    spy.attach_links(&mut page.doc, page.toc, &LinkPatch::new())
        .context("Failed to bind links")?;

    for &i in &[2usize, 0, 3, 1] {
        let link = page.links[i];
        let title = page.doc.tree().attribute(link, "title").unwrap_or("?").to_string();
        tracing::info!("Clicking '{}'", title);
        page.doc.click(link);

        let mut frames = 0;
        while spy.tick(&mut page.doc, FRAME_MS) {
            frames += 1;
        }

        tracing::info!(
            "Settled after {} frames at {:.1}, highlighted item {:?}",
            frames + 1,
            page.doc.scroll_top(ScrollTarget::Element(page.article)),
            active_item(&page)
        );
    }

    Ok(())
}
