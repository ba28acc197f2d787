//! CSS selector subset
//!
//! Enough of the selector grammar to discover sections, markers and links:
//!
//! - Type and universal selectors: `section`, `*`
//! - ID, class and attribute selectors: `#intro`, `.chapter`, `[href]`,
//!   `[data-spy="nav"]`
//! - Compound selectors: `a.nav-link[href]`
//! - Descendant and child combinators: `nav a`, `ul > li`
//! - Selector lists: `h2, h3`
//!
//! Matching follows `querySelectorAll` semantics: combinators may match
//! ancestors outside the queried scope, but only descendants of the scope
//! are returned.

use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt, value},
    error::{Error as NomError, ErrorKind},
    multi::{many0, separated_list1},
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::error::{DomError, Result};
use crate::tree::{ElementId, ElementNode, ElementTree};

type ParseResult<'a, O> = IResult<&'a str, O>;

/// Relationship between two compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SubclassSelector {
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
}

/// Type/universal selector followed by any number of id/class/attribute tests
#[derive(Debug, Clone, PartialEq, Eq)]
struct CompoundSelector {
    /// `None` matches any tag
    tag: Option<String>,
    subclasses: Vec<SubclassSelector>,
}

impl CompoundSelector {
    fn matches(&self, node: &ElementNode) -> bool {
        if let Some(tag) = &self.tag {
            if !node.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.subclasses.iter().all(|sub| match sub {
            SubclassSelector::Id(id) => node.id_attr() == Some(id.as_str()),
            SubclassSelector::Class(class) => node.has_class(class),
            SubclassSelector::Attribute { name, value } => match (node.attribute(name), value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            },
        })
    }
}

/// Compound selectors joined by combinators, stored left to right
///
/// Each entry carries the combinator that links it to the previous entry;
/// the first entry's combinator is unused.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
    parts: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    fn matches(&self, tree: &ElementTree, element: ElementId) -> bool {
        self.matches_at(tree, element, self.parts.len() - 1)
    }

    fn matches_at(&self, tree: &ElementTree, element: ElementId, index: usize) -> bool {
        let (combinator, compound) = &self.parts[index];
        let Some(node) = tree.get(element) else {
            return false;
        };
        if !compound.matches(node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => tree
                .parent(element)
                .is_some_and(|parent| self.matches_at(tree, parent, index - 1)),
            Combinator::Descendant => tree
                .ancestors(element)
                .any(|ancestor| self.matches_at(tree, ancestor, index - 1)),
        }
    }
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<ComplexSelector>,
}

impl Selector {
    /// Parse selector text
    pub fn parse(text: &str) -> Result<Self> {
        let leading = text.len() - text.trim_start().len();
        let trimmed = text.trim();

        match all_consuming(selector_list)(trimmed) {
            Ok((_, alternatives)) => Ok(Self {
                source: trimmed.to_string(),
                alternatives,
            }),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let column = leading + trimmed.len() - e.input.len() + 1;
                tracing::debug!("Selector parse failed for '{}' at column {}", text, column);
                Err(DomError::InvalidSelector {
                    selector: text.to_string(),
                    column,
                })
            }
            Err(nom::Err::Incomplete(_)) => Err(DomError::InvalidSelector {
                selector: text.to_string(),
                column: leading + 1,
            }),
        }
    }

    /// The normalized source text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check whether an element matches any alternative of this selector
    pub fn matches(&self, tree: &ElementTree, element: ElementId) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(tree, element))
    }

    /// All descendants of `scope` matching this selector, in document order
    pub fn query_all(&self, tree: &ElementTree, scope: ElementId) -> Vec<ElementId> {
        tree.descendants(scope)
            .into_iter()
            .filter(|&el| self.matches(tree, el))
            .collect()
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

// ============================================================================
// Grammar
// ============================================================================

/// Parse an identifier (alphanumeric, hyphen, underscore)
fn identifier(input: &str) -> ParseResult<&str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_')(input)
}

/// Quoted or bare attribute value
fn attribute_value(input: &str) -> ParseResult<&str> {
    alt((
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        identifier,
    ))(input)
}

/// `[name]` or `[name=value]`
fn attribute(input: &str) -> ParseResult<SubclassSelector> {
    let (input, (_, _, name, _, value, _, _)) = tuple((
        char('['),
        multispace0,
        identifier,
        multispace0,
        opt(preceded(
            tuple((char('='), multispace0)),
            attribute_value,
        )),
        multispace0,
        char(']'),
    ))(input)?;

    Ok((
        input,
        SubclassSelector::Attribute {
            name: name.to_string(),
            value: value.map(str::to_string),
        },
    ))
}

fn subclass(input: &str) -> ParseResult<SubclassSelector> {
    alt((
        map(preceded(char('#'), identifier), |id| {
            SubclassSelector::Id(id.to_string())
        }),
        map(preceded(char('.'), identifier), |class| {
            SubclassSelector::Class(class.to_string())
        }),
        attribute,
    ))(input)
}

fn compound(input: &str) -> ParseResult<CompoundSelector> {
    let (rest, head) = opt(alt((
        value(None, char('*')),
        map(identifier, Some),
    )))(input)?;
    let (rest, subclasses) = many0(subclass)(rest)?;

    if head.is_none() && subclasses.is_empty() {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::Verify)));
    }

    Ok((
        rest,
        CompoundSelector {
            tag: head.flatten().map(str::to_ascii_lowercase),
            subclasses,
        },
    ))
}

fn complex(input: &str) -> ParseResult<ComplexSelector> {
    let (mut input, first) = compound(input)?;
    let mut parts = vec![(Combinator::Descendant, first)];

    loop {
        if let Ok((rest, next)) =
            preceded(delimited(multispace0, char('>'), multispace0), compound)(input)
        {
            parts.push((Combinator::Child, next));
            input = rest;
            continue;
        }
        // Whitespace before a comma or the end is not a combinator
        if let Ok((rest, next)) = preceded(multispace1, compound)(input) {
            parts.push((Combinator::Descendant, next));
            input = rest;
            continue;
        }
        break;
    }

    Ok((input, ComplexSelector { parts }))
}

fn selector_list(input: &str) -> ParseResult<Vec<ComplexSelector>> {
    separated_list1(delimited(multispace0, char(','), multispace0), complex)(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Position;

    struct Fixture {
        tree: ElementTree,
        nav: ElementId,
        list: ElementId,
        links: Vec<ElementId>,
        footer_link: ElementId,
    }

    fn fixture() -> Fixture {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let nav = tree
            .element("nav")
            .id("toc")
            .position(Position::Relative)
            .append_to(root);
        let list = tree.element("ul").append_to(nav);
        let mut links = Vec::new();
        for (i, href) in ["#one", "#two", "#three"].iter().enumerate() {
            let item = tree.element("li").append_to(list);
            let link = tree
                .element("a")
                .class("nav-link")
                .attr("href", href)
                .attr("data-index", &i.to_string())
                .append_to(item);
            links.push(link);
        }
        let footer = tree.element("footer").append_to(root);
        let footer_link = tree.element("a").attr("href", "/about").append_to(footer);

        Fixture {
            tree,
            nav,
            list,
            links,
            footer_link,
        }
    }

    #[test]
    fn test_type_selector_scoped() {
        let f = fixture();
        let selector = Selector::parse("a").unwrap();
        assert_eq!(selector.query_all(&f.tree, f.nav), f.links);

        let everywhere = selector.query_all(&f.tree, f.tree.root());
        assert_eq!(everywhere.len(), 4);
        assert_eq!(everywhere[3], f.footer_link);
    }

    #[test]
    fn test_compound_selector() {
        let f = fixture();
        let selector = Selector::parse("a.nav-link[href='#two']").unwrap();
        assert_eq!(selector.query_all(&f.tree, f.tree.root()), vec![f.links[1]]);
    }

    #[test]
    fn test_attribute_presence_and_value() {
        let f = fixture();
        let present = Selector::parse("[data-index]").unwrap();
        assert_eq!(present.query_all(&f.tree, f.tree.root()), f.links);

        let exact = Selector::parse("[data-index=\"2\"]").unwrap();
        assert_eq!(exact.query_all(&f.tree, f.tree.root()), vec![f.links[2]]);
    }

    #[test]
    fn test_descendant_and_child_combinators() {
        let f = fixture();
        let descendant = Selector::parse("#toc a").unwrap();
        assert_eq!(descendant.query_all(&f.tree, f.tree.root()), f.links);

        let child = Selector::parse("ul > li > a").unwrap();
        assert_eq!(child.query_all(&f.tree, f.tree.root()), f.links);

        let wrong_depth = Selector::parse("ul > a").unwrap();
        assert!(wrong_depth.query_all(&f.tree, f.tree.root()).is_empty());
    }

    #[test]
    fn test_ancestor_outside_scope_matches() {
        let f = fixture();
        let selector = Selector::parse("nav li").unwrap();
        assert_eq!(selector.query_all(&f.tree, f.list).len(), 3);
    }

    #[test]
    fn test_selector_list_keeps_document_order() {
        let f = fixture();
        let selector = Selector::parse("footer a ,  ul").unwrap();
        assert_eq!(
            selector.query_all(&f.tree, f.tree.root()),
            vec![f.list, f.footer_link]
        );
    }

    #[test]
    fn test_universal_and_case() {
        let f = fixture();
        assert_eq!(
            Selector::parse("*").unwrap().query_all(&f.tree, f.nav).len(),
            7
        );
        assert_eq!(
            Selector::parse("UL").unwrap().query_all(&f.tree, f.tree.root()),
            vec![f.list]
        );
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(matches!(
            Selector::parse("a >"),
            Err(DomError::InvalidSelector { column: 2, .. })
        ));
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("a,").is_err());
        assert!(Selector::parse("[href").is_err());
        assert!(Selector::parse(".").is_err());
    }

    #[test]
    fn test_display_and_from_str() {
        let selector: Selector = "  nav a ".parse().unwrap();
        assert_eq!(selector.to_string(), "nav a");
    }
}
