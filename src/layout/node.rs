//! Renderable node types.

use crate::annotation::{Annotation, Span};
use crate::taxonomy::EntityStyle;

/// Literal text with no annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct TextNode {
    pub key: String,
    pub span: Span,
    pub text: String,
}

/// Text covered by exactly one surviving annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityNode {
    pub key: String,
    pub span: Span,
    pub text: String,
    pub annotation: Annotation,
    /// Taxonomy decoration, when the builder was given a taxonomy.
    pub style: Option<EntityStyle>,
}

/// A region holding its own sequence of text and entity nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionNode {
    pub key: String,
    pub span: Span,
    pub text: String,
    pub annotation: Annotation,
    pub content: Vec<Node>,
}

/// Discriminant of [`Node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    Entity,
    Section,
}

impl NodeKind {
    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Entity => "entity",
            Self::Section => "section",
        }
    }
}

/// A unit of renderable content.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Text(TextNode),
    Entity(EntityNode),
    Section(SectionNode),
}

impl Node {
    pub(crate) fn text_node(span: Span, text: &str) -> Self {
        Self::Text(TextNode {
            key: format!("text-{}-{}", span.start, span.end),
            span,
            text: text.to_string(),
        })
    }

    pub(crate) fn entity_node(
        annotation: &Annotation,
        text: &str,
        style: Option<EntityStyle>,
    ) -> Self {
        Self::Entity(EntityNode {
            key: format!("entity-{}-{}", annotation.id, annotation.start()),
            span: annotation.span,
            text: text.to_string(),
            annotation: annotation.clone(),
            style,
        })
    }

    pub(crate) fn section_node(annotation: &Annotation, text: &str, content: Vec<Self>) -> Self {
        Self::Section(SectionNode {
            key: format!("section-{}", annotation.id),
            span: annotation.span,
            text: text.to_string(),
            annotation: annotation.clone(),
            content,
        })
    }

    /// Stable render key.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Text(n) => &n.key,
            Self::Entity(n) => &n.key,
            Self::Section(n) => &n.key,
        }
    }

    /// Covered code-point range.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Text(n) => n.span,
            Self::Entity(n) => n.span,
            Self::Section(n) => n.span,
        }
    }

    /// Covered text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(n) => &n.text,
            Self::Entity(n) => &n.text,
            Self::Section(n) => &n.text,
        }
    }

    /// Node discriminant.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Text(_) => NodeKind::Text,
            Self::Entity(_) => NodeKind::Entity,
            Self::Section(_) => NodeKind::Section,
        }
    }

    /// Check if this is a section.
    #[must_use]
    pub const fn is_section(&self) -> bool {
        matches!(self, Self::Section(_))
    }

    /// The annotation behind an entity or section.
    #[must_use]
    pub fn annotation(&self) -> Option<&Annotation> {
        match self {
            Self::Text(_) => None,
            Self::Entity(n) => Some(&n.annotation),
            Self::Section(n) => Some(&n.annotation),
        }
    }

    /// Nested nodes of a section; empty for other kinds.
    #[must_use]
    pub fn content(&self) -> &[Self] {
        match self {
            Self::Section(n) => &n.content,
            _ => &[],
        }
    }
}

/// Depth-first pre-order walk over nodes and their section content.
///
/// Uses an explicit stack, so nesting depth does not grow the call stack.
pub fn walk(nodes: &[Node]) -> impl Iterator<Item = &Node> {
    let mut stack: Vec<&Node> = nodes.iter().rev().collect();
    std::iter::from_fn(move || {
        let node = stack.pop()?;
        stack.extend(node.content().iter().rev());
        Some(node)
    })
}

/// Leaf (text and entity) nodes in document order.
pub fn leaves(nodes: &[Node]) -> impl Iterator<Item = &Node> {
    walk(nodes).filter(|node| !node.is_section())
}

/// Concatenate the text of a top-level node sequence.
#[must_use]
pub fn concat_text(nodes: &[Node]) -> String {
    let mut out = String::with_capacity(nodes.iter().map(|n| n.text().len()).sum());
    for node in nodes {
        out.push_str(node.text());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Node> {
        let section = Annotation::new("s1", 2, 6, "SECTION");
        let entity = Annotation::new("e1", 3, 5, "PER");
        let content = vec![
            Node::text_node(Span::new(2, 3), "c"),
            Node::entity_node(&entity, "de", None),
            Node::text_node(Span::new(5, 6), "f"),
        ];
        vec![
            Node::text_node(Span::new(0, 2), "ab"),
            Node::section_node(&section, "cdef", content),
        ]
    }

    #[test]
    fn test_accessors() {
        let nodes = sample();
        assert_eq!(nodes[0].kind(), NodeKind::Text);
        assert_eq!(nodes[0].key(), "text-0-2");
        assert!(nodes[0].annotation().is_none());
        assert!(nodes[1].is_section());
        assert_eq!(nodes[1].key(), "section-s1");
        assert_eq!(nodes[1].content().len(), 3);
        assert_eq!(nodes[1].content()[1].key(), "entity-e1-3");
    }

    #[test]
    fn test_walk_order() {
        let nodes = sample();
        let keys: Vec<&str> = walk(&nodes).map(Node::key).collect();
        assert_eq!(
            keys,
            vec!["text-0-2", "section-s1", "text-2-3", "entity-e1-3", "text-5-6"]
        );
        let leaf_text: String = leaves(&nodes).map(Node::text).collect();
        assert_eq!(leaf_text, "abcdef");
    }

    #[test]
    fn test_concat_text() {
        assert_eq!(concat_text(&sample()), "abcdef");
        assert_eq!(concat_text(&[]), "");
    }
}
