//! Node construction from text and resolved annotations.
//!
//! The builder walks a start-ascending, non-overlapping annotation list and
//! emits a text node for every gap, an entity node for every annotation, and
//! a trailing text node, so the output covers the requested range exactly
//! once. All spans are absolute code-point offsets; `offset` says where the
//! supplied `text` starts in the document.

use crate::annotation::{Annotation, Diagnostic, DiagnosticKind, Diagnostics, Span};
use crate::layout::node::Node;
use crate::taxonomy::{ColorCache, Taxonomy};
use crate::unicode::OffsetIndex;

/// Code-point range to build, relative to the whole document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildRange {
    /// Document offset of the first character of the supplied text.
    pub offset: usize,
    /// Where to start emitting; defaults to `offset`.
    pub cursor: Option<usize>,
    /// Where to stop emitting; defaults to the end of the supplied text.
    pub end: Option<usize>,
}

impl BuildRange {
    /// Build the whole supplied text, which starts at `offset`.
    #[must_use]
    pub const fn at(offset: usize) -> Self {
        Self {
            offset,
            cursor: None,
            end: None,
        }
    }

    /// Restrict output to `[cursor, end)`.
    #[must_use]
    pub const fn between(mut self, cursor: usize, end: usize) -> Self {
        self.cursor = Some(cursor);
        self.end = Some(end);
        self
    }

    fn resolve(&self, text_len: usize) -> Span {
        let text_end = self.offset + text_len;
        let cursor = self.cursor.unwrap_or(self.offset).clamp(self.offset, text_end);
        let end = self.end.unwrap_or(text_end).clamp(cursor, text_end);
        Span::new(cursor, end)
    }
}

/// Builds node sequences, optionally decorating entities from a taxonomy.
#[derive(Debug, Default)]
pub struct NodeBuilder<'a> {
    decorator: Option<(&'a Taxonomy, &'a mut ColorCache)>,
}

impl<'a> NodeBuilder<'a> {
    /// Builder without decoration.
    #[must_use]
    pub fn new() -> Self {
        Self { decorator: None }
    }

    /// Attach a taxonomy and the color cache used for unknown types.
    #[must_use]
    pub fn with_taxonomy(mut self, taxonomy: &'a Taxonomy, colors: &'a mut ColorCache) -> Self {
        self.decorator = Some((taxonomy, colors));
        self
    }

    /// Build a flat node sequence for `text`.
    pub fn build(
        &mut self,
        text: &str,
        annotations: &[Annotation],
        range: BuildRange,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Node> {
        let index = OffsetIndex::new(text);
        self.build_indexed(text, &index, annotations, range, diagnostics)
    }

    /// [`build`](Self::build) with a prebuilt offset index for `text`.
    pub fn build_indexed(
        &mut self,
        text: &str,
        index: &OffsetIndex,
        annotations: &[Annotation],
        range: BuildRange,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Node> {
        let bounds = range.resolve(index.len_chars());
        let mut nodes = Vec::with_capacity(annotations.len() * 2 + 1);
        self.emit_flat(text, index, range.offset, bounds, annotations, diagnostics, &mut nodes);
        nodes
    }

    /// Build a sequence of sections, each holding its own text and entity
    /// nodes.
    ///
    /// `sections` must be sorted and non-overlapping; a section that starts
    /// before the previous one ended is skipped with a diagnostic. Text
    /// outside every section is emitted at the top level (with any entities
    /// it contains), so the output still covers the whole text. Entities
    /// crossing a section edge are clipped to the section.
    pub fn build_sections(
        &mut self,
        text: &str,
        sections: &[Annotation],
        entities: &[Annotation],
        offset: usize,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Node> {
        let index = OffsetIndex::new(text);
        self.build_sections_indexed(text, &index, sections, entities, offset, diagnostics)
    }

    /// [`build_sections`](Self::build_sections) with a prebuilt offset index.
    pub fn build_sections_indexed(
        &mut self,
        text: &str,
        index: &OffsetIndex,
        sections: &[Annotation],
        entities: &[Annotation],
        offset: usize,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Node> {
        let bounds = BuildRange::at(offset).resolve(index.len_chars());
        let mut nodes = Vec::with_capacity(sections.len() * 2 + 1);
        let mut cursor = bounds.start;

        for section in sections {
            if !section.span.is_well_formed() {
                diagnostics.report(Diagnostic::new(DiagnosticKind::InvertedSpan, section));
                continue;
            }
            let Some(clipped) = section.clipped_to(bounds) else {
                let kind = if section.span.is_empty() {
                    DiagnosticKind::EmptySpan
                } else {
                    DiagnosticKind::OutOfBounds
                };
                diagnostics.report(Diagnostic::new(kind, section));
                continue;
            };
            if clipped.start() < cursor {
                diagnostics.report(Diagnostic::new(DiagnosticKind::SectionOverlap, section));
                continue;
            }

            if clipped.start() > cursor {
                let gap = Span::new(cursor, clipped.start());
                let inside = entities_within(entities, gap);
                self.emit_flat(text, index, offset, gap, &inside, diagnostics, &mut nodes);
            }

            let inside = entities_within(entities, clipped.span);
            let mut content = Vec::with_capacity(inside.len() * 2 + 1);
            self.emit_flat(
                text,
                index,
                offset,
                clipped.span,
                &inside,
                diagnostics,
                &mut content,
            );
            let section_text = index.slice(text, clipped.start() - offset, clipped.end() - offset);
            nodes.push(Node::section_node(&clipped, section_text, content));
            cursor = clipped.end();
        }

        if cursor < bounds.end {
            let gap = Span::new(cursor, bounds.end);
            let inside = entities_within(entities, gap);
            self.emit_flat(text, index, offset, gap, &inside, diagnostics, &mut nodes);
        }
        nodes
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_flat(
        &mut self,
        text: &str,
        index: &OffsetIndex,
        offset: usize,
        bounds: Span,
        annotations: &[Annotation],
        diagnostics: &mut Diagnostics,
        out: &mut Vec<Node>,
    ) {
        let slice = |start: usize, end: usize| index.slice(text, start - offset, end - offset);
        let mut cursor = bounds.start;

        for ann in annotations {
            if !ann.span.is_well_formed() {
                diagnostics.report(Diagnostic::new(DiagnosticKind::InvertedSpan, ann));
                continue;
            }
            if ann.span.is_empty() {
                diagnostics.report(Diagnostic::new(DiagnosticKind::EmptySpan, ann));
                continue;
            }
            if ann.start() < cursor || ann.end() > bounds.end {
                diagnostics.report(Diagnostic::new(DiagnosticKind::OutOfBounds, ann));
                continue;
            }

            if ann.start() > cursor {
                out.push(Node::text_node(
                    Span::new(cursor, ann.start()),
                    slice(cursor, ann.start()),
                ));
            }
            let style = self
                .decorator
                .as_mut()
                .map(|(taxonomy, colors)| taxonomy.resolve(&ann.kind, &mut **colors));
            out.push(Node::entity_node(ann, slice(ann.start(), ann.end()), style));
            cursor = ann.end();
        }

        if cursor < bounds.end {
            out.push(Node::text_node(
                Span::new(cursor, bounds.end),
                slice(cursor, bounds.end),
            ));
        }
    }
}

/// Entities intersecting `bounds`, clipped to it.
///
/// `entities` must be start-ascending and non-overlapping, which makes their
/// ends ascending too, so both edges are found by binary search.
#[must_use]
pub fn entities_within(entities: &[Annotation], bounds: Span) -> Vec<Annotation> {
    let lo = entities.partition_point(|e| e.end() <= bounds.start);
    let hi = entities.partition_point(|e| e.start() < bounds.end);
    entities[lo.min(hi)..hi]
        .iter()
        .filter_map(|e| e.clipped_to(bounds))
        .collect()
}

/// Build a flat node sequence without decoration.
///
/// # Examples
///
/// ```
/// use annowindow::annotation::{Annotation, Diagnostics};
/// use annowindow::layout::{build, concat_text};
///
/// let mut diagnostics = Diagnostics::new();
/// let nodes = build("abcdef", &[Annotation::new("x", 1, 3, "X")], 0, &mut diagnostics);
/// assert_eq!(nodes.len(), 3);
/// assert_eq!(nodes[1].text(), "bc");
/// assert_eq!(concat_text(&nodes), "abcdef");
/// ```
pub fn build(
    text: &str,
    annotations: &[Annotation],
    offset: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<Node> {
    NodeBuilder::new().build(text, annotations, BuildRange::at(offset), diagnostics)
}

/// Build a section sequence without decoration.
pub fn build_sections(
    text: &str,
    sections: &[Annotation],
    entities: &[Annotation],
    offset: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<Node> {
    NodeBuilder::new().build_sections(text, sections, entities, offset, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::layout::node::{NodeKind, concat_text};
    use crate::taxonomy::TaxonomyEntry;

    fn ann(id: &str, start: usize, end: usize) -> Annotation {
        Annotation::new(id, start, end, "X")
    }

    fn summary(nodes: &[Node]) -> Vec<(NodeKind, &str, usize, usize)> {
        nodes
            .iter()
            .map(|n| (n.kind(), n.text(), n.span().start, n.span().end))
            .collect()
    }

    #[test]
    fn test_single_entity() {
        let mut diags = Diagnostics::new();
        let nodes = build("abcdef", &[ann("x", 1, 3)], 0, &mut diags);
        assert_eq!(
            summary(&nodes),
            vec![
                (NodeKind::Text, "a", 0, 1),
                (NodeKind::Entity, "bc", 1, 3),
                (NodeKind::Text, "def", 3, 6),
            ]
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_no_empty_text_nodes() {
        let mut diags = Diagnostics::new();
        let nodes = build("abcd", &[ann("a", 0, 2), ann("b", 2, 4)], 0, &mut diags);
        assert_eq!(
            summary(&nodes),
            vec![(NodeKind::Entity, "ab", 0, 2), (NodeKind::Entity, "cd", 2, 4)]
        );
    }

    #[test]
    fn test_empty_text() {
        let mut diags = Diagnostics::new();
        assert!(build("", &[], 0, &mut diags).is_empty());
    }

    #[test]
    fn test_offset_and_multibyte() {
        // Text starts at document offset 10; "😀" is one code point.
        let text = "hé😀 wörld";
        let mut diags = Diagnostics::new();
        let nodes = build(text, &[ann("e", 12, 13), ann("w", 14, 19)], 10, &mut diags);
        assert_eq!(
            summary(&nodes),
            vec![
                (NodeKind::Text, "hé", 10, 12),
                (NodeKind::Entity, "😀", 12, 13),
                (NodeKind::Text, " ", 13, 14),
                (NodeKind::Entity, "wörld", 14, 19),
            ]
        );
        assert_eq!(concat_text(&nodes), text);
    }

    #[test]
    fn test_cursor_and_end() {
        let mut diags = Diagnostics::new();
        let nodes = NodeBuilder::new().build(
            "0123456789",
            &[ann("a", 3, 5)],
            BuildRange::at(0).between(2, 7),
            &mut diags,
        );
        assert_eq!(
            summary(&nodes),
            vec![
                (NodeKind::Text, "2", 2, 3),
                (NodeKind::Entity, "34", 3, 5),
                (NodeKind::Text, "56", 5, 7),
            ]
        );
    }

    #[test]
    fn test_unresolved_input_is_guarded() {
        let mut diags = Diagnostics::new();
        let nodes = build(
            "abcdefgh",
            &[ann("a", 0, 4), ann("overlap", 2, 6), ann("inv", 7, 6), ann("far", 6, 20)],
            0,
            &mut diags,
        );
        assert_eq!(concat_text(&nodes), "abcdefgh");
        assert_eq!(diags.count(DiagnosticKind::OutOfBounds), 2);
        assert_eq!(diags.count(DiagnosticKind::InvertedSpan), 1);
    }

    #[test]
    fn test_decoration() {
        let taxonomy =
            Taxonomy::new().with_entry(TaxonomyEntry::new("PER", "Person").with_color(Rgba::RED));
        let mut colors = ColorCache::new();
        let mut diags = Diagnostics::new();
        let nodes = NodeBuilder::new().with_taxonomy(&taxonomy, &mut colors).build(
            "Ada met Bob",
            &[
                Annotation::new("p1", 0, 3, "PER"),
                Annotation::new("p2", 8, 11, "ORG"),
            ],
            BuildRange::at(0),
            &mut diags,
        );
        let Node::Entity(ada) = &nodes[0] else {
            panic!("expected entity");
        };
        assert_eq!(ada.style.as_ref().unwrap().label, "Person");
        let Node::Entity(bob) = &nodes[2] else {
            panic!("expected entity");
        };
        assert!(bob.style.as_ref().unwrap().fallback);
        assert_eq!(colors.len(), 1);
    }

    #[test]
    fn test_sections() {
        let text = "intro. Chapter one text. Chapter two. outro";
        let sections = vec![
            Annotation::new("s1", 7, 24, "SECTION"),
            Annotation::new("s2", 25, 37, "SECTION"),
        ];
        let entities = vec![ann("e0", 0, 5), ann("e1", 15, 18), ann("e2", 33, 40)];
        let mut diags = Diagnostics::new();
        let nodes = build_sections(text, &sections, &entities, 0, &mut diags);

        assert_eq!(concat_text(&nodes), text);
        let kinds: Vec<NodeKind> = nodes.iter().map(Node::kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Entity,
                NodeKind::Text,
                NodeKind::Section,
                NodeKind::Text,
                NodeKind::Section,
                NodeKind::Entity,
                NodeKind::Text,
            ]
        );

        let first = &nodes[2];
        assert_eq!(first.text(), "Chapter one text.");
        assert_eq!(concat_text(first.content()), first.text());
        assert_eq!(first.content()[1].text(), "one");

        // "e2" crosses the end of "s2" and is split at the edge.
        let second = &nodes[4];
        assert_eq!(second.content().last().unwrap().text(), "two.");
        assert_eq!(nodes[5].text(), " ou");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_overlapping_section_skipped() {
        let mut diags = Diagnostics::new();
        let nodes = build_sections(
            "abcdefghij",
            &[ann("s1", 0, 5), ann("s2", 3, 8), ann("s3", 8, 10)],
            &[],
            0,
            &mut diags,
        );
        assert_eq!(concat_text(&nodes), "abcdefghij");
        assert_eq!(diags.count(DiagnosticKind::SectionOverlap), 1);
        assert_eq!(nodes.iter().filter(|n| n.is_section()).count(), 2);
    }

    #[test]
    fn test_entities_within_clips() {
        let entities = vec![ann("a", 0, 3), ann("b", 4, 8), ann("c", 9, 12)];
        let inside = entities_within(&entities, Span::new(2, 10));
        let spans: Vec<Span> = inside.iter().map(|a| a.span).collect();
        assert_eq!(
            spans,
            vec![Span::new(2, 3), Span::new(4, 8), Span::new(9, 10)]
        );
        assert!(entities_within(&entities, Span::new(3, 4)).is_empty());
    }
}
