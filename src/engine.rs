//! Layout engine: the full window → nodes → chunks pipeline.
//!
//! The engine owns the document, the resolved annotations, and the caches.
//! Annotations are validated and de-conflicted once at load time; each
//! [`LayoutEngine::layout`] call then only slices the window, restricts the
//! annotations to it, builds nodes, and groups them into chunks. A call for
//! the same window of the same document revision returns the previous
//! output without rebuilding.

use crate::annotation::{Annotation, AnnotationResolver, Diagnostics};
use crate::document::Document;
use crate::error::Result;
use crate::event::{EVENT_LAYOUT_REUSED, LogLevel, emit_event, emit_log};
use crate::layout::{BuildRange, Chunk, ChunkLimits, Node, NodeBuilder, concat_text, group};
use crate::taxonomy::{ColorCache, Taxonomy};
use crate::unicode::{OffsetCache, SliceKey};
use crate::window::{ScrollConfig, Window, WindowConfig, WindowController};

/// Engine configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    pub window: WindowConfig,
    pub chunks: ChunkLimits,
    pub scroll: ScrollConfig,
}

impl LayoutOptions {
    /// Builder-style window setter.
    #[must_use]
    pub const fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Builder-style chunk limit setter.
    #[must_use]
    pub const fn with_chunk_limits(mut self, chunks: ChunkLimits) -> Self {
        self.chunks = chunks;
        self
    }

    /// Builder-style scroll timing setter.
    #[must_use]
    pub const fn with_scroll(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = scroll;
        self
    }

    /// Validate every part.
    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        self.chunks.validate()
    }
}

/// Result of one layout pass.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutOutput {
    /// Document revision the output was built from.
    pub revision: u64,
    pub window: Window,
    pub chunks: Vec<Chunk>,
    /// Problems found while building this window (e.g. overlapping sections).
    pub diagnostics: Diagnostics,
}

impl LayoutOutput {
    /// Top-level nodes in document order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.chunks.iter().flat_map(|chunk| chunk.nodes.iter())
    }

    /// Number of top-level nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.chunks.iter().map(Chunk::len).sum()
    }

    /// Concatenated node text; equals the window's text.
    #[must_use]
    pub fn text(&self) -> String {
        self.chunks
            .iter()
            .map(|chunk| concat_text(&chunk.nodes))
            .collect()
    }
}

/// Windowed layout over one annotated document.
#[derive(Clone, Debug)]
pub struct LayoutEngine {
    options: LayoutOptions,
    document: Document,
    entities: Vec<Annotation>,
    sections: Vec<Annotation>,
    diagnostics: Diagnostics,
    taxonomy: Option<Taxonomy>,
    offsets: OffsetCache,
    colors: ColorCache,
    cached: Option<LayoutOutput>,
}

impl LayoutEngine {
    /// Create an engine over an empty document.
    pub fn new(options: LayoutOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            document: Document::default(),
            entities: Vec::new(),
            sections: Vec::new(),
            diagnostics: Diagnostics::new(),
            taxonomy: None,
            offsets: OffsetCache::new(),
            colors: ColorCache::new(),
            cached: None,
        })
    }

    /// Builder-style taxonomy setter.
    #[must_use]
    pub fn with_taxonomy(mut self, taxonomy: Taxonomy) -> Self {
        self.set_taxonomy(Some(taxonomy));
        self
    }

    /// Replace the taxonomy used to decorate entity nodes.
    pub fn set_taxonomy(&mut self, taxonomy: Option<Taxonomy>) {
        self.taxonomy = taxonomy;
        self.colors.clear();
        self.cached = None;
    }

    /// Replace the text and entity annotations, dropping any sections.
    ///
    /// Returns the diagnostics for annotations discarded during resolution.
    pub fn load(&mut self, text: &str, annotations: &[Annotation]) -> &Diagnostics {
        self.load_with_sections(text, annotations, &[])
    }

    /// Replace the text, entity annotations, and section annotations.
    pub fn load_with_sections(
        &mut self,
        text: &str,
        annotations: &[Annotation],
        sections: &[Annotation],
    ) -> &Diagnostics {
        self.document.set_text(text);
        self.clear_caches();

        let resolver = AnnotationResolver::new().with_document_len(self.document.len_chars());
        let mut diagnostics = Diagnostics::new();
        self.entities = resolver.resolve(annotations, &mut diagnostics);
        self.sections = resolver.resolve(sections, &mut diagnostics);
        emit_log(
            LogLevel::Info,
            &format!(
                "loaded {} code points: {} entities, {} sections, {} discarded",
                self.document.len_chars(),
                self.entities.len(),
                self.sections.len(),
                diagnostics.len()
            ),
        );
        self.diagnostics = diagnostics;
        &self.diagnostics
    }

    /// Drop memoized offset tables, generated colors, and the last output.
    pub fn clear_caches(&mut self) {
        self.offsets.clear();
        self.colors.clear();
        self.cached = None;
    }

    /// Engine configuration.
    #[must_use]
    pub const fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Loaded document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Resolved entity annotations.
    #[must_use]
    pub fn entities(&self) -> &[Annotation] {
        &self.entities
    }

    /// Resolved section annotations.
    #[must_use]
    pub fn sections(&self) -> &[Annotation] {
        &self.sections
    }

    /// Diagnostics from the last load.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Window for `requested_page` over the loaded document.
    #[must_use]
    pub fn window_for(&self, requested_page: usize) -> Window {
        self.options
            .window
            .window_for(requested_page, self.document.len_chars())
    }

    /// Controller driving scroll-based window changes for this document.
    pub fn controller(&self) -> Result<WindowController> {
        WindowController::new(
            self.options.window,
            self.options.scroll,
            self.document.len_chars(),
        )
    }

    /// Lay out the window for `requested_page`.
    pub fn layout(&mut self, requested_page: usize) -> &LayoutOutput {
        let window = self.window_for(requested_page);
        let revision = self.document.revision();
        let output = match self.cached.take() {
            Some(output) if output.revision == revision && output.window == window => {
                emit_event(
                    EVENT_LAYOUT_REUSED,
                    &format!("{}..={}", window.start_page, window.end_page),
                );
                output
            }
            _ => self.run(window),
        };
        self.cached.insert(output)
    }

    fn run(&mut self, window: Window) -> LayoutOutput {
        let revision = self.document.revision();
        let text = self.document.window_text(&window);
        let index = self.offsets.get_or_build(
            SliceKey {
                revision,
                start: window.start_index,
                end: window.end_index,
            },
            &text,
        );
        let entities = Document::annotations_in(&self.entities, &window);

        let mut builder = NodeBuilder::new();
        if let Some(taxonomy) = &self.taxonomy {
            builder = builder.with_taxonomy(taxonomy, &mut self.colors);
        }

        let mut diagnostics = Diagnostics::new();
        let nodes = if self.sections.is_empty() {
            builder.build_indexed(
                &text,
                index,
                &entities,
                BuildRange::at(window.start_index),
                &mut diagnostics,
            )
        } else {
            let sections = Document::annotations_in(&self.sections, &window);
            builder.build_sections_indexed(
                &text,
                index,
                &sections,
                &entities,
                window.start_index,
                &mut diagnostics,
            )
        };
        let chunks = group(nodes, self.options.chunks);

        emit_log(
            LogLevel::Debug,
            &format!(
                "layout pages {}..={}: {} chunks",
                window.start_page,
                window.end_page,
                chunks.len()
            ),
        );

        LayoutOutput {
            revision,
            window,
            chunks,
            diagnostics,
        }
    }
}
