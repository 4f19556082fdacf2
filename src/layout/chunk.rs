//! Grouping of node sequences into bounded render chunks.
//!
//! Chunks are the unit of incremental rendering and measurement. A chunk is
//! closed after a section (sections are never merged with siblings), after
//! a text node ending in a paragraph break, or once it reaches the node or
//! text-length limit. Concatenating all chunks gives back the input nodes.

use crate::annotation::Span;
use crate::error::{Error, Result};
use crate::layout::node::Node;
use crate::unicode::ends_with_paragraph_break;
use bitflags::bitflags;

bitflags! {
    /// Why a chunk was closed.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ChunkBoundary: u8 {
        /// The chunk is a section, or the next node is one.
        const SECTION = 0b0000_0001;
        /// The node count reached `max_nodes`.
        const NODE_LIMIT = 0b0000_0010;
        /// The text length reached `max_text_len`.
        const TEXT_LIMIT = 0b0000_0100;
        /// The last node is text ending in a paragraph break.
        const PARAGRAPH = 0b0000_1000;
        /// The input ran out.
        const END = 0b0001_0000;
    }
}

/// Size limits for a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkLimits {
    /// Maximum number of top-level nodes in a chunk.
    pub max_nodes: usize,
    /// Text length (code points) at which a chunk is closed.
    ///
    /// A single node longer than this still forms one chunk.
    pub max_text_len: usize,
}

impl Default for ChunkLimits {
    fn default() -> Self {
        Self {
            max_nodes: 50,
            max_text_len: 2_000,
        }
    }
}

impl ChunkLimits {
    /// Create limits.
    #[must_use]
    pub const fn new(max_nodes: usize, max_text_len: usize) -> Self {
        Self {
            max_nodes,
            max_text_len,
        }
    }

    /// Reject zero limits.
    pub fn validate(&self) -> Result<()> {
        if self.max_nodes == 0 {
            return Err(Error::InvalidConfig {
                field: "max_nodes",
                reason: "must be greater than zero",
            });
        }
        if self.max_text_len == 0 {
            return Err(Error::InvalidConfig {
                field: "max_text_len",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}

/// A bounded run of consecutive nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    /// Position in the chunk sequence.
    pub index: usize,
    pub nodes: Vec<Node>,
    /// Sum of node lengths in code points.
    pub text_len: usize,
    pub boundary: ChunkBoundary,
}

impl Chunk {
    /// Render key, derived from the first node.
    #[must_use]
    pub fn key(&self) -> String {
        self.nodes
            .first()
            .map_or_else(|| format!("chunk-{}", self.index), |n| format!("chunk-{}", n.key()))
    }

    /// Code-point range covered by the chunk.
    #[must_use]
    pub fn span(&self) -> Span {
        match (self.nodes.first(), self.nodes.last()) {
            (Some(first), Some(last)) => Span::new(first.span().start, last.span().end),
            _ => Span::default(),
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

struct ChunkAccumulator {
    limits: ChunkLimits,
    chunks: Vec<Chunk>,
    nodes: Vec<Node>,
    text_len: usize,
}

impl ChunkAccumulator {
    fn new(limits: ChunkLimits) -> Self {
        Self {
            limits: ChunkLimits {
                max_nodes: limits.max_nodes.max(1),
                max_text_len: limits.max_text_len.max(1),
            },
            chunks: Vec::new(),
            nodes: Vec::new(),
            text_len: 0,
        }
    }

    fn close(&mut self, boundary: ChunkBoundary) {
        if self.nodes.is_empty() {
            return;
        }
        self.chunks.push(Chunk {
            index: self.chunks.len(),
            nodes: std::mem::take(&mut self.nodes),
            text_len: std::mem::take(&mut self.text_len),
            boundary,
        });
    }

    fn push(&mut self, node: Node) {
        if node.is_section() {
            self.close(ChunkBoundary::SECTION);
            self.text_len = node.span().len();
            self.nodes.push(node);
            self.close(ChunkBoundary::SECTION);
            return;
        }

        let paragraph = matches!(&node, Node::Text(t) if ends_with_paragraph_break(&t.text));
        self.text_len += node.span().len();
        self.nodes.push(node);

        let mut boundary = ChunkBoundary::empty();
        if self.nodes.len() >= self.limits.max_nodes {
            boundary |= ChunkBoundary::NODE_LIMIT;
        }
        if self.text_len >= self.limits.max_text_len {
            boundary |= ChunkBoundary::TEXT_LIMIT;
        }
        if paragraph {
            boundary |= ChunkBoundary::PARAGRAPH;
        }
        if !boundary.is_empty() {
            self.close(boundary);
        }
    }

    fn finish(mut self) -> Vec<Chunk> {
        self.close(ChunkBoundary::END);
        self.chunks
    }
}

/// Partition `nodes` into chunks.
///
/// Zero limits are treated as one.
#[must_use]
pub fn group(nodes: Vec<Node>, limits: ChunkLimits) -> Vec<Chunk> {
    let mut acc = ChunkAccumulator::new(limits);
    for node in nodes {
        acc.push(node);
    }
    acc.finish()
}
