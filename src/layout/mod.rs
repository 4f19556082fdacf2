//! Node construction and render chunking.
//!
//! Key types:
//!
//! - [`Node`]: text, entity, or section node covering a code-point span
//! - [`NodeBuilder`]: turns text plus resolved annotations into nodes
//! - [`Chunk`]: bounded group of nodes for incremental rendering
//!
//! For any node sequence the builder produces, node spans are contiguous and
//! concatenating node texts reproduces the covered text exactly.

mod builder;
mod chunk;
mod node;

pub use builder::{BuildRange, NodeBuilder, build, build_sections, entities_within};
pub use chunk::{Chunk, ChunkBoundary, ChunkLimits, group};
pub use node::{
    EntityNode, Node, NodeKind, SectionNode, TextNode, concat_text, leaves, walk,
};
