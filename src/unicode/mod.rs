//! Unicode utilities for offset translation and paragraph detection.

mod offset;
mod paragraph;

pub use offset::{
    DEFAULT_CHECKPOINT_STRIDE, OffsetCache, OffsetIndex, SliceKey, to_external_index,
    to_internal_index, to_utf16_index,
};
pub use paragraph::{PARAGRAPH_SEPARATOR, ends_with_paragraph_break};
