//! Annotation type → display label and color.
//!
//! The taxonomy only decorates entity nodes; it never changes layout. Types
//! missing from the taxonomy resolve to a fallback style whose color is
//! generated from the type name, so the same type always gets the same color.

use crate::color::Rgba;
use crate::error::Result;
use std::collections::HashMap;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// One taxonomy node.
#[derive(Clone, Debug, PartialEq)]
pub struct TaxonomyEntry {
    pub key: String,
    pub label: String,
    /// Own color; entries without one inherit from the nearest ancestor.
    pub color: Option<Rgba>,
    pub parent: Option<String>,
}

impl TaxonomyEntry {
    /// Create an entry with no color and no parent.
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            color: None,
            parent: None,
        }
    }

    /// Builder-style color setter.
    #[must_use]
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    /// Builder-style color setter from a hex string.
    pub fn with_hex(self, hex: &str) -> Result<Self> {
        Ok(self.with_color(Rgba::parse_hex(hex)?))
    }

    /// Builder-style parent setter.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Rendering decoration for an entity node.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityStyle {
    pub label: String,
    pub color: Rgba,
    /// Readable text color on top of `color`.
    pub text_color: Rgba,
    /// True when the type was not found and the style was generated.
    pub fallback: bool,
}

impl EntityStyle {
    fn new(label: String, color: Rgba, fallback: bool) -> Self {
        Self {
            label,
            color,
            text_color: color.contrast_text(),
            fallback,
        }
    }
}

/// Deterministic color for a type name (FNV-1a hash → hue).
#[must_use]
pub fn generated_color(kind: &str) -> Rgba {
    let hash = kind.bytes().fold(FNV_OFFSET, |acc, byte| {
        (acc ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    });
    let hue = (hash % 360) as f32;
    let saturation = 0.45 + ((hash >> 16) % 20) as f32 / 100.0;
    Rgba::from_hsv(hue, saturation, 0.85)
}

/// Caller-owned memo of generated fallback colors.
#[derive(Clone, Debug, Default)]
pub struct ColorCache {
    colors: HashMap<String, Rgba>,
}

impl ColorCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generated color for `kind`, memoized.
    pub fn color_for(&mut self, kind: &str) -> Rgba {
        if let Some(color) = self.colors.get(kind) {
            return *color;
        }
        let color = generated_color(kind);
        self.colors.insert(kind.to_string(), color);
        color
    }

    /// Drop every memoized color.
    pub fn clear(&mut self) {
        self.colors.clear();
    }

    /// Number of memoized colors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Set of taxonomy entries keyed by annotation type.
#[derive(Clone, Debug, Default)]
pub struct Taxonomy {
    entries: HashMap<String, TaxonomyEntry>,
}

impl Taxonomy {
    /// Create an empty taxonomy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, entry: TaxonomyEntry) -> &mut Self {
        self.entries.insert(entry.key.clone(), entry);
        self
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with_entry(mut self, entry: TaxonomyEntry) -> Self {
        self.insert(entry);
        self
    }

    /// Look up an entry by type.
    #[must_use]
    pub fn entry(&self, kind: &str) -> Option<&TaxonomyEntry> {
        self.entries.get(kind)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The chain `kind, parent, grandparent, ...` of known entries.
    ///
    /// Walks iteratively and stops after `len()` steps, so cyclic parent
    /// links terminate.
    #[must_use]
    pub fn ancestors(&self, kind: &str) -> Vec<&TaxonomyEntry> {
        let mut chain = Vec::new();
        let mut current = self.entries.get(kind);
        while let Some(entry) = current {
            if chain.len() >= self.entries.len() {
                break;
            }
            chain.push(entry);
            current = entry
                .parent
                .as_deref()
                .and_then(|parent| self.entries.get(parent));
        }
        chain
    }

    /// Resolve the display style for an annotation type.
    pub fn resolve(&self, kind: &str, cache: &mut ColorCache) -> EntityStyle {
        let chain = self.ancestors(kind);
        let Some(entry) = chain.first() else {
            return EntityStyle::new(kind.to_string(), cache.color_for(kind), true);
        };
        let color = chain
            .iter()
            .find_map(|e| e.color)
            .unwrap_or_else(|| cache.color_for(kind));
        EntityStyle::new(entry.label.clone(), color, false)
    }
}
