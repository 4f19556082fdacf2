//! Page windowing over a long document.
//!
//! Near the start of a document the window grows (its first page stays at
//! 1 and its end follows the requested page plus a buffer), so nothing the
//! reader has seen disappears. Past `window_size_in_pages` the window slides,
//! centered on the requested page and padded back to full size when it hits
//! the end of the document.

use crate::annotation::Span;
use crate::error::{Error, Result};

/// Materialized sub-range of a document. Pages are 1-based and inclusive;
/// indices are code-point offsets, `end_index` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Window {
    pub start_page: usize,
    pub end_page: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl Window {
    /// Number of pages in the window.
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.end_page + 1 - self.start_page
    }

    /// Code-point range of the window.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.start_index, self.end_index)
    }

    /// Check if the window materializes `page`.
    #[must_use]
    pub const fn contains_page(&self, page: usize) -> bool {
        page >= self.start_page && page <= self.end_page
    }

    /// Length of the window in code points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    /// Check if the window covers no text.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end_index == self.start_index
    }
}

/// Windowing parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    /// Page length in code points.
    pub page_size: usize,
    /// Target window length in pages once the window slides.
    pub window_size_in_pages: usize,
    /// Pages materialized past the requested page while growing.
    pub buffer_pages: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            page_size: 4_000,
            window_size_in_pages: 5,
            buffer_pages: 2,
        }
    }
}

impl WindowConfig {
    /// Builder-style page size setter.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Builder-style window size setter.
    #[must_use]
    pub const fn with_window_size(mut self, pages: usize) -> Self {
        self.window_size_in_pages = pages;
        self
    }

    /// Builder-style buffer setter.
    #[must_use]
    pub const fn with_buffer_pages(mut self, pages: usize) -> Self {
        self.buffer_pages = pages;
        self
    }

    /// Reject zero page or window sizes.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidConfig {
                field: "page_size",
                reason: "must be greater than zero",
            });
        }
        if self.window_size_in_pages == 0 {
            return Err(Error::InvalidConfig {
                field: "window_size_in_pages",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    /// Window for `requested_page` over a document of `document_length`.
    #[must_use]
    pub fn window_for(&self, requested_page: usize, document_length: usize) -> Window {
        compute_window(
            requested_page,
            document_length,
            self.page_size,
            self.window_size_in_pages,
            self.buffer_pages,
        )
    }

    /// Page (1-based) holding code point `index`, clamped to the document.
    #[must_use]
    pub fn page_of_index(&self, index: usize, document_length: usize) -> usize {
        let page_size = self.page_size.max(1);
        (index / page_size + 1).min(total_pages(document_length, page_size))
    }
}

/// `max(1, ceil(document_length / page_size))`; a zero page size counts as 1.
#[must_use]
pub fn total_pages(document_length: usize, page_size: usize) -> usize {
    document_length.div_ceil(page_size.max(1)).max(1)
}

/// Compute the window for a requested page.
///
/// Pure: the same arguments always give the same window. The requested
/// page is clamped to `[1, total_pages]`, and zero page or window sizes
/// count as 1.
///
/// # Examples
///
/// ```
/// use annowindow::window::compute_window;
///
/// let window = compute_window(2, 20_000, 4_000, 5, 2);
/// assert_eq!((window.start_page, window.end_page), (1, 4));
/// assert_eq!((window.start_index, window.end_index), (0, 16_000));
/// ```
#[must_use]
pub fn compute_window(
    requested_page: usize,
    document_length: usize,
    page_size: usize,
    window_size_in_pages: usize,
    buffer_pages: usize,
) -> Window {
    let page_size = page_size.max(1);
    let window_size = window_size_in_pages.max(1);
    let total = total_pages(document_length, page_size);
    let requested = requested_page.clamp(1, total);

    let (start_page, end_page) = if requested <= window_size {
        (1, requested.saturating_add(buffer_pages).min(total))
    } else {
        let half = window_size / 2;
        let mut start = requested.saturating_sub(half).max(1);
        let mut end = requested.saturating_add(half).min(total);
        if end + 1 - start < window_size {
            if start == 1 {
                end = window_size.min(total);
            } else if end == total {
                start = (end + 1).saturating_sub(window_size).max(1);
            }
        }
        (start, end)
    };

    Window {
        start_page,
        end_page,
        start_index: (start_page - 1).saturating_mul(page_size).min(document_length),
        end_index: end_page.saturating_mul(page_size).min(document_length),
    }
}
