//! Windowing calculations for rendering long lists.
//!
//! Only the items intersecting the viewport, plus an overscan margin on each
//! side, are ever materialized. The total virtual extent is reported
//! separately so a scrollbar can reflect the full list length.
//!
//! # Core Types
//!
//! - [`compute_window`] / [`total_extent`] - Pure functions over list geometry
//! - [`Window`] - Contiguous index range with per-item offsets
//! - [`VirtualList`] - Scroll state that caches its most recent window
//! - [`ItemRenderer`] - Callback that materializes one item
//!
//! # Clamping
//!
//! There is no error path. A negative or NaN scroll offset becomes 0, a
//! scroll offset past the end is pulled back to the last full page, a
//! negative or NaN viewport becomes 0, and a non-positive item size makes
//! every item visible.


use crate::models::Record;
use serde::Serialize;
use std::ops::RangeInclusive;

/// Default number of extra items materialized on each side of the viewport.
pub const DEFAULT_OVERSCAN: usize = 5;

/// Default item size, in pixels.
pub const DEFAULT_ITEM_SIZE: f64 = 80.0;

/// Default viewport size, in pixels.
pub const DEFAULT_VIEWPORT_SIZE: f64 = 600.0;

/// Position of one materialized item within the virtual extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VirtualItem {
    pub index: usize,
    pub offset: f64,
    pub size: f64,
}

/// Contiguous range of indices to materialize.
///
/// An empty window (no items) reports both indices as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Window {
    pub start_index: usize,
    pub end_index: usize,
    pub items: Vec<VirtualItem>,
}

impl Window {
    /// Window over an empty list.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of materialized items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Inclusive index range, or `None` for an empty window.
    pub fn range(&self) -> Option<RangeInclusive<usize>> {
        if self.is_empty() {
            None
        } else {
            Some(self.start_index..=self.end_index)
        }
    }

    /// Whether `index` is materialized.
    pub fn contains(&self, index: usize) -> bool {
        !self.is_empty() && self.start_index <= index && index <= self.end_index
    }

    fn span(start: usize, end: usize, item_size: f64) -> Self {
        let items = (start..=end)
            .map(|index| VirtualItem {
                index,
                offset: index as f64 * item_size,
                size: item_size,
            })
            .collect();
        Self {
            start_index: start,
            end_index: end,
            items,
        }
    }
}

fn valid_item_size(item_size: f64) -> bool {
    item_size.is_finite() && item_size > 0.0
}

fn sanitize_viewport(viewport_size: f64) -> f64 {
    if viewport_size.is_nan() {
        0.0
    } else {
        viewport_size.max(0.0)
    }
}

/// Total scrollable extent of `item_count` items.
pub fn total_extent(item_count: usize, item_size: f64) -> f64 {
    if valid_item_size(item_size) {
        item_count as f64 * item_size
    } else {
        0.0
    }
}

/// Largest scroll offset that still shows a full viewport.
pub fn max_scroll_offset(item_count: usize, item_size: f64, viewport_size: f64) -> f64 {
    // NaN (infinite extent and viewport) folds to 0 through f64::max
    (total_extent(item_count, item_size) - sanitize_viewport(viewport_size)).max(0.0)
}

/// Clamp `scroll_offset` into `[0, max_scroll_offset]`.
pub fn clamp_scroll_offset(
    scroll_offset: f64,
    item_count: usize,
    item_size: f64,
    viewport_size: f64,
) -> f64 {
    if scroll_offset.is_nan() {
        return 0.0;
    }
    scroll_offset.clamp(0.0, max_scroll_offset(item_count, item_size, viewport_size))
}

/// Compute the items to materialize for the given geometry.
///
/// `start_index = max(0, floor(scroll / item_size) - overscan)` and
/// `end_index = min(item_count - 1, ceil((scroll + viewport) / item_size) + overscan)`,
/// after clamping the scroll offset to `[0, total_extent - viewport]`. An
/// offset past the last full page is pulled back even when it lies inside the
/// total extent, so the window never shows a short final page.
pub fn compute_window(
    item_count: usize,
    item_size: f64,
    viewport_size: f64,
    scroll_offset: f64,
    overscan: usize,
) -> Window {
    if item_count == 0 {
        return Window::empty();
    }
    let last = item_count - 1;

    if !valid_item_size(item_size) {
        // Zero-height items all sit at offset 0, so all of them are visible
        return Window::span(0, last, 0.0);
    }

    let viewport = sanitize_viewport(viewport_size);
    let scroll = clamp_scroll_offset(scroll_offset, item_count, item_size, viewport);

    // Float to usize casts saturate, so an infinite viewport lands on `last`
    let first_visible = (scroll / item_size).floor() as usize;
    let past_visible = ((scroll + viewport) / item_size).ceil() as usize;

    let start = first_visible.saturating_sub(overscan).min(last);
    let end = past_visible.saturating_add(overscan).min(last);

    Window::span(start, end, item_size)
}

/// Materializes one item of a windowed list.
pub trait ItemRenderer {
    type Output;

    /// Render the record at `index`, whose top edge sits at `offset`.
    fn render_item(&mut self, index: usize, record: &Record, offset: f64) -> Self::Output;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct WindowInputs {
    item_count: usize,
    item_size: f64,
    viewport_size: f64,
    scroll_offset: f64,
    overscan: usize,
}

/// Scroll state for a windowed list.
///
/// Holds the geometry and the current scroll offset, and caches the most
/// recent window. The window is recomputed only when the item count or one
/// of the geometry inputs changed.
#[derive(Debug, Clone)]
pub struct VirtualList {
    item_size: f64,
    viewport_size: f64,
    overscan: usize,
    scroll_offset: f64,
    cache: Option<(WindowInputs, Window)>,
    computations: u64,
}

impl Default for VirtualList {
    fn default() -> Self {
        Self::new(DEFAULT_ITEM_SIZE, DEFAULT_VIEWPORT_SIZE)
    }
}

impl VirtualList {
    /// Create a list scrolled to the top with the default overscan.
    pub fn new(item_size: f64, viewport_size: f64) -> Self {
        Self {
            item_size,
            viewport_size,
            overscan: DEFAULT_OVERSCAN,
            scroll_offset: 0.0,
            cache: None,
            computations: 0,
        }
    }

    /// Set overscan amount.
    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn item_size(&self) -> f64 {
        self.item_size
    }

    pub fn viewport_size(&self) -> f64 {
        self.viewport_size
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn set_item_size(&mut self, item_size: f64) {
        self.item_size = item_size;
    }

    pub fn set_viewport_size(&mut self, viewport_size: f64) {
        self.viewport_size = viewport_size;
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.overscan = overscan;
    }

    /// Total scrollable extent for `item_count` items.
    pub fn total_extent(&self, item_count: usize) -> f64 {
        total_extent(item_count, self.item_size)
    }

    /// Scroll to an absolute offset, clamped to the scrollable range.
    pub fn scroll_to(&mut self, offset: f64, item_count: usize) {
        self.scroll_offset =
            clamp_scroll_offset(offset, item_count, self.item_size, self.viewport_size);
    }

    /// Scroll by a relative amount.
    pub fn scroll_by(&mut self, delta: f64, item_count: usize) {
        self.scroll_to(self.scroll_offset + delta, item_count);
    }

    pub fn page_down(&mut self, item_count: usize) {
        self.scroll_by(self.viewport_size, item_count);
    }

    pub fn page_up(&mut self, item_count: usize) {
        self.scroll_by(-self.viewport_size, item_count);
    }

    /// Scroll the minimum distance that brings `index` fully into view.
    ///
    /// The current offset is clamped first, so a list that shrank under the
    /// viewport is pulled back to a full page.
    pub fn scroll_to_index(&mut self, index: usize, item_count: usize) {
        self.scroll_to(self.scroll_offset, item_count);
        if item_count == 0 || !valid_item_size(self.item_size) {
            return;
        }
        let index = index.min(item_count - 1);
        let top = index as f64 * self.item_size;
        let bottom = top + self.item_size;
        let viewport = sanitize_viewport(self.viewport_size);

        if top < self.scroll_offset {
            self.scroll_to(top, item_count);
        } else if bottom > self.scroll_offset + viewport {
            self.scroll_to(bottom - viewport, item_count);
        }
    }

    /// Index of the first item intersecting the viewport.
    pub fn first_visible_index(&self, item_count: usize) -> Option<usize> {
        if item_count == 0 {
            return None;
        }
        if !valid_item_size(self.item_size) {
            return Some(0);
        }
        let scroll =
            clamp_scroll_offset(self.scroll_offset, item_count, self.item_size, self.viewport_size);
        Some(((scroll / self.item_size).floor() as usize).min(item_count - 1))
    }

    /// Window for a list of `item_count` items.
    pub fn window(&mut self, item_count: usize) -> &Window {
        // Keep the stored offset valid when the list shrinks
        self.scroll_offset = clamp_scroll_offset(
            self.scroll_offset,
            item_count,
            self.item_size,
            self.viewport_size,
        );
        let inputs = WindowInputs {
            item_count,
            item_size: self.item_size,
            viewport_size: self.viewport_size,
            scroll_offset: self.scroll_offset,
            overscan: self.overscan,
        };

        if self.cache.as_ref().is_some_and(|(cached, _)| *cached != inputs) {
            self.cache = None;
        }

        let computations = &mut self.computations;
        let (_, window) = self.cache.get_or_insert_with(|| {
            *computations += 1;
            let window = compute_window(
                inputs.item_count,
                inputs.item_size,
                inputs.viewport_size,
                inputs.scroll_offset,
                inputs.overscan,
            );
            tracing::trace!(
                item_count = inputs.item_count,
                start = window.start_index,
                end = window.end_index,
                "Recomputed window"
            );
            (inputs, window)
        });
        window
    }

    /// Render the windowed slice of `view`, one call per materialized index.
    pub fn render<R: ItemRenderer>(&mut self, view: &[Record], renderer: &mut R) -> Vec<R::Output> {
        let window = self.window(view.len());
        window
            .items
            .iter()
            .filter_map(|item| {
                view.get(item.index)
                    .map(|record| renderer.render_item(item.index, record, item.offset))
            })
            .collect()
    }

    /// How many times a window has been computed.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
