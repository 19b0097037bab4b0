use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::render::{ElementSlot, ItemComponent, Rendered};

/// Size assumed for items that were never measured, unless configured otherwise.
pub const DEFAULT_EXPECTED_ITEM_HEIGHT: u32 = 35;

/// Quiet period after the last scroll notification before `is_scrolling` resets.
pub const DEFAULT_IS_SCROLLING_RESET_DELAY_MS: u64 = 120;

/// Configuration for [`crate::VirtualList`].
///
/// Cheap to clone: the item component is stored in an `Arc` and models are `Arc` snapshots.
pub struct VirtualListOptions<M, O, E> {
    /// Initial model sequence. Ids must be unique.
    pub models: Vec<Arc<M>>,

    /// Fixed size of every item. When set, items are never measured.
    pub item_height: Option<u32>,

    /// Size assumed for items that were not measured yet.
    pub expected_item_height: u32,

    /// Extra pixels rendered above and below the viewport.
    pub render_beyond_fold: u32,

    /// Creates the output for an item that enters the rendered window.
    pub item_component: ItemComponent<M, O, E>,

    pub is_scrolling_reset_delay_ms: u64,
}

impl<M, O, E> Clone for VirtualListOptions<M, O, E> {
    fn clone(&self) -> Self {
        Self {
            models: self.models.clone(),
            item_height: self.item_height,
            expected_item_height: self.expected_item_height,
            render_beyond_fold: self.render_beyond_fold,
            item_component: Arc::clone(&self.item_component),
            is_scrolling_reset_delay_ms: self.is_scrolling_reset_delay_ms,
        }
    }
}

impl<M, O, E> VirtualListOptions<M, O, E> {
    /// Creates options for a list rendered with `item_component`.
    ///
    /// The component receives the model, its index in the sequence, and a slot in which it
    /// binds the measurable element of the output.
    pub fn new(
        item_component: impl Fn(&Arc<M>, usize, &mut ElementSlot<E>) -> Rendered<O> + 'static,
    ) -> Self {
        Self {
            models: Vec::new(),
            item_height: None,
            expected_item_height: DEFAULT_EXPECTED_ITEM_HEIGHT,
            render_beyond_fold: 0,
            item_component: Arc::new(item_component),
            is_scrolling_reset_delay_ms: DEFAULT_IS_SCROLLING_RESET_DELAY_MS,
        }
    }

    pub fn with_models(mut self, models: Vec<Arc<M>>) -> Self {
        self.models = models;
        self
    }

    pub fn with_item_height(mut self, item_height: Option<u32>) -> Self {
        self.item_height = item_height;
        self
    }

    pub fn with_expected_item_height(mut self, expected_item_height: u32) -> Self {
        self.expected_item_height = expected_item_height;
        self
    }

    pub fn with_render_beyond_fold(mut self, render_beyond_fold: u32) -> Self {
        self.render_beyond_fold = render_beyond_fold;
        self
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }

    /// Whether items are measured (no fixed `item_height`).
    pub fn measures_items(&self) -> bool {
        self.item_height.is_none()
    }
}

impl<M, O, E> core::fmt::Debug for VirtualListOptions<M, O, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualListOptions")
            .field("models", &self.models.len())
            .field("item_height", &self.item_height)
            .field("expected_item_height", &self.expected_item_height)
            .field("render_beyond_fold", &self.render_beyond_fold)
            .field(
                "is_scrolling_reset_delay_ms",
                &self.is_scrolling_reset_delay_ms,
            )
            .finish_non_exhaustive()
    }
}
