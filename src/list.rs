use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::host::{FrameId, Host, Scheduler};
use crate::layout::Layout;
use crate::measure::{Measurement, Measurer};
use crate::reconcile::{Patch, diff_models, reconcile};
use crate::render::{RenderCache, RenderOutput};
use crate::scroll::ScrollTracker;
use crate::{Error, Model, ScrollDirection, ScrollState, ViewportState, VirtualListOptions};

/// What the last recompute did to the render cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleStats {
    /// Entries created through the item component.
    pub created: usize,
    /// Entries carried over from the previous cycle.
    pub reused: usize,
    /// Reused entries that received a new model snapshot.
    pub updated: usize,
    /// Entries of the previous cycle that left the window.
    pub disposed: usize,
}

/// A virtualized list: windowing, measurement, and recycling of rendered items.
///
/// The list holds no UI objects of its own beyond the handles the host binds. The host drives
/// it:
/// - `set_root_element` / `set_content_element` once the elements exist
/// - `on_scroll` for every scroll notification of the root
/// - `run_microtasks` / `on_animation_frame` when work scheduled through [`Host::Scheduler`]
///   becomes due
/// - `set_models` whenever the model sequence changes
///
/// and reads back `items()`, `content_height()` and `items_top()` to position the outputs.
pub struct VirtualList<M: Model, H: Host, O> {
    options: VirtualListOptions<M, O, H::Element>,
    scheduler: H::Scheduler,

    scroll: ScrollTracker<H::Root, H::Content>,
    measurer: Measurer<M::Id, H::Element>,
    cache: RenderCache<M, O, H::Element>,
    layout: Layout<M::Id>,
    models: Vec<Arc<M>>,

    recompute_pending: bool,
    microtask_queued: bool,
    last_cycle: CycleStats,
    torn_down: bool,
}

impl<M: Model, H: Host, O: RenderOutput<M>> VirtualList<M, H, O> {
    pub fn new(options: VirtualListOptions<M, O, H::Element>, scheduler: H::Scheduler) -> Self {
        vdebug!(
            models = options.models.len(),
            item_height = ?options.item_height,
            expected_item_height = options.expected_item_height,
            render_beyond_fold = options.render_beyond_fold,
            "VirtualList::new"
        );
        let scroll = ScrollTracker::new(options.is_scrolling_reset_delay_ms);
        let layout = Layout::new(scroll.viewport_state(), options.render_beyond_fold);
        Self {
            scheduler,
            scroll,
            measurer: Measurer::new(options.expected_item_height),
            cache: RenderCache::new(),
            layout,
            models: options.models.clone(),
            recompute_pending: false,
            microtask_queued: false,
            last_cycle: CycleStats::default(),
            torn_down: false,
            options,
        }
    }

    pub fn options(&self) -> &VirtualListOptions<M, O, H::Element> {
        &self.options
    }

    pub fn scheduler(&self) -> &H::Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut H::Scheduler {
        &mut self.scheduler
    }

    pub fn scroll(&self) -> &ScrollTracker<H::Root, H::Content> {
        &self.scroll
    }

    pub fn measurer(&self) -> &Measurer<M::Id, H::Element> {
        &self.measurer
    }

    pub fn cache(&self) -> &RenderCache<M, O, H::Element> {
        &self.cache
    }

    pub fn layout(&self) -> &Layout<M::Id> {
        &self.layout
    }

    pub fn models(&self) -> &[Arc<M>] {
        &self.models
    }

    pub fn last_cycle(&self) -> CycleStats {
        self.last_cycle
    }

    pub fn viewport_state(&self) -> ViewportState {
        self.scroll.viewport_state()
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll.scroll_state()
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll.scroll_direction()
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_scrolling()
    }

    /// Total height of the content: every item, rendered or not.
    pub fn content_height(&self) -> u64 {
        self.layout.compounded_height()
    }

    /// Offset of the first rendered item inside the content element.
    pub fn items_top(&self) -> u64 {
        self.layout.first_rendered_top()
    }

    /// The rendered outputs, in sequence order.
    pub fn items(&self) -> impl Iterator<Item = &O> + '_ {
        self.cache.items()
    }

    pub fn rendered_len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_recompute_pending(&self) -> bool {
        self.recompute_pending
    }

    /// Root-binding entry point.
    pub fn set_root_element(&mut self, root: H::Root) {
        self.scroll.set_root_element(root);
    }

    /// Content-rendering entry point: binds the content element and renders the first window.
    ///
    /// Fails with [`Error::RootNotBound`] when the root was not bound first.
    pub fn set_content_element(&mut self, content: H::Content) -> Result<(), Error> {
        self.scroll.set_content_element(content)?;
        self.recompute();
        Ok(())
    }

    /// Replaces the model sequence.
    ///
    /// Sizes of removed ids are dropped and sizes of replaced snapshots are invalidated right
    /// away, so the next recompute already sees them.
    pub fn set_models(&mut self, models: Vec<Arc<M>>) {
        let changes = diff_models(&self.models, &models);
        for id in &changes.removed {
            self.measurer.delete(id);
        }
        for id in &changes.changed {
            self.measurer.invalidate(id);
        }
        vtrace!(
            added = changes.added.len(),
            removed = changes.removed.len(),
            changed = changes.changed.len(),
            "set_models"
        );
        self.models = models;
        self.notify_models_changed();
    }

    /// Same as [`Self::set_models`], and returns the minimal-move patch from the previous
    /// sequence to `models`.
    pub fn sync_models(&mut self, models: Vec<Arc<M>>) -> Patch<Arc<M>> {
        let patch = reconcile(&self.models, &models);
        self.set_models(models);
        patch
    }

    pub fn notify_models_changed(&mut self) {
        self.schedule_recompute();
    }

    pub fn notify_scroll_changed(&mut self) {
        self.schedule_recompute();
    }

    /// Re-reads the container geometry (e.g. after a resize) and schedules a recompute.
    pub fn notify_viewport_changed(&mut self) {
        self.scroll.measure_container();
        self.schedule_recompute();
    }

    fn schedule_recompute(&mut self) {
        if self.torn_down {
            return;
        }
        self.recompute_pending = true;
        if !self.microtask_queued {
            self.microtask_queued = true;
            self.scheduler.queue_microtask();
        }
    }

    /// Handles a scroll notification of the root element.
    pub fn on_scroll(&mut self, now_ms: u64) {
        if self.torn_down {
            return;
        }
        self.scroll.on_scroll(now_ms, &mut self.scheduler);
    }

    /// Resets `is_scrolling` after the quiet period. Returns `true` if it changed.
    pub fn update_scrolling(&mut self, now_ms: u64) -> bool {
        self.scroll.update_scrolling(now_ms)
    }

    /// Microtask checkpoint: runs the pending recompute, then lets the measurer request its
    /// flush frame.
    pub fn run_microtasks(&mut self) {
        self.microtask_queued = false;
        if self.torn_down {
            return;
        }
        if self.recompute_pending {
            self.recompute();
        }
        self.measurer.on_microtask(&mut self.scheduler);
    }

    /// Runs the animation frame `id` requested by this list.
    ///
    /// A scroll frame re-reads the container and recomputes if anything moved. A measurement
    /// frame flushes the batch and applies the correction.
    pub fn on_animation_frame(&mut self, id: FrameId) -> Result<(), Error> {
        if self.torn_down {
            return Ok(());
        }
        if self.scroll.owns_frame(id) {
            if self.scroll.on_animation_frame(id) {
                self.recompute();
            }
            return Ok(());
        }
        if let Some(measurement) = self.measurer.on_animation_frame(id) {
            self.apply_measurement(&measurement)?;
            return Ok(());
        }
        vwarn!(id, "on_animation_frame: unknown frame");
        Ok(())
    }

    /// Applies measured deltas to the current layout and corrects the scroll position for
    /// items above the fold. Returns the applied scroll correction.
    ///
    /// When the total height changed, a recompute is scheduled so the window is refilled with
    /// the measured sizes.
    pub fn apply_measurement(&mut self, measurement: &Measurement<M::Id>) -> Result<i64, Error> {
        let correction = self.layout.update_with_measurement(measurement);
        if correction != 0 {
            self.scroll.adjust_scroll(correction)?;
        }
        if measurement.compound_height_delta() != 0 {
            self.schedule_recompute();
        }
        vtrace!(
            correction,
            content_height = self.layout.compounded_height(),
            "apply_measurement"
        );
        Ok(correction)
    }

    /// Walks the model sequence once, windows it, and reconciles the render cache.
    pub fn recompute(&mut self) {
        self.recompute_pending = false;
        if self.torn_down {
            return;
        }

        let mut layout = Layout::new(self.scroll.viewport_state(), self.options.render_beyond_fold);
        let mut next = RenderCache::new();
        let mut stats = CycleStats::default();
        let fixed_height = self.options.item_height;
        let measures = self.options.measures_items();
        let component = Arc::clone(&self.options.item_component);

        for (index, model) in self.models.iter().enumerate() {
            let id = model.id();
            let height = fixed_height.unwrap_or_else(|| self.measurer.assumed(&id));
            if !layout.process(id.clone(), height) {
                continue;
            }

            if self.cache.has(&id) {
                if self.cache.is_model_changed(model) {
                    self.cache.update_model(model);
                    stats.updated += 1;
                    if measures && self.measurer.is_required_measure(&id) {
                        let element = self.cache.get(&id).and_then(|e| e.element().cloned());
                        self.measurer
                            .schedule_measure(id.clone(), element, &mut self.scheduler);
                    }
                }
                next.take_item_from(&id, &mut self.cache);
                stats.reused += 1;
            } else {
                let entry = next.render(model, index, &*component);
                stats.created += 1;
                if measures && self.measurer.is_required_measure(&id) {
                    let element = entry.element().cloned();
                    self.measurer
                        .schedule_measure(id, element, &mut self.scheduler);
                }
            }
        }

        stats.disposed = self.cache.dispose();
        self.cache = next;
        self.layout = layout;
        self.last_cycle = stats;
        vtrace!(
            models = self.models.len(),
            rendered = self.cache.len(),
            created = stats.created,
            reused = stats.reused,
            disposed = stats.disposed,
            content_height = self.layout.compounded_height(),
            "recompute"
        );
    }

    /// Cancels scheduled frames and disposes every rendered item. The list is inert afterwards.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        vdebug!("VirtualList::teardown");
        self.scroll.teardown(&mut self.scheduler);
        self.measurer.teardown(&mut self.scheduler);
        self.cache.dispose();
        self.recompute_pending = false;
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl<M: Model, H: Host, O> core::fmt::Debug for VirtualList<M, H, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualList")
            .field("options", &self.options)
            .field("models", &self.models.len())
            .field("rendered", &self.cache.len())
            .field("content_height", &self.layout.compounded_height())
            .field("recompute_pending", &self.recompute_pending)
            .field("last_cycle", &self.last_cycle)
            .finish_non_exhaustive()
    }
}
