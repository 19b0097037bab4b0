use alloc::vec::Vec;

use crate::measure::Measurement;
use crate::{ItemId, RenderedItem, ViewportState};

/// The windowing calculator for one recompute cycle.
///
/// Items are fed in sequence order through [`Layout::process`]; the layout keeps a running
/// total of their sizes and remembers the ones that overlap the extended viewport
/// `[scroll - buffer, scroll + viewport + buffer)`. Positions are never looked up at random:
/// everything is derived from the single forward pass.
#[derive(Clone, Debug)]
pub struct Layout<K> {
    viewport: ViewportState,
    buffer: u32,

    compounded_height: u64,
    rendered_heights: Vec<(K, u32)>,
    first_rendered: Option<RenderedItem<K>>,
    last_rendered: Option<RenderedItem<K>>,
    next_index: usize,

    // Accumulated by `update_with_measurement`.
    scroll_delta: i64,
}

impl<K: ItemId> Layout<K> {
    pub fn new(viewport: ViewportState, buffer: u32) -> Self {
        Self {
            viewport,
            buffer,
            compounded_height: 0,
            rendered_heights: Vec::new(),
            first_rendered: None,
            last_rendered: None,
            next_index: 0,
            scroll_delta: 0,
        }
    }

    /// Accounts for the next item of the sequence and returns whether it should render.
    pub fn process(&mut self, id: K, height: u32) -> bool {
        let index = self.next_index;
        self.next_index += 1;
        let top = self.compounded_height;
        self.compounded_height = top.saturating_add(height as u64);

        if !self.overlaps_render_range(top, height) {
            return false;
        }

        let item = RenderedItem {
            id: id.clone(),
            index,
            top,
        };
        if self.first_rendered.is_none() {
            self.first_rendered = Some(item.clone());
        }
        self.last_rendered = Some(item);
        self.rendered_heights.push((id, height));
        true
    }

    fn overlaps_render_range(&self, top: u64, height: u32) -> bool {
        let from = to_i64(self.viewport.content_offset as u64).saturating_add(to_i64(top));
        let to = from.saturating_add(height as i64);
        let scroll = to_i64(self.viewport.scroll_position);
        let buffer = self.buffer as i64;
        let range_top = scroll.saturating_sub(buffer);
        let range_bottom = scroll
            .saturating_add(self.viewport.viewport_size as i64)
            .saturating_add(buffer);
        from < range_bottom && to > range_top
    }

    /// Sum of all processed sizes, rendered or not (plus measurement corrections).
    pub fn compounded_height(&self) -> u64 {
        self.compounded_height
    }

    pub fn first_rendered(&self) -> Option<&RenderedItem<K>> {
        self.first_rendered.as_ref()
    }

    pub fn last_rendered(&self) -> Option<&RenderedItem<K>> {
        self.last_rendered.as_ref()
    }

    /// Offset of the first rendered item inside the content element; 0 when nothing renders.
    pub fn first_rendered_top(&self) -> u64 {
        self.first_rendered.as_ref().map_or(0, |it| it.top)
    }

    pub fn rendered_len(&self) -> usize {
        self.rendered_heights.len()
    }

    /// Rendered ids with their current sizes, in sequence order.
    pub fn rendered(&self) -> impl Iterator<Item = (&K, u32)> + '_ {
        self.rendered_heights.iter().map(|(id, h)| (id, *h))
    }

    pub fn is_rendered(&self, id: &K) -> bool {
        self.rendered_heights.iter().any(|(cur, _)| cur == id)
    }

    pub fn rendered_height(&self, id: &K) -> Option<u32> {
        self.rendered_heights
            .iter()
            .find(|(cur, _)| cur == id)
            .map(|(_, h)| *h)
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn buffer(&self) -> u32 {
        self.buffer
    }

    /// Scroll correction accumulated from measurements of items above the fold.
    pub fn scroll_delta(&self) -> i64 {
        self.scroll_delta
    }

    /// The scroll position this layout was computed for, corrected by `scroll_delta`.
    pub fn scroll_top(&self) -> u64 {
        apply_delta(self.viewport.scroll_position, self.scroll_delta)
    }

    /// Whether `pos` (root coordinates) lies in the corrected, unbuffered viewport.
    pub fn is_in_viewport(&self, pos: u64) -> bool {
        let top = self.scroll_top();
        let bottom = top.saturating_add(self.viewport.viewport_size as u64);
        pos >= top && pos < bottom
    }

    pub fn is_above_viewport(&self, pos: u64) -> bool {
        pos < self.scroll_top()
    }

    /// Whether the rendered item `id` overlaps the corrected, unbuffered viewport.
    pub fn is_item_in_viewport(&self, id: &K) -> bool {
        let top = self.scroll_top();
        let bottom = top.saturating_add(self.viewport.viewport_size as u64);
        let mut from = self.rendered_origin();
        for (cur, height) in &self.rendered_heights {
            let to = from.saturating_add(*height as u64);
            if cur == id {
                return from < bottom && to > top;
            }
            from = to;
        }
        false
    }

    /// Root-relative position of the first rendered item.
    fn rendered_origin(&self) -> u64 {
        (self.viewport.content_offset as u64).saturating_add(self.first_rendered_top())
    }

    /// Applies measured size deltas to the rendered items.
    ///
    /// Measured items whose top edge is above the (corrected) viewport top shift everything
    /// below them, so their delta is added to `scroll_delta`; the others only change the total
    /// height. Returns the scroll correction contributed by this measurement.
    pub fn update_with_measurement(&mut self, measurement: &Measurement<K>) -> i64 {
        let viewport_top = self.scroll_top();
        let content_offset = self.viewport.content_offset as u64;
        let mut from = self.rendered_origin();
        let mut correction = 0i64;

        for (id, height) in &mut self.rendered_heights {
            if let Some(delta) = measurement.delta(id) {
                if from < viewport_top {
                    correction = correction.saturating_add(delta);
                }
                *height = apply_delta(*height as u64, delta).min(u32::MAX as u64) as u32;
            }
            if let Some(last) = self.last_rendered.as_mut().filter(|it| it.id == *id) {
                last.top = from.saturating_sub(content_offset);
            }
            from = from.saturating_add(*height as u64);
        }

        self.scroll_delta = self.scroll_delta.saturating_add(correction);
        self.compounded_height =
            apply_delta(self.compounded_height, measurement.compound_height_delta());
        vtrace!(
            correction,
            scroll_delta = self.scroll_delta,
            compounded_height = self.compounded_height,
            "update_with_measurement"
        );
        correction
    }
}

pub(crate) fn apply_delta(value: u64, delta: i64) -> u64 {
    if delta >= 0 {
        value.saturating_add(delta as u64)
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
