use core::cmp;

use crate::host::{ContentElement, FrameId, Scheduler, ScrollRoot};
use crate::layout::apply_delta;
use crate::{Error, ScrollDirection, ScrollState, ViewportState};

/// Observes the scroll root and exposes its geometry as plain values.
///
/// Scroll notifications are coalesced: the first one in a frame requests an animation frame,
/// later ones are dropped until the frame runs (`on_animation_frame`). Programmatic
/// adjustments (`adjust_scroll`) swallow the notification they cause.
#[derive(Debug)]
pub struct ScrollTracker<R, C> {
    root: Option<R>,
    content: Option<C>,
    state: ViewportState,
    direction: Option<ScrollDirection>,

    ticking: bool,
    frame: Option<FrameId>,
    suppress_next: bool,

    is_scrolling: bool,
    last_scroll_event_ms: Option<u64>,
    is_scrolling_reset_delay_ms: u64,
}

impl<R: ScrollRoot, C: ContentElement> ScrollTracker<R, C> {
    pub fn new(is_scrolling_reset_delay_ms: u64) -> Self {
        Self {
            root: None,
            content: None,
            state: ViewportState::default(),
            direction: None,
            ticking: false,
            frame: None,
            suppress_next: false,
            is_scrolling: false,
            last_scroll_event_ms: None,
            is_scrolling_reset_delay_ms,
        }
    }

    pub fn scroll_position(&self) -> u64 {
        self.state.scroll_position
    }

    pub fn viewport_size(&self) -> u32 {
        self.state.viewport_size
    }

    pub fn content_offset(&self) -> u32 {
        self.state.content_offset
    }

    pub fn viewport_state(&self) -> ViewportState {
        self.state
    }

    pub fn scroll_state(&self) -> ScrollState {
        ScrollState {
            position: self.state.scroll_position,
            is_scrolling: self.is_scrolling,
        }
    }

    /// Direction of the last observed scroll movement; `None` when the last frame was idle.
    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.direction
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn is_root_bound(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&R> {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> Option<&mut R> {
        self.root.as_mut()
    }

    pub fn set_root_element(&mut self, root: R) {
        vdebug!("ScrollTracker::set_root_element");
        self.root = Some(root);
    }

    /// Binds the content element and reads the container geometry right away.
    pub fn set_content_element(&mut self, content: C) -> Result<(), Error> {
        if self.root.is_none() {
            vwarn!("content element bound before the scroll root");
            return Err(Error::RootNotBound);
        }
        self.content = Some(content);
        self.measure_container();
        Ok(())
    }

    /// Handles a scroll notification from the host.
    ///
    /// Returns `true` if a frame was requested.
    pub fn on_scroll(&mut self, now_ms: u64, scheduler: &mut impl Scheduler) -> bool {
        if self.suppress_next {
            self.suppress_next = false;
            return false;
        }
        self.last_scroll_event_ms = Some(now_ms);
        self.is_scrolling = true;
        if self.ticking {
            return false;
        }
        self.ticking = true;
        self.frame = Some(scheduler.request_animation_frame());
        true
    }

    /// Returns `true` when `id` is the frame this tracker is waiting for.
    pub fn owns_frame(&self, id: FrameId) -> bool {
        self.frame == Some(id)
    }

    /// Runs the scroll frame. Returns `true` if the viewport state changed.
    pub fn on_animation_frame(&mut self, id: FrameId) -> bool {
        if !self.owns_frame(id) {
            return false;
        }
        self.frame = None;
        self.measure_container()
    }

    /// Reads scroll position, viewport size and content offset from the bound elements.
    ///
    /// Returns `true` if any of them changed.
    pub fn measure_container(&mut self) -> bool {
        self.ticking = false;
        let Some(root) = &self.root else {
            return false;
        };
        let prev = self.state;
        let next = ViewportState {
            scroll_position: root.scroll_position(),
            viewport_size: root.viewport_size(),
            content_offset: self
                .content
                .as_ref()
                .map(ContentElement::offset_from_root)
                .unwrap_or(0),
        };
        self.direction = match next.scroll_position.cmp(&prev.scroll_position) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => None,
        };
        self.state = next;
        vtrace!(
            scroll_position = next.scroll_position,
            viewport_size = next.viewport_size,
            content_offset = next.content_offset,
            "measure_container"
        );
        prev != next
    }

    /// Shifts the scroll position by `delta` without triggering a recompute.
    ///
    /// If the root actually moved, the next scroll notification (the echo of this adjustment)
    /// is ignored. Returns the position the root ended up at, which may be clamped by the host.
    pub fn adjust_scroll(&mut self, delta: i64) -> Result<u64, Error> {
        let Some(root) = self.root.as_mut() else {
            return Err(Error::RootNotBound);
        };
        let current = self.state.scroll_position;
        let target = apply_delta(current, delta);
        // No movement, no echo to swallow.
        if target == current {
            return Ok(target);
        }
        root.scroll_to(target);
        let actual = root.scroll_position();
        self.state.scroll_position = actual;
        vtrace!(delta, target, actual, "adjust_scroll");
        if actual == current {
            return Ok(actual);
        }
        if self.suppress_next {
            vwarn!(delta, "adjust_scroll: previous adjustment was never echoed");
        }
        self.suppress_next = true;
        Ok(actual)
    }

    /// Resets `is_scrolling` once no scroll notification arrived for the quiet period.
    pub fn update_scrolling(&mut self, now_ms: u64) -> bool {
        if !self.is_scrolling {
            return false;
        }
        let Some(last) = self.last_scroll_event_ms else {
            return false;
        };
        if now_ms.saturating_sub(last) < self.is_scrolling_reset_delay_ms {
            return false;
        }
        self.is_scrolling = false;
        self.last_scroll_event_ms = None;
        true
    }

    pub fn set_is_scrolling_reset_delay_ms(&mut self, delay_ms: u64) {
        self.is_scrolling_reset_delay_ms = delay_ms;
    }

    /// Cancels the pending scroll frame, if any.
    pub fn teardown(&mut self, scheduler: &mut impl Scheduler) {
        if let Some(id) = self.frame.take() {
            scheduler.cancel_animation_frame(id);
        }
        self.ticking = false;
        self.suppress_next = false;
    }
}
