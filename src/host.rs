//! Capabilities the host rendering environment provides to the engine.
//!
//! The engine never holds UI objects of its own: it talks to the host exclusively through
//! these traits, and the host calls back into the engine when scheduled work becomes due
//! (`VirtualList::run_microtasks`, `VirtualList::on_animation_frame`).

/// Identifier of a requested animation frame.
pub type FrameId = u64;

/// The scrollable root element.
pub trait ScrollRoot {
    /// Current scroll offset in the scroll axis.
    fn scroll_position(&self) -> u64;
    /// Client size in the scroll axis.
    fn viewport_size(&self) -> u32;
    /// Moves the scroll offset. The host fires a regular scroll notification afterwards.
    fn scroll_to(&mut self, position: u64);
}

/// The element wrapping the virtualized items.
pub trait ContentElement {
    /// Offset from the start of the scroll root (headers, paddings, static content).
    fn offset_from_root(&self) -> u32;
}

/// A measurable handle to a rendered item.
pub trait MeasuredElement {
    /// Bounding size in the scroll axis (without margins).
    fn size(&self) -> u32;
    /// Leading margin as reported by the host. Hosts may report 0 for elements that were not
    /// laid out yet.
    fn margin_start(&self) -> u32;
}

/// Deferred scheduling primitives.
pub trait Scheduler {
    /// Requests a callback on the next animation frame. The host answers with
    /// `VirtualList::on_animation_frame(id)`.
    fn request_animation_frame(&mut self) -> FrameId;
    fn cancel_animation_frame(&mut self, id: FrameId);
    /// Requests a microtask checkpoint. The host answers with `VirtualList::run_microtasks()`
    /// once the current task is done.
    fn queue_microtask(&mut self);
}

/// Bundles the host types used by a [`crate::VirtualList`].
pub trait Host {
    type Root: ScrollRoot;
    type Content: ContentElement;
    type Element: MeasuredElement + Clone;
    type Scheduler: Scheduler;
}
