//! A headless list-virtualization engine with keyed recycling.
//!
//! Given an ordered sequence of models and a scrollable viewport, the engine decides which
//! items to render, keeps the outputs of items that stay in the window alive across updates,
//! reads the real size of freshly rendered items in batches, and corrects the scroll position
//! when items above the fold turn out to be taller or shorter than assumed.
//!
//! It is UI-agnostic. The host rendering environment provides (see [`host`]):
//! - the scroll root (scroll offset, viewport size, programmatic scrolling)
//! - the content element (its offset inside the root)
//! - measurable handles to rendered items
//! - microtask and animation-frame scheduling
//!
//! The building blocks are usable on their own: [`reconcile()`] computes minimal-move patches
//! between keyed sequences, [`Layout`] windows a sequence in one forward pass, [`Measurer`]
//! batches size reads, and [`RenderCache`] recycles rendered outputs by id.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
pub mod host;
mod key;
mod layout;
mod list;
mod measure;
mod options;
mod reconcile;
mod render;
mod scroll;
mod state;
mod types;


pub use error::Error;
pub use host::{ContentElement, FrameId, Host, MeasuredElement, Scheduler, ScrollRoot};
pub use key::ItemId;
pub use layout::Layout;
pub use list::{CycleStats, VirtualList};
pub use measure::{Measurement, Measurer};
pub use options::{
    DEFAULT_EXPECTED_ITEM_HEIGHT, DEFAULT_IS_SCROLLING_RESET_DELAY_MS, VirtualListOptions,
};
pub use reconcile::{ModelChanges, Move, Patch, diff_models, reconcile};
pub use render::{
    Disposer, ElementSlot, ItemComponent, RenderCache, RenderOutput, Rendered, RenderedEntry,
};
pub use scroll::ScrollTracker;
pub use state::{ScrollState, ViewportState};
pub use types::{Model, RenderedItem, ScrollDirection};
