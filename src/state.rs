/// A lightweight, serializable snapshot of the scroll container geometry.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportState {
    /// Scroll offset of the root element.
    pub scroll_position: u64,
    /// Client size of the root element in the scroll axis.
    pub viewport_size: u32,
    /// Offset of the content element from the root (static content above the list).
    pub content_offset: u32,
}

impl ViewportState {
    pub fn new(scroll_position: u64, viewport_size: u32, content_offset: u32) -> Self {
        Self {
            scroll_position,
            viewport_size,
            content_offset,
        }
    }

    pub fn viewport_end(&self) -> u64 {
        self.scroll_position
            .saturating_add(self.viewport_size as u64)
    }
}

/// A lightweight, serializable snapshot of the scrolling activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub position: u64,
    pub is_scrolling: bool,
}
