use alloc::sync::Arc;

use crate::ItemId;

/// An item of the virtualized sequence.
///
/// Only the id matters to the engine; every other field is opaque. Ids must be unique within
/// one sequence.
pub trait Model {
    type Id: ItemId;

    fn id(&self) -> Self::Id;
}

impl<M: Model + ?Sized> Model for Arc<M> {
    type Id = M::Id;

    fn id(&self) -> Self::Id {
        (**self).id()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// Position metadata of a rendered item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderedItem<K> {
    pub id: K,
    /// Index in the model sequence.
    pub index: usize,
    /// Offset from the start of the content element (excludes the content offset).
    pub top: u64,
}
