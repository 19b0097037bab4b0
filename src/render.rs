use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::key::IdMap;
use crate::Model;

/// Releases whatever the host allocated for a rendered item. Invoked exactly once.
pub type Disposer = Box<dyn FnOnce()>;

/// The item-render callback: `(model, index, element slot) -> rendered output`.
///
/// The component binds the measurable element of the output into the slot (if it has one).
pub type ItemComponent<M, O, E> = Arc<dyn Fn(&Arc<M>, usize, &mut ElementSlot<E>) -> Rendered<O>>;

/// In-place update path for reused outputs.
pub trait RenderOutput<M: ?Sized> {
    /// Receives a new snapshot of the model the output was created for (same id).
    fn update_model(&mut self, model: &Arc<M>);
}

/// What an item component returns.
pub struct Rendered<O> {
    pub output: O,
    pub disposer: Option<Disposer>,
}

impl<O> Rendered<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            disposer: None,
        }
    }

    pub fn with_disposer(mut self, disposer: impl FnOnce() + 'static) -> Self {
        self.disposer = Some(Box::new(disposer));
        self
    }
}

impl<O: fmt::Debug> fmt::Debug for Rendered<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rendered")
            .field("output", &self.output)
            .field("has_disposer", &self.disposer.is_some())
            .finish()
    }
}

/// Receives the measurable element of a freshly rendered item.
#[derive(Debug)]
pub struct ElementSlot<E> {
    element: Option<E>,
}

impl<E> ElementSlot<E> {
    pub(crate) fn new() -> Self {
        Self { element: None }
    }

    pub fn bind(&mut self, element: E) {
        self.element = Some(element);
    }

    pub fn is_bound(&self) -> bool {
        self.element.is_some()
    }

    pub(crate) fn take(&mut self) -> Option<E> {
        self.element.take()
    }
}

/// A live rendered item owned by a [`RenderCache`].
pub struct RenderedEntry<M: ?Sized, O, E> {
    model: Arc<M>,
    output: O,
    element: Option<E>,
    disposer: Option<Disposer>,
}

impl<M: ?Sized, O, E> RenderedEntry<M, O, E> {
    /// The model snapshot last pushed into the output.
    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn element(&self) -> Option<&E> {
        self.element.as_ref()
    }

    fn dispose(mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer();
        }
    }
}

impl<M: ?Sized + fmt::Debug, O: fmt::Debug, E: fmt::Debug> fmt::Debug for RenderedEntry<M, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedEntry")
            .field("model", &self.model)
            .field("output", &self.output)
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

/// One generation of rendered items, keyed by id.
///
/// Every recompute builds a fresh cache and moves the reusable entries over from the previous
/// one with [`RenderCache::take_item_from`]; whatever is left in the previous cache is then
/// disposed. Dropping a cache disposes its remaining entries.
pub struct RenderCache<M: Model, O, E> {
    entries: IdMap<M::Id, RenderedEntry<M, O, E>>,
    // May still list ids taken by a newer generation; lookups skip them.
    order: Vec<M::Id>,
}

impl<M: Model, O, E> RenderCache<M, O, E> {
    pub fn new() -> Self {
        Self {
            entries: IdMap::new(),
            order: Vec::new(),
        }
    }

    pub fn has(&self, id: &M::Id) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &M::Id) -> Option<&RenderedEntry<M, O, E>> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `model` is a different snapshot than the one rendered under its id.
    ///
    /// Unknown ids are not considered changed.
    pub fn is_model_changed(&self, model: &Arc<M>) -> bool {
        self.entries
            .get(&model.id())
            .is_some_and(|entry| !Arc::ptr_eq(&entry.model, model))
    }

    /// Pushes `model` into the existing output for its id. Returns `false` for unknown ids.
    pub fn update_model(&mut self, model: &Arc<M>) -> bool
    where
        O: RenderOutput<M>,
    {
        let Some(entry) = self.entries.get_mut(&model.id()) else {
            return false;
        };
        entry.output.update_model(model);
        entry.model = Arc::clone(model);
        true
    }

    /// Moves the entry for `id` out of `source` into this cache.
    ///
    /// The entry is no longer owned by `source`, so `source` will not dispose it.
    pub fn take_item_from(&mut self, id: &M::Id, source: &mut Self) -> bool {
        let Some(entry) = source.entries.remove(id) else {
            return false;
        };
        self.insert(id.clone(), entry);
        true
    }

    /// Creates a new entry for `model` by calling the item component.
    pub fn render<F>(
        &mut self,
        model: &Arc<M>,
        index: usize,
        component: F,
    ) -> &RenderedEntry<M, O, E>
    where
        F: FnOnce(&Arc<M>, usize, &mut ElementSlot<E>) -> Rendered<O>,
    {
        let mut slot = ElementSlot::new();
        let rendered = component(model, index, &mut slot);
        let id = model.id();
        self.insert(
            id.clone(),
            RenderedEntry {
                model: Arc::clone(model),
                output: rendered.output,
                element: slot.take(),
                disposer: rendered.disposer,
            },
        );
        &self.entries[&id]
    }

    fn insert(&mut self, id: M::Id, entry: RenderedEntry<M, O, E>) {
        let prev = self.entries.insert(id.clone(), entry);
        debug_assert!(
            prev.is_none(),
            "RenderCache: duplicate id {id:?} in one generation"
        );
        match prev {
            Some(prev) => {
                vwarn!(?id, "RenderCache: duplicate id in one generation");
                prev.dispose();
            }
            None => self.order.push(id),
        }
    }

    /// Rendered outputs in the order they were added.
    pub fn items(&self) -> impl Iterator<Item = &O> + '_ {
        self.entries().map(|(_, entry)| entry.output())
    }

    /// Live entries in the order they were added.
    pub fn entries(&self) -> impl Iterator<Item = (&M::Id, &RenderedEntry<M, O, E>)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|entry| (id, entry)))
    }

    /// Disposes every remaining entry exactly once and empties the cache.
    pub fn dispose(&mut self) -> usize {
        let mut disposed = 0usize;
        for id in core::mem::take(&mut self.order) {
            if let Some(entry) = self.entries.remove(&id) {
                entry.dispose();
                disposed += 1;
            }
        }
        debug_assert!(self.entries.is_empty(), "RenderCache: entries without order");
        disposed
    }
}

impl<M: Model, O, E> Default for RenderCache<M, O, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model, O, E> Drop for RenderCache<M, O, E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<M: Model, O, E> fmt::Debug for RenderCache<M, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCache")
            .field("ids", &self.order)
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}
