/// Contract violations reported by the engine.
///
/// These are programming errors on the host side: the engine refuses the call and leaves its
/// state untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The scroll root must be bound (`set_root_element`) before the content element is bound
    /// or the scroll position is adjusted.
    #[error("scroll root element is not bound")]
    RootNotBound,
}
