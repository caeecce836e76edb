/// Errors surfaced by the allocation engine.
///
/// There is no retry path: every failure here is terminal for the
/// operation that triggered it. The caller decides what "terminal" means
/// at its own layer (null pointer, last-error flag, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// The requested size was zero, or normalizing/rounding it overflowed
    /// the allocator's size domain.
    #[error("requested size is zero or overflows the allocator's size domain")]
    InvalidSize,
    /// The operating system refused to satisfy a mapping request, or the
    /// region table has reached its capacity.
    #[error("the operating system refused the mapping, or the region table is full")]
    OutOfMemory,
}
