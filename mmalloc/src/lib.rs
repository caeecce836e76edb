//! A drop-in `malloc` family replacement, backed by `mmap` and the
//! segregated free-list engine in [`mmalloc_core`].
//!
//! Three ways in:
//! * [`c_abi`] — `extern "C" fn malloc/free/calloc/realloc`, for linking
//!   this crate in place of the system allocator from C or via
//!   `LD_PRELOAD`.
//! * [`global_alloc::MmapAlloc`] — a [`core::alloc::GlobalAlloc`] for use
//!   as `#[global_allocator]` in a Rust binary.
//! * [`global`] — the safe Rust functions both of the above are built on.
//!
//! All three share one process-wide [`mmalloc_core::Engine`] instance; see
//! [`global`] for why that is safe without a lock.

pub mod c_abi;
pub mod global;
pub mod global_alloc;
mod os_source;

pub use global_alloc::MmapAlloc;
pub use mmalloc_core::AllocError;
