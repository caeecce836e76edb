//! The process-wide allocator instance and its safe Rust entry points.
//!
//! There is exactly one [`Engine`], reached through a single `static`.
//! Nothing here takes a lock: this allocator is single-threaded by
//! design, so callers are responsible for not calling into this crate
//! from more than one thread at a time, same as the reference `malloc`
//! it replaces.

use core::cell::UnsafeCell;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicU8, Ordering};
use log::trace;
use mmalloc_core::{AllocError, Engine};

use crate::os_source::OsSource;

struct GlobalEngine(UnsafeCell<Engine<OsSource>>);

// Safety: see module docs — single-threaded use is a caller obligation,
// not something this type enforces.
unsafe impl Sync for GlobalEngine {}

static ENGINE: GlobalEngine = GlobalEngine(UnsafeCell::new(Engine::new(OsSource)));

fn engine() -> &'static mut Engine<OsSource> {
    unsafe { &mut *ENGINE.0.get() }
}

const NO_ERROR: u8 = 0;
const INVALID_SIZE: u8 = 1;
const OUT_OF_MEMORY: u8 = 2;

static LAST_ERROR: AtomicU8 = AtomicU8::new(NO_ERROR);

fn record(result: Result<NonNull<u8>, AllocError>) -> Option<NonNull<u8>> {
    match result {
        Ok(ptr) => {
            LAST_ERROR.store(NO_ERROR, Ordering::Relaxed);
            Some(ptr)
        }
        Err(err) => {
            let code = match err {
                AllocError::InvalidSize => INVALID_SIZE,
                AllocError::OutOfMemory => OUT_OF_MEMORY,
            };
            LAST_ERROR.store(code, Ordering::Relaxed);
            None
        }
    }
}

/// The error from the most recently failed operation on this crate's
/// global allocator, if any. Cleared on the next successful call.
#[must_use]
pub fn last_error() -> Option<AllocError> {
    match LAST_ERROR.load(Ordering::Relaxed) {
        INVALID_SIZE => Some(AllocError::InvalidSize),
        OUT_OF_MEMORY => Some(AllocError::OutOfMemory),
        _ => None,
    }
}

/// Allocate `size` bytes, uninitialized.
#[must_use]
pub fn allocate(size: usize) -> Option<NonNull<u8>> {
    trace!("allocate({size})");
    record(engine().allocate(size as u64))
}

/// Allocate `count * size` bytes, zeroed, checking for overflow.
#[must_use]
pub fn zeroed_allocate(count: usize, size: usize) -> Option<NonNull<u8>> {
    let Some(total) = count.checked_mul(size) else {
        trace!("zeroed_allocate({count}, {size}) overflowed");
        LAST_ERROR.store(INVALID_SIZE, Ordering::Relaxed);
        return None;
    };
    trace!("zeroed_allocate({count}, {size})");
    let ptr = record(engine().allocate(total as u64))?;
    unsafe { ptr.as_ptr().write_bytes(0, total) };
    Some(ptr)
}

/// Resize a previously allocated block, preserving its leading bytes.
///
/// # Safety
/// `ptr` must be a live pointer previously returned by this module.
#[must_use]
pub unsafe fn resize(ptr: NonNull<u8>, new_size: usize) -> Option<NonNull<u8>> {
    trace!("resize({ptr:p}, {new_size})");
    record(unsafe { engine().reallocate(ptr, new_size as u64) })
}

/// Release a previously allocated block.
///
/// # Safety
/// `ptr` must be a live pointer previously returned by this module, and
/// must not be released twice.
pub unsafe fn release(ptr: NonNull<u8>) {
    trace!("release({ptr:p})");
    unsafe { engine().release(ptr) };
}
