//! `extern "C"` surface, drop-in compatible with the platform's
//! `malloc`/`free`/`calloc`/`realloc`.

use core::ffi::c_void;
use core::ptr::NonNull;

use crate::global;

/// # Safety
/// Matches the C `malloc` contract: the returned pointer, if non-null,
/// must eventually be passed to [`free`] (or [`realloc`]) exactly once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn malloc(size: usize) -> *mut c_void {
    global::allocate(size).map_or(core::ptr::null_mut(), |p| p.as_ptr().cast())
}

/// # Safety
/// `ptr` must be `NULL` or a pointer previously returned by [`malloc`],
/// [`calloc`] or [`realloc`], not already freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn free(ptr: *mut c_void) {
    let Some(ptr) = NonNull::new(ptr.cast::<u8>()) else {
        return;
    };
    unsafe { global::release(ptr) };
}

/// # Safety
/// Matches the C `calloc` contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn calloc(nmemb: usize, size: usize) -> *mut c_void {
    global::zeroed_allocate(nmemb, size).map_or(core::ptr::null_mut(), |p| p.as_ptr().cast())
}

/// # Safety
/// `ptr` must be `NULL` or a pointer previously returned by [`malloc`],
/// [`calloc`] or [`realloc`], not already freed. Matches the C
/// `realloc` contract, except that on failure `ptr` is no longer
/// valid — a deliberate divergence from POSIX, preserved from the
/// allocator this crate is modeled on.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn realloc(ptr: *mut c_void, size: usize) -> *mut c_void {
    let Some(ptr) = NonNull::new(ptr.cast::<u8>()) else {
        return global::allocate(size).map_or(core::ptr::null_mut(), |p| p.as_ptr().cast());
    };
    unsafe { global::resize(ptr, size) }.map_or(core::ptr::null_mut(), |p| p.as_ptr().cast())
}
