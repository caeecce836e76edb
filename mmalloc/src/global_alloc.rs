//! [`GlobalAlloc`] implementation, for using this allocator as the
//! process's `#[global_allocator]` from ordinary Rust code.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr;

use crate::global;

/// Installable as `#[global_allocator]`. Ignores `layout.align()` beyond
/// [`mmalloc_core::MEM_UNIT`] — every block this engine hands out is
/// 8-byte aligned, never more.
pub struct MmapAlloc;

unsafe impl GlobalAlloc for MmapAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        global::allocate(layout.size()).map_or(ptr::null_mut(), |p| p.as_ptr())
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        if let Some(ptr) = core::ptr::NonNull::new(ptr) {
            unsafe { global::release(ptr) };
        }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        global::zeroed_allocate(1, layout.size()).map_or(ptr::null_mut(), |p| p.as_ptr())
    }

    unsafe fn realloc(&self, ptr: *mut u8, _layout: Layout, new_size: usize) -> *mut u8 {
        let Some(ptr) = core::ptr::NonNull::new(ptr) else {
            return global::allocate(new_size).map_or(ptr::null_mut(), |p| p.as_ptr());
        };
        unsafe { global::resize(ptr, new_size) }.map_or(ptr::null_mut(), |p| p.as_ptr())
    }
}
