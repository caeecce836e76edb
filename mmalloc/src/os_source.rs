//! [`MemorySource`] backed by `mmap`.

use core::ptr::NonNull;
use log::error;
use mmalloc_core::{AllocError, MemorySource};

/// New regions are acquired this many pages at a time, so a run of many
/// small allocations doesn't turn into a `mmap` call each.
const PAGES_PER_REGION: usize = 32;

/// Requests anonymous, private mappings from the OS. Never unmapped:
/// this engine only ever grows — freed blocks go back to a bucket, not
/// back to the kernel.
pub struct OsSource;

impl MemorySource for OsSource {
    fn granularity(&self) -> usize {
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGE_SIZE) };
        page_size.max(1) as usize * PAGES_PER_REGION
    }

    fn acquire(&mut self, len: usize) -> Result<NonNull<u8>, AllocError> {
        let ptr = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            error!("mmap({len}) failed: {}", std::io::Error::last_os_error());
            return Err(AllocError::OutOfMemory);
        }
        Ok(unsafe { NonNull::new_unchecked(ptr.cast()) })
    }
}
