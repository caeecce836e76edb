//! Ties buckets, blocks and regions together into the allocate, release
//! and resize operations.

use crate::block::{Block, OVERHEAD};
use crate::bucket::{bucket_index, NUM_BUCKETS};
use crate::error::AllocError;
use crate::freelist::Bucket;
use crate::region::RegionTable;
use core::ptr::NonNull;
use log::{trace, warn};

/// Granularity every block size is rounded up to.
pub const MEM_UNIT: u64 = 8;

/// Smallest possible block: header + two link words + footer. A block can
/// never be smaller than this, even for a zero-byte request, because a
/// free block must have room for its list links.
pub const MIN_BLOCK_SIZE: u64 = OVERHEAD + 16;

/// Supplies the engine with fresh OS-backed memory. Implemented by the
/// hosted crate (over `mmap`); kept generic here so this crate stays
/// `no_std` and free of any assumption about how memory is obtained.
pub trait MemorySource {
    /// The unit new acquisitions are rounded up to (conventionally a
    /// small multiple of the host's page size). Queried rather than
    /// hardcoded here, since a `no_std` engine has no portable way to
    /// ask the OS for its page size itself.
    fn granularity(&self) -> usize;

    /// Obtain at least `len` fresh, zeroed bytes from the OS.
    ///
    /// # Errors
    /// Returns `AllocError::OutOfMemory` if the OS refuses the request.
    fn acquire(&mut self, len: usize) -> Result<NonNull<u8>, AllocError>;
}

/// Round a requested payload size up to a valid block size (header +
/// footer + rounded payload, floored at [`MIN_BLOCK_SIZE`]).
///
/// # Errors
/// `AllocError::InvalidSize` if `requested` is zero or rounding would
/// overflow the 48-bit size domain.
pub fn normalize(requested: u64) -> Result<u64, AllocError> {
    if requested == 0 {
        return Err(AllocError::InvalidSize);
    }
    let rounded = requested
        .checked_add(MEM_UNIT - 1)
        .map(|v| v / MEM_UNIT * MEM_UNIT)
        .ok_or(AllocError::InvalidSize)?;
    let total = rounded.checked_add(OVERHEAD).ok_or(AllocError::InvalidSize)?;
    if total >= (1u64 << 48) {
        return Err(AllocError::InvalidSize);
    }
    Ok(total.max(MIN_BLOCK_SIZE))
}

/// The allocator engine: a region table and a bank of size buckets, plus
/// whatever `source` the host supplies for growing regions.
pub struct Engine<S: MemorySource> {
    regions: RegionTable,
    buckets: [Bucket; NUM_BUCKETS],
    initialized: bool,
    source: S,
}

impl<S: MemorySource> Engine<S> {
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            regions: RegionTable::new(),
            buckets: [const { Bucket::new() }; NUM_BUCKETS],
            initialized: false,
            source,
        }
    }

    /// Self-link every bucket's sentinel. Deferred until first use so the
    /// buckets array (which may live in a `static`) has reached its final
    /// address.
    fn ensure_initialized(&mut self) {
        if self.initialized {
            return;
        }
        for bucket in &mut self.buckets {
            bucket.init();
        }
        self.initialized = true;
    }

    /// Search buckets `from..NUM_BUCKETS` for the first block able to hold
    /// `size` bytes, removing it from its bucket on success.
    fn take_fit(&mut self, size: u64) -> Option<Block> {
        for idx in bucket_index(size)..NUM_BUCKETS {
            if let Some(block) = self.buckets[idx].find_fit(size) {
                unsafe { self.buckets[idx].remove(block) };
                return Some(block);
            }
        }
        None
    }

    /// Grow the heap by at least `size` bytes and return a single free
    /// block spanning the whole new region.
    fn acquire_region(&mut self, size: u64) -> Result<Block, AllocError> {
        let unit = self.source.granularity();
        let len = (size as usize).div_ceil(unit) * unit;
        let base = self.source.acquire(len)?;
        let region_id = self.regions.record(base.as_ptr() as usize, len)?;
        let block = unsafe { Block::at(base) };
        block.set_size(len as u64, region_id);
        Ok(block)
    }

    /// Carve `needed` bytes off the front of `block` and return the
    /// remainder to its bucket, if what's left over is itself a usable
    /// block. Otherwise the whole block is handed out as-is (bounded
    /// internal fragmentation).
    fn split_if_worthwhile(&mut self, block: Block, needed: u64) {
        let region_id = block.region_id();
        let remainder_size = block.size() - needed;
        if remainder_size < MIN_BLOCK_SIZE {
            return;
        }
        block.set_size(needed, region_id);
        let remainder = block.next_neighbor();
        remainder.set_size(remainder_size, region_id);
        trace!("split block of {} into {needed} + {remainder_size}", needed + remainder_size);
        self.buckets[bucket_index(remainder_size)].insert(remainder);
    }

    /// Allocate a block able to hold `requested` payload bytes, growing
    /// the heap via `source` if no free block fits.
    ///
    /// # Errors
    /// `AllocError::InvalidSize` for a zero or overflowing request,
    /// `AllocError::OutOfMemory` if the OS cannot supply more memory.
    pub fn allocate(&mut self, requested: u64) -> Result<NonNull<u8>, AllocError> {
        self.ensure_initialized();
        let size = normalize(requested)?;
        let block = match self.take_fit(size) {
            Some(block) => block,
            None => {
                let block = self.acquire_region(size)?;
                self.buckets[bucket_index(block.size())].insert(block);
                self.take_fit(size).expect("just inserted a block of this size")
            }
        };
        self.split_if_worthwhile(block, size);
        Ok(block.payload())
    }

    /// Release a previously allocated block back to its bucket, merging
    /// with free neighbors in the same region via the boundary tags.
    ///
    /// # Safety
    /// `payload` must be a pointer this engine previously returned from
    /// [`Engine::allocate`] or [`Engine::reallocate`], not already freed.
    pub unsafe fn release(&mut self, payload: NonNull<u8>) {
        let mut block = unsafe { Block::from_payload(payload) };
        let region = self.regions.get(block.region_id());

        let next_addr = block.addr().as_ptr() as usize + block.size() as usize;
        if next_addr < region.end {
            let next = block.next_neighbor();
            if next.is_free() {
                trace!("coalesce forward: {} + {}", block.size(), next.size());
                unsafe { self.buckets[bucket_index(next.size())].remove(next) };
                block.set_size(block.size() + next.size(), block.region_id());
            }
        }

        if block.addr().as_ptr() as usize > region.base {
            let prev = block.prev_neighbor();
            if prev.is_free() {
                trace!("coalesce backward: {} + {}", prev.size(), block.size());
                unsafe { self.buckets[bucket_index(prev.size())].remove(prev) };
                prev.set_size(prev.size() + block.size(), prev.region_id());
                block = prev;
            }
        }

        self.buckets[bucket_index(block.size())].insert(block);
    }

    /// Resize a previously allocated block, preserving its leading bytes
    /// up to `min(old_payload_len, new_requested)`.
    ///
    /// If `requested` still fits in the block's current usable size, this
    /// shrinks in place (via [`Engine::split_if_worthwhile`]) and returns
    /// the same payload pointer. Otherwise it allocates fresh, copies, and
    /// releases the old block — matching the historical `realloc`
    /// divergence this engine is modeled on: the old block is released
    /// even when the new allocation fails, rather than leaving it intact.
    ///
    /// # Safety
    /// `payload` must be a pointer this engine previously returned and
    /// not already freed.
    pub unsafe fn reallocate(
        &mut self,
        payload: NonNull<u8>,
        requested: u64,
    ) -> Result<NonNull<u8>, AllocError> {
        let old_block = unsafe { Block::from_payload(payload) };
        let old_payload_len = old_block.size() - crate::block::OVERHEAD;

        match normalize(requested) {
            Ok(size) if size <= old_block.size() => {
                self.split_if_worthwhile(old_block, size);
                Ok(payload)
            }
            Ok(_) => {
                warn!("resize growing {old_payload_len} -> {requested}: reallocating and copying");
                let result = self.allocate(requested);
                if let Ok(new_payload) = result {
                    let copy_len = old_payload_len.min(requested) as usize;
                    unsafe {
                        core::ptr::copy_nonoverlapping(
                            payload.as_ptr(),
                            new_payload.as_ptr(),
                            copy_len,
                        );
                    }
                }
                unsafe { self.release(payload) };
                result
            }
            Err(err) => {
                unsafe { self.release(payload) };
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::alloc::{alloc_zeroed, Layout};

    /// Hands out page-aligned, leaked `std` heap memory — good enough to
    /// exercise region/bucket/coalesce logic without an actual OS mapping.
    struct TestSource;

    impl MemorySource for TestSource {
        fn granularity(&self) -> usize {
            4096
        }

        fn acquire(&mut self, len: usize) -> Result<NonNull<u8>, AllocError> {
            let layout = Layout::from_size_align(len, self.granularity()).unwrap();
            let ptr = unsafe { alloc_zeroed(layout) };
            NonNull::new(ptr).ok_or(AllocError::OutOfMemory)
        }
    }

    #[test]
    fn normalize_rounds_up_and_adds_overhead() {
        assert_eq!(normalize(1).unwrap(), MIN_BLOCK_SIZE);
        assert_eq!(normalize(0), Err(AllocError::InvalidSize));
        assert_eq!(normalize(100).unwrap(), 104 + OVERHEAD);
    }

    #[test]
    fn allocate_then_release_reuses_memory() {
        let mut engine = Engine::new(TestSource);
        let a = engine.allocate(64).unwrap();
        unsafe { engine.release(a) };
        let b = engine.allocate(64).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn split_leaves_usable_remainder() {
        let mut engine = Engine::new(TestSource);
        let a = engine.allocate(16).unwrap();
        let b = engine.allocate(16).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn adjacent_frees_coalesce_back_to_one_block() {
        let mut engine = Engine::new(TestSource);
        let a = engine.allocate(32).unwrap();
        let b = engine.allocate(32).unwrap();
        unsafe {
            engine.release(a);
            engine.release(b);
        }
        let merged = engine.allocate(96).unwrap();
        assert_eq!(merged, a);
    }

    #[test]
    fn reallocate_copies_and_frees_old_block() {
        let mut engine = Engine::new(TestSource);
        let a = engine.allocate(8).unwrap();
        unsafe { a.as_ptr().write(0xAB) };
        let b = unsafe { engine.reallocate(a, 256).unwrap() };
        assert_eq!(unsafe { b.as_ptr().read() }, 0xAB);
    }

    #[test]
    fn reallocate_to_a_smaller_size_keeps_the_same_pointer() {
        let mut engine = Engine::new(TestSource);
        let a = engine.allocate(512).unwrap();
        unsafe { a.as_ptr().write(0xCD) };
        let b = unsafe { engine.reallocate(a, 8).unwrap() };
        assert_eq!(a, b);
        assert_eq!(unsafe { b.as_ptr().read() }, 0xCD);
    }

    #[test]
    fn allocate_huge_request_fails_without_panicking() {
        let mut engine = Engine::new(TestSource);
        assert_eq!(engine.allocate(u64::MAX), Err(AllocError::InvalidSize));
    }
}
