//! Segregated free-list allocator engine.
//!
//! This crate implements the allocation algorithm itself — block layout,
//! bucket indexing, free lists, region bookkeeping and the
//! allocate/release/resize operations — without assuming anything about
//! how memory is obtained from the OS or how the result is exposed to
//! callers. It is `no_std` and allocation-free: something has to provide
//! the allocator everything *else* grows out of, so this crate cannot
//! itself depend on a heap.
//!
//! Host crates plug in OS memory via [`engine::MemorySource`] and build
//! whatever public surface they need (a `GlobalAlloc`, a C ABI, ...) on
//! top of [`engine::Engine`].
#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod block;
pub mod bucket;
pub mod engine;
pub mod error;
pub mod freelist;
pub mod region;

pub use block::{Block, Header, FOOTER_SIZE, HEADER_SIZE, OVERHEAD};
pub use bucket::NUM_BUCKETS;
pub use engine::{Engine, MemorySource, MEM_UNIT, MIN_BLOCK_SIZE};
pub use error::AllocError;
pub use region::{Region, RegionTable, MAX_REGIONS};
