//! Comparative timing harness: runs the same calloc/realloc/free cycle
//! against the system allocator and against [`mmalloc`], back to back.
//!
//! ```text
//! mmalloc-bench [--pointers N] [--cycles N] [--max-block-size N]
//! ```

use log::info;
use rand::Rng;
use std::ffi::c_void;
use std::time::Instant;

struct Args {
    pointers: usize,
    cycles: usize,
    max_block_size: usize,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            pointers: 1 << 10,
            cycles: 1 << 10,
            max_block_size: 1 << 12,
        }
    }
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let mut next_usize = || {
            it.next()
                .unwrap_or_else(|| panic!("{flag} requires a value"))
                .parse::<usize>()
                .unwrap_or_else(|e| panic!("{flag}: {e}"))
        };
        match flag.as_str() {
            "--pointers" => args.pointers = next_usize(),
            "--cycles" => args.cycles = next_usize(),
            "--max-block-size" => args.max_block_size = next_usize(),
            other => panic!("unrecognized flag: {other}"),
        }
    }
    args
}

/// One calloc/realloc/free cycle over `args.pointers` live blocks,
/// repeated `args.cycles` times, using the given allocation functions.
unsafe fn benchmark(
    args: &Args,
    calloc: unsafe extern "C" fn(usize, usize) -> *mut c_void,
    realloc: unsafe extern "C" fn(*mut c_void, usize) -> *mut c_void,
    free: unsafe extern "C" fn(*mut c_void),
) -> f64 {
    let mut rng = rand::thread_rng();
    let mut pointers = vec![std::ptr::null_mut::<c_void>(); args.pointers];

    let start = Instant::now();
    for _ in 0..args.cycles {
        for p in &mut pointers {
            *p = unsafe { calloc(1, rng.gen_range(0..args.max_block_size)) };
        }
        for p in &mut pointers {
            *p = unsafe { realloc(*p, rng.gen_range(0..args.max_block_size)) };
        }
        for p in &pointers {
            unsafe { free(*p) };
        }
    }
    start.elapsed().as_secs_f64()
}

extern "C" fn system_calloc(nmemb: usize, size: usize) -> *mut c_void {
    unsafe { libc::calloc(nmemb, size) }
}

extern "C" fn system_realloc(ptr: *mut c_void, size: usize) -> *mut c_void {
    unsafe { libc::realloc(ptr, size) }
}

extern "C" fn system_free(ptr: *mut c_void) {
    unsafe { libc::free(ptr) };
}

fn main() {
    env_logger::init();
    let args = parse_args();
    info!(
        "pointers={} cycles={} max_block_size={}",
        args.pointers, args.cycles, args.max_block_size
    );

    println!("*** Benchmarking system memory allocation functions ***");
    let system_secs =
        unsafe { benchmark(&args, system_calloc, system_realloc, system_free) };
    println!("Completed in {system_secs:.6} seconds");

    println!();
    println!("*** Benchmarking mmalloc ***");
    let mmalloc_secs = unsafe {
        benchmark(
            &args,
            mmalloc::c_abi::calloc,
            mmalloc::c_abi::realloc,
            mmalloc::c_abi::free,
        )
    };
    println!("Completed in {mmalloc_secs:.6} seconds");
}
