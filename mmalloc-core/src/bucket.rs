//! Maps a normalized block size to one of [`NUM_BUCKETS`] free-list
//! buckets.

/// Total number of buckets: 128 exact-size buckets covering `[0, 1024)`
/// plus 38 log-ranged buckets covering `[1024, 2^48)`.
pub const NUM_BUCKETS: usize = 166;

/// Sizes below this threshold get one bucket per 8-byte step.
const EXACT_THRESHOLD: u64 = 1024;
/// `EXACT_THRESHOLD / MEM_UNIT`, and also `log2(EXACT_THRESHOLD)`.
const EXACT_BUCKETS: usize = (EXACT_THRESHOLD / 8) as usize;
const EXACT_LOG2: u32 = 10;

/// Bucket index for a (post-normalization) block size `s`.
///
/// - `s < 1024`: bucket `s / 8`, one exact size per bucket (0..127).
/// - `s >= 1024`: bucket `128 + (floor(log2(s)) - 10)`, each bucket
///   covering the 8-aligned sizes in `[2^L, 2^(L+1))`. Bucket 165 covers
///   `[2^47, 2^48)`, the ceiling of the supported address space.
#[must_use]
pub fn bucket_index(s: u64) -> usize {
    if s < EXACT_THRESHOLD {
        return (s / 8) as usize;
    }
    let log2 = 63 - s.leading_zeros();
    (EXACT_BUCKETS + (log2 - EXACT_LOG2) as usize).min(NUM_BUCKETS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_buckets_cover_one_size_each() {
        assert_eq!(bucket_index(0), 0);
        assert_eq!(bucket_index(8), 1);
        assert_eq!(bucket_index(1016), 127);
    }

    #[test]
    fn ranged_buckets_start_at_1024() {
        assert_eq!(bucket_index(1024), 128);
        assert_eq!(bucket_index(2032), 128);
        assert_eq!(bucket_index(2040), 128);
        assert_eq!(bucket_index(2048), 129);
    }

    #[test]
    fn bucket_boundaries_follow_log2_ranges() {
        for (size, expected) in [(4095u64, 129), (4096, 130), (8191, 130), (8192, 131)] {
            assert_eq!(bucket_index(size), expected, "size={size}");
        }
    }

    #[test]
    fn last_bucket_covers_top_of_address_space() {
        assert_eq!(bucket_index(1u64 << 47), 165);
        assert_eq!(bucket_index((1u64 << 48) - 8), 165);
    }
}
