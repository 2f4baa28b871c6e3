use crate::models::{Comparison, ImageStatistics};

/// Compare two images, deltas being `after - before`.
pub fn compare(before: &ImageStatistics, after: &ImageStatistics) -> Comparison {
    let before = before.summary();
    let after = after.summary();

    let layers_delta = delta(before.layers as u64, after.layers as u64);
    let compressed_delta = delta(before.compressed_size, after.compressed_size);
    let uncompressed_delta = delta(before.uncompressed_size, after.uncompressed_size);
    let savings_delta = (after.space_savings - before.space_savings) * 100.0;

    Comparison {
        before,
        after,
        layers_delta,
        compressed_delta,
        uncompressed_delta,
        savings_delta,
    }
}

/// `after - before`, clamped to the `i64` range.
fn delta(before: u64, after: u64) -> i64 {
    if after >= before {
        i64::try_from(after - before).unwrap_or(i64::MAX)
    } else {
        i64::try_from(before - after).map_or(i64::MIN, |d| -d)
    }
}
