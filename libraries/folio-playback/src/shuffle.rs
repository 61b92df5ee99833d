//! Randomization for playlists and mashup clips
//!
//! - Fisher-Yates shuffle for "shuffle all"
//! - Uniform start offset for banner clips

use rand::Rng;
use std::time::Duration;

/// Unbiased in-place shuffle (Fisher-Yates)
///
/// For `i` from `len - 1` down to 1, swaps element `i` with a uniformly
/// random element in `0..=i`. Every permutation is equally likely.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Random clip start offset in `[0, max(0, duration - min_tail)]`
///
/// Leaves at least `min_tail` of material before the source's natural end
/// (or starts at zero when the source is shorter than that).
pub fn random_start_offset<R: Rng + ?Sized>(
    duration: Duration,
    min_tail: Duration,
    rng: &mut R,
) -> Duration {
    let latest = duration.saturating_sub(min_tail);
    if latest.is_zero() {
        return Duration::ZERO;
    }

    latest.mul_f64(rng.gen::<f64>()).min(latest)
}
