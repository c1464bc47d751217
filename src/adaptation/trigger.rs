use crate::regime::score::sanitize_score;

/// Boundaries whose crossing flips the regime label bear/sideways/bull,
/// so they trigger adaptation regardless of the size of the move.
pub const KEY_BOUNDARIES: [f64; 3] = [-0.33, 0.0, 0.33];

/// Default magnitude threshold for [`should_adapt`].
pub const DEFAULT_ADAPT_THRESHOLD: f64 = 0.1;

/// Whether consumers should recompute their parameters after the score
/// moved from `last` to `current`.
pub fn should_adapt(current: f64, last: f64, threshold: f64) -> bool {
    let current = sanitize_score(current);
    let last = sanitize_score(last);

    if threshold.is_finite() && (current - last).abs() > threshold {
        return true;
    }
    crossed_boundary(current, last).is_some()
}

/// First key boundary `k` with `last < k <= current` or `last > k >= current`.
pub fn crossed_boundary(current: f64, last: f64) -> Option<f64> {
    let current = sanitize_score(current);
    let last = sanitize_score(last);
    KEY_BOUNDARIES
        .iter()
        .copied()
        .find(|&k| (last < k && k <= current) || (last > k && k >= current))
}
