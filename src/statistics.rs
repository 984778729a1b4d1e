//! A simple statistics module with the aggregation helpers used across the estimation.

/// Weighted mean of `(value, weight)` pairs.
///
/// Returns `None` when there are no pairs or the weights add up to zero, in which case the
/// caller decides whether that is a default or a failure.
pub fn weighted_average(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    let (weighted_total, weight_total) = pairs
        .into_iter()
        .fold((0., 0.), |(weighted_total, weight_total), (value, weight)| {
            (weighted_total + value * weight, weight_total + weight)
        });

    if weight_total == 0. {
        None
    } else {
        Some(weighted_total / weight_total)
    }
}
