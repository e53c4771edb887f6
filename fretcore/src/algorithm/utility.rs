use ordered_float::OrderedFloat;

/// Keep the values whose mask entry is `true`; `mask` must have the length of `values`.
pub fn select_by_mask<T: Clone>(values: &[T], mask: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(mask.iter())
        .filter_map(|(v, keep)| keep.then(|| v.clone()))
        .collect()
}

/// Indices that sort `values` ascending. Ties keep their original order.
pub fn argsort(values: &[f64]) -> Vec<usize> {
    let mut index: Vec<usize> = (0..values.len()).collect();
    index.sort_by_key(|&i| OrderedFloat(values[i]));
    index
}

/// q-th percentile (0..=100) with linear interpolation between the closest ranks.
///
/// Returns `None` for an empty population.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by_key(|v| OrderedFloat(*v));

    let q = q.clamp(0.0, 100.0);
    let position = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Largest value or `None` when empty.
pub fn max_value(values: &[f64]) -> Option<f64> {
    values.iter().copied().map(OrderedFloat).max().map(|v| v.0)
}
