pub const DEFAULT_WINDOW: usize = 5;

/// Centered moving average.
///
/// Position `i` averages the usable values in
/// `[i - floor(w / 2), i + ceil(w / 2))`, clipped to the slice. Windows with no
/// usable value yield `None`. A zero window yields an empty vector.
pub fn moving_average<T>(data: &[T], window_size: usize) -> Vec<Option<f64>>
where
    T: Copy + Into<Option<f64>>,
{
    if window_size < 1 {
        return Vec::new();
    }

    let behind = window_size / 2;
    let ahead = window_size.div_ceil(2);

    (0..data.len())
        .map(|index| {
            let start = index.saturating_sub(behind);
            let end = (index + ahead).min(data.len());
            window_mean(&data[start..end])
        })
        .collect()
}

fn window_mean<T>(window: &[T]) -> Option<f64>
where
    T: Copy + Into<Option<f64>>,
{
    let (sum, count) = window
        .iter()
        .filter_map(|&value| value.into())
        .filter(|value: &f64| !value.is_nan())
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

    (count > 0).then(|| sum / count as f64)
}
