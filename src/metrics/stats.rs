//! Stateless statistics over a slice of observations.
//!
//! Every sampled metric (live or frozen) funnels its read path through these
//! functions so both variants report identical numbers for identical values.
//! An empty slice yields zero for every statistic.

/// Largest value in `values`, or 0 when empty.
pub fn max(values: &[i64]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    // Seeded from i64::MIN so all-negative input is reported correctly.
    let mut max = i64::MIN;
    for &v in values {
        if max < v {
            max = v;
        }
    }
    max
}

/// Smallest value in `values`, or 0 when empty.
pub fn min(values: &[i64]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    let mut min = i64::MAX;
    for &v in values {
        if min > v {
            min = v;
        }
    }
    min
}

/// Sum of `values`. Overflow wraps rather than aborting the caller.
pub fn sum(values: &[i64]) -> i64 {
    values.iter().fold(0i64, |acc, &v| acc.wrapping_add(v))
}

pub fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) as f64 / values.len() as f64
}

/// Population variance of `values`.
pub fn variance(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let mut total = 0.0;
    for &v in values {
        let d = v as f64 - m;
        total += d * d;
    }
    total / values.len() as f64
}

pub fn std_dev(values: &[i64]) -> f64 {
    variance(values).sqrt()
}

pub fn percentile(values: &[i64], p: f64) -> f64 {
    percentiles(values, &[p])[0]
}

/// Arbitrary percentiles (`p` in `[0, 1]`) of `values`.
///
/// Sorts a private copy and interpolates linearly at position
/// `p * (len + 1)`: below 1 clamps to the minimum, at or past `len` clamps
/// to the maximum. The result always has `ps.len()` entries, all zero when
/// `values` is empty.
pub fn percentiles(values: &[i64], ps: &[f64]) -> Vec<f64> {
    let mut scores = vec![0.0; ps.len()];
    let size = values.len();
    if size == 0 {
        return scores;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    for (score, &p) in scores.iter_mut().zip(ps) {
        let pos = p * (size + 1) as f64;
        *score = if pos.is_nan() || pos < 1.0 {
            sorted[0] as f64
        } else if pos >= size as f64 {
            sorted[size - 1] as f64
        } else {
            let idx = pos as usize;
            let lower = sorted[idx - 1] as f64;
            let upper = sorted[idx] as f64;
            lower + (pos - pos.floor()) * (upper - lower)
        };
    }
    scores
}
