//! Descriptive statistics used by the chart routines.
//!
//! Everything here works on plain slices; `None` means the statistic is
//! undefined for the input (empty, constant or mismatched series).

use std::collections::BTreeMap;

use serde::Serialize;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(sum / values.len() as f64)
}

/// Mean of `value` for every distinct `key` among `rows`.
pub fn group_means<T, K, FK, FV>(rows: &[T], key: FK, value: FV) -> BTreeMap<K, f64>
where
    K: Ord,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> f64,
{
    let mut sums: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = sums.entry(key(row)).or_insert((0.0, 0));
        entry.0 += value(row);
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(k, (sum, count))| (k, sum / count as f64))
        .collect()
}

/// Quantile with linear interpolation between the closest ranks, i.e. the
/// value at position `(n - 1) * q` of the sorted data. NaNs are skipped.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let position = (sorted.len() - 1) as f64 * q;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    let fraction = position - below as f64;
    Some(sorted[below] + (sorted[above] - sorted[below]) * fraction)
}

/// Boxplot fences: anything strictly outside `[lower, upper]` is an outlier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Fences {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Fences {
    /// Tukey fences at `k` interquartile ranges beyond the quartiles.
    pub fn tukey(values: &[f64], k: f64) -> Option<Fences> {
        let q1 = quantile(values, 0.25)?;
        let q3 = quantile(values, 0.75)?;
        let iqr = q3 - q1;
        Some(Fences {
            q1,
            q3,
            lower: q1 - k * iqr,
            upper: q3 + k * iqr,
        })
    }

    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Flags each value lying outside the Tukey fences. Empty input gives an
/// empty mask.
pub fn outlier_mask(values: &[f64], k: f64) -> Vec<bool> {
    match Fences::tukey(values, k) {
        Some(fences) => values.iter().map(|v| fences.is_outlier(*v)).collect(),
        None => vec![false; values.len()],
    }
}

/// Sum of products of deviations from the means.
fn co_deviation(xs: &[f64], ys: &[f64], mean_x: f64, mean_y: f64) -> f64 {
    xs.iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum()
}

/// Pearson product-moment correlation coefficient.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mean_x = mean(xs)?;
    let mean_y = mean(ys)?;

    let covariance = co_deviation(xs, ys, mean_x, mean_y);
    let var_x = co_deviation(xs, xs, mean_x, mean_x);
    let var_y = co_deviation(ys, ys, mean_y, mean_y);
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(covariance / (var_x * var_y).sqrt())
}

/// `y = slope * x + intercept`
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Ordinary least squares fit of `ys` against `xs`.
    pub fn least_squares(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
        if xs.len() != ys.len() || xs.len() < 2 {
            return None;
        }
        let mean_x = mean(xs)?;
        let mean_y = mean(ys)?;

        let var_x = co_deviation(xs, xs, mean_x, mean_x);
        if var_x == 0.0 {
            return None;
        }
        let slope = co_deviation(xs, ys, mean_x, mean_y) / var_x;
        Some(LinearFit {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn mean_of_empty_is_undefined() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn group_means_partitions_by_key() {
        let rows = [("a", 1.0), ("b", 10.0), ("a", 3.0), ("b", 20.0), ("c", 5.0)];
        let means = group_means(&rows, |r| r.0, |r| r.1);
        assert_eq!(means.len(), 3);
        assert_eq!(means["a"], 2.0);
        assert_eq!(means["b"], 15.0);
        assert_eq!(means["c"], 5.0);
    }

    #[test]
    fn quantile_interpolates_between_ranks() {
        let values = [7.0, 1.0, 3.0, 5.0];
        // Sorted: 1 3 5 7, position 0.75 and 2.25.
        assert!(close(quantile(&values, 0.25).unwrap(), 2.5));
        assert!(close(quantile(&values, 0.75).unwrap(), 5.5));
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(7.0));
        assert_eq!(quantile(&values, 1.5), None);
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[f64::NAN, 4.0], 0.5), Some(4.0));
    }

    #[test]
    fn tukey_fences_flag_extremes() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let fences = Fences::tukey(&values, 1.5).unwrap();
        assert!(close(fences.q1, 3.25));
        assert!(close(fences.q3, 7.75));
        assert!(close(fences.lower, 3.25 - 1.5 * 4.5));
        assert!(close(fences.upper, 7.75 + 1.5 * 4.5));

        let mask = outlier_mask(&values, 1.5);
        assert_eq!(mask.iter().filter(|m| **m).count(), 1);
        assert!(mask[9]);
    }

    #[test]
    fn fence_boundaries_are_not_outliers() {
        let fences = Fences {
            q1: 0.0,
            q3: 1.0,
            lower: -1.5,
            upper: 2.5,
        };
        assert!(!fences.is_outlier(-1.5));
        assert!(!fences.is_outlier(2.5));
        assert!(fences.is_outlier(2.500001));
    }

    #[test]
    fn outlier_mask_of_empty_input_is_empty() {
        assert!(outlier_mask(&[], 1.5).is_empty());
    }

    #[test]
    fn pearson_of_perfect_lines() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!(close(pearson(&xs, &[2.0, 4.0, 6.0, 8.0]).unwrap(), 1.0));
        assert!(close(pearson(&xs, &[8.0, 6.0, 4.0, 2.0]).unwrap(), -1.0));
    }

    #[test]
    fn pearson_matches_hand_computation() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 4.0, 5.0, 4.0, 5.0];
        // cov = 6, var_x = 10, var_y = 6
        assert!(close(pearson(&xs, &ys).unwrap(), 6.0 / 60f64.sqrt()));
    }

    #[test]
    fn pearson_is_undefined_for_degenerate_input() {
        assert_eq!(pearson(&[1.0, 2.0], &[3.0]), None);
        assert_eq!(pearson(&[1.0], &[3.0]), None);
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn least_squares_recovers_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.5 * x - 1.0).collect();
        let fit = LinearFit::least_squares(&xs, &ys).unwrap();
        assert!(close(fit.slope, 2.5));
        assert!(close(fit.intercept, -1.0));
        assert!(close(fit.predict(10.0), 24.0));
    }

    #[test]
    fn least_squares_of_noisy_points() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 4.0, 5.0, 4.0, 5.0];
        let fit = LinearFit::least_squares(&xs, &ys).unwrap();
        assert!(close(fit.slope, 0.6));
        assert!(close(fit.intercept, 2.2));
    }

    #[test]
    fn least_squares_needs_varying_x() {
        assert_eq!(LinearFit::least_squares(&[2.0, 2.0], &[1.0, 5.0]), None);
        assert_eq!(LinearFit::least_squares(&[], &[]), None);
    }
}
