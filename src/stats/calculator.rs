//! Statistics Calculator Module
//! Histogram binning, kernel density and correlation for the chart builders.

use rayon::prelude::*;
use statrs::distribution::{Continuous, Normal};
use statrs::statistics::Statistics;

/// Upper bound on automatic histogram bins.
pub const MAX_BINS: usize = 500;

/// Points on the evaluated density curve.
pub const KDE_GRID_POINTS: usize = 200;

/// One histogram bin over `[start, end)`; the last bin is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Handles the numeric work behind the charts.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Number of bins: the finer of Sturges and Freedman-Diaconis widths.
    pub fn auto_bin_count(values: &[f64]) -> usize {
        let n = values.len();
        if n == 0 {
            return 0;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let range = sorted[n - 1] - sorted[0];
        if range <= 0.0 {
            return 1;
        }

        let sturges_width = range / ((n as f64).log2() + 1.0);
        let iqr = Self::percentile(&sorted, 75.0) - Self::percentile(&sorted, 25.0);
        let fd_width = 2.0 * iqr / (n as f64).cbrt();

        let width = if fd_width > 0.0 {
            fd_width.min(sturges_width)
        } else {
            sturges_width
        };

        ((range / width).ceil() as usize).clamp(1, MAX_BINS)
    }

    /// Equal-width histogram covering the data range.
    pub fn histogram(values: &[f64]) -> Vec<HistogramBin> {
        let bins = Self::auto_bin_count(values);
        if bins == 0 {
            return Vec::new();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // A constant column gets one unit-wide bin centred on the value.
        let (start, end) = if max > min {
            (min, max)
        } else {
            (min - 0.5, max + 0.5)
        };
        let width = (end - start) / bins as f64;

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - start) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: start + i as f64 * width,
                end: start + (i + 1) as f64 * width,
                count,
            })
            .collect()
    }

    /// Gaussian kernel density with Scott's bandwidth, evaluated over the data range.
    ///
    /// Returns an empty curve when the bandwidth is degenerate
    /// (fewer than two values or zero variance).
    pub fn kde(values: &[f64], grid_points: usize) -> Vec<(f64, f64)> {
        let n = values.len();
        if n < 2 || grid_points < 2 {
            return Vec::new();
        }

        let bandwidth = values.iter().std_dev() * (n as f64).powf(-0.2);
        if !bandwidth.is_finite() || bandwidth <= 0.0 {
            return Vec::new();
        }

        let Ok(kernel) = Normal::new(0.0, 1.0) else {
            return Vec::new();
        };

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let step = (max - min) / (grid_points - 1) as f64;
        let norm = 1.0 / (n as f64 * bandwidth);

        (0..grid_points)
            .map(|i| {
                let x = min + i as f64 * step;
                let density = values
                    .iter()
                    .map(|&v| kernel.pdf((x - v) / bandwidth))
                    .sum::<f64>()
                    * norm;
                (x, density)
            })
            .collect()
    }

    /// Pearson correlation over rows where both values are present.
    pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
        let (a, b): (Vec<f64>, Vec<f64>) = xs
            .iter()
            .zip(ys)
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .unzip();

        let n = a.len();
        if n < 2 {
            return f64::NAN;
        }

        let mean_a = a.iter().sum::<f64>() / n as f64;
        let mean_b = b.iter().sum::<f64>() / n as f64;

        let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
        for (x, y) in a.iter().zip(&b) {
            let da = x - mean_a;
            let db = y - mean_b;
            cov += da * db;
            var_a += da * da;
            var_b += db * db;
        }

        if var_a == 0.0 || var_b == 0.0 {
            return f64::NAN;
        }
        (cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
    }

    /// Pairwise correlation matrix; the diagonal is fixed at 1.
    pub fn correlation_matrix(columns: &[Vec<Option<f64>>]) -> Vec<Vec<f64>> {
        let n = columns.len();
        (0..n)
            .into_par_iter()
            .map(|i| {
                (0..n)
                    .map(|j| {
                        if i == j {
                            1.0
                        } else {
                            Self::pearson(&columns[i], &columns[j])
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Mean of the values present in `values`.
    /// NaN when empty.
    pub fn mean(values: &[f64]) -> f64 {
        values.iter().mean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn percentile_interpolates_like_numpy() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(StatsCalculator::percentile(&sorted, 25.0), 1.75);
        assert_relative_eq!(StatsCalculator::percentile(&sorted, 50.0), 2.5);
        assert_relative_eq!(StatsCalculator::percentile(&sorted, 100.0), 4.0);
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|i| (i % 17) as f64).collect();
        let bins = StatsCalculator::histogram(&values);
        assert!(!bins.is_empty());
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_relative_eq!(bins[0].start, 0.0);
        assert_relative_eq!(bins[bins.len() - 1].end, 16.0, epsilon = 1e-9);
    }

    #[test]
    fn constant_values_fill_a_single_bin() {
        let bins = StatsCalculator::histogram(&[3.0, 3.0, 3.0]);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
        assert_relative_eq!(bins[0].start, 2.5);
        assert_relative_eq!(bins[0].end, 3.5);
    }

    #[test]
    fn sturges_bins_for_small_samples() {
        // n = 8: Sturges gives 4 bins; FD width is wider here.
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(StatsCalculator::auto_bin_count(&values), 4);
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let values: Vec<f64> = (0..50).map(|i| (i as f64 * 0.37).sin() * 3.0).collect();
        let curve = StatsCalculator::kde(&values, KDE_GRID_POINTS);
        assert_eq!(curve.len(), KDE_GRID_POINTS);
        assert!(curve.iter().all(|&(_, d)| d >= 0.0));

        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
            .sum();
        // Evaluated over the data range only, so some mass lies outside.
        assert!(area > 0.5 && area <= 1.0, "area = {area}");
    }

    #[test]
    fn kde_is_empty_for_constant_data() {
        assert!(StatsCalculator::kde(&[2.0, 2.0, 2.0], KDE_GRID_POINTS).is_empty());
        assert!(StatsCalculator::kde(&[2.0], KDE_GRID_POINTS).is_empty());
    }

    #[test]
    fn pearson_perfect_and_inverse() {
        let x = [Some(1.0), Some(2.0), Some(3.0)];
        let y = [Some(2.0), Some(4.0), Some(6.0)];
        let z = [Some(3.0), Some(2.0), Some(1.0)];
        assert_relative_eq!(StatsCalculator::pearson(&x, &y), 1.0, epsilon = 1e-12);
        assert_relative_eq!(StatsCalculator::pearson(&x, &z), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn pearson_skips_incomplete_rows() {
        let x = [Some(1.0), None, Some(2.0), Some(3.0)];
        let y = [Some(1.0), Some(100.0), Some(2.0), Some(3.0)];
        assert_relative_eq!(StatsCalculator::pearson(&x, &y), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let columns = vec![
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
            vec![Some(2.0), Some(1.0), Some(4.0), Some(3.0)],
            vec![Some(5.0), Some(5.0), Some(5.0), Some(5.0)],
        ];
        let m = StatsCalculator::correlation_matrix(&columns);
        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_relative_eq!(m[i][i], 1.0);
        }
        assert_relative_eq!(m[0][1], m[1][0]);
        assert_relative_eq!(m[0][1], 0.6, epsilon = 1e-12);
        assert!(m[0][2].is_nan());
    }

    #[test]
    fn mean_of_values_and_of_nothing() {
        assert_relative_eq!(StatsCalculator::mean(&[1.0, 2.0, 6.0]), 3.0);
        assert!(StatsCalculator::mean(&[]).is_nan());
    }
}
