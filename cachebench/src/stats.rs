use serde::{Deserialize, Serialize};

/// Arithmetic mean, `None` for no values.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (corrected, dividing by `n - 1`). A single
/// value has no spread, so its standard deviation is 0.
pub fn stddev(values: &[f64]) -> Option<f64> {
    deviation(values, 1)
}

/// Population standard deviation (dividing by `n`).
pub fn population_stddev(values: &[f64]) -> Option<f64> {
    deviation(values, 0)
}

fn deviation(values: &[f64], ddof: usize) -> Option<f64> {
    let mean = mean(values)?;
    let count = values.len();
    if count <= ddof {
        return Some(0.0);
    }
    let sum: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
    Some((sum / (count - ddof) as f64).sqrt())
}

/// Percentile `p` (between 0 and 100) with linear interpolation between the
/// two closest ranks.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    let sorted = sorted(values);
    percentile_of_sorted(&sorted, p)
}

fn percentile_of_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let p = p.clamp(0.0, 100.0);
    let index = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    let fraction = index - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Coefficient of variation in percent (sample standard deviation over the
/// mean). `None` if the mean is not positive.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    cv(mean(values)?, stddev(values)?)
}

/// Same as `coefficient_of_variation` but with the population standard
/// deviation.
pub fn population_coefficient_of_variation(values: &[f64]) -> Option<f64> {
    cv(mean(values)?, population_stddev(values)?)
}

fn cv(mean: f64, stddev: f64) -> Option<f64> {
    if mean > 0.0 {
        Some(stddev / mean * 100.0)
    } else {
        None
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Descriptive statistics of a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Summary {
    pub fn new(values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        let mean = mean(&sorted)?;
        let stddev = stddev(&sorted)?;
        Some(Self {
            count: sorted.len(),
            mean,
            stddev,
            min: sorted[0],
            p25: percentile_of_sorted(&sorted, 25.0)?,
            median: percentile_of_sorted(&sorted, 50.0)?,
            p75: percentile_of_sorted(&sorted, 75.0)?,
            max: sorted[sorted.len() - 1],
        })
    }

    /// Standard error of the mean.
    pub fn sem(&self) -> f64 {
        self.stddev / (self.count as f64).sqrt()
    }

    /// Coefficient of variation in percent.
    pub fn cv(&self) -> Option<f64> {
        cv(self.mean, self.stddev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty() {
        assert_eq!(mean(&[]), None);
        assert_eq!(stddev(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(Summary::new(&[]), None);
        assert_eq!(coefficient_of_variation(&[]), None);
    }

    #[test]
    fn single_run_has_no_deviation() {
        let summary = Summary::new(&[42.0]).expect("one value");
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean, 42.0);
        assert_eq!(summary.stddev, 0.0);
        assert_eq!(summary.sem(), 0.0);
        assert_eq!(summary.median, 42.0);
        assert_eq!(summary.cv(), Some(0.0));
    }

    #[test]
    fn deviations() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), Some(5.0));
        assert_eq!(population_stddev(&values), Some(2.0));
        let sample = stddev(&values).expect("sample stddev");
        assert!(close(sample, (32.0f64 / 7.0).sqrt()));
        assert_eq!(population_coefficient_of_variation(&values), Some(40.0));
    }

    #[test]
    fn percentiles_interpolate() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 100.0), Some(4.0));
        assert_eq!(median(&values), Some(2.5));
        assert_eq!(percentile(&values, 25.0), Some(1.75));
        assert_eq!(percentile(&values, 75.0), Some(3.25));

        let summary = Summary::new(&values).expect("values");
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert_eq!(summary.p25, 1.75);
        assert_eq!(summary.p75, 3.25);
    }

    #[test]
    fn cv_needs_positive_mean() {
        assert_eq!(coefficient_of_variation(&[0.0, 0.0]), None);
        assert_eq!(coefficient_of_variation(&[-1.0, -3.0]), None);
        let cv = coefficient_of_variation(&[90.0, 110.0]).expect("cv");
        assert!(close(cv, 200f64.sqrt()));
    }

    #[test]
    fn min_max() {
        assert_eq!(min(&[3.0, 1.0, 2.0]), Some(1.0));
        assert_eq!(max(&[3.0, 1.0, 2.0]), Some(3.0));
        assert_eq!(max(&[]), None);
    }
}
