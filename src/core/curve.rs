//! Growth curve families used to extrapolate cumulative case counts.
//!
//! Every fit is closed-form least squares over day indices, so the same
//! input always produces the same parameters.

use crate::core::{CurveKind, FittedCurve, GrowthCurve};

/// Capacity grid for the logistic search, as multiples of the observed maximum.
const CAPACITY_MIN_FACTOR: f64 = 1.01;
const CAPACITY_MAX_FACTOR: f64 = 1000.0;
const CAPACITY_STEPS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
struct LineFit {
    intercept: f64,
    slope: f64,
}

/// Ordinary least squares for y = intercept + slope * t.
fn least_squares(points: &[(f64, f64)]) -> Option<LineFit> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let sum_t: f64 = points.iter().map(|(t, _)| t).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_t2: f64 = points.iter().map(|(t, _)| t * t).sum();
    let sum_ty: f64 = points.iter().map(|(t, y)| t * y).sum();

    let denominator = n * sum_t2 - sum_t * sum_t;
    if denominator.abs() < 1e-10 {
        return None;
    }

    let slope = (n * sum_ty - sum_t * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_t) / n;
    (slope.is_finite() && intercept.is_finite()).then_some(LineFit { intercept, slope })
}

/// Observations that can be log-transformed, keyed by day index.
fn positive_points(values: &[f64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .filter(|&(_, &y)| y > 0.0 && y.is_finite())
        .map(|(t, &y)| (t as f64, y))
        .collect()
}

pub fn rmse(observed: &[f64], fitted: &[f64]) -> f64 {
    if observed.is_empty() {
        return 0.0;
    }
    let sse: f64 = observed
        .iter()
        .zip(fitted)
        .map(|(y, f)| (y - f).powi(2))
        .sum();
    (sse / observed.len() as f64).sqrt()
}

/// Constant at the last observed value; the degenerate zero-growth fit.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatCurve;

struct FlatFit {
    level: f64,
}

impl FittedCurve for FlatFit {
    fn value_at(&self, _t: f64) -> f64 {
        self.level
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.level]
    }
}

impl GrowthCurve for FlatCurve {
    fn kind(&self) -> CurveKind {
        CurveKind::Flat
    }

    fn fit(&self, values: &[f64]) -> Option<Box<dyn FittedCurve>> {
        let level = *values.last()?;
        Some(Box::new(FlatFit { level }))
    }
}

/// y = exp(a + r t), with the growth rate r clamped at zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialCurve;

struct ExponentialFit {
    log_amplitude: f64,
    rate: f64,
}

impl FittedCurve for ExponentialFit {
    fn value_at(&self, t: f64) -> f64 {
        (self.log_amplitude + self.rate * t).exp()
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.log_amplitude.exp(), self.rate]
    }
}

impl GrowthCurve for ExponentialCurve {
    fn kind(&self) -> CurveKind {
        CurveKind::Exponential
    }

    fn fit(&self, values: &[f64]) -> Option<Box<dyn FittedCurve>> {
        let points: Vec<(f64, f64)> = positive_points(values)
            .into_iter()
            .map(|(t, y)| (t, y.ln()))
            .collect();
        let line = least_squares(&points)?;

        if line.slope >= 0.0 {
            return Some(Box::new(ExponentialFit {
                log_amplitude: line.intercept,
                rate: line.slope,
            }));
        }

        // 衰減趨勢不適用於累計數，改用平均水準
        let mean_log = points.iter().map(|(_, z)| z).sum::<f64>() / points.len() as f64;
        Some(Box::new(ExponentialFit {
            log_amplitude: mean_log,
            rate: 0.0,
        }))
    }
}

/// y = c / (1 + exp(-k (t - m))).
///
/// For a fixed capacity `c` the curve is linear after the transform
/// `ln(c / y - 1) = -k t + k m`. Capacities are scanned on a geometric grid
/// above the observed maximum and the one with the smallest squared error in
/// the original space wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogisticCurve;

#[derive(Debug, Clone, Copy)]
struct LogisticFit {
    capacity: f64,
    steepness: f64,
    midpoint: f64,
}

impl LogisticFit {
    fn evaluate(&self, t: f64) -> f64 {
        self.capacity / (1.0 + (-self.steepness * (t - self.midpoint)).exp())
    }
}

impl FittedCurve for LogisticFit {
    fn value_at(&self, t: f64) -> f64 {
        self.evaluate(t)
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.capacity, self.steepness, self.midpoint]
    }
}

impl LogisticCurve {
    fn fit_with_capacity(points: &[(f64, f64)], capacity: f64) -> Option<LogisticFit> {
        let transformed: Vec<(f64, f64)> = points
            .iter()
            .map(|&(t, y)| (t, (capacity / y - 1.0).ln()))
            .collect();
        let line = least_squares(&transformed)?;

        let steepness = -line.slope;
        if steepness <= 0.0 || !steepness.is_finite() {
            return None;
        }

        Some(LogisticFit {
            capacity,
            steepness,
            midpoint: line.intercept / steepness,
        })
    }
}

impl GrowthCurve for LogisticCurve {
    fn kind(&self) -> CurveKind {
        CurveKind::Logistic
    }

    fn fit(&self, values: &[f64]) -> Option<Box<dyn FittedCurve>> {
        let points = positive_points(values);
        let max = points.iter().map(|(_, y)| *y).fold(0.0_f64, f64::max);
        if points.len() < 2 || max <= 0.0 {
            return None;
        }

        let low = max * CAPACITY_MIN_FACTOR;
        let ratio = (CAPACITY_MAX_FACTOR / CAPACITY_MIN_FACTOR).powf(1.0 / (CAPACITY_STEPS - 1) as f64);

        let mut best: Option<(f64, LogisticFit)> = None;
        let mut capacity = low;
        for _ in 0..CAPACITY_STEPS {
            if let Some(candidate) = Self::fit_with_capacity(&points, capacity) {
                let sse: f64 = points
                    .iter()
                    .map(|&(t, y)| (y - candidate.evaluate(t)).powi(2))
                    .sum();
                // 嚴格小於：平手時保留較小的容量，結果才具決定性
                let better = match &best {
                    Some((best_sse, _)) => sse < *best_sse,
                    None => sse.is_finite(),
                };
                if better {
                    best = Some((sse, candidate));
                }
            }
            capacity *= ratio;
        }

        best.map(|(_, fit)| Box::new(fit) as Box<dyn FittedCurve>)
    }
}

/// Curve families to try for a configured kind, most specific first.
pub fn fallback_chain(kind: CurveKind) -> Vec<Box<dyn GrowthCurve>> {
    match kind {
        CurveKind::Logistic => vec![
            Box::new(LogisticCurve),
            Box::new(ExponentialCurve),
            Box::new(FlatCurve),
        ],
        CurveKind::Exponential => vec![Box::new(ExponentialCurve), Box::new(FlatCurve)],
        CurveKind::Flat => vec![Box::new(FlatCurve)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_least_squares_recovers_line() {
        let points: Vec<(f64, f64)> = (0..6).map(|t| (t as f64, 10.0 + 2.0 * t as f64)).collect();
        let line = least_squares(&points).unwrap();
        assert!((line.slope - 2.0).abs() < 1e-9);
        assert!((line.intercept - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_least_squares_needs_two_points() {
        assert!(least_squares(&[(0.0, 1.0)]).is_none());
        assert!(least_squares(&[(1.0, 1.0), (1.0, 2.0)]).is_none());
    }

    #[test]
    fn test_exponential_fits_geometric_growth() {
        let values = [100.0, 150.0, 225.0, 337.5];
        let fit = ExponentialCurve.fit(&values).unwrap();
        for (t, y) in values.iter().enumerate() {
            assert!((fit.value_at(t as f64) - y).abs() < 1e-6);
        }
        let params = fit.parameters();
        assert!((params[1] - 1.5_f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_exponential_clamps_decay() {
        let fit = ExponentialCurve.fit(&[400.0, 200.0, 100.0]).unwrap();
        assert_eq!(fit.parameters()[1], 0.0);
        assert_eq!(fit.value_at(10.0), fit.value_at(0.0));
    }

    #[test]
    fn test_exponential_ignores_zero_counts() {
        let fit = ExponentialCurve.fit(&[0.0, 0.0, 10.0, 20.0]).unwrap();
        assert!((fit.value_at(3.0) - 20.0).abs() < 1e-6);
        assert!(ExponentialCurve.fit(&[0.0, 0.0, 5.0]).is_none());
    }

    #[test]
    fn test_logistic_tracks_sigmoid_data() {
        let truth = LogisticFit {
            capacity: 10_000.0,
            steepness: 0.3,
            midpoint: 20.0,
        };
        let values: Vec<f64> = (0..25).map(|t| truth.evaluate(t as f64)).collect();
        let max = values[24];
        let fit = LogisticCurve.fit(&values).unwrap();

        let params = fit.parameters();
        assert!(params[0] > max);
        assert!(params[1] > 0.0);
        for (t, y) in values.iter().enumerate() {
            assert!((fit.value_at(t as f64) - y).abs() < 0.05 * max);
        }
    }

    #[test]
    fn test_logistic_is_deterministic() {
        let values = [3.0, 5.0, 9.0, 14.0, 30.0, 41.0, 70.0];
        let a = LogisticCurve.fit(&values).unwrap().parameters();
        let b = LogisticCurve.fit(&values).unwrap().parameters();
        assert_eq!(a, b);
    }

    #[test]
    fn test_flat_uses_last_value() {
        let fit = FlatCurve.fit(&[7.0]).unwrap();
        assert_eq!(fit.value_at(100.0), 7.0);
        assert!(FlatCurve.fit(&[]).is_none());
    }

    #[test]
    fn test_fallback_chain_order() {
        let kinds: Vec<CurveKind> = fallback_chain(CurveKind::Logistic)
            .iter()
            .map(|c| c.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![CurveKind::Logistic, CurveKind::Exponential, CurveKind::Flat]
        );
    }

    #[test]
    fn test_rmse() {
        assert_eq!(rmse(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
        assert!((rmse(&[0.0, 0.0], &[3.0, 4.0]) - 12.5_f64.sqrt()).abs() < 1e-12);
    }
}
