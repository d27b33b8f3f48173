use crate::core::curve::{fallback_chain, rmse};
use crate::core::{
    CurveKind, FitReport, FittedCurve, ForecastResult, TimeSeries, HORIZON_DAYS,
};
use crate::utils::error::{ForecastError, Result};

/// Fits a growth curve to cumulative counts and projects it `HORIZON_DAYS` ahead.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastModel {
    curve: CurveKind,
}

impl ForecastModel {
    pub fn new(curve: CurveKind) -> Self {
        Self { curve }
    }

    pub fn fit(&self, series: &TimeSeries) -> Result<ForecastResult> {
        if series.is_empty() {
            return Err(ForecastError::InsufficientDataError {
                required: 1,
                actual: 0,
            });
        }
        if let Some((index, &value)) = series
            .values()
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(ForecastError::InvalidObservationError { index, value });
        }

        // 累計數不可能為負
        let observed: Vec<f64> = series.values().iter().map(|v| v.max(0.0)).collect();
        let last_t = (observed.len() - 1) as f64;
        let last_value = observed[observed.len() - 1];

        let (kind, curve) = self.select_curve(&observed, last_t)?;

        let base = curve.value_at(last_t);
        let mut values = observed.clone();
        let mut previous = last_value;
        for h in 1..=HORIZON_DAYS {
            let growth = (curve.value_at(last_t + h as f64) - base).max(0.0);
            // 錨定在最後觀測值，並保持單調不減
            let next = (last_value + growth).max(previous);
            values.push(next);
            previous = next;
        }

        let fitted: Vec<f64> = (0..observed.len())
            .map(|t| curve.value_at(t as f64))
            .collect();
        let report = FitReport {
            kind,
            parameters: curve.parameters(),
            rmse: rmse(&observed, &fitted),
        };

        tracing::debug!(
            "📈 Fitted {} curve over {} points (params: {:?}, rmse: {:.3})",
            report.kind,
            observed.len(),
            report.parameters,
            report.rmse
        );

        let extended = TimeSeries::new(series.start(), values);
        let today = series.date_at(observed.len() - 1);

        Ok(ForecastResult {
            series: extended,
            today,
            fitted,
            fit: report,
            active: None,
        })
    }

    /// First curve in the fallback chain whose horizon is finite.
    fn select_curve(
        &self,
        observed: &[f64],
        last_t: f64,
    ) -> Result<(CurveKind, Box<dyn FittedCurve>)> {
        for candidate in fallback_chain(self.curve) {
            let Some(curve) = candidate.fit(observed) else {
                tracing::debug!("{} curve could not be fitted, trying next", candidate.kind());
                continue;
            };
            let horizon = curve.value_at(last_t + HORIZON_DAYS as f64);
            if curve.value_at(last_t).is_finite() && horizon.is_finite() {
                if candidate.kind() != self.curve {
                    tracing::info!(
                        "⚠️ Falling back from {} to {} curve",
                        self.curve,
                        candidate.kind()
                    );
                }
                return Ok((candidate.kind(), curve));
            }
            tracing::debug!("{} curve diverges within the horizon", candidate.kind());
        }

        // 非空且有限的序列上平線必定成功
        Err(ForecastError::ProcessingError {
            message: format!("no {} curve fits {} observations", self.curve, observed.len()),
        })
    }

    /// Derives the active series: every point scaled by `1 - mortality_rate`.
    pub fn apply_mortality_adjustment(
        &self,
        mut result: ForecastResult,
        mortality_rate: f64,
    ) -> Result<ForecastResult> {
        if !(0.0..=1.0).contains(&mortality_rate) {
            return Err(ForecastError::InvalidRateError {
                rate: mortality_rate,
            });
        }

        let survival = 1.0 - mortality_rate;
        result.active = Some(result.series.map(|v| v * survival));
        Ok(result)
    }
}
