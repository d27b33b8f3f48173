use crate::core::{ChartKind, ChartSeries, ForecastResult, PanelSummary, TimeSeries};
use crate::utils::error::{ForecastError, Result};
use chrono::NaiveDate;

/// Turns a fitted forecast into panel figures and chart arrays. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultFormatter;

impl ResultFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, result: &ForecastResult) -> Result<PanelSummary> {
        let (peak_date, peak_value) = peak(&result.series).ok_or(
            ForecastError::InsufficientDataError {
                required: 1,
                actual: 0,
            },
        )?;

        let today = result.today;
        let horizon = result.horizon_date();
        let total_today = checkpoint(&result.series, today)?;
        let total_30d = checkpoint(&result.series, horizon)?;

        let active = result
            .active
            .as_ref()
            .ok_or(ForecastError::MissingAdjustmentError)?;
        let active_today = checkpoint(active, today)?;
        let active_30d = checkpoint(active, horizon)?;

        Ok(PanelSummary {
            today,
            peak_date,
            peak_value,
            total_today,
            total_30d,
            active_today,
            active_30d,
        })
    }

    pub fn series_for_chart(&self, result: &ForecastResult, kind: ChartKind) -> Result<ChartSeries> {
        let y = match kind {
            ChartKind::Total => result.series.values().to_vec(),
            ChartKind::Active => result
                .active
                .as_ref()
                .ok_or(ForecastError::MissingAdjustmentError)?
                .values()
                .to_vec(),
            ChartKind::Daily => daily_increments(result.series.values()),
        };

        Ok(ChartSeries {
            kind,
            x: result.series.dates(),
            y,
            today_index: result.today_index(),
        })
    }
}

/// Maximum over the whole series; on ties the latest date wins.
fn peak(series: &TimeSeries) -> Option<(NaiveDate, f64)> {
    series
        .points()
        .fold(None, |best: Option<(NaiveDate, f64)>, (date, value)| match best {
            Some((_, best_value)) if value < best_value => best,
            _ => Some((date, value)),
        })
}

fn checkpoint(series: &TimeSeries, date: NaiveDate) -> Result<f64> {
    series
        .value_at(date)
        .ok_or_else(|| ForecastError::InsufficientDataError {
            required: ((date - series.start()).num_days() + 1).max(0) as usize,
            actual: series.len(),
        })
}

fn daily_increments(values: &[f64]) -> Vec<f64> {
    let mut previous = 0.0;
    values
        .iter()
        .map(|&v| {
            let delta = v - previous;
            previous = v;
            delta
        })
        .collect()
}
