use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed forward extrapolation window, in days.
pub const HORIZON_DAYS: usize = 30;

/// Sentinel label for the worldwide aggregate.
pub const WORLD: &str = "World";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn world() -> Self {
        Self(WORLD.to_string())
    }

    pub fn is_world(&self) -> bool {
        self.0 == WORLD
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One value per calendar day starting at `start`.
///
/// Dates are implied by position, so they are strictly increasing and gap-free
/// by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    start: NaiveDate,
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(start: NaiveDate, values: Vec<f64>) -> Self {
        Self { start, values }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.len().checked_sub(1).map(|last| self.date_at(last))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.start).num_days();
        if offset < 0 {
            return None;
        }
        let index = offset as usize;
        (index < self.values.len()).then_some(index)
    }

    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.index_of(date).map(|i| self.values[i])
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.len()).map(|i| self.date_at(i)).collect()
    }

    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.date_at(i), v))
    }

    /// Same dates, values transformed pointwise.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            start: self.start,
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    #[default]
    Logistic,
    Exponential,
    Flat,
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CurveKind::Logistic => "logistic",
            CurveKind::Exponential => "exponential",
            CurveKind::Flat => "flat",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Http,
    File,
}

/// Curve actually used for a forecast, after any fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub kind: CurveKind,
    pub parameters: Vec<f64>,
    pub rmse: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Observed points followed by `HORIZON_DAYS` forecast points.
    pub series: TimeSeries,
    /// Last observed date.
    pub today: NaiveDate,
    /// In-sample curve values for the observed dates.
    pub fitted: Vec<f64>,
    pub fit: FitReport,
    /// Active (non-resolved) cases over the same dates as `series`.
    pub active: Option<TimeSeries>,
}

impl ForecastResult {
    pub fn today_index(&self) -> usize {
        self.series.index_of(self.today).unwrap_or(0)
    }

    pub fn horizon_date(&self) -> NaiveDate {
        self.today + Duration::days(HORIZON_DAYS as i64)
    }
}

/// Derived view over a forecast; rebuilt for every request.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSummary {
    pub today: NaiveDate,
    pub peak_date: NaiveDate,
    pub peak_value: f64,
    pub total_today: f64,
    pub total_30d: f64,
    pub active_today: f64,
    pub active_30d: f64,
}

impl PanelSummary {
    pub fn past_peak(&self) -> bool {
        self.today > self.peak_date
    }

    pub fn to_payload(&self) -> SummaryPayload {
        SummaryPayload {
            peak_date: self.peak_date,
            peak_value: self.peak_value,
            total_today: self.total_today,
            total_30d: self.total_30d,
            active_today: self.active_today,
            active_30d: self.active_30d,
            past_peak: self.past_peak(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPayload {
    pub peak_date: NaiveDate,
    pub peak_value: f64,
    pub total_today: f64,
    #[serde(rename = "total30d")]
    pub total_30d: f64,
    pub active_today: f64,
    #[serde(rename = "active30d")]
    pub active_30d: f64,
    pub past_peak: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Total,
    Active,
    /// Day-over-day increments of the total series.
    Daily,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub x: Vec<NaiveDate>,
    pub y: Vec<f64>,
    pub today_index: usize,
}

impl ChartSeries {
    /// Observed segment, up to and including today.
    pub fn observed(&self) -> (&[NaiveDate], &[f64]) {
        let end = (self.today_index + 1).min(self.x.len());
        (&self.x[..end], &self.y[..end])
    }

    /// Forecast segment, starting at today so both segments join.
    pub fn forecast(&self) -> (&[NaiveDate], &[f64]) {
        let start = self.today_index.min(self.x.len());
        (&self.x[start..], &self.y[start..])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    pub region: Region,
    pub total_chart: ChartSeries,
    pub active_chart: ChartSeries,
    pub summary: SummaryPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, d).unwrap()
    }

    #[test]
    fn test_time_series_dates_are_consecutive() {
        let series = TimeSeries::new(day(30), vec![1.0, 2.0, 3.0]);
        assert_eq!(
            series.dates(),
            vec![day(30), day(31), NaiveDate::from_ymd_opt(2020, 4, 1).unwrap()]
        );
        assert_eq!(series.end(), Some(NaiveDate::from_ymd_opt(2020, 4, 1).unwrap()));
        assert_eq!(series.value_at(day(31)), Some(2.0));
        assert_eq!(series.value_at(day(29)), None);
    }

    #[test]
    fn test_empty_series_has_no_end() {
        let series = TimeSeries::new(day(1), vec![]);
        assert!(series.is_empty());
        assert_eq!(series.end(), None);
        assert_eq!(series.index_of(day(1)), None);
    }

    #[test]
    fn test_chart_segments_share_today() {
        let chart = ChartSeries {
            kind: ChartKind::Total,
            x: vec![day(1), day(2), day(3), day(4)],
            y: vec![1.0, 2.0, 3.0, 4.0],
            today_index: 1,
        };
        assert_eq!(chart.observed().1, &[1.0, 2.0]);
        assert_eq!(chart.forecast().1, &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_summary_payload_field_names() {
        let summary = PanelSummary {
            today: day(3),
            peak_date: day(2),
            peak_value: 10.0,
            total_today: 9.0,
            total_30d: 12.0,
            active_today: 8.0,
            active_30d: 11.0,
        };
        let json = serde_json::to_value(summary.to_payload()).unwrap();
        assert_eq!(json["peakDate"], "2020-03-02");
        assert_eq!(json["total30d"], 12.0);
        assert_eq!(json["active30d"], 11.0);
        assert_eq!(json["pastPeak"], true);
    }
}
