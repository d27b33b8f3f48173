use crate::core::{
    ChartKind, DataStore, ForecastModel, ForecastResponse, Region, ResultFormatter,
};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::sync::Arc;

/// Runs the per-request pipeline over a shared, already-loaded dataset.
///
/// Every call recomputes series, fit and summary from scratch; nothing is
/// cached between requests.
pub struct ForecastEngine {
    store: Arc<DataStore>,
    model: ForecastModel,
    formatter: ResultFormatter,
    monitor: SystemMonitor,
}

impl ForecastEngine {
    pub fn new(store: Arc<DataStore>, model: ForecastModel) -> Self {
        Self::with_monitor(store, model, SystemMonitor::new(false))
    }

    /// Reuses the caller's monitor so a run keeps one set of phase stats.
    pub fn with_monitor(store: Arc<DataStore>, model: ForecastModel, monitor: SystemMonitor) -> Self {
        Self {
            store,
            model,
            formatter: ResultFormatter::new(),
            monitor,
        }
    }

    pub fn monitor(&self) -> &SystemMonitor {
        &self.monitor
    }

    pub fn regions(&self) -> &[Region] {
        self.store.regions()
    }

    pub fn handle(&self, region: Option<&str>) -> Result<ForecastResponse> {
        let region = self.store.resolve(region);
        tracing::debug!("Handling forecast request for {}", region);

        let series = self.store.series_for(region.as_str());
        let result = self.model.fit(&series)?;

        let mortality = self.store.mortality_for(region.as_str());
        let result = self.model.apply_mortality_adjustment(result, mortality)?;

        let summary = self.formatter.summarize(&result)?;
        let total_chart = self.formatter.series_for_chart(&result, ChartKind::Total)?;
        let active_chart = self.formatter.series_for_chart(&result, ChartKind::Active)?;

        tracing::info!(
            "🔮 {}: {:.0} cases today, {:.0} in 30 days, peak {} ({} curve, mortality {:.4})",
            region,
            summary.total_today,
            summary.total_30d,
            summary.peak_date,
            result.fit.kind,
            mortality
        );
        self.monitor.log_phase("forecast");

        Ok(ForecastResponse {
            region,
            total_chart,
            active_chart,
            summary: summary.to_payload(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CurveKind, HORIZON_DAYS};
    use crate::utils::error::ForecastError;

    const CONFIRMED: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Italy,41.8,12.5,60,90,135
,Spain,40.4,-3.7,40,60,90
";

    fn engine(deaths: Option<&str>) -> ForecastEngine {
        let store = DataStore::from_csv(CONFIRMED.as_bytes(), deaths.map(str::as_bytes)).unwrap();
        ForecastEngine::new(Arc::new(store), ForecastModel::new(CurveKind::Logistic))
    }

    #[test]
    fn test_world_request_end_to_end() {
        let response = engine(None).handle(Some("World")).unwrap();

        assert_eq!(response.region, Region::world());
        assert_eq!(response.total_chart.y.len(), 3 + HORIZON_DAYS);
        assert_eq!(response.total_chart.today_index, 2);
        assert_eq!(response.summary.total_today, 225.0);
        assert!((response.summary.active_today - 220.5).abs() < 1e-9);
        assert_eq!(response.summary.peak_date, *response.total_chart.x.last().unwrap());
        assert!(!response.summary.past_peak);
    }

    #[test]
    fn test_engine_keeps_the_given_monitor() {
        let store = DataStore::from_csv(CONFIRMED.as_bytes(), None).unwrap();
        let plain = ForecastEngine::new(Arc::new(store.clone()), ForecastModel::default());
        assert!(!plain.monitor().is_enabled());

        let monitored = ForecastEngine::with_monitor(
            Arc::new(store),
            ForecastModel::default(),
            SystemMonitor::new(true),
        );
        assert_eq!(monitored.monitor().is_enabled(), cfg!(feature = "cli"));
        assert!(monitored.handle(Some("Italy")).is_ok());
    }

    #[test]
    fn test_missing_region_falls_back_to_world() {
        let engine = engine(None);
        let a = engine.handle(None).unwrap();
        let b = engine.handle(Some("Narnia")).unwrap();
        assert_eq!(a, b);
        assert_eq!(b.region, Region::world());
    }

    #[test]
    fn test_invalid_mortality_aborts_only_that_request() {
        // Spain 的死亡數大於確診數，比率超出範圍
        let deaths = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Italy,41.8,12.5,0,1,2
,Spain,40.4,-3.7,0,0,100
";
        let engine = engine(Some(deaths));

        let err = engine.handle(Some("Spain")).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidRateError { .. }));
        assert!(err.is_request_scoped());

        let italy = engine.handle(Some("Italy")).unwrap();
        assert_eq!(italy.region, Region::new("Italy"));
        assert!((italy.summary.active_today - 135.0 * (1.0 - 2.0 / 135.0)).abs() < 1e-9);
    }
}
