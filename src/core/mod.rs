pub mod curve;
pub mod data_store;
pub mod engine;
pub mod model;
pub mod result;

pub use crate::domain::model::{
    ChartKind, ChartSeries, CurveKind, FitReport, ForecastResponse, ForecastResult, PanelSummary,
    Region, SourceKind, SummaryPayload, TimeSeries, HORIZON_DAYS, WORLD,
};
pub use crate::domain::ports::{
    ConfigProvider, DataSource, FittedCurve, GrowthCurve, Storage,
};
pub use crate::utils::error::Result;
pub use data_store::DataStore;
pub use engine::ForecastEngine;
pub use model::ForecastModel;
pub use result::ResultFormatter;
