pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{
    http::HttpSource,
    storage::{LocalStorage, StorageSource},
};
pub use config::toml_config::TomlConfig;
pub use core::{DataStore, ForecastEngine, ForecastModel, ResultFormatter};
pub use domain::model::{
    ChartKind, ChartSeries, CurveKind, ForecastResponse, ForecastResult, PanelSummary, Region,
    SummaryPayload, TimeSeries, HORIZON_DAYS,
};
pub use utils::error::{ForecastError, Result};
