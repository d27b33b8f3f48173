use crate::adapters::http::HttpSource;
use crate::adapters::storage::{LocalStorage, StorageSource};
use crate::core::{
    ConfigProvider, DataSource, DataStore, ForecastEngine, ForecastModel, SourceKind, Storage,
};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::path::Path;
use std::sync::Arc;

/// What a single invocation should produce.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub region: Option<String>,
    pub list_regions: bool,
    pub pretty: bool,
    pub monitor: bool,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub body: String,
    /// Set when the body was written to a file instead of returned for stdout.
    pub written_to: Option<String>,
}

pub fn build_source(config: &impl ConfigProvider) -> Result<Box<dyn DataSource>> {
    match config.source_kind() {
        SourceKind::Http => Ok(Box::new(HttpSource::new(config.timeout_seconds())?)),
        SourceKind::File => Ok(Box::new(StorageSource::new(LocalStorage::new(
            config.base_dir().to_string(),
        )))),
    }
}

/// Loads the dataset once; any failure here means nothing can be served.
pub async fn load_store(config: &impl ConfigProvider) -> Result<DataStore> {
    let source = build_source(config)?;
    let store = DataStore::load(
        source.as_ref(),
        config.confirmed_location(),
        config.deaths_location(),
    )
    .await?;
    Ok(store.with_default_mortality(config.default_mortality()))
}

pub async fn run(config: &impl ConfigProvider, request: &RunRequest) -> Result<RunOutcome> {
    let monitor = SystemMonitor::new(request.monitor);

    let store = Arc::new(load_store(config).await?);
    monitor.log_phase("load");

    let engine = ForecastEngine::with_monitor(store, ForecastModel::new(config.curve()), monitor);

    let body = if request.list_regions {
        to_json(engine.regions(), request.pretty)?
    } else {
        let response = engine.handle(request.region.as_deref())?;
        to_json(&response, request.pretty)?
    };

    let written_to = match config.output_path() {
        Some(path) => {
            write_output(path, &body).await?;
            tracing::info!("📁 Output saved to: {}", path);
            Some(path.to_string())
        }
        None => None,
    };
    engine.monitor().log_phase("output");

    Ok(RunOutcome { body, written_to })
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

async fn write_output(path: &str, body: &str) -> Result<()> {
    let path = Path::new(path);
    let base = path
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();

    let storage = LocalStorage::new(if base.is_empty() { ".".to_string() } else { base });
    storage.write_file(&file_name, body.as_bytes()).await
}
