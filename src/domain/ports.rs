use crate::domain::model::{CurveKind, SourceKind};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source_kind(&self) -> SourceKind;
    fn confirmed_location(&self) -> &str;
    fn deaths_location(&self) -> Option<&str>;
    /// Base directory for `SourceKind::File` locations.
    fn base_dir(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn curve(&self) -> CurveKind;
    fn default_mortality(&self) -> f64;
    fn output_path(&self) -> Option<&str>;
}

/// Where raw CSV bytes come from (HTTP, local file).
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>>;
}

/// A curve family fitted to day-indexed observations.
pub trait GrowthCurve: Send + Sync {
    fn kind(&self) -> CurveKind;

    /// `values[i]` is observed at day `i`. Returns `None` when the family
    /// cannot describe the data.
    fn fit(&self, values: &[f64]) -> Option<Box<dyn FittedCurve>>;
}

pub trait FittedCurve: Send + Sync {
    fn value_at(&self, t: f64) -> f64;
    fn parameters(&self) -> Vec<f64>;
}
