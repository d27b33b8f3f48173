use crate::core::DataSource;
use crate::utils::error::{ForecastError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Downloads CSV files over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        tracing::debug!("Making request to: {}", location);
        let response = self.client.get(location).send().await?;
        tracing::debug!("Response status: {}", response.status());

        if !response.status().is_success() {
            return Err(ForecastError::data_load(
                location,
                format!("HTTP status {}", response.status()),
            ));
        }

        let bytes = response.bytes().await?;
        tracing::debug!("Downloaded {} bytes from {}", bytes.len(), location);
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/confirmed.csv");
            then.status(200).body("a,b\n1,2\n");
        });

        let source = HttpSource::new(5).unwrap();
        let body = source.fetch(&server.url("/confirmed.csv")).await.unwrap();

        mock.assert();
        assert_eq!(body, b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_load_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing.csv");
            then.status(404);
        });

        let source = HttpSource::new(5).unwrap();
        let err = source.fetch(&server.url("/missing.csv")).await.unwrap_err();

        mock.assert();
        assert!(matches!(err, ForecastError::DataLoadError { .. }));
    }
}
