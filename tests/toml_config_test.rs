use anyhow::Result;
use covid_forecast::app::runner::{self, RunRequest};
use covid_forecast::core::ConfigProvider;
use covid_forecast::utils::validation::Validate;
use covid_forecast::{ForecastResponse, TomlConfig};
use tempfile::TempDir;

const CONFIRMED: &str = "\
Province/State,Country/Region,Lat,Long,5/1/20,5/2/20,5/3/20,5/4/20
,Brazil,-14.2,-51.9,1000,1500,2100,2600
,Peru,-9.2,-75.0,200,260,300,320
";

/// TOML 檔案搭配本機 CSV 來源
#[tokio::test]
async fn test_toml_config_with_file_source() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let temp_path = temp_dir.path().to_str().unwrap().replace('\\', "/");
    tokio::fs::write(format!("{}/confirmed.csv", temp_path), CONFIRMED).await?;

    std::env::set_var("COVID_FORECAST_TEST_DATA_DIR", &temp_path);
    let config_content = format!(
        r#"
[app]
name = "test-forecast"

[source]
type = "file"
confirmed = "confirmed.csv"
base_dir = "${{COVID_FORECAST_TEST_DATA_DIR}}"

[model]
curve = "logistic"
default_mortality = 0.1

[output]
path = "{}/out/forecast.json"
pretty = true
"#,
        temp_path
    );

    let config_path = format!("{}/forecast.toml", temp_path);
    tokio::fs::write(&config_path, config_content).await?;

    let config = TomlConfig::from_file(&config_path)?;
    config.validate()?;
    assert_eq!(config.base_dir(), temp_path);

    let request = RunRequest {
        region: Some("Peru".to_string()),
        pretty: config.pretty_output(),
        ..RunRequest::default()
    };
    let outcome = runner::run(&config, &request).await?;

    assert!(outcome.written_to.is_some());
    let written = tokio::fs::read_to_string(format!("{}/out/forecast.json", temp_path)).await?;
    assert!(written.contains('\n'));

    let response: ForecastResponse = serde_json::from_str(&written)?;
    assert_eq!(response.region.as_str(), "Peru");
    assert_eq!(response.summary.total_today, 320.0);
    assert!((response.summary.active_today - 288.0).abs() < 1e-9);
    assert!(response.summary.total_30d >= 320.0);

    Ok(())
}

#[test]
fn test_missing_config_file() {
    let err = TomlConfig::from_file("/definitely/not/here/forecast.toml").unwrap_err();
    assert!(matches!(err, covid_forecast::ForecastError::IoError(_)));
}
