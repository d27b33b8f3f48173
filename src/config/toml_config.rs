use crate::core::{ConfigProvider, CurveKind, SourceKind};
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub app: AppConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub model: ModelConfig,
    pub output: Option<OutputConfig>,
    pub logging: Option<LoggingConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Covid19 Virus Predictor".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub r#type: SourceKind,
    pub confirmed: String,
    pub deaths: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub base_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub curve: CurveKind,
    pub default_mortality: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: Option<String>,
    pub pretty: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// "compact" 或 "json"
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ForecastError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ForecastError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ForecastError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn pretty_output(&self) -> bool {
        self.output.as_ref().and_then(|o| o.pretty).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().is_some_and(|m| m.enabled)
    }
}

impl ConfigProvider for TomlConfig {
    fn source_kind(&self) -> SourceKind {
        self.source.r#type
    }

    fn confirmed_location(&self) -> &str {
        &self.source.confirmed
    }

    fn deaths_location(&self) -> Option<&str> {
        self.source.deaths.as_deref()
    }

    fn base_dir(&self) -> &str {
        self.source.base_dir.as_deref().unwrap_or(".")
    }

    fn timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(30)
    }

    fn curve(&self) -> CurveKind {
        self.model.curve
    }

    fn default_mortality(&self) -> f64 {
        self.model
            .default_mortality
            .unwrap_or(crate::core::data_store::DEFAULT_MORTALITY)
    }

    fn output_path(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.path.as_deref())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("app.name", &self.app.name)?;

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            if !["compact", "json"].contains(&format.to_ascii_lowercase().as_str()) {
                return Err(ForecastError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.to_string(),
                    reason: "Valid formats: compact, json".to_string(),
                });
            }
        }

        super::validate_provider(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
[source]
confirmed = "https://example.com/confirmed.csv"
"#,
        )
        .unwrap();

        assert_eq!(config.app.name, "Covid19 Virus Predictor");
        assert_eq!(config.source_kind(), SourceKind::Http);
        assert_eq!(config.deaths_location(), None);
        assert_eq!(config.curve(), CurveKind::Logistic);
        assert_eq!(config.default_mortality(), 0.02);
        assert_eq!(config.timeout_seconds(), 30);
        assert!(!config.pretty_output());
        assert!(!config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config() {
        let config = TomlConfig::from_toml_str(
            r#"
[app]
name = "Forecast"

[source]
type = "file"
confirmed = "confirmed.csv"
deaths = "deaths.csv"
base_dir = "/data"
timeout_seconds = 10

[model]
curve = "exponential"
default_mortality = 0.03

[output]
path = "out/forecast.json"
pretty = true

[logging]
format = "json"

[monitoring]
enabled = true
"#,
        )
        .unwrap();

        assert_eq!(config.source_kind(), SourceKind::File);
        assert_eq!(config.base_dir(), "/data");
        assert_eq!(config.deaths_location(), Some("deaths.csv"));
        assert_eq!(config.curve(), CurveKind::Exponential);
        assert_eq!(config.output_path(), Some("out/forecast.json"));
        assert!(config.pretty_output());
        assert!(config.json_logs());
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("COVID_FORECAST_TEST_HOST", "data.example.org");
        let config = TomlConfig::from_toml_str(
            r#"
[source]
confirmed = "https://${COVID_FORECAST_TEST_HOST}/confirmed.csv"
deaths = "https://${COVID_FORECAST_TEST_UNSET_VAR}/deaths.csv"
"#,
        )
        .unwrap();

        assert_eq!(
            config.confirmed_location(),
            "https://data.example.org/confirmed.csv"
        );
        assert_eq!(
            config.deaths_location(),
            Some("https://${COVID_FORECAST_TEST_UNSET_VAR}/deaths.csv")
        );
    }

    #[test]
    fn test_invalid_configs() {
        assert!(TomlConfig::from_toml_str("[model]\ncurve = \"logistic\"\n").is_err());
        assert!(TomlConfig::from_toml_str(
            "[source]\nconfirmed = \"https://x/c.csv\"\n[model]\ncurve = \"cubic\"\n"
        )
        .is_err());

        let config = TomlConfig::from_toml_str(
            "[source]\nconfirmed = \"https://x/c.csv\"\n[model]\ndefault_mortality = 2.0\n",
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(
            "[source]\nconfirmed = \"https://x/c.csv\"\n[logging]\nformat = \"xml\"\n",
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
