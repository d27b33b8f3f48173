pub mod toml_config;

use crate::core::{ConfigProvider, CurveKind, SourceKind};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const JHU_CONFIRMED_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_confirmed_global.csv";
pub const JHU_DEATHS_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_deaths_global.csv";

/// Checks shared by every config flavour.
pub(crate) fn validate_provider(config: &impl ConfigProvider) -> Result<()> {
    let mut locations = vec![("source.confirmed", config.confirmed_location())];
    if let Some(deaths) = config.deaths_location() {
        locations.push(("source.deaths", deaths));
    }

    for (field, location) in locations {
        match config.source_kind() {
            SourceKind::Http => validation::validate_url(field, location)?,
            SourceKind::File => validation::validate_path(field, location)?,
        }
        validation::validate_csv_location(field, location)?;
    }

    if config.source_kind() == SourceKind::File {
        validation::validate_path("source.base_dir", config.base_dir())?;
    }
    validation::validate_range("model.default_mortality", config.default_mortality(), 0.0, 1.0)?;
    validation::validate_range("source.timeout_seconds", config.timeout_seconds(), 1, 3600)?;
    if let Some(path) = config.output_path() {
        validation::validate_path("output.path", path)?;
    }
    Ok(())
}

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "covid-forecast")]
#[command(about = "30-day COVID-19 case forecast per region")]
pub struct CliConfig {
    /// Region to forecast; unknown or absent means World
    #[arg(long)]
    pub region: Option<String>,

    #[arg(long, value_enum, default_value_t = SourceKind::Http)]
    pub source_type: SourceKind,

    #[arg(long, default_value = JHU_CONFIRMED_URL)]
    pub confirmed: String,

    #[arg(long, default_value = JHU_DEATHS_URL)]
    pub deaths: String,

    /// Skip the deaths file and use --default-mortality everywhere
    #[arg(long)]
    pub no_deaths: bool,

    /// Base directory for --source-type file
    #[arg(long, default_value = ".")]
    pub base_dir: String,

    #[arg(long, value_enum, default_value_t = CurveKind::Logistic)]
    pub curve: CurveKind,

    #[arg(long, default_value = "0.02")]
    pub default_mortality: f64,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    /// Write the JSON response to this file instead of stdout
    #[arg(long)]
    pub output: Option<String>,

    #[arg(long, help = "Print the selectable regions and exit")]
    pub list_regions: bool,

    #[arg(long, help = "Pretty-print JSON output")]
    pub pretty: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn source_kind(&self) -> SourceKind {
        self.source_type
    }

    fn confirmed_location(&self) -> &str {
        &self.confirmed
    }

    fn deaths_location(&self) -> Option<&str> {
        (!self.no_deaths).then_some(self.deaths.as_str())
    }

    fn base_dir(&self) -> &str {
        &self.base_dir
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn curve(&self) -> CurveKind {
        self.curve
    }

    fn default_mortality(&self) -> f64 {
        self.default_mortality
    }

    fn output_path(&self) -> Option<&str> {
        self.output.as_deref()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(region) = &self.region {
            validation::validate_non_empty_string("region", region)?;
        }
        validate_provider(self)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_csse() {
        let config = CliConfig::parse_from(["covid-forecast"]);
        assert_eq!(config.confirmed_location(), JHU_CONFIRMED_URL);
        assert_eq!(config.deaths_location(), Some(JHU_DEATHS_URL));
        assert_eq!(config.curve(), CurveKind::Logistic);
        assert_eq!(config.default_mortality(), 0.02);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_source_flags() {
        let config = CliConfig::parse_from([
            "covid-forecast",
            "--source-type",
            "file",
            "--confirmed",
            "confirmed.csv",
            "--no-deaths",
            "--curve",
            "exponential",
            "--region",
            "Italy",
        ]);
        assert_eq!(config.source_kind(), SourceKind::File);
        assert_eq!(config.deaths_location(), None);
        assert_eq!(config.curve(), CurveKind::Exponential);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = CliConfig::parse_from(["covid-forecast", "--default-mortality", "1.5"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["covid-forecast", "--confirmed", "ftp://x/y.csv"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["covid-forecast", "--region", " "]);
        assert!(config.validate().is_err());
    }
}
