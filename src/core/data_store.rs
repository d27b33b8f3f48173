use crate::core::{DataSource, Region, TimeSeries, WORLD};
use crate::utils::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

const COUNTRY_COLUMN: &str = "Country/Region";
const DATE_FORMAT: &str = "%m/%d/%y";
pub const DEFAULT_MORTALITY: f64 = 0.02;

/// Per-country cumulative counts parsed from one CSSE time-series file.
#[derive(Debug, Clone)]
struct CaseTable {
    start: NaiveDate,
    days: usize,
    /// Countries in order of first appearance.
    countries: Vec<String>,
    totals: HashMap<String, Vec<f64>>,
    world: Vec<f64>,
}

impl CaseTable {
    fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);
        let headers = reader.headers()?.clone();

        let country_idx = headers
            .iter()
            .position(|h| h.trim() == COUNTRY_COLUMN)
            .ok_or_else(|| ForecastError::ProcessingError {
                message: format!("missing '{}' column", COUNTRY_COLUMN),
            })?;

        // 日期欄位：所有能以 m/d/yy 解析的標題
        let date_columns: Vec<(usize, NaiveDate)> = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| {
                NaiveDate::parse_from_str(h.trim(), DATE_FORMAT)
                    .ok()
                    .map(|d| (i, d))
            })
            .collect();

        let (_, start) = *date_columns.first().ok_or_else(|| ForecastError::ProcessingError {
            message: "no date columns in header".to_string(),
        })?;
        for (offset, (_, date)) in date_columns.iter().enumerate() {
            if *date != start + Duration::days(offset as i64) {
                return Err(ForecastError::ProcessingError {
                    message: format!("date column {} breaks the daily sequence", date),
                });
            }
        }

        let days = date_columns.len();
        let mut countries = Vec::new();
        let mut totals: HashMap<String, Vec<f64>> = HashMap::new();
        let mut world = vec![0.0; days];

        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let country = record
                .get(country_idx)
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| ForecastError::ProcessingError {
                    message: format!("row {} has no country", line + 2),
                })?
                .to_string();

            if !totals.contains_key(&country) {
                countries.push(country.clone());
            }
            let row_totals = totals
                .entry(country.clone())
                .or_insert_with(|| vec![0.0; days]);

            for (day, (col, date)) in date_columns.iter().enumerate() {
                let cell = record.get(*col).unwrap_or("").trim();
                let mut value: f64 = cell.parse().map_err(|_| ForecastError::ProcessingError {
                    message: format!("row {} ({}), {}: '{}' is not a number", line + 2, country, date, cell),
                })?;
                if !value.is_finite() {
                    return Err(ForecastError::ProcessingError {
                        message: format!("row {} ({}), {}: non-finite value", line + 2, country, date),
                    });
                }
                if value < 0.0 {
                    tracing::warn!("⚠️ Negative count {} for {} on {}, clamped to 0", value, country, date);
                    value = 0.0;
                }
                row_totals[day] += value;
                world[day] += value;
            }
        }

        if countries.is_empty() {
            return Err(ForecastError::ProcessingError {
                message: "no data rows".to_string(),
            });
        }

        Ok(Self {
            start,
            days,
            countries,
            totals,
            world,
        })
    }

    fn values_for(&self, region: &Region) -> Option<&[f64]> {
        if region.is_world() {
            Some(&self.world)
        } else {
            self.totals.get(region.as_str()).map(Vec::as_slice)
        }
    }
}

/// Tags any parse failure with the source it came from.
fn as_load_error(location: &str, err: ForecastError) -> ForecastError {
    match err {
        err @ ForecastError::DataLoadError { .. } => err,
        ForecastError::ProcessingError { message } => ForecastError::data_load(location, message),
        other => ForecastError::data_load(location, other.to_string()),
    }
}

/// Read-only case dataset, loaded once and shared across requests.
#[derive(Debug, Clone)]
pub struct DataStore {
    regions: Vec<Region>,
    confirmed: CaseTable,
    deaths: Option<CaseTable>,
    default_mortality: f64,
}

impl DataStore {
    /// Fetches and parses the confirmed (and optional deaths) CSV files.
    pub async fn load(
        source: &dyn DataSource,
        confirmed: &str,
        deaths: Option<&str>,
    ) -> Result<Self> {
        tracing::info!("📥 Loading confirmed cases from {}", confirmed);
        let confirmed_bytes = source
            .fetch(confirmed)
            .await
            .map_err(|e| as_load_error(confirmed, e))?;

        let deaths_bytes = match deaths {
            Some(location) => {
                tracing::info!("📥 Loading deaths from {}", location);
                let bytes = source
                    .fetch(location)
                    .await
                    .map_err(|e| as_load_error(location, e))?;
                Some((location, bytes))
            }
            None => {
                tracing::info!("No deaths source configured, using default mortality");
                None
            }
        };

        Self::parse_labeled(
            confirmed,
            &confirmed_bytes,
            deaths_bytes.as_ref().map(|(l, b)| (*l, b.as_slice())),
        )
    }

    pub fn from_csv(confirmed: &[u8], deaths: Option<&[u8]>) -> Result<Self> {
        Self::parse_labeled("confirmed", confirmed, deaths.map(|b| ("deaths", b)))
    }

    fn parse_labeled(
        confirmed_label: &str,
        confirmed: &[u8],
        deaths: Option<(&str, &[u8])>,
    ) -> Result<Self> {
        let confirmed_table =
            CaseTable::parse(confirmed).map_err(|e| as_load_error(confirmed_label, e))?;

        let deaths_table = match deaths {
            Some((label, bytes)) => {
                let table = CaseTable::parse(bytes).map_err(|e| as_load_error(label, e))?;
                if table.start != confirmed_table.start || table.days != confirmed_table.days {
                    return Err(ForecastError::data_load(
                        label,
                        format!(
                            "date range {} (+{} days) does not match confirmed {} (+{} days)",
                            table.start, table.days, confirmed_table.start, confirmed_table.days
                        ),
                    ));
                }
                Some(table)
            }
            None => None,
        };

        let regions: Vec<Region> = std::iter::once(Region::world())
            .chain(
                confirmed_table
                    .countries
                    .iter()
                    .filter(|c| c.as_str() != WORLD)
                    .map(|c| Region::new(c.as_str())),
            )
            .collect();

        tracing::info!(
            "✅ Loaded {} regions, {} days starting {}",
            regions.len(),
            confirmed_table.days,
            confirmed_table.start
        );

        Ok(Self {
            regions,
            confirmed: confirmed_table,
            deaths: deaths_table,
            default_mortality: DEFAULT_MORTALITY,
        })
    }

    /// Mortality used when no deaths data exists for a region.
    pub fn with_default_mortality(mut self, rate: f64) -> Self {
        self.default_mortality = rate;
        self
    }

    /// Selectable regions, `World` first.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Maps a selector value to a known region; absent or unknown means `World`.
    pub fn resolve(&self, region: Option<&str>) -> Region {
        match region.map(str::trim) {
            Some(name) if !name.is_empty() && self.confirmed.totals.contains_key(name) => {
                Region::new(name)
            }
            Some(name) if !name.is_empty() && name != WORLD => {
                tracing::debug!("Unknown region '{}', using {}", name, WORLD);
                Region::world()
            }
            _ => Region::world(),
        }
    }

    pub fn series_for(&self, region: &str) -> TimeSeries {
        let region = self.resolve(Some(region));
        let values = self
            .confirmed
            .values_for(&region)
            .unwrap_or(&self.confirmed.world);
        TimeSeries::new(self.confirmed.start, values.to_vec())
    }

    /// Deaths / confirmed on the last observed day.
    pub fn mortality_for(&self, region: &str) -> f64 {
        let region = self.resolve(Some(region));
        let Some(deaths) = self.deaths.as_ref().and_then(|d| d.values_for(&region)) else {
            return self.default_mortality;
        };
        let confirmed = self
            .confirmed
            .values_for(&region)
            .and_then(|v| v.last().copied())
            .unwrap_or(0.0);
        let dead = deaths.last().copied().unwrap_or(0.0);

        if confirmed <= 0.0 {
            self.default_mortality
        } else {
            dead / confirmed
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.confirmed.start
    }

    pub fn days(&self) -> usize {
        self.confirmed.days
    }

    pub fn has_deaths(&self) -> bool {
        self.deaths.is_some()
    }
}
