use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{HourlySample, HourlyUnits, Location, WeatherSeries},
    provider::get_text,
};

use super::ForecastSource;

const ENDPOINT: &str = "forecast";

const HOURLY_FIELDS: &str = "temperature_2m,precipitation_probability,precipitation";

/// Hourly timestamps carry no zone marker; they are UTC.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// One-day hourly forecast from an Open-Meteo compatible API, in Fahrenheit.
#[derive(Debug, Clone)]
pub struct OpenMeteoFetcher {
    http: Client,
    forecast_url: String,
}

impl OpenMeteoFetcher {
    pub fn new(http: Client, forecast_url: String) -> Self {
        Self { http, forecast_url }
    }

    fn request(&self, location: &Location) -> Result<Url, FetchError> {
        let lat = location.latitude().to_string();
        let lon = location.longitude().to_string();

        Url::parse_with_params(
            &self.forecast_url,
            &[
                ("latitude", lat.as_str()),
                ("longitude", lon.as_str()),
                ("hourly", HOURLY_FIELDS),
                ("temperature_unit", "fahrenheit"),
                ("forecast_days", "1"),
            ],
        )
        .map_err(|e| FetchError::InvalidUrl(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    hourly_units: OmUnits,
    hourly: OmHourly,
}

#[derive(Debug, Deserialize)]
struct OmUnits {
    time: String,
    temperature_2m: String,
    precipitation_probability: String,
    precipitation: String,
}

/// The parallel hourly arrays, zipped into samples while decoding.
#[derive(Debug, Deserialize)]
#[serde(try_from = "OmColumns")]
struct OmHourly(Vec<HourlySample>);

#[derive(Debug, Deserialize)]
struct OmColumns {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    precipitation_probability: Vec<i32>,
    precipitation: Vec<f64>,
}

impl TryFrom<OmColumns> for OmHourly {
    type Error = String;

    fn try_from(columns: OmColumns) -> Result<Self, Self::Error> {
        let len = columns.time.len();
        if columns.temperature_2m.len() != len
            || columns.precipitation_probability.len() != len
            || columns.precipitation.len() != len
        {
            return Err(format!(
                "hourly arrays differ in length: time={}, temperature_2m={}, \
                 precipitation_probability={}, precipitation={}",
                len,
                columns.temperature_2m.len(),
                columns.precipitation_probability.len(),
                columns.precipitation.len(),
            ));
        }

        let samples = columns
            .time
            .iter()
            .zip(columns.temperature_2m)
            .zip(columns.precipitation_probability)
            .zip(columns.precipitation)
            .map(|(((time, temperature), precipitation_probability), precipitation)| -> Result<_, String> {
                Ok(HourlySample {
                    time: parse_hour(time)?,
                    temperature,
                    precipitation_probability,
                    precipitation,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;

        Ok(OmHourly(samples))
    }
}

fn parse_hour(raw: &str) -> Result<DateTime<Utc>, String> {
    NaiveDateTime::parse_from_str(raw, TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("bad hourly timestamp {raw:?}: {e}"))
}

/// Decode a forecast body in one step; nothing is returned unless every
/// column decoded.
pub(crate) fn decode_series(
    body: &str,
    captured_at: DateTime<Utc>,
) -> Result<WeatherSeries, serde_json::Error> {
    let parsed: OmResponse = serde_json::from_str(body)?;

    Ok(WeatherSeries {
        captured_at,
        units: HourlyUnits {
            time: parsed.hourly_units.time,
            temperature: parsed.hourly_units.temperature_2m,
            precipitation_probability: parsed.hourly_units.precipitation_probability,
            precipitation: parsed.hourly_units.precipitation,
        },
        samples: parsed.hourly.0,
    })
}

#[async_trait]
impl ForecastSource for OpenMeteoFetcher {
    async fn fetch_weather(&self, location: &Location) -> Result<WeatherSeries, FetchError> {
        let url = self.request(location)?;

        let body = get_text(&self.http, ENDPOINT, url).await?;
        if body.trim().is_empty() {
            return Err(FetchError::NoData);
        }

        let series = decode_series(&body, Utc::now()).map_err(|source| {
            tracing::warn!("Error decoding weather data: {source}");
            FetchError::Decode { endpoint: ENDPOINT, source }
        })?;

        tracing::debug!(
            "Fetched {} hourly samples for {}",
            series.samples.len(),
            location.display_name
        );
        Ok(series)
    }
}
