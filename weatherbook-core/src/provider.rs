use crate::{
    Config,
    error::{FetchError, truncate_body},
    model::{Coordinate, Location, WeatherSeries},
    provider::{nominatim::NominatimResolver, open_meteo::OpenMeteoFetcher},
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::fmt::Debug;

pub mod nominatim;
pub mod open_meteo;

/// Turns free text (or a coordinate) into a place.
#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    /// First candidate for `query`, or `None` when nothing matched.
    async fn resolve(&self, query: &str) -> Result<Option<Location>, FetchError>;

    /// Place containing `coordinate`, or `None` when the geocoder has nothing.
    async fn reverse(&self, coordinate: Coordinate) -> Result<Option<Location>, FetchError>;
}

/// Retrieves the hourly forecast for a place.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch_weather(&self, location: &Location) -> Result<WeatherSeries, FetchError>;
}

/// Shared HTTP client carrying the configured user agent.
pub fn http_client(config: &Config) -> anyhow::Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .build()
        .context("Failed to build HTTP client")
}

/// Construct the geocoder described by `config`.
pub fn resolver_from_config(
    config: &Config,
    http: Client,
) -> Box<dyn LocationResolver> {
    Box::new(NominatimResolver::new(
        http,
        config.geocoding_url.clone(),
        config.reverse_geocoding_url.clone(),
    ))
}

/// Construct the forecast client described by `config`.
pub fn forecast_from_config(config: &Config, http: Client) -> Box<dyn ForecastSource> {
    Box::new(OpenMeteoFetcher::new(http, config.forecast_url.clone()))
}

/// GET `url` and return the body of a successful response.
pub(crate) async fn get_text(
    http: &Client,
    endpoint: &'static str,
    url: Url,
) -> Result<String, FetchError> {
    tracing::debug!(%url, "{endpoint} request");

    let res = http
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Transport { endpoint, source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| FetchError::Transport { endpoint, source })?;

    if !status.is_success() {
        return Err(FetchError::Status { endpoint, status, body: truncate_body(&body) });
    }

    Ok(body)
}
