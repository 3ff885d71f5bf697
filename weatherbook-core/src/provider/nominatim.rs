use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{Coordinate, Location},
    provider::get_text,
};

use super::LocationResolver;

const ENDPOINT: &str = "geocoding";

/// Geocoder backed by a Nominatim-compatible search API.
#[derive(Debug, Clone)]
pub struct NominatimResolver {
    http: Client,
    search_url: String,
    reverse_url: String,
}

impl NominatimResolver {
    pub fn new(http: Client, search_url: String, reverse_url: String) -> Self {
        Self { http, search_url, reverse_url }
    }

    /// URL construction failures come back as `None`: the caller sees "no
    /// match", not an error.
    fn search_request(&self, query: &str) -> Option<Url> {
        let params = [("q", query), ("format", "json"), ("addressdetails", "1")];
        match Url::parse_with_params(&self.search_url, &params) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!("Cannot build geocoding URL from {:?}: {e}", self.search_url);
                None
            }
        }
    }

    fn reverse_request(&self, coordinate: Coordinate) -> Option<Url> {
        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();
        let params = [
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("format", "json"),
            ("addressdetails", "1"),
            ("zoom", "10"),
        ];
        match Url::parse_with_params(&self.reverse_url, &params) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!(
                    "Cannot build reverse geocoding URL from {:?}: {e}",
                    self.reverse_url
                );
                None
            }
        }
    }
}

/// Reverse lookups answer either a place or `{"error": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReverseReply {
    Found(Location),
    Missing { error: String },
}

#[async_trait]
impl LocationResolver for NominatimResolver {
    async fn resolve(&self, query: &str) -> Result<Option<Location>, FetchError> {
        let Some(url) = self.search_request(query) else {
            return Ok(None);
        };

        let body = get_text(&self.http, ENDPOINT, url).await?;

        let candidates: Vec<Location> = serde_json::from_str(&body).map_err(|source| {
            tracing::warn!("Error decoding location data: {source}");
            FetchError::Decode { endpoint: ENDPOINT, source }
        })?;

        tracing::debug!("{} candidate(s) for {query:?}", candidates.len());
        Ok(candidates.into_iter().next())
    }

    async fn reverse(&self, coordinate: Coordinate) -> Result<Option<Location>, FetchError> {
        let Some(url) = self.reverse_request(coordinate) else {
            return Ok(None);
        };

        let body = get_text(&self.http, ENDPOINT, url).await?;

        let reply: ReverseReply = serde_json::from_str(&body)
            .map_err(|source| FetchError::Decode { endpoint: ENDPOINT, source })?;

        match reply {
            ReverseReply::Found(location) => Ok(Some(location)),
            ReverseReply::Missing { error } => {
                tracing::debug!("Reverse geocoding found nothing: {error}");
                Ok(None)
            }
        }
    }
}
