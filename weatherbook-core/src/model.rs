use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Keyed;

/// A plain latitude/longitude pair, e.g. from the device position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A geocoded place, in the shape the geocoding endpoint returns it.
///
/// `lat`/`lon` keep the original decimal text. They are parsed on demand and
/// they form the identity key, so formatting a float never changes identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub place_id: Option<i64>,
    pub lat: String,
    pub lon: String,
    pub display_name: String,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: String,
    pub country_code: Option<String>,
}

impl Location {
    /// Placeholder used when no place could be determined.
    pub fn unknown() -> Self {
        Self {
            place_id: None,
            lat: "0".to_string(),
            lon: "0".to_string(),
            display_name: "Unknown Location".to_string(),
            address: None,
        }
    }

    /// Identity key: `"{lat}_{lon}"` over the original text.
    pub fn id(&self) -> String {
        format!("{}_{}", self.lat, self.lon)
    }

    /// Parsed latitude; unparsable text yields `0.0`.
    pub fn latitude(&self) -> f64 {
        parse_degrees("latitude", &self.lat)
    }

    /// Parsed longitude; unparsable text yields `0.0`.
    pub fn longitude(&self) -> f64 {
        parse_degrees("longitude", &self.lon)
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate { latitude: self.latitude(), longitude: self.longitude() }
    }
}

fn parse_degrees(axis: &str, raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("Invalid {axis} value: {raw:?}");
            0.0
        }
    }
}

impl Keyed for Location {
    fn key(&self) -> String {
        self.id()
    }
}

/// Unit labels reported alongside the hourly values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyUnits {
    pub time: String,
    pub temperature: String,
    pub precipitation_probability: String,
    pub precipitation: String,
}

/// One forecast hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub precipitation_probability: i32,
    pub precipitation: f64,
}

/// Decoded hourly forecast for one location.
///
/// `captured_at` is the local wall-clock time the forecast was fetched, not
/// anything the server reported. `samples` are ascending by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSeries {
    pub captured_at: DateTime<Utc>,
    pub units: HourlyUnits,
    pub samples: Vec<HourlySample>,
}

/// A saved pairing of a location and the forecast fetched for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: Uuid,
    pub location: Location,
    pub weather: WeatherSeries,
}

impl Snapshot {
    /// Wrap a location and forecast under a freshly generated id.
    pub fn new(location: Location, weather: WeatherSeries) -> Self {
        Self { id: Uuid::new_v4(), location, weather }
    }
}

impl Keyed for Snapshot {
    fn key(&self) -> String {
        self.id.to_string()
    }
}
