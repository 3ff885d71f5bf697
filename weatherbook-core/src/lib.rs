//! Core library for the `weatherbook` CLI.
//!
//! This crate defines:
//! - Place lookup (geocoding) and one-day hourly forecasts
//! - Lookup of the forecast hour covering a given instant
//! - Favorites and weather snapshots, persisted best effort
//! - Configuration of endpoints and data locations
//!
//! It is used by `weatherbook-cli`, but can also be reused by other front ends.

pub mod app;
pub mod config;
pub mod error;
pub mod model;
pub mod position;
pub mod provider;
pub mod store;
pub mod timeline;

pub use app::AppState;
pub use config::Config;
pub use error::{FetchError, LocateError, LocationError};
pub use model::{Address, Coordinate, HourlySample, HourlyUnits, Location, Snapshot, WeatherSeries};
pub use position::{CoordinateSource, StaticCoordinate};
pub use provider::{ForecastSource, LocationResolver};
pub use store::{CollectionStore, Keyed};
pub use timeline::{hour_truncate, index_at};
