//! Application state shared by every front end.

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::{
    Config,
    error::{FetchError, LocateError},
    model::{Location, Snapshot, WeatherSeries},
    position::CoordinateSource,
    provider::{
        ForecastSource, LocationResolver, forecast_from_config, http_client, resolver_from_config,
    },
    store::{BlobStore, CollectionStore, FileBlob, KeyValueFile, KeyValueStore, Keyed, KeyedBlob},
};

/// Owns the favorites and snapshots collections and drives the network
/// clients. Every method takes `&self`, so one instance can be shared.
#[derive(Debug)]
pub struct AppState {
    resolver: Box<dyn LocationResolver>,
    forecast: Box<dyn ForecastSource>,
    favorites: Mutex<CollectionStore<Location>>,
    snapshots: Mutex<CollectionStore<Snapshot>>,
}

impl AppState {
    /// Both collections are loaded before this returns.
    pub fn new(
        resolver: Box<dyn LocationResolver>,
        forecast: Box<dyn ForecastSource>,
        favorites: Box<dyn BlobStore>,
        snapshots: Box<dyn BlobStore>,
    ) -> Self {
        Self {
            resolver,
            forecast,
            favorites: Mutex::new(CollectionStore::open("favorites", favorites)),
            snapshots: Mutex::new(CollectionStore::open("snapshots", snapshots)),
        }
    }

    /// Wire up the public endpoints and on-disk storage named by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = http_client(config)?;
        let preferences: Arc<dyn KeyValueStore> =
            Arc::new(KeyValueFile::new(config.preferences_path()?));

        Ok(Self::new(
            resolver_from_config(config, http.clone()),
            forecast_from_config(config, http),
            Box::new(KeyedBlob::new(preferences, crate::config::FAVORITES_KEY)),
            Box::new(FileBlob::new(config.snapshots_path()?)),
        ))
    }

    pub fn favorites(&self) -> Vec<Location> {
        self.favorites.lock().items().to_vec()
    }

    pub fn favorite(&self, id: &str) -> Option<Location> {
        self.favorites.lock().get(id).cloned()
    }

    pub fn add_favorite(&self, location: &Location) -> bool {
        self.favorites.lock().add(location.clone())
    }

    pub fn remove_favorite(&self, location: &Location) -> bool {
        self.favorites.lock().remove(&location.key())
    }

    pub fn is_favorite(&self, location: &Location) -> bool {
        self.favorites.lock().contains(&location.key())
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots.lock().items().to_vec()
    }

    pub fn snapshot(&self, id: &str) -> Option<Snapshot> {
        self.snapshots.lock().get(id).cloned()
    }

    pub fn add_snapshot(&self, snapshot: Snapshot) -> bool {
        self.snapshots.lock().add(snapshot)
    }

    pub fn remove_snapshot(&self, snapshot: &Snapshot) -> bool {
        self.snapshots.lock().remove(&snapshot.key())
    }

    /// Save `weather` for `location` as a new snapshot and return it.
    pub fn capture_snapshot(&self, location: Location, weather: WeatherSeries) -> Snapshot {
        let snapshot = Snapshot::new(location, weather);
        self.add_snapshot(snapshot.clone());
        snapshot
    }

    pub async fn search(&self, query: &str) -> Result<Option<Location>, FetchError> {
        self.resolver.resolve(query).await
    }

    pub async fn weather_for(&self, location: &Location) -> Result<WeatherSeries, FetchError> {
        self.forecast.fetch_weather(location).await
    }

    /// Resolve `query`, then fetch the forecast for the match.
    pub async fn lookup(
        &self,
        query: &str,
    ) -> Result<Option<(Location, WeatherSeries)>, FetchError> {
        let Some(location) = self.search(query).await? else {
            return Ok(None);
        };

        let weather = self.weather_for(&location).await?;
        Ok(Some((location, weather)))
    }

    /// Place for the device's current position.
    ///
    /// The coordinate is reverse geocoded to a "city, state, country" name
    /// which is then searched like typed text. `None` when either lookup
    /// comes back empty.
    pub async fn locate_current(
        &self,
        source: &dyn CoordinateSource,
    ) -> Result<Option<Location>, LocateError> {
        let coordinate = source.request_current_coordinate().await?;
        tracing::debug!(
            "Current position: {}, {}",
            coordinate.latitude,
            coordinate.longitude
        );

        let Some(place) = self.resolver.reverse(coordinate).await? else {
            return Ok(None);
        };

        let name = place_name(&place);
        Ok(self.search(&name).await?)
    }
}

fn place_name(place: &Location) -> String {
    let Some(address) = &place.address else {
        return place.display_name.clone();
    };

    [address.city.as_deref(), address.state.as_deref(), Some(address.country.as_str())]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::LocationError,
        model::{Address, Coordinate, HourlySample, HourlyUnits},
        position::StaticCoordinate,
        store::MemoryBlob,
    };
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct FakeResolver {
        places: HashMap<String, Location>,
        reverse: Option<Location>,
    }

    #[async_trait]
    impl LocationResolver for FakeResolver {
        async fn resolve(&self, query: &str) -> Result<Option<Location>, FetchError> {
            Ok(self.places.get(query).cloned())
        }

        async fn reverse(&self, _: Coordinate) -> Result<Option<Location>, FetchError> {
            Ok(self.reverse.clone())
        }
    }

    #[derive(Debug)]
    struct FakeForecast {
        fail: bool,
    }

    #[async_trait]
    impl ForecastSource for FakeForecast {
        async fn fetch_weather(&self, _: &Location) -> Result<WeatherSeries, FetchError> {
            if self.fail {
                return Err(FetchError::NoData);
            }
            Ok(series())
        }
    }

    fn series() -> WeatherSeries {
        let now = Utc::now();
        WeatherSeries {
            captured_at: now,
            units: HourlyUnits {
                time: "iso8601".into(),
                temperature: "°F".into(),
                precipitation_probability: "%".into(),
                precipitation: "mm".into(),
            },
            samples: (-1..23)
                .map(|h| HourlySample {
                    time: crate::timeline::hour_truncate(now) + Duration::hours(h),
                    temperature: 60.0,
                    precipitation_probability: 5,
                    precipitation: 0.0,
                })
                .collect(),
        }
    }

    fn paris() -> Location {
        Location {
            place_id: Some(88066),
            lat: "48.8566".into(),
            lon: "2.3522".into(),
            display_name: "Paris, France".into(),
            address: Some(Address {
                city: Some("Paris".into()),
                county: None,
                state: Some("Ile-de-France".into()),
                country: "France".into(),
                country_code: Some("fr".into()),
            }),
        }
    }

    fn app_with(
        resolver: FakeResolver,
        fail: bool,
        favorites: &MemoryBlob,
        snapshots: &MemoryBlob,
    ) -> AppState {
        AppState::new(
            Box::new(resolver),
            Box::new(FakeForecast { fail }),
            Box::new(favorites.clone()),
            Box::new(snapshots.clone()),
        )
    }

    fn app() -> AppState {
        let mut resolver = FakeResolver::default();
        resolver.places.insert("Paris".into(), paris());
        app_with(resolver, false, &MemoryBlob::default(), &MemoryBlob::default())
    }

    #[test]
    fn favorites_toggle_by_identity() {
        let app = app();
        let loc = paris();

        assert!(!app.is_favorite(&loc));
        assert!(app.add_favorite(&loc));
        assert!(!app.add_favorite(&Location { display_name: "Paris".into(), ..paris() }));
        assert!(app.is_favorite(&loc));
        assert_eq!(app.favorites().len(), 1);

        assert!(app.remove_favorite(&loc));
        assert!(!app.is_favorite(&loc));
        assert!(app.favorites().is_empty());
    }

    #[test]
    fn collections_load_on_construction() {
        let favorites = MemoryBlob::default();
        let snapshots = MemoryBlob::default();
        {
            let app = app_with(FakeResolver::default(), false, &favorites, &snapshots);
            app.add_favorite(&paris());
            app.capture_snapshot(paris(), series());
        }

        let app = app_with(FakeResolver::default(), false, &favorites, &snapshots);
        assert_eq!(app.favorites(), vec![paris()]);
        assert_eq!(app.snapshots().len(), 1);
    }

    #[test]
    fn corrupt_favorites_start_empty() {
        let favorites = MemoryBlob::with_contents(b"\x00\x01 nope".to_vec());
        let app = app_with(FakeResolver::default(), false, &favorites, &MemoryBlob::default());
        assert!(app.favorites().is_empty());
    }

    #[test]
    fn snapshots_are_keyed_by_id() {
        let app = app();
        let first = app.capture_snapshot(paris(), series());
        let second = app.capture_snapshot(paris(), series());

        assert_eq!(app.snapshots().len(), 2);
        assert!(!app.add_snapshot(first.clone()));
        assert_eq!(app.snapshot(&second.id.to_string()), Some(second.clone()));

        assert!(app.remove_snapshot(&first));
        let left = app.snapshots();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, second.id);
    }

    #[tokio::test]
    async fn lookup_resolves_then_fetches() {
        let app = app();
        let (location, weather) = app.lookup("Paris").await.unwrap().expect("found");

        assert_eq!(location.id(), "48.8566_2.3522");
        assert_eq!(weather.samples.len(), 24);
        assert!(weather.current_sample().is_some());
    }

    #[tokio::test]
    async fn lookup_unknown_place_is_none() {
        assert!(app().lookup("Atlantis").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lookup_surfaces_fetch_errors() {
        let mut resolver = FakeResolver::default();
        resolver.places.insert("Paris".into(), paris());
        let app = app_with(resolver, true, &MemoryBlob::default(), &MemoryBlob::default());

        let err = app.lookup("Paris").await.unwrap_err();
        assert!(matches!(err, FetchError::NoData));
    }

    #[tokio::test]
    async fn locate_current_searches_reverse_geocoded_name() {
        let mut resolver = FakeResolver { reverse: Some(paris()), ..Default::default() };
        resolver.places.insert("Paris, Ile-de-France, France".into(), paris());
        let app = app_with(resolver, false, &MemoryBlob::default(), &MemoryBlob::default());

        let here = StaticCoordinate(Some(Coordinate { latitude: 48.85, longitude: 2.35 }));
        let found = app.locate_current(&here).await.unwrap();
        assert_eq!(found, Some(paris()));
    }

    #[tokio::test]
    async fn locate_current_without_reverse_match_is_none() {
        let mut resolver = FakeResolver::default();
        resolver.places.insert("Paris".into(), paris());
        let app = app_with(resolver, false, &MemoryBlob::default(), &MemoryBlob::default());

        let here = StaticCoordinate(Some(Coordinate { latitude: 10.0, longitude: 10.0 }));
        assert_eq!(app.locate_current(&here).await.unwrap(), None);
    }

    #[tokio::test]
    async fn locate_current_without_search_match_is_none() {
        let place = Location {
            lat: "10.0".into(),
            lon: "10.0".into(),
            display_name: "Somewhere remote".into(),
            ..paris()
        };
        let resolver = FakeResolver { reverse: Some(place), ..Default::default() };
        let app = app_with(resolver, false, &MemoryBlob::default(), &MemoryBlob::default());

        let here = StaticCoordinate(Some(Coordinate { latitude: 10.0, longitude: 10.0 }));
        assert_eq!(app.locate_current(&here).await.unwrap(), None);
    }

    #[tokio::test]
    async fn locate_current_reports_denied_permission() {
        let err = app().locate_current(&StaticCoordinate(None)).await.unwrap_err();
        assert!(matches!(err, LocateError::Location(LocationError::PermissionDenied)));
    }

    #[test]
    fn place_name_falls_back_to_display_name() {
        let bare = Location { address: None, ..paris() };
        assert_eq!(place_name(&bare), "Paris, France");
        assert_eq!(place_name(&paris()), "Paris, Ile-de-France, France");
    }
}
