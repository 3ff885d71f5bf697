//! Lookup of the hourly sample covering a given instant.

use chrono::{DateTime, Duration, DurationRound, Utc};

use crate::model::{HourlySample, Snapshot, WeatherSeries};

/// Round `instant` down to the start of its hour (UTC).
pub fn hour_truncate(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.duration_trunc(Duration::hours(1)).unwrap_or(instant)
}

/// Position of the first sample in the same hour as `instant`.
pub fn index_at(series: &WeatherSeries, instant: DateTime<Utc>) -> Option<usize> {
    let hour = hour_truncate(instant);
    series
        .samples
        .iter()
        .position(|sample| hour_truncate(sample.time) == hour)
}

impl WeatherSeries {
    pub fn sample_at(&self, instant: DateTime<Utc>) -> Option<&HourlySample> {
        index_at(self, instant).map(|i| &self.samples[i])
    }

    /// Sample for the hour we are in right now.
    pub fn current_sample(&self) -> Option<&HourlySample> {
        self.sample_at(Utc::now())
    }
}

impl Snapshot {
    /// Sample for the hour the snapshot's forecast was fetched in.
    pub fn captured_sample(&self) -> Option<&HourlySample> {
        self.weather.sample_at(self.weather.captured_at)
    }
}
