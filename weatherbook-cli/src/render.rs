//! Human-readable console output.

use chrono::{DateTime, Local, Utc};
use weatherbook_core::{HourlySample, HourlyUnits, Location, Snapshot, WeatherSeries};

pub fn location_weather(location: &Location, weather: &WeatherSeries, favorite: bool) {
    let mark = if favorite { "  ♥" } else { "" };
    println!("{}{mark}", location.display_name);
    println!("id: {}", location.id());
    println!();
    conditions("Current Weather", weather.current_sample(), &weather.units);
}

pub fn favorites(locations: &[Location]) {
    if locations.is_empty() {
        println!("No favorite locations yet.");
        return;
    }

    println!("Favorite Locations");
    for location in locations {
        println!("  {:<28} {}", location.id(), location.display_name);
    }
}

pub fn snapshots(snapshots: &[Snapshot]) {
    if snapshots.is_empty() {
        println!("No saved weather snapshots.");
        return;
    }

    println!("Saved Weather Snapshots");
    for snapshot in snapshots {
        println!(
            "  {}  {}  ({})",
            snapshot.id,
            snapshot.location.display_name,
            timestamp(snapshot.weather.captured_at)
        );
    }
}

pub fn snapshot(snapshot: &Snapshot) {
    println!("{}", snapshot.location.display_name);
    println!("Captured {}", timestamp(snapshot.weather.captured_at));
    println!();
    conditions("Weather at Capture", snapshot.captured_sample(), &snapshot.weather.units);
}

fn conditions(title: &str, sample: Option<&HourlySample>, units: &HourlyUnits) {
    match sample {
        Some(sample) => {
            for line in condition_lines(title, sample, units) {
                println!("{line}");
            }
        }
        None => println!("{title} data not available"),
    }
}

fn condition_lines(title: &str, sample: &HourlySample, units: &HourlyUnits) -> Vec<String> {
    vec![
        title.to_string(),
        format!("  Temperature:               {:.1} {}", sample.temperature, units.temperature),
        format!("  Precipitation Probability: {}%", sample.precipitation_probability),
        format!("  Precipitation:             {:.1} {}", sample.precipitation, units.precipitation),
    ]
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %-d, %Y at %-I:%M %p").to_string()
}
