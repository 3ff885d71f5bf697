use anyhow::{Context, anyhow};
use clap::{ArgAction, Parser, Subcommand};
use inquire::Text;
use std::path::PathBuf;
use weatherbook_core::{AppState, Config, Coordinate, Location, StaticCoordinate};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherbook", version, about = "Hourly weather, favorites and snapshots")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set endpoints and the data directory.
    Configure,

    /// Look up a place and show its weather for the current hour.
    Search {
        /// Place name or address.
        query: String,

        /// Also add the place to favorites.
        #[arg(long)]
        favorite: bool,

        /// Also save the fetched forecast as a snapshot.
        #[arg(long)]
        snapshot: bool,
    },

    /// Show weather for the current position.
    Here {
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
    },

    /// List favorite places.
    Favorites,

    /// Remove a favorite by id (as printed by `favorites`).
    Unfavorite { id: String },

    /// List saved snapshots.
    Snapshots,

    /// Inspect or delete a saved snapshot.
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum SnapshotAction {
    /// Show the weather recorded in a snapshot.
    Show { id: String },
    /// Delete a snapshot.
    Delete { id: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        if matches!(self.command, Command::Configure) {
            return configure();
        }

        let config = Config::load()?;
        let app = AppState::from_config(&config)?;

        match self.command {
            Command::Configure => configure()?,
            Command::Search { query, favorite, snapshot } => {
                let location = found(app.search(&query).await?)?;
                show_weather(&app, location, favorite, snapshot).await?;
            }
            Command::Here { lat, lon } => {
                let source = StaticCoordinate(
                    lat.zip(lon).map(|(latitude, longitude)| Coordinate { latitude, longitude }),
                );
                let location = found(app.locate_current(&source).await?)?;
                show_weather(&app, location, false, false).await?;
            }
            Command::Favorites => render::favorites(&app.favorites()),
            Command::Unfavorite { id } => {
                let location =
                    app.favorite(&id).ok_or_else(|| anyhow!("No favorite with id {id}"))?;
                app.remove_favorite(&location);
                println!("Removed {} from favorites.", location.display_name);
            }
            Command::Snapshots => render::snapshots(&app.snapshots()),
            Command::Snapshot { action } => match action {
                SnapshotAction::Show { id } => {
                    let snapshot =
                        app.snapshot(&id).ok_or_else(|| anyhow!("No snapshot with id {id}"))?;
                    render::snapshot(&snapshot);
                }
                SnapshotAction::Delete { id } => {
                    let snapshot =
                        app.snapshot(&id).ok_or_else(|| anyhow!("No snapshot with id {id}"))?;
                    app.remove_snapshot(&snapshot);
                    println!("Deleted snapshot {id}.");
                }
            },
        }

        Ok(())
    }
}

fn found(location: Option<Location>) -> anyhow::Result<Location> {
    location.ok_or_else(|| anyhow!("Location not found"))
}

async fn show_weather(
    app: &AppState,
    location: Location,
    favorite: bool,
    snapshot: bool,
) -> anyhow::Result<()> {
    if favorite && app.add_favorite(&location) {
        tracing::info!("Added {} to favorites", location.display_name);
    }

    let weather = app.weather_for(&location).await?;

    render::location_weather(&location, &weather, app.is_favorite(&location));

    if snapshot {
        let saved = app.capture_snapshot(location, weather);
        println!("\nSaved snapshot {}.", saved.id);
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let current = Config::load()?;

    let geocoding_url = Text::new("Geocoding search URL:")
        .with_default(&current.geocoding_url)
        .prompt()
        .context("Failed to read geocoding URL")?;
    let reverse_geocoding_url = Text::new("Reverse geocoding URL:")
        .with_default(&current.reverse_geocoding_url)
        .prompt()
        .context("Failed to read reverse geocoding URL")?;
    let forecast_url = Text::new("Forecast URL:")
        .with_default(&current.forecast_url)
        .prompt()
        .context("Failed to read forecast URL")?;
    let user_agent = Text::new("User agent:")
        .with_default(&current.user_agent)
        .prompt()
        .context("Failed to read user agent")?;
    let data_dir = Text::new("Data directory (empty for the platform default):")
        .with_initial_value(
            &current.data_dir.as_ref().map(|d| d.display().to_string()).unwrap_or_default(),
        )
        .prompt()
        .context("Failed to read data directory")?;

    let config = Config {
        geocoding_url,
        reverse_geocoding_url,
        forecast_url,
        user_agent,
        data_dir: Some(data_dir.trim()).filter(|d| !d.is_empty()).map(PathBuf::from),
    };
    config.save()?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}
