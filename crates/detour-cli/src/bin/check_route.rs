//! Check a planned route against a weather-alert feed and print the
//! detour, if any, as JSON.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use detour_core::{evaluate_hazards, hazard_groups, DetourConfig, GeoPoint, WeatherAlert};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "check_route",
    about = "Evaluate a route against weather-alert polygons and emit detour waypoints"
)]
struct Args {
    /// Route file: JSON array of {"lat": .., "lon": ..} points in travel order
    #[arg(long)]
    route: PathBuf,

    /// Alert feed file: JSON object with an "alerts" array
    #[arg(long)]
    alerts: PathBuf,

    /// Outward scale factor for detour waypoints
    #[arg(long, default_value_t = 2.0)]
    scale_factor: f64,

    /// Waypoint budget, including the trimmed entry/exit endpoints
    #[arg(long, default_value_t = 10)]
    max_waypoints: usize,
}

#[derive(Debug, Deserialize)]
struct AlertFeed {
    alerts: Vec<WeatherAlert>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let route_json = fs::read_to_string(&args.route)
        .with_context(|| format!("reading route file {}", args.route.display()))?;
    let route: Vec<GeoPoint> =
        serde_json::from_str(&route_json).context("parsing route file")?;

    let feed_json = fs::read_to_string(&args.alerts)
        .with_context(|| format!("reading alert feed {}", args.alerts.display()))?;
    let feed: AlertFeed = serde_json::from_str(&feed_json).context("parsing alert feed")?;

    let now = Utc::now();
    let groups = hazard_groups(&feed.alerts, now);
    tracing::info!(
        alerts = feed.alerts.len(),
        groups = groups.len(),
        route_points = route.len(),
        "evaluating route"
    );

    let config = DetourConfig {
        scale_factor: args.scale_factor,
        max_waypoints: args.max_waypoints,
    };
    let result = evaluate_hazards(&route, &groups, &config);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
