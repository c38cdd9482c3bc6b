use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use feed::{FeedConfig, FilterSelection, MagnitudeThreshold, TimeRange};
use foundation::math::Vec3;
use scene::composer::RotationRates;
use shell::ViewConfig;

/// Process configuration, read once from `QUAKE_*` environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub feed: FeedConfig,
    pub initial_filter: FilterSelection,
    pub view: ViewConfig,
    /// Directory holding the Earth and planet textures.
    pub texture_dir: PathBuf,
    pub frame_interval: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key: &str| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let addr = lookup("QUAKE_ADDR")
            .unwrap_or_else(|| "127.0.0.1:9200".to_string())
            .parse()
            .map_err(|e| format!("invalid QUAKE_ADDR: {e}"))?;

        let defaults = FeedConfig::default();
        let feed = FeedConfig {
            base_url: lookup("QUAKE_FEED_URL").unwrap_or(defaults.base_url),
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "QUAKE_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            refresh_interval: Duration::from_secs(parse_or(
                &lookup,
                "QUAKE_REFRESH_SECS",
                defaults.refresh_interval.as_secs(),
            )?),
        };
        if feed.timeout.is_zero() {
            return Err("QUAKE_TIMEOUT_SECS must be positive".to_string());
        }
        if feed.refresh_interval.is_zero() {
            return Err("QUAKE_REFRESH_SECS must be positive".to_string());
        }

        let time_range: TimeRange = match lookup("QUAKE_TIME_RANGE") {
            Some(raw) => raw.parse().map_err(|e| format!("{e}"))?,
            None => TimeRange::default(),
        };
        let magnitude_threshold: MagnitudeThreshold = match lookup("QUAKE_MAG_THRESHOLD") {
            Some(raw) => raw.parse().map_err(|e| format!("{e}"))?,
            None => MagnitudeThreshold::default(),
        };

        let texture_dir = lookup("QUAKE_TEXTURE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("assets/textures"));
        let resource_capacity = match lookup("QUAKE_RESOURCE_CAPACITY") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<usize>()
                    .map_err(|e| format!("invalid QUAKE_RESOURCE_CAPACITY `{raw}`: {e}"))?,
            ),
            None => None,
        };

        let default_rates = RotationRates::default();
        let rates = RotationRates {
            earth: parse_finite(&lookup, "QUAKE_EARTH_RATE", default_rates.earth)?,
            clouds: parse_finite(&lookup, "QUAKE_CLOUDS_RATE", default_rates.clouds)?,
            stars: parse_finite(&lookup, "QUAKE_STARS_RATE", default_rates.stars)?,
        };

        let mut view = ViewConfig {
            resource_capacity,
            rates,
            ..ViewConfig::default()
        };
        if let Some(raw) = lookup("QUAKE_SUN_DIRECTION") {
            view.globe.sun_direction = parse_direction(&raw)?;
        }

        let frame_hz: f64 = parse_or(&lookup, "QUAKE_FRAME_HZ", 60.0)?;
        if !(frame_hz.is_finite() && frame_hz > 0.0) {
            return Err("QUAKE_FRAME_HZ must be a positive number".to_string());
        }

        Ok(Self {
            addr,
            feed,
            initial_filter: FilterSelection::new(time_range, magnitude_threshold),
            view,
            texture_dir,
            frame_interval: Duration::from_secs_f64(1.0 / frame_hz),
        })
    }
}

/// Unset falls back to `default`; set but malformed is an error.
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("invalid {key} `{raw}`: {e}")),
        None => Ok(default),
    }
}

fn parse_finite(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: f64,
) -> Result<f64, String> {
    let value = parse_or(lookup, key, default)?;
    if !value.is_finite() {
        return Err(format!("{key} must be finite"));
    }
    Ok(value)
}

/// `x,y,z`, any non-zero finite vector.
fn parse_direction(raw: &str) -> Result<Vec3, String> {
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid QUAKE_SUN_DIRECTION `{raw}`: {e}"))?;
    let &[x, y, z] = parts.as_slice() else {
        return Err(format!("QUAKE_SUN_DIRECTION needs three components, got `{raw}`"));
    };
    let direction = Vec3::new(x, y, z);
    if !parts.iter().all(|c| c.is_finite()) || direction.normalize().is_none() {
        return Err("QUAKE_SUN_DIRECTION must be a finite non-zero vector".to_string());
    }
    Ok(direction)
}
