//! Process configuration from `CARPOOL_*` environment variables.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{info, warn};

use crate::matcher::DEFAULT_TOLERANCE;

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_BACKEND_URL: &str = "http://localhost:8000/api";
const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_USER_AGENT: &str = "carpool-server/0.1";

/// Errors from reading the environment.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("no directions source: set CARPOOL_DIRECTIONS_API_KEY or CARPOOL_MOCK_DIRECTIONS")]
    NoDirections,
}

/// Where routes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectionsSource {
    Live { api_key: String },
    Mock { path: PathBuf },
}

/// Settings for the whole server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub directions: DirectionsSource,
    pub backend_url: String,
    pub csrf_token: String,
    pub session_cookie: String,
    pub nominatim_url: String,
    pub user_agent: String,
    pub store_dir: PathBuf,
    pub static_dir: PathBuf,
    pub match_tolerance: f64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // A mock file takes precedence so development never hits the live API.
        let directions = match (var("CARPOOL_MOCK_DIRECTIONS"), var("CARPOOL_DIRECTIONS_API_KEY")) {
            (Some(path), _) => {
                info!(%path, "Using recorded directions responses");
                DirectionsSource::Mock { path: path.into() }
            }
            (None, Some(api_key)) => DirectionsSource::Live { api_key },
            (None, None) => return Err(ConfigError::NoDirections),
        };

        let csrf_token = var("CARPOOL_BACKEND_CSRF").unwrap_or_else(|| {
            warn!("CARPOOL_BACKEND_CSRF not set. Backend calls will be rejected.");
            String::new()
        });
        let session_cookie = var("CARPOOL_BACKEND_SESSION").unwrap_or_else(|| {
            warn!("CARPOOL_BACKEND_SESSION not set. Backend calls will be rejected.");
            String::new()
        });

        Ok(Self {
            bind: parse_or(&var, "CARPOOL_BIND", DEFAULT_BIND)?,
            directions,
            backend_url: string_or(&var, "CARPOOL_BACKEND_URL", DEFAULT_BACKEND_URL),
            csrf_token,
            session_cookie,
            nominatim_url: string_or(&var, "CARPOOL_NOMINATIM_URL", DEFAULT_NOMINATIM_URL),
            user_agent: string_or(&var, "CARPOOL_USER_AGENT", DEFAULT_USER_AGENT),
            store_dir: string_or(&var, "CARPOOL_STORE_DIR", "sessions").into(),
            static_dir: string_or(&var, "CARPOOL_STATIC_DIR", "static").into(),
            match_tolerance: tolerance(parse_or(
                &var,
                "CARPOOL_MATCH_TOLERANCE",
                &DEFAULT_TOLERANCE.to_string(),
            )?)?,
        })
    }
}

/// A match tolerance must be a finite, non-negative number of degrees.
fn tolerance(value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key: "CARPOOL_MATCH_TOLERANCE",
            message: format!("{value} is not a finite, non-negative number of degrees"),
        })
    }
}

fn string_or(var: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_or<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    string_or(var, key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_with_api_key() {
        let config = config(&[("CARPOOL_DIRECTIONS_API_KEY", "k")]).unwrap();

        assert_eq!(
            config.directions,
            DirectionsSource::Live {
                api_key: "k".into()
            }
        );
        assert_eq!(config.bind, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.store_dir, PathBuf::from("sessions"));
        assert_eq!(config.match_tolerance, 0.0005);
        assert!(config.csrf_token.is_empty());
    }

    #[test]
    fn mock_wins_over_api_key() {
        let config = config(&[
            ("CARPOOL_DIRECTIONS_API_KEY", "k"),
            ("CARPOOL_MOCK_DIRECTIONS", "data/mock_directions"),
        ])
        .unwrap();

        assert!(matches!(config.directions, DirectionsSource::Mock { .. }));
    }

    #[test]
    fn requires_a_directions_source() {
        assert_eq!(config(&[]).unwrap_err(), ConfigError::NoDirections);
        assert_eq!(
            config(&[("CARPOOL_DIRECTIONS_API_KEY", "  ")]).unwrap_err(),
            ConfigError::NoDirections
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config(&[
            ("CARPOOL_DIRECTIONS_API_KEY", "k"),
            ("CARPOOL_BIND", "0.0.0.0:8080"),
            ("CARPOOL_MATCH_TOLERANCE", "0.001"),
            ("CARPOOL_BACKEND_CSRF", "tok"),
        ])
        .unwrap();

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.match_tolerance, 0.001);
        assert_eq!(config.csrf_token, "tok");
    }

    #[test]
    fn invalid_values_are_errors() {
        let err = config(&[
            ("CARPOOL_DIRECTIONS_API_KEY", "k"),
            ("CARPOOL_MATCH_TOLERANCE", "wide"),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "CARPOOL_MATCH_TOLERANCE",
                ..
            }
        ));
    }

    #[test]
    fn tolerance_must_be_finite_and_non_negative() {
        for bad in ["-0.001", "NaN", "inf", "-inf"] {
            let err = config(&[
                ("CARPOOL_DIRECTIONS_API_KEY", "k"),
                ("CARPOOL_MATCH_TOLERANCE", bad),
            ])
            .unwrap_err();
            assert!(
                matches!(
                    err,
                    ConfigError::Invalid {
                        key: "CARPOOL_MATCH_TOLERANCE",
                        ..
                    }
                ),
                "{bad} was accepted"
            );
        }

        let exact = config(&[
            ("CARPOOL_DIRECTIONS_API_KEY", "k"),
            ("CARPOOL_MATCH_TOLERANCE", "0"),
        ])
        .unwrap();
        assert_eq!(exact.match_tolerance, 0.0);
    }
}
