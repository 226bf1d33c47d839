use rocket::figment::{Figment, providers::{Env, Format, Toml}};
use rocket::Config as RocketConfig;
use serde::Deserialize;
use std::env;

use crate::services::session_store::DEFAULT_IDLE_MINUTES;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_CSRF_SECRET: &str = "samaachar-development-csrf-secret";

/// Settings read from `Rocket.toml` and `ROCKET_*` variables, next to
/// Rocket's own.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_csrf_secret")]
    pub csrf_secret: String,
    /// Minutes without a request before a session is dropped.
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: i64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_csrf_secret() -> String {
    DEFAULT_CSRF_SECRET.to_string()
}

fn default_session_idle_minutes() -> i64 {
    DEFAULT_IDLE_MINUTES
}

impl Config {
    pub fn figment() -> Figment {
        // Get the current profile
        let profile = env::var("ROCKET_PROFILE")
            .unwrap_or_else(|_| RocketConfig::DEFAULT_PROFILE.to_string());

        Figment::from(RocketConfig::default())
            .merge(Toml::file("Rocket.toml").nested())
            .select(&profile)
            .merge(Env::prefixed("ROCKET_").ignore(&["PROFILE"]).global())
    }

    pub fn from_figment(figment: &Figment) -> Result<Config, rocket::figment::Error> {
        figment.extract()
    }

    pub fn idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_idle_minutes.max(1))
    }

    pub fn uses_default_secret(&self) -> bool {
        self.csrf_secret == DEFAULT_CSRF_SECRET
    }

    pub fn is_development() -> bool {
        let profile = env::var("ROCKET_PROFILE")
            .unwrap_or_else(|_| RocketConfig::DEFAULT_PROFILE.to_string());
        profile == "debug" || profile == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::figment::providers::Serialized;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = Config::from_figment(&Figment::from(RocketConfig::default())).unwrap();

        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert!(config.uses_default_secret());
        assert_eq!(config.idle_timeout(), chrono::Duration::minutes(120));
    }

    #[test]
    fn keys_are_read_next_to_rocket_settings() {
        let figment = Figment::from(RocketConfig::default())
            .merge(Serialized::default("api_base_url", "https://api.samaachar.in"))
            .merge(Serialized::default("csrf_secret", "s3cret"))
            .merge(Serialized::default("session_idle_minutes", 0));

        let config = Config::from_figment(&figment).unwrap();

        assert_eq!(config.api_base_url, "https://api.samaachar.in");
        assert_eq!(config.csrf_secret, "s3cret");
        assert!(!config.uses_default_secret());
        assert_eq!(config.idle_timeout(), chrono::Duration::minutes(1));
    }
}
