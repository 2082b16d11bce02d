use std::sync::Arc;

use log::Logger;

use crate::analytics::DEFAULT_WINDOW_DAYS;
use crate::config::get_variable_or;
use crate::db::Db;
use crate::records::DEFAULT_DISPLAY_LIMIT;
use crate::timer::DEFAULT_PRESET_SECONDS;
use crate::urls::Urls;

#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub db: Arc<dyn Db + Send + Sync>,
    pub urls: Arc<Urls>,
    pub config: Config,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<dyn Db + Send + Sync>,
        urls: Arc<Urls>,
        config: Config,
    ) -> Self {
        Self {
            logger,
            db,
            urls,
            config,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// How many distinct dates the volume trend keeps.
    pub volume_window_days: usize,

    /// How many recent personal records are returned by default.
    pub pr_display_limit: usize,

    /// The countdown `ironlog-cli rest` uses without `--seconds`.
    pub rest_preset_seconds: u32,
}

impl Config {
    pub fn new(volume_window_days: usize, pr_display_limit: usize, rest_preset_seconds: u32) -> Self {
        Self {
            volume_window_days,
            pr_display_limit,
            rest_preset_seconds,
        }
    }

    /// Reads the optional `IRONLOG_*` tuning variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self::new(
            get_variable_or("IRONLOG_VOLUME_WINDOW_DAYS", defaults.volume_window_days),
            get_variable_or("IRONLOG_PR_DISPLAY_LIMIT", defaults.pr_display_limit),
            get_variable_or("IRONLOG_REST_PRESET_SECONDS", defaults.rest_preset_seconds),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_DAYS, DEFAULT_DISPLAY_LIMIT, DEFAULT_PRESET_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn rest_preset_is_read_from_the_environment() {
        std::env::set_var("IRONLOG_REST_PRESET_SECONDS", "120");

        let config = Config::from_env();

        assert_eq!(config.rest_preset_seconds, 120);
        assert_eq!(Config::default().rest_preset_seconds, 90);
    }
}
