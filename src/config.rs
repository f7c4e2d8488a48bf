//! Runtime configuration for the command line front end.
//!
//! Values come from the environment (a `.env` file is loaded first by
//! `main`).

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config as LogConfig, Root};
use std::error::Error;
use std::path::{Path, PathBuf};

pub const LOG_CONFIG_VAR: &str = "IP_SUBNET_SET_LOG_CONFIG";
pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// log4rs YAML file.
    pub log_config: PathBuf,
    /// Colour terminal output; off when `NO_COLOR` is set.
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_config: PathBuf::from(DEFAULT_LOG_CONFIG),
            color: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Config {
        let defaults = Config::default();
        Config {
            log_config: lookup(LOG_CONFIG_VAR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.log_config),
            color: lookup("NO_COLOR").map_or(defaults.color, |v| v.is_empty()),
        }
    }

    /// Start log4rs from the configured file, or log warnings to stderr
    /// when the file does not exist.
    pub fn init_logging(&self) -> Result<(), Box<dyn Error>> {
        if Path::new(&self.log_config).exists() {
            log4rs::init_file(&self.log_config, Default::default())?;
            log::debug!("Logging configured from {}", self.log_config.display());
            return Ok(());
        }
        let stderr = ConsoleAppender::builder().target(Target::Stderr).build();
        let config = LogConfig::builder()
            .appender(Appender::builder().build("stderr", Box::new(stderr)))
            .build(Root::builder().appender("stderr").build(LevelFilter::Warn))?;
        log4rs::init_config(config)?;
        log::debug!(
            "Log config {} not found, using stderr",
            self.log_config.display()
        );
        Ok(())
    }
}
