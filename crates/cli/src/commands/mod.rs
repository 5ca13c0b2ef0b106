pub mod doctor;
pub mod onboard;
pub mod serve;

use std::path::{Path, PathBuf};
use tutoragent_config::{AppConfig, ConfigError};

/// Load config from the given path, or the default location.
pub fn load_config(path: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(p) => AppConfig::load_from(Path::new(&p)),
        None => AppConfig::load(),
    }
}
