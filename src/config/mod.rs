//! Configuration for CIB clients and the `cibmon` monitor.
//!
//! Sources are merged in this order (later sources override earlier):
//! 1. Type defaults
//! 2. Configuration file passed to [`Settings::load`]
//! 3. Configuration file named by `CIB_CONFIG_PATH`
//! 4. Environment variables with the `CIB__` prefix

mod client;
mod monitor;
pub use client::*;
pub use monitor::*;


use std::env;
use std::path::Path;
use std::path::PathBuf;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Environment variable overriding every configured shadow directory
pub const SHADOW_DIR_ENV: &str = "CIB_shadow_dir";

/// Directory of shadow CIBs when nothing else is configured
pub const DEFAULT_SHADOW_DIR: &str = "/var/lib/pacemaker/cib";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl Settings {
    /// Loads and validates the merged configuration
    ///
    /// # Arguments
    /// * `path` - Optional TOML file applied on top of the defaults
    ///
    /// # Errors
    /// Returns `Error::Config` when a file cannot be read or parsed, or when
    /// the merged client settings fail validation.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        if let Ok(config_path) = env::var("CIB_CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("CIB")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.client.validate()?;
        Ok(settings)
    }
}

/// Location of the shadow CIB called `name`
///
/// The directory is taken from `CIB_shadow_dir` when set, else from
/// `shadow_dir`, else [`DEFAULT_SHADOW_DIR`].
pub fn shadow_file_path(
    name: &str,
    shadow_dir: Option<&Path>,
) -> PathBuf {
    let dir = match env::var_os(SHADOW_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => shadow_dir.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(DEFAULT_SHADOW_DIR)),
    };
    dir.join(format!("shadow.{name}"))
}
