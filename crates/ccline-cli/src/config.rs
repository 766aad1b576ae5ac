//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default window size in days when `--days` is not given.
    pub days: u32,

    /// Glyph used for each timeline bucket.
    pub glyph: char,

    /// ANSI-256 color codes for density levels 0 (idle) through 4 (peak).
    pub palette: [u8; 5],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            days: 1,
            glyph: '■',
            // Dim gray for idle, then a green ramp.
            palette: [240, 22, 28, 34, 40],
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (CCLINE_*)
        figment = figment.merge(Env::prefixed("CCLINE_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for ccline.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ccline"))
}
