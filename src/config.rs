//! Configuration loading for muxterm.
//!
//! Settings come from `~/.muxterm/config.toml`; anything missing falls back
//! to the defaults below.
//!
//! ```toml
//! cols = 80
//! rows = 24
//! scrollback = 10000
//! color_mode = "truecolor"   # truecolor, palette256, vga16
//! tab_width = 8
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::ColorMode;

/// Why a config file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial viewport width in cells.
    pub cols: u16,
    /// Initial viewport height in cells.
    pub rows: u16,
    /// Maximum retained scrollback lines.
    pub scrollback: usize,
    /// Color depth emitted to the output sink.
    pub color_mode: ColorMode,
    /// Default tab stop interval.
    pub tab_width: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            scrollback: 10_000,
            color_mode: ColorMode::default(),
            tab_width: 8,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "using default config");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save configuration to file.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path().context("could not determine config path")?;
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        let home = home_dir()?;
        let dir = home.join(".muxterm");
        if !dir.exists() {
            let _ = fs::create_dir_all(&dir);
        }
        Some(dir.join("config.toml"))
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!((config.cols, config.rows), (80, 24));
        assert_eq!(config.scrollback, 10_000);
        assert_eq!(config.color_mode, ColorMode::TrueColor);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str("rows = 50\ncolor_mode = \"vga16\"").unwrap();
        assert_eq!(config.rows, 50);
        assert_eq!(config.cols, 80);
        assert_eq!(config.color_mode, ColorMode::Vga16);
    }

    #[test]
    fn load_from_reports_missing_file() {
        let err = Config::load_from(Path::new("/nonexistent/muxterm.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config {
            color_mode: ColorMode::Palette256,
            ..Config::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.color_mode, ColorMode::Palette256);
    }
}
