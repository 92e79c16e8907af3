//! Demo configuration, loaded from TOML.
//!
//! Lookup order: the file named by `$GLYPHQUAD_CONFIG`, then
//! `glyphquad.toml` in the working directory, then built-in defaults.
//! A file named by the environment variable must exist.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "GLYPHQUAD_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "glyphquad.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::from("Text Rendering"),
            width: 800,
            height: 600,
        }
    }
}

/// One string drawn every frame.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TextLine {
    /// Drawn byte by byte; bytes outside the atlas are skipped.
    pub text: String,
    /// Baseline start in pixels, origin at the bottom-left.
    pub origin: [f32; 2],
    #[serde(default = "unit_scale")]
    pub scale: f32,
    #[serde(default = "white")]
    pub color: [f32; 3],
}

fn unit_scale() -> f32 {
    1.0
}

fn white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Font file; empty selects the system monospace face.
    pub font_path: PathBuf,
    pub pixel_height: u32,
    pub clear_color: [f32; 3],
    pub window: WindowConfig,
    pub lines: Vec<TextLine>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            font_path: PathBuf::new(),
            pixel_height: 48,
            clear_color: [0.2, 0.3, 0.3],
            window: WindowConfig::default(),
            lines: vec![
                TextLine {
                    text: String::from("This is sample text"),
                    origin: [25.0, 25.0],
                    scale: 1.0,
                    color: [0.5, 0.8, 0.2],
                },
                TextLine {
                    text: String::from("(C) glyphquad"),
                    origin: [540.0, 570.0],
                    scale: 0.5,
                    color: [0.3, 0.7, 0.9],
                },
            ],
        }
    }
}

impl DemoConfig {
    /// Resolve and load the configuration (see module docs).
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load_from_file(Path::new(&path));
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from_file(default_path);
        }
        Ok(Self::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Whether the system monospace face should be used instead of a file.
    pub fn uses_system_font(&self) -> bool {
        self.font_path.as_os_str().is_empty()
    }
}
