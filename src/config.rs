//! GUI configuration.
//!
//! The configuration is an explicit value handed to the widgets that need it; nothing reads it
//! from a global. Every key is optional and falls back to the defaults below.
//!
//! ```toml
//! titlebar_height = 18.0
//! standard_font = "ProFontWindows"
//!
//! [colors]
//! active_background = [250, 235, 215, 255]
//! ```

use crate::color::Color;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiConfig {
    /// Texture used for the window close button.
    pub close_button_asset: String,
    pub title_font: String,
    pub standard_font: String,
    pub standard_font_size: f64,
    pub large_font_size: f64,
    pub window_opacity: f64,
    pub titlebar_height: f64,
    pub corner_radius: f64,
    /// Space between children and the edge of their container.
    pub margin: f64,
    /// Space between adjacent children.
    pub padding: f64,
    /// Lifetime of temporary notifications.
    pub notification_duration_ms: u64,
    pub colors: ColorScheme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub font_active: Color,
    pub font_inactive: Color,
    pub active_background: Color,
    pub inactive_background: Color,
    pub pressed_background: Color,
    pub active_border: Color,
    pub inactive_border: Color,
    pub pressed_border: Color,
}

impl Default for GuiConfig {
    fn default() -> Self {
        GuiConfig {
            close_button_asset: "textures/gui/buttons/window_close.png".to_string(),
            title_font: "TimeBurner".to_string(),
            standard_font: "ProFontWindows".to_string(),
            standard_font_size: 12.,
            large_font_size: 16.,
            window_opacity: 1.,
            titlebar_height: 18.,
            corner_radius: 4.,
            margin: 8.,
            padding: 8.,
            notification_duration_ms: 5000,
            colors: ColorScheme::default(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme {
            font_active: Color::WHITE,
            font_inactive: Color::from_rgba8(128, 128, 128, 255),
            active_background: Color::from_rgba8(250, 235, 215, 255),
            inactive_background: Color::from_rgba8(211, 211, 211, 255),
            pressed_background: Color::from_rgba8(176, 196, 222, 255),
            active_border: Color::BLACK,
            inactive_border: Color::BLACK,
            pressed_border: Color::from_rgba8(72, 61, 139, 255),
        }
    }
}

impl GuiConfig {
    /// Parses a configuration from TOML source.
    pub fn from_toml_str(source: &str) -> Result<GuiConfig, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<GuiConfig, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        GuiConfig::from_toml_str(&source)
    }

    /// Reads a configuration file, falling back to the defaults if it is missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> GuiConfig {
        match GuiConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("using default GUI configuration: {}", err);
                GuiConfig::default()
            }
        }
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }
}
