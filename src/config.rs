//! Configuration: geometry constants and the eight named colors, loaded
//! from an optional TOML file with compiled-in defaults for anything
//! absent.
//!
//! Unlike the teacher's `Config::get_config`, a missing or unparsable file
//! is not fatal: the manager must start even headless. This is a
//! deliberate, documented departure from the teacher's `.unwrap()`-on-open
//! (see DESIGN.md).

use crate::geometry::Geometry;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// `[geometry]` table: frame border width, titlebar height, inner border.
#[derive(Debug, Default, Deserialize)]
pub struct GeometrySettings {
    pub frame_border_width: Option<i32>,
    pub title_height: Option<i32>,
    pub inner_border: Option<i32>,
}

/// `[colors]` table: the eight named colors the manager needs, each an
/// X11 color name string. Descendant of the teacher's `[colour]` table,
/// narrowed to the names this system actually uses.
#[derive(Debug, Default, Deserialize)]
pub struct ColorSettings {
    pub active_frame: Option<String>,
    pub inactive_frame: Option<String>,
    pub active_title: Option<String>,
    pub inactive_title: Option<String>,
    pub active_title_border: Option<String>,
    pub inactive_title_border: Option<String>,
    pub desktop_background: Option<String>,
    pub window_background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub geometry: GeometrySettings,
    #[serde(default)]
    pub colors: ColorSettings,
}

/// Resolved color names, defaults filled in from the required list:
/// `black, white, light slate grey, slate grey, dark slate grey, dark
/// goldenrod, gold, saddle brown`.
#[derive(Debug, Clone)]
pub struct ColorNames {
    pub active_frame: String,
    pub inactive_frame: String,
    pub active_title: String,
    pub inactive_title: String,
    pub active_title_border: String,
    pub inactive_title_border: String,
    pub desktop_background: String,
    pub window_background: String,
}

impl Default for ColorNames {
    fn default() -> Self {
        ColorNames {
            active_frame: "dark goldenrod".to_string(),
            inactive_frame: "slate grey".to_string(),
            active_title: "gold".to_string(),
            inactive_title: "light slate grey".to_string(),
            active_title_border: "saddle brown".to_string(),
            inactive_title_border: "dark slate grey".to_string(),
            desktop_background: "black".to_string(),
            window_background: "white".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, falling back to
    /// [`Config::default`] (and logging a `Warn`) if the file is missing or
    /// malformed. `path` defaults to `$XDG_CONFIG_HOME/rdwm/config.toml`,
    /// or `$HOME/.config/rdwm/config.toml` if unset, matching the
    /// `window_manager` pack sibling's `paths::load` convention.
    pub fn load() -> Self {
        let path = default_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Could not parse config {:?}: {} (using defaults)", path, e);
                    Config::default()
                }
            },
            Err(e) => {
                warn!("Could not read config {:?}: {} (using defaults)", path, e);
                Config::default()
            }
        }
    }

    pub fn geometry(&self) -> Geometry {
        let defaults = Geometry::default();
        Geometry {
            frame_border_width: self
                .geometry
                .frame_border_width
                .unwrap_or(defaults.frame_border_width),
            title_height: self.geometry.title_height.unwrap_or(defaults.title_height),
            inner_border: self.geometry.inner_border.unwrap_or(defaults.inner_border),
        }
    }

    pub fn colors(&self) -> ColorNames {
        let defaults = ColorNames::default();
        ColorNames {
            active_frame: self
                .colors
                .active_frame
                .clone()
                .unwrap_or(defaults.active_frame),
            inactive_frame: self
                .colors
                .inactive_frame
                .clone()
                .unwrap_or(defaults.inactive_frame),
            active_title: self
                .colors
                .active_title
                .clone()
                .unwrap_or(defaults.active_title),
            inactive_title: self
                .colors
                .inactive_title
                .clone()
                .unwrap_or(defaults.inactive_title),
            active_title_border: self
                .colors
                .active_title_border
                .clone()
                .unwrap_or(defaults.active_title_border),
            inactive_title_border: self
                .colors
                .inactive_title_border
                .clone()
                .unwrap_or(defaults.inactive_title_border),
            desktop_background: self
                .colors
                .desktop_background
                .clone()
                .unwrap_or(defaults.desktop_background),
            window_background: self
                .colors
                .window_background
                .clone()
                .unwrap_or(defaults.window_background),
        }
    }
}

fn default_config_path() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("rdwm").join("config.toml");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/".to_string());
    PathBuf::from(home).join(".config").join("rdwm").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_yields_documented_color_names() {
        let config = Config::default();
        let colors = config.colors();
        assert_eq!(colors.active_frame, "dark goldenrod");
        assert_eq!(colors.desktop_background, "black");
    }

    #[test]
    fn default_config_yields_documented_geometry() {
        let config = Config::default();
        let geometry = config.geometry();
        assert_eq!(geometry.frame_border_width, 3);
        assert_eq!(geometry.title_height, 20);
        assert_eq!(geometry.inner_border, 1);
    }

    #[test]
    fn partial_toml_falls_back_per_field() {
        let config: Config = toml::from_str(
            r#"
            [geometry]
            title_height = 24

            [colors]
            active_frame = "royal blue"
            "#,
        )
        .unwrap();
        let geometry = config.geometry();
        assert_eq!(geometry.title_height, 24);
        assert_eq!(geometry.frame_border_width, 3);

        let colors = config.colors();
        assert_eq!(colors.active_frame, "royal blue");
        assert_eq!(colors.inactive_frame, "slate grey");
    }
}
