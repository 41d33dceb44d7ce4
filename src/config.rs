//! Persisted settings: the active theme and the refresh rate.
//!
//! The file is a handful of `key=value` lines:
//!
//! ```text
//! theme=Nord
//! hz=10
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::{Error, Result};
use crate::state::DEFAULT_HZ;

/// Overrides the settings file location.
pub const CONFIG_ENV: &str = "RESTOP_CONFIG";

/// Settings file name, placed next to the executable.
pub const CONFIG_FILE: &str = "restop.conf";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Name of the theme to activate, if one was saved.
    pub theme: Option<String>,
    pub hz: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: None,
            hz: DEFAULT_HZ,
        }
    }
}

impl Settings {
    /// Parses settings text. Unknown keys and bad values are skipped.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut settings = Self::default();

        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "theme" if !value.is_empty() => settings.theme = Some(value.to_owned()),
                "hz" => {
                    if let Some(hz) = value.parse::<u32>().ok().filter(|&hz| hz > 0) {
                        settings.hz = hz;
                    }
                }
                _ => {}
            }
        }
        settings
    }

    /// Reads `path`; a missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(bytes) => Ok(Self::parse(&String::from_utf8_lossy(&bytes))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(Error::Config {
                path: path.to_owned(),
                source,
            }),
        }
    }

    pub fn render(&self) -> String {
        format!("theme={}\nhz={}\n", self.theme.as_deref().unwrap_or(""), self.hz)
    }

    /// The settings to write back on exit.
    ///
    /// `self` is what was loaded, `start` what the run began with after
    /// command line overrides, `end` what it finished with. Only values the
    /// user changed during the run replace the loaded ones, so an override
    /// for one run is never persisted.
    pub fn for_exit(&self, start: &Settings, end: &Settings) -> Settings {
        Settings {
            theme: if end.theme != start.theme {
                end.theme.clone()
            } else {
                self.theme.clone()
            },
            hz: if end.hz != start.hz { end.hz } else { self.hz },
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render()).map_err(|source| Error::Config {
            path: path.to_owned(),
            source,
        })
    }
}

/// Where the settings live: the flag, then [`CONFIG_ENV`], then
/// [`CONFIG_FILE`] next to the executable.
pub fn resolve_path(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_owned();
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(path);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}
