//! Theme loading and the active palette.
//!
//! There is no global active theme: the [`ThemeManager`] is owned by the
//! application and handed to the input router and the renderer.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Error, Result};

pub mod contrast;
pub mod palette;
pub mod parse;

pub use self::palette::{Rgb, Theme};

/// Environment variable overriding the theme directory.
pub const THEMES_ENV: &str = "RESTOP_THEMES";
/// File extension of theme definitions.
pub const THEME_EXTENSION: &str = "theme";

/// Loaded themes sorted by name, with one of them active.
#[derive(Clone, Debug)]
pub struct ThemeManager {
    themes: Vec<Theme>,
    current: usize,
}

impl ThemeManager {
    /// A manager holding only the built-in palette, as is.
    ///
    /// The derivation rules are for files that leave slots untouched; the
    /// built-in palette defines every slot itself.
    pub fn builtin() -> Self {
        let mut theme = Theme::default();
        contrast::enforce(&mut theme);
        Self {
            themes: vec![theme],
            current: 0,
        }
    }

    /// Loads every `.theme` file in `dir`.
    ///
    /// Fails if the directory cannot be listed or holds no theme files; a
    /// single unreadable file is skipped.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir).map_err(|source| Error::ThemeDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut themes = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            let is_theme = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(THEME_EXTENSION));
            if !is_file || !is_theme {
                continue;
            }

            match parse::load_file(&path) {
                Ok(theme) => themes.push(theme),
                Err(error) => debug!(path = %path.display(), %error, "skipping theme file"),
            }
        }

        Self::from_themes(themes).ok_or_else(|| Error::NoThemes(dir.to_path_buf()))
    }

    /// Builds a manager from already finished themes, `None` if there are none.
    pub fn from_themes(mut themes: Vec<Theme>) -> Option<Self> {
        if themes.is_empty() {
            return None;
        }
        themes.sort_by(|a, b| a.name.cmp(&b.name));
        Some(Self { themes, current: 0 })
    }

    pub fn current(&self) -> &Theme {
        // never empty by construction.
        &self.themes[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn next(&mut self) {
        self.current = (self.current + 1) % self.themes.len();
    }

    pub fn prev(&mut self) {
        self.current = (self.current + self.themes.len() - 1) % self.themes.len();
    }

    /// Activates the theme called `name`; unknown names leave the current one.
    pub fn select_by_name(&mut self, name: &str) -> bool {
        match self.themes.iter().position(|t| t.name == name) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().map(|t| t.name.as_str())
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Finds the theme directory.
///
/// Tried in order: `RESTOP_THEMES`, `themes` beside the executable, `themes`
/// in the working directory. Falls back to the relative path `themes`.
pub fn resolve_themes_dir() -> PathBuf {
    let from_env = env::var_os(THEMES_ENV).map(PathBuf::from);
    let beside_exe = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("themes")));
    let in_cwd = env::current_dir().ok().map(|dir| dir.join("themes"));

    [from_env, beside_exe, in_cwd]
        .into_iter()
        .flatten()
        .find(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from("themes"))
}
