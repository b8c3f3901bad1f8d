//! Light/dark theme switch.
//!
//! The switch is a two-state machine. Its environment (persisted key/value
//! storage and the system color-scheme preference) sits behind
//! [`ThemeEnvironment`], and reflecting a state on the page is a separate
//! `apply` callback, so the transitions can be driven without a browser.
//!
//! ```text
//!            mount                       toggle
//! stored "dark"        ─┐
//! nothing stored and    ├──→  Dark  ◀──────────────▶  Light
//!   system prefers dark ─┘
//! anything else        ────────────────────────────→  Light
//! ```
//!
//! Mount writes the resolved state back to storage; every toggle writes the
//! new state. The generated site ships `static/theme.js`, which runs the same
//! machine against `localStorage` and `matchMedia`. Tabs are not synchronized.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Storage key holding the persisted preference.
pub const STORAGE_KEY: &str = "theme";

/// Class set on the root element while the dark theme is active.
pub const DARK_CLASS: &str = "dark";

/// Presentation mode of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown theme '{0}'")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

/// Capabilities the switch needs from its host.
pub trait ThemeEnvironment {
    /// Persisted value under `key`, if any.
    fn read(&self, key: &str) -> Option<String>;
    /// Persist `value` under `key`.
    fn write(&mut self, key: &str, value: &str);
    /// Whether the system color scheme is dark.
    fn system_prefers_dark(&self) -> bool;
}

/// Resolve the theme shown on first load.
///
/// A stored `"dark"` wins; any other stored value means light. With nothing
/// stored, the system preference decides.
pub fn initial_theme(env: &impl ThemeEnvironment) -> Theme {
    match env.read(STORAGE_KEY) {
        Some(stored) => match stored.parse() {
            Ok(Theme::Dark) => Theme::Dark,
            _ => Theme::Light,
        },
        None if env.system_prefers_dark() => Theme::Dark,
        None => Theme::Light,
    }
}

/// The switch itself: current state plus the two transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeToggle {
    current: Theme,
}

impl ThemeToggle {
    /// Resolve the initial state, persist it, and apply it.
    pub fn mount<E, F>(env: &mut E, mut apply: F) -> Self
    where
        E: ThemeEnvironment,
        F: FnMut(Theme),
    {
        let current = initial_theme(&*env);
        env.write(STORAGE_KEY, current.as_str());
        apply(current);
        Self { current }
    }

    /// Flip the state, persist it, and apply it. Returns the new state.
    pub fn toggle<E, F>(&mut self, env: &mut E, mut apply: F) -> Theme
    where
        E: ThemeEnvironment,
        F: FnMut(Theme),
    {
        self.current = self.current.toggled();
        env.write(STORAGE_KEY, self.current.as_str());
        apply(self.current);
        self.current
    }

    pub fn current(&self) -> Theme {
        self.current
    }
}

/// Inline script applying the persisted theme before first paint.
///
/// Mirrors [`initial_theme`] so the page never flashes the wrong scheme while
/// `theme.js` loads.
pub fn prepaint_script() -> String {
    format!(
        "(function(){{try{{var s=localStorage.getItem('{key}');\
var d=s==='{dark}'||(s===null&&window.matchMedia('(prefers-color-scheme: dark)').matches);\
document.documentElement.classList.toggle('{class}',d);}}catch(e){{}}}})();",
        key = STORAGE_KEY,
        dark = Theme::Dark.as_str(),
        class = DARK_CLASS,
    )
}
