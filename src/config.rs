//! Site configuration module.
//!
//! Handles loading, validating, and merging the `config.toml` at the content
//! root. Stock defaults are serialized to a TOML table and the user file is
//! merged over them key by key, so a config file only needs the values it
//! wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! assets_dir = "assets"        # Copied verbatim to the output root
//!
//! [site]
//! title = "Portfolio"
//! description = "Notes and projects"
//! url = "http://localhost:3000" # Site root (no path); base for canonical URLs
//! author = ""
//! twitter = ""                 # Site handle for twitter:site
//! og_endpoint = "/api/og"      # Social image service (absolute or site-relative)
//!
//! [images]
//! domains = ["avatars.githubusercontent.com", "images.unsplash.com"]
//!
//! [colors.light]
//! background = "#ffffff"
//! ...
//!
//! [colors.dark]
//! background = "#1e293b"
//! ...
//!
//! [processing]
//! max_processes = 4            # Max parallel render workers (omit for auto)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory (relative to the content root) copied to the output root.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    /// Site identity and URLs.
    pub site: SiteSection,
    /// Remote image policy.
    pub images: ImagesConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

fn default_assets_dir() -> String {
    "assets".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            site: SiteSection::default(),
            images: ImagesConfig::default(),
            colors: ColorConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.title must not be empty".into(),
            ));
        }
        let url = Url::parse(&self.site.url).map_err(|e| {
            ConfigError::Validation(format!("site.url is not a valid URL: {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(
                "site.url must use http or https".into(),
            ));
        }
        // Pages link assets and sections from the site root.
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(ConfigError::Validation(format!(
                "site.url must be the site root without a path, got '{}'",
                self.site.url
            )));
        }
        if self.site.og_endpoint.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.og_endpoint must not be empty".into(),
            ));
        }
        if self.images.domains.iter().any(|d| d.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "images.domains entries must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Replace `site.url` (the `--site-url` flag) and re-validate.
    pub fn override_site_url(&mut self, url: &str) -> Result<(), ConfigError> {
        self.site.url = url.to_string();
        self.validate()
    }
}

/// Site identity: title, owner, and the URLs social metadata is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    pub title: String,
    pub description: String,
    /// Absolute base URL of the deployed site.
    pub url: String,
    pub author: String,
    /// Handle used for `twitter:site`. Empty to omit.
    pub twitter: String,
    /// Social preview image service. Absolute, or relative to `url`.
    pub og_endpoint: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            description: "Notes and projects".to_string(),
            url: "http://localhost:3000".to_string(),
            author: String::new(),
            twitter: String::new(),
            og_endpoint: "/api/og".to_string(),
        }
    }
}

impl SiteSection {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Absolute social image endpoint.
    pub fn og_endpoint_url(&self) -> String {
        if self.og_endpoint.starts_with("http://") || self.og_endpoint.starts_with("https://") {
            self.og_endpoint.clone()
        } else {
            format!(
                "{}/{}",
                self.base_url(),
                self.og_endpoint.trim_start_matches('/')
            )
        }
    }
}

/// Remote image policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Hosts allowed for absolute image URLs in front matter.
    pub domains: Vec<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            domains: vec![
                "avatars.githubusercontent.com".to_string(),
                "images.unsplash.com".to_string(),
            ],
        }
    }
}

impl ImagesConfig {
    /// Whether an image reference may be used. Site-relative paths are always
    /// allowed; absolute URLs must point at a listed host.
    pub fn allows(&self, reference: &str) -> bool {
        match Url::parse(reference) {
            Ok(url) => url
                .host_str()
                .is_some_and(|host| self.domains.iter().any(|d| d.eq_ignore_ascii_case(host))),
            Err(url::ParseError::RelativeUrlWithoutBase) => true,
            Err(_) => false,
        }
    }
}

/// Parallel rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text: descriptions, captions, dates.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#0f172a".to_string(),
            text_muted: "#475569".to_string(),
            border: "#cbd5e1".to_string(),
            link: "#2563eb".to_string(),
            link_hover: "#1d4ed8".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#1e293b".to_string(),
            text: "#f1f5f9".to_string(),
            text_muted: "#64748b".to_string(),
            border: "#475569".to_string(),
            link: "#38bdf8".to_string(),
            link_hover: "#7dd3fc".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    debug!(path = %config_path.display(), "loaded config file");
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Directory under the content root copied verbatim to the output root
# (favicon, fonts, local images).
assets_dir = "assets"

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
title = "Portfolio"
description = "Notes and projects"

# Absolute base URL of the deployed site, with no path: the site is served
# from the domain root. Canonical and Open Graph URLs are built from it.
# Override per build with --site-url.
url = "http://localhost:3000"

# Site owner, used for the author meta tag on non-post pages.
author = ""

# Handle for twitter:site. Leave empty to omit.
twitter = ""

# Social preview image service. Absolute, or relative to site.url.
# Receives description, title, tags and slug as query parameters.
og_endpoint = "/api/og"

# ---------------------------------------------------------------------------
# Remote images
# ---------------------------------------------------------------------------
[images]
# Hosts allowed for absolute image URLs in front matter.
domains = ["avatars.githubusercontent.com", "images.unsplash.com"]

# ---------------------------------------------------------------------------
# Colors - Light mode
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#0f172a"
text_muted = "#475569"    # Descriptions, captions, dates
border = "#cbd5e1"
link = "#2563eb"
link_hover = "#1d4ed8"

# ---------------------------------------------------------------------------
# Colors - Dark mode (applied when the theme switch is on dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#1e293b"
text = "#f1f5f9"
text_muted = "#64748b"
border = "#475569"
link = "#38bdf8"
link_hover = "#7dd3fc"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel page-render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
///
/// Dark colors hang off the `dark` class on the root element, which the theme
/// switch toggles, rather than off a media query.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
    color-scheme: light;
}}

:root.dark {{
    --color-bg: {dark_bg};
    --color-text: {dark_text};
    --color-text-muted: {dark_text_muted};
    --color-border: {dark_border};
    --color-link: {dark_link};
    --color-link-hover: {dark_link_hover};
    color-scheme: dark;
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_site_section() {
        let config = SiteConfig::default();
        assert_eq!(config.site.url, "http://localhost:3000");
        assert_eq!(config.site.og_endpoint, "/api/og");
        assert_eq!(config.assets_dir, "assets");
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn override_site_url_replaces_and_validates() {
        let mut config = SiteConfig::default();
        config.override_site_url("https://ada.example/").unwrap();
        assert_eq!(config.site.base_url(), "https://ada.example");

        let err = config.override_site_url("ftp://ada.example").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn site_url_with_path_is_rejected() {
        let mut config = SiteConfig::default();
        config.site.url = "https://ada.github.io/folio".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("without a path"), "got: {err}");

        config.site.url = "https://ada.github.io/folio/".into();
        assert!(config.validate().is_err());
        config.site.url = "https://ada.github.io/?ref=x".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn site_url_root_with_or_without_slash_is_accepted() {
        let mut config = SiteConfig::default();
        config.site.url = "https://ada.github.io".into();
        assert!(config.validate().is_ok());
        config.site.url = "https://ada.github.io/".into();
        assert!(config.validate().is_ok());
        config.site.url = "http://localhost:3000".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[site]
url = "https://example.dev"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.site.url, "https://example.dev");
        assert_eq!(config.site.title, "Portfolio");
        assert_eq!(config.colors.dark.background, "#1e293b");
    }

    #[test]
    fn base_url_trims_trailing_slash() {
        let site = SiteSection {
            url: "https://example.dev/".into(),
            ..SiteSection::default()
        };
        assert_eq!(site.base_url(), "https://example.dev");
    }

    #[test]
    fn og_endpoint_relative_joins_site_url() {
        let site = SiteSection {
            url: "https://example.dev/".into(),
            ..SiteSection::default()
        };
        assert_eq!(site.og_endpoint_url(), "https://example.dev/api/og");
    }

    #[test]
    fn og_endpoint_absolute_is_kept() {
        let site = SiteSection {
            og_endpoint: "https://og.example.dev/render".into(),
            ..SiteSection::default()
        };
        assert_eq!(site.og_endpoint_url(), "https://og.example.dev/render");
    }

    #[test]
    fn images_allow_relative_paths() {
        let images = ImagesConfig::default();
        assert!(images.allows("/images/cover.png"));
        assert!(images.allows("covers/cover.png"));
    }

    #[test]
    fn images_allow_listed_hosts_only() {
        let images = ImagesConfig::default();
        assert!(images.allows("https://images.unsplash.com/photo-1?w=1200"));
        assert!(!images.allows("https://evil.example.com/x.png"));
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
    }

    #[test]
    fn generate_css_keys_dark_mode_on_root_class() {
        let css = generate_color_css(&ColorConfig::default());
        assert!(css.contains(":root.dark {"));
        assert!(!css.contains("prefers-color-scheme"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "Portfolio");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r##"
[site]
title = "Ada's Notebook"
twitter = "@ada"

[colors.light]
background = "#123456"
"##,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "Ada's Notebook");
        assert_eq!(config.site.twitter, "@ada");
        assert_eq!(config.colors.light.background, "#123456");
        assert_eq!(config.colors.light.text, "#0f172a");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[site]
titel = "typo"
"#,
        )
        .unwrap();
        let err = load_config(tmp.path()).unwrap_err().to_string();
        assert!(err.contains("unknown field"), "got: {err}");
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[sitee]\ntitle = \"x\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_rejects_relative_site_url() {
        let mut config = SiteConfig::default();
        config.site.url = "example.dev".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("site.url"));
    }

    #[test]
    fn validate_rejects_non_http_scheme() {
        let mut config = SiteConfig::default();
        config.site.url = "ftp://example.dev".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_title() {
        let mut config = SiteConfig::default();
        config.site.title = "   ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[site]
url = "not a url"
"#,
        )
        .unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fff"
text = "#000"
"##,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fafafa"
"##,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let light = merged.get("colors").unwrap().get("light").unwrap();
        assert_eq!(light.get("background").unwrap().as_str(), Some("#fafafa"));
        assert_eq!(light.get("text").unwrap().as_str(), Some("#000"));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str(r#"domains = ["a", "b"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"domains = ["c"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("domains").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn resolve_config_with_overlay() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[processing]
max_processes = 2
"#,
        )
        .unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.processing.max_processes, Some(2));
        assert_eq!(config.site.og_endpoint, "/api/og");
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site.url, defaults.site.url);
        assert_eq!(config.images.domains, defaults.images.domains);
        assert_eq!(config.colors.dark.link, defaults.colors.dark.link);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[site]", "[images]", "[colors.light]", "[colors.dark]", "[processing]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }
}
