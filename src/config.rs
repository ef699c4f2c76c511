use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pagination::{PageAddresses, DEFAULT_MAX_VISIBLE};
use crate::ui::theme::Theme;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub pagination: PaginationConfig,
    pub overlay: OverlayConfig,
    pub theme: ThemeConfig,
    pub icons: IconsConfig,
    pub appearance: AppearanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root for avatar paths and glyph assets
    pub root: PathBuf,
    /// Directory of `<id>.json` files, relative to `root` unless absolute
    pub tombstones_dir: PathBuf,
    /// Tombstones per page
    pub per_page: usize,
    /// Address of page 1
    pub first_page_address: String,
    /// Address pattern for pages 2 and above; `{}` is the page number
    pub page_address_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Numbered links shown around the current page
    pub max_visible: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Hide transition length before the overlay leaves layout
    pub close_delay_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Preferences file; defaults to the user data directory
    pub preferences_path: Option<PathBuf>,
    /// Base URL or directory the glyphs are fetched from; defaults to `site.root`
    pub icon_base: Option<String>,
    /// Accent color override (hex), applied to both palettes
    pub accent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconsConfig {
    /// Use terminal graphics for glyphs and avatars when available
    pub enabled: bool,
    /// Rasterized glyph size in pixels
    pub size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Card columns in the gallery grid
    pub columns: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            pagination: PaginationConfig::default(),
            overlay: OverlayConfig::default(),
            theme: ThemeConfig::default(),
            icons: IconsConfig::default(),
            appearance: AppearanceConfig::default(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            tombstones_dir: PathBuf::from("tombstones_raw"),
            per_page: 20,
            first_page_address: "index.html".to_string(),
            page_address_format: "page_{}.html".to_string(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_visible: DEFAULT_MAX_VISIBLE,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self { close_delay_ms: 300 }
    }
}

impl Default for IconsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 32,
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self { columns: 4 }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let path = Path::new(expanded.as_ref());

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            tracing::info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// Clamp values that would make pagination or layout degenerate
    fn normalize(&mut self) {
        if self.site.per_page == 0 {
            tracing::warn!("site.per_page must be at least 1, using 1");
            self.site.per_page = 1;
        }
        if self.pagination.max_visible == 0 {
            tracing::warn!("pagination.max_visible must be at least 1, using 1");
            self.pagination.max_visible = 1;
        }
        if !self.site.page_address_format.contains("{}") {
            tracing::warn!(
                "site.page_address_format has no '{{}}' placeholder, using default"
            );
            self.site.page_address_format = SiteConfig::default().page_address_format;
        }
        self.appearance.columns = self.appearance.columns.clamp(1, 8);
    }

    /// Site root with `~` expanded
    pub fn site_root(&self) -> PathBuf {
        expand(&self.site.root)
    }

    pub fn tombstones_dir(&self) -> PathBuf {
        let dir = expand(&self.site.tombstones_dir);
        if dir.is_absolute() {
            dir
        } else {
            self.site_root().join(dir)
        }
    }

    pub fn page_addresses(&self) -> PageAddresses {
        PageAddresses::new(&self.site.first_page_address, &self.site.page_address_format)
    }

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.overlay.close_delay_ms)
    }

    pub fn icon_base(&self) -> String {
        self.theme
            .icon_base
            .clone()
            .unwrap_or_else(|| self.site_root().to_string_lossy().into_owned())
    }

    pub fn preferences_path(&self) -> Option<PathBuf> {
        self.theme.preferences_path.as_deref().map(expand)
    }

    /// Palette for the current root flag, with the accent override applied
    pub fn resolve_theme(&self, light: bool) -> Theme {
        let mut theme = if light { Theme::light() } else { Theme::dark() };
        if let Some(ref accent) = self.theme.accent {
            match crate::ui::theme::parse_hex_color(accent) {
                Ok(color) => theme.accent = color,
                Err(e) => tracing::warn!("Ignoring theme.accent '{}': {}", accent, e),
            }
        }
        theme
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.site.per_page, 20);
        assert_eq!(config.pagination.max_visible, 5);
        assert_eq!(config.close_delay(), Duration::from_millis(300));
        assert_eq!(config.page_addresses(), PageAddresses::default());
        assert_eq!(config.tombstones_dir(), PathBuf::from("./tombstones_raw"));
        assert_eq!(config.icon_base(), ".");
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse(
            r#"
            [site]
            root = "/srv/cemetery"
            per_page = 12

            [overlay]
            close_delay_ms = 150
            "#,
        )
        .unwrap();

        assert_eq!(config.site.per_page, 12);
        assert_eq!(config.site.first_page_address, "index.html");
        assert_eq!(config.close_delay(), Duration::from_millis(150));
        assert_eq!(config.tombstones_dir(), PathBuf::from("/srv/cemetery/tombstones_raw"));
        assert_eq!(config.icon_base(), "/srv/cemetery");
    }

    #[test]
    fn test_normalize() {
        let config = Config::parse(
            r#"
            [site]
            per_page = 0
            page_address_format = "page.html"

            [pagination]
            max_visible = 0

            [appearance]
            columns = 40
            "#,
        )
        .unwrap();

        assert_eq!(config.site.per_page, 1);
        assert_eq!(config.pagination.max_visible, 1);
        assert_eq!(config.site.page_address_format, "page_{}.html");
        assert_eq!(config.appearance.columns, 8);
    }

    #[test]
    fn test_accent_override() {
        let config = Config::parse(
            r##"
            [theme]
            accent = "#ff0000"
            icon_base = "https://example.com/cemetery"
            "##,
        )
        .unwrap();

        assert_eq!(config.resolve_theme(true).accent, Color::Rgb(255, 0, 0));
        assert_eq!(config.resolve_theme(false).accent, Color::Rgb(255, 0, 0));
        assert_eq!(config.icon_base(), "https://example.com/cemetery");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/cyber-cemetery/config.toml").unwrap();
        assert_eq!(config.site.per_page, 20);
    }
}
