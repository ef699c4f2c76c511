//! Theme switcher glyphs.
//!
//! Glyphs are small SVG files fetched by relative path from either a local
//! asset directory or an HTTP(S) base. Loading is best effort: any failure
//! (missing file, non-success status, unparsable SVG) yields the built-in
//! alert glyph instead of an error.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Generic "alert" icon used when a glyph cannot be loaded
pub const FALLBACK_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24" fill="currentColor" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><circle cx="12" cy="12" r="10"/><line x1="12" y1="8" x2="12" y2="12"/><line x1="12" y1="16" x2="12.01" y2="16"/></svg>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphKind {
    Moon,
    Sun,
    Alert,
}

impl GlyphKind {
    /// Relative path of the glyph resource
    pub fn path(self) -> Option<&'static str> {
        match self {
            GlyphKind::Moon => Some("assets/moon.svg"),
            GlyphKind::Sun => Some("assets/sun.svg"),
            GlyphKind::Alert => None,
        }
    }

    /// Text stand-in for terminals without a graphics protocol
    pub fn symbol(self) -> &'static str {
        match self {
            GlyphKind::Moon => "☾",
            GlyphKind::Sun => "☀",
            GlyphKind::Alert => "⚠",
        }
    }
}

/// A loaded glyph, always displayable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub kind: GlyphKind,
    pub svg: String,
}

impl Glyph {
    pub fn fallback() -> Self {
        Self {
            kind: GlyphKind::Alert,
            svg: FALLBACK_SVG.to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.kind == GlyphKind::Alert
    }
}

#[derive(Debug, Error)]
pub enum IconError {
    #[error("failed to read icon {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch icon {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("icon {location} is not a valid SVG: {reason}")]
    InvalidSvg { location: String, reason: String },
}

/// Where glyph resources are fetched from
#[derive(Debug, Clone)]
pub enum IconSource {
    Dir(PathBuf),
    Http { client: reqwest::Client, base: String },
}

impl IconSource {
    /// An `http://` or `https://` base becomes an HTTP source, anything
    /// else a directory
    pub fn from_base(base: &str) -> Self {
        if base.starts_with("http://") || base.starts_with("https://") {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .user_agent(concat!("cyber-cemetery/", env!("CARGO_PKG_VERSION")))
                .build();
            Self::with_client(base, client)
        } else {
            IconSource::Dir(PathBuf::from(shellexpand::tilde(base).as_ref()))
        }
    }

    /// HTTP source over `client`. Without a client the base is treated as a
    /// directory, so every load ends in the fallback glyph.
    fn with_client(base: &str, client: reqwest::Result<reqwest::Client>) -> Self {
        match client {
            Ok(client) => {
                let base = if base.ends_with('/') {
                    base.to_string()
                } else {
                    format!("{}/", base)
                };
                IconSource::Http { client, base }
            }
            Err(e) => {
                tracing::warn!("HTTP client for {} unavailable, using fallback glyphs: {}", base, e);
                IconSource::Dir(PathBuf::from(base))
            }
        }
    }
}

/// Fetches glyphs; cheap to clone into spawned tasks
#[derive(Debug, Clone)]
pub struct IconLoader {
    source: IconSource,
}

impl IconLoader {
    pub fn new(source: IconSource) -> Self {
        Self { source }
    }

    /// Raw resource text at `relative`
    pub async fn fetch(&self, relative: &str) -> Result<String, IconError> {
        match &self.source {
            IconSource::Dir(root) => {
                let path = root.join(relative);
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| IconError::Io { path, source })
            }
            IconSource::Http { client, base } => {
                let url = format!("{}{}", base, relative);
                let http_err = |source| IconError::Http {
                    url: url.clone(),
                    source,
                };
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(http_err)?;
                response.text().await.map_err(http_err)
            }
        }
    }

    /// Load the glyph for `kind`, substituting the fallback on any failure
    pub async fn load(&self, kind: GlyphKind) -> Glyph {
        let Some(relative) = kind.path() else {
            return Glyph::fallback();
        };

        let loaded = match self.fetch(relative).await {
            Ok(svg) => validate_svg(relative, &svg).map(|_| svg),
            Err(e) => Err(e),
        };

        match loaded {
            Ok(svg) => {
                tracing::debug!("Loaded glyph {}", relative);
                Glyph { kind, svg }
            }
            Err(e) => {
                tracing::warn!("Error loading glyph, using fallback: {}", e);
                Glyph::fallback()
            }
        }
    }
}

fn validate_svg(location: &str, svg: &str) -> Result<(), IconError> {
    usvg::Tree::from_str(svg, &usvg::Options::default())
        .map(|_| ())
        .map_err(|e| IconError::InvalidSvg {
            location: location.to_string(),
            reason: e.to_string(),
        })
}

/// Render an SVG glyph into a `size`×`size` image. Coverage becomes alpha and
/// every pixel takes the `tint` color, so the palette decides the icon color.
pub fn rasterize(svg: &str, size: u32, tint: [u8; 3]) -> Option<image::RgbaImage> {
    let tree = usvg::Tree::from_str(svg, &usvg::Options::default()).ok()?;
    let mut pixmap = tiny_skia::Pixmap::new(size, size)?;

    let tree_size = tree.size();
    let scale_x = size as f32 / tree_size.width();
    let scale_y = size as f32 / tree_size.height();
    let scale = scale_x.min(scale_y);
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let pixels = pixmap.pixels();
    Some(image::RgbaImage::from_fn(size, size, |x, y| {
        let alpha = pixels[(y * size + x) as usize].alpha();
        image::Rgba([tint[0], tint[1], tint[2], alpha])
    }))
}
