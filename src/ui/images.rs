//! Terminal graphics for the theme glyph and tombstone avatars.
//!
//! Supports whatever protocol `ratatui-image` detects (Kitty, Sixel, iTerm2).
//! Without one, callers fall back to text: the glyph's symbol and the
//! avatar's path.

use parking_lot::Mutex;
use ratatui::style::Color;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::icons::{rasterize, Glyph};
use crate::ui::theme::rgb;

type Protocol = Arc<Mutex<StatefulProtocol>>;

/// Image manager - decodes and caches graphics protocols.
/// Must be created before entering raw mode.
pub struct ImageManager {
    /// The picker determines the graphics protocol and font size
    picker: Option<Picker>,
    /// Decoded avatars by source path; `None` records a failed load
    avatars: HashMap<String, Option<Protocol>>,
    theme_icon: Option<Protocol>,
    /// Glyph raster size in pixels
    icon_size: u32,
    /// Root that absolute avatar paths are resolved against
    root: PathBuf,
}

impl ImageManager {
    /// Query the terminal for a graphics protocol
    pub fn new(icon_size: u32, root: PathBuf) -> Self {
        let picker = match Picker::from_query_stdio() {
            Ok(p) => {
                tracing::info!("Graphics protocol detected: {:?}", p.protocol_type());
                Some(p)
            }
            Err(e) => {
                tracing::debug!("No graphics protocol available: {}", e);
                None
            }
        };
        Self::with_picker(picker, icon_size, root)
    }

    fn with_picker(picker: Option<Picker>, icon_size: u32, root: PathBuf) -> Self {
        Self {
            picker,
            avatars: HashMap::new(),
            theme_icon: None,
            icon_size,
            root,
        }
    }

    pub fn supports_graphics(&self) -> bool {
        self.picker.is_some()
    }

    /// Rasterize the switcher glyph in the palette's icon color
    pub fn set_theme_icon(&mut self, glyph: &Glyph, tint: Color) {
        let Some(picker) = self.picker.as_mut() else {
            return;
        };
        match rasterize(&glyph.svg, self.icon_size, rgb(tint)) {
            Some(img) => {
                let protocol = picker.new_resize_protocol(image::DynamicImage::ImageRgba8(img));
                self.theme_icon = Some(Arc::new(Mutex::new(protocol)));
            }
            None => {
                tracing::debug!("Glyph {:?} could not be rasterized", glyph.kind);
                self.theme_icon = None;
            }
        }
    }

    pub fn theme_icon(&self) -> Option<Protocol> {
        self.theme_icon.clone()
    }

    /// Protocol for an avatar, decoding it on first use
    pub fn avatar(&mut self, src: &str) -> Option<Protocol> {
        if let Some(cached) = self.avatars.get(src) {
            return cached.clone();
        }

        let picker = self.picker.as_mut()?;
        let loaded = resolve_avatar_path(&self.root, src).and_then(|path| {
            match image::open(&path) {
                Ok(img) => Some(Arc::new(Mutex::new(picker.new_resize_protocol(img)))),
                Err(e) => {
                    tracing::debug!("Failed to load avatar {}: {}", path.display(), e);
                    None
                }
            }
        });

        self.avatars.insert(src.to_string(), loaded.clone());
        loaded
    }
}

/// Map an avatar source to a local file under `root`. Remote URLs are not
/// fetched.
pub fn resolve_avatar_path(root: &Path, src: &str) -> Option<PathBuf> {
    if src.is_empty() || src.contains("://") {
        return None;
    }
    let path = root.join(src.trim_start_matches('/'));
    path.exists().then_some(path)
}
