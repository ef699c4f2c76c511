//! Light/dark preference controller.
//!
//! `initialize` reads the persisted slot once; `toggle` is the only writer of
//! both the slot and the root `light-theme` flag. Each call hands back an
//! [`IconRequest`] for the event loop to run asynchronously. Completed loads
//! are applied through [`ThemeController::apply_icon`], which drops any
//! result older than the latest request.

use std::fmt;
use std::str::FromStr;

use crate::document::Document;
use crate::icons::{Glyph, GlyphKind};
use crate::preferences::PreferenceStore;

/// Storage slot holding the preference
pub const THEME_SLOT: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// The switcher shows the mode it would switch to
    pub fn icon(self) -> GlyphKind {
        match self {
            ThemeMode::Light => GlyphKind::Moon,
            ThemeMode::Dark => GlyphKind::Sun,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(()),
        }
    }
}

/// A glyph load the caller should perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconRequest {
    pub generation: u64,
    pub kind: GlyphKind,
}

/// A finished glyph load
#[derive(Debug, Clone)]
pub struct IconResult {
    pub generation: u64,
    pub glyph: Glyph,
}

pub struct ThemeController<S: PreferenceStore> {
    store: S,
    mode: ThemeMode,
    generation: u64,
}

impl<S: PreferenceStore> ThemeController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            mode: ThemeMode::Dark,
            generation: 0,
        }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    /// Restore the saved preference. Anything but "light" is dark.
    pub fn initialize(&mut self, doc: &mut Document) -> IconRequest {
        let saved = self.store.get(THEME_SLOT);
        self.mode = match saved.as_deref().map(str::parse::<ThemeMode>) {
            Some(Ok(ThemeMode::Light)) => ThemeMode::Light,
            _ => ThemeMode::Dark,
        };
        if self.mode == ThemeMode::Light {
            doc.light_theme = true;
        }
        tracing::info!("Theme restored: {}", self.mode);
        self.request_icon()
    }

    /// Flip the root flag, persist it, and ask for the matching icon
    pub fn toggle(&mut self, doc: &mut Document) -> IconRequest {
        doc.light_theme = !doc.light_theme;
        self.mode = if doc.light_theme {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        };

        if let Err(e) = self.store.set(THEME_SLOT, self.mode.as_str()) {
            tracing::warn!("Failed to persist theme preference: {:#}", e);
        }
        tracing::debug!("Theme toggled to {}", self.mode);
        self.request_icon()
    }

    fn request_icon(&mut self) -> IconRequest {
        self.generation += 1;
        IconRequest {
            generation: self.generation,
            kind: self.mode.icon(),
        }
    }

    /// Install a finished load if it answers the latest request
    pub fn apply_icon(&self, doc: &mut Document, result: IconResult) -> bool {
        if result.generation != self.generation {
            tracing::debug!(
                "Discarding stale icon (generation {}, latest {})",
                result.generation,
                self.generation
            );
            return false;
        }
        if result.glyph.is_fallback() {
            tracing::debug!("Theme switcher shows the fallback glyph");
        }
        doc.theme_switcher = Some(result.glyph);
        true
    }

    /// Hand the store back, e.g. to simulate a reload
    #[cfg(test)]
    pub fn into_store(self) -> S {
        self.store
    }
}
