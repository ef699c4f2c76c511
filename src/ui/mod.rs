//! UI module - handles all TUI rendering
//!
//! Structure:
//! - `draw` - Frame drawing from the document
//! - `theme.rs` - Dark and light palettes
//! - `layout.rs` - Grid layout and click hit map
//! - `entry_card.rs` - Tombstone card widget
//! - `images.rs` - Graphics protocol images (theme glyph, avatars)

mod draw;
pub mod entry_card;
pub mod images;
pub mod layout;
pub mod theme;

// Re-export main draw function
pub use draw::draw;

pub use images::ImageManager;
