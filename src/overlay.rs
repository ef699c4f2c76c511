//! Detail overlay controller.
//!
//! # States
//!
//! ```text
//!            open(entry)               activate
//!  Closed ───────────────▶ Opening ───────────────▶ Open
//!    ▲                        ▲                      │
//!    │ settle (deadline,      │ open(entry)          │ close button / scrim /
//!    │ same generation,       │                      │ Escape
//!    │ not active)            │                      ▼
//!    └──────────────────── Closing ◀─────────────────┘
//! ```
//!
//! Every open bumps a generation. A pending close only hides the overlay if
//! it still belongs to the latest open and the overlay is not active again,
//! so reopening during the close delay never gets hidden by the old timer.

use std::time::{Duration, Instant};

use crate::document::{Container, Document, Node, OptionalLine, RenderTarget, Tag};
use crate::tombstone::Tombstone;

pub const NO_LINKS_PLACEHOLDER: &str = "No links provided.";

/// Default visual transition delay before a closed overlay leaves layout
pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Closed,
    Opening { generation: u64 },
    Open { generation: u64 },
    Closing { generation: u64, deadline: Instant },
}

/// Where a click landed while the overlay is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// The background behind the panel
    Scrim,
    /// Anywhere inside the detail panel
    Panel,
    CloseButton,
}

pub struct DetailOverlay {
    state: OverlayState,
    generation: u64,
    close_delay: Duration,
    shown_id: Option<String>,
}

impl Default for DetailOverlay {
    fn default() -> Self {
        Self::new(DEFAULT_CLOSE_DELAY)
    }
}

impl DetailOverlay {
    pub fn new(close_delay: Duration) -> Self {
        Self {
            state: OverlayState::Closed,
            generation: 0,
            close_delay,
            shown_id: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Open and not on its way out
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            OverlayState::Open { .. } | OverlayState::Opening { .. }
        )
    }

    /// Id of the entry whose details are currently in the fields
    pub fn shown_id(&self) -> Option<&str> {
        self.shown_id.as_deref()
    }

    /// Show `tombstone`, replacing whatever was shown before
    pub fn open(&mut self, doc: &mut Document, tombstone: &Tombstone) {
        self.generation += 1;
        self.populate(doc, tombstone);
        self.state = OverlayState::Opening {
            generation: self.generation,
        };
        self.activate(doc);
    }

    /// Write every field before the overlay becomes visible
    fn populate(&mut self, doc: &mut Document, tombstone: &Tombstone) {
        let fields = &mut doc.overlay;
        fields.avatar_src = tombstone.avatar.clone();
        fields.avatar_alt = format!("{}'s avatar", tombstone.name);
        fields.name = tombstone.name.clone();
        fields.id_label = format!("ID: {}", tombstone.id);
        fields.created = match tombstone.created() {
            Some(created) => OptionalLine {
                text: format!("Created: {}", created),
                hidden: false,
            },
            None => OptionalLine {
                text: String::new(),
                hidden: true,
            },
        };
        fields.epitaph = tombstone.epitaph.clone();

        let links = if tombstone.links.is_empty() {
            vec![Node::new(Tag::Span).with_text(NO_LINKS_PLACEHOLDER)]
        } else {
            tombstone
                .links
                .iter()
                .map(|link| {
                    Node::new(Tag::A)
                        .with_attr("href", link.url.as_str())
                        .with_attr("target", "_blank")
                        .with_attr("rel", "noopener noreferrer")
                        .with_text(link.title.as_str())
                })
                .collect()
        };
        doc.replace_children(Container::OverlayLinks, links);

        self.shown_id = Some(tombstone.id.clone());
    }

    /// Opening -> Open. Restarts the show transition from the closed look.
    fn activate(&mut self, doc: &mut Document) {
        let OverlayState::Opening { generation } = self.state else {
            return;
        };

        doc.overlay.displayed = true;
        doc.overlay.active = false;
        doc.force_layout();
        doc.overlay.active = true;
        doc.scroll_locked = true;

        self.state = OverlayState::Open { generation };
        tracing::debug!("Overlay open (generation {})", generation);
    }

    /// Open -> Closing. Returns false if there was nothing to close.
    pub fn close(&mut self, doc: &mut Document, now: Instant) -> bool {
        let generation = match self.state {
            OverlayState::Open { generation } | OverlayState::Opening { generation } => generation,
            _ => return false,
        };

        doc.overlay.active = false;
        self.state = OverlayState::Closing {
            generation,
            deadline: now + self.close_delay,
        };
        tracing::debug!("Overlay closing (generation {})", generation);
        true
    }

    /// Route a click while the overlay is shown. Only a direct scrim hit or
    /// the close button closes it.
    pub fn click(&mut self, doc: &mut Document, target: HitTarget, now: Instant) -> bool {
        match target {
            HitTarget::Scrim | HitTarget::CloseButton => self.close(doc, now),
            HitTarget::Panel => false,
        }
    }

    /// Escape closes only while the overlay is active
    pub fn escape(&mut self, doc: &mut Document, now: Instant) -> bool {
        if self.is_active() && doc.overlay.active {
            self.close(doc, now)
        } else {
            false
        }
    }

    /// Closing -> Closed once the delay has elapsed for the latest request
    pub fn tick(&mut self, doc: &mut Document, now: Instant) -> bool {
        let OverlayState::Closing { generation, deadline } = self.state else {
            return false;
        };
        if now < deadline || generation != self.generation || doc.overlay.active {
            return false;
        }

        doc.overlay.displayed = false;
        doc.scroll_locked = false;
        self.state = OverlayState::Closed;
        tracing::debug!("Overlay closed (generation {})", generation);
        true
    }

    /// When the event loop must call [`tick`](Self::tick) next
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            OverlayState::Closing { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// Drop straight to Closed, as a fresh page load would
    pub fn reset(&mut self, doc: &mut Document) {
        doc.overlay.active = false;
        doc.overlay.displayed = false;
        doc.scroll_locked = false;
        self.state = OverlayState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tombstone::sample;

    fn anchors(doc: &Document) -> Vec<&Node> {
        doc.children(Container::OverlayLinks)
            .iter()
            .filter(|n| n.tag == Tag::A)
            .collect()
    }

    #[test]
    fn test_open_populates_fields() {
        let mut doc = Document::new();
        let mut overlay = DetailOverlay::default();
        let entry = sample("7", Some("2026-01-18"), &[("GitHub", "https://github.com/x")]);

        overlay.open(&mut doc, &entry);

        assert!(matches!(overlay.state(), OverlayState::Open { .. }));
        assert!(doc.overlay.displayed);
        assert!(doc.overlay.active);
        assert!(doc.scroll_locked);
        assert_eq!(doc.overlay.avatar_src, "/assets/m.png");
        assert_eq!(doc.overlay.name, "CyberSoul7");
        assert_eq!(doc.overlay.id_label, "ID: 7");
        assert_eq!(doc.overlay.created.text, "Created: 2026-01-18");
        assert!(!doc.overlay.created.hidden);
        assert_eq!(doc.overlay.epitaph, entry.epitaph);

        let links = anchors(&doc);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].attr("href"), Some("https://github.com/x"));
        assert_eq!(links[0].attr("target"), Some("_blank"));
        assert_eq!(links[0].attr("rel"), Some("noopener noreferrer"));
        assert_eq!(links[0].text.as_deref(), Some("GitHub"));
    }

    #[test]
    fn test_open_twice_is_idempotent() {
        let mut doc = Document::new();
        let mut overlay = DetailOverlay::default();
        let a = sample("1", Some("2026-01-18"), &[("One", "http://one"), ("Two", "http://two")]);

        overlay.open(&mut doc, &a);
        overlay.open(&mut doc, &a);

        assert!(matches!(overlay.state(), OverlayState::Open { .. }));
        assert_eq!(overlay.shown_id(), Some("1"));
        assert_eq!(doc.overlay.name, "CyberSoul1");
        assert_eq!(anchors(&doc).len(), 2);
        // Every open restarts the transition from the inactive look, even
        // when the overlay was already active
        assert_eq!(doc.layout_reads(), 2);
        assert_eq!(doc.active_at_layout_reads(), &[false, false]);
        assert!(doc.overlay.active);
    }

    #[test]
    fn test_open_replaces_previous_entry() {
        let mut doc = Document::new();
        let mut overlay = DetailOverlay::default();
        let a = sample("1", Some("2026-01-18"), &[("One", "http://one")]);
        let b = sample("2", None, &[]);

        overlay.open(&mut doc, &a);
        overlay.open(&mut doc, &b);

        assert_eq!(overlay.shown_id(), Some("2"));
        assert_eq!(doc.overlay.name, "CyberSoul2");
        assert_eq!(doc.overlay.id_label, "ID: 2");
        assert_eq!(doc.overlay.epitaph, b.epitaph);
        assert!(doc.overlay.created.hidden);
        assert!(doc.overlay.created.text.is_empty());
        assert!(anchors(&doc).is_empty());
    }

    #[test]
    fn test_empty_links_placeholder() {
        let mut doc = Document::new();
        let mut overlay = DetailOverlay::default();
        overlay.open(&mut doc, &sample("3", None, &[]));

        let links = doc.children(Container::OverlayLinks);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].tag, Tag::Span);
        assert_eq!(links[0].text_content(), NO_LINKS_PLACEHOLDER);
    }

    #[test]
    fn test_panel_click_does_not_close() {
        let mut doc = Document::new();
        let mut overlay = DetailOverlay::default();
        let now = Instant::now();
        overlay.open(&mut doc, &sample("1", None, &[]));

        assert!(!overlay.click(&mut doc, HitTarget::Panel, now));
        assert!(overlay.is_active());

        assert!(overlay.click(&mut doc, HitTarget::Scrim, now));
        assert!(matches!(overlay.state(), OverlayState::Closing { .. }));
    }

    #[test]
    fn test_close_button_and_escape() {
        let mut doc = Document::new();
        let mut overlay = DetailOverlay::default();
        let now = Instant::now();

        // Escape with nothing open is ignored
        assert!(!overlay.escape(&mut doc, now));

        overlay.open(&mut doc, &sample("1", None, &[]));
        assert!(overlay.click(&mut doc, HitTarget::CloseButton, now));
        assert!(!doc.overlay.active);

        overlay.open(&mut doc, &sample("1", None, &[]));
        assert!(overlay.escape(&mut doc, now));
        // A second Escape while closing does nothing
        assert!(!overlay.escape(&mut doc, now));
    }

    #[test]
    fn test_close_settles_after_delay() {
        let mut doc = Document::new();
        let mut overlay = DetailOverlay::new(Duration::from_millis(300));
        let now = Instant::now();

        overlay.open(&mut doc, &sample("1", None, &[]));
        overlay.close(&mut doc, now);

        // Still in layout and locked during the transition
        assert!(!overlay.tick(&mut doc, now + Duration::from_millis(299)));
        assert!(doc.overlay.displayed);
        assert!(doc.scroll_locked);
        assert_eq!(overlay.next_deadline(), Some(now + Duration::from_millis(300)));

        assert!(overlay.tick(&mut doc, now + Duration::from_millis(300)));
        assert_eq!(overlay.state(), OverlayState::Closed);
        assert!(!doc.overlay.displayed);
        assert!(!doc.scroll_locked);
        assert_eq!(overlay.next_deadline(), None);
    }

    #[test]
    fn test_reopen_during_close_delay_is_not_hidden() {
        let mut doc = Document::new();
        let mut overlay = DetailOverlay::new(Duration::from_millis(300));
        let now = Instant::now();

        overlay.open(&mut doc, &sample("1", None, &[]));
        overlay.close(&mut doc, now);
        overlay.open(&mut doc, &sample("2", None, &[]));

        // The old close deadline passes with the overlay open again
        assert!(!overlay.tick(&mut doc, now + Duration::from_secs(1)));
        assert!(matches!(overlay.state(), OverlayState::Open { .. }));
        assert!(doc.overlay.displayed);
        assert!(doc.overlay.active);
        assert!(doc.scroll_locked);
    }

    #[test]
    fn test_scroll_lock_tracks_settled_state() {
        let mut doc = Document::new();
        let mut overlay = DetailOverlay::new(Duration::from_millis(50));
        let mut now = Instant::now();

        for round in 0..5 {
            overlay.open(&mut doc, &sample(&(round + 1).to_string(), None, &[]));
            assert!(doc.scroll_locked);

            overlay.close(&mut doc, now);
            now += Duration::from_millis(60);
            overlay.tick(&mut doc, now);

            assert_eq!(overlay.state(), OverlayState::Closed);
            assert!(!doc.scroll_locked);
            assert!(!doc.overlay.displayed);
        }
    }

    #[test]
    fn test_reset() {
        let mut doc = Document::new();
        let mut overlay = DetailOverlay::default();
        overlay.open(&mut doc, &sample("1", None, &[]));
        overlay.reset(&mut doc);
        assert_eq!(overlay.state(), OverlayState::Closed);
        assert!(!doc.scroll_locked);
        assert!(!doc.overlay.displayed);
    }
}
