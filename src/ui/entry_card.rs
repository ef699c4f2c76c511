//! Tombstone card widget
//!
//! Draws one gallery card node as a bordered box:
//! - Name (bold)
//! - "ID: …" line (dimmed)
//! - Avatar source (more dimmed)

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Widget},
};
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use crate::document::{Node, Tag};

/// The text a card node carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub id_label: &'a str,
    pub avatar: &'a str,
}

impl<'a> CardView<'a> {
    /// Read a `.tombstone` node; anything else is not a card
    pub fn from_node(node: &'a Node) -> Option<Self> {
        if !node.has_class("tombstone") {
            return None;
        }
        let text_of = |tag| {
            node.child(tag)
                .and_then(|n| n.text.as_deref())
                .unwrap_or_default()
        };
        Some(Self {
            id: node.attr("data-id").unwrap_or_default(),
            name: text_of(Tag::H3),
            id_label: text_of(Tag::P),
            avatar: node
                .child(Tag::Img)
                .and_then(|n| n.attr("src"))
                .unwrap_or_default(),
        })
    }
}

/// Card widget
pub struct TombstoneCard<'a> {
    card: CardView<'a>,
    selected: bool,
    theme: &'a Theme,
}

impl<'a> TombstoneCard<'a> {
    pub fn new(card: CardView<'a>, theme: &'a Theme) -> Self {
        Self {
            card,
            selected: false,
            theme,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl<'a> Widget for TombstoneCard<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 3 {
            return;
        }

        let bg = if self.selected {
            self.theme.selection_bg
        } else {
            self.theme.card_bg
        };
        let border = if self.selected {
            self.theme.accent
        } else {
            self.theme.dimmed_alt
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border).bg(bg))
            .style(Style::default().bg(bg));
        let inner = block.inner(area);
        block.render(area, buf);

        let width = inner.width as usize;
        let lines = [
            (
                self.card.name,
                Style::default()
                    .fg(self.theme.foreground)
                    .add_modifier(Modifier::BOLD),
            ),
            (self.card.id_label, Style::default().fg(self.theme.dimmed)),
            (self.card.avatar, Style::default().fg(self.theme.dimmed_alt)),
        ];

        for (offset, (text, style)) in lines.into_iter().enumerate() {
            let y = inner.y + offset as u16;
            if y >= inner.y + inner.height {
                break;
            }
            buf.set_string(inner.x, y, truncate(text, width), style.bg(bg));
        }
    }
}

/// Truncate string to fit within max_width, adding ellipsis if needed
pub fn truncate(s: &str, max_width: usize) -> String {
    let width = s.width();
    if width <= max_width {
        s.to_string()
    } else if max_width <= 1 {
        "…".to_string()
    } else {
        let mut result = String::new();
        let mut current_width = 0;

        for c in s.chars() {
            let char_width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            if current_width + char_width + 1 > max_width {
                result.push('…');
                break;
            }
            result.push(c);
            current_width += char_width;
        }

        result
    }
}
