//! Gallery renderer: one card per tombstone on the current page.

use crate::document::{Action, Container, Node, RenderTarget, Tag};
use crate::tombstone::Tombstone;

pub const EMPTY_PLACEHOLDER: &str = "No tombstones found on this page.";

/// Build the card for the entry at `index`
pub fn card(index: usize, tombstone: &Tombstone) -> Node {
    Node::new(Tag::Div)
        .with_class("tombstone")
        .with_attr("data-id", tombstone.id.as_str())
        .with_child(
            Node::new(Tag::Img)
                .with_attr("src", tombstone.avatar.as_str())
                .with_attr("alt", format!("{}'s avatar", tombstone.name)),
        )
        .with_child(
            Node::new(Tag::H3)
                .with_class("name")
                .with_text(tombstone.name.as_str()),
        )
        .with_child(
            Node::new(Tag::P)
                .with_class("id")
                .with_text(format!("ID: {}", tombstone.id)),
        )
        .on_click(Action::OpenDetail(index))
}

/// Replace the gallery container with the page's cards
pub fn render<T: RenderTarget>(target: &mut T, tombstones: &[Tombstone]) {
    let children = if tombstones.is_empty() {
        vec![Node::new(Tag::P).with_text(EMPTY_PLACEHOLDER)]
    } else {
        tombstones
            .iter()
            .enumerate()
            .map(|(i, t)| card(i, t))
            .collect()
    };
    tracing::debug!("Rendering {} gallery cards", tombstones.len());
    target.replace_children(Container::Gallery, children);
}
