//! Render target for the gallery page.
//!
//! Controllers never draw. They describe what the page contains as [`Node`]
//! trees placed in named [`Container`]s, plus a handful of document-level
//! flags. The terminal UI reads the [`Document`] back and draws it.

use std::collections::{BTreeMap, HashMap};

use crate::icons::Glyph;

/// Element kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Div,
    Img,
    H3,
    P,
    A,
    Span,
}

/// What activating a node does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Open the detail overlay for the entry at this index of the current page
    OpenDetail(usize),
    /// Follow a link to another page address
    Navigate(String),
    /// Swallow the activation (the current page link)
    Noop,
}

/// A child descriptor in a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub tag: Tag,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<Node>,
    pub on_click: Option<Action>,
}

impl Node {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
            on_click: None,
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn on_click(mut self, action: Action) -> Self {
        self.on_click = Some(action);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Concatenated text of this node and all descendants
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone().unwrap_or_default();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }

    /// First direct child with the given tag
    pub fn child(&self, tag: Tag) -> Option<&Node> {
        self.children.iter().find(|c| c.tag == tag)
    }
}

/// Named regions whose children are replaced wholesale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Gallery,
    Pagination,
    OverlayLinks,
}

/// Minimal interface the renderers write through
pub trait RenderTarget {
    /// Clear `container` and fill it with `children`
    fn replace_children(&mut self, container: Container, children: Vec<Node>);

    fn children(&self, container: Container) -> &[Node];
}

/// A text line that can be hidden from layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionalLine {
    pub text: String,
    pub hidden: bool,
}

/// The overlay's fixed fields and visibility flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayElements {
    pub avatar_src: String,
    pub avatar_alt: String,
    pub name: String,
    pub id_label: String,
    pub created: OptionalLine,
    pub epitaph: String,
    /// Overlay and scrim take part in layout
    pub displayed: bool,
    /// The `active` class that drives the show transition
    pub active: bool,
}

/// In-memory page
#[derive(Debug, Default)]
pub struct Document {
    containers: HashMap<Container, Vec<Node>>,
    pub title: String,
    /// Root `light-theme` flag
    pub light_theme: bool,
    /// Page-level scroll suppressed
    pub scroll_locked: bool,
    pub overlay: OverlayElements,
    pub theme_switcher: Option<Glyph>,
    /// `overlay.active` as seen by each forced layout read
    layout_reads: Vec<bool>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous layout read. Flushes pending class changes so a
    /// transition restarts from its current visual state.
    pub fn force_layout(&mut self) -> u64 {
        self.layout_reads.push(self.overlay.active);
        self.layout_reads.len() as u64
    }

    #[cfg(test)]
    pub fn layout_reads(&self) -> u64 {
        self.layout_reads.len() as u64
    }

    /// Whether the overlay was active at each forced layout read
    #[cfg(test)]
    pub fn active_at_layout_reads(&self) -> &[bool] {
        &self.layout_reads
    }
}

impl RenderTarget for Document {
    fn replace_children(&mut self, container: Container, children: Vec<Node>) {
        self.containers.insert(container, children);
    }

    fn children(&self, container: Container) -> &[Node] {
        self.containers
            .get(&container)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
