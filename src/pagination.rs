//! Pagination links around the current page.
//!
//! Page 1 lives at a distinguished address (`index.html` by default); every
//! other page uses a numbered pattern (`page_{}.html`). Links are computed as
//! a pure function of the page context and then written to the pagination
//! container.

use std::ops::RangeInclusive;

use crate::document::{Action, Container, Node, RenderTarget, Tag};

pub const DEFAULT_MAX_VISIBLE: usize = 5;

/// Canonical page addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAddresses {
    first: String,
    numbered: String,
}

impl Default for PageAddresses {
    fn default() -> Self {
        Self::new("index.html", "page_{}.html")
    }
}

impl PageAddresses {
    /// `numbered` must contain a `{}` placeholder for the page number
    pub fn new(first: &str, numbered: &str) -> Self {
        Self {
            first: first.to_string(),
            numbered: numbered.to_string(),
        }
    }

    /// Address of a 1-based page
    pub fn href(&self, page: usize) -> String {
        if page <= 1 {
            self.first.clone()
        } else {
            self.numbered.replacen("{}", &page.to_string(), 1)
        }
    }

    /// Page number an address points at
    pub fn resolve(&self, href: &str) -> Option<usize> {
        if href == self.first {
            return Some(1);
        }
        let (prefix, suffix) = self.numbered.split_once("{}")?;
        let number = href.strip_prefix(prefix)?.strip_suffix(suffix)?;
        match number.parse::<usize>() {
            Ok(n) if n >= 2 && number == n.to_string() => Some(n),
            _ => None,
        }
    }
}

/// Where a link goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Href(String),
    /// The current page: activation must not navigate
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub label: String,
    pub target: LinkTarget,
    pub is_current: bool,
}

impl PageLink {
    fn to(label: impl Into<String>, href: String) -> Self {
        Self {
            label: label.into(),
            target: LinkTarget::Href(href),
            is_current: false,
        }
    }
}

/// Page numbers shown around `current`, kept full whenever enough pages
/// exist on the low side
pub fn page_window(current: usize, total: usize, max_visible: usize) -> RangeInclusive<usize> {
    let mut start = current.saturating_sub(max_visible / 2).max(1);
    let end = (start + max_visible).saturating_sub(1).min(total);

    if end + 1 < start + max_visible {
        start = (end + 1).saturating_sub(max_visible).max(1);
    }
    start..=end
}

/// Previous, window of numbered links, Next
pub fn generate(
    current: usize,
    total: usize,
    max_visible: usize,
    addresses: &PageAddresses,
) -> Vec<PageLink> {
    if total == 0 {
        return Vec::new();
    }

    let mut links = Vec::new();

    if current > 1 {
        // Page 2's predecessor is the distinguished first-page address
        links.push(PageLink::to("Previous", addresses.href(current - 1)));
    }

    for page in page_window(current, total, max_visible) {
        if page == current {
            links.push(PageLink {
                label: page.to_string(),
                target: LinkTarget::NoOp,
                is_current: true,
            });
        } else {
            links.push(PageLink::to(page.to_string(), addresses.href(page)));
        }
    }

    if current < total {
        links.push(PageLink::to("Next", addresses.href(current + 1)));
    }

    links
}

/// Anchor node for a link
pub fn anchor(link: &PageLink) -> Node {
    let node = Node::new(Tag::A).with_text(link.label.as_str());
    match &link.target {
        LinkTarget::Href(href) => node
            .with_attr("href", href.as_str())
            .on_click(Action::Navigate(href.clone())),
        LinkTarget::NoOp => node
            .with_class("active")
            .with_attr("href", "#")
            .on_click(Action::Noop),
    }
}

/// Replace the pagination container with freshly generated links
pub fn render<T: RenderTarget>(
    target: &mut T,
    current: usize,
    total: usize,
    max_visible: usize,
    addresses: &PageAddresses,
) {
    let anchors = generate(current, total, max_visible, addresses)
        .iter()
        .map(anchor)
        .collect();
    target.replace_children(Container::Pagination, anchors);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn numbered(links: &[PageLink]) -> Vec<usize> {
        links.iter().filter_map(|l| l.label.parse().ok()).collect()
    }

    fn gen(current: usize, total: usize) -> Vec<PageLink> {
        generate(current, total, DEFAULT_MAX_VISIBLE, &PageAddresses::default())
    }

    #[test]
    fn test_window_properties_hold_everywhere() {
        for total in 1..=25 {
            for current in 1..=total {
                let links = gen(current, total);
                let pages = numbered(&links);

                assert_eq!(pages.len(), total.min(5), "current={current} total={total}");
                assert!(pages.contains(&current));
                assert!(pages.windows(2).all(|w| w[1] == w[0] + 1));

                let current_links: Vec<_> = links.iter().filter(|l| l.is_current).collect();
                assert_eq!(current_links.len(), 1);
                assert_eq!(current_links[0].target, LinkTarget::NoOp);
                assert_eq!(current_links[0].label, current.to_string());
            }
        }
    }

    #[test]
    fn test_window_shift() {
        assert_eq!(numbered(&gen(1, 20)), vec![1, 2, 3, 4, 5]);
        assert_eq!(numbered(&gen(20, 20)), vec![16, 17, 18, 19, 20]);
        assert_eq!(numbered(&gen(10, 20)), vec![8, 9, 10, 11, 12]);
        assert_eq!(numbered(&gen(19, 20)), vec![16, 17, 18, 19, 20]);
        assert_eq!(numbered(&gen(2, 3)), vec![1, 2, 3]);
    }

    #[test]
    fn test_single_page() {
        let links = gen(1, 1);
        assert_eq!(
            links,
            vec![PageLink {
                label: "1".to_string(),
                target: LinkTarget::NoOp,
                is_current: true,
            }]
        );
    }

    #[test]
    fn test_previous_targets() {
        let links = gen(2, 10);
        assert_eq!(links[0].label, "Previous");
        assert_eq!(links[0].target, LinkTarget::Href("index.html".to_string()));

        let links = gen(5, 10);
        assert_eq!(links[0].label, "Previous");
        assert_eq!(links[0].target, LinkTarget::Href("page_4.html".to_string()));

        assert_ne!(gen(1, 10)[0].label, "Previous");
    }

    #[test]
    fn test_next_and_page_one_targets() {
        let links = gen(3, 10);
        let next = links.last().unwrap();
        assert_eq!(next.label, "Next");
        assert_eq!(next.target, LinkTarget::Href("page_4.html".to_string()));

        let one = links.iter().find(|l| l.label == "1").unwrap();
        assert_eq!(one.target, LinkTarget::Href("index.html".to_string()));

        assert_ne!(gen(10, 10).last().unwrap().label, "Next");
    }

    #[test]
    fn test_zero_pages_renders_nothing() {
        assert!(gen(1, 0).is_empty());
    }

    #[test]
    fn test_addresses() {
        let addresses = PageAddresses::default();
        assert_eq!(addresses.href(1), "index.html");
        assert_eq!(addresses.href(2), "page_2.html");
        assert_eq!(addresses.href(17), "page_17.html");

        assert_eq!(addresses.resolve("index.html"), Some(1));
        assert_eq!(addresses.resolve("page_17.html"), Some(17));
        assert_eq!(addresses.resolve("page_1.html"), None);
        assert_eq!(addresses.resolve("page_02.html"), None);
        assert_eq!(addresses.resolve("page_x.html"), None);
        assert_eq!(addresses.resolve("#"), None);

        let custom = PageAddresses::new("home.html", "p/{}/");
        assert_eq!(custom.href(3), "p/3/");
        assert_eq!(custom.resolve("p/3/"), Some(3));
    }

    #[test]
    fn test_render_anchors() {
        let mut doc = Document::new();
        render(&mut doc, 2, 3, DEFAULT_MAX_VISIBLE, &PageAddresses::default());

        let anchors = doc.children(Container::Pagination);
        let labels: Vec<_> = anchors.iter().map(|a| a.text_content()).collect();
        assert_eq!(labels, vec!["Previous", "1", "2", "3", "Next"]);

        let current = &anchors[2];
        assert!(current.has_class("active"));
        assert_eq!(current.attr("href"), Some("#"));
        assert_eq!(current.on_click, Some(Action::Noop));

        assert_eq!(
            anchors[0].on_click,
            Some(Action::Navigate("index.html".to_string()))
        );
        assert!(!anchors[1].has_class("active"));
    }
}
