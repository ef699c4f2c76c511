use std::time::Instant;

use crate::config::Config;
use crate::document::{Action, Container, Document, RenderTarget};
use crate::gallery;
use crate::overlay::{DetailOverlay, HitTarget};
use crate::pagination::{self, PageAddresses};
use crate::preferences::PreferenceStore;
use crate::theme::{IconRequest, IconResult, ThemeController, ThemeMode};
use crate::tombstone::{PageContext, Site, Tombstone};
use crate::ui::layout::{GridLayout, HitMap, Region};

/// Which part of the page keyboard activation goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Gallery,
    Pagination,
}

/// Navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

/// Application state
pub struct App {
    config: Config,
    site: Site,
    addresses: PageAddresses,
    document: Document,
    overlay: DetailOverlay,
    theme: ThemeController<Box<dyn PreferenceStore>>,
    page: PageContext,
    /// Focused card on the current page
    selected: usize,
    /// Focused pagination link
    link_focus: usize,
    focus: Focus,
    grid: GridLayout,
    hits: HitMap,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, site: Site, store: Box<dyn PreferenceStore>) -> Self {
        let addresses = config.page_addresses();
        let overlay = DetailOverlay::new(config.close_delay());
        let grid = GridLayout::new(config.appearance.columns, 1);

        Self {
            config,
            site,
            addresses,
            document: Document::new(),
            overlay,
            theme: ThemeController::new(store),
            page: PageContext {
                current_page: 1,
                total_pages: 1,
            },
            selected: 0,
            link_focus: 0,
            focus: Focus::Gallery,
            grid,
            hits: HitMap::default(),
            should_quit: false,
        }
    }

    /// Initial load: restore the theme, then paint `page`
    pub fn start(&mut self, page: usize) -> IconRequest {
        let request = self.theme.initialize(&mut self.document);
        let page = page.clamp(1, self.site.total_pages());
        self.load_page(page);
        request
    }

    /// Paint a page from scratch, as a fresh page load would
    pub fn load_page(&mut self, page: usize) -> bool {
        let Some((entries, ctx)) = self.site.page(page) else {
            tracing::warn!("Page {} does not exist", page);
            return false;
        };

        self.overlay.reset(&mut self.document);
        self.document.title = format!("Cyber Cemetery - Page {}", ctx.current_page);
        gallery::render(&mut self.document, entries);
        pagination::render(
            &mut self.document,
            ctx.current_page,
            ctx.total_pages,
            self.config.pagination.max_visible,
            &self.addresses,
        );

        self.page = ctx;
        self.selected = 0;
        self.link_focus = self
            .document
            .children(Container::Pagination)
            .iter()
            .position(|n| n.has_class("active"))
            .unwrap_or(0);
        tracing::info!("Showing page {}/{}", ctx.current_page, ctx.total_pages);
        true
    }

    /// Run a node's click action
    pub fn activate(&mut self, action: Action) {
        match action {
            Action::OpenDetail(index) => {
                let Some(entry) = self.entries().get(index).cloned() else {
                    return;
                };
                self.selected = index;
                self.overlay.open(&mut self.document, &entry);
            }
            Action::Navigate(href) => match self.addresses.resolve(&href) {
                Some(page) => {
                    self.load_page(page);
                }
                None => tracing::warn!("No page at address {}", href),
            },
            Action::Noop => {}
        }
    }

    /// Activate the card at `index` through its click handler
    pub fn activate_card(&mut self, index: usize) {
        let action = self
            .document
            .children(Container::Gallery)
            .get(index)
            .and_then(|n| n.on_click.clone());
        if let Some(action) = action {
            self.activate(action);
        }
    }

    /// Activate the pagination link at `index`
    pub fn activate_link(&mut self, index: usize) {
        let action = self
            .document
            .children(Container::Pagination)
            .get(index)
            .and_then(|n| n.on_click.clone());
        if let Some(action) = action {
            self.activate(action);
        }
    }

    /// Follow the pagination link labelled `label` ("Next", "Previous")
    pub fn follow(&mut self, label: &str) {
        let index = self
            .document
            .children(Container::Pagination)
            .iter()
            .position(|n| n.text_content() == label);
        if let Some(index) = index {
            self.activate_link(index);
        }
    }

    /// Enter on whatever has focus
    pub fn activate_focused(&mut self) {
        match self.focus {
            Focus::Gallery => self.activate_card(self.selected),
            Focus::Pagination => self.activate_link(self.link_focus),
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Gallery => Focus::Pagination,
            Focus::Pagination => Focus::Gallery,
        };
    }

    /// Move keyboard focus. Ignored while page scroll is locked.
    pub fn navigate(&mut self, direction: Direction) {
        if self.document.scroll_locked {
            return;
        }

        match self.focus {
            Focus::Gallery => {
                let total = self.entries().len();
                let grid = self.grid;
                self.selected = match direction {
                    Direction::Up => grid.move_up(self.selected),
                    Direction::Down => grid.move_down(self.selected, total),
                    Direction::Left => grid.move_left(self.selected),
                    Direction::Right => grid.move_right(self.selected, total),
                    Direction::Home => grid.move_home(),
                    Direction::End => grid.move_end(total),
                };
            }
            Focus::Pagination => {
                let total = self.document.children(Container::Pagination).len();
                self.link_focus = match direction {
                    Direction::Left | Direction::Up => self.link_focus.saturating_sub(1),
                    Direction::Right | Direction::Down => {
                        (self.link_focus + 1).min(total.saturating_sub(1))
                    }
                    Direction::Home => 0,
                    Direction::End => total.saturating_sub(1),
                };
            }
        }
    }

    pub fn toggle_theme(&mut self) -> IconRequest {
        self.theme.toggle(&mut self.document)
    }

    pub fn apply_icon(&mut self, result: IconResult) -> bool {
        self.theme.apply_icon(&mut self.document, result)
    }

    /// Escape: close the overlay if it is active, otherwise quit
    pub fn escape(&mut self, now: Instant) {
        if !self.overlay.escape(&mut self.document, now) && !self.document.overlay.displayed {
            self.should_quit = true;
        }
    }

    /// Route a mouse click using the regions from the last draw.
    /// Returns an icon request when the click toggled the theme.
    pub fn click(&mut self, column: u16, row: u16, now: Instant) -> Option<IconRequest> {
        let region = self.hits.hit(column, row);

        if self.document.overlay.displayed {
            // The overlay covers the page: anything outside the panel is scrim
            let target = match region {
                Some(Region::CloseButton) => HitTarget::CloseButton,
                Some(Region::OverlayPanel) => HitTarget::Panel,
                _ => HitTarget::Scrim,
            };
            if self.document.overlay.active {
                self.overlay.click(&mut self.document, target, now);
            }
            return None;
        }

        match region? {
            Region::Card(index) => {
                self.focus = Focus::Gallery;
                self.activate_card(index);
                None
            }
            Region::PageLink(index) => {
                self.focus = Focus::Pagination;
                self.link_focus = index;
                self.activate_link(index);
                None
            }
            Region::ThemeSwitcher => Some(self.toggle_theme()),
            Region::OverlayPanel | Region::CloseButton => None,
        }
    }

    /// Settle a pending overlay close
    pub fn tick(&mut self, now: Instant) {
        self.overlay.tick(&mut self.document, now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.overlay.next_deadline()
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn entries(&self) -> &[Tombstone] {
        self.site
            .page(self.page.current_page)
            .map(|(entries, _)| entries)
            .unwrap_or(&[])
    }

    pub fn page(&self) -> PageContext {
        self.page
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.theme.mode()
    }

    /// Id of the tombstone the overlay is showing
    pub fn detail_id(&self) -> Option<&str> {
        self.overlay.shown_id()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn link_focus(&self) -> usize {
        self.link_focus
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_grid_layout(&mut self, grid: GridLayout) {
        self.grid = grid;
    }

    pub fn hits_mut(&mut self) -> &mut HitMap {
        &mut self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::{Glyph, GlyphKind};
    use crate::preferences::MemoryStore;
    use crate::tombstone::sample;
    use ratatui::layout::Rect;
    use std::time::Duration;

    fn app_with(count: usize) -> App {
        let tombstones = (1..=count)
            .map(|i| sample(&i.to_string(), None, &[]))
            .collect();
        let config = Config::default();
        let site = Site::paginate(tombstones, config.site.per_page);
        App::new(config, site, Box::new(MemoryStore::default()))
    }

    fn labels(app: &App) -> Vec<String> {
        app.document()
            .children(Container::Pagination)
            .iter()
            .map(|n| n.text_content())
            .collect()
    }

    #[test]
    fn test_start_paints_page() {
        let mut app = app_with(45);
        let request = app.start(1);

        assert_eq!(request.kind, GlyphKind::Sun);
        assert_eq!(app.document().title, "Cyber Cemetery - Page 1");
        assert_eq!(app.document().children(Container::Gallery).len(), 20);
        assert_eq!(labels(&app), vec!["1", "2", "3", "Next"]);
        assert_eq!(app.link_focus(), 0);
    }

    #[test]
    fn test_start_clamps_page() {
        let mut app = app_with(45);
        app.start(99);
        assert_eq!(app.page().current_page, 3);
        assert_eq!(app.entries().len(), 5);
    }

    #[test]
    fn test_follow_links() {
        let mut app = app_with(45);
        app.start(1);

        app.follow("Next");
        assert_eq!(app.page().current_page, 2);
        assert_eq!(app.document().title, "Cyber Cemetery - Page 2");
        assert_eq!(labels(&app), vec!["Previous", "1", "2", "3", "Next"]);

        app.follow("Previous");
        assert_eq!(app.page().current_page, 1);

        // Current page link is a no-op
        app.activate_link(0);
        assert_eq!(app.page().current_page, 1);
    }

    #[test]
    fn test_card_opens_overlay_and_navigation_resets_it() {
        let mut app = app_with(45);
        app.start(1);

        app.activate_card(3);
        assert_eq!(app.document().overlay.name, "CyberSoul4");
        assert!(app.document().scroll_locked);

        // Gallery navigation is suppressed while locked
        app.navigate(Direction::Right);
        assert_eq!(app.selected_index(), 3);

        app.activate(Action::Navigate("page_2.html".to_string()));
        assert!(!app.document().overlay.displayed);
        assert!(!app.document().scroll_locked);
        assert_eq!(app.entries()[0].id, "21");
    }

    #[test]
    fn test_escape_closes_then_quits() {
        let mut app = app_with(3);
        app.start(1);
        let now = Instant::now();

        app.activate_card(0);
        app.escape(now);
        assert!(!app.should_quit());
        assert!(!app.document().overlay.active);

        // Still fading out: Escape does not quit yet
        app.escape(now);
        assert!(!app.should_quit());

        app.tick(now + Duration::from_secs(1));
        assert!(!app.document().scroll_locked);
        assert_eq!(app.next_deadline(), None);

        app.escape(now);
        assert!(app.should_quit());
    }

    #[test]
    fn test_mouse_clicks() {
        let mut app = app_with(3);
        app.start(1);
        let now = Instant::now();

        app.hits_mut().push(Rect::new(0, 0, 10, 5), Region::Card(1));
        app.click(2, 2, now);
        assert_eq!(app.document().overlay.id_label, "ID: 2");

        // Overlay drawn over the card
        app.hits_mut().push(Rect::new(0, 0, 8, 4), Region::OverlayPanel);
        app.click(2, 2, now);
        assert!(app.document().overlay.active);

        // Outside the panel is the scrim
        app.click(40, 20, now);
        assert!(!app.document().overlay.active);
    }

    #[test]
    fn test_theme_switcher_click() {
        let mut app = app_with(1);
        let first = app.start(1);
        app.hits_mut()
            .push(Rect::new(70, 0, 3, 1), Region::ThemeSwitcher);

        let request = app.click(71, 0, Instant::now()).unwrap();
        assert_eq!(app.theme_mode(), ThemeMode::Light);
        assert!(app.document().light_theme);
        assert_eq!(request.kind, GlyphKind::Moon);

        assert!(!app.apply_icon(IconResult {
            generation: first.generation,
            glyph: Glyph::fallback(),
        }));
        assert!(app.apply_icon(IconResult {
            generation: request.generation,
            glyph: Glyph::fallback(),
        }));
    }

    #[test]
    fn test_pagination_focus() {
        let mut app = app_with(45);
        app.start(2);
        assert_eq!(app.link_focus(), 2);

        app.toggle_focus();
        assert_eq!(app.focus(), Focus::Pagination);
        app.navigate(Direction::Right);
        app.activate_focused();
        assert_eq!(app.page().current_page, 3);
    }

    #[test]
    fn test_empty_site() {
        let mut app = app_with(0);
        app.start(1);
        assert!(app.entries().is_empty());
        assert_eq!(app.document().children(Container::Gallery).len(), 1);
        assert_eq!(labels(&app), vec!["1"]);

        // The placeholder has no handler
        app.activate_focused();
        assert!(!app.document().overlay.displayed);
    }
}
