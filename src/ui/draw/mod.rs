//! Drawing functions for the TUI
//!
//! - `page` - Title bar, gallery grid, pagination bar, status bar
//! - `overlay` - Detail overlay and scrim, drawn over the page

mod overlay;
mod page;

use parking_lot::Mutex;
use ratatui::Frame;
use std::sync::Arc;

use crate::app::App;
use crate::ui::images::ImageManager;

use overlay::draw_overlay;
use page::draw_page;

/// Main draw function. Rebuilds the click hit map as it goes.
pub fn draw(f: &mut Frame, app: &mut App, images: Option<&Arc<Mutex<ImageManager>>>) {
    let theme = app.config().resolve_theme(app.document().light_theme);
    app.hits_mut().clear();

    draw_page(f, app, images, &theme);
    if app.document().overlay.displayed {
        draw_overlay(f, app, images, &theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::preferences::MemoryStore;
    use crate::tombstone::{sample, Site};
    use crate::ui::layout::Region;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Instant;

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buf = terminal.backend().buffer();
        let area = buf.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app_with(count: usize) -> App {
        let tombstones = (1..=count)
            .map(|i| sample(&i.to_string(), Some("2024-01-01"), &[]))
            .collect();
        let config = Config::default();
        let site = Site::paginate(tombstones, config.site.per_page);
        let mut app = App::new(config, site, Box::new(MemoryStore::default()));
        app.start(1);
        app
    }

    #[test]
    fn test_draw_page() {
        let mut app = app_with(25);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, &mut app, None)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("Cyber Cemetery - Page 1"));
        assert!(text.contains("CyberSoul1"));
        assert!(text.contains("ID: 1"));
        assert!(text.contains("Next"));
        // No glyph loaded yet
        assert!(text.contains('…'));
    }

    #[test]
    fn test_draw_records_regions() {
        let mut app = app_with(3);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, &mut app, None)).unwrap();

        // Title bar switcher sits at the right edge
        assert_eq!(app.hits_mut().hit(95, 1), Some(Region::ThemeSwitcher));
        // First card starts just inside the gallery border
        assert_eq!(app.hits_mut().hit(2, 4), Some(Region::Card(0)));
    }

    #[test]
    fn test_draw_empty_page() {
        let mut app = app_with(0);
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| draw(f, &mut app, None)).unwrap();

        assert!(screen(&terminal).contains(crate::gallery::EMPTY_PLACEHOLDER));
    }

    #[test]
    fn test_draw_overlay() {
        let mut app = app_with(3);
        app.activate_card(1);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, &mut app, None)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("ID: 2"));
        assert!(text.contains("Created: 2024-01-01"));
        assert!(text.contains(crate::overlay::NO_LINKS_PLACEHOLDER));
        assert!(text.contains("[x]"));

        // The panel sits over the cards; the corner is scrim
        assert_eq!(app.hits_mut().hit(50, 15), Some(Region::OverlayPanel));
        assert_eq!(app.hits_mut().hit(0, 29), None);

        app.click(0, 29, Instant::now());
        assert!(!app.document().overlay.active);
    }
}
