//! Page drawing: title bar, gallery grid, pagination bar, status bar

use parking_lot::Mutex;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use ratatui_image::{Resize, StatefulImage};
use std::sync::Arc;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Focus};
use crate::document::{Container, RenderTarget};
use crate::ui::entry_card::{truncate, CardView, TombstoneCard};
use crate::ui::images::ImageManager;
use crate::ui::layout::{GridLayout, Region, CARD_HEIGHT};
use crate::ui::theme::Theme;

/// Gap between columns
const COLUMN_GAP: u16 = 2;
/// Width of the theme switcher in the title bar
const SWITCHER_WIDTH: u16 = 4;
/// Gap between pagination links
const LINK_GAP: u16 = 2;

pub(crate) fn draw_page(
    f: &mut Frame,
    app: &mut App,
    images: Option<&Arc<Mutex<ImageManager>>>,
    theme: &Theme,
) {
    let area = f.area();
    let bg_block = Block::default().style(Style::default().bg(theme.background));
    f.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(1),    // Gallery
            Constraint::Length(1), // Pagination
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_title_bar(f, app, chunks[0], images, theme);
    draw_gallery(f, app, chunks[1], theme);
    draw_pagination(f, app, chunks[2], theme);
    draw_status_bar(f, app, chunks[3], theme);
}

/// Page title plus the theme switcher at the right edge
fn draw_title_bar(
    f: &mut Frame,
    app: &mut App,
    area: Rect,
    images: Option<&Arc<Mutex<ImageManager>>>,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(" cyber-cemetery ")
        .style(Style::default().bg(theme.background));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let title = Paragraph::new(app.document().title.as_str()).style(
        Style::default()
            .fg(theme.foreground)
            .bg(theme.background)
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(title, inner);

    let width = SWITCHER_WIDTH.min(inner.width);
    let switcher = Rect {
        x: inner.x + inner.width - width,
        y: inner.y,
        width,
        height: inner.height,
    };

    let icon = images
        .filter(|m| m.lock().supports_graphics())
        .and_then(|m| m.lock().theme_icon());

    match icon {
        Some(protocol) => {
            let clear = Block::default().style(Style::default().bg(theme.background));
            f.render_widget(clear, switcher);
            let image = StatefulImage::new(None).resize(Resize::Fit(None));
            let mut proto = protocol.lock();
            f.render_stateful_widget(image, switcher, &mut *proto);
        }
        None => {
            // Glyph still loading shows an ellipsis
            let symbol = app
                .document()
                .theme_switcher
                .as_ref()
                .map(|g| g.kind.symbol())
                .unwrap_or("…");
            let glyph = Paragraph::new(format!(" {} ", symbol))
                .alignment(Alignment::Right)
                .style(Style::default().fg(theme.icon).bg(theme.background));
            f.render_widget(glyph, switcher);
        }
    }

    app.hits_mut().push(switcher, Region::ThemeSwitcher);
}

/// Draw the gallery container as a grid of cards
fn draw_gallery(f: &mut Frame, app: &mut App, area: Rect, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.dimmed_alt))
        .style(Style::default().bg(theme.background));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let grid = GridLayout::fit(app.config().appearance.columns, inner);
    app.set_grid_layout(grid);

    let selected = app.selected_index();
    let highlight = app.focus() == Focus::Gallery && !app.document().scroll_locked;
    let column_width = column_width(inner.width, grid.columns);
    let nodes = app.document().children(Container::Gallery);

    // Placeholder paragraph instead of cards
    if let Some(node) = nodes.first().filter(|n| !n.has_class("tombstone")) {
        let placeholder = Paragraph::new(node.text_content())
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(theme.dimmed_alt)
                    .bg(theme.background)
                    .add_modifier(Modifier::ITALIC),
            );
        f.render_widget(placeholder, inner);
        return;
    }

    let range = grid.visible_range(selected, nodes.len());
    let page_start = range.start;
    let mut regions = Vec::new();

    for (local_idx, node) in nodes[range].iter().enumerate() {
        let Some(card) = CardView::from_node(node) else {
            continue;
        };
        let global_idx = page_start + local_idx;
        let (row, col) = grid.index_to_position(local_idx);

        let card_area = Rect {
            x: inner.x + col * (column_width + COLUMN_GAP),
            y: inner.y + row * CARD_HEIGHT,
            width: column_width,
            height: CARD_HEIGHT,
        };
        if card_area.bottom() > inner.bottom() {
            continue;
        }

        let widget = TombstoneCard::new(card, theme).selected(highlight && global_idx == selected);
        f.render_widget(widget, card_area);
        regions.push((card_area, Region::Card(global_idx)));
    }

    for (rect, region) in regions {
        app.hits_mut().push(rect, region);
    }
}

fn column_width(inner_width: u16, columns: u16) -> u16 {
    if columns > 1 {
        inner_width.saturating_sub(COLUMN_GAP * (columns - 1)) / columns
    } else {
        inner_width
    }
}

/// Draw the pagination container as a centered row of links
fn draw_pagination(f: &mut Frame, app: &mut App, area: Rect, theme: &Theme) {
    let focused = (app.focus() == Focus::Pagination).then(|| app.link_focus());
    let labels: Vec<(String, bool)> = app
        .document()
        .children(Container::Pagination)
        .iter()
        .map(|n| (format!(" {} ", n.text_content()), n.has_class("active")))
        .collect();

    let total_width: u16 = labels
        .iter()
        .map(|(label, _)| label.width() as u16)
        .sum::<u16>()
        + LINK_GAP * labels.len().saturating_sub(1) as u16;
    let mut x = area.x + area.width.saturating_sub(total_width) / 2;

    let mut spans = Vec::new();
    for (index, (label, active)) in labels.into_iter().enumerate() {
        let mut style = if active {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(theme.link)
                .add_modifier(Modifier::UNDERLINED)
        };
        if focused == Some(index) {
            style = style.bg(theme.selection_bg);
        }

        if index > 0 {
            spans.push(Span::raw(" ".repeat(LINK_GAP as usize)));
            x += LINK_GAP;
        }
        let width = label.width() as u16;
        app.hits_mut().push(
            Rect {
                x,
                y: area.y,
                width,
                height: 1,
            },
            Region::PageLink(index),
        );
        x += width;
        spans.push(Span::styled(label, style));
    }

    let bar = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.background));
    f.render_widget(bar, area);
}

/// Draw the status bar
fn draw_status_bar(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let page = app.page();
    let status = if app.document().overlay.displayed {
        format!(
            " Tombstone {} | Esc: close | click outside: close | t: {} | q: quit",
            app.detail_id().unwrap_or("?"),
            app.theme_mode()
        )
    } else {
        format!(
            " Page {}/{} | {} on page | ←↑↓→: move | Enter: open | Tab: links | n/p: next/prev | t: {} | q: quit",
            page.current_page,
            page.total_pages,
            app.entries().len(),
            app.theme_mode()
        )
    };

    let status_bar = Paragraph::new(truncate(&status, area.width as usize))
        .style(Style::default().fg(theme.dimmed).bg(theme.background));
    f.render_widget(status_bar, area);
}
