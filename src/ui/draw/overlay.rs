//! Detail overlay drawing
//!
//! The scrim dims the page underneath. The panel is drawn at full strength
//! while the overlay is `active` and faded while a close is pending.

use parking_lot::Mutex;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use ratatui_image::{Resize, StatefulImage};
use std::sync::Arc;

use crate::app::App;
use crate::document::{Container, RenderTarget, Tag};
use crate::ui::images::ImageManager;
use crate::ui::layout::Region;
use crate::ui::theme::Theme;

/// Width of the avatar column when graphics are available
const AVATAR_COLUMN_WIDTH: u16 = 18;
const CLOSE_BUTTON: &str = "[x]";

pub(crate) fn draw_overlay(
    f: &mut Frame,
    app: &mut App,
    images: Option<&Arc<Mutex<ImageManager>>>,
    theme: &Theme,
) {
    let area = f.area();
    let faded = !app.document().overlay.active;
    apply_scrim(f.buffer_mut(), area, theme, faded);

    let panel = centered_rect(70, 80, area);
    if panel.width < 8 || panel.height < 4 {
        return;
    }

    let (fg, border) = if faded {
        (theme.dimmed_alt, theme.dimmed_alt)
    } else {
        (theme.foreground, theme.accent)
    };

    f.render_widget(Clear, panel);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .style(Style::default().fg(fg).bg(theme.card_bg));
    let inner = block.inner(panel);
    f.render_widget(block, panel);

    let close = Rect {
        x: panel.x + panel.width - CLOSE_BUTTON.len() as u16 - 2,
        y: panel.y,
        width: CLOSE_BUTTON.len() as u16,
        height: 1,
    };
    f.render_widget(
        Paragraph::new(CLOSE_BUTTON).style(Style::default().fg(border).bg(theme.card_bg)),
        close,
    );

    let avatar = images
        .filter(|m| m.lock().supports_graphics())
        .and_then(|m| m.lock().avatar(&app.document().overlay.avatar_src));

    let text_area = match avatar {
        Some(protocol) if inner.width > AVATAR_COLUMN_WIDTH * 2 => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Length(AVATAR_COLUMN_WIDTH),
                    Constraint::Min(1),
                ])
                .split(inner);
            let image = StatefulImage::new(None).resize(Resize::Fit(None));
            let mut proto = protocol.lock();
            f.render_stateful_widget(image, columns[0].inner(Margin::new(1, 0)), &mut *proto);
            columns[1]
        }
        _ => inner,
    };

    let details = Paragraph::new(detail_lines(app, theme, faded))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(fg).bg(theme.card_bg));
    f.render_widget(details, text_area);

    let hits = app.hits_mut();
    hits.push(panel, Region::OverlayPanel);
    hits.push(close, Region::CloseButton);
}

/// Overlay fields as display lines
fn detail_lines(app: &App, theme: &Theme, faded: bool) -> Vec<Line<'static>> {
    let doc = app.document();
    let fields = &doc.overlay;
    let tint = |color: Color| if faded { theme.dimmed_alt } else { color };

    let mut lines = vec![
        Line::from(Span::styled(
            fields.name.clone(),
            Style::default()
                .fg(tint(theme.accent))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            fields.id_label.clone(),
            Style::default().fg(tint(theme.dimmed)),
        )),
    ];
    if !fields.created.hidden {
        lines.push(Line::from(Span::styled(
            fields.created.text.clone(),
            Style::default().fg(tint(theme.dimmed)),
        )));
    }
    lines.push(Line::from(Span::styled(
        fields.avatar_alt.clone(),
        Style::default()
            .fg(tint(theme.dimmed_alt))
            .add_modifier(Modifier::ITALIC),
    )));

    lines.push(Line::default());
    let body = Style::default().fg(tint(theme.foreground));
    lines.extend(
        fields
            .epitaph
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), body))),
    );

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Links",
        Style::default()
            .fg(tint(theme.accent))
            .add_modifier(Modifier::BOLD),
    )));
    for node in doc.children(Container::OverlayLinks) {
        let line = match node.tag {
            Tag::A => Line::from(vec![
                Span::styled(
                    format!("↗ {}", node.text_content()),
                    Style::default()
                        .fg(tint(theme.link))
                        .add_modifier(Modifier::UNDERLINED),
                ),
                Span::styled(
                    format!("  {}", node.attr("href").unwrap_or_default()),
                    Style::default().fg(tint(theme.dimmed_alt)),
                ),
            ]),
            _ => Line::from(Span::styled(
                node.text_content(),
                Style::default()
                    .fg(tint(theme.dimmed_alt))
                    .add_modifier(Modifier::ITALIC),
            )),
        };
        lines.push(line);
    }

    lines
}

/// Dim every cell of the page under the overlay
fn apply_scrim(buf: &mut Buffer, area: Rect, theme: &Theme, faded: bool) {
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let cell = &mut buf[(x, y)];
            cell.set_bg(theme.scrim);
            if !faded {
                cell.set_fg(theme.dimmed_alt);
            }
        }
    }
}

/// Rect of `percent_x` by `percent_y` centered in `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let scale = |len: u16, percent: u16| (u32::from(len) * u32::from(percent.min(100)) / 100) as u16;
    let width = scale(area.width, percent_x);
    let height = scale(area.height, percent_y);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let rect = centered_rect(70, 80, Rect::new(0, 0, 100, 30));
        assert_eq!(rect, Rect::new(15, 3, 70, 24));

        let rect = centered_rect(50, 50, Rect::new(10, 10, 20, 10));
        assert_eq!(rect, Rect::new(15, 12, 10, 5));

        // Wide terminals must not overflow
        let rect = centered_rect(70, 80, Rect::new(0, 0, 1200, 400));
        assert_eq!(rect, Rect::new(180, 40, 840, 320));
    }

    #[test]
    fn test_scrim_dims_cells() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        apply_scrim(&mut buf, area, &theme, false);
        assert_eq!(buf[(3, 1)].bg, theme.scrim);
        assert_eq!(buf[(3, 1)].fg, theme.dimmed_alt);
    }
}
