// UI layer: draws whichever screen is active with ratatui. Pure projection
// of the state; nothing here mutates the app.

use crate::await_overlay::AwaitOverlay;
use crate::browser::BackupBrowser;
use crate::console::{Console, PROMPT_HEIGHT};
use crate::login::{Field, LoginScreen};
use crate::screen::{App, Screen};
use crate::scrollback::{reflow, LineKind};
use indicatif::HumanDuration;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Padding, Paragraph};
use ratatui::Frame;
use std::time::Instant;

const PINK: Color = Color::Rgb(245, 194, 231);
const SURFACE1: Color = Color::Rgb(69, 71, 90);
const SURFACE2: Color = Color::Rgb(88, 91, 112);
const TEXT: Color = Color::Rgb(205, 214, 244);

/// Draw the active screen into the whole frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.size();
    match app.screen() {
        Screen::Login(login) => draw_login(frame, area, login),
        Screen::Console(console) => draw_console(frame, area, console),
        Screen::BackupBrowser(browser) => draw_browser(frame, area, browser),
        Screen::Await(waiting) => draw_await(frame, area, &waiting.overlay, Instant::now()),
    }
}

/// Rect of `height` rows centered vertically in `area`.
fn centered_rows(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        x: area.x,
        y: area.y + (area.height - height) / 2,
        width: area.width,
        height,
    }
}

fn label(text: &str) -> Span<'static> {
    Span::styled(text.to_string(), Style::default().fg(PINK))
}

fn draw_login(frame: &mut Frame, area: Rect, login: &LoginScreen) {
    if let Some(err) = &login.error {
        let mut lines = vec![
            Line::from(Span::styled(
                "Error trying to login",
                Style::default().fg(PINK).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for text in reflow(err, area.width.saturating_sub(12) as usize) {
            lines.push(Line::from(Span::styled(text, Style::default().fg(SURFACE2))));
        }
        let rect = centered_rows(area, lines.len() as u16);
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rect);
        return;
    }

    let caret = |field: Field| if login.focused() == field { "> " } else { "  " };
    let masked = "*".repeat(login.password.chars().count());
    let username = if login.username.is_empty() && login.focused() != Field::Username {
        Span::styled("username", Style::default().fg(SURFACE1))
    } else {
        Span::styled(login.username.clone(), Style::default().fg(TEXT))
    };
    let password = if masked.is_empty() {
        Span::styled("********", Style::default().fg(SURFACE1))
    } else {
        Span::styled(masked, Style::default().fg(TEXT))
    };

    let mut lines = vec![
        Line::from(vec![label("username"), Span::raw(caret(Field::Username)), username]),
        Line::from(vec![label("password"), Span::raw(caret(Field::Password)), password]),
    ];
    if login.pending {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Logging in...", Style::default().fg(SURFACE2))));
    } else if let Some(notice) = &login.notice {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(notice.clone(), Style::default().fg(SURFACE2))));
    }
    let rect = centered_rows(area, lines.len() as u16 + 2);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().padding(Padding::vertical(1))),
        rect,
    );
}

fn draw_console(frame: &mut Frame, area: Rect, console: &Console) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(PROMPT_HEIGHT)])
        .split(area);

    let lines: Vec<Line> = console
        .scrollback()
        .visible()
        .into_iter()
        .map(|l| match l.kind {
            LineKind::Label => Line::from(Span::styled(
                l.text,
                Style::default().fg(PINK).add_modifier(Modifier::BOLD),
            )),
            LineKind::Body => Line::from(Span::styled(l.text, Style::default().fg(SURFACE2))),
            LineKind::Separator => Line::from(""),
        })
        .collect();

    let session = console.session();
    let history = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(SURFACE1))
        .title(format!(" {} ", session.issued_to))
        .padding(Padding::horizontal(1));
    frame.render_widget(Paragraph::new(lines).block(history), chunks[0]);

    let mut title = String::from(" command ");
    if let Some(pending) = console.pending() {
        let waited = pending.started_at.elapsed();
        title.push_str(&format!("(waiting for reply, {}) ", HumanDuration(waited)));
    }
    let prompt = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(PINK)),
        Span::styled(console.input().to_string(), Style::default().fg(TEXT)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(SURFACE1))
            .title(title),
    );
    frame.render_widget(prompt, chunks[1]);
}

fn draw_browser(frame: &mut Frame, area: Rect, browser: &BackupBrowser) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .margin(1)
        .split(area);

    let items: Vec<ListItem> = browser
        .items
        .iter()
        .map(|item| {
            ListItem::new(vec![
                Line::from(Span::styled(item.display_name.clone(), Style::default().fg(TEXT))),
                Line::from(Span::styled(item.raw_id.clone(), Style::default().fg(SURFACE2))),
            ])
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(SURFACE1))
                .title(" Backups "),
        )
        .highlight_style(Style::default().fg(PINK).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !browser.items.is_empty() {
        state.select(Some(browser.selected));
    }
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let status = if browser.loading {
        "Loading backups...".to_string()
    } else if let Some(err) = &browser.error {
        format!("Could not list backups: {err}")
    } else if browser.items.is_empty() {
        "No backups found".to_string()
    } else {
        "enter restore · esc back · r refresh".to_string()
    };
    frame.render_widget(
        Paragraph::new(Span::styled(status, Style::default().fg(SURFACE2))),
        chunks[1],
    );
}

fn draw_await(frame: &mut Frame, area: Rect, overlay: &AwaitOverlay, now: Instant) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(overlay.spinner_frame(), Style::default().fg(PINK)),
            Span::raw(" "),
            Span::styled(overlay.headline().to_string(), Style::default().fg(TEXT)),
        ]),
        Line::from(Span::styled(overlay.detail_at(now), Style::default().fg(SURFACE2))),
    ];
    if let Some(help) = overlay.help() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(help, Style::default().fg(SURFACE1))));
    }
    let rect = centered_rows(area, lines.len() as u16);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rect);
}
