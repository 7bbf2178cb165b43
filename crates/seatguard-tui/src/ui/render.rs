use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use seatguard_core::guard::{ExternalRedirect, GuardState, NoticeLevel, RedirectPurpose, Surface, SESSION_LIMIT};

use crate::app::{age_display, App, LoginFocus, Screen};

use super::styles;

/// Device cards shown in the chooser, including this one.
const MAX_DEVICE_CARDS: usize = 3;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if app.notice.is_some() {
        render_notice_overlay(frame, app);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  seatguard";
    let identity_hint = match &app.screen {
        Screen::Dashboard { state, .. } | Screen::Chooser { state, .. } => state
            .identity()
            .map(|i| i.email.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + identity_hint.len() + 4),
        )),
        Span::styled(identity_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match &app.screen {
        Screen::SignIn => render_sign_in(frame, app, area),
        Screen::PendingRedirect(redirect) => render_pending_redirect(frame, app, redirect, area),
        Screen::Checking(_) => render_checking(frame, area),
        Screen::Chooser { state, .. } => render_chooser(frame, state, area),
        Screen::Dashboard { state, checked_at } => {
            let age = age_display(*checked_at, Utc::now());
            render_dashboard(frame, state, &age, area)
        }
        Screen::Quitting => {}
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match &app.screen {
        Screen::SignIn => "[Tab] next field | [Enter] select | [Esc] quit",
        Screen::PendingRedirect(ExternalRedirect {
            purpose: RedirectPurpose::Authorize,
            ..
        }) => "[Enter] submit | [Esc] back",
        Screen::PendingRedirect(_) => "[Enter] continue",
        Screen::Checking(_) => "[q]uit",
        Screen::Chooser { .. } => "[f]orce logout others | [s]ign out | [q]uit",
        Screen::Dashboard { .. } => "[r]e-check | [l]ogout | [q]uit",
        Screen::Quitting => "",
    };

    let left_text = match (&app.status_message, &app.screen) {
        (Some(msg), _) => format!(" {} ", msg),
        (None, Screen::Checking(surface)) => format!(" {} ", surface.route().path()),
        (None, Screen::Chooser { surface, .. }) => format!(" {} ", surface.route().path()),
        (None, Screen::Dashboard { .. }) => format!(" {} ", Surface::Dashboard.route().path()),
        (None, _) => " Not signed in ".to_string(),
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width.saturating_sub(left_text.len()).saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("   "),
        Span::styled(label, styles::muted_style()),
        Span::styled(format!("{:<24}{}", value, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw("       ["),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

fn render_sign_in(frame: &mut Frame, app: &App, area: Rect) {
    let form = centered_rect_fixed(46, 12, area);

    // Tail of the email so the cursor stays visible
    let email: String = {
        let chars: Vec<char> = app.login_email.chars().collect();
        chars[chars.len().saturating_sub(24)..].iter().collect()
    };
    let password_masked = "*".repeat(app.login_password.chars().count().min(24));

    let lines = vec![
        Line::from(Span::styled("   Sign in", styles::title_style())),
        Line::from(""),
        field_line("Email:    [", email, app.login_focus == LoginFocus::Email),
        field_line("Password: [", password_masked, app.login_focus == LoginFocus::Password),
        Line::from(""),
        button_line("Login", app.login_focus == LoginFocus::LoginButton),
        Line::from(""),
        Line::from(Span::styled("   or", styles::muted_style())),
        button_line("Continue with Auth0", app.login_focus == LoginFocus::ProviderButton),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), form);
}

fn render_pending_redirect(frame: &mut Frame, app: &App, redirect: &ExternalRedirect, area: Rect) {
    let panel = centered_rect_fixed(area.width.saturating_sub(4).min(100), 14, area);

    let (heading, instructions) = match redirect.purpose {
        RedirectPurpose::Authorize => (
            " Continue with Auth0",
            " Open this address in a browser and sign in:",
        ),
        RedirectPurpose::ProviderLogout => (
            " Finish signing out",
            " Open this address to end the Auth0 session:",
        ),
    };

    let mut lines = vec![
        Line::from(Span::styled(heading, styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(instructions, styles::list_item_style())),
        Line::from(Span::styled(format!(" {}", redirect.url), styles::highlight_style())),
        Line::from(""),
    ];

    match redirect.purpose {
        RedirectPurpose::Authorize => {
            lines.push(Line::from(Span::styled(
                " Then paste the address the browser was sent back to:",
                styles::list_item_style(),
            )));
            let shown: String = {
                let chars: Vec<char> = app.callback_input.chars().collect();
                let visible = panel.width.saturating_sub(6) as usize;
                chars[chars.len().saturating_sub(visible)..].iter().collect()
            };
            lines.push(Line::from(vec![
                Span::styled(" > ", styles::help_key_style()),
                Span::styled(format!("{}▌", shown), styles::selected_style()),
            ]));
        }
        RedirectPurpose::ProviderLogout => {
            lines.push(Line::from(vec![
                Span::styled(" Press ", styles::muted_style()),
                Span::styled("Enter", styles::help_key_style()),
                Span::styled(" when done", styles::muted_style()),
            ]));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, panel);
}

fn render_checking(frame: &mut Frame, area: Rect) {
    let panel = centered_rect_fixed(30, 3, area);
    let paragraph = Paragraph::new(Line::from(Span::styled(
        " Checking sessions...",
        styles::muted_style(),
    )))
    .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(false)));
    frame.render_widget(paragraph, panel);
}

fn render_chooser(frame: &mut Frame, state: &GuardState, area: Rect) {
    let count = state.count().unwrap_or_default();
    let panel = centered_rect_fixed(72, 16, area);
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
        panel,
    );

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Heading
            Constraint::Length(5), // Device cards
            Constraint::Length(1),
            Constraint::Min(3), // Actions
        ])
        .split(panel);

    let heading = vec![
        Line::from(Span::styled(" Multiple devices detected", styles::warning_style())),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Your account is currently active on {} devices.", count),
            styles::list_item_style(),
        )),
    ];
    frame.render_widget(Paragraph::new(heading), inner[0]);

    let cards = (count as usize).clamp(1, MAX_DEVICE_CARDS);
    let card_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, cards as u32); cards])
        .split(inner[1]);
    for (i, card_area) in card_areas.iter().enumerate() {
        let this_device = i == 0;
        let (title, detail) = if this_device {
            ("This device", "You're using this terminal")
        } else {
            ("Other device", "Signed in elsewhere")
        };
        let card = Paragraph::new(vec![
            Line::from(Span::styled(format!(" {}", title), styles::list_item_style())),
            Line::from(Span::styled(format!(" {}", detail), styles::muted_style())),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::device_card_style(this_device))
                .title(format!(" {} ", i + 1)),
        )
        .wrap(Wrap { trim: true });
        frame.render_widget(card, *card_area);
    }

    let actions = vec![
        Line::from(vec![
            Span::styled("  f  ", styles::help_key_style()),
            Span::styled("Continue here (force logout others)", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  s  ", styles::help_key_style()),
            Span::styled("Sign out", styles::help_desc_style()),
        ]),
    ];
    frame.render_widget(Paragraph::new(actions), inner[3]);
}

fn render_dashboard(frame: &mut Frame, state: &GuardState, age: &str, area: Rect) {
    let panel = centered_rect_fixed(60, 11, area);

    let mut lines = vec![Line::from(Span::styled(" Dashboard", styles::title_style())), Line::from("")];

    if let Some(identity) = state.identity() {
        lines.push(Line::from(vec![
            Span::styled(" Welcome, ", styles::muted_style()),
            Span::styled(identity.display_name().to_string(), styles::list_item_style()),
        ]));
        lines.push(Line::from(Span::styled(format!(" {}", identity.email), styles::muted_style())));
        lines.push(Line::from(""));
    }

    let count = state.count().unwrap_or_default();
    lines.push(Line::from(vec![
        Span::styled(" Active sessions: ", styles::muted_style()),
        Span::styled(format!("{}", count), styles::success_style()),
        Span::styled(format!(" (limit {})", SESSION_LIMIT), styles::muted_style()),
    ]));
    lines.push(Line::from(Span::styled(format!(" Checked {}", age), styles::muted_style())));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), panel);
}

fn render_notice_overlay(frame: &mut Frame, app: &App) {
    let Some(notice) = &app.notice else {
        return;
    };
    let area = centered_rect_fixed(50, 8, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let (title, style) = match notice.level {
        NoticeLevel::Error => (" Error ", styles::error_style()),
        NoticeLevel::Warning => (" Warning ", styles::warning_style()),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {}", notice.message), style)),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Enter]", styles::help_key_style()),
            Span::styled(" to continue", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(Span::styled(title, style));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
