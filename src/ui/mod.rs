mod components;

use crate::app::App;
use crate::auth;
use crate::models::{Field, InputMode, LoginField, NO_ETA_LABEL, Screen, SyncStatus, format_eta};
use components::{centered_rect, input_span};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

pub fn ui(frame: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Login => draw_login(frame, app),
        Screen::Tasks => draw_tasks(frame, app),
    }
}

fn draw_login(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 40, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" taskpad — sign in ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let masked: String = "•".repeat(app.login_password.chars().count());
    frame.render_widget(
        Paragraph::new(Line::from(input_span(
            "Username",
            &app.login_username,
            app.login_field == LoginField::Username,
        ))),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(Line::from(input_span(
            "Password",
            &masked,
            app.login_field == LoginField::Password,
        ))),
        rows[2],
    );

    if let Some(error) = &app.login_error {
        frame.render_widget(
            Paragraph::new(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )),
            rows[3],
        );
    }

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Enter: sign in · Tab: switch field · Esc: quit",
            Style::default().fg(Color::DarkGray),
        )),
        rows[4],
    );
}

fn draw_tasks(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_compose(frame, app, chunks[1]);
    draw_list(frame, app, chunks[2]);
    draw_status(frame, app, chunks[3]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let username = auth::username(&app.store);
    let line = Line::from(vec![
        Span::styled(
            format!(" {username}'s tasks"),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  a: add · e: edit · d: delete · s: sync · L: logout · q: quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_compose(frame: &mut Frame, app: &App, area: Rect) {
    let composing = app.input_mode == InputMode::Compose;
    let border = if composing { Color::Green } else { Color::Reset };
    let block = Block::default()
        .title(" new task ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = input_span(
        "Title",
        &app.reconciler.draft_title,
        composing && app.field == Field::Title,
    );
    spans.push(Span::raw("   "));
    spans.extend(input_span(
        "ETA",
        &app.reconciler.draft_eta,
        composing && app.field == Field::Eta,
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn draw_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let editing_id = app.reconciler.editing_id().map(str::to_string);
    let items: Vec<ListItem> = app
        .reconciler
        .tasks()
        .iter()
        .map(|task| {
            let being_edited =
                app.input_mode == InputMode::Edit && editing_id.as_deref() == Some(task.id.as_str());
            if being_edited && let Some(edit) = app.reconciler.editing() {
                let mut spans = vec![Span::styled("✎ ", Style::default().fg(Color::Yellow))];
                spans.extend(input_span("Title", &edit.title, app.field == Field::Title));
                spans.push(Span::raw("   "));
                spans.extend(input_span("ETA", &edit.eta, app.field == Field::Eta));
                return ListItem::new(Line::from(spans));
            }

            let checkbox = if task.completed { "[x] " } else { "[ ] " };
            let eta = format_eta(task.eta.as_deref());
            let eta_style = if eta == NO_ETA_LABEL {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Blue)
            };
            ListItem::new(Line::from(vec![
                Span::styled(checkbox, Style::default().fg(Color::Green)),
                Span::raw(task.title.clone()),
                Span::raw("  "),
                Span::styled(eta, eta_style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" tasks "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, area, &mut app.tasks_state);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    // A transient toast wins over the sync status for the status row.
    let line = if let Some(message) = &app.toast_message {
        Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(Color::Yellow),
        ))
    } else if app.reconciler.is_syncing() {
        Line::from(Span::styled(
            " Syncing…",
            Style::default().fg(Color::Cyan),
        ))
    } else {
        match app.reconciler.status() {
            SyncStatus::Idle => Line::from(Span::styled(
                format!(" {} tasks", app.reconciler.tasks().len()),
                Style::default().fg(Color::DarkGray),
            )),
            SyncStatus::Success(msg) => Line::from(Span::styled(
                format!(" ✓ {msg}"),
                Style::default().fg(Color::Green),
            )),
            SyncStatus::Error(msg) => Line::from(Span::styled(
                format!(" ✗ {msg}"),
                Style::default().fg(Color::Red),
            )),
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}
