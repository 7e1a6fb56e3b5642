use crate::{
    actions,
    app::App,
    models::{Field, InputMode},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key handling for the compose (new task) and edit fields. Both are a
/// title/eta pair; which pair the keystrokes land in depends on the mode.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // An edit can be cleared underneath us when its save or a delete
    // completes; fall back to navigation instead of typing into nothing.
    if app.input_mode == InputMode::Edit && app.reconciler.editing().is_none() {
        app.input_mode = InputMode::Navigate;
        return;
    }

    match key.code {
        KeyCode::Esc => {
            if app.input_mode == InputMode::Edit {
                app.reconciler.cancel_edit();
            }
            app.input_mode = InputMode::Navigate;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.field = match app.field {
                Field::Title => Field::Eta,
                Field::Eta => Field::Title,
            };
        }
        KeyCode::Enter => match app.input_mode {
            InputMode::Compose => actions::submit_create(app),
            InputMode::Edit => actions::submit_save(app),
            InputMode::Navigate => {}
        },
        KeyCode::Backspace => {
            if let Some(field) = field_mut(app) {
                field.pop();
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(field) = field_mut(app) {
                field.push(c);
            }
        }
        _ => {}
    }
}

fn field_mut(app: &mut App) -> Option<&mut String> {
    match (app.input_mode, app.field) {
        (InputMode::Compose, Field::Title) => Some(&mut app.reconciler.draft_title),
        (InputMode::Compose, Field::Eta) => Some(&mut app.reconciler.draft_eta),
        (InputMode::Edit, Field::Title) => app.reconciler.editing_mut().map(|edit| &mut edit.title),
        (InputMode::Edit, Field::Eta) => app.reconciler.editing_mut().map(|edit| &mut edit.eta),
        (InputMode::Navigate, _) => None,
    }
}
