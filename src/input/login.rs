use crate::{actions, app::App, models::LoginField};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Esc => app.quit(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.login_field = match app.login_field {
                LoginField::Username => LoginField::Password,
                LoginField::Password => LoginField::Username,
            };
        }
        KeyCode::Enter => actions::submit_login(app),
        KeyCode::Backspace => {
            field_mut(app).pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            field_mut(app).push(c);
        }
        _ => {}
    }
}

fn field_mut(app: &mut App) -> &mut String {
    match app.login_field {
        LoginField::Username => &mut app.login_username,
        LoginField::Password => &mut app.login_password,
    }
}
