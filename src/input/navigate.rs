use crate::{actions, app::App};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Char('j') | KeyCode::Down => app.tasks_down(),
        KeyCode::Char('k') | KeyCode::Up => app.tasks_up(),
        KeyCode::Char('a') | KeyCode::Char('i') => actions::open_compose(app),
        KeyCode::Char('e') | KeyCode::Enter => actions::begin_edit(app),
        KeyCode::Char('d') => actions::delete_selected(app),
        KeyCode::Char('s') => actions::start_sync(app),
        KeyCode::Char('L') => actions::logout(app),
        _ => {}
    }
}
