pub(crate) mod editing;
pub(crate) mod login;
pub(crate) mod navigate;

use crate::{
    app::App,
    models::{InputMode, Screen},
};
use crossterm::event::{Event, KeyEventKind};

pub fn handle_event(app: &mut App, event: Event) {
    if let Event::Key(key) = event
        && key.kind == KeyEventKind::Press
    {
        match app.screen {
            Screen::Login => login::handle_key(app, key),
            Screen::Tasks => match app.input_mode {
                InputMode::Navigate => navigate::handle_key(app, key),
                InputMode::Compose | InputMode::Edit => editing::handle_key(app, key),
            },
        }
    }
}
