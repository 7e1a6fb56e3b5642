use crate::{
    api,
    app::{App, PendingMutation},
    auth,
    models::{Field, InputMode, Screen},
};
use tracing::info;

pub fn submit_login(app: &mut App) {
    let username = app.login_username.trim().to_string();
    if auth::login(&app.store, &username, &app.login_password) {
        info!(%username, "login succeeded");
        app.login_error = None;
        app.screen = Screen::Tasks;
    } else {
        app.login_error = Some("Invalid credentials. Use admin / admin123".to_string());
    }
}

pub fn logout(app: &mut App) {
    auth::logout(&app.store);
    app.screen = Screen::Login;
    app.input_mode = InputMode::Navigate;
    app.reconciler.cancel_edit();
    app.login_password.clear();
    app.login_error = None;
}

pub fn open_compose(app: &mut App) {
    app.input_mode = InputMode::Compose;
    app.field = Field::Title;
}

/// Dispatches a create for the new-task draft. An empty trimmed title is a
/// silent local rejection: no gateway call, and the compose fields stay up
/// for the user to finish.
pub fn submit_create(app: &mut App) {
    let Some(request) = app.reconciler.create_request() else {
        return;
    };
    let receiver = api::spawn_create(app.gateway.clone(), request.title, request.eta);
    app.pending.push(PendingMutation::Create(receiver));
    app.input_mode = InputMode::Navigate;
}

pub fn begin_edit(app: &mut App) {
    let Some(id) = app.selected_task_id() else {
        app.toast("No task selected.");
        return;
    };
    app.reconciler.start_edit(&id);
    if app.reconciler.editing_id().is_some() {
        app.input_mode = InputMode::Edit;
        app.field = Field::Title;
    }
}

pub fn submit_save(app: &mut App) {
    let Some(request) = app.reconciler.save_request() else {
        return;
    };
    let id = request.id.clone();
    let receiver = api::spawn_update(
        app.gateway.clone(),
        request.id,
        request.title,
        request.eta,
        request.completed,
    );
    app.pending.push(PendingMutation::Save { id, receiver });
    app.input_mode = InputMode::Navigate;
}

/// Dispatches a delete for the selected task. The task stays in the list
/// until the server acknowledges; there is no optimistic removal.
pub fn delete_selected(app: &mut App) {
    let Some(id) = app.selected_task_id() else {
        app.toast("No task selected.");
        return;
    };
    let receiver = api::spawn_delete(app.gateway.clone(), id.clone());
    app.pending.push(PendingMutation::Delete { id, receiver });
}

pub fn start_sync(app: &mut App) {
    let username = auth::username(&app.store);
    let Some(payload) = app.reconciler.begin_sync(&username) else {
        app.toast("Sync already running.");
        return;
    };
    info!(count = payload.todos.len(), "sync started");
    app.sync_receiver = Some(api::spawn_sync(app.gateway.clone(), payload));
}
