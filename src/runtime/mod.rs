use crate::api::GatewayError;
use crate::app::{App, PendingMutation};
use chrono::Local;
use std::sync::mpsc::TryRecvError;

/// One pass of background bookkeeping, run between renders: fold in any
/// finished gateway calls, then expire transient UI state.
pub fn tick(app: &mut App) {
    drain_mutations(app);
    poll_sync(app);
    expire_toast(app);
}

/// Applies completed create/update/delete calls in whichever order they
/// arrived. Unfinished ones go back in the queue untouched.
fn drain_mutations(app: &mut App) {
    let pending = std::mem::take(&mut app.pending);
    for mutation in pending {
        match mutation {
            PendingMutation::Create(receiver) => match receiver.try_recv() {
                Ok(result) => {
                    if let Err(err) = app.reconciler.apply_create(result) {
                        app.toast(format!("Create failed: {err}"));
                    }
                }
                Err(TryRecvError::Empty) => app.pending.push(PendingMutation::Create(receiver)),
                Err(TryRecvError::Disconnected) => {
                    let _ = app.reconciler.apply_create(Err(worker_stopped()));
                    app.toast("Create failed: worker stopped.");
                }
            },
            PendingMutation::Save { id, receiver } => match receiver.try_recv() {
                Ok(result) => {
                    if let Err(err) = app.reconciler.apply_save(&id, result) {
                        app.toast(format!("Update failed: {err}"));
                    }
                }
                Err(TryRecvError::Empty) => {
                    app.pending.push(PendingMutation::Save { id, receiver });
                }
                Err(TryRecvError::Disconnected) => {
                    let _ = app.reconciler.apply_save(&id, Err(worker_stopped()));
                    app.toast("Update failed: worker stopped.");
                }
            },
            PendingMutation::Delete { id, receiver } => match receiver.try_recv() {
                Ok(result) => {
                    if let Err(err) = app.reconciler.apply_delete(&id, result) {
                        app.toast(format!("Delete failed: {err}"));
                    }
                }
                Err(TryRecvError::Empty) => {
                    app.pending.push(PendingMutation::Delete { id, receiver });
                }
                Err(TryRecvError::Disconnected) => {
                    let _ = app.reconciler.apply_delete(&id, Err(worker_stopped()));
                    app.toast("Delete failed: worker stopped.");
                }
            },
        }
    }
    app.clamp_selection();
}

fn poll_sync(app: &mut App) {
    let result = {
        let Some(receiver) = app.sync_receiver.as_ref() else {
            return;
        };
        receiver.try_recv()
    };

    match result {
        Ok(outcome) => {
            app.sync_receiver = None;
            app.reconciler.finish_sync(outcome);
            if let Some(message) = app.reconciler.status().message() {
                let message = message.to_string();
                app.toast(message);
            }
        }
        Err(TryRecvError::Empty) => {}
        Err(TryRecvError::Disconnected) => {
            app.sync_receiver = None;
            app.reconciler.finish_sync(Err(worker_stopped()));
        }
    }
}

fn expire_toast(app: &mut App) {
    if let Some(expiry) = app.toast_expiry
        && Local::now() >= expiry
    {
        app.toast_expiry = None;
        app.toast_message = None;
    }
}

fn worker_stopped() -> GatewayError {
    GatewayError::Transport("worker thread stopped".to_string())
}
