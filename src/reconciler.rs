use crate::api::{GatewayError, SyncPayload};
use crate::models::{EditDraft, SyncStatus, Task};
use crate::store::{LocalStore, TODOS_KEY};
use chrono::Utc;
use tracing::{info, warn};

/// Payload for the gateway's create call, produced only after local
/// validation. The eta never goes to the server; it rides along so the
/// gateway can merge it into the returned task.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateRequest {
    pub title: String,
    pub eta: Option<String>,
}

/// Payload for the gateway's update call. `completed` is carried from the
/// current collection since this client does not edit it directly.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveRequest {
    pub id: String,
    pub title: String,
    pub eta: Option<String>,
    pub completed: bool,
}

/// Owns the canonical in-memory task collection and mediates every mutation
/// between the caller, the local store, and the remote gateway.
///
/// Mutations are split in two: a validate/request half that yields the
/// gateway payload (or `None` for a local rejection), and an apply half that
/// folds the gateway's outcome back into the collection. The request half
/// runs before the network call; the apply half runs when the call
/// completes, in whatever order completions arrive. Nothing is applied
/// optimistically, so a failed call needs no rollback.
pub struct Reconciler<S: LocalStore> {
    store: S,
    tasks: Vec<Task>,
    pub draft_title: String,
    pub draft_eta: String,
    editing: Option<EditDraft>,
    status: SyncStatus,
    syncing: bool,
}

impl<S: LocalStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            tasks: Vec::new(),
            draft_title: String::new(),
            draft_eta: String::new(),
            editing: None,
            status: SyncStatus::Idle,
            syncing: false,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    pub fn editing(&self) -> Option<&EditDraft> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut EditDraft> {
        self.editing.as_mut()
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_ref().map(|edit| edit.id.as_str())
    }

    /// Populates the collection from the persisted snapshot, once at
    /// startup. Absent or corrupt data degrades to an empty collection;
    /// entries written by earlier schema versions are normalized or dropped.
    pub fn load_from_store(&mut self) {
        let Some(raw) = self.store.get(TODOS_KEY) else {
            return;
        };
        self.tasks = parse_snapshot(&raw);
        info!(count = self.tasks.len(), "loaded task snapshot");
    }

    /// Validates the new-task draft. `None` (no gateway call, no status
    /// change) when the trimmed title is empty.
    pub fn create_request(&self) -> Option<CreateRequest> {
        let title = self.draft_title.trim();
        if title.is_empty() {
            return None;
        }
        Some(CreateRequest {
            title: title.to_string(),
            eta: normalized_eta(&self.draft_eta),
        })
    }

    /// Folds a create outcome into the collection. On success the returned
    /// task is prepended, the snapshot persisted, and the draft cleared. On
    /// failure nothing changes; in particular the draft survives so the
    /// user's input outlives a failed submit. The error is handed back for
    /// presentation.
    pub fn apply_create(&mut self, result: Result<Task, GatewayError>) -> Result<(), GatewayError> {
        let task = result.inspect_err(|err| warn!(%err, "create rejected"))?;
        self.tasks.insert(0, task);
        self.persist_snapshot();
        self.draft_title.clear();
        self.draft_eta.clear();
        Ok(())
    }

    /// Copies the task's current title/eta into the edit scratch. Starting
    /// an edit while another is in progress silently discards the old one.
    pub fn start_edit(&mut self, id: &str) {
        let Some(task) = self.tasks.iter().find(|task| task.id == id) else {
            return;
        };
        self.editing = Some(EditDraft {
            id: task.id.clone(),
            title: task.title.clone(),
            eta: task.eta.clone().unwrap_or_default(),
        });
    }

    /// Validates the edit scratch. `None` when no edit is in progress or
    /// the trimmed scratch title is empty; the scratch is retained either
    /// way. `completed` defaults to `false` when the edited id is no longer
    /// in the collection, which should not happen but must not panic.
    pub fn save_request(&self) -> Option<SaveRequest> {
        let edit = self.editing.as_ref()?;
        let title = edit.title.trim();
        if title.is_empty() {
            return None;
        }
        let completed = self
            .tasks
            .iter()
            .find(|task| task.id == edit.id)
            .map(|task| task.completed)
            .unwrap_or(false);
        Some(SaveRequest {
            id: edit.id.clone(),
            title: title.to_string(),
            eta: normalized_eta(&edit.eta),
            completed,
        })
    }

    /// Folds an update outcome in: on success the matching task is replaced
    /// with the gateway's representation, the snapshot persisted, and the
    /// edit scratch cleared. On failure collection and scratch are left
    /// untouched.
    pub fn apply_save(
        &mut self,
        id: &str,
        result: Result<Task, GatewayError>,
    ) -> Result<(), GatewayError> {
        let updated = result.inspect_err(|err| warn!(%err, id, "update rejected"))?;
        if let Some(slot) = self.tasks.iter_mut().find(|task| task.id == id) {
            *slot = updated;
        }
        self.persist_snapshot();
        self.editing = None;
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Folds a delete outcome in. The task is only removed on success —
    /// never optimistically — and the edit scratch is cleared iff it was
    /// pointing at the deleted task.
    pub fn apply_delete(
        &mut self,
        id: &str,
        result: Result<(), GatewayError>,
    ) -> Result<(), GatewayError> {
        result.inspect_err(|err| warn!(%err, id, "delete rejected"))?;
        self.tasks.retain(|task| task.id != id);
        self.persist_snapshot();
        if self.editing.as_ref().is_some_and(|edit| edit.id == id) {
            self.editing = None;
        }
        Ok(())
    }

    /// Starts a full-collection sync unless one is already in flight
    /// (single-flight: concurrent callers get `None`, not a queue slot).
    pub fn begin_sync(&mut self, username: &str) -> Option<SyncPayload> {
        if self.syncing {
            return None;
        }
        self.syncing = true;
        self.status = SyncStatus::Idle;
        Some(SyncPayload {
            username: username.to_string(),
            todos: self.tasks.clone(),
            synced_at: Utc::now().to_rfc3339(),
        })
    }

    /// Records the sync outcome. The in-flight flag is dropped before the
    /// branch so success and failure share one cleanup path and the flag
    /// can never stick.
    pub fn finish_sync(&mut self, result: Result<(), GatewayError>) {
        self.syncing = false;
        self.status = match result {
            Ok(()) => SyncStatus::Success("Synced with server.".to_string()),
            Err(err) => {
                warn!(%err, "sync failed");
                SyncStatus::Error(format!("Sync failed: {err}"))
            }
        };
    }

    /// Writes the full collection to the store, replacing any prior
    /// snapshot. Called after every successful mutation, never a failed one.
    pub fn persist_snapshot(&self) {
        match serde_json::to_string(&self.tasks) {
            Ok(json) => self.store.set(TODOS_KEY, &json),
            Err(err) => warn!(%err, "failed to serialize task snapshot"),
        }
    }
}

// Browser form inputs yield "" rather than a missing value.
fn normalized_eta(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_snapshot(raw: &str) -> Vec<Task> {
    let Ok(entries) = serde_json::from_str::<Vec<serde_json::Value>>(raw) else {
        warn!("task snapshot is not a JSON array; starting empty");
        return Vec::new();
    };
    entries.into_iter().filter_map(normalize_entry).collect()
}

/// Accepts entries written by earlier schema versions: numeric ids are
/// coerced to strings, missing eta/completed get defaults. Entries without
/// an id or title are dropped.
fn normalize_entry(value: serde_json::Value) -> Option<Task> {
    let id = match value.get("id")? {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let title = value.get("title")?.as_str()?.to_string();
    let eta = value
        .get("eta")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let completed = value
        .get("completed")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    Some(Task {
        id,
        title,
        eta,
        completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::MemoryStore;

    fn server_task(id: &str, title: &str, eta: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            eta: eta.map(str::to_string),
            completed: false,
        }
    }

    fn transport_error() -> GatewayError {
        GatewayError::Transport("connection refused".to_string())
    }

    fn reconciler_with_tasks(tasks: &[Task]) -> (Reconciler<MemoryStore>, MemoryStore) {
        let store = MemoryStore::default();
        store.set(TODOS_KEY, &serde_json::to_string(tasks).unwrap());
        let mut reconciler = Reconciler::new(store.clone());
        reconciler.load_from_store();
        (reconciler, store)
    }

    #[test]
    fn create_request_rejects_whitespace_only_title() {
        let mut reconciler = Reconciler::new(MemoryStore::default());
        reconciler.draft_title = "   ".to_string();
        assert_eq!(reconciler.create_request(), None);
        assert!(reconciler.tasks().is_empty());
    }

    #[test]
    fn create_request_trims_title_and_blanks_empty_eta() {
        let mut reconciler = Reconciler::new(MemoryStore::default());
        reconciler.draft_title = "  Buy milk  ".to_string();
        reconciler.draft_eta = String::new();

        let request = reconciler.create_request().unwrap();
        assert_eq!(request.title, "Buy milk");
        assert_eq!(request.eta, None);
    }

    #[test]
    fn successful_create_prepends_persists_and_clears_draft() {
        let (mut reconciler, store) =
            reconciler_with_tasks(&[server_task("old", "Existing", None)]);
        reconciler.draft_title = "Buy milk".to_string();

        reconciler
            .apply_create(Ok(server_task("srv-1", "Buy milk", None)))
            .unwrap();

        let first = &reconciler.tasks()[0];
        assert_eq!(first.title, "Buy milk");
        assert_eq!(first.eta, None);
        assert!(!first.completed);
        assert_eq!(reconciler.tasks()[1].id, "old");
        assert!(reconciler.draft_title.is_empty());

        let snapshot = store.get(TODOS_KEY).unwrap();
        assert!(snapshot.contains("Buy milk"));
    }

    #[test]
    fn failed_create_keeps_collection_and_draft() {
        let (mut reconciler, store) = reconciler_with_tasks(&[server_task("old", "Existing", None)]);
        store.remove(TODOS_KEY);
        reconciler.draft_title = "Buy milk".to_string();
        reconciler.draft_eta = "2026-08-30T14:00".to_string();

        let outcome = reconciler.apply_create(Err(transport_error()));

        assert!(outcome.is_err());
        assert_eq!(reconciler.tasks().len(), 1);
        assert_eq!(reconciler.draft_title, "Buy milk");
        assert_eq!(reconciler.draft_eta, "2026-08-30T14:00");
        // A failed mutation never persists.
        assert_eq!(store.get(TODOS_KEY), None);
    }

    #[test]
    fn start_edit_overwrites_a_previous_edit() {
        let (mut reconciler, _store) = reconciler_with_tasks(&[
            server_task("a", "Task A", Some("2026-01-01T09:00")),
            server_task("b", "Task B", None),
        ]);

        reconciler.start_edit("a");
        reconciler.start_edit("b");

        let edit = reconciler.editing().unwrap();
        assert_eq!(edit.id, "b");
        assert_eq!(edit.title, "Task B");
        assert_eq!(edit.eta, "");

        let request = reconciler.save_request().unwrap();
        assert_eq!(request.id, "b");
    }

    #[test]
    fn save_request_rejects_empty_scratch_title_but_keeps_edit() {
        let (mut reconciler, _store) = reconciler_with_tasks(&[server_task("a", "Task A", None)]);
        reconciler.start_edit("a");
        reconciler.editing_mut().unwrap().title = "  ".to_string();

        assert_eq!(reconciler.save_request(), None);
        assert_eq!(reconciler.editing_id(), Some("a"));
    }

    #[test]
    fn save_request_defaults_completed_when_task_is_gone() {
        let (mut reconciler, _store) = reconciler_with_tasks(&[server_task("a", "Task A", None)]);
        reconciler.start_edit("a");
        // Simulate the task vanishing between edit start and save.
        reconciler.tasks.clear();

        let request = reconciler.save_request().unwrap();
        assert!(!request.completed);

        // Applying the result against the empty collection must not panic.
        reconciler
            .apply_save("a", Ok(server_task("a", "Task A", None)))
            .unwrap();
        assert_eq!(reconciler.editing(), None);
    }

    #[test]
    fn successful_save_replaces_task_and_clears_edit() {
        let (mut reconciler, store) = reconciler_with_tasks(&[
            server_task("a", "Task A", None),
            server_task("b", "Task B", None),
        ]);
        reconciler.start_edit("a");
        reconciler.editing_mut().unwrap().title = "Task A renamed".to_string();

        reconciler
            .apply_save("a", Ok(server_task("a", "Task A renamed", Some("2026-09-01T08:00"))))
            .unwrap();

        assert_eq!(reconciler.tasks()[0].title, "Task A renamed");
        assert_eq!(reconciler.tasks()[0].eta.as_deref(), Some("2026-09-01T08:00"));
        assert_eq!(reconciler.editing(), None);
        assert!(store.get(TODOS_KEY).unwrap().contains("Task A renamed"));
    }

    #[test]
    fn failed_save_keeps_collection_and_edit_state() {
        let (mut reconciler, _store) = reconciler_with_tasks(&[server_task("a", "Task A", None)]);
        reconciler.start_edit("a");
        reconciler.editing_mut().unwrap().title = "Renamed".to_string();

        let outcome = reconciler.apply_save("a", Err(transport_error()));

        assert!(outcome.is_err());
        assert_eq!(reconciler.tasks()[0].title, "Task A");
        assert_eq!(reconciler.editing().unwrap().title, "Renamed");
    }

    #[test]
    fn failed_delete_keeps_the_task() {
        let (mut reconciler, _store) = reconciler_with_tasks(&[server_task("x", "Task X", None)]);

        let outcome = reconciler.apply_delete("x", Err(transport_error()));

        assert!(outcome.is_err());
        assert!(reconciler.tasks().iter().any(|task| task.id == "x"));
    }

    #[test]
    fn delete_of_edited_task_clears_edit_state() {
        let (mut reconciler, _store) = reconciler_with_tasks(&[
            server_task("a", "Task A", None),
            server_task("b", "Task B", None),
        ]);
        reconciler.start_edit("a");

        reconciler.apply_delete("a", Ok(())).unwrap();

        assert_eq!(reconciler.editing(), None);
        assert_eq!(reconciler.tasks().len(), 1);
    }

    #[test]
    fn delete_of_another_task_keeps_edit_state() {
        let (mut reconciler, _store) = reconciler_with_tasks(&[
            server_task("a", "Task A", None),
            server_task("b", "Task B", None),
        ]);
        reconciler.start_edit("a");

        reconciler.apply_delete("b", Ok(())).unwrap();

        assert_eq!(reconciler.editing_id(), Some("a"));
    }

    #[test]
    fn sync_is_single_flight() {
        let (mut reconciler, _store) = reconciler_with_tasks(&[server_task("a", "Task A", None)]);

        let first = reconciler.begin_sync("admin");
        let second = reconciler.begin_sync("admin");

        assert!(first.is_some());
        assert!(second.is_none());
        assert!(reconciler.is_syncing());
    }

    #[test]
    fn sync_flag_clears_on_success_and_failure() {
        let (mut reconciler, _store) = reconciler_with_tasks(&[]);

        reconciler.begin_sync("admin").unwrap();
        reconciler.finish_sync(Ok(()));
        assert!(!reconciler.is_syncing());
        assert!(matches!(reconciler.status(), SyncStatus::Success(_)));

        reconciler.begin_sync("admin").unwrap();
        reconciler.finish_sync(Err(transport_error()));
        assert!(!reconciler.is_syncing());
        assert!(matches!(reconciler.status(), SyncStatus::Error(_)));

        // The guard resets either way, so a new sync can start.
        assert!(reconciler.begin_sync("admin").is_some());
    }

    #[test]
    fn begin_sync_carries_username_and_full_collection() {
        let (mut reconciler, _store) = reconciler_with_tasks(&[
            server_task("a", "Task A", None),
            server_task("b", "Task B", Some("2026-09-01T08:00")),
        ]);

        let payload = reconciler.begin_sync("admin").unwrap();

        assert_eq!(payload.username, "admin");
        assert_eq!(payload.todos.len(), 2);
        assert!(!payload.synced_at.is_empty());
    }

    #[test]
    fn load_ignores_unparseable_snapshot() {
        let store = MemoryStore::default();
        store.set(TODOS_KEY, "not json");
        let mut reconciler = Reconciler::new(store);

        reconciler.load_from_store();

        assert!(reconciler.tasks().is_empty());
    }

    #[test]
    fn load_normalizes_legacy_entries() {
        let store = MemoryStore::default();
        store.set(TODOS_KEY, r#"[{"id":1,"title":"x"}]"#);
        let mut reconciler = Reconciler::new(store);

        reconciler.load_from_store();

        assert_eq!(
            reconciler.tasks(),
            &[Task {
                id: "1".to_string(),
                title: "x".to_string(),
                eta: None,
                completed: false,
            }]
        );
    }

    #[test]
    fn load_drops_entries_missing_id_or_title() {
        let store = MemoryStore::default();
        store.set(
            TODOS_KEY,
            r#"[{"title":"no id"},{"id":"2"},{"id":"3","title":"kept"}]"#,
        );
        let mut reconciler = Reconciler::new(store);

        reconciler.load_from_store();

        assert_eq!(reconciler.tasks().len(), 1);
        assert_eq!(reconciler.tasks()[0].id, "3");
    }

    #[test]
    fn snapshot_round_trip_preserves_the_collection() {
        let tasks = vec![
            Task {
                id: "srv-1".to_string(),
                title: "First".to_string(),
                eta: Some("2026-09-01T08:00".to_string()),
                completed: true,
            },
            Task {
                id: "1724500000000".to_string(),
                title: "Second".to_string(),
                eta: None,
                completed: false,
            },
        ];
        let (reconciler, store) = reconciler_with_tasks(&tasks);
        reconciler.persist_snapshot();

        let mut reloaded = Reconciler::new(store);
        reloaded.load_from_store();

        assert_eq!(reloaded.tasks(), tasks.as_slice());
    }
}
