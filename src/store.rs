use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Key holding the JSON-encoded task collection snapshot.
pub const TODOS_KEY: &str = "todos";
/// Key holding the logged-in marker for the current session.
pub const SESSION_KEY: &str = "session";
/// Key holding the username captured at login.
pub const USERNAME_KEY: &str = "username";

/// Durable key-value persistence with browser-localStorage semantics:
/// synchronous, and never surfacing errors to the caller. A missing or
/// unreadable backing store reads as "no data available".
pub trait LocalStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// File-backed store: one file per key under the data directory.
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(err) = fs::create_dir_all(&self.root) {
            warn!(key, %err, "failed to create store directory");
            return;
        }
        if let Err(err) = fs::write(self.key_path(key), value) {
            warn!(key, %err, "failed to write store key");
        }
    }

    fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.key_path(key));
    }
}
