use crate::api::{GatewayError, TaskGateway};
use crate::auth;
use crate::config::Config;
use crate::models::{Field, InputMode, LoginField, Screen, Task};
use crate::reconciler::Reconciler;
use crate::store::FileStore;
use chrono::{DateTime, Duration, Local};
use ratatui::widgets::ListState;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// A mutation whose gateway call is still running on a worker thread.
/// Create/update/delete are deliberately not mutually excluded: several can
/// be in flight at once and their completions apply in arrival order.
pub enum PendingMutation {
    Create(Receiver<Result<Task, GatewayError>>),
    Save {
        id: String,
        receiver: Receiver<Result<Task, GatewayError>>,
    },
    Delete {
        id: String,
        receiver: Receiver<Result<(), GatewayError>>,
    },
}

pub struct App {
    pub config: Config,
    pub store: FileStore,
    pub reconciler: Reconciler<FileStore>,
    pub gateway: Arc<dyn TaskGateway>,

    pub screen: Screen,
    pub input_mode: InputMode,
    pub field: Field,

    pub login_field: LoginField,
    pub login_username: String,
    pub login_password: String,
    pub login_error: Option<String>,

    pub tasks_state: ListState,
    pub pending: Vec<PendingMutation>,
    pub sync_receiver: Option<Receiver<Result<(), GatewayError>>>,

    pub toast_message: Option<String>,
    pub toast_expiry: Option<DateTime<Local>>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, gateway: Arc<dyn TaskGateway>) -> App {
        let store = FileStore::new(config.data.data_path.clone());
        let mut reconciler = Reconciler::new(store.clone());
        reconciler.load_from_store();

        let screen = if auth::is_authenticated(&store) {
            Screen::Tasks
        } else {
            Screen::Login
        };

        let mut tasks_state = ListState::default();
        if !reconciler.tasks().is_empty() {
            tasks_state.select(Some(0));
        }

        App {
            config,
            store,
            reconciler,
            gateway,
            screen,
            input_mode: InputMode::Navigate,
            field: Field::Title,
            login_field: LoginField::Username,
            // Demo credentials are prefilled, as the login form always was.
            login_username: "admin".to_string(),
            login_password: "admin123".to_string(),
            login_error: None,
            tasks_state,
            pending: Vec::new(),
            sync_receiver: None,
            toast_message: None,
            toast_expiry: None,
            should_quit: false,
        }
    }

    pub fn toast(&mut self, message: impl Into<String>) {
        self.toast_message = Some(message.into());
        self.toast_expiry = Some(Local::now() + Duration::seconds(3));
    }

    pub fn selected_task_id(&self) -> Option<String> {
        let i = self.tasks_state.selected()?;
        self.reconciler.tasks().get(i).map(|task| task.id.clone())
    }

    pub fn tasks_up(&mut self) {
        if self.reconciler.tasks().is_empty() {
            return;
        }
        let i = match self.tasks_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.tasks_state.select(Some(i));
    }

    pub fn tasks_down(&mut self) {
        let len = self.reconciler.tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.tasks_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.tasks_state.select(Some(i));
    }

    /// Keeps the selection valid after the collection shrinks or grows
    /// underneath it (completions apply in arrival order).
    pub fn clamp_selection(&mut self) {
        let len = self.reconciler.tasks().len();
        if len == 0 {
            self.tasks_state.select(None);
        } else {
            match self.tasks_state.selected() {
                Some(i) if i < len => {}
                _ => self.tasks_state.select(Some(len - 1)),
            }
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::api::SyncPayload;
    use crate::config::{ApiConfig, Config, DataConfig};

    /// Gateway fake with canned outcomes; no network, no threads.
    pub struct FakeGateway {
        pub fail: bool,
    }

    impl TaskGateway for FakeGateway {
        fn create(&self, title: &str, eta: Option<&str>) -> Result<Task, GatewayError> {
            if self.fail {
                return Err(GatewayError::Transport("offline".to_string()));
            }
            Ok(Task {
                id: format!("srv-{title}"),
                title: title.to_string(),
                eta: eta.map(str::to_string),
                completed: false,
            })
        }

        fn update(
            &self,
            id: &str,
            title: &str,
            eta: Option<&str>,
            completed: bool,
        ) -> Result<Task, GatewayError> {
            if self.fail {
                return Err(GatewayError::Transport("offline".to_string()));
            }
            Ok(Task {
                id: id.to_string(),
                title: title.to_string(),
                eta: eta.map(str::to_string),
                completed,
            })
        }

        fn delete(&self, _id: &str) -> Result<(), GatewayError> {
            if self.fail {
                return Err(GatewayError::Transport("offline".to_string()));
            }
            Ok(())
        }

        fn sync(&self, _payload: &SyncPayload) -> Result<(), GatewayError> {
            if self.fail {
                return Err(GatewayError::Transport("offline".to_string()));
            }
            Ok(())
        }
    }

    pub fn test_app(data_dir: &std::path::Path) -> App {
        let config = Config {
            api: ApiConfig::default(),
            data: DataConfig {
                data_path: data_dir.to_path_buf(),
            },
        };
        App::new(config, Arc::new(FakeGateway { fail: false }))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::test_app;
    use super::*;

    #[test]
    fn app_starts_on_login_screen_without_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());
        assert!(app.screen == Screen::Login);
    }

    #[test]
    fn app_skips_login_with_a_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::new(dir.path().to_path_buf());
            auth::login(&store, "admin", "admin123");
        }
        let app = test_app(dir.path());
        assert!(app.screen == Screen::Tasks);
    }

    #[test]
    fn clamp_selection_handles_a_shrinking_collection() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.tasks_state.select(Some(4));

        app.clamp_selection();

        assert_eq!(app.tasks_state.selected(), None);
    }
}
