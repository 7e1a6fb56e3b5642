use crate::config::ApiConfig;
use crate::models::Task;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single gateway call. The reconciler treats every variant
/// identically; the split exists for display and logs.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned HTTP {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    Body(String),
}

/// Stateless request/response wrapper around the remote task API. Each call
/// is blocking and single-shot; callers run them on worker threads via the
/// `spawn_*` helpers below. No retries anywhere.
pub trait TaskGateway: Send + Sync {
    fn create(&self, title: &str, eta: Option<&str>) -> Result<Task, GatewayError>;
    fn update(
        &self,
        id: &str,
        title: &str,
        eta: Option<&str>,
        completed: bool,
    ) -> Result<Task, GatewayError>;
    fn delete(&self, id: &str) -> Result<(), GatewayError>;
    fn sync(&self, payload: &SyncPayload) -> Result<(), GatewayError>;
}

/// Batch body for the sync endpoint: the full collection plus the username
/// and a client-generated timestamp.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub username: String,
    pub todos: Vec<Task>,
    pub synced_at: String,
}

/// Wire shape of a task as the server returns it. The server does not store
/// `eta`; the client-supplied value is merged back in when mapping.
#[derive(Deserialize)]
struct ApiTask {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    completed: bool,
}

impl ApiTask {
    fn into_task(self, eta: Option<&str>) -> Task {
        Task {
            id: self.id,
            title: self.title,
            eta: eta.map(str::to_string),
            completed: self.completed,
        }
    }
}

#[derive(Serialize)]
struct TaskWriteRequest<'a> {
    title: &'a str,
    completed: bool,
}

pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(5)))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }
}

impl TaskGateway for HttpGateway {
    fn create(&self, title: &str, eta: Option<&str>) -> Result<Task, GatewayError> {
        let resp = self
            .client
            .post(self.todos_url())
            .json(&TaskWriteRequest {
                title,
                completed: false,
            })
            .send()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(GatewayError::Status(resp.status().as_u16()));
        }
        let created: ApiTask = resp.json().map_err(|e| GatewayError::Body(e.to_string()))?;
        Ok(created.into_task(eta))
    }

    fn update(
        &self,
        id: &str,
        title: &str,
        eta: Option<&str>,
        completed: bool,
    ) -> Result<Task, GatewayError> {
        let resp = self
            .client
            .put(format!("{}/{id}", self.todos_url()))
            .json(&TaskWriteRequest { title, completed })
            .send()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(GatewayError::Status(resp.status().as_u16()));
        }
        let updated: ApiTask = resp.json().map_err(|e| GatewayError::Body(e.to_string()))?;
        Ok(updated.into_task(eta))
    }

    fn delete(&self, id: &str) -> Result<(), GatewayError> {
        let resp = self
            .client
            .delete(format!("{}/{id}", self.todos_url()))
            .send()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(GatewayError::Status(resp.status().as_u16()));
        }
        Ok(())
    }

    fn sync(&self, payload: &SyncPayload) -> Result<(), GatewayError> {
        let resp = self
            .client
            .post(format!("{}/sync", self.todos_url()))
            .json(payload)
            .send()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(GatewayError::Status(resp.status().as_u16()));
        }
        Ok(())
    }
}

pub fn spawn_create(
    gateway: Arc<dyn TaskGateway>,
    title: String,
    eta: Option<String>,
) -> Receiver<Result<Task, GatewayError>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let result = gateway.create(&title, eta.as_deref());
        let _ = sender.send(result);
    });
    receiver
}

pub fn spawn_update(
    gateway: Arc<dyn TaskGateway>,
    id: String,
    title: String,
    eta: Option<String>,
    completed: bool,
) -> Receiver<Result<Task, GatewayError>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let result = gateway.update(&id, &title, eta.as_deref(), completed);
        let _ = sender.send(result);
    });
    receiver
}

pub fn spawn_delete(
    gateway: Arc<dyn TaskGateway>,
    id: String,
) -> Receiver<Result<(), GatewayError>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let result = gateway.delete(&id);
        let _ = sender.send(result);
    });
    receiver
}

pub fn spawn_sync(
    gateway: Arc<dyn TaskGateway>,
    payload: SyncPayload,
) -> Receiver<Result<(), GatewayError>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let result = gateway.sync(&payload);
        let _ = sender.send(result);
    });
    receiver
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_task_maps_server_shape_and_merges_eta() {
        let raw = r#"{
            "_id": "66f1a2b3c4d5e6f701234567",
            "title": "Buy milk",
            "completed": false,
            "clientId": null,
            "createdAt": "2026-08-24T10:00:00.000Z",
            "updatedAt": "2026-08-24T10:00:00.000Z",
            "__v": 0
        }"#;
        let parsed: ApiTask = serde_json::from_str(raw).unwrap();
        let task = parsed.into_task(Some("2026-08-30T14:00"));

        assert_eq!(task.id, "66f1a2b3c4d5e6f701234567");
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.eta.as_deref(), Some("2026-08-30T14:00"));
        assert!(!task.completed);
    }

    #[test]
    fn api_task_defaults_missing_completed() {
        let parsed: ApiTask = serde_json::from_str(r#"{"_id": "1", "title": "x"}"#).unwrap();
        assert!(!parsed.into_task(None).completed);
    }

    #[test]
    fn sync_payload_uses_camel_case_on_the_wire() {
        let payload = SyncPayload {
            username: "admin".to_string(),
            todos: vec![Task {
                id: "1".to_string(),
                title: "x".to_string(),
                eta: None,
                completed: false,
            }],
            synced_at: "2026-08-24T10:00:00Z".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["username"], "admin");
        assert_eq!(json["syncedAt"], "2026-08-24T10:00:00Z");
        assert!(json["todos"].is_array());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let gateway = HttpGateway::new(&ApiConfig {
            base_url: "http://localhost:3000/api/".to_string(),
            timeout_seconds: 10,
        })
        .unwrap();
        assert_eq!(gateway.todos_url(), "http://localhost:3000/api/todos");
    }
}
