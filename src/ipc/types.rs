use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

/// One request line from the host application.
#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Daemon-wide state. At most one workspace (one student's data) is open at
/// a time; every handler runs against its connection.
#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
}
