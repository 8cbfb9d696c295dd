use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DbStatus {
    Up,
    Down,
}

impl DbStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbStatus::Up => "up",
            DbStatus::Down => "down",
        }
    }
}

/// Body of `GET /healthz`. `status` is always `"ok"`: the process itself is
/// healthy whenever it can answer, the database state is reported separately.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthReport {
    pub status: String,
    pub db: DbStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn up() -> Self {
        Self {
            status: "ok".to_string(),
            db: DbStatus::Up,
            error: None,
        }
    }

    pub fn down(reason: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            db: DbStatus::Down,
            error: Some(reason.into()),
        }
    }
}
