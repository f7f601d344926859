//! Row types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A review job
///
/// `status` is one of `pending`, `processing`, `completed`, `failed`;
/// `results_json` holds the serialized review once completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobRow {
    pub task_id: String,
    pub status: String,
    pub results_json: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRow {
    pub fn new(task_id: impl Into<String>, status: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            task_id: task_id.into(),
            status: status.into(),
            results_json: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Decode the stored results, if any
    pub fn results(&self) -> crate::Result<Option<serde_json::Value>> {
        self.results_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(Into::into)
    }
}
