//! Background job records
//!
//! A review is tracked by a task id. [`submit`] records the job as
//! `pending`; [`run_job`] marks it `processing`, runs the work, then writes
//! exactly one terminal status (`completed` or `failed`), even when the work
//! returns an error or panics.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::{Error, Result};

/// Lifecycle of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(format!("Unknown job status: {}", s)),
        }
    }
}

/// Stored state of one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub task_id: String,
    pub status: JobStatus,
    pub results: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobRecord {
    pub fn new(task_id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            task_id: task_id.into(),
            status,
            results: None,
            error: None,
        }
    }

    fn completed(task_id: &str, results: serde_json::Value) -> Self {
        Self {
            results: Some(results),
            ..Self::new(task_id, JobStatus::Completed)
        }
    }

    fn failed(task_id: &str, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(task_id, JobStatus::Failed)
        }
    }
}

/// Job record store keyed by task id
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert or overwrite the record for `record.task_id`
    async fn put(&self, record: &JobRecord) -> Result<()>;

    async fn get(&self, task_id: &str) -> Result<Option<JobRecord>>;
}

/// Process-local job store
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    records: RwLock<HashMap<String, JobRecord>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn put(&self, record: &JobRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.task_id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, task_id: &str) -> Result<Option<JobRecord>> {
        Ok(self.records.read().await.get(task_id).cloned())
    }
}

/// Record a new job as pending
pub async fn submit(store: &dyn JobStore, task_id: &str) -> Result<JobRecord> {
    let record = JobRecord::new(task_id, JobStatus::Pending);
    store.put(&record).await?;
    info!(task_id, "Job submitted");
    Ok(record)
}

/// Run `work` as the body of job `task_id`
///
/// The work runs on its own task so a panic is observed as a failure rather
/// than unwinding through the caller. The returned record is the terminal
/// one; an error is returned only if the terminal write itself fails.
pub async fn run_job<F, T>(store: &dyn JobStore, task_id: &str, work: F) -> Result<JobRecord>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Serialize + Send + 'static,
{
    if let Err(e) = store
        .put(&JobRecord::new(task_id, JobStatus::Processing))
        .await
    {
        warn!(task_id, error = %e, "Failed to mark job as processing");
    }

    let terminal = match tokio::spawn(work).await {
        Ok(Ok(value)) => match serde_json::to_value(value) {
            Ok(results) => JobRecord::completed(task_id, results),
            Err(e) => JobRecord::failed(task_id, format!("Failed to serialize results: {}", e)),
        },
        Ok(Err(e)) => JobRecord::failed(task_id, e.to_string()),
        Err(join) => JobRecord::failed(task_id, format!("Job aborted: {}", join)),
    };

    match terminal.status {
        JobStatus::Completed => info!(task_id, "Job completed"),
        _ => error!(
            task_id,
            error = terminal.error.as_deref().unwrap_or_default(),
            "Job failed"
        ),
    }

    store.put(&terminal).await.map_err(|e| {
        Error::Job(format!(
            "Failed to record {} status for {}: {}",
            terminal.status, task_id, e
        ))
    })?;
    Ok(terminal)
}

/// Current record for a task, if any
pub async fn status(store: &dyn JobStore, task_id: &str) -> Result<Option<JobRecord>> {
    store.get(task_id).await
}

/// Record for a task, failing if the id is unknown
pub async fn results(store: &dyn JobStore, task_id: &str) -> Result<JobRecord> {
    store
        .get(task_id)
        .await?
        .ok_or_else(|| Error::Job(format!("Task {} not found", task_id)))
}
