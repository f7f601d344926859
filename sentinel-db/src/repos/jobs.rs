//! Review job table

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::JobRow;
use crate::{Error, Result};

const VALID_STATUSES: &[&str] = &["pending", "processing", "completed", "failed"];

/// Repository over `jobs`
#[derive(Clone)]
pub struct JobsRepo {
    pool: SqlitePool,
}

impl JobsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a job or replace its status, results and error
    ///
    /// `created_at` is kept from the first write.
    pub async fn upsert(&self, job: &JobRow) -> Result<()> {
        if !VALID_STATUSES.contains(&job.status.as_str()) {
            return Err(Error::InvalidData(format!(
                "Unknown job status '{}' for {}",
                job.status, job.task_id
            )));
        }

        sqlx::query(
            "INSERT INTO jobs (task_id, status, results_json, error, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(task_id) DO UPDATE SET
                status = excluded.status,
                results_json = excluded.results_json,
                error = excluded.error,
                updated_at = excluded.updated_at",
        )
        .bind(&job.task_id)
        .bind(&job.status)
        .bind(&job.results_json)
        .bind(&job.error)
        .bind(job.created_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find(&self, task_id: &str) -> Result<Option<JobRow>> {
        let job = sqlx::query_as::<_, JobRow>(
            "SELECT task_id, status, results_json, error, created_at, updated_at
             FROM jobs WHERE task_id = ?1",
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    /// Most recently updated jobs first
    pub async fn recent(&self, limit: i64) -> Result<Vec<JobRow>> {
        let jobs = sqlx::query_as::<_, JobRow>(
            "SELECT task_id, status, results_json, error, created_at, updated_at
             FROM jobs ORDER BY updated_at DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_upsert_and_find() {
        let db = Database::in_memory().await.unwrap();
        let jobs = db.jobs();

        let mut job = JobRow::new("task-1", "pending");
        jobs.upsert(&job).await.unwrap();
        assert_eq!(jobs.find("task-1").await.unwrap().unwrap().status, "pending");

        job.status = "completed".to_string();
        job.results_json = Some(r#"{"files":[]}"#.to_string());
        jobs.upsert(&job).await.unwrap();

        let stored = jobs.find("task-1").await.unwrap().unwrap();
        assert_eq!(stored.status, "completed");
        assert_eq!(
            stored.results().unwrap(),
            Some(serde_json::json!({"files": []}))
        );
        assert!(stored.created_at <= stored.updated_at);
    }

    #[tokio::test]
    async fn test_missing_job() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.jobs().find("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_status_rejected() {
        let db = Database::in_memory().await.unwrap();
        let result = db.jobs().upsert(&JobRow::new("t", "done")).await;
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_recent_respects_limit() {
        let db = Database::in_memory().await.unwrap();
        let jobs = db.jobs();
        jobs.upsert(&JobRow::new("a", "pending")).await.unwrap();
        jobs.upsert(&JobRow::new("b", "pending")).await.unwrap();
        jobs.upsert(&JobRow::new("a", "failed")).await.unwrap();

        assert_eq!(jobs.recent(10).await.unwrap().len(), 2);
        assert_eq!(jobs.recent(1).await.unwrap().len(), 1);
    }
}
