//! SQLite-backed tree cache and job store

use async_trait::async_trait;
use sentinel_db::{Database, JobRow};

use crate::job::{JobRecord, JobStore};
use crate::repo::TreeCache;
use crate::{Error, Result};

#[async_trait]
impl TreeCache for Database {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.cache()
            .get(key)
            .await
            .map_err(|e| Error::Cache(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.cache()
            .set(key, value)
            .await
            .map_err(|e| Error::Cache(e.to_string()))
    }
}

#[async_trait]
impl JobStore for Database {
    async fn put(&self, record: &JobRecord) -> Result<()> {
        let mut row = JobRow::new(record.task_id.clone(), record.status.as_str());
        row.results_json = record
            .results
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        row.error = record.error.clone();

        self.jobs()
            .upsert(&row)
            .await
            .map_err(|e| Error::Job(e.to_string()))
    }

    async fn get(&self, task_id: &str) -> Result<Option<JobRecord>> {
        let Some(row) = self
            .jobs()
            .find(task_id)
            .await
            .map_err(|e| Error::Job(e.to_string()))?
        else {
            return Ok(None);
        };

        let status = row.status.parse().map_err(Error::Job)?;
        let results = row.results().map_err(|e| Error::Job(e.to_string()))?;
        Ok(Some(JobRecord {
            task_id: row.task_id,
            status,
            results,
            error: row.error,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{self, JobStatus};
    use crate::repo::{cache_key, RepositoryTree};
    use crate::test_support::FakeHost;

    #[tokio::test]
    async fn test_tree_cache_round_trip() {
        let db = Database::in_memory().await.unwrap();
        let host = FakeHost::new(&[("src/a.py", "a"), ("src/lib/b.py", "b")]);

        let built = RepositoryTree::load(&host, &db).await.unwrap();
        assert!(TreeCache::get(&db, &cache_key("owner/repo"))
            .await
            .unwrap()
            .is_some());

        let cached = RepositoryTree::load(&host, &db).await.unwrap();
        assert_eq!(host.listing_calls(), 1);
        assert_eq!(cached.render(), built.render());
    }

    #[tokio::test]
    async fn test_job_store_lifecycle() {
        let db = Database::in_memory().await.unwrap();
        job::submit(&db, "task-9").await.unwrap();

        let record = job::run_job(&db, "task-9", async {
            Ok(serde_json::json!({"summary": {"total_files": 1}}))
        })
        .await
        .unwrap();
        assert_eq!(record.status, JobStatus::Completed);

        let stored = job::results(&db, "task-9").await.unwrap();
        assert_eq!(stored.status, JobStatus::Completed);
        assert_eq!(stored.results.unwrap()["summary"]["total_files"], 1);
        assert!(JobStore::get(&db, "missing").await.unwrap().is_none());
    }
}
