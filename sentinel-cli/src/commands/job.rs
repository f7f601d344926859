//! Job command - inspect recorded review jobs

use clap::{Args, Subcommand};
use sentinel_core::job;
use sentinel_core::Config;

use super::open_database;

/// Arguments for the job command
#[derive(Args, Debug)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand, Debug)]
pub enum JobCommand {
    /// Show a job's status
    Status { task_id: String },

    /// Print a job's full record as JSON
    Results { task_id: String },

    /// List recently updated jobs
    List {
        /// Maximum number of jobs to show
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

impl JobArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let db = open_database(config).await?;

        match &self.command {
            JobCommand::Status { task_id } => match job::status(&db, task_id).await? {
                Some(record) => println!("{}: {}", record.task_id, record.status),
                None => anyhow::bail!("Task {} not found", task_id),
            },
            JobCommand::Results { task_id } => {
                let record = job::results(&db, task_id).await?;
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            JobCommand::List { limit } => {
                let rows = db
                    .jobs()
                    .recent(*limit)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to list jobs: {}", e))?;
                if rows.is_empty() {
                    println!("No jobs recorded");
                }
                for row in rows {
                    println!(
                        "{}  {:<10}  {}",
                        row.task_id,
                        row.status,
                        row.updated_at.format("%Y-%m-%d %H:%M:%S")
                    );
                }
            }
        }

        Ok(())
    }
}
