//! Subcommand implementations

mod job;
mod review;
mod tree;

pub use job::JobArgs;
pub use review::ReviewArgs;
pub use tree::TreeArgs;

use sentinel_core::Config;
use sentinel_db::Database;

/// Open the store configured under `[cache]`, falling back to the default path
pub(crate) async fn open_database(config: &Config) -> anyhow::Result<Database> {
    let db = match config.cache.resolved_db_path() {
        Some(path) => Database::new(&path).await,
        None => Database::open_default().await,
    };
    db.map_err(|e| anyhow::anyhow!("Failed to open database: {}", e))
}
