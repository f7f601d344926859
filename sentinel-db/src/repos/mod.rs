//! Table repositories

pub mod cache;
pub mod jobs;

pub use cache::CacheRepo;
pub use jobs::JobsRepo;
