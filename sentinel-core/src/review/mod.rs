//! Pull request review: payload types and the per-file driver

mod driver;
mod types;

pub use driver::ReviewDriver;
pub use types::{FileReview, FinalAnswer, Issue, PullRequestReview, Summary};
