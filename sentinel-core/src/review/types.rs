//! Review payloads produced by the final-answer tool

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// One finding in a reviewed file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    /// Category such as "bug", "style" or "performance"
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_count")]
    pub line_number: u64,
    pub suggestion: String,
}

/// Findings for a single file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReview {
    pub name: String,
    pub issues: Vec<Issue>,
}

/// Issue counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    #[serde(deserialize_with = "lenient_count")]
    pub total_files: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub total_issues: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub critical_issues: u64,
}

impl std::ops::AddAssign for Summary {
    fn add_assign(&mut self, other: Self) {
        self.total_files = self.total_files.saturating_add(other.total_files);
        self.total_issues = self.total_issues.saturating_add(other.total_issues);
        self.critical_issues = self.critical_issues.saturating_add(other.critical_issues);
    }
}

/// Structured output of one agent run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalAnswer {
    pub file: FileReview,
    pub summary: Summary,
}

impl FinalAnswer {
    /// Build the payload from the model's final-answer parameters
    ///
    /// Missing fields take their defaults and unknown fields are ignored.
    /// Parameters that are not an object, or whose fields have unusable
    /// shapes, produce the empty payload.
    pub fn from_parameters(parameters: &serde_json::Value) -> Self {
        if !parameters.is_object() {
            return Self::default();
        }

        serde_json::from_value(parameters.clone()).unwrap_or_else(|e| {
            warn!(error = %e, "Malformed final answer, using empty payload");
            Self::default()
        })
    }
}

/// Aggregated review of a pull request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestReview {
    pub files: Vec<FileReview>,
    pub summary: Summary,
}

impl PullRequestReview {
    /// Collect per-file answers, summing their counts
    pub fn aggregate(answers: impl IntoIterator<Item = FinalAnswer>) -> Self {
        let mut review = Self::default();
        for answer in answers {
            review.summary += answer.summary;
            review.files.push(answer.file);
        }
        review
    }
}

/// Accept integers, numeric strings and null; negatives clamp to zero
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}
