//! Validation verdicts and diagnostics.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single structural violation found during validation.
///
/// Serialized with a `kind` tag holding the same taxonomy name as
/// [`Violation::kind`].
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Violation {
    #[error("no JSON object found in text")]
    #[serde(rename = "ExtractionError")]
    Extraction,

    #[error("extracted text is not valid JSON: {message}")]
    #[serde(rename = "SyntaxError")]
    Syntax { message: String },

    #[error("root field `{field}`: {reason}")]
    #[serde(rename = "RootContractError")]
    RootContract { field: String, reason: String },

    #[error("expected a list of nodes, found {found}")]
    #[serde(rename = "ShapeError")]
    Shape { found: String },

    #[error("node {reason}")]
    #[serde(rename = "NodeShapeError")]
    NodeShape { reason: String },

    #[error("`{node}` field `{field}`: {reason}")]
    #[serde(rename = "FieldConstraintError")]
    FieldConstraint {
        node: String,
        field: String,
        reason: String,
    },

    #[error("node nesting exceeds depth limit of {limit}")]
    #[serde(rename = "DepthExceededError")]
    DepthExceeded { limit: usize },
}

impl Violation {
    /// Taxonomy name of this violation.
    pub fn kind(&self) -> &'static str {
        match self {
            Violation::Extraction => "ExtractionError",
            Violation::Syntax { .. } => "SyntaxError",
            Violation::RootContract { .. } => "RootContractError",
            Violation::Shape { .. } => "ShapeError",
            Violation::NodeShape { .. } => "NodeShapeError",
            Violation::FieldConstraint { .. } => "FieldConstraintError",
            Violation::DepthExceeded { .. } => "DepthExceededError",
        }
    }
}

/// A violation and where in the document it was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// JSONPath-like location, e.g. `$.components[2].rgb`.
    pub path: String,

    #[serde(flatten)]
    pub violation: Violation,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.violation.kind(), self.path, self.violation)
    }
}

/// Serialized as `Passed` / `Failed`, the same strings [`ValidationStatus`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Passed,
    Failed,
}

/// Result of validating one document against one schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub task_type: String,
    pub verdict: Verdict,

    /// In traversal order. Empty iff the verdict is `Passed`.
    pub diagnostics: Vec<Diagnostic>,

    pub validated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(task_type: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        let verdict = if diagnostics.is_empty() {
            Verdict::Passed
        } else {
            Verdict::Failed
        };
        Self {
            task_type: task_type.into(),
            verdict,
            diagnostics,
            validated_at: Utc::now(),
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }

    /// First violation, the only one the fail-fast mode produces.
    pub fn first(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }
}

/// Outcome of a validation request.
#[derive(Debug, Clone)]
pub enum Outcome {
    Checked(Report),

    /// No schema is registered for the task type.
    Skipped { task_type: String },
}

impl Outcome {
    pub fn status(&self) -> ValidationStatus {
        match self {
            Outcome::Checked(report) if report.passed() => ValidationStatus::Passed,
            Outcome::Checked(_) => ValidationStatus::Failed,
            Outcome::Skipped { .. } => ValidationStatus::Skipped,
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            Outcome::Checked(report) => Some(report),
            Outcome::Skipped { .. } => None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.report().map(|r| r.diagnostics.as_slice()).unwrap_or(&[])
    }
}

/// The status string recorded alongside judge scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    Passed,
    Failed,
    #[serde(rename = "skipped")]
    Skipped,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Passed => "Passed",
            ValidationStatus::Failed => "Failed",
            ValidationStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
