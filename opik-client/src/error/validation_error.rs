//! Schema validation errors.

use std::fmt;

use thiserror::Error;

/// Breadcrumb reported for a failure at the document root when the
/// validation context carries no prefix.
pub const ROOT_BREADCRUMB: &str = "<root>";

/// A single validation failure located by its breadcrumb path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Field names (and `[i]` list indices) from the document root.
    pub path: Vec<String>,
    /// What was wrong at that location.
    pub message: String,
}

impl ValidationIssue {
    /// Creates an issue; an empty path is replaced by [`ROOT_BREADCRUMB`].
    pub fn new(path: Vec<String>, message: impl Into<String>) -> Self {
        let path = if path.is_empty() {
            vec![ROOT_BREADCRUMB.to_string()]
        } else {
            path
        };
        Self {
            path,
            message: message.into(),
        }
    }

    /// Returns the breadcrumb rendered as `a -> b -> c`.
    pub fn breadcrumb(&self) -> String {
        self.path.join(" -> ")
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.breadcrumb(), self.message)
    }
}

/// One or more validation failures collected in a single pass.
///
/// An object with several unrelated mistakes produces one `ValidationError`
/// holding one [`ValidationIssue`] per mistake.
///
/// ## Examples
///
/// ```rust
/// use opik_client::error::{ValidationError, ValidationIssue};
///
/// let err = ValidationError::new(vec![
///     ValidationIssue::new(vec!["response".into(), "name".into()], "Expected string. Received 3."),
/// ]);
/// assert_eq!(err.issues().len(), 1);
/// assert!(err.to_string().contains("response -> name"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.issues))]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

fn render(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Creates an error from collected issues.
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        debug_assert!(!issues.is_empty(), "validation error without issues");
        Self { issues }
    }

    /// Creates an error holding a single issue.
    pub fn single(path: Vec<String>, message: impl Into<String>) -> Self {
        Self::new(vec![ValidationIssue::new(path, message)])
    }

    /// Turns a list of collected issues into a result.
    pub fn check(issues: Vec<ValidationIssue>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self::new(issues))
        }
    }

    /// Returns every issue, in the order they were found.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Consumes the error and returns its issues.
    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }
}
