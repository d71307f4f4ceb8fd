//! Diagnostics accumulated while processing models
#![allow(clippy::must_use_candidate)] // Query helpers are clear at call sites without #[must_use].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of a recorded issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Non-blocking, stylistic finding
    Warning,
    /// Schema violation
    Error,
    /// Unrecoverable for the current operation
    Critical,
}

impl Severity {
    /// Short tag used in reports
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "WARN",
            Self::Error => "ERR",
            Self::Critical => "CRIT",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing mode deciding how schema violations are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Record every issue with its own severity
    #[default]
    Strict,
    /// Record schema violations as warnings
    Relaxed,
}

impl Mode {
    /// Severity an issue is recorded with under this mode
    ///
    /// Critical issues are never downgraded.
    pub const fn adapt(self, severity: Severity) -> Severity {
        match (self, severity) {
            (Self::Relaxed, Severity::Error) => Severity::Warning,
            (_, severity) => severity,
        }
    }
}

/// A single recorded finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Byte offset in the source document, for parse-level findings
    pub offset: Option<usize>,
}

impl Issue {
    /// Create an issue without a source position
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            offset: None,
        }
    }

    /// Attach a byte offset
    #[must_use]
    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "[{}] {} (offset {offset})", self.severity, self.message),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}

/// Ordered list of issues recorded during one operation
///
/// The result is passed by reference through loaders, checkers and the
/// merger. The processing [`Mode`] is applied when an issue is recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    mode: Mode,
    issues: Vec<Issue>,
}

impl ValidationResult {
    /// Create an empty strict result
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty result recording issues under `mode`
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            issues: Vec::new(),
        }
    }

    /// Processing mode of this result
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Record an issue, adapting its severity to the mode
    pub fn add_issue(&mut self, mut issue: Issue) {
        issue.severity = self.mode.adapt(issue.severity);
        self.issues.push(issue);
    }

    /// Record a warning
    pub fn warning(&mut self, message: impl Into<String>) {
        self.add_issue(Issue::new(Severity::Warning, message));
    }

    /// Record a schema violation
    pub fn error(&mut self, message: impl Into<String>) {
        self.add_issue(Issue::new(Severity::Error, message));
    }

    /// Record an unrecoverable finding
    pub fn critical(&mut self, message: impl Into<String>) {
        self.add_issue(Issue::new(Severity::Critical, message));
    }

    /// All recorded issues in order
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Issues recorded as errors
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.with_severity(Severity::Error)
    }

    /// Issues recorded as warnings
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.with_severity(Severity::Warning)
    }

    /// Issues recorded as critical
    pub fn criticals(&self) -> impl Iterator<Item = &Issue> {
        self.with_severity(Severity::Critical)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    /// `true` when no error or critical issue was recorded
    pub fn is_success(&self) -> bool {
        self.issues.iter().all(|i| i.severity == Severity::Warning)
    }

    /// Check if any critical issue was recorded
    pub fn has_critical(&self) -> bool {
        self.criticals().next().is_some()
    }

    /// Check if no issue at all was recorded
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of recorded issues
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Clear all issues for reuse, keeping the mode
    pub fn reset(&mut self) {
        self.issues.clear();
    }
}

impl From<&ValidationResult> for bool {
    fn from(result: &ValidationResult) -> Self {
        result.is_success()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Convert a 1-based line/column position reported by a parser to a byte offset
///
/// Positions past the end of the text clamp to its length.
pub fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_is_success() {
        let result = ValidationResult::new();
        assert!(result.is_success());
        assert!(result.is_empty());
        assert!(bool::from(&result));
    }

    #[test]
    fn test_warnings_keep_success() {
        let mut result = ValidationResult::new();
        result.warning("style");
        assert!(result.is_success());
        assert_eq!(result.warnings().count(), 1);
    }

    #[test]
    fn test_errors_fail_result() {
        let mut result = ValidationResult::new();
        result.error("bad value");
        assert!(!result.is_success());
        assert_eq!(result.errors().count(), 1);
        assert!(!result.has_critical());
    }

    #[test]
    fn test_relaxed_mode_downgrades_errors_only() {
        let mut result = ValidationResult::with_mode(Mode::Relaxed);
        result.error("bad value");
        result.critical("missing schema");

        assert_eq!(result.issues()[0].severity, Severity::Warning);
        assert_eq!(result.issues()[1].severity, Severity::Critical);
        assert!(!result.is_success());
    }

    #[test]
    fn test_reset_clears_issues() {
        let mut result = ValidationResult::with_mode(Mode::Relaxed);
        result.critical("broken");
        result.reset();
        assert!(result.is_empty());
        assert_eq!(result.mode(), Mode::Relaxed);
    }

    #[test]
    fn test_byte_offset() {
        let text = "{\n  \"a\": x\n}";
        assert_eq!(byte_offset(text, 1, 1), 0);
        assert_eq!(byte_offset(text, 2, 8), 9);
        assert_eq!(&text[byte_offset(text, 2, 8)..=byte_offset(text, 2, 8)], "x");
        assert_eq!(byte_offset(text, 10, 1), text.len());
    }

    #[test]
    fn test_issue_display_with_offset() {
        let issue = Issue::new(Severity::Critical, "unexpected token").at(42);
        assert_eq!(issue.to_string(), "[CRIT] unexpected token (offset 42)");
    }
}
