//! Cross-document checks.
//!
//! Each check is a pure function from one or more parsed documents to a
//! [`CheckResult`]. Errors are settled into an outcome at the check boundary
//! so one defective input never hides sibling results.

pub mod analysis;
pub mod case_table;
pub mod csv;
pub mod io;
pub mod ranges;
pub mod report;
pub mod sheet;
pub mod summary;
pub mod testlog;
pub mod vars;

use serde::{Serialize, Serializer};
use std::fmt;

/// Tri-state result of one check; serialized as `true`/`false`/`null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    Inconclusive,
}

impl Verdict {
    pub fn as_option(self) -> Option<bool> {
        match self {
            Verdict::Pass => Some(true),
            Verdict::Fail => Some(false),
            Verdict::Inconclusive => None,
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

/// Verdict plus the HTML fragment explaining it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub verdict: Verdict,
    pub explanation: String,
}

impl CheckOutcome {
    pub fn pass() -> Self {
        Self {
            verdict: Verdict::Pass,
            explanation: String::new(),
        }
    }

    pub fn fail(explanation: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Fail,
            explanation: explanation.into(),
        }
    }

    pub fn inconclusive(explanation: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Inconclusive,
            explanation: explanation.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}

/// Why a check could not produce a passing verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// A document is missing or could not be parsed.
    DocumentUnreadable(String),
    /// An expected token or line is absent.
    FieldMissing(String),
    /// Two sources disagree.
    ValueMismatch(String),
    /// Prerequisite data could not be classified.
    Indeterminate(String),
}

impl CheckError {
    pub fn code(&self) -> &'static str {
        match self {
            CheckError::DocumentUnreadable(_) => "E_DOCUMENT_UNREADABLE",
            CheckError::FieldMissing(_) => "E_FIELD_MISSING",
            CheckError::ValueMismatch(_) => "E_VALUE_MISMATCH",
            CheckError::Indeterminate(_) => "E_INDETERMINATE",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CheckError::DocumentUnreadable(message)
            | CheckError::FieldMissing(message)
            | CheckError::ValueMismatch(message)
            | CheckError::Indeterminate(message) => message,
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for CheckError {}

impl From<CheckError> for CheckOutcome {
    fn from(error: CheckError) -> Self {
        match error {
            CheckError::DocumentUnreadable(message) | CheckError::Indeterminate(message) => {
                CheckOutcome::inconclusive(message)
            }
            CheckError::FieldMissing(message) | CheckError::ValueMismatch(message) => {
                CheckOutcome::fail(message)
            }
        }
    }
}

pub type CheckResult = Result<CheckOutcome, CheckError>;

pub fn settle(result: CheckResult) -> CheckOutcome {
    result.unwrap_or_else(CheckOutcome::from)
}

/// Parse failures surface as unreadable documents.
pub(crate) fn unreadable(error: String) -> CheckError {
    CheckError::DocumentUnreadable(error)
}

/// Wrap a value in `<code>` for the checklist UI.
pub fn code(value: impl fmt::Display) -> String {
    format!("<code>{value}</code>")
}

/// Accumulates explanation fragments joined with `<br>`.
#[derive(Debug, Default)]
pub struct Explanation {
    lines: Vec<String>,
    failed: bool,
}

impl Explanation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fragment that makes the check fail.
    pub fn fail(&mut self, line: impl Into<String>) {
        self.failed = true;
        self.lines.push(line.into());
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Pass when nothing failed; otherwise fail with `heading` (if any) first.
    pub fn finish(self, heading: Option<&str>) -> CheckOutcome {
        if !self.failed {
            return CheckOutcome::pass();
        }
        let mut lines = Vec::with_capacity(self.lines.len() + 1);
        if let Some(heading) = heading {
            lines.push(heading.to_owned());
        }
        lines.extend(self.lines);
        CheckOutcome::fail(lines.join("<br>"))
    }
}

/// Join list entries, keeping at most `cap` and summarizing the remainder.
pub fn capped(entries: &[String], cap: usize) -> String {
    let mut shown: Vec<String> = entries.iter().take(cap).cloned().collect();
    if entries.len() > cap {
        shown.push(format!("... ({} more)", entries.len() - cap));
    }
    shown.join("<br>")
}
