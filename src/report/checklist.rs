use crate::check::{CheckOutcome, Verdict};
use crate::config::catalog::ChecklistCatalog;
use crate::config::settings::Settings;
use crate::document::{FileCategory, FileCollection};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Recorded outcomes keyed by file category, then check id.
#[derive(Debug, Clone, Default)]
pub struct Checklist {
    entries: BTreeMap<FileCategory, BTreeMap<String, CheckOutcome>>,
}

impl Checklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the outcome of one check.
    pub fn record(&mut self, category: FileCategory, check: &str, outcome: CheckOutcome) {
        self.entries
            .entry(category)
            .or_default()
            .insert(check.to_owned(), outcome);
    }

    pub fn get(&self, category: FileCategory, check: &str) -> Option<&CheckOutcome> {
        self.entries.get(&category)?.get(check)
    }

    pub fn remove(&mut self, category: FileCategory) {
        self.entries.remove(&category);
    }

    pub fn outcomes(&self) -> impl Iterator<Item = (FileCategory, &str, &CheckOutcome)> {
        self.entries.iter().flat_map(|(category, checks)| {
            checks
                .iter()
                .map(move |(check, outcome)| (*category, check.as_str(), outcome))
        })
    }

    /// Rows in catalog order; checks that never ran read as inconclusive.
    pub fn rows(
        &self,
        catalog: &ChecklistCatalog,
        files: &FileCollection,
        settings: &Settings,
    ) -> Vec<ChecklistRow> {
        let mut rows = Vec::new();
        for section in catalog.sections() {
            let file = files
                .path(section.category)
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            for entry in &section.checks {
                let outcome = self
                    .get(section.category, &entry.id)
                    .cloned()
                    .unwrap_or_else(|| CheckOutcome::inconclusive(""));
                rows.push(ChecklistRow {
                    file: file.clone(),
                    category: section.category,
                    check: entry.id.clone(),
                    description: entry.description.clone(),
                    verdict: outcome.verdict,
                    explanation: outcome.explanation,
                    hint: settings.tooltip(&entry.id, &entry.description).to_owned(),
                });
            }
        }
        rows
    }
}

/// One rendered checklist line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistRow {
    pub file: String,
    pub category: FileCategory,
    pub check: String,
    pub description: String,
    pub verdict: Verdict,
    pub explanation: String,
    pub hint: String,
}

impl ChecklistRow {
    pub fn is_pass(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}

/// Rows that did not pass.
pub fn warnings_only(rows: Vec<ChecklistRow>) -> Vec<ChecklistRow> {
    rows.into_iter().filter(|row| !row.is_pass()).collect()
}
