use crate::document::FileCategory;
use serde::{Deserialize, Serialize};

/// One expected check inside a category section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub description: String,
}

/// Ordered checks registered for one file category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogSection {
    pub category: FileCategory,
    pub checks: Vec<CatalogEntry>,
}

impl CatalogSection {
    pub fn contains(&self, check_id: &str) -> bool {
        self.checks.iter().any(|entry| entry.id == check_id)
    }

    pub fn description(&self, check_id: &str) -> Option<&str> {
        self.checks
            .iter()
            .find(|entry| entry.id == check_id)
            .map(|entry| entry.description.as_str())
    }
}

/// Declarative shape of the checklist: categories and their checks, in
/// render order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ChecklistCatalog(Vec<CatalogSection>);

impl ChecklistCatalog {
    pub fn new(sections: Vec<CatalogSection>) -> Self {
        Self(sections)
    }

    pub fn sections(&self) -> &[CatalogSection] {
        &self.0
    }

    pub fn section(&self, category: FileCategory) -> Option<&CatalogSection> {
        self.0.iter().find(|section| section.category == category)
    }

    pub fn categories(&self) -> impl Iterator<Item = FileCategory> + '_ {
        self.0.iter().map(|section| section.category)
    }

    pub fn remove(&mut self, category: FileCategory) {
        self.0.retain(|section| section.category != category);
    }
}

impl Default for ChecklistCatalog {
    fn default() -> Self {
        let exist = ("1_exist", "File exists");
        let section = |category: FileCategory, checks: &[(&str, &str)]| CatalogSection {
            category,
            checks: checks
                .iter()
                .map(|(id, description)| CatalogEntry {
                    id: (*id).to_owned(),
                    description: (*description).to_owned(),
                })
                .collect(),
        };

        Self(vec![
            section(
                FileCategory::Testlog,
                &[
                    exist,
                    ("13_parse", "Header lines and coverage values are readable"),
                    ("14_func", "Function definition appears in the testlog"),
                ],
            ),
            section(
                FileCategory::Csv,
                &[
                    exist,
                    ("2_desc", "Description matches the source kind"),
                    ("3_init_opt", "InitWheneverCall is enabled"),
                    ("4_init_var", "Initialized variables cover the outputs only"),
                ],
            ),
            section(FileCategory::Ini, &[exist]),
            section(FileCategory::Xeat, &[exist]),
            section(FileCategory::Xtct, &[exist]),
            section(
                FileCategory::Ie,
                &[
                    exist,
                    ("5_input_var", "Input variables match the CSV"),
                    ("6_label", "Labels belong to the label set"),
                ],
            ),
            section(
                FileCategory::Io,
                &[exist, ("16_io_var", "Variables match the test-case table")],
            ),
            section(FileCategory::Oe, &[exist]),
            section(FileCategory::Tc, &[exist]),
            section(FileCategory::Info, &[exist]),
            section(
                FileCategory::Table,
                &[
                    exist,
                    ("7_title", "Title names the CSV"),
                    ("8_index", "Numbering starts at 1 without gaps"),
                    ("9_confirm", "Every test case is confirmed"),
                    ("10_header", "Header has every required column"),
                    ("11_analysis", "Analysis items match the input analysis table"),
                    ("15_io_var", "Variables match the CSV"),
                ],
            ),
            section(
                FileCategory::Report,
                &[exist, ("12_entire", "Report matches the testlog")],
            ),
            section(FileCategory::ReportCsv, &[exist]),
            section(FileCategory::Stub, &[exist]),
            section(
                FileCategory::Xlsx,
                &[
                    exist,
                    ("17_sheet_io", "IO sheet matches the HTML"),
                    ("18_sheet_table", "Test-case sheet matches the HTML"),
                    ("19_sheet_oe", "Expected-output sheet matches the HTML"),
                    ("20_sheet_ie", "Input analysis sheet matches the HTML"),
                    ("21_sheet_testlog", "Coverage sheet matches the testlog"),
                    ("22_result_summary", "Result summary matches the package summary"),
                    ("23_result_testlog", "Result summary matches the testlog"),
                ],
            ),
        ])
    }
}
