//! Report orchestration: one testlog, its sibling artifacts and the
//! checklist built from them.

pub mod batch;
pub mod checklist;

pub use checklist::{Checklist, ChecklistRow, warnings_only};

use crate::check::analysis::{check_5_input_var, check_6_label};
use crate::check::case_table::{
    check_7_title, check_8_index, check_9_confirm, check_10_header, check_11_analysis,
    check_15_io_var,
};
use crate::check::csv::{check_2_desc, check_3_init_opt, check_4_init_var, classify_source};
use crate::check::io::check_16_io_var;
use crate::check::report::check_12_entire;
use crate::check::sheet::{check_21_sheet_testlog, check_sheet_html};
use crate::check::summary::{check_test_result, summary_expectations, testlog_expectations};
use crate::check::testlog::{check_13_parse, check_14_func};
use crate::check::{CheckError, CheckOutcome, CheckResult, code, settle};
use crate::config::catalog::ChecklistCatalog;
use crate::config::settings::Settings;
use crate::document::{
    AnalysisTable, CaseTable, CsvDefinition, Document, FileCategory, FileCollection,
    FunctionInfo, TestlogDocument, open_document,
};
use crate::package::{PackageCache, function_info};
use crate::progress::reporter::report_warning_code;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A document that could be opened, or the explanation its dependents get.
type Loaded<T> = Result<T, String>;

/// Spec-workbook sheets mirrored from an HTML table.
const SHEET_CHECKS: [(FileCategory, &str); 4] = [
    (FileCategory::Io, "17_sheet_io"),
    (FileCategory::Table, "18_sheet_table"),
    (FileCategory::Oe, "19_sheet_oe"),
    (FileCategory::Ie, "20_sheet_ie"),
];

/// One check run over the artifacts of a single testlog.
pub struct Report<'a> {
    settings: &'a Settings,
    testlog: TestlogDocument,
    files: FileCollection,
    catalog: ChecklistCatalog,
    checklist: Checklist,
    csv: Loaded<CsvDefinition>,
}

impl<'a> Report<'a> {
    /// Parse the testlog, locate its siblings and record file existence.
    pub fn open(testlog: &Path, settings: &'a Settings) -> Result<Self, String> {
        if !testlog.is_file() {
            return Err(format!(
                "failed to open testlog '{}': not a file",
                testlog.display()
            ));
        }
        let document = TestlogDocument::open(testlog)?;
        let (func, src_name) = match document.info() {
            Some(info) => (info.func.clone(), Some(info.src_name.clone())),
            None => (
                testlog
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                None,
            ),
        };
        let files = FileCollection::collect(testlog, &func, src_name.as_deref(), settings);

        let mut report = Self {
            settings,
            testlog: document,
            files,
            catalog: settings.checklist.clone(),
            checklist: Checklist::new(),
            csv: Err(String::new()),
        };
        report.check_files_exist();

        report.csv = report.load(FileCategory::Csv, |document| match document {
            Document::Csv(csv) => Some(csv),
            _ => None,
        });
        if report.csv.as_ref().is_ok_and(|csv| !csv.has_stubs()) {
            report.remove_category(FileCategory::Stub);
        }
        if report.files.tool_native {
            report.remove_category(FileCategory::Xlsx);
        }
        Ok(report)
    }

    pub fn files(&self) -> &FileCollection {
        &self.files
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    pub fn info(&self) -> Option<&FunctionInfo> {
        self.testlog.info()
    }

    /// Drop a category from files, catalog and recorded outcomes.
    pub fn remove_category(&mut self, category: FileCategory) {
        self.files.remove(category);
        self.catalog.remove(category);
        self.checklist.remove(category);
    }

    /// Run every check whose category is still in the catalog.
    pub fn run(&mut self, package: &dyn PackageCache) {
        let settings = self.settings;
        let info: Result<FunctionInfo, CheckError> = self.testlog.info.clone().map_err(|_| {
            CheckError::Indeterminate("Unable to parse testlog to get info".to_owned())
        });

        let outcome = check_13_parse(&self.testlog);
        self.record(FileCategory::Testlog, "13_parse", outcome);
        let outcome = check_14_func(&self.testlog);
        self.record(FileCategory::Testlog, "14_func", outcome);

        let outcome = required(&self.csv).and_then(|csv| {
            let info = info.as_ref().map_err(Clone::clone)?;
            let phrase = &settings.dictionary.model_phrase;
            let kind = classify_source(&info.src_full, phrase, package);
            check_2_desc(csv, kind, phrase)
        });
        self.record(FileCategory::Csv, "2_desc", outcome);
        let outcome = required(&self.csv).and_then(check_3_init_opt);
        self.record(FileCategory::Csv, "3_init_opt", outcome);
        let outcome = required(&self.csv).and_then(check_4_init_var);
        self.record(FileCategory::Csv, "4_init_var", outcome);

        let table: Loaded<CaseTable> = self.load(FileCategory::Table, |document| match document {
            Document::Table(table) => Some(table),
            _ => None,
        });
        let outcome = required(&table).and_then(|table| {
            let info = info.as_ref().map_err(Clone::clone)?;
            check_7_title(table, &info.func)
        });
        self.record(FileCategory::Table, "7_title", outcome);
        let outcome = required(&table).and_then(check_8_index);
        self.record(FileCategory::Table, "8_index", outcome);
        let outcome = required(&table).and_then(check_9_confirm);
        self.record(FileCategory::Table, "9_confirm", outcome);
        let outcome =
            required(&table).and_then(|table| check_10_header(table, &settings.table_header_sets));
        self.record(FileCategory::Table, "10_header", outcome);

        let ie: Loaded<AnalysisTable> = self.load(FileCategory::Ie, |document| match document {
            Document::Ie(ie) => Some(ie),
            _ => None,
        });
        let outcome = required(&ie).and_then(|ie| {
            let csv = required(&self.csv)?;
            check_5_input_var(ie, &csv.variables.input)
        });
        self.record(FileCategory::Ie, "5_input_var", outcome);
        let outcome = required(&ie).and_then(check_6_label);
        self.record(FileCategory::Ie, "6_label", outcome);

        let report = self.load(FileCategory::Report, |document| match document {
            Document::Report(report) => Some(report),
            _ => None,
        });
        let outcome = required(&report).and_then(|report| {
            let info = info.as_ref().map_err(Clone::clone)?;
            check_12_entire(report, info)
        });
        self.record(FileCategory::Report, "12_entire", outcome);

        let outcome = required(&table).and_then(|table| {
            let ie = required(&ie)?;
            check_11_analysis(table, ie)
        });
        self.record(FileCategory::Table, "11_analysis", outcome);
        let outcome = required(&table).and_then(|table| {
            let csv = required(&self.csv)?;
            check_15_io_var(table, &csv.variables)
        });
        self.record(FileCategory::Table, "15_io_var", outcome);

        let io = self.load(FileCategory::Io, |document| match document {
            Document::Io(io) => Some(io),
            _ => None,
        });
        let outcome = required(&io).and_then(|io| {
            let table = required(&table)?;
            check_16_io_var(io, &table.variables())
        });
        self.record(FileCategory::Io, "16_io_var", outcome);

        if self.catalog.section(FileCategory::Xlsx).is_none() {
            return;
        }
        let workbook = self.load(FileCategory::Xlsx, |document| match document {
            Document::Workbook(workbook) => Some(workbook),
            _ => None,
        });
        let oe = self.load(FileCategory::Oe, |document| match document {
            Document::Oe(oe) => Some(oe),
            _ => None,
        });

        for (category, check) in SHEET_CHECKS {
            let grid = match category {
                FileCategory::Io => io.as_ref().map(|io| io.raw.as_slice()),
                FileCategory::Table => table.as_ref().map(|table| table.raw.as_slice()),
                FileCategory::Oe => oe.as_ref().map(|oe| oe.raw.as_slice()),
                _ => ie.as_ref().map(|ie| ie.raw.as_slice()),
            };
            let sheet = settings.sheets.for_category(category).unwrap_or_default();
            let outcome = required(&workbook).and_then(|workbook| {
                let grid = grid.map_err(|error| CheckError::DocumentUnreadable(error.clone()))?;
                check_sheet_html(workbook, sheet, grid)
            });
            self.record(FileCategory::Xlsx, check, outcome);
        }

        let outcome = required(&workbook).and_then(|workbook| {
            check_21_sheet_testlog(
                workbook,
                &settings.sheets.testlog,
                &self.testlog.lines,
                &settings.dictionary.testlog_intro,
            )
        });
        self.record(FileCategory::Xlsx, "21_sheet_testlog", outcome);

        let record = info.as_ref().ok().map(|info| function_info(package, info));
        let outcome = required(&workbook).and_then(|workbook| {
            let record = record.as_ref().ok_or_else(|| {
                CheckError::Indeterminate("Unable to get function info from summary".to_owned())
            })?;
            let expected = summary_expectations(record)?;
            check_test_result(
                workbook,
                &settings.sheets.spec,
                &expected,
                "Summary",
                &settings.dictionary.no_issue,
            )
        });
        self.record(FileCategory::Xlsx, "22_result_summary", outcome);

        let has_fault = table.as_ref().is_ok_and(CaseTable::has_fault);
        let outcome = required(&workbook).and_then(|workbook| {
            let info = info.as_ref().map_err(Clone::clone)?;
            let record = record.clone().unwrap_or_default();
            let expected = testlog_expectations(info, &record, has_fault, &settings.dictionary);
            check_test_result(
                workbook,
                &settings.sheets.spec,
                &expected,
                "Testlog",
                &settings.dictionary.no_issue,
            )
        });
        self.record(FileCategory::Xlsx, "23_result_testlog", outcome);
    }

    /// Catalog-ordered rendering of the current checklist.
    pub fn rows(&self) -> Vec<ChecklistRow> {
        self.checklist.rows(&self.catalog, &self.files, self.settings)
    }

    /// Non-passing entries, ignoring the stub source.
    pub fn status(&self) -> ReportStatus {
        let rows = self.rows();
        let issues = rows
            .iter()
            .filter(|row| !row.is_pass() && row.category != FileCategory::Stub)
            .count();
        ReportStatus {
            entries: rows.len(),
            issues,
        }
    }

    /// Label token → analysis items tracing it, with their test cases.
    pub fn label_data(&self) -> Result<BTreeMap<String, Vec<LabelEntry>>, String> {
        let table = match self.open_existing(FileCategory::Table)? {
            Document::Table(table) => table,
            _ => return Err("failed to open test-case table: unexpected document".to_owned()),
        };
        let ie = match self.open_existing(FileCategory::Ie)? {
            Document::Ie(ie) => ie,
            _ => return Err("failed to open analysis table: unexpected document".to_owned()),
        };
        let testcases = table.testcase_index()?;

        let mut labels: BTreeMap<String, Vec<LabelEntry>> = BTreeMap::new();
        for item in &ie.items {
            let entry = LabelEntry {
                item: item.item.clone(),
                id: item.id.clone(),
                comment: item.comment.clone(),
                sub: item.sub,
                testcases: testcases.get(&item.item).cloned().unwrap_or_default(),
            };
            for label in item.labels() {
                labels.entry(label).or_default().push(entry.clone());
            }
        }
        Ok(labels)
    }

    fn check_files_exist(&mut self) {
        let files: Vec<(FileCategory, PathBuf)> = self
            .files
            .files
            .iter()
            .map(|(category, path)| (*category, path.clone()))
            .collect();
        for (category, path) in files {
            if path.is_file() {
                self.checklist
                    .record(category, "1_exist", CheckOutcome::pass());
                continue;
            }
            let message = missing_message(&path);
            let Some(section) = self.catalog.section(category) else {
                continue;
            };
            for entry in &section.checks {
                let outcome = if entry.id == "1_exist" {
                    CheckOutcome::fail(message.clone())
                } else {
                    CheckOutcome::inconclusive(message.clone())
                };
                self.checklist.record(category, &entry.id, outcome);
            }
        }
    }

    fn record(&mut self, category: FileCategory, check: &str, result: CheckResult) {
        if self.catalog.section(category).is_none() {
            return;
        }
        self.checklist.record(category, check, settle(result));
    }

    /// Open a sibling, warning on parse failures.
    fn load<T>(&self, category: FileCategory, pick: impl FnOnce(Document) -> Option<T>) -> Loaded<T> {
        let document = self.open_existing(category).inspect_err(|error| {
            if let Some(path) = self.files.path(category)
                && path.is_file()
            {
                report_warning_code(
                    &path.display().to_string(),
                    Some("E_DOCUMENT_UNREADABLE"),
                    error,
                );
            }
        })?;
        pick(document).ok_or_else(|| format!("No parser for {category}"))
    }

    fn open_existing(&self, category: FileCategory) -> Result<Document, String> {
        let path = self
            .files
            .path(category)
            .ok_or_else(|| format!("{category} is not part of this report"))?;
        if !path.is_file() {
            return Err(missing_message(path));
        }
        open_document(category, path, self.settings)?
            .ok_or_else(|| format!("No parser for {category}"))
    }
}

/// Outcome counts used by batch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportStatus {
    pub entries: usize,
    pub issues: usize,
}

impl ReportStatus {
    pub fn is_ok(&self) -> bool {
        self.issues == 0
    }
}

/// Analysis item listed under one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelEntry {
    pub item: String,
    pub id: String,
    pub comment: String,
    pub sub: bool,
    pub testcases: Vec<u64>,
}

fn missing_message(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("File not found {}", code(name))
}

/// A prerequisite document, or the reason its dependents are inconclusive.
fn required<T>(loaded: &Loaded<T>) -> Result<&T, CheckError> {
    loaded
        .as_ref()
        .map_err(|error| CheckError::DocumentUnreadable(error.clone()))
}
