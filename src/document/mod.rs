pub mod analysis;
pub mod case_table;
pub mod collection;
pub mod csv;
pub mod dispatch;
pub mod expected_table;
pub mod io_table;
pub mod report_table;
pub mod table;
pub mod testlog;
pub mod text;
pub mod xlsx;

pub use analysis::{AnalysisItem, AnalysisTable};
pub use case_table::CaseTable;
pub use collection::FileCollection;
pub use csv::CsvDefinition;
pub use dispatch::open_document;
pub use expected_table::ExpectedTable;
pub use io_table::IoTable;
pub use report_table::ReportTable;
pub use table::{HtmlPage, LogicalTable, SourceCell};
pub use testlog::{FunctionInfo, TestlogDocument};
pub use xlsx::SpecWorkbook;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Kinds of artifact a testlog is accompanied by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Testlog,
    Csv,
    Ini,
    Xeat,
    Xtct,
    Ie,
    Io,
    Oe,
    Tc,
    Info,
    Table,
    Report,
    ReportCsv,
    Stub,
    Xlsx,
}

impl FileCategory {
    pub const ALL: [FileCategory; 15] = [
        FileCategory::Testlog,
        FileCategory::Csv,
        FileCategory::Ini,
        FileCategory::Xeat,
        FileCategory::Xtct,
        FileCategory::Ie,
        FileCategory::Io,
        FileCategory::Oe,
        FileCategory::Tc,
        FileCategory::Info,
        FileCategory::Table,
        FileCategory::Report,
        FileCategory::ReportCsv,
        FileCategory::Stub,
        FileCategory::Xlsx,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FileCategory::Testlog => "testlog",
            FileCategory::Csv => "csv",
            FileCategory::Ini => "ini",
            FileCategory::Xeat => "xeat",
            FileCategory::Xtct => "xtct",
            FileCategory::Ie => "ie",
            FileCategory::Io => "io",
            FileCategory::Oe => "oe",
            FileCategory::Tc => "tc",
            FileCategory::Info => "info",
            FileCategory::Table => "table",
            FileCategory::Report => "report",
            FileCategory::ReportCsv => "report_csv",
            FileCategory::Stub => "stub",
            FileCategory::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input and output variable names in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableList {
    pub input: Vec<String>,
    pub output: Vec<String>,
}

/// A parsed artifact, dispatched on its file category.
pub enum Document {
    Testlog(TestlogDocument),
    Csv(CsvDefinition),
    Table(CaseTable),
    Ie(AnalysisTable),
    Io(IoTable),
    Oe(ExpectedTable),
    Report(ReportTable),
    Workbook(SpecWorkbook),
}

impl Document {
    pub fn path(&self) -> &Path {
        match self {
            Document::Testlog(d) => &d.path,
            Document::Csv(d) => &d.path,
            Document::Table(d) => &d.path,
            Document::Ie(d) => &d.path,
            Document::Io(d) => &d.path,
            Document::Oe(d) => &d.path,
            Document::Report(d) => &d.path,
            Document::Workbook(d) => &d.path,
        }
    }

    pub fn category(&self) -> FileCategory {
        match self {
            Document::Testlog(_) => FileCategory::Testlog,
            Document::Csv(_) => FileCategory::Csv,
            Document::Table(_) => FileCategory::Table,
            Document::Ie(_) => FileCategory::Ie,
            Document::Io(_) => FileCategory::Io,
            Document::Oe(_) => FileCategory::Oe,
            Document::Report(_) => FileCategory::Report,
            Document::Workbook(_) => FileCategory::Xlsx,
        }
    }

    /// Variable names as this document declares them, when it declares any.
    pub fn variables(&self) -> Option<VariableList> {
        match self {
            Document::Csv(d) => Some(d.variables.clone()),
            Document::Table(d) => Some(d.variables()),
            Document::Io(d) => Some(d.variable_names()),
            Document::Ie(d) => Some(VariableList {
                input: d.input_names(),
                output: Vec::new(),
            }),
            _ => None,
        }
    }

    /// Flattened grid as it is copied into the specification workbook.
    pub fn raw_grid(&self) -> Option<&[Vec<String>]> {
        match self {
            Document::Table(d) => Some(&d.raw),
            Document::Ie(d) => Some(&d.raw),
            Document::Io(d) => Some(&d.raw),
            Document::Oe(d) => Some(&d.raw),
            _ => None,
        }
    }
}
