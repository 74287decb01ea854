use crate::config::settings::Settings;
use crate::document::{
    AnalysisTable, CaseTable, CsvDefinition, Document, ExpectedTable, FileCategory, IoTable,
    ReportTable, SpecWorkbook, TestlogDocument,
};
use std::path::Path;

/// Open the document behind `path` with the parser for its category.
///
/// Categories that are only checked for existence have no parser.
pub fn open_document(
    category: FileCategory,
    path: &Path,
    settings: &Settings,
) -> Result<Option<Document>, String> {
    let document = match category {
        FileCategory::Testlog => Document::Testlog(TestlogDocument::open(path)?),
        FileCategory::Csv => Document::Csv(CsvDefinition::open(path)?),
        FileCategory::Table => Document::Table(CaseTable::open(path, settings)?),
        FileCategory::Ie => Document::Ie(AnalysisTable::open(path, settings)?),
        FileCategory::Io => Document::Io(IoTable::open(path, settings)?),
        FileCategory::Oe => Document::Oe(ExpectedTable::open(path)?),
        FileCategory::Report => Document::Report(ReportTable::open(path, settings)?),
        FileCategory::Xlsx => Document::Workbook(SpecWorkbook::open(path, settings)),
        FileCategory::Ini
        | FileCategory::Xeat
        | FileCategory::Xtct
        | FileCategory::Tc
        | FileCategory::Info
        | FileCategory::ReportCsv
        | FileCategory::Stub => return Ok(None),
    };
    Ok(Some(document))
}
