use crate::config::settings::{HeaderCatalog, HeaderRole, Settings};
use crate::document::table::{HtmlPage, LogicalTable};
use std::path::{Path, PathBuf};

/// Fields of the test report's "entire information" tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    /// File name of the top-level CSV.
    pub csv: String,
    pub c0: String,
    pub c1: String,
    pub mcdc: String,
}

impl ReportSummary {
    /// `(key, label, value)` in reporting order.
    pub fn fields(&self) -> [(&'static str, &'static str, &str); 4] {
        [
            ("csv", "Top CSV Filename", &self.csv),
            ("c0", "C0", &self.c0),
            ("c1", "C1", &self.c1),
            ("mcdc", "MC/DC", &self.mcdc),
        ]
    }
}

/// Test report (`TestReport.htm`).
pub struct ReportTable {
    pub path: PathBuf,
    /// `Err` carries why the summary tables could not be read.
    pub summary: Result<ReportSummary, String>,
}

impl ReportTable {
    pub fn open(path: &Path, settings: &Settings) -> Result<Self, String> {
        let page = HtmlPage::open(path)?;
        Ok(Self::from_page(&page, settings))
    }

    pub fn from_page(page: &HtmlPage, settings: &Settings) -> Self {
        Self {
            path: page.path.clone(),
            summary: read_summary(page, &settings.headers),
        }
    }
}

/// Every table on the page that extracts cleanly.
fn page_tables(page: &HtmlPage) -> Vec<LogicalTable> {
    (0..page.table_count())
        .filter_map(|index| page.table(index).ok())
        .collect()
}

/// Value beside the first row label matching `role`.
fn labelled_value(
    tables: &[LogicalTable],
    headers: &HeaderCatalog,
    role: HeaderRole,
) -> Option<String> {
    tables.iter().find_map(|table| {
        (0..table.row_count()).find_map(|row| {
            let col = headers.locate(role, &table.row_texts(row))?;
            (col + 1 < table.col_count()).then(|| table.text(row, col + 1).trim().to_owned())
        })
    })
}

/// Coverage values from the row below the first header row naming all three metrics.
fn coverage_values(tables: &[LogicalTable], headers: &HeaderCatalog) -> Option<[String; 3]> {
    tables.iter().find_map(|table| {
        (0..table.row_count().saturating_sub(1)).find_map(|row| {
            let header = table.row_texts(row);
            let columns = [HeaderRole::C0, HeaderRole::C1, HeaderRole::Mcdc]
                .map(|role| headers.locate(role, &header));
            let [Some(c0), Some(c1), Some(mcdc)] = columns else {
                return None;
            };
            Some([c0, c1, mcdc].map(|col| table.text(row + 1, col).trim().to_owned()))
        })
    })
}

fn read_summary(page: &HtmlPage, headers: &HeaderCatalog) -> Result<ReportSummary, String> {
    let tables = page_tables(page);
    let csv_path = labelled_value(&tables, headers, HeaderRole::TopCsv).ok_or_else(|| {
        format!("report '{}' has no top CSV row", page.path.display())
    })?;
    let [c0, c1, mcdc] = coverage_values(&tables, headers).ok_or_else(|| {
        format!("report '{}' has no coverage header row", page.path.display())
    })?;

    let csv_path = csv_path.replace('\\', "/");
    let csv = csv_path.rsplit('/').next().unwrap_or_default().to_owned();

    Ok(ReportSummary { csv, c0, c1, mcdc })
}
