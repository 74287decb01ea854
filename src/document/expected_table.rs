use crate::document::table::{HtmlPage, LogicalTable};
use std::path::{Path, PathBuf};

/// Output/expected-value table (`<func>_OE.html`).
///
/// Only compared wholesale against its workbook sheet.
pub struct ExpectedTable {
    pub path: PathBuf,
    pub table: LogicalTable,
    pub raw: Vec<Vec<String>>,
}

impl ExpectedTable {
    pub fn open(path: &Path) -> Result<Self, String> {
        let page = HtmlPage::open(path)?;
        Self::from_page(&page)
    }

    pub fn from_page(page: &HtmlPage) -> Result<Self, String> {
        let table = page.table(0)?;
        let raw = table.raw_grid(&page.tag_text("h4", 0).unwrap_or_default());
        Ok(Self {
            path: page.path.clone(),
            table,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ExpectedTable;
    use crate::document::table::HtmlPage;
    use std::path::Path;

    #[test]
    fn keeps_flattened_grid_with_title() {
        let page = HtmlPage::parse(
            Path::new("f_OE.html"),
            "<html><body><h4>OE</h4><table><tr><td>1</td><td>2</td></tr></table></body></html>",
        );
        let table = ExpectedTable::from_page(&page).expect("oe table");
        assert_eq!(table.raw[0], vec!["OE", ""]);
        assert_eq!(table.raw[2], vec!["1", "2"]);
        assert_eq!(table.table.row_count(), 1);
    }
}
