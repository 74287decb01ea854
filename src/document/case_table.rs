use crate::config::settings::{ClassCatalog, HeaderRole, Settings};
use crate::document::VariableList;
use crate::document::table::{HtmlPage, LogicalTable};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Test-case table (`<func>_Table.html`).
pub struct CaseTable {
    pub path: PathBuf,
    /// Text of the first link, which names the CSV the table was built from.
    pub title: Option<String>,
    pub header: Vec<String>,
    pub table: LogicalTable,
    pub raw: Vec<Vec<String>>,
    columns: BTreeMap<HeaderRole, usize>,
    number_classes: Vec<String>,
    comment_classes: Vec<String>,
    io: VariableList,
}

/// One numbered row of the test-case table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRow {
    pub row: usize,
    pub number: u64,
    /// The number cell is styled as commented out.
    pub commented: bool,
}

impl CaseTable {
    pub fn open(path: &Path, settings: &Settings) -> Result<Self, String> {
        let page = HtmlPage::open(path)?;
        Self::from_page(&page, settings)
    }

    pub fn from_page(page: &HtmlPage, settings: &Settings) -> Result<Self, String> {
        let table = page.table(0)?;
        let header = table.row_texts(0);
        let columns = [
            HeaderRole::No,
            HeaderRole::Confirmation,
            HeaderRole::Id,
            HeaderRole::Item,
            HeaderRole::Comment,
        ]
        .into_iter()
        .filter_map(|role| settings.headers.locate(role, &header).map(|index| (role, index)))
        .collect();

        let classes = &settings.classes;
        let mut io = VariableList::default();
        for col in 0..table.col_count() {
            if table.row_count() < 2 || !table.is_origin(1, col) {
                continue;
            }
            let class = table.class(1, col);
            let name = table.text(1, col).trim().to_owned();
            if ClassCatalog::matches(&classes.head_input, class) {
                io.input.push(name);
            } else if ClassCatalog::matches(&classes.head_output, class) {
                io.output.push(name);
            }
        }

        let title = page.tag_text("a", 0).map(|text| text.trim().to_owned());
        let raw = table.raw_grid(&page.tag_text("h4", 0).unwrap_or_default());

        Ok(Self {
            path: page.path.clone(),
            title,
            header,
            table,
            raw,
            columns,
            number_classes: classes.number.clone(),
            comment_classes: classes.comment_out.clone(),
            io,
        })
    }

    pub fn column(&self, role: HeaderRole) -> Result<usize, String> {
        self.columns.get(&role).copied().ok_or_else(|| {
            format!(
                "column '{}' not found in '{}'",
                role.as_str(),
                self.path.display()
            )
        })
    }

    /// Trimmed text of a row under the column holding `role`.
    pub fn text(&self, row: usize, role: HeaderRole) -> Result<&str, String> {
        let col = self.column(role)?;
        Ok(self.table.text(row, col).trim())
    }

    pub fn is_commented(&self, row: usize, role: HeaderRole) -> Result<bool, String> {
        let col = self.column(role)?;
        Ok(ClassCatalog::matches(
            &self.comment_classes,
            self.table.class(row, col),
        ))
    }

    /// Rows whose number cell carries a test-case number, commented ones included.
    pub fn numbered_rows(&self) -> Result<Vec<CaseRow>, String> {
        let col = self.column(HeaderRole::No)?;
        let mut rows = Vec::new();
        for row in 0..self.table.row_count() {
            let class = self.table.class(row, col);
            if !ClassCatalog::matches(&self.number_classes, class) {
                continue;
            }
            let Ok(number) = self.table.text(row, col).trim().parse::<i64>() else {
                continue;
            };
            rows.push(CaseRow {
                row,
                number: number.unsigned_abs(),
                commented: ClassCatalog::matches(&self.comment_classes, class),
            });
        }
        Ok(rows)
    }

    /// Analysis item → sorted test-case numbers, skipping commented rows.
    pub fn testcase_index(&self) -> Result<BTreeMap<String, Vec<u64>>, String> {
        let mut index: BTreeMap<String, Vec<u64>> = BTreeMap::new();
        for case in self.numbered_rows()? {
            if case.commented {
                continue;
            }
            let item = self.text(case.row, HeaderRole::Item)?.to_owned();
            index.entry(item).or_default().push(case.number);
        }
        for numbers in index.values_mut() {
            numbers.sort_unstable();
        }
        Ok(index)
    }

    /// `(number, confirmation)` for rows whose confirmation cell is live.
    pub fn confirmations(&self) -> Result<Vec<(u64, String)>, String> {
        let mut confirmations = Vec::new();
        for case in self.numbered_rows()? {
            if self.is_commented(case.row, HeaderRole::Confirmation)? {
                continue;
            }
            let value = self.text(case.row, HeaderRole::Confirmation)?;
            confirmations.push((case.number, value.to_owned()));
        }
        Ok(confirmations)
    }

    /// True when any live row is confirmed as `Fault`.
    pub fn has_fault(&self) -> bool {
        self.confirmations()
            .map(|rows| rows.iter().any(|(_, value)| value == "Fault"))
            .unwrap_or(false)
    }

    pub fn variables(&self) -> VariableList {
        self.io.clone()
    }
}
