use crate::config::settings::{ClassCatalog, Settings};
use crate::document::VariableList;
use crate::document::table::{HtmlPage, LogicalTable};
use std::path::{Path, PathBuf};

/// One variable column of the input/output table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoColumn {
    pub kind: String,
    pub name: String,
    pub vartype: String,
    pub column: usize,
}

/// Input/output table (`<func>_IO.html`).
pub struct IoTable {
    pub path: PathBuf,
    pub table: LogicalTable,
    pub raw: Vec<Vec<String>>,
    pub inputs: Vec<IoColumn>,
    pub outputs: Vec<IoColumn>,
}

impl IoTable {
    pub fn open(path: &Path, settings: &Settings) -> Result<Self, String> {
        let page = HtmlPage::open(path)?;
        Self::from_page(&page, settings)
    }

    pub fn from_page(page: &HtmlPage, settings: &Settings) -> Result<Self, String> {
        let table = page.table(0)?;
        let classes = &settings.classes;

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        if table.row_count() > 4 {
            for col in 0..table.col_count() {
                if !table.is_origin(2, col) {
                    continue;
                }
                let class = table.class(2, col);
                let target = if ClassCatalog::matches(&classes.input_kind, class) {
                    &mut inputs
                } else if ClassCatalog::matches(&classes.output_kind, class) {
                    &mut outputs
                } else {
                    continue;
                };
                target.push(IoColumn {
                    kind: table.text(2, col).trim().to_owned(),
                    name: table.text(3, col).trim().to_owned(),
                    vartype: table.text(4, col).trim().to_owned(),
                    column: col,
                });
            }
        }

        let raw = table.raw_grid(&page.tag_text("h4", 0).unwrap_or_default());

        Ok(Self {
            path: page.path.clone(),
            table,
            raw,
            inputs,
            outputs,
        })
    }

    pub fn variable_names(&self) -> VariableList {
        VariableList {
            input: self.inputs.iter().map(|column| column.name.clone()).collect(),
            output: self.outputs.iter().map(|column| column.name.clone()).collect(),
        }
    }
}
