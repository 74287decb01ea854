use crate::config::settings::{ClassCatalog, Settings};
use crate::document::table::{HtmlPage, LogicalTable};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A named coverage condition and the labels that trace it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisItem {
    pub item: String,
    /// Label tokens separated by `,` or `;`.
    pub id: String,
    pub comment: String,
    pub sub: bool,
}

impl AnalysisItem {
    pub fn labels(&self) -> Vec<String> {
        split_labels(&self.id)
    }
}

pub fn split_labels(id: &str) -> Vec<String> {
    id.replace(';', ",")
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_owned)
        .collect()
}

/// `[classification, name, type]` of one input column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputVariable {
    pub classification: String,
    pub name: String,
    pub vartype: String,
}

/// Input/analysis table (`<func>_IE.html`).
pub struct AnalysisTable {
    pub path: PathBuf,
    pub table: LogicalTable,
    pub raw: Vec<Vec<String>>,
    pub inputs: Vec<InputVariable>,
    /// Items in first-seen order; a repeated name replaces the earlier record.
    pub items: Vec<AnalysisItem>,
    /// Canonical label set closest to the labels this document uses.
    pub label_set: Vec<String>,
}

impl AnalysisTable {
    pub fn open(path: &Path, settings: &Settings) -> Result<Self, String> {
        let page = HtmlPage::open(path)?;
        Self::from_page(&page, settings)
    }

    pub fn from_page(page: &HtmlPage, settings: &Settings) -> Result<Self, String> {
        let table = page.table(0)?;
        let classes = &settings.classes;

        let mut items: Vec<AnalysisItem> = Vec::new();
        let mut pending: Option<AnalysisItem> = None;
        for row in 0..table.row_count() {
            let lead = table.class(row, 0);
            if !ClassCatalog::matches(&classes.uniqid, lead) {
                continue;
            }
            let sub = ClassCatalog::matches(&classes.uniqid_sub, lead);
            let marker = table.class(row, 1);

            if ClassCatalog::matches(&classes.analysis_id, marker) {
                pending = Some(AnalysisItem {
                    item: table.text(row, 0).trim().to_owned(),
                    id: table.text(row, 1).trim().to_owned(),
                    comment: String::new(),
                    sub,
                });
            } else if ClassCatalog::matches(&classes.analysis_comment, marker)
                && let Some(item) = pending.as_mut()
            {
                item.comment = table.text(row, 1).trim().to_owned();
                let record = item.clone();
                match items.iter_mut().find(|known| known.item == record.item) {
                    Some(known) => *known = record,
                    None => items.push(record),
                }
            }
        }

        let mut inputs = Vec::new();
        if table.row_count() > 3 {
            for col in 0..table.col_count() {
                if !table.is_origin(1, col)
                    || !ClassCatalog::matches(&classes.input_kind, table.class(1, col))
                {
                    continue;
                }
                inputs.push(InputVariable {
                    classification: table.text(1, col).trim().to_owned(),
                    name: table.text(2, col).trim().to_owned(),
                    vartype: table.text(3, col).trim().to_owned(),
                });
            }
        }

        let mut observed: Vec<String> = items.iter().flat_map(AnalysisItem::labels).collect();
        observed.sort();
        observed.dedup();
        let label_set = settings.label_set_for(observed.iter().map(String::as_str));

        let raw = table.raw_grid(&page.tag_text("h4", 0).unwrap_or_default());

        Ok(Self {
            path: page.path.clone(),
            table,
            raw,
            inputs,
            items,
            label_set,
        })
    }

    pub fn item(&self, name: &str) -> Option<&AnalysisItem> {
        self.items.iter().find(|item| item.item == name)
    }

    /// True when `name` is the parent of a `name-...` condition family.
    pub fn is_condition_family(&self, name: &str) -> bool {
        let prefix = format!("{name}-");
        self.items.iter().any(|item| item.item.starts_with(&prefix))
    }

    pub fn input_names(&self) -> Vec<String> {
        self.inputs.iter().map(|input| input.name.clone()).collect()
    }
}
