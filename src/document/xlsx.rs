use crate::config::settings::Settings;
use crate::document::testlog::canonical_percent;
use calamine::{Data, DataType, Reader, open_workbook_auto};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

type CellRef = (u32, u32);

pub type SheetGrid = Vec<Vec<Option<String>>>;

const SUMMARY_CELLS: [&str; 5] = ["F8", "F9", "F10", "F11", "F12"];

/// Sheet selector: by name, or by 1-based position.
#[derive(Debug, Clone, Copy)]
pub enum SheetRef<'a> {
    Name(&'a str),
    Index(usize),
}

/// Table 1.1 of the specification sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub result: String,
    pub c0: String,
    pub c1: String,
    pub mcdc: String,
    pub issue: String,
    pub src_rel_dir: String,
    pub src_name: String,
    pub func: String,
    pub csv: String,
}

impl TestSummary {
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "result" => &self.result,
            "c0" => &self.c0,
            "c1" => &self.c1,
            "mcdc" => &self.mcdc,
            "issue" => &self.issue,
            "src_rel_dir" => &self.src_rel_dir,
            "src_name" => &self.src_name,
            "func" => &self.func,
            "csv" => &self.csv,
            _ => return None,
        };
        Some(value)
    }

    /// Parse cells F8..F12; F12 holds `label: value` lines.
    pub fn parse(cells: &BTreeMap<String, Option<String>>, colon: &str) -> Result<Self, String> {
        let cell = |address: &str| {
            cells
                .get(address)
                .cloned()
                .flatten()
                .unwrap_or_default()
        };

        let mut block = cell("F12");
        if !colon.is_empty() {
            block = block.replace(colon, ":");
        }
        let block = block.replace("%_x000D_", "%").replace("_x000D_", "");
        let lines: Vec<&str> = block.split('\n').map(str::trim).collect();

        let mut values = Vec::with_capacity(5);
        for key in ["result", "c0", "c1", "mcdc", "issue"] {
            let line = lines
                .get(values.len())
                .ok_or_else(|| format!("summary block has no line for '{key}'"))?;
            let (_, value) = line
                .split_once(':')
                .ok_or_else(|| format!("summary line '{line}' has no ':'"))?;
            values.push(value.trim().to_owned());
        }
        let [result, c0, c1, mcdc, issue]: [String; 5] = values
            .try_into()
            .map_err(|_| "summary block is incomplete".to_owned())?;

        Ok(Self {
            result,
            c0: canonical_percent(&c0),
            c1: canonical_percent(&c1),
            mcdc: canonical_percent(&mcdc),
            issue,
            src_rel_dir: cell("F8"),
            src_name: cell("F9"),
            func: cell("F10"),
            csv: cell("F11"),
        })
    }
}

/// Test-specification workbook, opened read-only per access.
pub struct SpecWorkbook {
    pub path: PathBuf,
    pub sheets: Vec<String>,
    /// Why the workbook or its summary could not be read, if so.
    pub load_error: Option<String>,
    pub summary: Option<TestSummary>,
}

impl SpecWorkbook {
    /// Open tolerantly: an unreadable workbook yields no sheets and no summary.
    pub fn open(path: &Path, settings: &Settings) -> Self {
        let mut workbook = Self {
            path: path.to_path_buf(),
            sheets: Vec::new(),
            load_error: None,
            summary: None,
        };

        match workbook.sheet_names() {
            Ok(sheets) => workbook.sheets = sheets,
            Err(error) => {
                workbook.load_error = Some(error);
                return workbook;
            }
        }

        let spec = SheetRef::Name(&settings.sheets.spec);
        let parsed = workbook
            .read_cells(spec, &SUMMARY_CELLS)
            .and_then(|cells| TestSummary::parse(&cells, &settings.dictionary.colon));
        match parsed {
            Ok(summary) => workbook.summary = Some(summary),
            Err(error) => workbook.load_error = Some(error),
        }
        workbook
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.iter().any(|sheet| sheet == name)
    }

    /// List sheet names in workbook order.
    pub fn sheet_names(&self) -> Result<Vec<String>, String> {
        let workbook = open_workbook_auto(&self.path)
            .map_err(|error| format!("failed to open xlsx '{}': {error}", self.path.display()))?;
        Ok(workbook.sheet_names().to_vec())
    }

    /// Rows `begin..=end` (1-based) of a sheet, every row padded to the used width.
    pub fn read_sheet(
        &self,
        sheet: SheetRef<'_>,
        begin: usize,
        end: Option<usize>,
    ) -> Result<SheetGrid, String> {
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|error| format!("failed to open xlsx '{}': {error}", self.path.display()))?;
        let name = resolve_sheet(&workbook.sheet_names(), sheet)?;
        let worksheet = workbook
            .worksheet_range(&name)
            .map_err(|error| format!("failed to read sheet '{name}': {error}"))?;

        let Some((last_row, last_col)) = worksheet.end() else {
            return Ok(Vec::new());
        };

        let first = begin.max(1) - 1;
        let last = end.map_or(last_row as usize, |end| (end.max(1) - 1).min(last_row as usize));
        let mut rows = Vec::new();
        for row in first..=last {
            let cells = (0..=last_col)
                .map(|col| {
                    worksheet
                        .get_value((row as u32, col))
                        .and_then(cell_text)
                })
                .collect();
            rows.push(cells);
        }

        Ok(rows)
    }

    /// Values of individual cells addressed A1-style.
    pub fn read_cells(
        &self,
        sheet: SheetRef<'_>,
        cells: &[&str],
    ) -> Result<BTreeMap<String, Option<String>>, String> {
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|error| format!("failed to open xlsx '{}': {error}", self.path.display()))?;
        let name = resolve_sheet(&workbook.sheet_names(), sheet)?;
        let worksheet = workbook
            .worksheet_range(&name)
            .map_err(|error| format!("failed to read sheet '{name}': {error}"))?;

        let mut values = BTreeMap::new();
        for address in cells {
            let position = parse_cell_ref(address)?;
            let value = worksheet.get_value(position).and_then(cell_text);
            values.insert((*address).to_owned(), value);
        }
        Ok(values)
    }
}

fn resolve_sheet(names: &[String], sheet: SheetRef<'_>) -> Result<String, String> {
    match sheet {
        SheetRef::Name(name) => names
            .iter()
            .find(|candidate| candidate.as_str() == name)
            .cloned()
            .ok_or_else(|| format!("sheet '{name}' not found")),
        SheetRef::Index(index) => index
            .checked_sub(1)
            .and_then(|position| names.get(position))
            .cloned()
            .ok_or_else(|| format!("sheet index {index} out of range")),
    }
}

/// Render a cell as text; dates use `YYYY-MM-DD HH:MM:SS`.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(value) => Some(value.clone()),
        Data::Bool(value) => Some(if *value { "True" } else { "False" }.to_owned()),
        Data::DateTime(_) | Data::DateTimeIso(_) => Some(
            cell.as_datetime()
                .map(|value| value.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| cell.to_string()),
        ),
        other => Some(other.to_string()),
    }
}

fn parse_cell_ref(address: &str) -> Result<CellRef, String> {
    let split = address
        .find(|character: char| character.is_ascii_digit())
        .ok_or_else(|| format!("invalid cell reference '{address}'"))?;
    let (letters, digits) = address.split_at(split);
    if letters.is_empty() || !letters.chars().all(|character| character.is_ascii_alphabetic()) {
        return Err(format!("invalid cell reference '{address}'"));
    }

    let column = letters.chars().fold(0u32, |column, character| {
        column
            .saturating_mul(26)
            .saturating_add(character.to_ascii_uppercase() as u32 - 'A' as u32 + 1)
    });
    let row: u32 = digits
        .parse()
        .map_err(|error| format!("invalid row in cell reference '{address}': {error}"))?;
    if row == 0 {
        return Err(format!("row number must be >= 1 in '{address}'"));
    }

    Ok((row - 1, column - 1))
}
