//! Merged-cell HTML table extraction.
//!
//! Source cells are stamped into every `(row, col)` position their
//! `rowspan`/`colspan` covers. Each stamped cell remembers its origin
//! (top-left) so callers can tell authoritative positions from copies.

use crate::document::text::read_text;
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// One `<td>`/`<th>` element as it appears in the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCell {
    /// NFKD-normalized flattened text content.
    pub text: String,
    /// Content split on `<br>`, present only when the cell contains one.
    pub lines: Option<Vec<String>>,
    pub class: Option<String>,
    pub rowspan: usize,
    pub colspan: usize,
    pub origin: (usize, usize),
}

impl SourceCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lines: None,
            class: None,
            rowspan: 1,
            colspan: 1,
            origin: (0, 0),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_owned());
        self
    }

    pub fn with_span(mut self, rowspan: usize, colspan: usize) -> Self {
        self.rowspan = rowspan.max(1);
        self.colspan = colspan.max(1);
        self
    }

    pub fn with_lines(mut self, lines: &[&str]) -> Self {
        self.lines = Some(lines.iter().map(|line| (*line).to_owned()).collect());
        self
    }
}

/// Rectangular view over a table whose positions point back at source cells.
#[derive(Debug, Clone)]
pub struct LogicalTable {
    cells: Vec<SourceCell>,
    grid: Vec<Vec<usize>>,
}

impl LogicalTable {
    /// Resolve cell ownership for rows of source cells.
    ///
    /// Width is the sum of the first row's colspans and height is the number
    /// of source rows. A cell spilling outside that rectangle, or a position
    /// left unclaimed, makes the table unreadable.
    pub fn from_rows(rows: Vec<Vec<SourceCell>>) -> Result<Self, String> {
        let height = rows.len();
        let width: usize = rows
            .first()
            .map(|row| row.iter().map(|cell| cell.colspan).sum())
            .unwrap_or(0);
        if height == 0 || width == 0 {
            return Err("table has no cells".to_owned());
        }

        let mut claimed: Vec<Vec<Option<usize>>> = vec![vec![None; width]; height];
        let mut cells = Vec::new();

        for (row, source_row) in rows.into_iter().enumerate() {
            let mut col = 0;
            for mut cell in source_row {
                while col < width && claimed[row][col].is_some() {
                    col += 1;
                }
                if col + cell.colspan > width || row + cell.rowspan > height {
                    return Err(format!(
                        "cell at row {row} col {col} spans {}x{} outside the {height}x{width} table",
                        cell.rowspan, cell.colspan
                    ));
                }

                let index = cells.len();
                cell.origin = (row, col);
                for slot_row in claimed.iter_mut().skip(row).take(cell.rowspan) {
                    for slot in slot_row.iter_mut().skip(col).take(cell.colspan) {
                        if slot.is_some() {
                            return Err(format!(
                                "cell at row {row} col {col} overlaps a spanning cell"
                            ));
                        }
                        *slot = Some(index);
                    }
                }
                col += cell.colspan;
                cells.push(cell);
            }
        }

        let mut grid = Vec::with_capacity(height);
        for (row, slots) in claimed.into_iter().enumerate() {
            let resolved: Option<Vec<usize>> = slots.into_iter().collect();
            let Some(resolved) = resolved else {
                return Err(format!("row {row} leaves positions unclaimed"));
            };
            grid.push(resolved);
        }

        Ok(Self { cells, grid })
    }

    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    pub fn col_count(&self) -> usize {
        self.grid.first().map(Vec::len).unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&SourceCell> {
        let index = *self.grid.get(row)?.get(col)?;
        self.cells.get(index)
    }

    /// Text at a position; empty when out of bounds.
    pub fn text(&self, row: usize, col: usize) -> &str {
        self.cell(row, col)
            .map(|cell| cell.text.as_str())
            .unwrap_or("")
    }

    pub fn class(&self, row: usize, col: usize) -> Option<&str> {
        self.cell(row, col).and_then(|cell| cell.class.as_deref())
    }

    pub fn is_origin(&self, row: usize, col: usize) -> bool {
        self.cell(row, col)
            .is_some_and(|cell| cell.origin == (row, col))
    }

    /// True when the cell covering `(row, col)` starts on `row`.
    pub fn is_origin_row(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_some_and(|cell| cell.origin.0 == row)
    }

    /// Trimmed text of every position in a row.
    pub fn row_texts(&self, row: usize) -> Vec<String> {
        (0..self.col_count())
            .map(|col| self.text(row, col).trim().to_owned())
            .collect()
    }

    /// Number of distinct source cells.
    pub fn source_cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Flatten to a plain grid the way the spreadsheet copy lays it out.
    ///
    /// Only origin positions carry text. A cell containing `<br>` is written
    /// one line per row, and rows are appended at the bottom so later rows
    /// shift down by the extra lines. Two leading rows hold the page title
    /// and a blank separator.
    pub fn raw_grid(&self, title: &str) -> Vec<Vec<String>> {
        let width = self.col_count();
        let blank = vec![String::new(); width];
        let mut data = vec![blank.clone(); self.row_count()];
        let mut shift = 0;

        for row in 0..self.row_count() {
            let mut span = 1;
            for col in 0..width {
                if !self.is_origin(row, col) {
                    continue;
                }
                let Some(cell) = self.cell(row, col) else {
                    continue;
                };
                match &cell.lines {
                    Some(lines) => {
                        if lines.len() > span {
                            data.extend((span..lines.len()).map(|_| blank.clone()));
                            span = lines.len();
                        }
                        for (offset, line) in lines.iter().enumerate() {
                            if let Some(slot) = data
                                .get_mut(row + shift + offset)
                                .and_then(|target| target.get_mut(col))
                            {
                                *slot = line.clone();
                            }
                        }
                    }
                    None => {
                        if let Some(slot) = data
                            .get_mut(row + shift)
                            .and_then(|target| target.get_mut(col))
                        {
                            *slot = cell.text.clone();
                        }
                    }
                }
            }
            shift += span - 1;
        }

        let mut heading = blank.clone();
        if let Some(first) = heading.first_mut() {
            *first = title.to_owned();
        }
        let mut grid = Vec::with_capacity(data.len() + 2);
        grid.push(heading);
        grid.push(blank);
        grid.extend(data);
        grid
    }
}

/// A parsed HTML document that hosts one or more tables.
pub struct HtmlPage {
    pub path: PathBuf,
    html: Html,
}

impl HtmlPage {
    pub fn open(path: &Path) -> Result<Self, String> {
        let content = read_text(path)?;
        Ok(Self::parse(path, &content))
    }

    pub fn parse(path: &Path, content: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            html: Html::parse_document(content),
        }
    }

    /// Normalized text of the `index`-th element named `tag`.
    pub fn tag_text(&self, tag: &str, index: usize) -> Option<String> {
        let selector = Selector::parse(tag).ok()?;
        self.html
            .select(&selector)
            .nth(index)
            .map(|element| normalize(&element.text().collect::<String>()))
    }

    /// Number of `<table>` elements in the document, nested ones included.
    pub fn table_count(&self) -> usize {
        Selector::parse("table")
            .map(|selector| self.html.select(&selector).count())
            .unwrap_or_default()
    }

    /// Logical table for the `index`-th `<table>` in document order.
    pub fn table(&self, index: usize) -> Result<LogicalTable, String> {
        let selector = Selector::parse("table")
            .map_err(|error| format!("invalid table selector: {error:?}"))?;
        let table = self.html.select(&selector).nth(index).ok_or_else(|| {
            format!(
                "failed to find table {index} in '{}'",
                self.path.display()
            )
        })?;

        let rows: Vec<Vec<SourceCell>> = table_rows(table)
            .into_iter()
            .map(|row| child_elements(row, &["td", "th"]).into_iter().map(source_cell).collect())
            .collect();

        LogicalTable::from_rows(rows).map_err(|error| {
            format!(
                "failed to extract table {index} from '{}': {error}",
                self.path.display()
            )
        })
    }

    /// Page title followed by the flattened first table.
    pub fn raw_grid(&self) -> Result<Vec<Vec<String>>, String> {
        let table = self.table(0)?;
        let title = self.tag_text("h4", 0).unwrap_or_default();
        Ok(table.raw_grid(&title))
    }
}

pub fn normalize(text: &str) -> String {
    text.nfkd().collect()
}

/// `<tr>` rows owned by this table, ignoring rows of nested tables.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in child_elements(table, &["tr", "thead", "tbody", "tfoot"]) {
        if child.value().name() == "tr" {
            rows.push(child);
        } else {
            rows.extend(child_elements(child, &["tr"]));
        }
    }
    rows
}

fn child_elements<'a>(parent: ElementRef<'a>, names: &[&str]) -> Vec<ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|element| names.contains(&element.value().name()))
        .collect()
}

fn source_cell(element: ElementRef<'_>) -> SourceCell {
    let span = |name: &str| {
        element
            .value()
            .attr(name)
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1)
    };

    let has_break = element
        .descendants()
        .any(|node| matches!(node.value(), Node::Element(inner) if inner.name() == "br"));
    let lines = has_break.then(|| {
        let mut flattened = String::new();
        collect_with_breaks(*element, &mut flattened);
        flattened.lines().map(str::to_owned).collect()
    });

    SourceCell {
        text: normalize(&element.text().collect::<String>()),
        lines,
        class: element.value().attr("class").map(str::to_owned),
        rowspan: span("rowspan"),
        colspan: span("colspan"),
        origin: (0, 0),
    }
}

fn collect_with_breaks(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) if element.name() == "br" => out.push('\n'),
            _ => collect_with_breaks(child, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HtmlPage, LogicalTable, SourceCell};
    use std::path::Path;

    fn page(body: &str) -> HtmlPage {
        HtmlPage::parse(
            Path::new("fixture.html"),
            &format!("<html><body>{body}</body></html>"),
        )
    }

    fn assert_every_position_claimed_once(table: &LogicalTable) {
        let mut owners = std::collections::BTreeMap::new();
        for row in 0..table.row_count() {
            for col in 0..table.col_count() {
                let cell = table.cell(row, col).expect("position claimed");
                let (origin_row, origin_col) = cell.origin;
                assert!(origin_row <= row && origin_col <= col);
                assert!(row < origin_row + cell.rowspan && col < origin_col + cell.colspan);
                *owners.entry(cell.origin).or_insert(0usize) += 1;
            }
        }
        assert_eq!(owners.len(), table.source_cell_count());
    }

    #[test]
    fn stamps_row_and_col_spans() {
        let page = page(
            "<table>\
             <tr><td rowspan=\"2\">A</td><td colspan=\"2\">B</td></tr>\
             <tr><td>C</td><td>D</td></tr>\
             <tr><td>E</td><td colspan=\"2\" rowspan=\"1\">F</td></tr>\
             </table>",
        );
        let table = page.table(0).expect("table");

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.col_count(), 3);
        assert_eq!(table.text(1, 0), "A");
        assert_eq!(table.text(0, 2), "B");
        assert_eq!(table.text(1, 1), "C");
        assert_eq!(table.text(2, 2), "F");
        assert!(table.is_origin(0, 0));
        assert!(!table.is_origin(1, 0));
        assert!(!table.is_origin(0, 2));
        assert_every_position_claimed_once(&table);
    }

    #[test]
    fn width_follows_first_row_colspans() {
        let rows = vec![
            vec![SourceCell::new("a").with_span(1, 3), SourceCell::new("b")],
            vec![
                SourceCell::new("c").with_span(1, 2),
                SourceCell::new("d").with_span(1, 2),
            ],
        ];
        let table = LogicalTable::from_rows(rows).expect("table");
        assert_eq!(table.col_count(), 4);
        assert_eq!(table.row_count(), 2);
        assert_every_position_claimed_once(&table);
    }

    #[test]
    fn rejects_cells_spilling_past_the_rectangle() {
        let rows = vec![
            vec![SourceCell::new("a"), SourceCell::new("b")],
            vec![SourceCell::new("c").with_span(2, 1), SourceCell::new("d")],
        ];
        let error = LogicalTable::from_rows(rows).expect_err("rowspan overflow");
        assert!(error.contains("outside"));
    }

    #[test]
    fn rejects_unclaimed_positions() {
        let rows = vec![
            vec![SourceCell::new("a"), SourceCell::new("b")],
            vec![SourceCell::new("c")],
        ];
        let error = LogicalTable::from_rows(rows).expect_err("short row");
        assert!(error.contains("unclaimed"));
    }

    #[test]
    fn missing_table_is_an_error() {
        let page = page("<p>no tables here</p>");
        assert!(page.table(0).is_err());
    }

    #[test]
    fn cell_text_is_nfkd_normalized() {
        let page = page("<table><tr><td>ＡＢＣ１</td><td class=\"data-no\">１２</td></tr></table>");
        let table = page.table(0).expect("table");
        assert_eq!(table.text(0, 0), "ABC1");
        assert_eq!(table.text(0, 1), "12");
        assert_eq!(table.class(0, 1), Some("data-no"));
    }

    #[test]
    fn header_rows_inside_thead_are_kept() {
        let page = page(
            "<table><thead><tr><th>No.</th><th>Item</th></tr></thead>\
             <tbody><tr><td>1</td><td>x</td></tr></tbody></table>",
        );
        let table = page.table(0).expect("table");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row_texts(0), vec!["No.", "Item"]);
    }

    #[test]
    fn raw_grid_expands_line_breaks_into_appended_rows() {
        let page = page(
            "<h4>Title</h4><table>\
             <tr><td>a</td><td>x<br>y<br>z</td></tr>\
             <tr><td colspan=\"2\">b</td></tr>\
             </table>",
        );
        let grid = page.raw_grid().expect("raw grid");

        assert_eq!(grid[0], vec!["Title", ""]);
        assert_eq!(grid[1], vec!["", ""]);
        assert_eq!(grid[2], vec!["a", "x"]);
        assert_eq!(grid[3], vec!["", "y"]);
        assert_eq!(grid[4], vec!["", "z"]);
        assert_eq!(grid[5], vec!["b", ""]);
        assert_eq!(grid.len(), 6);
    }

    #[test]
    fn raw_grid_writes_merged_cells_once() {
        let rows = vec![
            vec![SourceCell::new("m").with_span(2, 1), SourceCell::new("p")],
            vec![SourceCell::new("q")],
        ];
        let table = LogicalTable::from_rows(rows).expect("table");
        let grid = table.raw_grid("");
        assert_eq!(grid[2], vec!["m", "p"]);
        assert_eq!(grid[3], vec!["", "q"]);
    }
}
