use crate::check::{CheckError, CheckResult, Explanation, code, unreadable};
use crate::document::table::normalize;
use crate::document::xlsx::{SheetRef, SpecWorkbook};

/// Differences collected before a sheet comparison stops.
const MAX_DIFFS: usize = 5;

/// Number of blank lines between the intro line and the testlog in the sheet.
const INTRO_PADDING: usize = 3;

/// Cell value as compared between HTML and workbook.
///
/// Numeric text goes through a float so `1`, `1.0` and `01` agree; negative
/// zero is zero, whitespace-only text is empty, and the result is NFKD.
pub fn normalize_cell(value: Option<&str>) -> String {
    let text = value.unwrap_or_default();
    let text = match text.trim().parse::<f64>() {
        Ok(number) => float_text(number),
        Err(_) => text.to_owned(),
    };
    if text.trim().is_empty() {
        return String::new();
    }
    normalize(&text)
}

/// Float rendering with a trailing `.0` on integral values.
pub(crate) fn float_text(number: f64) -> String {
    if number == 0.0 {
        "0".to_owned()
    } else if number.is_nan() {
        "nan".to_owned()
    } else if number.is_infinite() {
        if number > 0.0 { "inf" } else { "-inf" }.to_owned()
    } else if number.fract() == 0.0 && number.abs() < 1e16 {
        format!("{number:.1}")
    } else {
        format!("{number}")
    }
}

fn require_sheet(workbook: &SpecWorkbook, sheet: &str) -> Result<(), CheckError> {
    if workbook.sheets.is_empty()
        && let Some(error) = &workbook.load_error
    {
        return Err(CheckError::DocumentUnreadable(error.clone()));
    }
    if !workbook.has_sheet(sheet) {
        return Err(CheckError::FieldMissing(format!(
            "Not found sheet {}",
            code(sheet)
        )));
    }
    Ok(())
}

/// 17..20_sheet_*: a flattened HTML table is copied verbatim into `sheet`.
pub fn check_sheet_html(workbook: &SpecWorkbook, sheet: &str, grid: &[Vec<String>]) -> CheckResult {
    require_sheet(workbook, sheet)?;
    let cells = workbook
        .read_sheet(SheetRef::Name(sheet), 1, None)
        .map_err(unreadable)?;

    let html_size = (grid.len(), grid.first().map_or(0, Vec::len));
    let xlsx_size = (cells.len(), cells.first().map_or(0, Vec::len));
    let mut explanation = Explanation::new();
    if xlsx_size.0 < html_size.0 || xlsx_size.1 < html_size.1 {
        explanation.fail(format!(
            "Size: {}",
            code(format!(
                "[{}x{}] != [{}x{}]",
                html_size.0, html_size.1, xlsx_size.0, xlsx_size.1
            ))
        ));
    }

    'rows: for (row, (html_row, xlsx_row)) in grid.iter().zip(&cells).enumerate() {
        for (col, (html, xlsx)) in html_row.iter().zip(xlsx_row).enumerate() {
            let xlsx = xlsx.as_deref();
            if normalize_cell(Some(html)) == normalize_cell(xlsx) {
                continue;
            }
            explanation.fail(format!(
                "Cell [{}x{}] {}",
                row + 1,
                col + 1,
                code(format!("{html} != {}", xlsx.unwrap_or_default()))
            ));
            if explanation.len() > MAX_DIFFS {
                break 'rows;
            }
        }
    }

    Ok(explanation.finish(Some("HTML vs XLSX")))
}

/// 21_sheet_testlog: column A of `sheet` reproduces the testlog after an
/// intro line and three blank lines.
pub fn check_21_sheet_testlog(
    workbook: &SpecWorkbook,
    sheet: &str,
    testlog: &[String],
    intro: &str,
) -> CheckResult {
    require_sheet(workbook, sheet)?;
    let cells = workbook
        .read_sheet(SheetRef::Name(sheet), 1, None)
        .map_err(unreadable)?;

    let mut xlsx: Vec<String> = cells
        .into_iter()
        .map(|row| row.into_iter().next().flatten().unwrap_or_default())
        .collect();
    trim_blank_tail(&mut xlsx);

    let mut data = vec![intro.to_owned()];
    data.extend(std::iter::repeat_n(String::new(), INTRO_PADDING));
    data.extend(testlog.iter().map(|line| line.replace('\n', "")));
    trim_blank_tail(&mut data);

    let mut explanation = Explanation::new();
    if xlsx.len() < data.len() {
        explanation.fail(format!(
            "Number of lines {}",
            code(format!("{} != {}", data.len(), xlsx.len()))
        ));
    }
    if let Some(index) = (0..xlsx.len().min(data.len()))
        .find(|&index| normalize_line(&xlsx[index]) != normalize_line(&data[index]))
    {
        explanation.fail(format!(
            "Row.{}<br>{}",
            index + 1,
            code(format!("{}<br>{}", data[index].trim_end(), xlsx[index]))
        ));
    }

    Ok(explanation.finish(Some("TXT vs XLSX")))
}

fn trim_blank_tail(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
}

fn normalize_line(line: &str) -> String {
    let line = line.replace('\n', "N");
    let line = line.trim_end();
    let trimmed = line.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return trimmed.to_owned();
    }
    line.to_owned()
}
