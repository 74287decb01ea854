use crate::document::text::{read_text, split_lines};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Number of `label: value` header lines at the top of a testlog.
pub const HEADER_LINES: usize = 6;

const TIME_FORMATS: [&str; 3] = ["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M"];

/// Facts about the function under test, as reported by its testlog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionInfo {
    pub func_full: String,
    pub src_full: String,
    pub c0: String,
    pub c1: String,
    pub mcdc: String,
    pub test_time: String,
    /// Source path segments joined with `/`.
    pub src_rel: String,
    pub src_name: String,
    pub func: String,
    /// Last three source path segments.
    pub src_short: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
}

impl FunctionInfo {
    /// Parse the fixed header: function, source, C0, C1, MC/DC, test time.
    pub fn parse(lines: &[String]) -> Result<Self, String> {
        if lines.len() < HEADER_LINES {
            return Err(format!(
                "testlog header needs {HEADER_LINES} lines, found {}",
                lines.len()
            ));
        }

        let mut values = Vec::with_capacity(HEADER_LINES);
        for (index, line) in lines.iter().take(HEADER_LINES).enumerate() {
            let line = line.trim();
            let Some((_, value)) = line.split_once(':') else {
                return Err(format!(
                    "testlog line {} has no ':' separator: '{line}'",
                    index + 1
                ));
            };
            values.push(value.trim().to_owned());
        }

        let [func_full, src_full, c0, c1, mcdc, test_time]: [String; HEADER_LINES] = values
            .try_into()
            .map_err(|_| "testlog header is incomplete".to_owned())?;

        let parts = path_segments(&src_full);
        let src_name = parts.last().cloned().unwrap_or_default();
        let src_short = parts[parts.len().saturating_sub(3)..].join("/");
        let func = path_segments(&func_full).last().cloned().unwrap_or_default();

        Ok(Self {
            src_rel: parts.join("/"),
            src_name,
            func,
            src_short,
            func_full,
            src_full,
            c0,
            c1,
            mcdc,
            test_time,
            issue_count: None,
            ticket: None,
        })
    }

    /// `<func>.csv`, the name every artifact uses for the test definition.
    pub fn csv_name(&self) -> String {
        format!("{}.csv", self.func)
    }

    pub fn coverages(&self) -> [(&'static str, &str); 3] {
        [("c0", &self.c0), ("c1", &self.c1), ("mcdc", &self.mcdc)]
    }

    pub fn fully_covered(&self) -> bool {
        self.coverages()
            .iter()
            .all(|(_, value)| canonical_percent(value) == "100%")
    }

    /// The test time as a timestamp, if it uses one of the tool's layouts.
    pub fn tested_at(&self) -> Option<NaiveDateTime> {
        let text = self.test_time.trim();
        TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    }
}

/// Split a path written on either a POSIX or a Windows host.
pub fn path_segments(path: &str) -> Vec<String> {
    path.split(['/', '\\'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Coverage text such as `"87%"` as an integer percentage.
pub fn parse_percent(value: &str) -> Result<u32, String> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_suffix('%')
        .ok_or_else(|| format!("coverage '{trimmed}' does not end with '%'"))?;
    digits
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("coverage '{trimmed}' is not an integer percentage: {error}"))
}

/// Coverage text in the canonical `"NN%"` form; unparsable text is only trimmed.
pub fn canonical_percent(value: &str) -> String {
    match parse_percent(value) {
        Ok(percent) => format!("{percent}%"),
        Err(_) => value.trim().to_owned(),
    }
}

/// A coverage testlog: header facts plus the full line listing.
pub struct TestlogDocument {
    pub path: PathBuf,
    pub lines: Vec<String>,
    pub info: Result<FunctionInfo, String>,
}

impl TestlogDocument {
    pub fn open(path: &Path) -> Result<Self, String> {
        let text = read_text(path)?;
        Ok(Self::parse(path, &text))
    }

    pub fn parse(path: &Path, text: &str) -> Self {
        let lines = split_lines(text);
        let info = FunctionInfo::parse(&lines);
        Self {
            path: path.to_path_buf(),
            lines,
            info,
        }
    }

    pub fn info(&self) -> Option<&FunctionInfo> {
        self.info.as_ref().ok()
    }
}
