use crate::config::catalog::ChecklistCatalog;
use crate::document::FileCategory;
use crate::document::table::normalize;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Logical columns of the HTML tables, located by header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderRole {
    No,
    Confirmation,
    Id,
    Item,
    Comment,
    /// Report row label whose neighbour holds the top CSV path.
    TopCsv,
    C0,
    C1,
    Mcdc,
}

impl HeaderRole {
    pub fn as_str(self) -> &'static str {
        match self {
            HeaderRole::No => "no",
            HeaderRole::Confirmation => "confirmation",
            HeaderRole::Id => "id",
            HeaderRole::Item => "item",
            HeaderRole::Comment => "comment",
            HeaderRole::TopCsv => "top_csv",
            HeaderRole::C0 => "c0",
            HeaderRole::C1 => "c1",
            HeaderRole::Mcdc => "mcdc",
        }
    }
}

/// Column role → accepted literal header strings, across UI languages.
///
/// Roles missing from a settings file keep their built-in candidates.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct HeaderCatalog(BTreeMap<HeaderRole, Vec<String>>);

impl Default for HeaderCatalog {
    fn default() -> Self {
        Self(BTreeMap::from([
            (HeaderRole::No, strings(&["No.", "No"])),
            (HeaderRole::Confirmation, strings(&["Confirmation", "確認"])),
            (HeaderRole::Id, strings(&["ID"])),
            (
                HeaderRole::Item,
                strings(&["Test Analysis Item", "テスト解析項目"]),
            ),
            (HeaderRole::Comment, strings(&["Comment", "コメント"])),
            (
                HeaderRole::TopCsv,
                strings(&["Top CSV", "Top CSV Filename", "トップCSV", "トップCSVファイル名"]),
            ),
            (HeaderRole::C0, strings(&["C0"])),
            (HeaderRole::C1, strings(&["C1"])),
            (HeaderRole::Mcdc, strings(&["MC/DC", "MCDC"])),
        ]))
    }
}

impl<'de> Deserialize<'de> for HeaderCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let overrides = BTreeMap::<HeaderRole, Vec<String>>::deserialize(deserializer)?;
        let mut catalog = Self::default();
        catalog.0.extend(overrides);
        Ok(catalog)
    }
}

impl HeaderCatalog {
    pub fn new(entries: BTreeMap<HeaderRole, Vec<String>>) -> Self {
        Self(entries)
    }

    pub fn candidates(&self, role: HeaderRole) -> &[String] {
        self.0.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Position of the first candidate (in catalog order) present in `header_row`.
    ///
    /// Candidates are NFKD-normalized like the cell text they are matched against.
    pub fn locate(&self, role: HeaderRole, header_row: &[String]) -> Option<usize> {
        self.candidates(role).iter().find_map(|candidate| {
            let candidate = normalize(candidate);
            header_row.iter().position(|cell| *cell == candidate)
        })
    }
}

/// HTML `class` attribute values the table generator emits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassCatalog {
    pub number: Vec<String>,
    pub comment_out: Vec<String>,
    pub head_input: Vec<String>,
    pub head_output: Vec<String>,
    pub uniqid: Vec<String>,
    pub uniqid_sub: Vec<String>,
    pub analysis_id: Vec<String>,
    pub analysis_comment: Vec<String>,
    pub input_kind: Vec<String>,
    pub output_kind: Vec<String>,
}

impl ClassCatalog {
    pub fn matches(list: &[String], class: Option<&str>) -> bool {
        class.is_some_and(|class| list.iter().any(|entry| entry == class))
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self {
            number: strings(&["data-no", "data-no-last", "data-commentout-center-left-right"]),
            comment_out: strings(&["data-commentout-center-left-right", "data-commentout-right"]),
            head_input: strings(&["head-input-no", "head-input-no-last"]),
            head_output: strings(&["head-output-no", "head-output-no-last"]),
            uniqid: strings(&["input-tp-uniqid-w", "input-tp-uniqid-s"]),
            uniqid_sub: strings(&["input-tp-uniqid-s"]),
            analysis_id: strings(&["input-tp-id"]),
            analysis_comment: strings(&["input-tp-comment"]),
            input_kind: strings(&["title-input-kind", "title-input-kind-r"]),
            output_kind: strings(&["title-output-kind", "title-output-kind-r"]),
        }
    }
}

/// Sheet names inside the test-specification workbook.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SpecSheets {
    pub spec: String,
    pub testlog: String,
    pub table: String,
    pub io: String,
    pub oe: String,
    pub ie: String,
}

impl SpecSheets {
    /// Sheet that mirrors the given HTML/testlog category.
    pub fn for_category(&self, category: FileCategory) -> Option<&str> {
        match category {
            FileCategory::Testlog => Some(&self.testlog),
            FileCategory::Table => Some(&self.table),
            FileCategory::Io => Some(&self.io),
            FileCategory::Oe => Some(&self.oe),
            FileCategory::Ie => Some(&self.ie),
            _ => None,
        }
    }
}

impl Default for SpecSheets {
    fn default() -> Self {
        Self {
            spec: "テスト仕様書".to_owned(),
            testlog: "カバレッジ".to_owned(),
            table: "テストケース表".to_owned(),
            io: "入出力表".to_owned(),
            oe: "出力期待値表".to_owned(),
            ie: "入力解析表".to_owned(),
        }
    }
}

/// Localized literals that appear in generated documents.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Dictionary {
    pub test_report: String,
    pub spec_dir: String,
    pub testlog_intro: String,
    pub no_issue: String,
    pub issue_prefix: String,
    pub colon: String,
    pub model_phrase: String,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self {
            test_report: "テスト結果報告書".to_owned(),
            spec_dir: "テスト仕様書".to_owned(),
            testlog_intro: "カバレッジ結果".to_owned(),
            no_issue: "なし".to_owned(),
            issue_prefix: "課題".to_owned(),
            colon: "：".to_owned(),
            model_phrase: "Simulink model".to_owned(),
        }
    }
}

/// Every tunable literal the parsers and checks consult.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub headers: HeaderCatalog,
    /// Alternative complete header rows for the test-case table.
    pub table_header_sets: Vec<Vec<String>>,
    /// Catalog of canonical label sets; the best overlap wins.
    pub label_sets: Vec<Vec<String>>,
    pub classes: ClassCatalog,
    pub sheets: SpecSheets,
    pub dictionary: Dictionary,
    pub checklist: ChecklistCatalog,
    pub tooltips: BTreeMap<String, String>,
}

impl Settings {
    /// Load settings from a YAML or JSON file, chosen by extension.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|error| format!("failed to read settings '{}': {error}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match extension.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|error| {
                format!("failed to parse settings '{}': {error}", path.display())
            }),
            "json" => serde_json::from_str(&content).map_err(|error| {
                format!("failed to parse settings '{}': {error}", path.display())
            }),
            other => Err(format!(
                "unsupported settings format '{other}' for '{}' (expected yaml|yml|json)",
                path.display()
            )),
        }
    }

    /// Canonical label set with the largest overlap with `observed`.
    ///
    /// Ties resolve to the earliest catalog entry.
    pub fn label_set_for<'a, I>(&self, observed: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let observed: Vec<&str> = observed.into_iter().collect();
        let mut best: Option<(usize, &Vec<String>)> = None;

        for candidate in &self.label_sets {
            let overlap = candidate
                .iter()
                .filter(|label| observed.contains(&label.as_str()))
                .count();
            if best.is_none_or(|(count, _)| overlap > count) {
                best = Some((overlap, candidate));
            }
        }

        best.map(|(_, labels)| labels.clone()).unwrap_or_default()
    }

    pub fn tooltip<'a>(&'a self, check_id: &str, fallback: &'a str) -> &'a str {
        self.tooltips
            .get(check_id)
            .map(String::as_str)
            .unwrap_or(fallback)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            headers: HeaderCatalog::default(),
            table_header_sets: vec![
                strings(&["No.", "Test Analysis Item", "ID", "Confirmation", "Comment"]),
                strings(&["No.", "テスト解析項目", "ID", "確認", "コメント"]),
            ],
            label_sets: vec![
                strings(&[
                    "Variable", "AMIN", "Range", "Boundary", "Equivalence", "Branch",
                    "Condition", "Loop", "Exception", "AMOUT",
                ]),
                strings(&[
                    "変数", "AMIN", "範囲", "境界値", "同値", "分岐", "条件", "ループ", "例外",
                    "AMOUT",
                ]),
            ],
            classes: ClassCatalog::default(),
            sheets: SpecSheets::default(),
            dictionary: Dictionary::default(),
            checklist: ChecklistCatalog::default(),
            tooltips: BTreeMap::new(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}
