use crate::document::VariableList;
use crate::document::text::read_text;
use std::path::{Path, PathBuf};

/// Marker of the line naming variables initialized on every call.
pub const INIT_MARKER: &str = "#InitWheneverCall";
const COMMENT_MARKER: &str = "#COMMENT";

/// A CSV test definition as emitted by the test tool.
#[derive(Debug, Clone)]
pub struct CsvDefinition {
    pub path: PathBuf,
    pub func_full: String,
    pub description: String,
    pub input_count: usize,
    pub output_count: usize,
    /// `(variable, value)` pairs from the init line and the line after it.
    pub init: Vec<(String, String)>,
    pub variables: VariableList,
    pub stubs: Vec<Vec<String>>,
    pub non_stubs: Vec<Vec<String>>,
}

impl CsvDefinition {
    pub fn open(path: &Path) -> Result<Self, String> {
        let text = read_text(path)?;
        Self::parse(path, &text)
            .map_err(|error| format!("failed to parse CSV '{}': {error}", path.display()))
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, String> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();

        let header = lines
            .iter()
            .find(|line| line.starts_with("mod"))
            .ok_or_else(|| "missing 'mod' line".to_owned())?;
        let fields = split_fields(header)?;
        let field = |index: usize| {
            fields
                .get(index)
                .cloned()
                .ok_or_else(|| format!("'mod' line has no field {index}"))
        };
        let count = |index: usize| -> Result<usize, String> {
            let value = field(index)?;
            value
                .trim()
                .parse()
                .map_err(|error| format!("invalid variable count '{value}': {error}"))
        };
        let func_full = field(1)?;
        let description = field(2)?;
        let input_count = count(3)?;
        let output_count = count(4)?;

        let mut init = Vec::new();
        if let Some(position) = lines.iter().position(|line| line.starts_with(INIT_MARKER)) {
            let names = split_fields(lines[position])?;
            let values = match lines.get(position + 1) {
                Some(line) => split_fields(line)?,
                None => Vec::new(),
            };
            init = names.into_iter().zip(values).collect();
        }

        let mut variables = VariableList::default();
        if let Some(line) = lines.iter().find(|line| line.starts_with(COMMENT_MARKER)) {
            let names = split_fields(line)?;
            let split = (input_count + 1).min(names.len());
            variables.input = names.get(1..split).map(<[String]>::to_vec).unwrap_or_default();
            variables.output = names[split..].to_vec();
        }

        let mut stubs = Vec::new();
        let mut non_stubs = Vec::new();
        for line in lines.iter().filter(|line| line.starts_with('%')) {
            let entry: Vec<String> = split_fields(line)?.into_iter().skip(1).collect();
            if entry.first().is_none_or(String::is_empty) {
                non_stubs.push(entry);
            } else {
                stubs.push(entry);
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            func_full,
            description,
            input_count,
            output_count,
            init,
            variables,
            stubs,
            non_stubs,
        })
    }

    /// Value of the init-on-every-call flag; absent means enabled.
    pub fn init_flag(&self) -> &str {
        self.init
            .iter()
            .find(|(name, _)| name == INIT_MARKER)
            .map(|(_, value)| value.as_str())
            .unwrap_or("1")
    }

    pub fn is_initialized(&self, variable: &str) -> bool {
        self.init.iter().any(|(name, _)| name == variable)
    }

    pub fn has_stubs(&self) -> bool {
        !self.stubs.is_empty()
    }
}

/// Split one CSV line, removing the quotes around quoted fields.
fn split_fields(line: &str) -> Result<Vec<String>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    match reader.records().next() {
        Some(record) => record
            .map(|record| record.iter().map(str::to_owned).collect())
            .map_err(|error| format!("failed to split CSV line '{line}': {error}")),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::CsvDefinition;
    use std::path::Path;

    pub(crate) const SAMPLE: &str = "\
mod,\"src/motor/ctrl.c/Motor_Step\",\"Motor_Step\",2,1
#InitWheneverCall,out,count
1,0,0
#COMMENT,@speed,$$ptr,out
%,,helper_a
%,stub_b,Stub_b
";

    #[test]
    fn parses_function_header() {
        let csv = CsvDefinition::parse(Path::new("Motor_Step.csv"), SAMPLE).expect("parse");
        assert_eq!(csv.func_full, "src/motor/ctrl.c/Motor_Step");
        assert_eq!(csv.description, "Motor_Step");
        assert_eq!(csv.input_count, 2);
        assert_eq!(csv.output_count, 1);
    }

    #[test]
    fn splits_variables_by_declared_counts() {
        let csv = CsvDefinition::parse(Path::new("Motor_Step.csv"), SAMPLE).expect("parse");
        assert_eq!(csv.variables.input, vec!["@speed", "$$ptr"]);
        assert_eq!(csv.variables.output, vec!["out"]);
    }

    #[test]
    fn reads_init_pairs_from_following_line() {
        let csv = CsvDefinition::parse(Path::new("Motor_Step.csv"), SAMPLE).expect("parse");
        assert_eq!(csv.init_flag(), "1");
        assert!(csv.is_initialized("out"));
        assert!(csv.is_initialized("count"));
        assert!(!csv.is_initialized("@speed"));
    }

    #[test]
    fn missing_init_line_defaults_flag_to_enabled() {
        let csv = CsvDefinition::parse(Path::new("f.csv"), "mod,f,f,0,0\n").expect("parse");
        assert_eq!(csv.init_flag(), "1");
        assert!(csv.init.is_empty());
        assert!(csv.variables.input.is_empty());
    }

    #[test]
    fn separates_stub_and_non_stub_entries() {
        let csv = CsvDefinition::parse(Path::new("Motor_Step.csv"), SAMPLE).expect("parse");
        assert_eq!(csv.non_stubs, vec![vec!["".to_owned(), "helper_a".to_owned()]]);
        assert_eq!(csv.stubs, vec![vec!["stub_b".to_owned(), "Stub_b".to_owned()]]);
        assert!(csv.has_stubs());
    }

    #[test]
    fn rejects_missing_mod_line() {
        let error = CsvDefinition::parse(Path::new("f.csv"), "#COMMENT,a\n").expect_err("no mod");
        assert!(error.contains("missing 'mod' line"));
    }

    #[test]
    fn rejects_non_numeric_counts() {
        let error =
            CsvDefinition::parse(Path::new("f.csv"), "mod,f,f,two,1\n").expect_err("bad count");
        assert!(error.contains("invalid variable count"));
    }
}
