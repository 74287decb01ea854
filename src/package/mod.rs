//! Package-level facts supplied by an external collaborator.

pub mod cache;

pub use cache::JsonPackage;

use crate::document::FunctionInfo;
use serde_json::Value;
use std::collections::BTreeMap;

/// A function-summary row keyed by the package table's header names.
pub type Record = BTreeMap<String, Value>;

/// Whether a source file was generated from a visual model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    ModelDerived,
    Handwritten,
    Unknown,
}

impl From<Option<bool>> for SourceKind {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => SourceKind::ModelDerived,
            Some(false) => SourceKind::Handwritten,
            None => SourceKind::Unknown,
        }
    }
}

/// Read-only lookups into a package's pre-fetched metadata.
pub trait PackageCache: Send + Sync {
    /// Package name, when a package is selected.
    fn name(&self) -> Option<&str>;

    /// Model-derived classification of `src_full`, by file name with suffix
    /// tie-breaking.
    fn source_kind(&self, src_full: &str) -> SourceKind;

    /// Summary row for `func` defined in `src_full`, enriched with ticket data.
    fn function_record(&self, func: &str, src_full: &str) -> Option<Record>;
}

/// Stand-in used when no package is selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPackage;

impl PackageCache for NoPackage {
    fn name(&self) -> Option<&str> {
        None
    }

    fn source_kind(&self, _src_full: &str) -> SourceKind {
        SourceKind::Unknown
    }

    fn function_record(&self, _func: &str, _src_full: &str) -> Option<Record> {
        None
    }
}

/// Package summary row for the testlog's function, with testlog facts filling
/// keys the package does not provide.
pub fn function_info(package: &dyn PackageCache, info: &FunctionInfo) -> Record {
    let mut record = package
        .function_record(&info.func, &info.src_full)
        .unwrap_or_default();
    record.insert(
        "package".to_owned(),
        package.name().map_or(Value::Null, Value::from),
    );

    if let Ok(Value::Object(fields)) = serde_json::to_value(info) {
        for (key, value) in fields {
            record.entry(key).or_insert(value);
        }
    }
    record
}

/// Record value as display text; strings stay verbatim, null is empty.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
