use serde::Serialize;

/// Reasons the CLI refuses to produce a checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RefusalCode {
    /// Testlog or workspace path missing, unreadable, or of the wrong kind.
    #[serde(rename = "E_BAD_INPUT")]
    BadInput,
    /// Settings or package file could not be loaded.
    #[serde(rename = "E_BAD_SETTINGS")]
    BadSettings,
}

impl RefusalCode {
    pub fn as_str(self) -> &'static str {
        match self {
            RefusalCode::BadInput => "E_BAD_INPUT",
            RefusalCode::BadSettings => "E_BAD_SETTINGS",
        }
    }
}
