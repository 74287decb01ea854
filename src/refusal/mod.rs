pub mod codes;
pub mod payload;

pub use codes::RefusalCode;
pub use payload::{RefusalDetail, RefusalPayload};

use serde_json::json;
use std::path::Path;

/// Refusal for an input path that cannot be checked.
pub fn bad_input(path: &Path, error: impl Into<String>) -> RefusalPayload {
    RefusalPayload::new(
        RefusalCode::BadInput,
        "Input cannot be checked",
        json!({ "path": path.display().to_string(), "error": error.into() }),
    )
}

/// Refusal for a settings or package file that failed to load.
pub fn bad_settings(path: &Path, error: impl Into<String>) -> RefusalPayload {
    RefusalPayload::new(
        RefusalCode::BadSettings,
        "Settings could not be loaded",
        json!({ "path": path.display().to_string(), "error": error.into() }),
    )
    .with_next_command("lila --describe")
}
