use crate::refusal::codes::RefusalCode;
use serde::Serialize;
use serde_json::Value;

/// Envelope version emitted with every refusal.
pub const ENVELOPE_VERSION: &str = "lila.v0";

/// Refusal envelope emitted to stdout on exit 2.
#[derive(Debug, Serialize)]
pub struct RefusalPayload {
    pub version: String,
    pub outcome: String,
    pub refusal: RefusalDetail,
}

/// Detail within a refusal envelope.
#[derive(Debug, Serialize)]
pub struct RefusalDetail {
    pub code: RefusalCode,
    pub message: String,
    pub detail: Value,
    pub next_command: Option<String>,
}

impl RefusalPayload {
    pub fn new(code: RefusalCode, message: &str, detail: Value) -> Self {
        Self {
            version: ENVELOPE_VERSION.to_owned(),
            outcome: "REFUSAL".to_owned(),
            refusal: RefusalDetail {
                code,
                message: message.to_owned(),
                detail,
                next_command: None,
            },
        }
    }

    pub fn with_next_command(mut self, command: impl Into<String>) -> Self {
        self.refusal.next_command = Some(command.into());
        self
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
