use serde::Serialize;
use std::io::{self, Write};
use std::time::Instant;

const TOOL: &str = "lila";

/// Fractional progress of a batch run, emitted to stderr.
#[derive(Debug, Serialize)]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub tool: String,
    pub processed: u64,
    pub total: Option<u64>,
    pub percent: Option<f64>,
    pub elapsed_ms: u64,
}

impl ProgressEvent {
    pub fn new(processed: u64, total: u64, started: Instant) -> Self {
        let percent = (total > 0).then(|| {
            let ratio = processed as f64 / total as f64;
            (ratio * 1000.0).round() / 10.0
        });
        Self {
            event_type: "progress".to_owned(),
            tool: TOOL.to_owned(),
            processed,
            total: Some(total),
            percent,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// A document that could not be parsed; its checks degrade to inconclusive.
#[derive(Debug, Serialize)]
pub struct WarningEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub tool: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

pub fn report_progress(event: &ProgressEvent) {
    let mut stderr = io::stderr().lock();
    let _ = write_event_line(&mut stderr, event);
}

pub fn report_warning(path: &str, message: &str) {
    report_warning_code(path, None, message);
}

pub fn report_warning_code(path: &str, code: Option<&str>, message: &str) {
    let warning = WarningEvent {
        event_type: "warning".to_owned(),
        tool: TOOL.to_owned(),
        path: path.to_owned(),
        code: code.map(str::to_owned),
        message: message.to_owned(),
    };
    let mut stderr = io::stderr().lock();
    let _ = write_event_line(&mut stderr, &warning);
}

fn write_event_line<T: Serialize>(out: &mut dyn Write, event: &T) -> Result<(), String> {
    serde_json::to_writer(&mut *out, event)
        .map_err(|error| format!("failed to serialize event: {error}"))?;
    out.write_all(b"\n")
        .map_err(|error| format!("failed to write event newline: {error}"))?;
    out.flush()
        .map_err(|error| format!("failed to flush event: {error}"))
}

#[cfg(test)]
mod tests {
    use super::{ProgressEvent, WarningEvent, write_event_line};
    use serde_json::json;
    use std::io::{Cursor, Error, ErrorKind, Write};
    use std::time::Instant;

    #[test]
    fn progress_event_reports_fraction_done() {
        let event = ProgressEvent::new(1, 3, Instant::now());
        assert_eq!(event.tool, "lila");
        assert_eq!(event.total, Some(3));
        assert_eq!(event.percent, Some(33.3));

        let empty = ProgressEvent::new(0, 0, Instant::now());
        assert_eq!(empty.percent, None);
    }

    #[test]
    fn warning_event_omits_missing_code() {
        let event = WarningEvent {
            event_type: "warning".to_owned(),
            tool: "lila".to_owned(),
            path: "/work/f_IE.html".to_owned(),
            code: Some("E_DOCUMENT_UNREADABLE".to_owned()),
            message: "no table at index 0".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(event).expect("serialize warning"),
            json!({
                "type": "warning",
                "tool": "lila",
                "path": "/work/f_IE.html",
                "code": "E_DOCUMENT_UNREADABLE",
                "message": "no table at index 0"
            })
        );
    }

    #[test]
    fn writes_one_line_per_event() {
        let event = ProgressEvent {
            event_type: "progress".to_owned(),
            tool: "lila".to_owned(),
            processed: 2,
            total: Some(4),
            percent: Some(50.0),
            elapsed_ms: 7,
        };
        let mut out = Cursor::new(Vec::new());
        write_event_line(&mut out, &event).expect("write event");

        let output = String::from_utf8(out.into_inner()).expect("utf-8");
        assert_eq!(
            output,
            "{\"type\":\"progress\",\"tool\":\"lila\",\"processed\":2,\"total\":4,\"percent\":50.0,\"elapsed_ms\":7}\n"
        );
    }

    #[test]
    fn surfaces_write_errors() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(Error::new(ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let event = ProgressEvent::new(1, 1, Instant::now());
        let error = write_event_line(&mut Broken, &event).expect_err("broken pipe");
        assert!(error.contains("failed to serialize event"));
    }
}
