use std::fs;
use std::path::Path;

/// Read a text file, decoding as UTF-8 when valid and Shift_JIS otherwise.
pub fn read_text(path: &Path) -> Result<String, String> {
    let bytes = fs::read(path)
        .map_err(|error| format!("failed to read text file '{}': {error}", path.display()))?;
    Ok(decode_text(&bytes))
}

/// Decode bytes produced by the test tool on either a UTF-8 or CP932 host.
///
/// Bytes Shift_JIS cannot map are dropped rather than replaced.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => {
            let (decoded, _encoding, _had_errors) = encoding_rs::SHIFT_JIS.decode(bytes);
            decoded.chars().filter(|ch| *ch != '\u{FFFD}').collect()
        }
    }
}

/// Logical lines with trailing `\r` removed.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_owned).collect()
}
