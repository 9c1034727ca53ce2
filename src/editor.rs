//! Second half of the edit protocol.
//!
//! `vim <file>` returns [`Outcome::OpenEditor`]; the client edits the text
//! and sends it back base64 encoded. Nothing about the edit is stored in
//! between, the filename is the only correlation.

use std::fs;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::command::Outcome;
use crate::error::{CommandError, Result};
use crate::session::Session;

/// Encode edited text for transport back to [`save`].
pub fn encode_payload(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}

/// Decode a payload produced by [`encode_payload`].
///
/// ASCII whitespace is ignored, so payloads split across several words or
/// lines still decode. The bytes must form valid UTF-8.
pub fn decode_payload(payload: &str) -> Result<String> {
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| CommandError::DecodeError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CommandError::DecodeError(e.to_string()))
}

/// Replace `filename` with the decoded payload.
///
/// The payload is decoded completely before the file is opened, so a bad
/// payload leaves the file as it was.
pub fn save(filename: &str, payload: &str, session: &Session) -> Result<Outcome> {
    let content = decode_payload(payload)?;
    fs::write(session.resolve(filename), content)
        .map_err(|e| CommandError::from_io(e, filename))?;
    Ok(Outcome::text(format!("Saved file {filename}")))
}
