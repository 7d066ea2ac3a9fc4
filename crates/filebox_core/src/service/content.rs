//! Data URL codec for file payloads.
//!
//! # Invariants
//! - Encoded payloads always use the `;base64` form.
//! - Decoding accepts extra header parameters (`text/plain;charset=utf-8;base64`).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATA_URL_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

#[derive(Debug)]
pub enum DataUrlError {
    /// Content does not start with `data:` or lacks the `,` separator.
    Malformed,
    /// Header is missing the `;base64` marker.
    NotBase64,
    Decode(base64::DecodeError),
}

impl Display for DataUrlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "content is not a data URL"),
            Self::NotBase64 => write!(f, "data URL is not base64-encoded"),
            Self::Decode(err) => write!(f, "invalid base64 payload: {err}"),
        }
    }
}

impl Error for DataUrlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

/// Decoded data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Mime type from the header, `None` when the header leaves it out.
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Builds `data:<mime>;base64,<payload>`.
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "{DATA_URL_SCHEME}{mime_type}{BASE64_MARKER},{}",
        STANDARD.encode(bytes)
    )
}

/// Parses a base64 data URL.
pub fn decode_data_url(content: &str) -> Result<DataUrl, DataUrlError> {
    let rest = content
        .strip_prefix(DATA_URL_SCHEME)
        .ok_or(DataUrlError::Malformed)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::Malformed)?;
    if !header.ends_with(BASE64_MARKER) {
        return Err(DataUrlError::NotBase64);
    }

    let mime_type = header
        .split(';')
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(DataUrlError::Decode)?;

    Ok(DataUrl { mime_type, bytes })
}
