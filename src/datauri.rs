//! `data:<mime>;base64,<payload>` encoding and validation.
//!
//! Every binary payload crossing the presentation boundary travels as a data
//! URI, inbound (uploads) and outbound (generated video, heatmaps).

use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use std::fmt;
use std::str::FromStr;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// A decoded media payload together with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAsset {
    mime_type: String,
    bytes: Vec<u8>,
}

impl EncodedAsset {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Parse and validate a data URI.
    ///
    /// The header must declare a `type/subtype` MIME type and the `;base64`
    /// marker; MIME parameters such as `codecs=opus` are accepted and dropped.
    /// The payload must be non-empty, valid standard Base64.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix(SCHEME)
            .ok_or_else(|| Error::Validation("data URI must start with 'data:'".to_string()))?;

        let (header, payload) = rest.split_once(',').ok_or_else(|| {
            Error::Validation("data URI is missing the ',' payload separator".to_string())
        })?;

        let params = header
            .strip_suffix(BASE64_MARKER)
            .ok_or_else(|| Error::Validation("data URI must use base64 encoding".to_string()))?;

        let mime_type = params.split(';').next().unwrap_or_default().trim();
        if !is_valid_mime(mime_type) {
            return Err(Error::Validation(format!(
                "data URI declares an invalid MIME type '{}'",
                mime_type
            )));
        }

        if payload.is_empty() {
            return Err(Error::Validation("data URI payload is empty".to_string()));
        }

        let bytes = BASE64_STANDARD
            .decode(payload)
            .map_err(|e| Error::Validation(format!("data URI payload is not valid base64: {e}")))?;

        Ok(Self {
            mime_type: mime_type.to_ascii_lowercase(),
            bytes,
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Top-level media type, e.g. `image` for `image/png`.
    pub fn media_type(&self) -> &str {
        self.mime_type
            .split_once('/')
            .map(|(top, _)| top)
            .unwrap_or(&self.mime_type)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Base64 payload without the data URI header.
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        let payload = self.to_base64();
        let mut uri =
            String::with_capacity(SCHEME.len() + self.mime_type.len() + 8 + payload.len());
        uri.push_str(SCHEME);
        uri.push_str(&self.mime_type);
        uri.push_str(BASE64_MARKER);
        uri.push(',');
        uri.push_str(&payload);
        uri
    }

    /// Fails unless the asset's top-level media type is `expected`.
    pub fn require_media_type(&self, expected: &str) -> Result<()> {
        if self.media_type() == expected {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "expected {} content but the data URI declares '{}'",
                expected, self.mime_type
            )))
        }
    }
}

impl fmt::Display for EncodedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_data_uri())
    }
}

impl FromStr for EncodedAsset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// True for a bare `type/subtype` made of RFC 2045 token characters.
pub fn is_valid_mime(mime: &str) -> bool {
    let Some((top, sub)) = mime.split_once('/') else {
        return false;
    };
    is_token(top) && is_token(sub)
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$&-^_.+".contains(&b))
}
