use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::{Result, StateError};

pub const PNG_MIME: &str = "image/png";
pub const MP4_MIME: &str = "video/mp4";

/// Encoded output handed to a front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub mime: &'static str,
    pub data: Vec<u8>,
}

impl Artifact {
    pub fn png(data: Vec<u8>) -> Self {
        Self { mime: PNG_MIME, data }
    }

    pub fn mp4(data: Vec<u8>) -> Self {
        Self { mime: MP4_MIME, data }
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.data))
    }

    /// File extension matching the content
    pub fn extension(&self) -> &'static str {
        match self.mime {
            MP4_MIME => "mp4",
            _ => "png",
        }
    }
}

/// Split a base64 data URI into its media type and decoded payload
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let malformed = |reason: &str| StateError::Malformed {
        reason: reason.to_string(),
    };

    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| malformed("data URI must start with 'data:'"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| malformed("data URI has no payload"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| malformed("data URI is not base64 encoded"))?;

    let data = BASE64
        .decode(payload.trim())
        .map_err(|e| malformed(&format!("invalid base64 payload: {}", e)))?;
    Ok((mime.to_string(), data))
}
