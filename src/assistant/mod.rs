pub mod gemini;

use crate::errors::{AppError, AppResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Largest inline payload (decoded bytes) accepted from the webview.
pub const MAX_INLINE_PAYLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Decoded `data:<mime>;base64,<payload>` URL as produced by a FileReader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePayload {
    pub mime_type: String,
    pub data: String,
}

impl InlinePayload {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Splits and validates a data URL. The base64 body is decoded once to catch
/// malformed or oversized payloads before they travel to the AI service.
pub fn parse_data_url(url: &str) -> AppResult<InlinePayload> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| AppError::Invalid("expected a data: URL".to_string()))?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| AppError::Invalid("data URL is missing its payload".to_string()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| AppError::Invalid("data URL payload must be base64".to_string()))?;
    if mime_type.is_empty() {
        return Err(AppError::Invalid("data URL has no media type".to_string()));
    }

    let decoded = STANDARD
        .decode(data)
        .map_err(|error| AppError::Invalid(format!("invalid base64 payload: {error}")))?;
    if decoded.len() > MAX_INLINE_PAYLOAD_BYTES {
        return Err(AppError::Invalid(format!(
            "payload of {} bytes exceeds the {} byte limit",
            decoded.len(),
            MAX_INLINE_PAYLOAD_BYTES
        )));
    }

    Ok(InlinePayload {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::parse_data_url;
    use crate::errors::AppError;

    #[test]
    fn parses_a_well_formed_data_url() {
        let payload = parse_data_url("data:image/png;base64,aGVsbG8=").expect("parse");
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.data, "aGVsbG8=");
        assert_eq!(payload.to_data_url(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn rejects_non_base64_and_malformed_urls() {
        assert!(matches!(
            parse_data_url("image/png;base64,aGVsbG8="),
            Err(AppError::Invalid(_))
        ));
        assert!(matches!(
            parse_data_url("data:image/png,plain"),
            Err(AppError::Invalid(_))
        ));
        assert!(matches!(
            parse_data_url("data:image/png;base64,not base64!!"),
            Err(AppError::Invalid(_))
        ));
    }
}
