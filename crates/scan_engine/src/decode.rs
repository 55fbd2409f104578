use encoding_rs::{Encoding, UTF_8};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBody {
    pub payload: Value,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}: {message}")]
    Charset { encoding: String, message: String },
    #[error("response body is not valid json: {0}")]
    Json(String),
}

/// Decode a response body into JSON using: BOM -> Content-Type charset -> UTF-8.
pub fn decode_json(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedBody, DecodeError> {
    let encoding = Encoding::for_bom(bytes)
        .map(|(enc, _)| enc)
        .or_else(|| {
            content_type
                .and_then(extract_charset)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or(UTF_8);

    // `decode` strips a leading BOM, which serde_json would otherwise reject.
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError::Charset {
            encoding: used.name().to_string(),
            message: "invalid byte sequence".into(),
        });
    }

    let payload =
        serde_json::from_str(&text).map_err(|err| DecodeError::Json(err.to_string()))?;
    Ok(DecodedBody {
        payload,
        encoding_label: used.name().to_string(),
    })
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}
