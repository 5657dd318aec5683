//! Wine-list extraction from a photo, through the model's vision input.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_INVENTION_INSTRUCTION};
use crate::llm_client::{ChatMessage, LlmClient};
use crate::restaurant::WineListEntry;

/// Decoded image size limit.
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;
const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];
const OCR_TEMPERATURE: f32 = 0.0;

const OCR_SYSTEM: &str = r#"You read photographs of restaurant wine lists.

Return ONE JSON object: {"wines": [entry]} where each entry is
{"name": string, "producer": string|null, "vintage": integer|null, "price": number|null,
 "wine_type": "red"|"white"|"rose"|"sparkling"|"dessert"|"fortified"|null,
 "region": string|null, "varietal": string|null}

RULES:
1. One entry per wine line, in the order they appear. Skip section headings.
2. price is the bottle price as a plain number without currency symbols.
3. "NV" or a missing year means vintage null."#;

const OCR_INSTRUCTION: &str = "Extract every wine on this list.";

#[derive(Debug, Deserialize)]
struct OcrReply {
    #[serde(default)]
    wines: Vec<OcrEntry>,
}

/// Lenient shape of one extracted line; unknown types are dropped rather than
/// failing the whole list.
#[derive(Debug, Deserialize)]
struct OcrEntry {
    name: Option<String>,
    producer: Option<String>,
    vintage: Option<i32>,
    price: Option<f64>,
    wine_type: Option<String>,
    region: Option<String>,
    varietal: Option<String>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl OcrEntry {
    fn into_entry(self) -> Option<WineListEntry> {
        let name = non_blank(self.name)?;
        Some(WineListEntry {
            name,
            producer: non_blank(self.producer),
            vintage: self.vintage,
            price: self.price.filter(|p| p.is_finite() && *p >= 0.0),
            wine_type: self.wine_type.and_then(|t| t.parse().ok()),
            region: non_blank(self.region),
            varietal: non_blank(self.varietal),
        })
    }
}

/// Checks the upload and returns a `data:` URL for the model. Accepts raw
/// base64 or an existing data URL.
pub fn image_data_url(image_base64: &str, mime_type: Option<&str>) -> Result<String, AppError> {
    let (declared_mime, payload) = match image_base64.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest.split_once(',').ok_or_else(|| {
                AppError::Validation("image: malformed data URL".to_string())
            })?;
            (header.strip_suffix(";base64").map(str::to_string), data)
        }
        None => (None, image_base64),
    };

    let mime = declared_mime
        .as_deref()
        .or(mime_type)
        .unwrap_or("image/jpeg")
        .to_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(AppError::Validation(format!(
            "image: unsupported type {mime}"
        )));
    }

    let payload = payload.trim();
    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| AppError::Validation("image: not valid base64".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("image: empty upload".to_string()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::Validation(format!(
            "image: larger than {} MB",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    Ok(format!("data:{mime};base64,{payload}"))
}

fn parse_reply(text: &str) -> Result<Vec<WineListEntry>, AppError> {
    let reply: OcrReply = crate::llm_client::parse_json_reply(text)
        .map_err(|e| AppError::llm("OCR_FAILED", e.to_string()))?;
    Ok(reply
        .wines
        .into_iter()
        .filter_map(OcrEntry::into_entry)
        .collect())
}

/// Reads wine-list entries from a photo.
pub async fn extract_entries(llm: &LlmClient, data_url: &str) -> Result<Vec<WineListEntry>, AppError> {
    let messages = [
        ChatMessage::system(format!(
            "{OCR_SYSTEM}\n\n{NO_INVENTION_INSTRUCTION}\n\n{JSON_ONLY_SYSTEM}"
        )),
        ChatMessage::user_with_image(OCR_INSTRUCTION, data_url),
    ];

    let response = llm
        .call(&messages, OCR_TEMPERATURE)
        .await
        .map_err(|e| e.into_app_error("OCR_FAILED"))?;
    let text = response
        .text()
        .ok_or_else(|| AppError::llm("OCR_FAILED", "empty reply"))?;

    let entries = parse_reply(text)?;
    if entries.is_empty() {
        warn!("Wine-list photo produced no readable entries");
    } else {
        info!("Extracted {} wine-list entries from photo", entries.len());
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::wine::WineType;

    #[test]
    fn test_raw_base64_gets_data_url() {
        let url = image_data_url("aGVsbG8=", Some("image/png")).unwrap();
        assert_eq!(url, "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_existing_data_url_kept() {
        let url = image_data_url("data:image/webp;base64,aGVsbG8=", None).unwrap();
        assert_eq!(url, "data:image/webp;base64,aGVsbG8=");
    }

    #[test]
    fn test_bad_uploads_rejected() {
        assert!(matches!(
            image_data_url("not base64!!", None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            image_data_url("aGVsbG8=", Some("application/pdf")),
            Err(AppError::Validation(_))
        ));
        assert!(image_data_url("", None).is_err());
    }

    #[test]
    fn test_parse_reply_drops_nameless_and_unknown_types() {
        let text = r#"{"wines": [
            {"name": "Chablis 1er Cru", "producer": "Fèvre", "vintage": 2020, "price": 78, "wine_type": "white"},
            {"name": "  ", "price": 40},
            {"name": "Skin Contact", "wine_type": "orange", "price": -5}
        ]}"#;
        let entries = parse_reply(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].wine_type, Some(WineType::White));
        assert_eq!(entries[0].price, Some(78.0));
        assert_eq!(entries[1].wine_type, None);
        assert_eq!(entries[1].price, None);
    }

    #[test]
    fn test_parse_reply_malformed_is_model_error() {
        assert!(matches!(
            parse_reply("no json here"),
            Err(AppError::Llm { code: "OCR_FAILED", .. })
        ));
    }
}
