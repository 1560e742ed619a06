//! Field extraction from raw ads library records.
//!
//! Every accessor here is total: missing keys, nulls and values of the wrong
//! type resolve to "absent" instead of failing the record. Type mismatches are
//! reported back as [`ExtractWarning`]s so the caller can log them.

use serde_json::Value;

use adlead_common::RawAdRecord;

/// Display name keys, in priority order.
const IDENTITY_KEYS: &[&str] = &["pageName", "page_name"];
/// Direct page URL keys, in priority order.
const URL_KEYS: &[&str] = &["pageUrl", "page_url"];
const AD_TEXT_KEY: &str = "adText";

/// Prefix for page URLs synthesized from a display name.
pub const PAGE_URL_PREFIX: &str = "https://www.facebook.com/";

/// A field that was present but not the shape we expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractWarning {
    pub field: &'static str,
    pub found: &'static str,
}

impl std::fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unexpected {} for '{}'", self.found, self.field)
    }
}

/// Best-effort fields pulled from one raw record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub identity: Option<String>,
    pub contact_url: Option<String>,
    /// Trimmed; empty when no text was found.
    pub body_text: String,
    pub warnings: Vec<ExtractWarning>,
}

/// Resolve identity, contact URL and body text from a raw record.
pub fn extract(record: &RawAdRecord) -> ExtractedFields {
    let mut warnings = Vec::new();

    let identity = IDENTITY_KEYS
        .iter()
        .find_map(|key| non_empty_str(record.get(key), *key, &mut warnings));

    let contact_url = URL_KEYS
        .iter()
        .find_map(|key| non_empty_str(record.get(key), *key, &mut warnings))
        .or_else(|| identity.as_deref().map(page_url_for));

    let body_text = body_text(record, &mut warnings);

    ExtractedFields {
        identity,
        contact_url,
        body_text,
        warnings,
    }
}

/// Synthesize a page URL from a display name. Whitespace is removed, nothing
/// else is escaped or validated, so distinct names can collapse to one URL.
pub fn page_url_for(name: &str) -> String {
    let slug: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    format!("{PAGE_URL_PREFIX}{slug}")
}

/// `adText`, falling back to `snapshot.body.text`.
fn body_text(record: &RawAdRecord, warnings: &mut Vec<ExtractWarning>) -> String {
    if let Some(text) = non_empty_str(record.get(AD_TEXT_KEY), AD_TEXT_KEY, warnings) {
        return text;
    }

    let snapshot = as_object(record.get("snapshot"), "snapshot", warnings);
    let body = snapshot.and_then(|s| as_object(s.get("body"), "snapshot.body", warnings));
    body.and_then(|b| non_empty_str(b.get("text"), "snapshot.body.text", warnings))
        .unwrap_or_default()
}

/// A trimmed, non-empty string. Null and missing values are silently absent.
fn non_empty_str(
    value: Option<&Value>,
    field: &'static str,
    warnings: &mut Vec<ExtractWarning>,
) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Null => None,
        other => {
            warnings.push(ExtractWarning {
                field,
                found: type_name(other),
            });
            None
        }
    }
}

fn as_object<'a>(
    value: Option<&'a Value>,
    field: &'static str,
    warnings: &mut Vec<ExtractWarning>,
) -> Option<&'a serde_json::Map<String, Value>> {
    match value? {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            warnings.push(ExtractWarning {
                field,
                found: type_name(other),
            });
            None
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
