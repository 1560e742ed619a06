//! Page scraper items → [`PageMetadata`].

use serde_json::Value;

use adlead_common::PageMetadata;

const WEBSITE_KEYS: &[&str] = &["website", "websites"];
const EMAIL_KEYS: &[&str] = &["email", "emails"];
const PHONE_KEYS: &[&str] = &["phone", "phoneNumber"];
const CATEGORY_KEYS: &[&str] = &["category", "categories"];
const BIO_KEYS: &[&str] = &["bio", "intro"];
const ADDRESS_KEYS: &[&str] = &["address"];

/// Read the contact fields of one scraped page. Missing or unusable values
/// become empty strings; arrays of strings are joined with ", ".
pub fn page_metadata(item: &Value) -> PageMetadata {
    PageMetadata {
        website: first_text(item, WEBSITE_KEYS),
        email: first_text(item, EMAIL_KEYS),
        phone: first_text(item, PHONE_KEYS),
        category: first_text(item, CATEGORY_KEYS),
        bio: first_text(item, BIO_KEYS),
        address: first_text(item, ADDRESS_KEYS),
    }
}

fn first_text(item: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| item.get(key))
        .map(as_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}
