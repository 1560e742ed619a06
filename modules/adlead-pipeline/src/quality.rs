use std::sync::LazyLock;

use regex::Regex;

use adlead_common::FilterMode;

use crate::SkipReason;

/// Ad text shorter than this (in characters) is noise in strict mode.
pub const MIN_TEXT_CHARS: usize = 20;

/// Unrendered template placeholder, e.g. `{{product.brand}}`.
const PLACEHOLDER_MARKER: &str = "{{";

/// Substituted for empty text in lenient mode.
pub const MISSING_TEXT: &str = "N/A";

static RE_NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\W+$").unwrap());

/// Decide whether trimmed ad text is acceptable, returning the text to store.
///
/// Lenient mode never rejects; empty text becomes [`MISSING_TEXT`]. Strict
/// mode rejects empty, short, templated and symbol-only text.
pub fn check_text(text: &str, mode: FilterMode) -> Result<String, SkipReason> {
    match mode {
        FilterMode::Lenient => {
            if text.is_empty() {
                Ok(MISSING_TEXT.to_string())
            } else {
                Ok(text.to_string())
            }
        }
        FilterMode::Strict => {
            if text.is_empty() {
                Err(SkipReason::EmptyText)
            } else if text.chars().count() < MIN_TEXT_CHARS {
                Err(SkipReason::TooShort)
            } else if text.contains(PLACEHOLDER_MARKER) {
                Err(SkipReason::Placeholder)
            } else if RE_NON_WORD.is_match(text) {
                Err(SkipReason::NonWordText)
            } else {
                Ok(text.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_rejects_empty() {
        assert_eq!(check_text("", FilterMode::Strict), Err(SkipReason::EmptyText));
    }

    #[test]
    fn strict_rejects_short_text() {
        assert_eq!(
            check_text("Buy now!", FilterMode::Strict),
            Err(SkipReason::TooShort)
        );
        // 19 characters
        assert_eq!(
            check_text("abcdefghijklmnopqrs", FilterMode::Strict),
            Err(SkipReason::TooShort)
        );
    }

    #[test]
    fn strict_counts_characters_not_bytes() {
        // 10 characters, 20 bytes
        let text = "éééééééééé";
        assert_eq!(text.len(), 20);
        assert_eq!(check_text(text, FilterMode::Strict), Err(SkipReason::TooShort));
    }

    #[test]
    fn strict_accepts_exactly_minimum_length() {
        let text = "abcdefghijklmnopqrst";
        assert_eq!(text.chars().count(), MIN_TEXT_CHARS);
        assert_eq!(check_text(text, FilterMode::Strict), Ok(text.to_string()));
    }

    #[test]
    fn strict_rejects_template_placeholders() {
        assert_eq!(
            check_text("Shop {{product.brand}} deals today", FilterMode::Strict),
            Err(SkipReason::Placeholder)
        );
    }

    #[test]
    fn strict_rejects_symbol_only_text() {
        assert_eq!(
            check_text("!!!!!!!!!!  ????????? ---", FilterMode::Strict),
            Err(SkipReason::NonWordText)
        );
    }

    #[test]
    fn strict_checks_length_before_symbols() {
        assert_eq!(check_text("???", FilterMode::Strict), Err(SkipReason::TooShort));
    }

    #[test]
    fn strict_accepts_real_copy() {
        let text = "Buy our amazing discount offer today only!!";
        assert_eq!(check_text(text, FilterMode::Strict), Ok(text.to_string()));
    }

    #[test]
    fn lenient_never_rejects_on_text() {
        assert_eq!(check_text("???", FilterMode::Lenient), Ok("???".to_string()));
        assert_eq!(check_text("hi", FilterMode::Lenient), Ok("hi".to_string()));
        assert_eq!(
            check_text("{{placeholder}}", FilterMode::Lenient),
            Ok("{{placeholder}}".to_string())
        );
    }

    #[test]
    fn lenient_substitutes_missing_text() {
        assert_eq!(check_text("", FilterMode::Lenient), Ok("N/A".to_string()));
    }
}
