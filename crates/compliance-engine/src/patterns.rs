//! Phrase matching used by the rule scanner

/// Lower-case text once so every rule can match against the same buffer
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}

/// Case-insensitive substring test. `text_lower` must already be normalized.
/// An empty phrase never matches.
pub fn contains_phrase(text_lower: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    text_lower.contains(&normalize(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_phrase_ignores_case() {
        let text = normalize("Stores PATIENT Data on disk");
        assert!(contains_phrase(&text, "patient data"));
        assert!(contains_phrase(&text, "Patient Data"));
    }

    #[test]
    fn test_contains_phrase_is_substring_based() {
        let text = normalize("Records are unencrypted");
        assert!(contains_phrase(&text, "encrypted"));
    }

    #[test]
    fn test_empty_phrase_never_matches() {
        assert!(!contains_phrase("anything", ""));
    }
}
