/// Lower-case raw engine output and drop every character that is
/// neither alphanumeric nor whitespace.
///
/// Punctuation is removed by exclusion rather than a denylist, so
/// Unicode punctuation (curly quotes, ellipses) disappears without
/// being enumerated. Leading/trailing whitespace left by removed
/// tokens is trimmed.
pub fn clean_transcript(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Normalization applied to both sides immediately before similarity
/// comparison: lower-case, trim leading/trailing whitespace.
pub fn comparison_key(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_lowercases() {
        assert_eq!(clean_transcript("Hello World"), "hello world");
    }

    #[test]
    fn test_clean_strips_ascii_punctuation() {
        assert_eq!(clean_transcript("open, the door!"), "open the door");
    }

    #[test]
    fn test_clean_strips_unicode_punctuation() {
        // Curly quotes and em-dash are not alphanumeric, so they go.
        assert_eq!(clean_transcript("\u{201c}don\u{2019}t\u{201d}"), "dont");
    }

    #[test]
    fn test_clean_keeps_interior_whitespace() {
        assert_eq!(clean_transcript("a  b"), "a  b");
    }

    #[test]
    fn test_clean_trims_edges() {
        assert_eq!(clean_transcript("  hello. "), "hello");
    }

    #[test]
    fn test_clean_keeps_digits() {
        assert_eq!(clean_transcript("room 101."), "room 101");
    }

    #[test]
    fn test_comparison_key_trims_and_lowercases() {
        assert_eq!(comparison_key("  Open The Door "), "open the door");
    }

    #[test]
    fn test_comparison_key_empty() {
        assert_eq!(comparison_key("   "), "");
    }
}
