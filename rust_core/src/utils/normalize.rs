//! Text normalization shared by every matching component.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a string for comparison.
///
/// Strips diacritics (compatibility decomposition, combining marks dropped),
/// lower-cases and trims. Idempotent, and total over its input: an empty
/// string comes back empty.
pub fn normalize(s: &str) -> String {
    // Second decomposition pass: lower-casing can reintroduce marks (e.g. 'İ').
    let folded = strip_marks(s).to_lowercase();
    strip_marks(&folded).trim().to_string()
}

fn strip_marks(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Tokenize into normalized words
pub fn tokens(s: &str) -> Vec<String> {
    normalize(s)
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accent_and_case_insensitive() {
        assert_eq!(normalize("São Paulo"), "sao paulo");
        assert_eq!(normalize("sao paulo"), "sao paulo");
        assert_eq!(normalize("  ATLÉTICO Mineiro "), "atletico mineiro");
        assert_eq!(normalize("Bayern München"), "bayern munchen");
    }

    #[test]
    fn test_idempotent() {
        for s in ["São Paulo", "İstanbul Başakşehir", "ℌertha", "  Çorum  FK ", "", "Ñublense"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert!(tokens("").is_empty());
    }

    #[test]
    fn test_tokens() {
        assert_eq!(tokens("Real  Madrid CF"), vec!["real", "madrid", "cf"]);
        assert_eq!(tokens(" Grêmio "), vec!["gremio"]);
    }
}
