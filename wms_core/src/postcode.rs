//! UK postcode grammar.

use std::sync::LazyLock;

use regex::Regex;

static POSTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{1,2}[0-9]{1,2}[A-Z]?\s?[0-9][A-Z]{2}$").expect("valid postcode regex")
});

/// Whether `postcode` is shaped like a UK postcode, ignoring case.
pub fn is_valid(postcode: &str) -> bool {
    POSTCODE_RE.is_match(&postcode.to_uppercase())
}

/// Normalize a postcode to its canonical `OUTWARD INWARD` form, e.g. `sw115tu` to `SW11 5TU`.
///
/// Returns `None` if the input does not match the postcode grammar.
pub fn normalize(postcode: &str) -> Option<String> {
    let collapsed = postcode
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_uppercase();
    if !POSTCODE_RE.is_match(&collapsed) {
        return None;
    }
    let compact: String = collapsed.chars().filter(|c| !c.is_whitespace()).collect();
    // the inward code is always one digit and two letters
    let (outward, inward) = compact.split_at(compact.len() - 3);
    Some(format!("{outward} {inward}"))
}

#[cfg(test)]
mod tests {
    use crate::postcode::{is_valid, normalize};

    #[test]
    fn test_is_valid() {
        for postcode in ["SW11 5TU", "sw11 5tu", "SW115TU", "W1A 1AA", "E1 6AN", "EC1A 1BB"] {
            assert!(is_valid(postcode), "{postcode} should be valid");
        }
        for postcode in ["", "SW11", "London", "SW11  5TU", "12345", "SW11 5TU UK"] {
            assert!(!is_valid(postcode), "{postcode} should be invalid");
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("sw11 5tu").as_deref(), Some("SW11 5TU"));
        assert_eq!(normalize("  SW115TU ").as_deref(), Some("SW11 5TU"));
        assert_eq!(normalize("ec1a   1bb").as_deref(), Some("EC1A 1BB"));
        assert_eq!(normalize("not a postcode"), None);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for postcode in ["SW11 5TU", "sw115tu", "W1A 1AA", "e1 6an", " SW18  4HR "] {
            let once = normalize(postcode).unwrap();
            assert_eq!(normalize(&once).as_deref(), Some(once.as_str()));
        }
    }
}
