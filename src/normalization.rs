use serde::{Deserialize, Deserializer};

/// Normalizes an exercise name by stripping surrounding whitespace and
/// composing it into Unicode Normalization Form C, so that the same
/// exercise typed on two keyboards groups together.
///
/// ```
/// use ironlog::normalization::normalize_exercise;
/// assert_eq!(normalize_exercise("  Bench Press "), "Bench Press");
/// ```
pub fn normalize_exercise(name: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    name.as_ref().trim().nfc().collect()
}

/// Normalizes a user key. Emails are opaque, so only whitespace goes.
pub fn normalize_email(email: impl AsRef<str>) -> String {
    email.as_ref().trim().to_owned()
}

/// Deserializes an optional exercise name through `normalize_exercise`.
/// Blank names become `None`.
pub fn deserialize_exercise<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let o: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(o.map(normalize_exercise).filter(|s| !s.is_empty()))
}

/// Deserializes an optional email through `normalize_email`. Blank
/// emails become `None`.
pub fn deserialize_email<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let o: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(o.map(normalize_email).filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use unicode_normalization::is_nfc;

    use super::{normalize_email, normalize_exercise};

    fn count_whitespace(s: impl AsRef<str>) -> usize {
        s.as_ref().chars().filter(|c| c.is_whitespace()).count()
    }

    #[test]
    fn composes_decomposed_accents() {
        assert_eq!(normalize_exercise("Cre\u{0301}me Curls"), "Cr\u{e9}me Curls");
    }

    #[test]
    fn email_keeps_case() {
        assert_eq!(normalize_email(" Ana@Example.com\n"), "Ana@Example.com");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 2000, ..ProptestConfig::default()
        })]

        #[test]
        fn normalization_works(string in "(\\S.*\\S|\\S+)", space_before in "\\s*", space_after in "\\s*") {
            let normalized = normalize_exercise(format!("{}{}{}", space_before, string, space_after));

            prop_assert!(is_nfc(&normalized), "{:?} (normalized form of {:?}) is in NFC", normalized, string);

            prop_assert!(!normalized.starts_with(char::is_whitespace) && !normalized.ends_with(char::is_whitespace), "{:?} (normalized form of {:?}) has no leading or trailing whitespace", normalized, string);

            let trimmed = normalized.trim();

            prop_assert_eq!(count_whitespace(&normalized), count_whitespace(&trimmed), "{:?} (normalized form of {:?}) preserves inner whitespace", normalized, string);
        }
    }
}
