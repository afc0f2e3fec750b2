//! Post-OCR text normalization for search queries.
//!
//! OCR engines routinely confuse the digits 0/1/5 with the letters o/l/s in
//! product descriptions, so accepted text is lowercased, trimmed, and run
//! through a fixed single-character substitution table. The substitution is
//! deliberately crude and collides with legitimate digit-bearing text
//! (stock codes), which is why callers keep the verbatim transcription
//! alongside the cleaned form.

/// Fixed single-character OCR corrections.
const SUBSTITUTIONS: &[(char, char)] = &[('0', 'o'), ('1', 'l'), ('5', 's')];

/// Lowercase, trim, then apply the substitution table. Idempotent: the
/// output contains none of the substituted digits, so a second pass is a
/// no-op.
pub fn clean_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    lowered
        .trim()
        .chars()
        .map(|c| {
            SUBSTITUTIONS
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(clean_text("  Red Alarm Clock  "), "red alarm clock");
    }

    #[test]
    fn substitutes_confusable_digits() {
        assert_eq!(clean_text("Hello 015"), "hello ols");
        assert_eq!(clean_text("Hello015"), "hellools");
    }

    #[test]
    fn leaves_other_digits_alone() {
        assert_eq!(clean_text("box of 6 teacups 234"), "box of 6 teacups 234");
    }

    #[test]
    fn is_idempotent() {
        for input in ["Hello 015", "  MIXED case 105  ", "plain text", "0510"] {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn collides_on_legitimate_codes() {
        // Known limitation: real stock codes lose their digits.
        assert_eq!(clean_text("SKU 22150"), "sku 22lso");
    }
}
