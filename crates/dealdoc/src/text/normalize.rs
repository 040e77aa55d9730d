//! Shared cleanup for text produced by every extractor.
//!
//! [`normalize_text`] runs the individual passes in a fixed order:
//!
//! 1. [`strip_control_chars`]
//! 2. [`repair_missing_spaces`]
//! 3. [`normalize_whitespace`]
//!
//! The result is deterministic and idempotent: normalizing already-normalized
//! text returns it unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

static HORIZONTAL_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\S\n]+").expect("Horizontal whitespace regex pattern is valid and should compile"));
static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Excess newline regex pattern is valid and should compile"));

/// Minimum run of letters that makes a letter/digit boundary look like a
/// missing space rather than an identifier such as `A4` or `3rd`.
const MIN_WORD_RUN: usize = 3;

/// Run every cleaning pass in order.
///
/// # Example
///
/// ```rust
/// use dealdoc::text::normalize_text;
///
/// let cleaned = normalize_text("Total\u{0}  revenueGrew in\r\n\r\n\r\n\r\nQ3");
/// assert_eq!(cleaned, "Total revenue Grew in\n\nQ3");
/// ```
pub fn normalize_text(text: &str) -> String {
    let text = strip_control_chars(text);
    let text = repair_missing_spaces(&text);
    normalize_whitespace(&text)
}

/// Remove control characters below `0x20` (keeping `\n`, `\r`, `\t`) and `DEL`.
pub fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| !matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{7f}'))
        .collect()
}

/// Re-insert spaces that PDF and DOCX extraction commonly lose.
///
/// A space is inserted between:
/// - a lowercase letter and an uppercase letter that starts a capitalized word
///   (`wordWord` becomes `word Word`, `wordONE` is left alone);
/// - a letter and a digit when at least three letters precede the digit
///   (`page12` becomes `page 12`, `A4` is left alone);
/// - a digit and a letter when at least three letters follow the digit
///   (`2024Annual` becomes `2024 Annual`, `3rd` is left alone).
///
/// Every decision is made against the input, never against already-repaired
/// output, so a second pass finds nothing left to do. The heuristic is lossy
/// for names like `McDonald`.
pub fn repair_missing_spaces(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len() + text.len() / 16);

    for (i, &current) in chars.iter().enumerate() {
        if i > 0 && needs_space(&chars, i) {
            result.push(' ');
        }
        result.push(current);
    }

    result
}

fn needs_space(chars: &[char], i: usize) -> bool {
    let prev = chars[i - 1];
    let current = chars[i];

    if prev.is_lowercase() && current.is_uppercase() {
        return chars.get(i + 1).is_some_and(|next| next.is_lowercase());
    }

    if prev.is_alphabetic() && current.is_ascii_digit() {
        let letters_before = chars[..i].iter().rev().take_while(|c| c.is_alphabetic()).count();
        return letters_before >= MIN_WORD_RUN;
    }

    if prev.is_ascii_digit() && current.is_alphabetic() {
        let letters_after = chars[i..].iter().take_while(|c| c.is_alphabetic()).count();
        return letters_after >= MIN_WORD_RUN;
    }

    false
}

/// Normalize line endings and collapse whitespace.
///
/// `\r\n` and lone `\r` become `\n`, runs of horizontal whitespace become one
/// space, every line is trimmed, three or more consecutive newlines become
/// exactly two, and the whole text is trimmed.
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = HORIZONTAL_WHITESPACE.replace_all(&text, " ");

    let trimmed_lines = text.split('\n').map(str::trim).collect::<Vec<_>>().join("\n");
    let collapsed = EXCESS_NEWLINES.replace_all(&trimmed_lines, "\n\n");

    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_control_chars_keeps_line_structure() {
        assert_eq!(strip_control_chars("a\u{0}b\u{7}c\u{7f}d"), "abcd");
        assert_eq!(strip_control_chars("a\tb\r\nc\n"), "a\tb\r\nc\n");
        assert_eq!(strip_control_chars("caf\u{e9}"), "caf\u{e9}");
    }

    #[test]
    fn test_repair_lower_upper_boundary() {
        assert_eq!(repair_missing_spaces("revenueGrew"), "revenue Grew");
        assert_eq!(repair_missing_spaces("theCompanyAgrees"), "the Company Agrees");
    }

    #[test]
    fn test_repair_leaves_acronyms_alone() {
        assert_eq!(repair_missing_spaces("wordONE"), "wordONE");
        assert_eq!(repair_missing_spaces("HTTPServer"), "HTTPServer");
        assert_eq!(repair_missing_spaces("NDA"), "NDA");
    }

    #[test]
    fn test_repair_is_lossy_for_camel_case_names() {
        assert_eq!(repair_missing_spaces("McDonald"), "Mc Donald");
        assert_eq!(repair_missing_spaces("iPhone"), "i Phone");
    }

    #[test]
    fn test_repair_letter_digit_boundaries() {
        assert_eq!(repair_missing_spaces("page12"), "page 12");
        assert_eq!(repair_missing_spaces("2024Annual"), "2024 Annual");
        assert_eq!(repair_missing_spaces("A4"), "A4");
        assert_eq!(repair_missing_spaces("3rd"), "3rd");
        assert_eq!(repair_missing_spaces("mp3"), "mp3");
        assert_eq!(repair_missing_spaces("Q3"), "Q3");
    }

    #[test]
    fn test_repair_is_single_pass() {
        let once = repair_missing_spaces("abCd1efGh2024Closing");
        assert_eq!(repair_missing_spaces(&once), once);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \t  b  "), "a b");
        assert_eq!(normalize_whitespace("a\r\nb\rc"), "a\nb\nc");
        assert_eq!(normalize_whitespace("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_whitespace("a\n   \n \t \n  \nb"), "a\n\nb");
        assert_eq!(normalize_whitespace("a\n\nb"), "a\n\nb");
        assert_eq!(normalize_whitespace(" \n\t\n "), "");
    }

    #[test]
    fn test_normalize_text_runs_passes_in_order() {
        let input = "\u{1}Purchase\u{0}Agreement  dated\t2024March\r\n\r\n\r\n\r\n  Section12 applies ";
        assert_eq!(
            normalize_text(input),
            "Purchase Agreement dated 2024 March\n\nSection 12 applies"
        );
    }

    #[test]
    fn test_normalize_text_is_idempotent() {
        let samples = [
            "",
            "plain text",
            "wordWord wordONE page12 2024Annual 3rd A4",
            "  lots   of\t\tspace\r\n\r\n\r\n\r\nand\rlines  ",
            "\u{0}\u{1f}control\u{7f}chars",
            "--- Page 1 ---\nHello World\n\n--- Page 2 ---\nMore text",
            "unicode café ÉtéHiver naïveté",
        ];

        for sample in samples {
            let once = normalize_text(sample);
            assert_eq!(normalize_text(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_normalize_text_whitespace_only_becomes_empty() {
        assert_eq!(normalize_text(" \t\r\n \u{0} \n"), "");
    }
}
