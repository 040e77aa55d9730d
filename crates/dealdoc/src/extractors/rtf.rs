//! RTF (Rich Text Format) extractor.
//!
//! Readable text is recovered with a fixed sequence of string passes rather
//! than a full RTF parser:
//!
//! 1. [`unwrap_header_group`] - drop the outer `{\rtf1 ...}` group
//! 2. [`remove_table_groups`] - font table, color table, stylesheet, info
//! 3. [`remove_control_groups`] - ignorable `{\* ...}` destinations, non-text
//!    destinations and groups without literal text
//! 4. [`strip_control_words`] - decode `\uN` and `\'hh`, turn `\par`, `\tab`,
//!    ... into whitespace, drop the rest
//! 5. [`strip_control_symbols`]
//! 6. [`strip_braces`]
//! 7. [`collapse_whitespace`]
//!
//! Later passes assume the noise removed by earlier ones is gone. When a
//! structural pass finds an unbalanced group the whole pipeline is replaced by
//! [`crude_strip`].

use crate::core::config::ExtractionConfig;
use crate::core::mime::DocumentFormat;
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractionStrategy, RawExtraction};
use crate::{DealdocError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Native RTF extractor.
pub struct RtfExtractor;

impl RtfExtractor {
    /// Create a new RTF extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Default for RtfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for RtfExtractor {
    fn name(&self) -> &str {
        "rtf-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Strips RTF control structures and returns the readable payload"
    }
}

#[async_trait]
impl DocumentExtractor for RtfExtractor {
    async fn extract_bytes(&self, content: &[u8], _config: &ExtractionConfig) -> Result<RawExtraction> {
        let rtf_content = String::from_utf8_lossy(content);
        let text = extract_text_from_rtf(&rtf_content);
        Ok(RawExtraction::new(text, ExtractionStrategy::RtfParse))
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Rtf
    }
}

// Private-use code points standing in for escaped literals while the passes
// run, so `\{` and `\}` survive brace stripping.
const ESCAPED_BACKSLASH: char = '\u{E000}';
const ESCAPED_OPEN_BRACE: char = '\u{E001}';
const ESCAPED_CLOSE_BRACE: char = '\u{E002}';

/// Groups removed wholesale in pass 2.
const TABLE_DESTINATIONS: &[&str] = &["fonttbl", "colortbl", "stylesheet", "info"];

/// Destinations that never hold document text, even without the `\*` marker.
const NON_TEXT_DESTINATIONS: &[&str] = &[
    "pict",
    "nonshppict",
    "shppict",
    "object",
    "objdata",
    "themedata",
    "colorschememapping",
    "latentstyles",
    "datastore",
    "xmlnstbl",
    "listtable",
    "listoverridetable",
    "rsidtbl",
    "generator",
    "filetbl",
    "revtbl",
    "pgdsctbl",
    "fldinst",
    "bkmkstart",
    "bkmkend",
];

static CONTROL_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\([a-zA-Z]+)(-?\d+)? ?").expect("RTF control word regex pattern is valid and should compile")
});
static UNICODE_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\u(-?\d+) ?(?:\\'[0-9a-fA-F]{2}|\?)?")
        .expect("RTF unicode escape regex pattern is valid and should compile")
});
static HEX_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\'([0-9a-fA-F]{2})").expect("RTF hex escape regex pattern is valid and should compile")
});
static CONTROL_SYMBOL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\[^a-zA-Z]?").expect("RTF control symbol regex pattern is valid and should compile")
});
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Whitespace regex pattern is valid and should compile"));
static CRUDE_CONTROL_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\\[^{}]*\}").expect("RTF crude control group regex pattern is valid and should compile")
});
static CRUDE_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\[a-zA-Z]+-?\d* ?|\\'[0-9a-fA-F]{2}|\\.").expect("RTF crude escape regex pattern is valid and should compile")
});

/// Extract readable text from RTF source.
///
/// Never fails: malformed input falls back to [`crude_strip`].
pub fn extract_text_from_rtf(content: &str) -> String {
    match parse_rtf(content) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(error = %e, "RTF structure is malformed, using crude strip");
            crude_strip(content)
        }
    }
}

fn parse_rtf(content: &str) -> Result<String> {
    let text = protect_escapes(content);
    let text = unwrap_header_group(&text)?;
    let text = remove_table_groups(&text)?;
    let text = remove_control_groups(&text)?;
    let text = strip_control_words(&text);
    let text = strip_control_symbols(&text);
    let text = strip_braces(&text);
    let text = collapse_whitespace(&text);
    Ok(restore_escapes(&text))
}

/// Pass 1: replace the outer `{\rtf1 ...}` group with its body.
///
/// Input without an `{\rtf` group is returned unchanged.
///
/// # Errors
///
/// `DealdocError::Parsing` when the header group is never closed.
pub fn unwrap_header_group(text: &str) -> Result<String> {
    let Some(start) = text.find("{\\rtf") else {
        return Ok(text.to_string());
    };

    let end = find_group_end(text.as_bytes(), start)
        .ok_or_else(|| DealdocError::parsing("RTF header group is not closed"))?;

    let body = &text[start + 1..end];
    let body = body
        .strip_prefix("\\rtf")
        .map(|rest| rest.trim_start_matches(|c: char| c.is_ascii_digit()))
        .unwrap_or(body);

    let mut result = String::with_capacity(text.len());
    result.push_str(&text[..start]);
    result.push_str(body);
    result.push_str(&text[end + 1..]);
    Ok(result)
}

/// Pass 2: remove the font table, color table, stylesheet and info groups.
pub fn remove_table_groups(text: &str) -> Result<String> {
    remove_groups(text, |group, _| {
        group_destination(group).is_some_and(|dest| TABLE_DESTINATIONS.contains(&dest))
    })
}

/// Pass 3: remove the remaining control groups that carry no document text.
///
/// A group is removed when it is an ignorable destination (`{\* ...}`), a
/// known non-text destination such as `\pict`, or a `{\...}` group with no
/// literal text. Any other group is kept; its braces go in pass 6.
pub fn remove_control_groups(text: &str) -> Result<String> {
    remove_groups(text, |group, has_literal_text| {
        let body = group[1..].trim_start();
        if !body.starts_with('\\') {
            return false;
        }
        if body.starts_with("\\*") {
            return true;
        }
        if group_destination(group).is_some_and(|dest| NON_TEXT_DESTINATIONS.contains(&dest)) {
            return true;
        }
        !has_literal_text
    })
}

/// Pass 4: decode escapes and drop control words.
///
/// `\uN` and `\'hh` (Windows-1252) are decoded first. Paragraph, line and row
/// breaks become newlines, tabs and cells become tabs, typographic control
/// words become their characters, everything else disappears together with
/// its numeric parameter and delimiter space.
pub fn strip_control_words(text: &str) -> String {
    let text = UNICODE_ESCAPE.replace_all(text, |caps: &Captures| {
        let code = caps[1].parse::<i32>().unwrap_or(0xFFFD);
        let code = if code < 0 { code + 0x10000 } else { code };
        let decoded = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}');
        protect_literal(decoded).to_string()
    });

    let text = HEX_ESCAPE.replace_all(&text, |caps: &Captures| {
        let byte = u8::from_str_radix(&caps[1], 16).unwrap_or(b'?');
        protect_literal(decode_windows_1252(byte)).to_string()
    });

    CONTROL_WORD
        .replace_all(&text, |caps: &Captures| control_word_replacement(&caps[1]))
        .into_owned()
}

/// Pass 5: drop control symbols (backslash followed by a non-letter).
///
/// `\~` becomes a space, `\_` a hyphen and a backslash-newline a newline.
pub fn strip_control_symbols(text: &str) -> String {
    CONTROL_SYMBOL
        .replace_all(text, |caps: &Captures| match &caps[0] {
            "\\~" => "\u{00A0}",
            "\\_" => "-",
            "\\\n" | "\\\r" => "\n",
            _ => "",
        })
        .into_owned()
}

/// Pass 6: drop leftover braces.
pub fn strip_braces(text: &str) -> String {
    text.chars().filter(|&c| c != '{' && c != '}').collect()
}

/// Pass 7: collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Fallback for input the structural passes cannot handle.
///
/// Drops innermost `{\...}` groups, every backslash escape and all braces,
/// then collapses whitespace.
pub fn crude_strip(content: &str) -> String {
    let text = protect_escapes(content);
    let text = CRUDE_CONTROL_GROUP.replace_all(&text, " ");
    let text = CRUDE_ESCAPE.replace_all(&text, " ");
    let text = strip_braces(&text);
    restore_escapes(&collapse_whitespace(&text))
}

fn control_word_replacement(word: &str) -> &'static str {
    match word {
        "par" | "line" | "row" | "sect" | "page" => "\n",
        "tab" | "cell" => "\t",
        "emdash" => "\u{2014}",
        "endash" => "\u{2013}",
        "bullet" => "\u{2022}",
        "lquote" => "\u{2018}",
        "rquote" => "\u{2019}",
        "ldblquote" => "\u{201C}",
        "rdblquote" => "\u{201D}",
        _ => "",
    }
}

/// Remove every group for which `should_remove` returns true.
///
/// `should_remove` receives the group text and whether the group or any group
/// nested in it holds literal text. Groups that are kept are scanned further,
/// so nested groups are judged individually.
fn remove_groups(text: &str, mut should_remove: impl FnMut(&str, bool) -> bool) -> Result<String> {
    let groups = scan_groups(text)?;
    let bytes = text.as_bytes();
    let mut result = String::with_capacity(text.len());
    let mut copied_to = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'{' => {
                let group = groups
                    .binary_search_by_key(&i, |group| group.open)
                    .map(|index| &groups[index])
                    .map_err(|_| DealdocError::parsing(format!("Unbalanced RTF group at byte {}", i)))?;
                if should_remove(&text[i..=group.close], group.has_literal_text) {
                    result.push_str(&text[copied_to..i]);
                    copied_to = group.close + 1;
                    i = group.close + 1;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    if copied_to < text.len() {
        result.push_str(&text[copied_to..]);
    }
    Ok(result)
}

struct GroupSpan {
    open: usize,
    close: usize,
    has_literal_text: bool,
}

/// Match every brace pair in one pass, sorted by opening offset.
///
/// Literal text is anything other than control words, control symbols,
/// whitespace, braces and `;`. A `\'hh` escape counts as literal text.
fn scan_groups(text: &str) -> Result<Vec<GroupSpan>> {
    let bytes = text.as_bytes();
    let mut groups = Vec::new();
    let mut open: Vec<(usize, bool)> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let (len, literal) = match bytes[i] {
            b'\\' => escape_extent(text, i),
            b'{' => {
                open.push((i, false));
                (1, false)
            }
            b'}' => {
                if let Some((start, has_literal_text)) = open.pop() {
                    groups.push(GroupSpan {
                        open: start,
                        close: i,
                        has_literal_text,
                    });
                    if has_literal_text && let Some(parent) = open.last_mut() {
                        parent.1 = true;
                    }
                }
                (1, false)
            }
            b';' => (1, false),
            b if b.is_ascii() => (1, !b.is_ascii_whitespace()),
            _ => {
                let c = text[i..].chars().next().unwrap_or('\u{FFFD}');
                (c.len_utf8(), !c.is_whitespace())
            }
        };

        if literal && let Some(current) = open.last_mut() {
            current.1 = true;
        }
        i += len;
    }

    if let Some(&(start, _)) = open.first() {
        return Err(DealdocError::parsing(format!("Unbalanced RTF group at byte {}", start)));
    }

    groups.sort_unstable_by_key(|group| group.open);
    Ok(groups)
}

/// Length of the escape starting at the backslash at `start`, and whether it
/// stands for literal text.
fn escape_extent(text: &str, start: usize) -> (usize, bool) {
    let bytes = text.as_bytes();
    let at = |offset: usize| bytes.get(start + offset).copied();

    match at(1) {
        Some(b'\'') if at(2).is_some_and(|b| b.is_ascii_hexdigit()) && at(3).is_some_and(|b| b.is_ascii_hexdigit()) => {
            (4, true)
        }
        Some(b) if b.is_ascii_alphabetic() => {
            let mut len = 1;
            while at(len).is_some_and(|b| b.is_ascii_alphabetic()) {
                len += 1;
            }
            if at(len) == Some(b'-') && at(len + 1).is_some_and(|b| b.is_ascii_digit()) {
                len += 1;
            }
            while at(len).is_some_and(|b| b.is_ascii_digit()) {
                len += 1;
            }
            if at(len) == Some(b' ') {
                len += 1;
            }
            (len, false)
        }
        Some(_) => {
            let symbol = text[start + 1..].chars().next().map_or(1, char::len_utf8);
            (1 + symbol, false)
        }
        None => (1, false),
    }
}

/// Index of the `}` closing the group opened at `start`.
fn find_group_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Destination control word of a group: `{\*\fonttbl ...}` -> `fonttbl`.
fn group_destination(group: &str) -> Option<&str> {
    let body = group.strip_prefix('{')?.trim_start();
    let body = body.strip_prefix("\\*").unwrap_or(body);
    let word = body.strip_prefix('\\')?;
    let len = word.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(word.len());
    (len > 0).then(|| &word[..len])
}

fn protect_escapes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('\\') => {
                    chars.next();
                    result.push(ESCAPED_BACKSLASH);
                    continue;
                }
                Some('{') => {
                    chars.next();
                    result.push(ESCAPED_OPEN_BRACE);
                    continue;
                }
                Some('}') => {
                    chars.next();
                    result.push(ESCAPED_CLOSE_BRACE);
                    continue;
                }
                _ => {}
            }
        }
        result.push(c);
    }

    result
}

fn restore_escapes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ESCAPED_BACKSLASH => '\\',
            ESCAPED_OPEN_BRACE => '{',
            ESCAPED_CLOSE_BRACE => '}',
            other => other,
        })
        .collect()
}

fn protect_literal(c: char) -> char {
    match c {
        '\\' => ESCAPED_BACKSLASH,
        '{' => ESCAPED_OPEN_BRACE,
        '}' => ESCAPED_CLOSE_BRACE,
        other => other,
    }
}

/// Windows-1252 differs from Latin-1 only in `0x80..=0x9F`.
fn decode_windows_1252(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        0x81 | 0x8D | 0x8F | 0x90 | 0x9D => '?',
        _ => byte as char,
    }
}
