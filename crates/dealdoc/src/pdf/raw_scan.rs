//! Last cascade strategy: pattern scan over the raw bytes.
//!
//! Used when the file is too damaged for any parser. The bytes are read as
//! Latin-1 and scanned for text-showing arrays (`[(...) -250 (...)] TJ`),
//! literal strings `(...)`, hex strings `<...>` and runs of plain words that
//! sit outside those constructs. Binary (compressed) stream data is skipped.

use super::cascade::PdfStrategy;
use super::content_stream::decode_pdf_string;
use crate::Result;
use crate::core::config::PdfConfig;
use crate::types::{ExtractionStrategy, RawExtraction};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

const KERNING_SPACE_THRESHOLD: f64 = -100.0;
/// Stream data with more than this share of non-text bytes is treated as binary.
const BINARY_STREAM_RATIO: f64 = 0.10;
/// Only the head of each stream is inspected to classify it.
const BINARY_SAMPLE_BYTES: usize = 1024;
const MIN_WORDS_IN_RUN: usize = 4;

static NAME_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/[^\s/<>\[\]()]*").expect("PDF name token regex pattern is valid and should compile")
});
static ALPHA_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z]{2,}(?:\s+[A-Za-z]{2,}){3,}").expect("Alphabetic run regex pattern is valid and should compile")
});
static DATE_STAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^D:\d{4}").expect("PDF date stamp regex pattern is valid and should compile")
});

static PDF_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "obj", "endobj", "stream", "endstream", "xref", "trailer", "startxref", "true", "false", "null", "BT",
        "ET", "Tf", "Td", "TD", "Tj", "TJ", "Tm", "Tc", "Tw", "Tz", "TL", "Tr", "Ts", "re", "cm", "Do", "BI",
        "EI", "ID", "BDC", "BMC", "EMC", "rg", "RG", "gs", "Type", "Page", "Pages", "Catalog", "Font", "Filter",
        "FlateDecode", "Length", "Root", "Info", "Kids", "Count", "Parent", "Resources", "Contents", "MediaBox",
        "Subtype", "BaseFont", "Encoding", "ProcSet", "XObject", "Producer", "Creator", "CreationDate",
        "ModDate",
    ]
    .into_iter()
    .collect()
});

/// Scans raw bytes for anything that looks like text.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawScanStrategy;

#[async_trait]
impl PdfStrategy for RawScanStrategy {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::PdfRawScan
    }

    fn min_chars(&self, config: &PdfConfig) -> usize {
        config.raw_scan_min_chars
    }

    async fn extract(&self, content: &[u8], _config: &PdfConfig) -> Result<RawExtraction> {
        let text = crate::utils::run_blocking_guarded("raw-scan", content, |bytes| Ok(scan_raw_text(bytes))).await?;
        Ok(RawExtraction::new(text, ExtractionStrategy::PdfRawScan))
    }
}

/// Recover text fragments from raw PDF bytes, joined by spaces in file order.
///
/// Runs in time linear in the input (up to a log factor): stream extents and
/// literal-string extents are located in up-front passes, so an unterminated
/// `(`, `[` or `stream` never triggers a rescan of the rest of the buffer.
pub fn scan_raw_text(content: &[u8]) -> String {
    let layout = ByteLayout::new(content);
    let mut fragments: Vec<String> = Vec::new();
    let mut gap_start = 0;
    let mut i = 0;

    while i < content.len() {
        let token = match content[i] {
            b'[' => read_text_array(content, i, &layout),
            b'(' => read_literal(content, i, &layout),
            b'<' if content.get(i + 1) != Some(&b'<') => read_hex(content, i),
            b's' => {
                if let Some(end) = layout.binary_stream_at(i) {
                    collect_plaintext_runs(&content[gap_start..i], &mut fragments);
                    i = end;
                    gap_start = end;
                    continue;
                }
                None
            }
            _ => None,
        };

        match token {
            Some((text, end)) => {
                collect_plaintext_runs(&content[gap_start..i], &mut fragments);
                if looks_like_text(&text) {
                    fragments.push(text.trim().to_string());
                }
                i = end;
                gap_start = end;
            }
            None => i += 1,
        }
    }
    collect_plaintext_runs(&content[gap_start..], &mut fragments);

    fragments.join(" ")
}

/// Where binary streams and balanced literal strings sit in the buffer.
struct ByteLayout {
    /// `(stream keyword offset, end of stream data)`, sorted by offset
    binary_streams: Vec<(usize, usize)>,
    /// `(open paren offset, matching close paren offset)`, sorted by offset
    literals: Vec<(usize, usize)>,
}

impl ByteLayout {
    fn new(content: &[u8]) -> Self {
        let binary_streams = find_binary_streams(content);
        let literals = match_literals(content, &binary_streams);
        Self {
            binary_streams,
            literals,
        }
    }

    fn binary_stream_at(&self, keyword: usize) -> Option<usize> {
        self.binary_streams
            .binary_search_by_key(&keyword, |&(start, _)| start)
            .ok()
            .map(|index| self.binary_streams[index].1)
    }

    fn literal_close(&self, open: usize) -> Option<usize> {
        self.literals
            .binary_search_by_key(&open, |&(start, _)| start)
            .ok()
            .map(|index| self.literals[index].1)
    }
}

/// Every `stream` keyword whose data looks binary, with the end of that data.
fn find_binary_streams(content: &[u8]) -> Vec<(usize, usize)> {
    let endstreams: Vec<usize> = memchr::memmem::find_iter(content, b"endstream").collect();
    let mut streams = Vec::new();
    let mut skip_until = 0;

    for keyword in memchr::memmem::find_iter(content, b"stream") {
        if keyword < skip_until || (keyword > 0 && content[keyword - 1].is_ascii_alphabetic()) {
            continue;
        }

        let mut data_start = keyword + b"stream".len();
        if content.get(data_start) == Some(&b'\r') {
            data_start += 1;
        }
        if content.get(data_start) == Some(&b'\n') {
            data_start += 1;
        }

        let next_end = endstreams.partition_point(|&offset| offset < data_start);
        let data_end = endstreams.get(next_end).copied().unwrap_or(content.len());
        let data = &content[data_start..data_end];
        if !data.is_empty() && is_binary(&data[..data.len().min(BINARY_SAMPLE_BYTES)]) {
            streams.push((keyword, data_end));
            skip_until = data_end;
        }
    }

    streams
}

fn is_binary(sample: &[u8]) -> bool {
    let binary = sample
        .iter()
        .filter(|&&b| !(b.is_ascii_graphic() || b.is_ascii_whitespace()))
        .count();
    binary as f64 / sample.len() as f64 > BINARY_STREAM_RATIO
}

/// Pair parentheses with a single stack pass, honoring backslash escapes and
/// ignoring binary stream data. Unbalanced opens get no entry.
fn match_literals(content: &[u8], binary_streams: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut streams = binary_streams.iter().peekable();
    let mut i = 0;

    while i < content.len() {
        if let Some(&&(start, end)) = streams.peek()
            && i >= start
        {
            streams.next();
            i = i.max(end);
            continue;
        }

        match content[i] {
            b'\\' => i += 1,
            b'(' => open.push(i),
            b')' => {
                if let Some(start) = open.pop() {
                    pairs.push((start, i));
                }
            }
            _ => {}
        }
        i += 1;
    }

    pairs.sort_unstable();
    pairs
}

/// `[...]` made only of strings and numbers, as used by `TJ`.
fn read_text_array(content: &[u8], start: usize, layout: &ByteLayout) -> Option<(String, usize)> {
    let mut text = String::new();
    let mut has_string = false;
    let mut i = start + 1;

    while i < content.len() {
        match content[i] {
            b']' => return has_string.then_some((text, i + 1)),
            b'(' => {
                let (literal, end) = read_literal(content, i, layout)?;
                text.push_str(&literal);
                has_string = true;
                i = end;
            }
            b'<' if content.get(i + 1) != Some(&b'<') => {
                let (hex, end) = read_hex(content, i)?;
                text.push_str(&hex);
                has_string = true;
                i = end;
            }
            b'-' | b'+' | b'.' | b'0'..=b'9' => {
                let end = content[i..]
                    .iter()
                    .position(|b| !matches!(b, b'-' | b'+' | b'.' | b'0'..=b'9'))
                    .map_or(content.len(), |offset| i + offset);
                let number = std::str::from_utf8(&content[i..end])
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok());
                if number.is_some_and(|n| n < KERNING_SPACE_THRESHOLD) {
                    text.push(' ');
                }
                i = end;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => return None,
        }
    }

    None
}

/// Balanced literal string with escape decoding.
fn read_literal(content: &[u8], start: usize, layout: &ByteLayout) -> Option<(String, usize)> {
    let close = layout.literal_close(start)?;
    let body = &content[start + 1..close];
    let mut bytes = Vec::with_capacity(body.len());
    let mut i = 0;

    while i < body.len() {
        if body[i] != b'\\' {
            bytes.push(body[i]);
            i += 1;
            continue;
        }

        i += 1;
        let Some(&escaped) = body.get(i) else {
            break;
        };
        match escaped {
            b'n' => bytes.push(b'\n'),
            b'r' => bytes.push(b'\r'),
            b't' => bytes.push(b'\t'),
            b'b' => bytes.push(0x08),
            b'f' => bytes.push(0x0C),
            b'0'..=b'7' => {
                let digits = body[i..]
                    .iter()
                    .take(3)
                    .take_while(|b| (b'0'..=b'7').contains(b))
                    .count();
                let value = body[i..i + digits]
                    .iter()
                    .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                bytes.push((value & 0xFF) as u8);
                i += digits;
                continue;
            }
            b'\r' => {
                if body.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => {}
            other => bytes.push(other),
        }
        i += 1;
    }

    Some((decode_pdf_string(&bytes), close + 1))
}

/// Hex string `<48656C6C6F>`; odd digit counts are padded with `0`.
///
/// Stops at the first byte that is neither a hex digit nor whitespace, so a
/// failed attempt never reads past the next `<`.
fn read_hex(content: &[u8], start: usize) -> Option<(String, usize)> {
    let mut digits = Vec::new();
    let mut i = start + 1;

    while i < content.len() {
        let b = content[i];
        match b {
            b'>' => {
                if digits.is_empty() {
                    return None;
                }
                if digits.len() % 2 == 1 {
                    digits.push(0);
                }
                let bytes: Vec<u8> = digits.chunks_exact(2).map(|pair| (pair[0] << 4) | pair[1]).collect();
                return Some((decode_pdf_string(&bytes), i + 1));
            }
            b if b.is_ascii_whitespace() => {}
            b => digits.push(hex_value(b)?),
        }
        i += 1;
    }

    None
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Words outside strings, with name tokens and PDF keywords removed.
fn collect_plaintext_runs(gap: &[u8], fragments: &mut Vec<String>) {
    if gap.is_empty() {
        return;
    }

    let latin1: String = gap.iter().map(|&b| b as char).collect();
    let without_names = NAME_TOKEN.replace_all(&latin1, " ");

    for run in ALPHA_RUN.find_iter(&without_names) {
        let words: Vec<&str> = run
            .as_str()
            .split_whitespace()
            .filter(|word| !PDF_KEYWORDS.contains(word))
            .collect();
        if words.len() >= MIN_WORDS_IN_RUN {
            fragments.push(words.join(" "));
        }
    }
}

fn looks_like_text(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || DATE_STAMP.is_match(trimmed) {
        return false;
    }

    let total = trimmed.chars().count();
    let readable = trimmed
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_ascii_punctuation() || c.is_whitespace())
        .count();
    let has_letter = trimmed.chars().any(char::is_alphabetic);

    has_letter && readable * 10 >= total * 8
}
