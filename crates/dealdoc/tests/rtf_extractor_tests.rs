//! RTF extraction integration tests.
//!
//! Exercises the full pipeline (detection, stripping passes, normalization)
//! on documents shaped like what word processors actually emit.

use dealdoc::{ExtractionConfig, ExtractionStrategy, extract_bytes, extract_file};
use std::fs;
use tempfile::TempDir;

const WORDPAD_RTF: &str = r"{\rtf1\ansi\ansicpg1252\deff0\nouicompat{\fonttbl{\f0\fnil\fcharset0 Calibri;}}
{\colortbl ;\red255\green0\blue0;}
{\*\generator Riched20 10.0.19041}\viewkind4\uc1
\pard\sa200\sl276\slmult1\b\f0\fs22\lang9 D\'e9claration of Intent\b0\par
Caf\u233? terms \{confidential\}\par
{\*\bkmkstart scope}Second paragraph\par
}";

#[tokio::test]
async fn test_wordpad_document() {
    let extracted = extract_bytes(WORDPAD_RTF.as_bytes(), "application/rtf", &ExtractionConfig::default())
        .await
        .into_result()
        .unwrap();

    assert_eq!(extracted.method, ExtractionStrategy::RtfParse);
    assert_eq!(
        extracted.text,
        "D\u{e9}claration of Intent Caf\u{e9} terms {confidential} Second paragraph"
    );
}

#[tokio::test]
async fn test_no_markup_leaks() {
    let extracted = extract_bytes(WORDPAD_RTF.as_bytes(), "text/rtf", &ExtractionConfig::default())
        .await
        .into_result()
        .unwrap();

    for leaked in ["\\", "Calibri", "Riched20", "red255", "fcharset"] {
        assert!(!extracted.text.contains(leaked), "Leaked {:?} into {:?}", leaked, extracted.text);
    }
}

#[tokio::test]
async fn test_unbalanced_rtf_falls_back_to_crude_strip() {
    let outcome = extract_bytes(
        br"{\rtf1\ansi Unclosed draft text",
        "application/rtf",
        &ExtractionConfig::default(),
    )
    .await;

    assert_eq!(outcome.text(), Some("Unclosed draft text"));
}

#[tokio::test]
async fn test_markup_only_rtf_is_insufficient() {
    let outcome = extract_bytes(
        br"{\rtf1\ansi{\fonttbl{\f0 Arial;}}\pard\par}",
        "application/rtf",
        &ExtractionConfig::default(),
    )
    .await;

    assert!(!outcome.is_success());
}

#[tokio::test]
async fn test_rtf_file_detected_by_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("minutes.rtf");
    fs::write(&path, WORDPAD_RTF).unwrap();

    let outcome = extract_file(&path, None, &ExtractionConfig::default()).await.unwrap();

    assert_eq!(outcome.method(), Some(ExtractionStrategy::RtfParse));
    assert!(outcome.text().unwrap().contains("Second paragraph"));
}

#[tokio::test]
async fn test_rtf_extraction_is_deterministic() {
    let config = ExtractionConfig::default();
    let first = extract_bytes(WORDPAD_RTF.as_bytes(), "application/rtf", &config).await;
    let second = extract_bytes(WORDPAD_RTF.as_bytes(), "application/rtf", &config).await;
    assert_eq!(first, second);
}
