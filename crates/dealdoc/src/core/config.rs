//! Configuration loading and management.
//!
//! Extraction configuration can be loaded from TOML, YAML, or JSON files,
//! discovered by walking up from the current directory, or built in code.

use crate::{DealdocError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main extraction configuration.
///
/// All fields have defaults, so an empty file is a valid configuration.
///
/// # Example
///
/// ```rust
/// use dealdoc::core::config::ExtractionConfig;
///
/// let config = ExtractionConfig::default();
/// assert_eq!(config.pdf.max_pages, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Run the shared text normalizer on every extractor's output
    #[serde(default = "default_true")]
    pub enable_cleaning: bool,

    /// Final plausibility gate applied to every successful extraction
    #[serde(default = "default_min_output_chars")]
    pub min_output_chars: usize,

    /// Maximum concurrent extractions in batch operations (None = num_cpus * 2)
    #[serde(default)]
    pub max_concurrent_extractions: Option<usize>,

    /// PDF cascade options
    #[serde(default)]
    pub pdf: PdfConfig,

    /// DOCX options
    #[serde(default)]
    pub docx: DocxConfig,
}

/// PDF cascade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Page cap for the content-stream strategy
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Gate for the structured (text-layer) strategy
    #[serde(default = "default_structured_min_chars")]
    pub structured_min_chars: usize,

    /// Gate for the content-stream strategy (page delimiters excluded)
    #[serde(default = "default_content_stream_min_chars")]
    pub content_stream_min_chars: usize,

    /// Gate for the raw byte-pattern scan
    #[serde(default = "default_raw_scan_min_chars")]
    pub raw_scan_min_chars: usize,
}

/// DOCX configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocxConfig {
    /// Minimum characters after DOCX post-cleaning
    #[serde(default = "default_docx_min_chars")]
    pub min_chars: usize,
}

fn default_true() -> bool {
    true
}
fn default_min_output_chars() -> usize {
    5
}
fn default_max_pages() -> usize {
    10
}
fn default_structured_min_chars() -> usize {
    50
}
fn default_content_stream_min_chars() -> usize {
    20
}
fn default_raw_scan_min_chars() -> usize {
    10
}
fn default_docx_min_chars() -> usize {
    10
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            enable_cleaning: true,
            min_output_chars: default_min_output_chars(),
            max_concurrent_extractions: None,
            pdf: PdfConfig::default(),
            docx: DocxConfig::default(),
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            structured_min_chars: default_structured_min_chars(),
            content_stream_min_chars: default_content_stream_min_chars(),
            raw_scan_min_chars: default_raw_scan_min_chars(),
        }
    }
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self {
            min_chars: default_docx_min_chars(),
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `DealdocError::Validation` if the file can't be read, is invalid
    /// TOML, or fails [`ExtractionConfig::validate`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| DealdocError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| DealdocError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| DealdocError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, choosing the parser from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(DealdocError::validation(format!(
                "Unsupported config file format: {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Discover `dealdoc.toml` in the current directory or any parent.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(DealdocError::Io)?;

        loop {
            let candidate = current.join("dealdoc.toml");
            if candidate.exists() {
                tracing::debug!("Discovered config file at {}", candidate.display());
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    /// Reject configurations the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.pdf.max_pages == 0 {
            return Err(DealdocError::validation("pdf.max_pages must be at least 1"));
        }
        if self.max_concurrent_extractions == Some(0) {
            return Err(DealdocError::validation(
                "max_concurrent_extractions must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DealdocError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
