//! Downloadable renditions of a filled meeting document

mod archive;
mod json;
mod word;

pub use archive::zip_directory;
pub use json::sections_by_heading;
pub use word::to_word_html;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Md,
    Json,
    Doc,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported format: {0}")]
pub struct UnsupportedFormat(pub String);

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Md => "md",
            ExportFormat::Json => "json",
            ExportFormat::Doc => "doc",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Md => "text/markdown; charset=utf-8",
            ExportFormat::Json => "application/json; charset=utf-8",
            ExportFormat::Doc => "application/vnd.ms-word; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = UnsupportedFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(ExportFormat::Md),
            "json" => Ok(ExportFormat::Json),
            "doc" | "word" => Ok(ExportFormat::Doc),
            other => Err(UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Render `filled` in the requested format
pub fn render(format: ExportFormat, filled: &str) -> Result<String, serde_json::Error> {
    match format {
        ExportFormat::Md => Ok(filled.to_string()),
        ExportFormat::Json => serde_json::to_string_pretty(&sections_by_heading(filled)),
        ExportFormat::Doc => Ok(to_word_html(filled)),
    }
}

pub fn content_disposition(name: &str, format: ExportFormat) -> String {
    attachment(name, format.extension())
}

/// `attachment; filename="<name>.<ext>"`, with quotes and path separators
/// stripped from the name
pub fn attachment(name: &str, extension: &str) -> String {
    let name: String = name
        .chars()
        .filter(|c| !matches!(c, '"' | '/' | '\\' | '\r' | '\n'))
        .collect();
    format!("attachment; filename=\"{}.{}\"", name, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats() {
        assert_eq!("md".parse::<ExportFormat>(), Ok(ExportFormat::Md));
        assert_eq!("JSON".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert_eq!("doc".parse::<ExportFormat>(), Ok(ExportFormat::Doc));
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn disposition_strips_quotes() {
        assert_eq!(
            content_disposition("a\"b/c", ExportFormat::Doc),
            "attachment; filename=\"abc.doc\""
        );
    }
}
