use serde::{Deserialize, Serialize};

/// Prefix that marks a top-level Markdown heading.
pub const TOP_LEVEL_HEADING: &str = "# ";

/// Heading keywords (matched case-insensitively) that mark the template section.
pub const TEMPLATE_KEYWORDS: [&str; 4] = ["protokoll", "mall", "template", "dokumentation"];

/// A top-level heading line found in an agenda document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading<'a> {
    /// Zero-based line index within the document
    pub line: usize,

    /// Full heading line, including the `# ` prefix
    pub text: &'a str,
}

impl Heading<'_> {
    /// Whether this heading names the fill-in template section
    pub fn marks_template(&self) -> bool {
        let lowered = self.text.to_lowercase();
        TEMPLATE_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
    }
}

/// The two sections of an imported agenda document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaSections {
    /// Introductory agenda content
    pub first_section: String,

    /// Fill-in template content, empty when no template section was found
    pub second_section: String,
}

impl AgendaSections {
    pub fn has_template(&self) -> bool {
        !self.second_section.is_empty()
    }
}

/// Collect every top-level heading, in document order.
///
/// Lines are split on `\n` only, so a `\r` left over from CRLF input stays
/// part of the line and survives a re-join.
pub fn top_level_headings(text: &str) -> Vec<Heading<'_>> {
    text.split('\n')
        .enumerate()
        .filter(|(_, line)| line.starts_with(TOP_LEVEL_HEADING))
        .map(|(line, text)| Heading { line, text })
        .collect()
}

/// Line index where the template section starts, if any.
///
/// The first keyword heading wins; otherwise the second top-level heading is
/// used when there are at least two.
pub fn template_start(headings: &[Heading<'_>]) -> Option<usize> {
    headings
        .iter()
        .find(|heading| heading.marks_template())
        .or_else(|| headings.get(1))
        .map(|heading| heading.line)
}

/// Split an agenda document into its agenda and template sections.
///
/// Pure and total: every input yields a result, malformed Markdown included.
pub fn split_agenda(text: &str) -> AgendaSections {
    if text.trim().is_empty() {
        return AgendaSections::default();
    }

    let headings = top_level_headings(text);

    match template_start(&headings) {
        Some(start) => {
            let lines: Vec<&str> = text.split('\n').collect();
            AgendaSections {
                first_section: lines[..start].join("\n"),
                second_section: lines[start..].join("\n"),
            }
        }
        None => AgendaSections {
            first_section: text.to_string(),
            second_section: String::new(),
        },
    }
}
