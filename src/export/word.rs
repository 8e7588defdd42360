use regex::Regex;
use std::sync::OnceLock;

const DOCUMENT_HEAD: &str = r#"<!DOCTYPE html>
<html xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:w="urn:schemas-microsoft-com:office:word" xmlns="http://www.w3.org/TR/REC-html40">
<head>
<meta charset="utf-8">
<meta name="ProgId" content="Word.Document">
<meta name="Generator" content="Microsoft Word 15">
<title>Mötesmall</title>
<style>
body { font-family: "Calibri", sans-serif; font-size: 11pt; line-height: 1.15; margin: 1in; }
h1 { font-size: 18pt; font-weight: bold; color: #2F5496; margin-top: 12pt; margin-bottom: 6pt; }
h2 { font-size: 14pt; font-weight: bold; color: #2F5496; margin-top: 12pt; margin-bottom: 6pt; }
h3 { font-size: 12pt; font-weight: bold; margin-top: 12pt; margin-bottom: 6pt; }
p { margin-bottom: 6pt; }
ul { margin-bottom: 6pt; }
li { margin-bottom: 3pt; }
</style>
</head>
<body>"#;

const DOCUMENT_TAIL: &str = "</body></html>";

/// Convert a filled markdown document to HTML that Word opens as a document.
///
/// Handles `#`..`###` headings, `- ` bullet lists, bold and italic; every
/// other line becomes a paragraph.
pub fn to_word_html(markdown: &str) -> String {
    let mut html = String::from(DOCUMENT_HEAD);
    let mut in_list = false;

    for line in markdown.lines().map(str::trim) {
        let is_item = line.starts_with("- ");
        if in_list && !is_item {
            html.push_str("</ul>");
            in_list = false;
        }

        if line.is_empty() {
            html.push_str("<p>&nbsp;</p>");
        } else if let Some(text) = line.strip_prefix("### ") {
            push_element(&mut html, "h3", &escape(text));
        } else if let Some(text) = line.strip_prefix("## ") {
            push_element(&mut html, "h2", &escape(text));
        } else if let Some(text) = line.strip_prefix("# ") {
            push_element(&mut html, "h1", &escape(text));
        } else if let Some(text) = line.strip_prefix("- ") {
            if !in_list {
                html.push_str("<ul>");
                in_list = true;
            }
            push_element(&mut html, "li", &inline(text));
        } else {
            push_element(&mut html, "p", &inline(line));
        }
    }

    if in_list {
        html.push_str("</ul>");
    }
    html.push_str(DOCUMENT_TAIL);
    html
}

fn push_element(html: &mut String, tag: &str, content: &str) {
    html.push('<');
    html.push_str(tag);
    html.push('>');
    html.push_str(content);
    html.push_str("</");
    html.push_str(tag);
    html.push('>');
}

fn escape(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

/// Escape, then turn `**bold**` and `*italic*` into markup
fn inline(text: &str) -> String {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    static ITALIC: OnceLock<Regex> = OnceLock::new();

    let bold = BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("Invalid bold regex"));
    let italic = ITALIC.get_or_init(|| Regex::new(r"\*(.*?)\*").expect("Invalid italic regex"));

    let escaped = escape(text);
    let with_bold = bold.replace_all(&escaped, "<strong>$1</strong>");
    italic.replace_all(&with_bold, "<em>$1</em>").into_owned()
}
