use indexmap::IndexMap;

/// Map each `## ` heading to the text below it, in document order.
///
/// Lines before the first second-level heading are dropped. Leading blank
/// lines of a section are skipped and a repeated heading starts over.
pub fn sections_by_heading(markdown: &str) -> IndexMap<String, String> {
    let mut sections: IndexMap<String, String> = IndexMap::new();
    let mut current: Option<String> = None;

    for line in markdown.lines() {
        if let Some(title) = second_level_title(line) {
            sections.insert(title.to_string(), String::new());
            current = Some(title.to_string());
            continue;
        }

        let Some(body) = current.as_ref().and_then(|key| sections.get_mut(key)) else {
            continue;
        };
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(line);
    }

    sections
}

fn second_level_title(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("##")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_lines_under_headings() {
        let doc = "# Möte\nintro\n## Beslut\n\n- Ja\n- Nej\n## Risker\nInga";
        let sections = sections_by_heading(doc);

        let keys: Vec<&str> = sections.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Beslut", "Risker"]);
        assert_eq!(sections["Beslut"], "- Ja\n- Nej");
        assert_eq!(sections["Risker"], "Inga");
    }

    #[test]
    fn third_level_headings_are_content() {
        let sections = sections_by_heading("## A\n### Sub\ntext");
        assert_eq!(sections["A"], "### Sub\ntext");
    }

    #[test]
    fn no_sections() {
        assert!(sections_by_heading("# Only\nbody").is_empty());
    }
}
