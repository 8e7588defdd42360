// Integration tests for splitting an agenda document into agenda and template

use meeting_assistant::agenda::{split_agenda, template_start, top_level_headings};

#[test]
fn test_split_concrete_example() {
    let doc = "# Agenda\nIntro text\n# Mall för möte\n## Sammanfattning\n";
    let sections = split_agenda(doc);

    assert_eq!(sections.first_section, "# Agenda\nIntro text");
    assert_eq!(sections.second_section, "# Mall för möte\n## Sammanfattning\n");
}

#[test]
fn test_empty_and_whitespace_input() {
    for input in ["", "   ", "\n\n\t\n"] {
        let sections = split_agenda(input);
        assert_eq!(sections.first_section, "");
        assert_eq!(sections.second_section, "");
    }
}

#[test]
fn test_no_top_level_headings() {
    let inputs = [
        "Just some notes\nwith two lines",
        "## Only second level\ntext\n## Another",
        "#NoSpace heading\n  # indented heading",
    ];

    for input in inputs {
        let sections = split_agenda(input);
        assert_eq!(sections.first_section, input);
        assert_eq!(sections.second_section, "");
    }
}

#[test]
fn test_single_heading_keeps_everything_in_first_section() {
    let input = "# Styrgruppsmöte\n- Punkt 1\n- Punkt 2";
    let sections = split_agenda(input);

    assert_eq!(sections.first_section, input);
    assert_eq!(sections.second_section, "");
    assert!(!sections.has_template());
}

#[test]
fn test_single_keyword_heading_starts_template() {
    // A lone keyword heading still marks the template, even on the first line
    let sections = split_agenda("# Mötesmall\n## Beslut");
    assert_eq!(sections.first_section, "");
    assert_eq!(sections.second_section, "# Mötesmall\n## Beslut");
}

#[test]
fn test_fallback_to_second_heading() {
    let sections = split_agenda("# Agenda\nPunkter\n# Anteckningar\nText");

    assert_eq!(sections.first_section, "# Agenda\nPunkter");
    assert_eq!(sections.second_section, "# Anteckningar\nText");
}

#[test]
fn test_keyword_beats_position() {
    // The first heading carries the keyword, so the template starts there
    let sections = split_agenda("# MALL\nfält\n# Övrigt\nmer");

    assert_eq!(sections.first_section, "");
    assert_eq!(sections.second_section, "# MALL\nfält\n# Övrigt\nmer");
}

#[test]
fn test_first_keyword_match_wins() {
    let doc = "# Agenda\na\n# Protokoll\nb\n# Template\nc";
    let sections = split_agenda(doc);

    assert_eq!(sections.first_section, "# Agenda\na");
    assert_eq!(sections.second_section, "# Protokoll\nb\n# Template\nc");
}

#[test]
fn test_keywords_are_case_insensitive() {
    for heading in ["# DOKUMENTATION", "# Template v2", "# protokoll", "# Mötesmall"] {
        let doc = format!("# Agenda\nx\n# Bakgrund\ny\n{}\nz", heading);
        let sections = split_agenda(&doc);
        assert!(
            sections.second_section.starts_with(heading),
            "{} should start the template",
            heading
        );
    }
}

#[test]
fn test_three_plain_headings_pick_the_second() {
    let sections = split_agenda("# A\n1\n# B\n2\n# C\n3");

    assert_eq!(sections.first_section, "# A\n1");
    assert_eq!(sections.second_section, "# B\n2\n# C\n3");
}

#[test]
fn test_crlf_lines_survive() {
    let doc = "# Agenda\r\nIntro\r\n# Mall\r\nFält";
    let sections = split_agenda(doc);

    assert_eq!(sections.first_section, "# Agenda\r\nIntro\r");
    assert_eq!(sections.second_section, "# Mall\r\nFält");
}

#[test]
fn test_resplitting_is_stable() {
    let docs = [
        "# Agenda\nIntro text\n# Mall för möte\n## Sammanfattning\n",
        "# A\n1\n# B\n2\n# C\n3",
        "notes\n# Mall\nfält",
        "intro\n\n# Agenda\n\n# Protokoll\n## Beslut\n\n",
    ];

    for doc in docs {
        let first = split_agenda(doc);
        assert!(first.has_template());

        let rebuilt = format!("{}\n{}", first.first_section, first.second_section);
        assert_eq!(rebuilt, doc);
        assert_eq!(split_agenda(&rebuilt), first);
    }
}

#[test]
fn test_splitting_is_deterministic() {
    let doc = "# Agenda\nx\n# Notes\ny";
    assert_eq!(split_agenda(doc), split_agenda(doc));
}

#[test]
fn test_heading_helpers() {
    let doc = "intro\n# Agenda\n## Sub\n# Mall";
    let headings = top_level_headings(doc);

    let lines: Vec<usize> = headings.iter().map(|h| h.line).collect();
    assert_eq!(lines, [1, 3]);
    assert_eq!(template_start(&headings), Some(3));
    assert_eq!(template_start(&headings[..1]), None);
}
