//! Tests for the markup pretty-printer.
mod common;
use akis::markup::format;
use common::SAMPLE_MARKUP;

#[test]
fn format_indents_with_two_space_steps() {
    let flat = r#"<?xml version="1.0" encoding="UTF-8"?><process name="P" version="1.0"><logic><if condition="x"><invoke stepId="1"/></if></logic></process>"#;

    let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<process name="P" version="1.0">
  <logic>
    <if condition="x">
      <invoke stepId="1"/>
    </if>
  </logic>
</process>"#;

    assert_eq!(format(flat), expected);
}

#[test]
fn format_keeps_text_content_on_one_line() {
    let flat = r#"<process name="P" version="1.0"><logic><invoke stepId="1"><exception idCondition="A">Return to intake</exception></invoke></logic></process>"#;

    let formatted = format(flat);
    assert!(
        formatted.contains(r#"      <exception idCondition="A">Return to intake</exception>"#)
    );
}

#[test]
fn format_is_idempotent_on_well_formed_markup() {
    let once = format(SAMPLE_MARKUP);
    let twice = format(&once);
    assert_eq!(once, twice);
}

#[test]
fn format_never_fails_on_malformed_input() {
    // Mismatched closing tag: structural parsing fails, the line heuristic
    // still applies.
    let malformed = "<alpha><beta>text</alpha>";
    let formatted = format(malformed);
    assert_eq!(formatted, "<alpha>\n  <beta>text</alpha>");
}

#[test]
fn format_is_idempotent_on_malformed_input() {
    let malformed = "<task><step><note>deep</step>";
    let once = format(malformed);
    let twice = format(&once);
    assert_eq!(once, twice);
}

#[test]
fn format_normalizes_existing_whitespace() {
    let ragged = "<process name=\"P\" version=\"1.0\">\n\n\n      <logic>  <if condition=\"x\"/>\n</logic></process>";
    let formatted = format(ragged);

    let expected = "<process name=\"P\" version=\"1.0\">\n  <logic>\n    <if condition=\"x\"/>\n  </logic>\n</process>";
    assert_eq!(formatted, expected);
}
