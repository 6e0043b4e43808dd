use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesStart, BytesText, Event};
use regex::Regex;
use std::sync::LazyLock;

/// Two-space indentation unit.
const PADDING: &str = "  ";

/// Breaks adjacent `><` tag boundaries onto separate lines.
static TAG_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"><").unwrap());
/// A line carrying content and ending in a closing tag, e.g. `<a>text</a>`.
static SAME_LINE_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r".+</\w[^>]*>$").unwrap());
/// A line starting with a closing tag.
static LEADING_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^</\w").unwrap());
/// A line starting with an opening tag that is not self-closed.
static LEADING_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<\w[^>]*[^/]>.*$").unwrap());

/// Re-indents markup text. Never fails.
///
/// If the text parses as a well-formed document it is first re-serialized
/// (normalizing whitespace between elements), then indented line by line.
/// If parsing fails, the same line heuristic is applied to the raw text as a
/// best effort; no well-formedness is validated in that mode.
pub fn format(markup: &str) -> String {
    match reserialize(markup) {
        Ok(flat) => indent(&flat, false),
        Err(_) => indent(markup, true),
    }
}

/// Parses the document and writes it back out with inter-element whitespace
/// dropped and text content trimmed, leaving tag boundaries adjacent for the
/// line splitter. Any parse problem, including unbalanced tags at end of
/// input, is reported so the caller can fall back to raw-text mode.
fn reserialize(markup: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0i64;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => {
                depth += 1;
                writer.write_event(Event::Start(normalize_tag(&e)?))?;
            }
            Event::Empty(e) => {
                writer.write_event(Event::Empty(normalize_tag(&e)?))?;
            }
            Event::End(e) => {
                depth -= 1;
                writer.write_event(Event::End(e))?;
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                if !text.is_empty() {
                    writer.write_event(Event::Text(BytesText::new(&text)))?;
                }
            }
            other => writer.write_event(other)?,
        }
    }
    if depth != 0 {
        return Err(quick_xml::Error::Io(std::sync::Arc::new(
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "unbalanced tags"),
        )));
    }

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Rewrites an opening tag with single spaces between attributes, so tags
/// spanning several input lines collapse onto one and the indent counter
/// sees whole tags.
fn normalize_tag(element: &BytesStart<'_>) -> Result<BytesStart<'static>, quick_xml::Error> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut normalized = BytesStart::new(name);
    for attr in element.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?;
        normalized.push_attribute((key.as_str(), value.as_ref()));
    }
    Ok(normalized)
}

/// The line-based indentation heuristic shared by both tiers.
///
/// Walks lines top to bottom with an indent counter: a line that opens and
/// closes an element (or is self-closed) leaves the counter alone, a line
/// starting with a closing tag decrements before printing, and a line
/// starting with a non-self-closing opening tag increments after printing.
fn indent(markup: &str, trim_lines: bool) -> String {
    let split = TAG_BOUNDARY.replace_all(markup, ">\n<");

    let mut pad = 0usize;
    let mut out = Vec::new();
    for raw_line in split.split('\n') {
        let line = if trim_lines { raw_line.trim() } else { raw_line };
        if trim_lines && line.is_empty() {
            continue;
        }

        let mut grow = 0usize;
        if SAME_LINE_CLOSE.is_match(line) {
            // Open and close on one line; no change.
        } else if LEADING_CLOSE.is_match(line) {
            pad = pad.saturating_sub(1);
        } else if LEADING_OPEN.is_match(line) {
            grow = 1;
        }

        out.push(format!("{}{}", PADDING.repeat(pad), line));
        pad += grow;
    }
    out.join("\n")
}
