//! Text helpers shared by the lookup tools.

use regex_lite::Regex;
use routechat_core::error::ToolError;

/// Compile a pattern, reporting failure against the tool that needed it.
pub(crate) fn pattern(tool_name: &str, re: &str) -> Result<Regex, ToolError> {
    Regex::new(re).map_err(|e| ToolError::failed(tool_name, format!("bad pattern: {e}")))
}

/// Cut `text` to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove HTML tags and decode entities.
///
/// A `>` inside a quoted attribute value does not close the tag.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut quote: Option<char> = None;
    for c in html.chars() {
        match (in_tag, quote, c) {
            (false, _, '<') => in_tag = true,
            (false, _, c) => out.push(c),
            (true, Some(q), c) if c == q => quote = None,
            (true, Some(_), _) => {}
            (true, None, '"' | '\'') => quote = Some(c),
            (true, None, '>') => in_tag = false,
            (true, None, _) => {}
        }
    }
    decode_entities(&out)
}

/// Decode HTML/XML character references, named and numeric.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
