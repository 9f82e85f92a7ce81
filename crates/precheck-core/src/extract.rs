//! Locating a JSON object inside model output.
//!
//! Model responses often wrap the document in prose or markdown fences.
//! The default greedy mode takes everything from the first `{` to the last
//! `}`; the balanced mode scans for a brace-balanced span instead, which
//! tolerates stray braces in the surrounding prose.

use serde_json::Value;

use crate::config::ExtractionMode;
use crate::report::Violation;

/// Extract and parse the JSON object embedded in `text`.
pub fn extract_document(text: &str, mode: ExtractionMode) -> Result<Value, Violation> {
    match mode {
        ExtractionMode::Greedy => extract_greedy(text),
        ExtractionMode::Balanced => extract_balanced(text),
    }
}

fn extract_greedy(text: &str) -> Result<Value, Violation> {
    let span = greedy_span(text).ok_or(Violation::Extraction)?;
    parse_span(span)
}

/// Span from the first `{` to the last `}`, inclusive.
pub fn greedy_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}

fn extract_balanced(text: &str) -> Result<Value, Violation> {
    let mut last_error = None;
    let mut pos = 0;

    // Each byte is scanned at most once: a span that fails to parse is
    // skipped whole, and an unmatched `{` has consumed the rest of the text.
    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        let Some(len) = balanced_len(&text[start..]) else {
            break;
        };
        match parse_span(&text[start..start + len]) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
        pos = start + len;
    }

    Err(last_error.unwrap_or(Violation::Extraction))
}

/// Byte length of the brace-balanced object starting at `s[0] == '{'`.
fn balanced_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

fn parse_span(span: &str) -> Result<Value, Violation> {
    serde_json::from_str(span).map_err(|e| Violation::Syntax {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FENCED: &str = r##"
    Here is the JSON you requested:
    ```json
    { "name": "steam", "color_hex": "#E0E0E0" }
    ```
    I hope this helps!
    "##;

    #[test]
    fn test_bare_json() {
        let value = extract_document(r#"{"a": 1}"#, ExtractionMode::Greedy).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_fenced_json_in_prose() {
        for mode in [ExtractionMode::Greedy, ExtractionMode::Balanced] {
            let value = extract_document(FENCED, mode).unwrap();
            assert_eq!(value["name"], "steam");
        }
    }

    #[test]
    fn test_no_braces_is_extraction_error() {
        let result = extract_document("no json here", ExtractionMode::Greedy);
        assert_eq!(result, Err(Violation::Extraction));

        let result = extract_document("} backwards {", ExtractionMode::Greedy);
        assert_eq!(result, Err(Violation::Extraction));
    }

    #[test]
    fn test_unterminated_json_is_syntax_error() {
        let result = extract_document(r#"{"elements": ["fire}"#, ExtractionMode::Greedy);
        assert!(matches!(result, Err(Violation::Syntax { .. })));
    }

    #[test]
    fn test_greedy_trips_on_stray_braces_balanced_does_not() {
        let text = r#"Use {braces} carefully: {"a": {"b": "}"}} and that's it."#;

        let greedy = extract_document(text, ExtractionMode::Greedy);
        assert!(matches!(greedy, Err(Violation::Syntax { .. })));

        let balanced = extract_document(text, ExtractionMode::Balanced).unwrap();
        assert_eq!(balanced, json!({"a": {"b": "}"}}));
    }

    #[test]
    fn test_balanced_without_closing_brace() {
        let result = extract_document(r#"{"name": "bad""#, ExtractionMode::Balanced);
        assert_eq!(result, Err(Violation::Extraction));
    }

    #[test]
    fn test_balanced_does_not_descend_into_malformed_object() {
        let text = r#"{"result": {"elements":["fire"],"fire":{"RGB_COLOR":[1,2,3],"SOUND_LIB":"flaming"}},}"#;
        let result = extract_document(text, ExtractionMode::Balanced);
        assert!(matches!(result, Err(Violation::Syntax { .. })));
    }

    #[test]
    fn test_balanced_skips_past_failed_span() {
        let text = r#"Note {not json} then {"a": {"b": 1}}"#;
        let value = extract_document(text, ExtractionMode::Balanced).unwrap();
        assert_eq!(value, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_balanced_unmatched_braces_scan_once() {
        let text = "{".repeat(200_000);
        let start = std::time::Instant::now();
        let result = extract_document(&text, ExtractionMode::Balanced);
        assert_eq!(result, Err(Violation::Extraction));
        assert!(start.elapsed() < std::time::Duration::from_secs(2));

        let text = "{x}".repeat(100_000);
        let start = std::time::Instant::now();
        let result = extract_document(&text, ExtractionMode::Balanced);
        assert!(matches!(result, Err(Violation::Syntax { .. })));
        assert!(start.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_balanced_reports_last_parse_error() {
        let result = extract_document("{not json} {also not}", ExtractionMode::Balanced);
        assert!(matches!(result, Err(Violation::Syntax { .. })));
    }
}
