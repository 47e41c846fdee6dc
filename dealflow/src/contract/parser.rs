//! Extraction of the reply object from free-form model text.

use super::ElicitationReply;

/// The result of parsing a raw model reply.
///
/// This is a value, not an error: a malformed reply is an expected turn
/// outcome and carries the raw text for the fallback path to inspect.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A structured reply was extracted.
    Parsed(ElicitationReply),
    /// No decodable object was found; the raw text is retained.
    Malformed(String),
}

impl ParseOutcome {
    /// Returns true if a structured reply was extracted.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

/// Parses a raw model reply into a structured record.
///
/// Locates the first balanced `{...}` span in the text (skipping any prose or
/// code fences around it) and decodes it. Never panics and never returns an
/// error: anything that does not yield a decodable object is reported as
/// [`ParseOutcome::Malformed`].
#[must_use]
pub fn parse_reply(raw: &str) -> ParseOutcome {
    let Some(span) = first_balanced_object(raw) else {
        return ParseOutcome::Malformed(raw.to_string());
    };

    match serde_json::from_str::<ElicitationReply>(span) {
        Ok(reply) => ParseOutcome::Parsed(reply),
        Err(_) => ParseOutcome::Malformed(raw.to_string()),
    }
}

/// Returns the first balanced `{...}` span, honoring JSON string literals and
/// escapes so braces inside strings do not skew the depth count.
fn first_balanced_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_bare_object() {
        let raw = r#"{"answer_complete": true, "next_message": "Noted."}"#;
        let ParseOutcome::Parsed(reply) = parse_reply(raw) else {
            panic!("expected parsed outcome");
        };
        assert!(reply.answer_complete);
        assert_eq!(reply.next_message, "Noted.");
    }

    #[test]
    fn test_parse_object_wrapped_in_prose() {
        let raw = "Sure, here is the JSON you asked for:\n```json\n\
                   {\"answer_complete\": false, \"next_message\": \"Go on.\"}\n```\nHope that helps!";
        let ParseOutcome::Parsed(reply) = parse_reply(raw) else {
            panic!("expected parsed outcome");
        };
        assert_eq!(reply.next_message, "Go on.");
    }

    #[test]
    fn test_parse_nested_object() {
        let raw = r#"{"collected_info": {"industry": "Retail"}, "next_message": "ok"}"#;
        let ParseOutcome::Parsed(reply) = parse_reply(raw) else {
            panic!("expected parsed outcome");
        };
        assert_eq!(reply.collected_info.industry.as_deref(), Some("Retail"));
    }

    #[test]
    fn test_braces_inside_strings_ignored() {
        let raw = r#"{"next_message": "use {curly} braces, even \"quoted}\" ones"}"#;
        let ParseOutcome::Parsed(reply) = parse_reply(raw) else {
            panic!("expected parsed outcome");
        };
        assert!(reply.next_message.contains("{curly}"));
    }

    #[test]
    fn test_first_object_wins() {
        let raw = r#"{"next_message": "first"} {"next_message": "second"}"#;
        let ParseOutcome::Parsed(reply) = parse_reply(raw) else {
            panic!("expected parsed outcome");
        };
        assert_eq!(reply.next_message, "first");
    }

    #[test]
    fn test_no_object_is_malformed() {
        let raw = "I could not produce structured output this time.";
        assert_eq!(parse_reply(raw), ParseOutcome::Malformed(raw.to_string()));
    }

    #[test]
    fn test_unterminated_object_is_malformed() {
        let raw = r#"{"answer_complete": true, "next_message": "oops"#;
        assert!(!parse_reply(raw).is_parsed());
    }

    #[test]
    fn test_invalid_json_in_balanced_span_is_malformed() {
        let raw = "{not json at all}";
        assert_eq!(parse_reply(raw), ParseOutcome::Malformed(raw.to_string()));
    }
}
