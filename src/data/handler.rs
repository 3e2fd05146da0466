//! Extraction of response handlers from embedded `<script>` bodies.
//!
//! Only two things are read from the script: the first integer compared
//! with `==`/`===` (the expected option index), and the string literals
//! passed to `send.lia(...)`. The script itself is kept verbatim. Calls
//! that dispatch a computed value leave the messages empty.

use crate::error::MalformedBlock;
use crate::models::ResponseHandler;

const DISPATCH_CALL: &str = "send.lia(";

impl ResponseHandler {
    pub fn parse(script: &str) -> Result<Self, MalformedBlock> {
        if !script.contains(DISPATCH_CALL) {
            return Err(MalformedBlock::HandlerWithoutDispatch);
        }

        let mut messages = dispatched_messages(script).into_iter();
        let on_match = messages.next().unwrap_or_default();
        let on_mismatch = messages.next().unwrap_or_else(|| on_match.clone());

        Ok(Self {
            script: script.to_string(),
            expected: compared_integer(script),
            on_match,
            on_mismatch,
        })
    }
}

fn dispatched_messages(script: &str) -> Vec<String> {
    let mut messages = Vec::new();
    let mut rest = script;

    while let Some(start) = rest.find(DISPATCH_CALL) {
        rest = &rest[start + DISPATCH_CALL.len()..];
        if let Some((message, consumed)) = string_literal(rest.trim_start()) {
            messages.push(message);
            let skipped = rest.len() - rest.trim_start().len();
            rest = &rest[skipped + consumed..];
        }
    }

    messages
}

/// Reads a quoted literal at the start of `input`. Returns the unescaped
/// text and the number of bytes consumed, closing quote included.
fn string_literal(input: &str) -> Option<(String, usize)> {
    let mut chars = input.char_indices();
    let (_, quote) = chars.next()?;
    if !matches!(quote, '"' | '\'' | '`') {
        return None;
    }

    let mut text = String::new();
    let mut escaped = false;
    for (offset, c) in chars {
        if escaped {
            text.push(match c {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some((text, offset + c.len_utf8()));
        } else {
            text.push(c);
        }
    }

    None
}

fn compared_integer(script: &str) -> Option<usize> {
    let bytes = script.as_bytes();
    let mut index = 0;

    while let Some(found) = script[index..].find("==") {
        let at = index + found;
        let before = at.checked_sub(1).map(|i| bytes[i]);
        index = at + 2;

        if matches!(before, Some(b'!' | b'=' | b'<' | b'>')) {
            continue;
        }

        let rhs = script[at..].trim_start_matches('=');
        if let Some(value) = leading_integer(rhs) {
            return Some(value);
        }
        if let Some(value) = trailing_integer(&script[..at]) {
            return Some(value);
        }
    }

    None
}

fn leading_integer(text: &str) -> Option<usize> {
    let text = text.trim_start().trim_start_matches(['"', '\'', '`']);
    let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn trailing_integer(text: &str) -> Option<usize> {
    let text = text.trim_end().trim_end_matches(['"', '\'', '`']);
    let start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    text[start..].parse().ok()
}
