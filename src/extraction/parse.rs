// Parsing of the extraction reply
//
// The reply is untrusted text. It may be fenced or wrapped in prose; the first
// JSON object is taken and every field is read defensively.

use serde_json::Value;

use crate::dataset::{BugId, DeveloperId};

/// Fields the extraction call claims; nothing here is trusted yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawExtraction {
    pub success: bool,
    pub developer_id: Option<DeveloperId>,
    pub bug_id: Option<BugId>,
    pub progress_description: Option<String>,
    pub solved: Option<bool>,
    pub reason: Option<String>,
}

/// Parse an extraction reply, or describe why it could not be parsed
pub fn parse_extraction(text: &str) -> Result<RawExtraction, String> {
    let stripped = strip_markdown_fences(text.trim());

    let value = match serde_json::from_str::<Value>(stripped) {
        Ok(value) => value,
        Err(_) => {
            let slice = first_json_object(stripped).ok_or("no JSON object in reply")?;
            serde_json::from_str::<Value>(slice).map_err(|e| format!("invalid JSON: {}", e))?
        }
    };

    let Value::Object(fields) = value else {
        return Err("reply is not a JSON object".to_string());
    };

    let success = match fields.get("success") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Null) | None => false,
        Some(other) => return Err(format!("'success' is not a boolean: {}", other)),
    };

    let solved = match fields.get("solved") {
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::Null) | None => None,
        Some(other) => return Err(format!("'solved' is not a boolean: {}", other)),
    };

    Ok(RawExtraction {
        success,
        developer_id: integer_field(fields.get("developer_id")),
        bug_id: integer_field(fields.get("bug_id")),
        progress_description: fields
            .get("progress_description")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        solved,
        reason: fields
            .get("reason")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Integer ids, tolerating a numeric string or a "#7"-style reference
fn integer_field(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().trim_start_matches('#').parse().ok(),
        _ => None,
    }
}

/// Outermost `{...}` span, balancing braces outside string literals
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Strip leading/trailing markdown code fences (```json ... ``` or ``` ... ```)
fn strip_markdown_fences(s: &str) -> &str {
    let s = s.trim();
    let s = if let Some(rest) = s.strip_prefix("```json") {
        rest
    } else if let Some(rest) = s.strip_prefix("```") {
        rest
    } else {
        s
    };
    if let Some(rest) = s.strip_suffix("```") {
        rest.trim()
    } else {
        s.trim()
    }
}
