// src/services/interpreter.rs
//
// Locates the human-readable reply inside whatever the webhook sent back.
// The remote side enforces no schema, so every shape is treated as untrusted.
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Probed in order against the top-level object; first non-blank string wins.
pub const REPLY_PATHS: [&str; 8] = [
    "response.body",
    "body",
    "message",
    "reply",
    "text",
    "content",
    "data",
    "result",
];

/// Keys visited first at every level of the deep search.
pub const NESTED_REPLY_KEYS: [&str; 8] = [
    "body", "message", "reply", "text", "content", "response", "data", "result",
];

pub const MAX_SEARCH_DEPTH: usize = 5;

/// A webhook response body, classified by shape.
#[derive(Clone, Debug, PartialEq)]
pub enum RawResponse {
    Null,
    Text(String),
    Object(Map<String, Value>),
    Array(Vec<Value>),
    /// Numbers and booleans: valid JSON, never a reply.
    Scalar(Value),
}

impl From<Value> for RawResponse {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::String(s) => Self::Text(s),
            Value::Object(map) => Self::Object(map),
            Value::Array(items) => Self::Array(items),
            other => Self::Scalar(other),
        }
    }
}

impl RawResponse {
    /// JSON if the body parses as JSON, otherwise the text itself.
    /// Content-Type is not consulted. A body shaped like a JSON object or array
    /// that fails to parse (malformed, or nested past the parser's limit) is
    /// `Null`, so raw payload text never reaches the user.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => value.into(),
            Err(e) if looks_structured(body) => {
                warn!(error = %e, "unparseable JSON body treated as empty reply");
                Self::Null
            }
            Err(_) => Self::Text(body.to_string()),
        }
    }
}

/// Extract and clean the reply text. `None` means there is nothing to render;
/// an empty string is never returned.
pub fn extract_reply(raw: &RawResponse) -> Option<String> {
    let found = match raw {
        RawResponse::Null | RawResponse::Scalar(_) => return None,
        RawResponse::Text(text) => text.as_str(),
        RawResponse::Object(map) => probe_paths(map).or_else(|| deep_search(object_children(map)))?,
        RawResponse::Array(items) => items
            .first()
            .and_then(Value::as_object)
            .and_then(probe_paths)
            .or_else(|| deep_search(items.iter().collect()))?,
    };

    let cleaned = clean_message(found);
    if cleaned.trim().is_empty() {
        debug!("reply candidate was blank after cleaning");
        return None;
    }
    Some(cleaned)
}

/// Normalise double-encoded text: trim, turn literal `\n` into line breaks,
/// unescape `\"` and `\'`, and drop stray control characters.
pub fn clean_message(raw: &str) -> String {
    raw.trim()
        .replace("\\n", "\n")
        .replace("\\\"", "\"")
        .replace("\\'", "'")
        .chars()
        .filter(|c| !is_stray_control(*c))
        .collect()
}

fn looks_structured(body: &str) -> bool {
    matches!(body.trim_start().as_bytes().first(), Some(b'{' | b'['))
}

fn is_stray_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

fn non_blank(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

fn probe_paths(map: &Map<String, Value>) -> Option<&str> {
    REPLY_PATHS.iter().find_map(|path| {
        let found = resolve_path(map, path).and_then(non_blank);
        if found.is_some() {
            debug!(path, "reply found at known path");
        }
        found
    })
}

fn resolve_path<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = map.get(segments.next()?)?;
    segments.try_fold(first, |current, key| current.get(key))
}

fn object_children(map: &Map<String, Value>) -> Vec<&Value> {
    let known = NESTED_REPLY_KEYS.iter().filter_map(|key| map.get(*key));
    let rest = map
        .iter()
        .filter(|(key, _)| !NESTED_REPLY_KEYS.contains(&key.as_str()))
        .map(|(_, value)| value);
    known.chain(rest).collect()
}

/// Depth-first search over the children of the root (depth 1 onwards) using an
/// explicit stack. Nothing below `MAX_SEARCH_DEPTH` is examined.
fn deep_search(root_children: Vec<&Value>) -> Option<&str> {
    let mut stack: Vec<(&Value, usize)> = root_children.into_iter().rev().map(|v| (v, 1)).collect();

    while let Some((value, depth)) = stack.pop() {
        let children = match value {
            Value::String(_) => {
                if let Some(found) = non_blank(value) {
                    debug!(depth, "reply found by deep search");
                    return Some(found);
                }
                continue;
            }
            Value::Object(map) => object_children(map),
            Value::Array(items) => items.iter().collect(),
            _ => continue,
        };
        if depth < MAX_SEARCH_DEPTH {
            stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_message_unescapes() {
        assert_eq!(clean_message("  hello\\nworld  "), "hello\nworld");
        assert_eq!(clean_message(r#"say \"hi\" and \'bye\'"#), "say \"hi\" and 'bye'");
        assert_eq!(clean_message("a\u{0007}b\tc"), "ab\tc");
    }

    #[test]
    fn known_keys_are_searched_before_other_keys() {
        let raw: RawResponse = json!({
            "zzz": { "note": "unrelated" },
            "output": { "response": { "extra": "nested answer" } }
        })
        .into();
        // "output" is not a known key, so both are scanned in insertion order.
        assert_eq!(extract_reply(&raw).as_deref(), Some("unrelated"));

        let raw: RawResponse = json!({
            "zzz": { "note": "unrelated" },
            "response": { "extra": "nested answer" }
        })
        .into();
        assert_eq!(extract_reply(&raw).as_deref(), Some("nested answer"));
    }

    #[test]
    fn body_sniffing() {
        assert_eq!(RawResponse::from_body("plain words"), RawResponse::Text("plain words".into()));
        assert_eq!(RawResponse::from_body("\"quoted\""), RawResponse::Text("quoted".into()));
        assert_eq!(RawResponse::from_body("null"), RawResponse::Null);
        assert_eq!(RawResponse::from_body("42"), RawResponse::Scalar(json!(42)));
        assert!(matches!(RawResponse::from_body("{\"a\":1}"), RawResponse::Object(_)));
        assert_eq!(RawResponse::from_body("{\"reply\": \"cut off"), RawResponse::Null);
        assert_eq!(RawResponse::from_body("  [1, 2,"), RawResponse::Null);
    }
}
