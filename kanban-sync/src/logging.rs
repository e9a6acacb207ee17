//! YAML rendering of payloads inside tracing fields

use serde::Serialize;
use std::fmt::Debug;

/// Renders a serializable value as YAML on its own lines, for debug logs of
/// authority responses and published events:
///
/// ```ignore
/// tracing::debug!(mutation = %id, returning = %Pretty(&returning), "mutation committed");
/// ```
///
/// Falls back to `{:#?}` when the value does not serialize.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pretty_renders_yaml() {
        let rendered = format!("{}", Pretty(&json!({"entityId": "c1", "targetIndex": 0})));
        assert!(rendered.starts_with('\n'));
        assert!(rendered.contains("entityId: c1"));
        assert!(rendered.contains("targetIndex: 0"));
    }

    #[test]
    fn test_pretty_debug_matches_display() {
        let value = json!(["a", "b"]);
        assert_eq!(format!("{:?}", Pretty(&value)), format!("{}", Pretty(&value)));
    }
}
