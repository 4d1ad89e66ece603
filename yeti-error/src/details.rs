//! Ordered key/value details attached to an error

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Key under which an error's human-readable message is stored.
pub const MSG_KEY: &str = "msg";

/// Arbitrary details describing the circumstances of an error.
///
/// Entries keep their insertion order, which is also the order used when
/// rendering the error message.
///
/// ```rust
/// use yeti_error::{details, Details};
///
/// let details = details! { "a" => "x", "b" => 2 };
/// assert_eq!(details.render(), r#"a="x" b=2"#);
/// assert_eq!(details, Details::new().with("a", "x").with("b", 2));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Details(Map<String, Value>);

/// Failure converting a JSON value into [`Details`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DetailsError {
    #[error("details must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

impl Details {
    /// Create an empty details mapping
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Add an entry (chainable). An existing key keeps its position.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Render as space-separated `key=<json>` pairs.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Put `message` first under `msg`, unless a `msg` entry already exists.
    pub(crate) fn fill_message(&mut self, message: String) {
        if self.0.contains_key(MSG_KEY) {
            return;
        }
        let mut merged = Map::with_capacity(self.0.len() + 1);
        merged.insert(MSG_KEY.to_string(), Value::String(message));
        merged.extend(std::mem::take(&mut self.0));
        self.0 = merged;
    }

    /// Set `msg`, replacing any existing value in place.
    pub(crate) fn set_message(&mut self, message: String) {
        self.0.insert(MSG_KEY.to_string(), Value::String(message));
    }
}

impl fmt::Display for Details {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            // Value's Display is its compact JSON serialization
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

impl From<Map<String, Value>> for Details {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Details {
    type Error = DetailsError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(DetailsError::NotAnObject("null")),
            Value::Bool(_) => Err(DetailsError::NotAnObject("a boolean")),
            Value::Number(_) => Err(DetailsError::NotAnObject("a number")),
            Value::String(_) => Err(DetailsError::NotAnObject("a string")),
            Value::Array(_) => Err(DetailsError::NotAnObject("an array")),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Details {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a Details {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Build [`Details`] from `key => value` pairs, keeping the written order.
#[macro_export]
macro_rules! details {
    () => {
        $crate::Details::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Details::new()$(.with($key, $value))+
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_insertion_order() {
        let details = details! { "a" => "x", "b" => 2 };
        assert_eq!(details.render(), r#"a="x" b=2"#);

        let details = details! { "b" => 2, "a" => "x" };
        assert_eq!(details.render(), r#"b=2 a="x""#);
    }

    #[test]
    fn test_render_structured_values() {
        let details = details! {
            "list" => json!([1, "two"]),
            "nested" => json!({"ok": false}),
            "none" => Value::Null,
        };
        assert_eq!(
            details.render(),
            r#"list=[1,"two"] nested={"ok":false} none=null"#
        );
    }

    #[test]
    fn test_render_escapes_strings() {
        let details = details! { "quote" => "say \"hi\"" };
        assert_eq!(details.render(), r#"quote="say \"hi\"""#);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(Details::new().render(), "");
    }

    #[test]
    fn test_fill_message_only_when_absent() {
        let mut details = details! { "here" => "are" };
        details.fill_message("BOOM!".to_string());
        assert_eq!(details, details! { "here" => "are", "msg" => "BOOM!" });
        assert_eq!(details.render(), r#"msg="BOOM!" here="are""#);

        let mut details = details! { "here" => "are", "msg" => "keep me" };
        details.fill_message("BOOM!".to_string());
        assert_eq!(details.get(MSG_KEY), Some(&json!("keep me")));
        assert_eq!(details.render(), r#"here="are" msg="keep me""#);
    }

    #[test]
    fn test_set_message_overwrites_in_place() {
        let mut details = details! { "msg" => "old", "some" => "details" };
        details.set_message("OOPS!".to_string());
        assert_eq!(details.render(), r#"msg="OOPS!" some="details""#);

        let mut details = details! { "some" => "details" };
        details.set_message("OOPS!".to_string());
        assert_eq!(details.render(), r#"some="details" msg="OOPS!""#);
    }

    #[test]
    fn test_try_from_value() {
        let details = Details::try_from(json!({"a": "x", "b": 2})).unwrap();
        assert_eq!(details.render(), r#"a="x" b=2"#);

        let err = Details::try_from(json!([1, 2])).unwrap_err();
        assert_eq!(err, DetailsError::NotAnObject("an array"));
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn test_from_iterator() {
        let details: Details = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(details.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(details.len(), 2);
    }
}
