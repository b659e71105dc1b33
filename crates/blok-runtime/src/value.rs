//! Modifier values

use serde_json::Value;

/// Modifier value: boolean flag or string state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModValue {
    Bool(bool),
    Str(String),
}

impl ModValue {
    /// Convert a descriptor attribute; numbers are stringified, anything
    /// else is rejected
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::String(s) => Some(Self::Str(s.clone())),
            Value::Number(n) => Some(Self::Str(n.to_string())),
            _ => None,
        }
    }

    /// `true` for `Bool(true)` and non-empty strings
    pub fn is_set(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Str(s) => !s.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Str(_) => None,
        }
    }
}

impl From<bool> for ModValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for ModValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ModValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<ModValue> for Value {
    fn from(value: ModValue) -> Self {
        match value {
            ModValue::Bool(b) => Value::Bool(b),
            ModValue::Str(s) => Value::String(s),
        }
    }
}

impl std::fmt::Display for ModValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        assert_eq!(ModValue::from_json(&json!(true)), Some(ModValue::Bool(true)));
        assert_eq!(ModValue::from_json(&json!("on")), Some(ModValue::from("on")));
        assert_eq!(ModValue::from_json(&json!(3)), Some(ModValue::from("3")));
        assert_eq!(ModValue::from_json(&json!(null)), None);
        assert_eq!(ModValue::from_json(&json!([1])), None);
    }

    #[test]
    fn test_is_set() {
        assert!(ModValue::from(true).is_set());
        assert!(!ModValue::from(false).is_set());
        assert!(!ModValue::from("").is_set());
        assert!(ModValue::from("x").is_set());
    }
}
