use serde_json::Value;

/// Current value of a field as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldData {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldData {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => FieldData::Multiple(items.iter().map(value_to_text).collect()),
            other => FieldData::Single(value_to_text(other)),
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, FieldData::Multiple(_))
    }

    pub fn len(&self) -> usize {
        match self {
            FieldData::Single(_) => 1,
            FieldData::Multiple(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FieldData {
    fn default() -> Self {
        FieldData::Single(String::new())
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(num) => num.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scalars_become_text() {
        assert_eq!(
            FieldData::from_value(&json!("Hello")),
            FieldData::Single("Hello".into())
        );
        assert_eq!(
            FieldData::from_value(&json!(12.5)),
            FieldData::Single("12.5".into())
        );
        assert_eq!(FieldData::from_value(&Value::Null), FieldData::default());
    }

    #[test]
    fn arrays_keep_their_order() {
        let data = FieldData::from_value(&json!(["a", 2, null]));
        assert_eq!(
            data,
            FieldData::Multiple(vec!["a".into(), "2".into(), String::new()])
        );
        assert_eq!(data.len(), 3);
        assert!(data.is_multiple());
    }
}
