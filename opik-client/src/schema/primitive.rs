//! Primitive leaf schemas: strings, numbers, booleans, dates and `any`.

use chrono::DateTime;
use serde_json::Value;

use super::context::Context;
use crate::error::ValidationError;

/// A leaf schema with no children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Integer,
    Boolean,
    /// RFC 3339 timestamp carried as a string.
    Date,
    /// Any JSON value, accepted verbatim.
    Any,
}

impl Primitive {
    fn expected(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Date => "RFC 3339 date string",
            Self::Any => "any",
        }
    }

    pub(crate) fn check(self, value: &Value, ctx: &Context) -> Result<Value, ValidationError> {
        let ok = match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Date => value
                .as_str()
                .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()),
            Self::Any => true,
        };

        if ok {
            Ok(value.clone())
        } else {
            Err(ctx.error(format!(
                "Expected {}. Received {}.",
                self.expected(),
                describe(value)
            )))
        }
    }
}

/// Short description of a received value for error messages.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{s}\""),
        Value::Array(_) => "list".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Context {
        Context::default().with_prefix(["response"])
    }

    #[test]
    fn accepts_matching_values_verbatim() {
        assert_eq!(Primitive::String.check(&json!("hi"), &ctx()).unwrap(), json!("hi"));
        assert_eq!(Primitive::Number.check(&json!(1.5), &ctx()).unwrap(), json!(1.5));
        assert_eq!(Primitive::Integer.check(&json!(7), &ctx()).unwrap(), json!(7));
        assert_eq!(Primitive::Boolean.check(&json!(false), &ctx()).unwrap(), json!(false));
        assert_eq!(
            Primitive::Any.check(&json!({"x": [1]}), &ctx()).unwrap(),
            json!({"x": [1]})
        );
    }

    #[test]
    fn rejects_with_received_description() {
        let err = Primitive::String.check(&json!(42), &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "response: Expected string. Received 42.");

        let err = Primitive::Boolean.check(&json!({"a": 1}), &ctx()).unwrap_err();
        assert!(err.to_string().ends_with("Received object."));
    }

    #[test]
    fn integer_rejects_fractions() {
        assert!(Primitive::Integer.check(&json!(1.25), &ctx()).is_err());
        assert!(Primitive::Number.check(&json!(1.25), &ctx()).is_ok());
    }

    #[test]
    fn date_keeps_original_formatting() {
        let raw = json!("2024-05-01T10:00:00.000Z");
        assert_eq!(Primitive::Date.check(&raw, &ctx()).unwrap(), raw);
        assert!(Primitive::Date.check(&json!("yesterday"), &ctx()).is_err());
    }
}
