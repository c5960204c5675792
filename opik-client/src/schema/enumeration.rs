//! Closed sets of string literals.

use serde_json::Value;

use super::context::Context;
use super::primitive::describe;
use crate::error::ValidationError;

/// A schema accepting one of a fixed set of strings.
///
/// With `allow_unrecognized_enum_values` any string passes and is kept
/// verbatim; it is never coerced to one of the known values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSchema {
    values: Vec<String>,
}

impl EnumSchema {
    /// Creates an enum schema from its allowed values.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the allowed values in declaration order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns `true` if `value` is one of the declared literals.
    pub fn is_known(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    pub(crate) fn check(&self, value: &Value, ctx: &Context) -> Result<Value, ValidationError> {
        let Some(s) = value.as_str() else {
            return Err(ctx.error(format!("Expected enum. Received {}.", describe(value))));
        };

        if self.is_known(s) || ctx.strictness().allow_unrecognized_enum_values {
            return Ok(value.clone());
        }

        Err(ctx.error(format!(
            "Expected enum. Received \"{s}\". Allowed values: {}.",
            self.values
                .iter()
                .map(|v| format!("\"{v}\""))
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}
