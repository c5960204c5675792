//! Homogeneous collections: lists and string-keyed maps.

use serde_json::{Map, Value};

use super::Schema;
use super::context::Context;
use super::primitive::describe;
use crate::error::{ValidationError, ValidationIssue};

pub(crate) fn check_list(
    item: &Schema,
    value: &Value,
    ctx: &Context,
) -> Result<Value, ValidationError> {
    let Some(items) = value.as_array() else {
        return Err(ctx.error(format!("Expected list. Received {}.", describe(value))));
    };

    let mut out = Vec::with_capacity(items.len());
    let mut issues: Vec<ValidationIssue> = Vec::new();
    for (i, raw) in items.iter().enumerate() {
        match item.check(raw, &ctx.index(i)) {
            Ok(v) => out.push(v),
            Err(e) => issues.extend(e.into_issues()),
        }
    }

    ValidationError::check(issues)?;
    Ok(Value::Array(out))
}

pub(crate) fn check_map(
    entry: &Schema,
    value: &Value,
    ctx: &Context,
) -> Result<Value, ValidationError> {
    let Some(entries) = value.as_object() else {
        return Err(ctx.error(format!("Expected object. Received {}.", describe(value))));
    };

    let mut out = Map::new();
    let mut issues: Vec<ValidationIssue> = Vec::new();
    for (key, raw) in entries {
        match entry.check(raw, &ctx.field(key)) {
            Ok(v) => {
                out.insert(key.clone(), v);
            }
            Err(e) => issues.extend(e.into_issues()),
        }
    }

    ValidationError::check(issues)?;
    Ok(Value::Object(out))
}
