//! Unions of alternative schemas.
//!
//! Two forms are supported:
//!
//! - **Ordered**: alternatives are tried in declaration order and the first
//!   structural match wins.
//! - **Discriminated**: a string tag at a fixed key selects the alternative.
//!
//! When nothing matches and `allow_unrecognized_union_members` is set, the
//! value is preserved verbatim as an opaque member instead of failing.

use serde_json::Value;
use tracing::trace;

use super::Schema;
use super::context::Context;
use super::object::ObjectSchema;
use super::primitive::describe;
use crate::error::ValidationError;

#[derive(Debug, Clone)]
enum Members {
    Ordered(Vec<Schema>),
    Discriminated {
        discriminant: String,
        variants: Vec<(String, ObjectSchema)>,
    },
}

/// A union schema.
///
/// ## Examples
///
/// ```rust
/// use opik_client::schema::{Context, Field, ObjectSchema, Schema, Strictness, UnionSchema};
/// use serde_json::json;
///
/// let feedback = Schema::Union(UnionSchema::discriminated(
///     "type",
///     [
///         ("numerical", ObjectSchema::new([Field::new("min", Schema::number())])),
///         ("categorical", ObjectSchema::new([Field::new("categories", Schema::map(Schema::number()))])),
///     ],
/// ));
///
/// let ctx = Context::new(Strictness::strict());
/// let raw = json!({"type": "numerical", "min": 0});
/// assert_eq!(feedback.parse(&raw, &ctx).unwrap(), raw);
/// ```
#[derive(Debug, Clone)]
pub struct UnionSchema {
    members: Members,
}

impl UnionSchema {
    /// Creates a union whose members are tried in order.
    pub fn ordered(members: impl IntoIterator<Item = Schema>) -> Self {
        Self {
            members: Members::Ordered(members.into_iter().collect()),
        }
    }

    /// Creates a union selected by the string tag at `discriminant`.
    pub fn discriminated<I, S>(discriminant: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = (S, ObjectSchema)>,
        S: Into<String>,
    {
        Self {
            members: Members::Discriminated {
                discriminant: discriminant.into(),
                variants: variants
                    .into_iter()
                    .map(|(tag, schema)| (tag.into(), schema))
                    .collect(),
            },
        }
    }

    pub(crate) fn check(&self, value: &Value, ctx: &Context) -> Result<Value, ValidationError> {
        match &self.members {
            Members::Ordered(members) => check_ordered(members, value, ctx),
            Members::Discriminated {
                discriminant,
                variants,
            } => check_discriminated(discriminant, variants, value, ctx),
        }
    }
}

fn check_ordered(
    members: &[Schema],
    value: &Value,
    ctx: &Context,
) -> Result<Value, ValidationError> {
    for (i, member) in members.iter().enumerate() {
        match member.check(value, ctx) {
            Ok(v) => return Ok(v),
            Err(e) => trace!(member = i, issues = e.issues().len(), "union member rejected"),
        }
    }

    if ctx.strictness().allow_unrecognized_union_members {
        return Ok(value.clone());
    }

    Err(ctx.error(format!(
        "Received {} which matches none of the {} union members.",
        describe(value),
        members.len()
    )))
}

fn check_discriminated(
    discriminant: &str,
    variants: &[(String, ObjectSchema)],
    value: &Value,
    ctx: &Context,
) -> Result<Value, ValidationError> {
    let Some(map) = value.as_object() else {
        return Err(ctx.error(format!("Expected object. Received {}.", describe(value))));
    };

    let tag_ctx = ctx.field(discriminant);
    let tag = match map.get(discriminant) {
        Some(Value::String(tag)) => tag,
        Some(other) => {
            return Err(tag_ctx.error(format!(
                "Expected discriminant to be a string. Received {}.",
                describe(other)
            )));
        }
        None => {
            return Err(tag_ctx.error(format!("Missing discriminant (\"{discriminant}\")")));
        }
    };

    match variants.iter().find(|(t, _)| t == tag) {
        Some((_, schema)) => schema
            .check_map(map, ctx, Some(discriminant))
            .map(Value::Object),
        None if ctx.strictness().allow_unrecognized_union_members => Ok(value.clone()),
        None => Err(tag_ctx.error(format!(
            "Expected one of {}. Received \"{tag}\".",
            variants
                .iter()
                .map(|(t, _)| format!("\"{t}\""))
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}
