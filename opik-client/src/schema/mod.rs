//! Composable schemas converting wire JSON to typed values and back.
//!
//! A [`Schema`] is an immutable tree describing a document. [`Schema::parse`]
//! validates a raw wire payload under a [`Context`] (breadcrumbs and
//! [`Strictness`]); [`Schema::serialize`] validates an in-memory value on its
//! way back to the wire. Both collect every failure into one
//! [`ValidationError`](crate::error::ValidationError).
//!
//! Typed models implement [`SchemaObject`], which pairs a schema with serde so
//! that `T::from_wire` and `T::to_wire` run the schema before converting.
//!
//! ## Round trip
//!
//! For any `x` accepted by `parse` under a fixed strictness,
//! `serialize(parse(x)) == x`, except for keys intentionally dropped by
//! [`UnrecognizedKeys::Strip`].
//!
//! ## Examples
//!
//! ```rust
//! use opik_client::schema::{Context, Field, Schema, Strictness};
//! use serde_json::json;
//!
//! let schema = Schema::object([
//!     Field::new("id", Schema::string()),
//!     Field::new("tags", Schema::list(Schema::string()).optional()),
//! ]);
//!
//! let ctx = Context::new(Strictness::strict()).with_prefix(["response"]);
//! let raw = json!({"id": "abc", "tags": ["x"]});
//! let parsed = schema.parse(&raw, &ctx).unwrap();
//! assert_eq!(schema.serialize(&parsed, &ctx).unwrap(), raw);
//! ```

mod context;
mod enumeration;
mod list;
mod object;
mod primitive;
mod typed;
mod union;

use serde_json::Value;
use tracing::warn;

pub use context::{Context, Strictness, UnrecognizedKeys};
pub use enumeration::EnumSchema;
pub use object::{Field, ObjectSchema};
pub use primitive::Primitive;
pub use typed::SchemaObject;
pub use union::UnionSchema;

use crate::error::ValidationError;

/// A node of a document schema.
#[derive(Debug, Clone)]
pub enum Schema {
    /// String, number, integer, boolean, date or any.
    Primitive(Primitive),
    /// One of a closed set of strings.
    Enum(EnumSchema),
    /// Named fields, some optional.
    Object(ObjectSchema),
    /// Items all matching one schema.
    List(Box<Schema>),
    /// String-keyed entries all matching one schema.
    Map(Box<Schema>),
    /// Alternatives, ordered or discriminated.
    Union(UnionSchema),
    /// May be absent from its parent object, or `null`.
    Optional(Box<Schema>),
    /// Must be present but may be `null`.
    Nullable(Box<Schema>),
    /// Deferred construction for recursive schemas.
    Lazy(fn() -> Schema),
}

impl Schema {
    pub fn string() -> Self {
        Self::Primitive(Primitive::String)
    }

    pub fn number() -> Self {
        Self::Primitive(Primitive::Number)
    }

    pub fn integer() -> Self {
        Self::Primitive(Primitive::Integer)
    }

    pub fn boolean() -> Self {
        Self::Primitive(Primitive::Boolean)
    }

    pub fn date() -> Self {
        Self::Primitive(Primitive::Date)
    }

    pub fn any() -> Self {
        Self::Primitive(Primitive::Any)
    }

    /// Enum over the given string literals.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(EnumSchema::new(values))
    }

    /// Object with the given fields.
    pub fn object(fields: impl IntoIterator<Item = Field>) -> Self {
        Self::Object(ObjectSchema::new(fields))
    }

    pub fn list(item: Schema) -> Self {
        Self::List(Box::new(item))
    }

    pub fn map(entry: Schema) -> Self {
        Self::Map(Box::new(entry))
    }

    /// Union tried in declaration order.
    pub fn union(members: impl IntoIterator<Item = Schema>) -> Self {
        Self::Union(UnionSchema::ordered(members))
    }

    pub fn lazy(build: fn() -> Schema) -> Self {
        Self::Lazy(build)
    }

    /// Wraps this schema so it may be absent or `null`.
    pub fn optional(self) -> Self {
        Self::Optional(Box::new(self))
    }

    /// Wraps this schema so it may be `null`.
    pub fn nullable(self) -> Self {
        Self::Nullable(Box::new(self))
    }

    /// Returns `true` if an object field with this schema may be omitted.
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Optional(_) => true,
            Self::Lazy(build) => build().is_optional(),
            _ => false,
        }
    }

    /// Validates a raw wire value.
    ///
    /// ## Errors
    ///
    /// Returns every issue found, each with the breadcrumb of the offending
    /// node. With `skip_validation` the raw value is returned unchanged and
    /// the issues are logged instead.
    pub fn parse(&self, raw: &Value, ctx: &Context) -> Result<Value, ValidationError> {
        self.run(raw, ctx, "parse")
    }

    /// Validates an in-memory value before it is sent.
    ///
    /// Never fails for a value produced by [`parse`](Self::parse) under the
    /// same strictness.
    ///
    /// ## Errors
    ///
    /// Same as [`parse`](Self::parse).
    pub fn serialize(&self, value: &Value, ctx: &Context) -> Result<Value, ValidationError> {
        self.run(value, ctx, "serialize")
    }

    fn run(&self, value: &Value, ctx: &Context, direction: &str) -> Result<Value, ValidationError> {
        match self.check(value, ctx) {
            Ok(v) => Ok(v),
            Err(e) if ctx.strictness().skip_validation => {
                warn!(direction, error = %e, "schema validation failed; passing value through");
                Ok(value.clone())
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) fn check(&self, value: &Value, ctx: &Context) -> Result<Value, ValidationError> {
        match self {
            Self::Primitive(p) => p.check(value, ctx),
            Self::Enum(e) => e.check(value, ctx),
            Self::Object(o) => o.check(value, ctx),
            Self::List(item) => list::check_list(item, value, ctx),
            Self::Map(entry) => list::check_map(entry, value, ctx),
            Self::Union(u) => u.check(value, ctx),
            Self::Optional(inner) | Self::Nullable(inner) => match value {
                Value::Null => Ok(Value::Null),
                other => inner.check(other, ctx),
            },
            Self::Lazy(build) => build().check(value, ctx),
        }
    }
}

impl From<Primitive> for Schema {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}
