//! Bridge between schemas and typed Rust models.

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Context, Schema};
use crate::error::ValidationError;

/// A typed model with a wire schema.
///
/// The schema runs first, so strictness and breadcrumbs apply; serde then
/// converts the validated JSON into `Self`. Models that keep unknown keys in
/// passthrough mode declare a `#[serde(flatten)] extra: Map<String, Value>`
/// field; models with permissive enums declare a trailing
/// `#[serde(untagged)] Unrecognized(String)` variant.
///
/// ## Examples
///
/// ```rust
/// use opik_client::schema::{Context, Field, Schema, SchemaObject, Strictness};
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Project {
///     id: String,
///     name: String,
/// }
///
/// impl SchemaObject for Project {
///     fn schema() -> Schema {
///         Schema::object([
///             Field::new("id", Schema::string()),
///             Field::new("name", Schema::string()),
///         ])
///     }
/// }
///
/// let ctx = Context::new(Strictness::strict());
/// let project = Project::from_wire(&json!({"id": "p1", "name": "demo"}), &ctx).unwrap();
/// assert_eq!(project.name, "demo");
/// ```
pub trait SchemaObject: Serialize + DeserializeOwned + Debug + Clone + Send + Sync + 'static {
    /// Returns the wire schema of this type.
    fn schema() -> Schema;

    /// Validates `raw` against [`schema`](Self::schema) and converts it.
    ///
    /// ## Errors
    ///
    /// Returns the schema's issues, or a single issue at the context's
    /// breadcrumb if the validated value does not fit the Rust type.
    fn from_wire(raw: &Value, ctx: &Context) -> Result<Self, ValidationError> {
        let validated = Self::schema().parse(raw, ctx)?;
        serde_json::from_value(validated).map_err(|e| ctx.error(e.to_string()))
    }

    /// Converts `self` to JSON and validates it against [`schema`](Self::schema).
    ///
    /// ## Errors
    ///
    /// Returns the schema's issues for values the wire format cannot carry.
    fn to_wire(&self, ctx: &Context) -> Result<Value, ValidationError> {
        let value = serde_json::to_value(self).map_err(|e| ctx.error(e.to_string()))?;
        Self::schema().serialize(&value, ctx)
    }
}

impl SchemaObject for String {
    fn schema() -> Schema {
        Schema::string()
    }
}

impl SchemaObject for bool {
    fn schema() -> Schema {
        Schema::boolean()
    }
}

impl SchemaObject for i64 {
    fn schema() -> Schema {
        Schema::integer()
    }
}

impl SchemaObject for f64 {
    fn schema() -> Schema {
        Schema::number()
    }
}

impl SchemaObject for Value {
    fn schema() -> Schema {
        Schema::any()
    }
}

/// Endpoints whose response body is ignored. Any JSON value is accepted.
impl SchemaObject for () {
    fn schema() -> Schema {
        Schema::any()
    }

    fn from_wire(raw: &Value, ctx: &Context) -> Result<Self, ValidationError> {
        Self::schema().parse(raw, ctx).map(|_| ())
    }
}

impl<T: SchemaObject> SchemaObject for Vec<T> {
    fn schema() -> Schema {
        Schema::list(T::schema())
    }
}

impl<T: SchemaObject> SchemaObject for Option<T> {
    fn schema() -> Schema {
        T::schema().optional()
    }
}

impl<T: SchemaObject> SchemaObject for BTreeMap<String, T> {
    fn schema() -> Schema {
        Schema::map(T::schema())
    }
}
