//! Objects with a fixed set of named fields.

use serde_json::{Map, Value};

use super::Schema;
use super::context::{Context, UnrecognizedKeys};
use super::primitive::describe;
use crate::error::{ValidationError, ValidationIssue};

/// A named field of an [`ObjectSchema`].
///
/// A field is optional when its schema is [`Schema::Optional`]; every other
/// field must be present.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    schema: Schema,
}

impl Field {
    /// Creates a field.
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Returns the wire name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field's schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns `true` if the field must be present.
    pub fn is_required(&self) -> bool {
        !self.schema.is_optional()
    }
}

/// Object schema with declared fields.
///
/// Every declared field is validated and all failures are collected, so one
/// object with several mistakes yields one error listing all of them.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: Vec<Field>,
}

impl ObjectSchema {
    /// Creates an object schema from its fields.
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Returns the declared fields.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn check(&self, value: &Value, ctx: &Context) -> Result<Value, ValidationError> {
        let Some(map) = value.as_object() else {
            return Err(ctx.error(format!("Expected object. Received {}.", describe(value))));
        };
        self.check_map(map, ctx, None).map(Value::Object)
    }

    /// Validates `map`, leaving the key named by `reserved` untouched.
    ///
    /// Discriminated unions use `reserved` for their tag, which the variant's
    /// object schema does not declare but must survive validation.
    pub(crate) fn check_map(
        &self,
        map: &Map<String, Value>,
        ctx: &Context,
        reserved: Option<&str>,
    ) -> Result<Map<String, Value>, ValidationError> {
        let mut out = Map::new();
        let mut issues: Vec<ValidationIssue> = Vec::new();

        for field in &self.fields {
            let field_ctx = ctx.field(&field.name);
            match map.get(&field.name) {
                Some(raw) => match field.schema.check(raw, &field_ctx) {
                    Ok(v) => {
                        out.insert(field.name.clone(), v);
                    }
                    Err(e) => issues.extend(e.into_issues()),
                },
                None if field.is_required() => {
                    issues.push(field_ctx.issue(format!("Missing required key \"{}\"", field.name)));
                }
                None => {}
            }
        }

        for (key, raw) in map {
            if self.field(key).is_some() {
                continue;
            }
            if reserved == Some(key.as_str()) {
                out.insert(key.clone(), raw.clone());
                continue;
            }
            match ctx.strictness().unrecognized_object_keys {
                UnrecognizedKeys::Strip => {}
                UnrecognizedKeys::Passthrough => {
                    out.insert(key.clone(), raw.clone());
                }
                UnrecognizedKeys::Fail => {
                    issues.push(ctx.field(key).issue(format!("Unexpected key \"{key}\"")));
                }
            }
        }

        ValidationError::check(issues)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Strictness;
    use serde_json::json;

    fn bi_information() -> ObjectSchema {
        ObjectSchema::new([
            Field::new("workspace_id", Schema::string()),
            Field::new("user", Schema::string()),
            Field::new("count", Schema::integer()),
            Field::new("note", Schema::string().optional()),
        ])
    }

    fn ctx(strictness: Strictness) -> Context {
        Context::new(strictness).with_prefix(["response"])
    }

    #[test]
    fn strip_mode_drops_unknown_keys() {
        let raw = json!({"workspace_id": "w", "user": "u", "count": 3, "extra": true});
        let out = bi_information()
            .check(&raw, &ctx(Strictness::strict()))
            .unwrap();
        assert_eq!(out, json!({"workspace_id": "w", "user": "u", "count": 3}));
    }

    #[test]
    fn passthrough_mode_keeps_unknown_keys() {
        let raw = json!({"workspace_id": "w", "user": "u", "count": 3, "extra": true});
        let out = bi_information()
            .check(&raw, &ctx(Strictness::permissive()))
            .unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn fail_mode_reports_each_unknown_key() {
        let raw = json!({"workspace_id": "w", "user": "u", "count": 3, "a": 1, "b": 2});
        let strictness = Strictness::strict().with_unrecognized_keys(UnrecognizedKeys::Fail);
        let err = bi_information().check(&raw, &ctx(strictness)).unwrap_err();
        let crumbs: Vec<String> = err.issues().iter().map(|i| i.breadcrumb()).collect();
        assert_eq!(crumbs, vec!["response -> a", "response -> b"]);
    }

    #[test]
    fn missing_required_key_fails_in_every_mode() {
        let raw = json!({"workspace_id": "w", "count": 3});
        for strictness in [Strictness::strict(), Strictness::permissive()] {
            let err = bi_information().check(&raw, &ctx(strictness)).unwrap_err();
            assert_eq!(err.issues().len(), 1);
            assert_eq!(err.issues()[0].breadcrumb(), "response -> user");
        }
    }

    #[test]
    fn collects_all_field_failures_in_one_pass() {
        let raw = json!({"workspace_id": 1, "user": "u", "count": "many"});
        let err = bi_information()
            .check(&raw, &ctx(Strictness::strict()))
            .unwrap_err();
        let crumbs: Vec<String> = err.issues().iter().map(|i| i.breadcrumb()).collect();
        assert_eq!(crumbs, vec!["response -> workspace_id", "response -> count"]);
    }

    #[test]
    fn optional_field_may_be_absent_or_null() {
        let absent = json!({"workspace_id": "w", "user": "u", "count": 0});
        let null = json!({"workspace_id": "w", "user": "u", "count": 0, "note": null});
        let schema = bi_information();
        assert_eq!(schema.check(&absent, &ctx(Strictness::strict())).unwrap(), absent);
        assert_eq!(schema.check(&null, &ctx(Strictness::strict())).unwrap(), null);
    }

    #[test]
    fn non_object_is_rejected() {
        let err = bi_information()
            .check(&json!([1, 2]), &ctx(Strictness::strict()))
            .unwrap_err();
        assert_eq!(err.to_string(), "response: Expected object. Received list.");
    }
}
