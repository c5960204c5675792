//! Endpoint definitions for a subset of the Opik API.
//!
//! Each submodule declares its models (with their wire schemas), the
//! [`Endpoint`](crate::client::Endpoint) constructors, and a borrowed
//! resource handle whose methods are thin pass-throughs to
//! [`OpikClient::execute`](crate::client::OpikClient::execute).
//!
//! Resource endpoints validate with [`Strictness::permissive`], so fields
//! and enum values added by newer servers are preserved instead of
//! rejected.

pub mod datasets;
pub mod feedback_definitions;
pub mod system_usage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{Field, Schema, SchemaObject, Strictness};

/// Strictness used by every endpoint in this module.
pub const RESOURCE_STRICTNESS: Strictness = Strictness::permissive();

/// Parses a wire timestamp kept as text on a model.
///
/// Models store timestamps as the exact string received, so serializing them
/// back reproduces the original precision and offset.
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<T>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T> Page<T> {
    /// Items of this page; empty when the server sent no `content`.
    pub fn items(&self) -> &[T] {
        self.content.as_deref().unwrap_or_default()
    }
}

impl<T: SchemaObject> SchemaObject for Page<T> {
    fn schema() -> Schema {
        Schema::object([
            Field::new("page", Schema::integer().optional()),
            Field::new("size", Schema::integer().optional()),
            Field::new("total", Schema::integer().optional()),
            Field::new("content", Schema::list(T::schema()).optional()),
        ])
    }
}
