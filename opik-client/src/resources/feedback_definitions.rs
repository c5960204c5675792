//! Feedback score definitions.
//!
//! A definition is a union tagged by its `type` key. Kinds this crate does
//! not know about parse as [`FeedbackDefinition::Unrecognized`] when the call
//! allows unrecognized union members.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use super::{Page, RESOURCE_STRICTNESS, parse_timestamp};
use crate::client::{ApiResponse, Endpoint, EndpointCall, OpikClient};
use crate::config::RequestOptions;
use crate::method::HttpMethod;
use crate::schema::{Field, ObjectSchema, Schema, SchemaObject, UnionSchema};
use crate::transport::Transport;

const TYPE_KEY: &str = "type";
const NUMERICAL: &str = "numerical";
const CATEGORICAL: &str = "categorical";

/// Score bounds, kept as the server wrote them (`0` stays an integer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericalDetails {
    pub min: Number,
    pub max: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NumericalDetails {
    pub fn new(min: impl Into<Number>, max: impl Into<Number>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalDetails {
    /// Category name to score.
    pub categories: BTreeMap<String, Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CategoricalDetails {
    pub fn new<K, V>(categories: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Number>,
    {
        Self {
            categories: categories
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            extra: Map::new(),
        }
    }
}

/// Fields shared by every definition kind, generic over its details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition<D> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub details: D,
    /// RFC 3339 timestamp, exactly as sent by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<D> Definition<D> {
    pub fn new(name: impl Into<String>, details: D) -> Self {
        Self {
            id: None,
            name: name.into(),
            details,
            created_at: None,
            last_updated_at: None,
            extra: Map::new(),
        }
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_deref())
    }

    pub fn last_updated_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.last_updated_at.as_deref())
    }
}

pub type NumericalFeedbackDefinition = Definition<NumericalDetails>;
pub type CategoricalFeedbackDefinition = Definition<CategoricalDetails>;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackDefinition {
    Numerical(NumericalFeedbackDefinition),
    Categorical(CategoricalFeedbackDefinition),
    /// A kind added after this crate was built, kept verbatim.
    Unrecognized(Value),
}

impl FeedbackDefinition {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Numerical(d) => Some(&d.name),
            Self::Categorical(d) => Some(&d.name),
            Self::Unrecognized(raw) => raw.get("name").and_then(Value::as_str),
        }
    }
}

impl Serialize for FeedbackDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (tag, inner) = match self {
            Self::Numerical(d) => (NUMERICAL, serde_json::to_value(d)),
            Self::Categorical(d) => (CATEGORICAL, serde_json::to_value(d)),
            Self::Unrecognized(raw) => return raw.serialize(serializer),
        };
        let mut value = inner.map_err(S::Error::custom)?;
        if let Value::Object(map) = &mut value {
            map.insert(TYPE_KEY.to_string(), Value::String(tag.to_string()));
        }
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FeedbackDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut value = Value::deserialize(deserializer)?;
        let tag = value.get(TYPE_KEY).and_then(Value::as_str).map(str::to_owned);
        match tag.as_deref() {
            Some(NUMERICAL) | Some(CATEGORICAL) => {
                if let Value::Object(map) = &mut value {
                    map.remove(TYPE_KEY);
                }
                if tag.as_deref() == Some(NUMERICAL) {
                    serde_json::from_value(value)
                        .map(Self::Numerical)
                        .map_err(D::Error::custom)
                } else {
                    serde_json::from_value(value)
                        .map(Self::Categorical)
                        .map_err(D::Error::custom)
                }
            }
            _ => Ok(Self::Unrecognized(value)),
        }
    }
}

fn definition_fields(details: Schema) -> ObjectSchema {
    ObjectSchema::new([
        Field::new("id", Schema::string().optional()),
        Field::new("name", Schema::string()),
        Field::new("details", details),
        Field::new("created_at", Schema::date().optional()),
        Field::new("last_updated_at", Schema::date().optional()),
    ])
}

impl SchemaObject for FeedbackDefinition {
    fn schema() -> Schema {
        Schema::Union(UnionSchema::discriminated(
            TYPE_KEY,
            [
                (
                    NUMERICAL,
                    definition_fields(Schema::object([
                        Field::new("min", Schema::number()),
                        Field::new("max", Schema::number()),
                    ])),
                ),
                (
                    CATEGORICAL,
                    definition_fields(Schema::object([Field::new(
                        "categories",
                        Schema::map(Schema::number()),
                    )])),
                ),
            ],
        ))
    }
}

fn endpoint<Req, Res>(id: &str, method: HttpMethod, path: &str) -> Endpoint<Req, Res> {
    Endpoint::builder()
        .id(id)
        .method(method)
        .path(path)
        .strictness(RESOURCE_STRICTNESS)
        .build()
}

pub fn find_feedback_definitions_endpoint() -> Endpoint<(), Page<FeedbackDefinition>> {
    endpoint(
        "find_feedback_definitions",
        HttpMethod::Get,
        "/v1/private/feedback-definitions",
    )
}

pub fn create_feedback_definition_endpoint() -> Endpoint<FeedbackDefinition, ()> {
    endpoint(
        "create_feedback_definition",
        HttpMethod::Post,
        "/v1/private/feedback-definitions",
    )
}

pub fn get_feedback_definition_by_id_endpoint() -> Endpoint<(), FeedbackDefinition> {
    endpoint(
        "get_feedback_definition_by_id",
        HttpMethod::Get,
        "/v1/private/feedback-definitions/{id}",
    )
}

pub fn update_feedback_definition_endpoint() -> Endpoint<FeedbackDefinition, ()> {
    endpoint(
        "update_feedback_definition",
        HttpMethod::Put,
        "/v1/private/feedback-definitions/{id}",
    )
}

pub fn delete_feedback_definition_by_id_endpoint() -> Endpoint<(), ()> {
    endpoint(
        "delete_feedback_definition_by_id",
        HttpMethod::Delete,
        "/v1/private/feedback-definitions/{id}",
    )
}

#[derive(Debug)]
pub struct FeedbackDefinitions<'a, T> {
    client: &'a OpikClient<T>,
}

impl<T: Transport> FeedbackDefinitions<'_, T> {
    /// Lists definitions, optionally filtered by name.
    pub async fn find_feedback_definitions(
        &self,
        page: Option<u32>,
        size: Option<u32>,
        name: Option<&str>,
        options: &RequestOptions,
    ) -> ApiResponse<Page<FeedbackDefinition>> {
        let mut call = EndpointCall::new();
        if let Some(page) = page {
            call = call.query("page", page);
        }
        if let Some(size) = size {
            call = call.query("size", size);
        }
        if let Some(name) = name {
            call = call.query("name", name);
        }
        self.client
            .execute(&find_feedback_definitions_endpoint(), call, options)
            .await
    }

    pub async fn create_feedback_definition(
        &self,
        body: FeedbackDefinition,
        options: &RequestOptions,
    ) -> ApiResponse<()> {
        self.client
            .execute(
                &create_feedback_definition_endpoint(),
                EndpointCall::with_body(body),
                options,
            )
            .await
    }

    pub async fn get_feedback_definition_by_id(
        &self,
        id: &str,
        options: &RequestOptions,
    ) -> ApiResponse<FeedbackDefinition> {
        self.client
            .execute(
                &get_feedback_definition_by_id_endpoint(),
                EndpointCall::new().path_param("id", id),
                options,
            )
            .await
    }

    pub async fn update_feedback_definition(
        &self,
        id: &str,
        body: FeedbackDefinition,
        options: &RequestOptions,
    ) -> ApiResponse<()> {
        self.client
            .execute(
                &update_feedback_definition_endpoint(),
                EndpointCall::with_body(body).path_param("id", id),
                options,
            )
            .await
    }

    pub async fn delete_feedback_definition_by_id(
        &self,
        id: &str,
        options: &RequestOptions,
    ) -> ApiResponse<()> {
        self.client
            .execute(
                &delete_feedback_definition_by_id_endpoint(),
                EndpointCall::new().path_param("id", id),
                options,
            )
            .await
    }
}

impl<T: Transport> OpikClient<T> {
    pub fn feedback_definitions(&self) -> FeedbackDefinitions<'_, T> {
        FeedbackDefinitions { client: self }
    }
}
