//! Datasets and their items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Page, RESOURCE_STRICTNESS, parse_timestamp};
use crate::client::{ApiResponse, Endpoint, EndpointCall, OpikClient};
use crate::config::RequestOptions;
use crate::method::HttpMethod;
use crate::schema::{Field, Schema, SchemaObject};
use crate::transport::Transport;

/// Origin of a dataset item.
///
/// Values introduced by newer servers parse as `Unrecognized` when unknown
/// enum values are allowed, and fail validation otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetItemSource {
    Manual,
    Trace,
    Span,
    Sdk,
    #[serde(untagged)]
    Unrecognized(String),
}

impl SchemaObject for DatasetItemSource {
    fn schema() -> Schema {
        Schema::enumeration(["manual", "trace", "span", "sdk"])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// RFC 3339 timestamp, exactly as sent by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_items_count: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dataset {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_deref())
    }

    pub fn last_updated_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.last_updated_at.as_deref())
    }
}

impl SchemaObject for Dataset {
    fn schema() -> Schema {
        Schema::object([
            Field::new("id", Schema::string()),
            Field::new("name", Schema::string()),
            Field::new("description", Schema::string().optional()),
            Field::new("created_at", Schema::date().optional()),
            Field::new("last_updated_at", Schema::date().optional()),
            Field::new("dataset_items_count", Schema::integer().optional()),
        ])
    }
}

/// Body of a dataset creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetWrite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DatasetWrite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
        }
    }
}

impl SchemaObject for DatasetWrite {
    fn schema() -> Schema {
        Schema::object([
            Field::new("id", Schema::string().optional()),
            Field::new("name", Schema::string()),
            Field::new("description", Schema::string().optional()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    pub source: DatasetItemSource,
    pub data: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DatasetItem {
    pub fn new(source: DatasetItemSource, data: Map<String, Value>) -> Self {
        Self {
            id: None,
            trace_id: None,
            span_id: None,
            source,
            data,
            extra: Map::new(),
        }
    }
}

impl SchemaObject for DatasetItem {
    fn schema() -> Schema {
        Schema::object([
            Field::new("id", Schema::string().optional()),
            Field::new("trace_id", Schema::string().optional()),
            Field::new("span_id", Schema::string().optional()),
            Field::new("source", DatasetItemSource::schema()),
            Field::new("data", Schema::map(Schema::any())),
        ])
    }
}

/// Items to insert, or update by id, in one dataset.
///
/// The dataset is named either by `dataset_name` or `dataset_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetItemBatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    pub items: Vec<DatasetItem>,
}

impl SchemaObject for DatasetItemBatch {
    fn schema() -> Schema {
        Schema::object([
            Field::new("dataset_name", Schema::string().optional()),
            Field::new("dataset_id", Schema::string().optional()),
            Field::new("items", Schema::list(DatasetItem::schema())),
        ])
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

pub fn find_datasets_endpoint() -> Endpoint<(), Page<Dataset>> {
    endpoint("find_datasets", HttpMethod::Get, "/v1/private/datasets")
}

pub fn create_dataset_endpoint() -> Endpoint<DatasetWrite, ()> {
    endpoint("create_dataset", HttpMethod::Post, "/v1/private/datasets")
}

pub fn get_dataset_by_id_endpoint() -> Endpoint<(), Dataset> {
    endpoint("get_dataset_by_id", HttpMethod::Get, "/v1/private/datasets/{id}")
}

pub fn delete_dataset_endpoint() -> Endpoint<(), ()> {
    endpoint("delete_dataset", HttpMethod::Delete, "/v1/private/datasets/{id}")
}

pub fn create_or_update_dataset_items_endpoint() -> Endpoint<DatasetItemBatch, ()> {
    endpoint(
        "create_or_update_dataset_items",
        HttpMethod::Put,
        "/v1/private/datasets/items",
    )
}

pub fn get_dataset_items_endpoint() -> Endpoint<(), Page<DatasetItem>> {
    endpoint(
        "get_dataset_items",
        HttpMethod::Get,
        "/v1/private/datasets/{id}/items",
    )
}

/// Handle for the dataset endpoints.
#[derive(Debug)]
pub struct Datasets<'a, T> {
    client: &'a OpikClient<T>,
}

impl<T: Transport> Datasets<'_, T> {
    /// Lists datasets, optionally filtered by name.
    pub async fn find_datasets(
        &self,
        page: Option<u32>,
        size: Option<u32>,
        name: Option<&str>,
        options: &RequestOptions,
    ) -> ApiResponse<Page<Dataset>> {
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
            .execute(&find_datasets_endpoint(), call, options)
            .await
    }

    pub async fn create_dataset(&self, body: DatasetWrite, options: &RequestOptions) -> ApiResponse<()> {
        self.client
            .execute(&create_dataset_endpoint(), EndpointCall::with_body(body), options)
            .await
    }

    pub async fn get_dataset_by_id(&self, id: &str, options: &RequestOptions) -> ApiResponse<Dataset> {
        self.client
            .execute(
                &get_dataset_by_id_endpoint(),
                EndpointCall::new().path_param("id", id),
                options,
            )
            .await
    }

    pub async fn delete_dataset(&self, id: &str, options: &RequestOptions) -> ApiResponse<()> {
        self.client
            .execute(
                &delete_dataset_endpoint(),
                EndpointCall::new().path_param("id", id),
                options,
            )
            .await
    }

    /// Inserts new items and updates items whose id already exists.
    pub async fn create_or_update_dataset_items(
        &self,
        body: DatasetItemBatch,
        options: &RequestOptions,
    ) -> ApiResponse<()> {
        self.client
            .execute(
                &create_or_update_dataset_items_endpoint(),
                EndpointCall::with_body(body),
                options,
            )
            .await
    }

    pub async fn get_dataset_items(
        &self,
        id: &str,
        page: Option<u32>,
        size: Option<u32>,
        options: &RequestOptions,
    ) -> ApiResponse<Page<DatasetItem>> {
        let mut call = EndpointCall::new().path_param("id", id);
        if let Some(page) = page {
            call = call.query("page", page);
        }
        if let Some(size) = size {
            call = call.query("size", size);
        }
        self.client
            .execute(&get_dataset_items_endpoint(), call, options)
            .await
    }
}

impl<T: Transport> OpikClient<T> {
    pub fn datasets(&self) -> Datasets<'_, T> {
        Datasets { client: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientOptions;
    use crate::schema::{Context, Strictness};
    use crate::transport::{Reply, ReplayTransport};
    use serde_json::json;

    #[test]
    fn unknown_source_depends_on_strictness() {
        let strict = Context::new(Strictness::strict()).with_prefix(["response"]);
        let err = DatasetItemSource::from_wire(&json!("unexpected"), &strict).unwrap_err();
        assert_eq!(err.issues()[0].path, vec!["response"]);

        let lenient = Context::new(Strictness::permissive()).with_prefix(["response"]);
        let source = DatasetItemSource::from_wire(&json!("unexpected"), &lenient).unwrap();
        assert_eq!(source, DatasetItemSource::Unrecognized("unexpected".to_string()));
        assert_eq!(source.to_wire(&lenient).unwrap(), json!("unexpected"));
    }

    #[test]
    fn known_sources_round_trip() {
        let ctx = Context::new(Strictness::strict());
        for raw in ["manual", "trace", "span", "sdk"] {
            let source = DatasetItemSource::from_wire(&json!(raw), &ctx).unwrap();
            assert!(!matches!(source, DatasetItemSource::Unrecognized(_)));
            assert_eq!(source.to_wire(&ctx).unwrap(), json!(raw));
        }
    }

    #[test]
    fn dataset_dates_must_be_rfc3339() {
        let ctx = Context::new(Strictness::strict()).with_prefix(["response"]);
        let ok = json!({"id": "d1", "name": "golden", "created_at": "2024-05-01T10:00:00Z"});
        let dataset = Dataset::from_wire(&ok, &ctx).unwrap();
        assert_eq!(dataset.created_at_utc().unwrap().timestamp(), 1_714_557_600);

        let bad = json!({"id": "d1", "name": "golden", "created_at": "yesterday"});
        let err = Dataset::from_wire(&bad, &ctx).unwrap_err();
        assert_eq!(err.issues()[0].path, vec!["response", "created_at"]);
    }

    #[tokio::test]
    async fn find_datasets_sends_query_and_parses_page() {
        let transport = ReplayTransport::new().then(Reply::json(
            200,
            json!({
                "page": 1,
                "size": 2,
                "total": 1,
                "content": [{"id": "d1", "name": "golden", "dataset_items_count": 4}]
            }),
        ));
        let client = OpikClient::with_transport(ClientOptions::new(), transport.clone());

        let page = client
            .datasets()
            .find_datasets(Some(1), Some(2), Some("gold en"), &RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(page.items()[0].dataset_items_count, Some(4));
        assert_eq!(
            transport.requests()[0].url,
            "http://localhost:5173/api/v1/private/datasets?page=1&size=2&name=gold+en"
        );
    }

    #[tokio::test]
    async fn item_batch_is_serialized_as_json() {
        let transport = ReplayTransport::new().then(Reply::empty(204));
        let client = OpikClient::with_transport(ClientOptions::new(), transport.clone());

        let mut data = Map::new();
        data.insert("input".to_string(), json!("What is Opik?"));
        let batch = DatasetItemBatch {
            dataset_name: Some("golden".to_string()),
            dataset_id: None,
            items: vec![DatasetItem::new(DatasetItemSource::Sdk, data)],
        };

        let response = client
            .datasets()
            .create_or_update_dataset_items(batch, &RequestOptions::new())
            .await;
        assert!(response.is_ok());

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, HttpMethod::Put);
        assert_eq!(
            sent.json(),
            Some(json!({
                "dataset_name": "golden",
                "items": [{"source": "sdk", "data": {"input": "What is Opik?"}}]
            }))
        );
    }

    #[test]
    fn dataset_models_serialize_back_to_the_wire_text() {
        let ctx = Context::new(RESOURCE_STRICTNESS);

        let datasets = [
            json!({
                "id": "d1",
                "name": "golden",
                "created_at": "2024-05-01T10:00:00.000Z",
                "last_updated_at": "2024-05-01T12:00:00+02:00",
                "dataset_items_count": 3,
                "tags": ["eval"]
            }),
            json!({"id": "d2", "name": "bare"}),
        ];
        for raw in datasets {
            let dataset = Dataset::from_wire(&raw, &ctx).unwrap();
            assert_eq!(dataset.to_wire(&ctx).unwrap(), raw);
        }

        let dataset = Dataset::from_wire(&json!({
            "id": "d1",
            "name": "golden",
            "last_updated_at": "2024-05-01T12:00:00+02:00"
        }), &ctx)
        .unwrap();
        assert_eq!(dataset.last_updated_at_utc().unwrap().timestamp(), 1_714_557_600);

        let write = json!({"id": "d1", "name": "golden", "description": "curated"});
        assert_eq!(DatasetWrite::from_wire(&write, &ctx).unwrap().to_wire(&ctx).unwrap(), write);

        let item = json!({
            "id": "i1",
            "trace_id": "t1",
            "source": "trace",
            "data": {"input": "hi", "score": 1},
            "created_by": "ana"
        });
        assert_eq!(DatasetItem::from_wire(&item, &ctx).unwrap().to_wire(&ctx).unwrap(), item);

        let batch = json!({
            "dataset_name": "golden",
            "items": [{"source": "manual", "data": {"q": "?"}}]
        });
        assert_eq!(
            DatasetItemBatch::from_wire(&batch, &ctx).unwrap().to_wire(&ctx).unwrap(),
            batch
        );
    }

    #[tokio::test]
    async fn create_accepts_a_response_body() {
        let transport = ReplayTransport::new().then(Reply::json(201, json!({"id": "d1"})));
        let client = OpikClient::with_transport(ClientOptions::new(), transport.clone());

        let response = client
            .datasets()
            .create_dataset(DatasetWrite::new("golden"), &RequestOptions::new())
            .await;

        assert!(response.is_ok());
        assert_eq!(transport.requests()[0].json(), Some(json!({"name": "golden"})));
    }

    #[tokio::test]
    async fn delete_encodes_the_id() {
        let transport = ReplayTransport::new().then(Reply::empty(204));
        let client = OpikClient::with_transport(ClientOptions::new(), transport.clone());

        client
            .datasets()
            .delete_dataset("a/b", &RequestOptions::new())
            .await
            .unwrap();
        assert!(transport.requests()[0].url.ends_with("/v1/private/datasets/a%2Fb"));
    }
}
