//! Internal usage reporting.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::RESOURCE_STRICTNESS;
use crate::client::{ApiResponse, Endpoint, EndpointCall, OpikClient};
use crate::config::RequestOptions;
use crate::method::HttpMethod;
use crate::schema::{Field, Schema, SchemaObject};
use crate::transport::Transport;

/// Usage count of one user in one workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiInformation {
    pub workspace_id: String,
    pub user: String,
    pub count: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchemaObject for BiInformation {
    fn schema() -> Schema {
        Schema::object([
            Field::new("workspace_id", Schema::string()),
            Field::new("user", Schema::string()),
            Field::new("count", Schema::integer()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiInformationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bi_information: Option<Vec<BiInformation>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BiInformationResponse {
    pub fn entries(&self) -> &[BiInformation] {
        self.bi_information.as_deref().unwrap_or_default()
    }
}

impl SchemaObject for BiInformationResponse {
    fn schema() -> Schema {
        Schema::object([Field::new(
            "bi_information",
            Schema::list(BiInformation::schema()).optional(),
        )])
    }
}

/// Trace count of one workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceTraceCount {
    pub workspace: String,
    pub trace_count: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchemaObject for WorkspaceTraceCount {
    fn schema() -> Schema {
        Schema::object([
            Field::new("workspace", Schema::string()),
            Field::new("trace_count", Schema::integer()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceCountResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspaces_traces_count: Option<Vec<WorkspaceTraceCount>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TraceCountResponse {
    pub fn entries(&self) -> &[WorkspaceTraceCount] {
        self.workspaces_traces_count.as_deref().unwrap_or_default()
    }
}

impl SchemaObject for TraceCountResponse {
    fn schema() -> Schema {
        Schema::object([Field::new(
            "workspaces_traces_count",
            Schema::list(WorkspaceTraceCount::schema()).optional(),
        )])
    }
}

fn bi_endpoint(id: &str, path: &str) -> Endpoint<(), BiInformationResponse> {
    Endpoint::builder()
        .id(id)
        .method(HttpMethod::Get)
        .path(path)
        .strictness(RESOURCE_STRICTNESS)
        .build()
}

pub fn get_bi_traces_endpoint() -> Endpoint<(), BiInformationResponse> {
    bi_endpoint("get_traces_bi_info", "/v1/internal/usage/bi-traces")
}

pub fn get_bi_experiments_endpoint() -> Endpoint<(), BiInformationResponse> {
    bi_endpoint("get_experiment_bi_info", "/v1/internal/usage/bi-experiments")
}

pub fn get_bi_datasets_endpoint() -> Endpoint<(), BiInformationResponse> {
    bi_endpoint("get_dataset_bi_info", "/v1/internal/usage/bi-datasets")
}

pub fn get_traces_count_endpoint() -> Endpoint<(), TraceCountResponse> {
    Endpoint::builder()
        .id("get_traces_count_for_workspaces")
        .method(HttpMethod::Get)
        .path("/v1/internal/usage/workspace-trace-counts")
        .strictness(RESOURCE_STRICTNESS)
        .build()
}

/// Handle for the usage endpoints.
#[derive(Debug)]
pub struct SystemUsage<'a, T> {
    client: &'a OpikClient<T>,
}

impl<T: Transport> SystemUsage<'_, T> {
    /// Trace counts per user and workspace.
    pub async fn get_bi_traces(&self, options: &RequestOptions) -> ApiResponse<BiInformationResponse> {
        self.client
            .execute(&get_bi_traces_endpoint(), EndpointCall::new(), options)
            .await
    }

    pub async fn get_bi_experiments(
        &self,
        options: &RequestOptions,
    ) -> ApiResponse<BiInformationResponse> {
        self.client
            .execute(&get_bi_experiments_endpoint(), EndpointCall::new(), options)
            .await
    }

    pub async fn get_bi_datasets(&self, options: &RequestOptions) -> ApiResponse<BiInformationResponse> {
        self.client
            .execute(&get_bi_datasets_endpoint(), EndpointCall::new(), options)
            .await
    }

    pub async fn get_traces_count(&self, options: &RequestOptions) -> ApiResponse<TraceCountResponse> {
        self.client
            .execute(&get_traces_count_endpoint(), EndpointCall::new(), options)
            .await
    }
}

impl<T: Transport> OpikClient<T> {
    pub fn system_usage(&self) -> SystemUsage<'_, T> {
        SystemUsage { client: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientOptions;
    use crate::schema::Context;
    use crate::transport::{Reply, ReplayTransport};
    use serde_json::json;

    #[test]
    fn usage_bodies_serialize_back_to_the_wire_text() {
        let ctx = Context::new(RESOURCE_STRICTNESS);

        for raw in [
            json!({}),
            json!({"bi_information": []}),
            json!({
                "bi_information": [{"workspace_id": "w1", "user": "ana", "count": 2, "team": "ml"}],
                "generated_at": "2024-05-01T10:00:00.000Z"
            }),
        ] {
            let body = BiInformationResponse::from_wire(&raw, &ctx).unwrap();
            assert_eq!(body.to_wire(&ctx).unwrap(), raw);
        }
        assert!(BiInformationResponse::from_wire(&json!({}), &ctx).unwrap().entries().is_empty());

        for raw in [
            json!({}),
            json!({"workspaces_traces_count": [{"workspace": "w1", "trace_count": 0}]}),
        ] {
            let body = TraceCountResponse::from_wire(&raw, &ctx).unwrap();
            assert_eq!(body.to_wire(&ctx).unwrap(), raw);
        }
    }

    #[tokio::test]
    async fn bi_traces_parses_typed_body() {
        let transport = ReplayTransport::new().then(Reply::json(
            200,
            json!({"bi_information": [{"workspace_id": "w1", "user": "ana", "count": 12}]}),
        ));
        let client = OpikClient::with_transport(ClientOptions::new(), transport.clone());

        let body = client
            .system_usage()
            .get_bi_traces(&RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(body.entries().len(), 1);
        assert_eq!(body.entries()[0].user, "ana");
        assert_eq!(body.entries()[0].count, 12);
        assert!(
            transport.requests()[0]
                .url
                .ends_with("/api/v1/internal/usage/bi-traces")
        );
    }

    #[tokio::test]
    async fn trace_counts_keep_unknown_fields() {
        let transport = ReplayTransport::new().then(Reply::json(
            200,
            json!({"workspaces_traces_count": [{"workspace": "w1", "trace_count": 3, "region": "eu"}]}),
        ));
        let client = OpikClient::with_transport(ClientOptions::new(), transport);

        let body = client
            .system_usage()
            .get_traces_count(&RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(
            body.entries()[0].extra.get("region"),
            Some(&json!("eu"))
        );
    }
}
