//! Tenant client records.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::crud::{ApiResponse, CrudClient, PaginatedList, SearchParams};
use crate::errors::ConfigError;
use crate::http::{ApiRoutes, Outcome, RequestExecutor, RequestOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub document_number: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub paid: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// RFC 3339, or a naive timestamp read as UTC. Anything else is dropped.
fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub document_number: String,
    pub zip_code: String,
    pub paid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub document_number: String,
    pub zip_code: String,
    pub paid: bool,
}

impl From<&Client> for UpdateClientRequest {
    fn from(client: &Client) -> Self {
        Self {
            full_name: client.full_name.clone(),
            email: client.email.clone().unwrap_or_default(),
            phone: client.phone.clone().unwrap_or_default(),
            document_number: client.document_number.clone().unwrap_or_default(),
            zip_code: client.zip_code.clone().unwrap_or_default(),
            paid: client.paid,
        }
    }
}

#[derive(Clone)]
pub struct ClientService {
    routes: ApiRoutes,
    crud: CrudClient,
}

impl ClientService {
    pub fn new(routes: ApiRoutes, executor: RequestExecutor) -> Self {
        let crud = CrudClient::new(routes.clients(), executor);
        Self { routes, crud }
    }

    pub fn crud(&self) -> &CrudClient {
        &self.crud
    }

    pub async fn list(&self, params: &SearchParams) -> Result<Outcome<PaginatedList<Client>>, ConfigError> {
        self.crud.search(params, &RequestOptions::new()).await
    }

    pub async fn get(&self, id: &str) -> Result<Outcome<ApiResponse<Client>>, ConfigError> {
        let options = RequestOptions::new().on_error("Error", "Failed to load client");
        self.crud.get_by_id(id, &options).await
    }

    pub async fn create(&self, request: &CreateClientRequest) -> Result<Outcome<ApiResponse<Value>>, ConfigError> {
        let options = RequestOptions::new()
            .on_success("Success", "Client created.")
            .on_error("Error", "Failed to create client");
        self.crud.create(request, &options).await
    }

    /// PUT to the collection route with `id` merged into the body.
    pub async fn update(
        &self,
        id: &str,
        request: &UpdateClientRequest,
    ) -> Result<Outcome<ApiResponse<Value>>, ConfigError> {
        let mut body = serde_json::to_value(request).map_err(|e| ConfigError::Unserializable {
            operation: "update".to_string(),
            message: e.to_string(),
        })?;
        if let Value::Object(map) = &mut body {
            map.insert("id".to_string(), Value::String(id.to_string()));
        }
        let options = RequestOptions::new()
            .on_success("Success", "Client updated.")
            .on_error("Error", "Failed to update client");
        self.crud
            .execute_with(&self.routes.clients_update(), Some(body), &options)
            .await
    }

    /// Soft delete.
    pub async fn deactivate(&self, id: &str) -> Result<Outcome<ApiResponse<Value>>, ConfigError> {
        let options = RequestOptions::new()
            .on_success("Success", "Client deactivated.")
            .on_error("Error", "Failed to deactivate client");
        self.crud
            .execute_with(&self.routes.clients_deactivate(), Some(json!({ "id": id })), &options)
            .await
    }

    /// Permanent delete.
    pub async fn delete(&self, id: &str) -> Result<Outcome<ApiResponse<Value>>, ConfigError> {
        let options = RequestOptions::new()
            .on_success("Success", "Client deleted.")
            .on_error("Error", "Failed to delete client");
        self.crud.delete(id, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::http::Method;
    use crate::http::transport::mock::MockTransport;
    use crate::notify::RecordingNotifier;

    fn service() -> (ClientService, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let executor = RequestExecutor::new(transport.clone(), Arc::new(RecordingNotifier::new()));
        let routes = ApiRoutes::new("http://api.test").unwrap();
        (ClientService::new(routes, executor), transport)
    }

    fn dell() -> UpdateClientRequest {
        UpdateClientRequest {
            full_name: "Dell".into(),
            email: "buy@dell.com".into(),
            ..UpdateClientRequest::default()
        }
    }

    #[tokio::test]
    async fn update_merges_id_into_body() {
        let (clients, transport) = service();
        transport.respond(Ok(json!({"success": true})));
        let outcome = clients.update("c1", &dell()).await.unwrap();
        assert!(outcome.is_completed());

        let sent = transport.last_request();
        assert_eq!(sent.method, Method::Put);
        assert_eq!(sent.url, "http://api.test/tenant/api/v1/Client");
        let body = sent.body.unwrap();
        assert_eq!(body["id"], json!("c1"));
        assert_eq!(body["fullName"], json!("Dell"));
    }

    #[tokio::test]
    async fn deactivate_patches_id() {
        let (clients, transport) = service();
        let _ = clients.deactivate("c7").await.unwrap();
        let sent = transport.last_request();
        assert_eq!(sent.method, Method::Patch);
        assert!(sent.url.ends_with("/Client/Deactivate"));
        assert_eq!(sent.body, Some(json!({"id": "c7"})));
    }

    #[tokio::test]
    async fn create_without_name_is_rejected_locally() {
        let (clients, transport) = service();
        let request = CreateClientRequest {
            email: "x@y".into(),
            ..CreateClientRequest::default()
        };
        let err = clients.create(&request).await.unwrap_err();
        assert!(matches!(err, ConfigError::RequestShapeMismatch { .. }));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn get_and_delete_use_identifier_routes() {
        let (clients, transport) = service();
        transport.respond(Ok(json!({
            "success": true,
            "data": {"id": "c1", "fullName": "Dell", "createdAt": "2025-01-02T03:04:05Z"}
        })));
        let client = clients.get("c1").await.unwrap().completed().unwrap().into_data().unwrap();
        assert!(client.is_active);
        assert!(client.created_at.is_some());
        assert!(client.updated_at.is_none());
        assert!(transport.last_request().url.ends_with("/Client/GetById?Id=c1"));

        let _ = clients.delete("c1").await.unwrap();
        assert!(transport.last_request().url.ends_with("/Client/Delete/c1"));
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let client: Client = serde_json::from_value(json!({
            "id": "c1", "fullName": "Dell", "createdAt": "2025-01-02T03:04:05.123", "updatedAt": "soon"
        }))
        .unwrap();
        assert_eq!(client.created_at.unwrap().to_rfc3339(), "2025-01-02T03:04:05.123+00:00");
        assert!(client.updated_at.is_none());
    }

    #[test]
    fn update_request_from_record() {
        let client: Client = serde_json::from_value(json!({
            "id": "c1", "fullName": "Dell", "email": "e@d", "paid": true
        }))
        .unwrap();
        let request = UpdateClientRequest::from(&client);
        assert_eq!(request.email, "e@d");
        assert!(request.paid);
    }
}
