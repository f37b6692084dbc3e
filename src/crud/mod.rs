//! Generic CRUD client.
//!
//! A [`CrudClient`] is an [`EndpointRegistry`] plus a [`RequestExecutor`].
//! Resources get CRUD by constructing one with their registry; there is no
//! base type to extend.
//!
//! Failure classes stay separate in the return type: misconfiguration comes
//! back as `Err(ConfigError)` before anything is sent, while network and
//! server failures come back as `Ok(Outcome::Failed)` after the user has
//! been notified.

pub mod search;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ConfigError;
use crate::http::{
    ApiRequest, EndpointDescriptor, EndpointRegistry, LoadingFlag, Operation, Outcome,
    RequestExecutor, RequestOptions, ShapeTag,
};

pub use search::{ApiResponse, PaginatedList, SearchParams};

#[derive(Clone)]
pub struct CrudClient {
    registry: EndpointRegistry,
    executor: RequestExecutor,
}

impl CrudClient {
    pub fn new(registry: EndpointRegistry, executor: RequestExecutor) -> Self {
        Self { registry, executor }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn loading(&self) -> &LoadingFlag {
        self.executor.loading()
    }

    pub async fn create<Req, Res>(
        &self,
        data: &Req,
        options: &RequestOptions,
    ) -> Result<Outcome<ApiResponse<Res>>, ConfigError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let endpoint = self.registry.resolve(Operation::Create, None)?;
        let body = checked_body("create", &endpoint, data)?;
        Ok(self.send("create", &endpoint, Some(body), None, options).await)
    }

    pub async fn update<Req, Res>(
        &self,
        id: &str,
        data: &Req,
        options: &RequestOptions,
    ) -> Result<Outcome<ApiResponse<Res>>, ConfigError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let endpoint = self.registry.resolve(Operation::Update, Some(id))?;
        let body = checked_body("update", &endpoint, data)?;
        Ok(self.send("update", &endpoint, Some(body), None, options).await)
    }

    pub async fn get_by_id<Res: DeserializeOwned>(
        &self,
        id: &str,
        options: &RequestOptions,
    ) -> Result<Outcome<ApiResponse<Res>>, ConfigError> {
        let endpoint = self.registry.resolve(Operation::GetById, Some(id))?;
        Ok(self.send("getById", &endpoint, None, None, options).await)
    }

    pub async fn delete(
        &self,
        id: &str,
        options: &RequestOptions,
    ) -> Result<Outcome<ApiResponse<Value>>, ConfigError> {
        let endpoint = self.registry.resolve(Operation::Delete, Some(id))?;
        let outcome: Outcome<Value> = self.send("delete", &endpoint, None, None, options).await;
        Ok(outcome.map(envelope_or_empty))
    }

    pub async fn search<T: DeserializeOwned>(
        &self,
        params: &SearchParams,
        options: &RequestOptions,
    ) -> Result<Outcome<PaginatedList<T>>, ConfigError> {
        let endpoint = self.registry.resolve(Operation::List, None)?;
        tracing::debug!(resource = %self.registry.resource(), ?params, "searching");
        Ok(self
            .send("search", &endpoint, None, Some(params.to_query()), options)
            .await)
    }

    /// Call an endpoint outside the CRUD table (login, deactivate, roles, ...).
    ///
    /// A body is sent when `data` is present and not JSON `null`.
    pub async fn execute_with<Res: DeserializeOwned>(
        &self,
        endpoint: &EndpointDescriptor,
        data: Option<Value>,
        options: &RequestOptions,
    ) -> Result<Outcome<Res>, ConfigError> {
        let body = match data {
            Some(Value::Null) | None => None,
            Some(value) => Some(checked_body("executeWithHandler", endpoint, &value)?),
        };
        Ok(self
            .send("executeWithHandler", endpoint, body, None, options)
            .await)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        endpoint: &EndpointDescriptor,
        body: Option<Value>,
        query: Option<Vec<(String, String)>>,
        options: &RequestOptions,
    ) -> Outcome<T> {
        let mut request = ApiRequest::new(&endpoint.url, endpoint.method);
        if let Some(body) = body {
            request = request.with_body(body);
        }
        if let Some(query) = query {
            request = request.with_query(query);
        }
        let shape = endpoint.response_shape.clone();
        self.executor
            .dispatch(request, options, move |raw| {
                if let Some(shape) = shape {
                    warn_on_response_shape(operation, &shape, raw);
                }
            })
            .await
    }
}

/// Serialize `data` and check it against the endpoint's request shape.
fn checked_body<Req: Serialize + ?Sized>(
    operation: &str,
    endpoint: &EndpointDescriptor,
    data: &Req,
) -> Result<Value, ConfigError> {
    let body = serde_json::to_value(data).map_err(|e| ConfigError::Unserializable {
        operation: operation.to_string(),
        message: e.to_string(),
    })?;

    if let Some(shape) = &endpoint.request_shape
        && let Err(violation) = shape.check(&body)?
    {
        tracing::error!(operation, shape = shape.name(), %violation, "request payload has wrong shape");
        return Err(ConfigError::RequestShapeMismatch {
            operation: operation.to_string(),
            expected: shape.name().to_string(),
            details: violation.to_string(),
        });
    }
    Ok(body)
}

/// Check the envelope's `data` (each element when it is an array). Only warns.
pub fn warn_on_response_shape(operation: &str, shape: &ShapeTag, raw: &Value) {
    let Some(data) = raw.get("data").filter(|d| !d.is_null()) else {
        return;
    };

    let check = |value: &Value, index: Option<usize>| match shape.check(value) {
        Ok(Ok(())) => {}
        Ok(Err(violation)) => tracing::warn!(
            operation,
            shape = shape.name(),
            item = ?index,
            %violation,
            "response does not match declared shape"
        ),
        Err(e) => tracing::error!(operation, error = %e, "response shape could not be checked"),
    };

    match data {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                check(item, Some(index));
            }
        }
        other => check(other, None),
    }
}

/// Endpoints like delete may answer with an empty body.
fn envelope_or_empty(raw: Value) -> ApiResponse<Value> {
    match raw {
        Value::Null => ApiResponse {
            data: None,
            success: true,
            message: None,
        },
        other => match serde_json::from_value::<ApiResponse<Value>>(other.clone()) {
            Ok(envelope) if other.get("success").is_some() => envelope,
            _ => ApiResponse {
                data: Some(other),
                success: true,
                message: None,
            },
        },
    }
}
