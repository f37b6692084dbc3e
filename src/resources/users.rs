//! Tenant user administration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crud::{ApiResponse, CrudClient, PaginatedList, SearchParams};
use crate::errors::ConfigError;
use crate::http::{ApiRoutes, Outcome, RequestExecutor, RequestOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub policies: Vec<String>,
}

/// A role or policy the backend offers for assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub key: String,
    pub value: String,
}

pub type Role = Grant;
pub type Policy = Grant;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub roles: Vec<String>,
    pub policies: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub roles: Vec<String>,
    pub policies: Vec<String>,
}

#[derive(Clone)]
pub struct UserService {
    routes: ApiRoutes,
    crud: CrudClient,
}

impl UserService {
    pub fn new(routes: ApiRoutes, executor: RequestExecutor) -> Self {
        let crud = CrudClient::new(routes.users(), executor);
        Self { routes, crud }
    }

    pub fn crud(&self) -> &CrudClient {
        &self.crud
    }

    pub async fn list(&self, params: &SearchParams) -> Result<Outcome<PaginatedList<User>>, ConfigError> {
        self.crud.search(params, &RequestOptions::new()).await
    }

    pub async fn create(&self, request: &CreateUserRequest) -> Result<Outcome<ApiResponse<User>>, ConfigError> {
        let options = RequestOptions::new()
            .on_success("Success", "User created.")
            .on_error("Error", "Failed to create user");
        self.crud.create(request, &options).await
    }

    /// The update route is static; the user id travels in the body.
    pub async fn update(&self, request: &UpdateUserRequest) -> Result<Outcome<ApiResponse<User>>, ConfigError> {
        let options = RequestOptions::new()
            .on_success("Success", "User updated.")
            .on_error("Error", "Failed to update user");
        self.crud.update(&request.user_id, request, &options).await
    }

    pub async fn delete(&self, id: &str) -> Result<Outcome<ApiResponse<Value>>, ConfigError> {
        let options = RequestOptions::new()
            .on_success("Success", "User deleted.")
            .on_error("Error", "Failed to delete user");
        self.crud.delete(id, &options).await
    }

    /// Assignable roles; empty when the envelope carries no data.
    pub async fn roles(&self) -> Result<Outcome<Vec<Grant>>, ConfigError> {
        let options = RequestOptions::new().on_error("Error", "Failed to load user roles");
        let outcome = self
            .crud
            .execute_with::<ApiResponse<Vec<Grant>>>(&self.routes.users_roles(), None, &options)
            .await?;
        Ok(outcome.map(|r| r.data.unwrap_or_default()))
    }

    pub async fn policies(&self) -> Result<Outcome<Vec<Grant>>, ConfigError> {
        let options = RequestOptions::new().on_error("Error", "Failed to load user policies");
        let outcome = self
            .crud
            .execute_with::<ApiResponse<Vec<Grant>>>(&self.routes.users_policies(), None, &options)
            .await?;
        Ok(outcome.map(|r| r.data.unwrap_or_default()))
    }
}
