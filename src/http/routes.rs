//! The backend's route table.
//!
//! Every URL is built under a single base URL taken from configuration.

use reqwest::Url;

use super::endpoint::{EndpointDescriptor, EndpointRegistry, Method, Operation};
use super::shape;
use crate::errors::ConfigError;

#[derive(Debug, Clone)]
pub struct ApiRoutes {
    base: String,
}

impl ApiRoutes {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    // Auth

    pub fn auth_login(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(self.url("/api/v1/Auth/Login"), Method::Post)
            .with_request_shape(shape::login_request())
            .with_response_shape(shape::login_profile())
    }

    pub fn auth_register(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(self.url("/api/v1/Auth/Register"), Method::Post)
    }

    pub fn auth_google(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(self.url("/api/v1/Auth/Google"), Method::Get)
    }

    /// `code` and `state` are percent-encoded into the query string.
    pub fn auth_google_callback(&self, code: &str, state: &str) -> EndpointDescriptor {
        let raw = self.url("/api/v1/Auth/Google/Callback");
        let url = match Url::parse(&raw) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("code", code)
                    .append_pair("state", state);
                url.to_string()
            }
            // The base was validated in `new`, so this only guards odd paths.
            Err(_) => format!("{}?code={}&state={}", raw, code, state),
        };
        EndpointDescriptor::new(url, Method::Get)
    }

    pub fn auth_logout(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(self.url("/api/v1/Auth/Logout"), Method::Post)
    }

    pub fn health(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(self.url("/api/Health"), Method::Get)
    }

    // Users

    pub fn users_roles(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(self.url("/api/v1/Users/Roles"), Method::Get)
    }

    /// The backend spells this route "Polices".
    pub fn users_policies(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(self.url("/api/v1/Users/Polices"), Method::Get)
    }

    pub fn users(&self) -> EndpointRegistry {
        let collection = self.url("/api/v1/Users");
        let base = self.base.clone();
        EndpointRegistry::builder("users")
            .fixed(
                Operation::Create,
                EndpointDescriptor::new(collection.clone(), Method::Post),
            )
            .fixed(
                Operation::Update,
                EndpointDescriptor::new(collection.clone(), Method::Put),
            )
            .fixed(
                Operation::List,
                EndpointDescriptor::new(collection, Method::Get)
                    .with_response_shape(shape::user_record()),
            )
            .by_id(Operation::Delete, move |id| {
                EndpointDescriptor::new(with_id_segment(&base, "/api/v1/Users", id), Method::Delete)
            })
            .build()
    }

    // Clients

    pub fn clients_update(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(self.url("/tenant/api/v1/Client"), Method::Put)
            .with_request_shape(shape::update_client_request())
    }

    pub fn clients_deactivate(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(self.url("/tenant/api/v1/Client/Deactivate"), Method::Patch)
    }

    pub fn clients(&self) -> EndpointRegistry {
        let collection = self.url("/tenant/api/v1/Client");
        let get_base = self.base.clone();
        let delete_base = self.base.clone();
        EndpointRegistry::builder("clients")
            .fixed(
                Operation::Create,
                EndpointDescriptor::new(collection.clone(), Method::Post)
                    .with_request_shape(shape::create_client_request()),
            )
            .fixed(Operation::Update, self.clients_update())
            .fixed(
                Operation::List,
                EndpointDescriptor::new(collection, Method::Get)
                    .with_response_shape(shape::client_record()),
            )
            .by_id(Operation::GetById, move |id| {
                EndpointDescriptor::new(
                    with_id_query(&get_base, "/tenant/api/v1/Client/GetById", "Id", id),
                    Method::Get,
                )
                .with_response_shape(shape::client_record())
            })
            .by_id(Operation::Delete, move |id| {
                EndpointDescriptor::new(
                    with_id_segment(&delete_base, "/tenant/api/v1/Client/Delete", id),
                    Method::Delete,
                )
            })
            .build()
    }
}

/// `{base}{path}/{id}` with `id` percent-encoded as a single path segment.
fn with_id_segment(base: &str, path: &str, id: &str) -> String {
    let raw = format!("{}{}", base, path);
    match Url::parse(&raw) {
        Ok(mut url) => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(id);
            }
            url.to_string()
        }
        Err(_) => format!("{}/{}", raw, id),
    }
}

/// `{base}{path}?{key}={id}` with `id` form-encoded.
fn with_id_query(base: &str, path: &str, key: &str, id: &str) -> String {
    let raw = format!("{}{}", base, path);
    match Url::parse(&raw) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair(key, id);
            url.to_string()
        }
        Err(_) => format!("{}?{}={}", raw, key, id),
    }
}
