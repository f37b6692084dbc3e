//! Endpoint registry: logical operations mapped to concrete URL + method.
//!
//! A resource (users, clients, ...) declares each operation it supports as one of:
//! - a fixed [`EndpointDescriptor`],
//! - a zero-argument factory, or
//! - a factory taking the record identifier.
//!
//! Factories must be pure given the identifier. Asking for an operation the
//! resource never declared is a programmer error and resolves to
//! [`ConfigError::EndpointNotDeclared`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::shape::ShapeTag;
use crate::errors::ConfigError;

/// HTTP methods the backend uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "get"),
            Method::Post => write!(f, "post"),
            Method::Put => write!(f, "put"),
            Method::Patch => write!(f, "patch"),
            Method::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for Method {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(Method::Get),
            "post" => Ok(Method::Post),
            "put" => Ok(Method::Put),
            "patch" => Ok(Method::Patch),
            "delete" => Ok(Method::Delete),
            _ => anyhow::bail!(
                "Unsupported HTTP method '{}'. Valid values: get, post, put, patch, delete",
                s
            ),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Declarative record of one API operation.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescriptor {
    pub url: String,
    pub method: Method,
    pub request_shape: Option<ShapeTag>,
    pub response_shape: Option<ShapeTag>,
}

impl EndpointDescriptor {
    pub fn new(url: impl Into<String>, method: Method) -> Self {
        Self {
            url: url.into(),
            method,
            request_shape: None,
            response_shape: None,
        }
    }

    pub fn with_request_shape(mut self, shape: ShapeTag) -> Self {
        self.request_shape = Some(shape);
        self
    }

    pub fn with_response_shape(mut self, shape: ShapeTag) -> Self {
        self.response_shape = Some(shape);
        self
    }
}

/// Logical CRUD operations a resource can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
    GetById,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::List => write!(f, "list"),
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::GetById => write!(f, "getById"),
        }
    }
}

pub type DescriptorFn = Arc<dyn Fn() -> EndpointDescriptor + Send + Sync>;
pub type DescriptorByIdFn = Arc<dyn Fn(&str) -> EndpointDescriptor + Send + Sync>;

/// How an operation's descriptor is produced.
#[derive(Clone)]
pub enum EndpointDecl {
    Static(EndpointDescriptor),
    Thunk(DescriptorFn),
    ById(DescriptorByIdFn),
}

impl fmt::Debug for EndpointDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointDecl::Static(d) => f.debug_tuple("Static").field(d).finish(),
            EndpointDecl::Thunk(_) => f.write_str("Thunk(..)"),
            EndpointDecl::ById(_) => f.write_str("ById(..)"),
        }
    }
}

/// Per-resource table of declared operations.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    resource: String,
    decls: BTreeMap<Operation, EndpointDecl>,
}

impl EndpointRegistry {
    pub fn builder(resource: impl Into<String>) -> EndpointRegistryBuilder {
        EndpointRegistryBuilder {
            resource: resource.into(),
            decls: BTreeMap::new(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn declares(&self, operation: Operation) -> bool {
        self.decls.contains_key(&operation)
    }

    /// Resolve `operation` to a concrete descriptor.
    ///
    /// Identifier-taking factories are invoked with `id`; zero-argument
    /// factories and fixed descriptors ignore it.
    pub fn resolve(
        &self,
        operation: Operation,
        id: Option<&str>,
    ) -> Result<EndpointDescriptor, ConfigError> {
        let decl = self.decls.get(&operation).ok_or_else(|| {
            tracing::error!(
                resource = %self.resource,
                %operation,
                "endpoint requested but never declared"
            );
            ConfigError::EndpointNotDeclared {
                resource: self.resource.clone(),
                operation: operation.to_string(),
            }
        })?;

        match (decl, id) {
            (EndpointDecl::Static(descriptor), _) => Ok(descriptor.clone()),
            (EndpointDecl::Thunk(factory), _) => Ok(factory()),
            (EndpointDecl::ById(factory), Some(id)) => Ok(factory(id)),
            (EndpointDecl::ById(_), None) => {
                tracing::error!(
                    resource = %self.resource,
                    %operation,
                    "identifier-taking endpoint resolved without an identifier"
                );
                Err(ConfigError::MissingIdentifier {
                    resource: self.resource.clone(),
                    operation: operation.to_string(),
                })
            }
        }
    }
}

pub struct EndpointRegistryBuilder {
    resource: String,
    decls: BTreeMap<Operation, EndpointDecl>,
}

impl EndpointRegistryBuilder {
    pub fn declare(mut self, operation: Operation, decl: EndpointDecl) -> Self {
        self.decls.insert(operation, decl);
        self
    }

    pub fn fixed(self, operation: Operation, descriptor: EndpointDescriptor) -> Self {
        self.declare(operation, EndpointDecl::Static(descriptor))
    }

    pub fn lazy<F>(self, operation: Operation, factory: F) -> Self
    where
        F: Fn() -> EndpointDescriptor + Send + Sync + 'static,
    {
        self.declare(operation, EndpointDecl::Thunk(Arc::new(factory)))
    }

    pub fn by_id<F>(self, operation: Operation, factory: F) -> Self
    where
        F: Fn(&str) -> EndpointDescriptor + Send + Sync + 'static,
    {
        self.declare(operation, EndpointDecl::ById(Arc::new(factory)))
    }

    pub fn build(self) -> EndpointRegistry {
        EndpointRegistry {
            resource: self.resource,
            decls: self.decls,
        }
    }
}
