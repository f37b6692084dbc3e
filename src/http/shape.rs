//! Declarative payload shapes.
//!
//! A [`ShapeTag`] names an expected JSON structure and carries the JSON Schema
//! that describes it. Request payloads that violate their declared shape are a
//! configuration error; response payloads only produce a warning.

use std::fmt;
use std::sync::{Arc, LazyLock, OnceLock};

use serde_json::{Value, json};

use crate::errors::ConfigError;

/// A named JSON Schema used to check request and response payloads.
///
/// The schema is compiled on first use; clones share the compiled validator.
#[derive(Clone)]
pub struct ShapeTag {
    name: &'static str,
    schema: Arc<Value>,
    compiled: Arc<OnceLock<Result<jsonschema::Validator, String>>>,
}

/// Why a value failed its shape check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeViolation {
    pub shape: &'static str,
    pub problems: Vec<String>,
}

impl fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.problems.join("; "))
    }
}

impl ShapeTag {
    pub fn new(name: &'static str, schema: Value) -> Self {
        Self {
            name,
            schema: Arc::new(schema),
            compiled: Arc::new(OnceLock::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Validate `value` against this shape.
    ///
    /// Returns `Err(ConfigError::InvalidSchema)` when the schema itself does not
    /// compile, and `Ok(Err(violation))` when the value does not match.
    pub fn check(&self, value: &Value) -> Result<Result<(), ShapeViolation>, ConfigError> {
        let validator = self
            .compiled
            .get_or_init(|| jsonschema::validator_for(&self.schema).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|message| ConfigError::InvalidSchema {
                name: self.name.to_string(),
                message: message.clone(),
            })?;

        let problems: Vec<String> = validator
            .iter_errors(value)
            .map(|err| {
                let path = err.instance_path.to_string();
                if path.is_empty() {
                    err.to_string()
                } else {
                    format!("{}: {}", path, err)
                }
            })
            .collect();

        if problems.is_empty() {
            Ok(Ok(()))
        } else {
            Ok(Err(ShapeViolation {
                shape: self.name,
                problems,
            }))
        }
    }
}

impl fmt::Debug for ShapeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShapeTag").field(&self.name).finish()
    }
}

impl PartialEq for ShapeTag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn string_list() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

static LOGIN_REQUEST: LazyLock<ShapeTag> = LazyLock::new(|| {
    ShapeTag::new(
        "LoginRequest",
        json!({
            "type": "object",
            "required": ["email", "password"],
            "properties": {
                "email": { "type": "string", "minLength": 1 },
                "password": { "type": "string", "minLength": 1 },
                "rememberMe": { "type": ["boolean", "null"] }
            }
        }),
    )
});

/// `{email, password, rememberMe?}`
pub fn login_request() -> ShapeTag {
    LOGIN_REQUEST.clone()
}

static LOGIN_PROFILE: LazyLock<ShapeTag> = LazyLock::new(|| {
    ShapeTag::new(
        "LoginProfile",
        json!({
            "type": "object",
            "required": ["name", "email"],
            "properties": {
                "name": { "type": "string" },
                "email": { "type": "string" },
                "modules": string_list(),
                "roles": string_list(),
                "policies": string_list(),
                "polices": string_list(),
                "tenantId": { "type": ["string", "null"] }
            }
        }),
    )
});

/// Profile returned in the `data` of a successful login.
pub fn login_profile() -> ShapeTag {
    LOGIN_PROFILE.clone()
}

static USER_RECORD: LazyLock<ShapeTag> = LazyLock::new(|| {
    ShapeTag::new(
        "UserRecord",
        json!({
            "type": "object",
            "required": ["id", "email"],
            "properties": {
                "id": { "type": "string" },
                "email": { "type": "string" },
                "fullName": { "type": ["string", "null"] },
                "roles": string_list(),
                "policies": string_list()
            }
        }),
    )
});

pub fn user_record() -> ShapeTag {
    USER_RECORD.clone()
}

static CLIENT_RECORD: LazyLock<ShapeTag> = LazyLock::new(|| {
    ShapeTag::new(
        "ClientRecord",
        json!({
            "type": "object",
            "required": ["id", "fullName"],
            "properties": {
                "id": { "type": "string" },
                "fullName": { "type": "string" },
                "email": { "type": ["string", "null"] },
                "paid": { "type": ["boolean", "null"] },
                "isActive": { "type": ["boolean", "null"] }
            }
        }),
    )
});

pub fn client_record() -> ShapeTag {
    CLIENT_RECORD.clone()
}

fn client_fields() -> Value {
    json!({
        "fullName": { "type": "string", "minLength": 1 },
        "email": { "type": "string" },
        "phone": { "type": "string" },
        "documentNumber": { "type": "string" },
        "zipCode": { "type": "string" },
        "paid": { "type": "boolean" }
    })
}

static CREATE_CLIENT_REQUEST: LazyLock<ShapeTag> = LazyLock::new(|| {
    ShapeTag::new(
        "CreateClientRequest",
        json!({
            "type": "object",
            "required": ["fullName", "email"],
            "properties": client_fields()
        }),
    )
});

pub fn create_client_request() -> ShapeTag {
    CREATE_CLIENT_REQUEST.clone()
}

static UPDATE_CLIENT_REQUEST: LazyLock<ShapeTag> = LazyLock::new(|| {
    let mut properties = client_fields();
    properties["id"] = json!({ "type": "string", "minLength": 1 });
    ShapeTag::new(
        "UpdateClientRequest",
        json!({
            "type": "object",
            "required": ["id", "fullName", "email"],
            "properties": properties
        }),
    )
});

pub fn update_client_request() -> ShapeTag {
    UPDATE_CLIENT_REQUEST.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_accepts_complete_payload() {
        let payload = json!({"email": "a@b.c", "password": "pw", "rememberMe": true});
        assert!(login_request().check(&payload).unwrap().is_ok());
    }

    #[test]
    fn login_request_reports_missing_password() {
        let payload = json!({"email": "a@b.c"});
        let violation = login_request().check(&payload).unwrap().unwrap_err();
        assert_eq!(violation.shape, "LoginRequest");
        assert!(violation.to_string().contains("password"));
    }

    #[test]
    fn update_client_request_requires_id() {
        let payload = json!({"fullName": "Dell", "email": "x@dell.com"});
        assert!(update_client_request().check(&payload).unwrap().is_err());

        let payload = json!({"id": "c1", "fullName": "Dell", "email": "x@dell.com"});
        assert!(update_client_request().check(&payload).unwrap().is_ok());
    }

    #[test]
    fn built_in_shapes_compile_once() {
        let first = client_record();
        first.check(&json!({"id": "c1", "fullName": "Ana"})).unwrap().unwrap();

        let second = client_record();
        assert!(Arc::ptr_eq(&first.compiled, &second.compiled));
        assert!(second.compiled.get().is_some());
    }

    #[test]
    fn invalid_schema_is_a_config_error() {
        let tag = ShapeTag::new("Broken", json!({"type": 42}));
        assert!(matches!(
            tag.check(&json!({})),
            Err(ConfigError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn shapes_compare_by_name() {
        assert_eq!(client_record(), client_record());
        assert_ne!(client_record(), user_record());
    }
}
