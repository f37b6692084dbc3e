//! Sign-in, sign-up and sign-out flows.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::session::{LoginProfile, SessionContext, UserProfile};
use crate::crud::{ApiResponse, CrudClient};
use crate::errors::ConfigError;
use crate::http::{ApiRoutes, EndpointRegistry, Outcome, RequestExecutor, RequestOptions};
use crate::state::KeyValueStore;

// The backend fills `state` with a placeholder UUID; an invite code replaces it.
static STATE_PARAM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"state=[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remember_me: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

impl RegisterRequest {
    /// Form-level checks run before anything is sent.
    pub fn validate(&self, confirm_password: &str) -> Vec<String> {
        let mut problems = Vec::new();
        if self.full_name.trim().chars().count() < 3 {
            problems.push("name must have at least 3 characters".to_string());
        }
        let email = self.email.trim();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            problems.push(format!("'{}' is not a valid email address", self.email));
        }
        if self.phone_number.trim().chars().count() < 10 {
            problems.push("phone number must have at least 10 digits".to_string());
        }
        if self.password.chars().count() < 6 {
            problems.push("password must have at least 6 characters".to_string());
        }
        if self.password != confirm_password {
            problems.push("passwords do not match".to_string());
        }
        problems
    }
}

/// Password strength score in `0..=100`.
pub fn password_strength(password: &str) -> u8 {
    if password.is_empty() {
        return 0;
    }
    let length = password.chars().count();
    let mut score = 0u8;
    if length >= 6 {
        score += 25;
    }
    if length >= 10 {
        score += 25;
    }
    if password.chars().any(|c| c.is_lowercase()) && password.chars().any(|c| c.is_uppercase()) {
        score += 25;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 15;
    }
    if password.chars().any(|c| !c.is_alphanumeric()) {
        score += 10;
    }
    score.min(100)
}

/// Put `invite_code` in place of the placeholder `state` parameter.
pub fn apply_invite_code(auth_url: &str, invite_code: &str) -> String {
    STATE_PARAM_REGEX
        .replace(auth_url, format!("state={}", invite_code))
        .into_owned()
}

pub struct AuthService {
    routes: ApiRoutes,
    client: CrudClient,
    session: Arc<SessionContext>,
    page_cache: Option<Arc<dyn KeyValueStore>>,
}

impl AuthService {
    pub fn new(routes: ApiRoutes, executor: RequestExecutor, session: Arc<SessionContext>) -> Self {
        let registry = EndpointRegistry::builder("auth").build();
        Self {
            routes,
            client: CrudClient::new(registry, executor),
            session,
            page_cache: None,
        }
    }

    /// List page state that belongs to the signed-in user; wiped on logout.
    pub fn with_page_cache(mut self, page_cache: Arc<dyn KeyValueStore>) -> Self {
        self.page_cache = Some(page_cache);
        self
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<Outcome<UserProfile>, ConfigError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            remember_me: Some(remember_me),
        };
        let options = RequestOptions::new().on_error("Sign-in failed", "Incorrect email or password");
        let body = to_body("login", &request)?;
        let outcome = self
            .client
            .execute_with::<ApiResponse<LoginProfile>>(&self.routes.auth_login(), Some(body), &options)
            .await?;

        let outcome = self.accept_profile(outcome);
        if outcome.is_completed() {
            self.client
                .executor()
                .notifier()
                .success("Welcome to AdminHub", "Signed in successfully.");
        }
        Ok(outcome)
    }

    /// Fetch the Google consent URL, with the invite code carried in `state`.
    pub async fn login_with_google(&self, invite_code: Option<&str>) -> Result<Outcome<String>, ConfigError> {
        let options = RequestOptions::new()
            .on_success("Redirecting", "Continue the sign-in in your browser.")
            .on_error("Error", "Could not start Google sign-in");
        let outcome = self
            .client
            .execute_with::<ApiResponse<String>>(&self.routes.auth_google(), None, &options)
            .await?;

        Ok(match outcome {
            Outcome::Completed(response) => match response.into_data().filter(|u| !u.is_empty()) {
                Some(url) => Outcome::Completed(match invite_code.filter(|c| !c.is_empty()) {
                    Some(code) => apply_invite_code(&url, code),
                    None => url,
                }),
                None => self.reject("Google sign-in URL was not returned"),
            },
            Outcome::Failed { message } => Outcome::Failed { message },
        })
    }

    pub async fn handle_google_callback(&self, code: &str, state: &str) -> Result<Outcome<UserProfile>, ConfigError> {
        let options = RequestOptions::new().on_error("Error", "Could not complete Google sign-in");
        let outcome = self
            .client
            .execute_with::<ApiResponse<LoginProfile>>(
                &self.routes.auth_google_callback(code, state),
                None,
                &options,
            )
            .await?;

        let outcome = self.accept_profile(outcome);
        if let Outcome::Completed(profile) = &outcome {
            self.client
                .executor()
                .notifier()
                .success("Signed in with Google", &format!("Welcome, {}!", profile.name));
        }
        Ok(outcome)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Outcome<ApiResponse<Value>>, ConfigError> {
        let options = RequestOptions::new()
            .on_success("Account created", "You can sign in now.")
            .on_error("Could not create account", "Check your details and invite code");
        let body = to_body("register", request)?;
        self.client
            .execute_with(&self.routes.auth_register(), Some(body), &options)
            .await
    }

    /// Ask the backend to drop the session cookie, then clear local state
    /// (credentials, page-state cache, session) whatever the backend answered.
    pub async fn logout(&self) -> Result<(), ConfigError> {
        let options = RequestOptions::new()
            .on_success("Signed out", "See you soon!")
            .quiet();
        let outcome = self
            .client
            .execute_with::<Value>(&self.routes.auth_logout(), Some(json!({})), &options)
            .await?;
        if let Outcome::Failed { message } = outcome {
            debug!(%message, "backend logout failed, clearing local session anyway");
        }

        if let Err(e) = self.client.executor().transport().clear_credentials() {
            warn!(error = %e, "could not remove stored credentials");
        }
        if let Some(cache) = &self.page_cache
            && let Err(e) = cache.clear()
        {
            warn!(error = %e, "could not clear list page state");
        }
        self.session.end();
        info!("signed out");
        Ok(())
    }

    fn accept_profile(&self, outcome: Outcome<ApiResponse<LoginProfile>>) -> Outcome<UserProfile> {
        match outcome {
            Outcome::Completed(response) => {
                let message = response.message.clone();
                match response.into_data() {
                    Some(login) => {
                        let profile = UserProfile::from(login);
                        info!(email = %profile.email, "signed in");
                        self.session.establish(profile.clone());
                        Outcome::Completed(profile)
                    }
                    None => self.reject(message.as_deref().unwrap_or("Sign-in was rejected")),
                }
            }
            Outcome::Failed { message } => Outcome::Failed { message },
        }
    }

    /// A 2xx answer that still carries no usable payload.
    fn reject<T>(&self, message: &str) -> Outcome<T> {
        self.client.executor().notifier().error("Error: ", message);
        Outcome::Failed {
            message: message.to_string(),
        }
    }
}

fn to_body<T: Serialize>(operation: &str, payload: &T) -> Result<Value, ConfigError> {
    serde_json::to_value(payload).map_err(|e| ConfigError::Unserializable {
        operation: operation.to_string(),
        message: e.to_string(),
    })
}
