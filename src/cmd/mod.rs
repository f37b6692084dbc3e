//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module      | Commands handled                                          |
//! |-------------|-----------------------------------------------------------|
//! | `auth`      | `Login`, `Logout`, `Whoami`, `Register`, `GoogleLogin`, `GoogleCallback` |
//! | `users`     | `Users`                                                   |
//! | `clients`   | `Clients`                                                 |
//! | `listing`   | page-state flags shared by `users list` and `clients list` |
//! | `dashboard` | `Dashboard`                                               |
//! | `can`       | `Can`                                                     |
//! | `health`    | `Health`                                                  |
//! | `config`    | `Config`                                                  |

pub mod auth;
pub mod can;
pub mod clients;
pub mod config;
pub mod dashboard;
pub mod health;
pub mod listing;
pub mod users;

pub use auth::{
    RegisterFields, cmd_google_callback, cmd_google_login, cmd_login, cmd_logout, cmd_register,
    cmd_whoami,
};
pub use can::cmd_can;
pub use clients::cmd_clients;
pub use config::cmd_config;
pub use dashboard::cmd_dashboard;
pub use health::cmd_health;
pub use users::cmd_users;

use std::sync::Arc;

use anyhow::{Context, Result};

use adminhub::auth::{AuthService, SessionContext};
use adminhub::config::AdminConfig;
use adminhub::http::{ApiRoutes, Outcome, ReqwestTransport, RequestExecutor};
use adminhub::notify::ConsoleNotifier;
use adminhub::resources::{ClientService, UserService};
use adminhub::state::{FileStore, KeyValueStore};
use adminhub::telemetry::{self, TelemetryConfig, TelemetryGuard};
use adminhub::ui::LoadingSpinner;

use super::Cli;

/// A failure the user has already been notified about. `main` exits with
/// status 1 without printing it again.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Reported(pub String);

/// Unwrap a completed outcome, or turn a failed one into [`Reported`].
pub fn completed<T>(outcome: Outcome<T>) -> Result<T> {
    match outcome {
        Outcome::Completed(value) => Ok(value),
        Outcome::Failed { message } => Err(Reported(message).into()),
    }
}

/// Everything a backend command needs, wired once per invocation.
pub struct App {
    pub config: AdminConfig,
    pub routes: ApiRoutes,
    pub executor: RequestExecutor,
    pub session: Arc<SessionContext>,
    pub auth: AuthService,
    pub users: UserService,
    pub clients: ClientService,
    /// Session cache for list page state.
    pub page_cache: Arc<dyn KeyValueStore>,
    pub yes: bool,
    show_spinner: bool,
    _telemetry: TelemetryGuard,
}

impl App {
    pub fn build(cli: &Cli) -> Result<Self> {
        let config =
            AdminConfig::with_cli_args(cli.state_dir.clone(), cli.api_url.clone(), cli.verbose)?;
        let telemetry = telemetry::init(TelemetryConfig::new(cli.verbose, &config.toml.logging));

        for warning in config.validate() {
            tracing::warn!("config: {}", warning);
        }

        let routes = ApiRoutes::new(&config.api_url())
            .with_context(|| format!("Cannot use API base URL '{}'", config.api_url()))?;
        let transport = ReqwestTransport::new(&config.transport_settings())?;
        let executor = RequestExecutor::new(Arc::new(transport), Arc::new(ConsoleNotifier::new(cli.quiet)));

        let user_store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.user_file()));
        let session = Arc::new(SessionContext::restore(user_store));
        let page_cache: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.session_file()));

        let auth = AuthService::new(routes.clone(), executor.clone(), session.clone())
            .with_page_cache(page_cache.clone());
        let users = UserService::new(routes.clone(), executor.clone());
        let clients = ClientService::new(routes.clone(), executor.clone());

        tracing::debug!(
            api_url = %config.api_url(),
            state_dir = %config.state_dir.display(),
            authenticated = session.is_authenticated(),
            "adminhub ready"
        );

        Ok(Self {
            config,
            routes,
            executor,
            session,
            auth,
            users,
            clients,
            page_cache,
            yes: cli.yes,
            show_spinner: !cli.quiet && console::Term::stderr().is_term(),
            _telemetry: telemetry,
        })
    }

    /// Spinner that follows the shared loading flag until dropped.
    pub fn spinner(&self, message: &str) -> LoadingSpinner {
        LoadingSpinner::follow(self.executor.loading(), message, self.show_spinner)
    }

    /// Ask before a destructive action unless `--yes` was given.
    pub fn confirm(&self, prompt: &str) -> bool {
        use dialoguer::Confirm;

        if self.yes {
            return true;
        }
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    /// Refuse to go on without a stored session.
    pub fn require_session(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            anyhow::bail!("Not signed in. Run 'adminhub login' or 'adminhub google-login' first.");
        }
        Ok(())
    }
}
