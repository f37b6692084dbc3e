use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "adminhub")]
#[command(version, about = "Command-line client for the AdminHub admin backend")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show error notifications
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, global = true)]
    pub yes: bool,

    /// Directory holding adminhub.toml, cookies, session and user data
    #[arg(long, global = true, env = "ADMINHUB_STATE_DIR", default_value = ".adminhub")]
    pub state_dir: PathBuf,

    /// Backend base URL. Overrides ADMINHUB_API_URL and adminhub.toml.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "ADMINHUB_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Ask the backend for a long-lived session
        #[arg(long)]
        remember_me: bool,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create an account (requires an invite code on the backend side)
    Register {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long, env = "ADMINHUB_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Print the Google sign-in URL
    GoogleLogin {
        /// Invite code carried through the OAuth state parameter
        #[arg(long)]
        invite_code: Option<String>,
    },
    /// Finish Google sign-in with the code and state from the redirect
    GoogleCallback {
        #[arg(long)]
        code: String,
        #[arg(long)]
        state: String,
    },
    /// Manage tenant users
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },
    /// Manage tenant clients
    Clients {
        #[command(subcommand)]
        command: ClientsCommands,
    },
    /// Show the analytics dashboard
    Dashboard,
    /// Check that the backend answers
    Health,
    /// Check whether the signed-in user holds the given grants
    Can {
        /// Required roles, policies or modules
        required: Vec<String>,
        /// role, policy or module
        #[arg(long, default_value = "policy")]
        kind: String,
        /// any or all
        #[arg(long, default_value = "any")]
        mode: String,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

/// Page-state options shared by list commands.
#[derive(Args, Clone, Debug, Default)]
pub struct ListArgs {
    /// Location to start from, e.g. "/pt-br/clients?page=2&search=ana"
    #[arg(long)]
    pub at: Option<String>,
    /// Free-text search (empty clears it)
    #[arg(long)]
    pub search: Option<String>,
    /// Status quick filter (empty clears it)
    #[arg(long)]
    pub status: Option<String>,
    /// Sort by this field; repeating the current field flips the direction
    #[arg(long)]
    pub sort: Option<String>,
    /// Zero-based page index
    #[arg(long)]
    pub page_index: Option<u32>,
    /// Rows per page
    #[arg(long)]
    pub rows: Option<u32>,
    /// Forget the saved state for this list
    #[arg(long)]
    pub reset: bool,
}

#[derive(Subcommand, Clone)]
pub enum UsersCommands {
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long, env = "ADMINHUB_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long = "role")]
        roles: Vec<String>,
        #[arg(long = "policy")]
        policies: Vec<String>,
    },
    Delete {
        id: String,
    },
    /// List assignable roles
    Roles,
    /// List assignable policies
    Policies,
}

#[derive(Subcommand, Clone)]
pub enum ClientsCommands {
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        document: String,
        #[arg(long)]
        zip: String,
        #[arg(long)]
        paid: bool,
    },
    /// Change fields of an existing client; omitted fields keep their value
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        document: Option<String>,
        #[arg(long)]
        zip: Option<String>,
        #[arg(long)]
        paid: Option<bool>,
    },
    /// Soft delete
    Deactivate {
        id: String,
    },
    /// Permanent delete
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration
    Validate,
    /// Create a default adminhub.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match run(&cli).await {
        // Already shown to the user as a notification.
        Err(e) if e.is::<cmd::Reported>() => std::process::exit(1),
        other => other,
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let app = || cmd::App::build(cli);

    match &cli.command {
        Commands::Login {
            email,
            password,
            remember_me,
        } => cmd::cmd_login(&app()?, email.clone(), password.clone(), *remember_me).await?,
        Commands::Logout => cmd::cmd_logout(&app()?).await?,
        Commands::Whoami => cmd::cmd_whoami(&app()?)?,
        Commands::Register {
            name,
            email,
            phone,
            password,
        } => {
            let fields = cmd::RegisterFields {
                name: name.clone(),
                email: email.clone(),
                phone: phone.clone(),
                password: password.clone(),
            };
            cmd::cmd_register(&app()?, fields).await?
        }
        Commands::GoogleLogin { invite_code } => {
            cmd::cmd_google_login(&app()?, invite_code.as_deref()).await?
        }
        Commands::GoogleCallback { code, state } => {
            cmd::cmd_google_callback(&app()?, code, state).await?
        }
        Commands::Users { command } => cmd::cmd_users(&app()?, command.clone()).await?,
        Commands::Clients { command } => cmd::cmd_clients(&app()?, command.clone()).await?,
        Commands::Dashboard => cmd::cmd_dashboard()?,
        Commands::Health => cmd::cmd_health(&app()?).await?,
        Commands::Can {
            required,
            kind,
            mode,
        } => cmd::cmd_can(&app()?, required, kind, mode)?,
        Commands::Config { command } => cmd::cmd_config(cli, command.clone())?,
    }

    Ok(())
}
