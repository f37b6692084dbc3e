//! Configuration view and validation commands (`adminhub config`).

use anyhow::Result;

use super::super::{Cli, ConfigCommands};

pub fn cmd_config(cli: &Cli, command: Option<ConfigCommands>) -> Result<()> {
    use adminhub::config::{AdminConfig, AdminToml, CONFIG_FILE};

    let state_dir = &cli.state_dir;
    let config_path = state_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("AdminHub Configuration");
            println!("======================");
            println!();

            let toml = if config_path.exists() {
                println!("Config file: {}", config_path.display());
                println!();
                AdminToml::load(&config_path)?
            } else {
                println!("No {} found at {}", CONFIG_FILE, config_path.display());
                println!();
                println!("Using default configuration:");
                AdminToml::default()
            };

            println!("[api]");
            println!("  base_url = \"{}\"", toml.api.base_url);
            println!("  with_credentials = {}", toml.api.with_credentials);
            if let Some(secs) = toml.api.timeout_secs {
                println!("  timeout_secs = {}", secs);
            }
            println!();

            println!("[list]");
            println!("  default_page_size = {}", toml.list.default_page_size);
            println!();

            println!("[logging]");
            println!("  format = \"{}\"", toml.logging.format);
            if let Some(file) = &toml.logging.file {
                println!("  file = \"{}\"", file.display());
            }
            if let Some(level) = &toml.logging.level {
                println!("  level = \"{}\"", level);
            }
            println!();

            // Effective values include env and CLI overrides
            let config =
                AdminConfig::with_cli_args(state_dir.clone(), cli.api_url.clone(), cli.verbose)?;
            println!("Effective values (with env/CLI overrides):");
            println!("  api_url = \"{}\"", config.api_url());
            println!("  with_credentials = {}", config.with_credentials());
            match config.timeout() {
                Some(timeout) => println!("  timeout = {}s", timeout.as_secs()),
                None => println!("  timeout = none"),
            }
            println!("  default_page_size = {}", config.default_page_size());
            println!("  cookies = {}", config.cookie_file().display());
            println!("  session = {}", config.session_file().display());
            println!("  user = {}", config.user_file().display());
            println!();

            if !config_path.exists() {
                println!("Run 'adminhub config init' to create {}.", CONFIG_FILE);
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No {} found. Using defaults (valid).", CONFIG_FILE);
                return Ok(());
            }

            let config =
                AdminConfig::with_cli_args(state_dir.clone(), cli.api_url.clone(), cli.verbose)?;
            let warnings = config.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("{} already exists at {}", CONFIG_FILE, config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            let toml = AdminToml::default();
            toml.save(&config_path)?;

            println!("Created {} at {}", CONFIG_FILE, config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, with_credentials, timeout_secs");
            println!("  - [list] default_page_size");
            println!("  - [logging] format, file, level");
            println!();
        }
    }

    Ok(())
}
