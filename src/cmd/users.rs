//! Tenant user commands (`adminhub users`).

use anyhow::{Context, Result};

use adminhub::resources::{CreateUserRequest, Grant, User};
use adminhub::ui::Table;

use super::listing::{load_list, print_footer};
use super::{App, completed};
use crate::UsersCommands;

pub async fn cmd_users(app: &App, command: UsersCommands) -> Result<()> {
    app.require_session()?;

    match command {
        UsersCommands::List { list } => {
            let page = load_list::<User>(app, "/users", app.users.crud().clone(), &list, "users").await?;

            println!();
            if page.list.is_empty() {
                println!("No users found.");
            } else {
                let mut table = Table::new(["ID", "Name", "Email", "Phone", "Roles"]);
                for user in &page.list.data {
                    table.add_row([
                        user.id.clone(),
                        user.full_name.clone().unwrap_or_default(),
                        user.email.clone(),
                        user.phone_number.clone().unwrap_or_default(),
                        user.roles.join(", "),
                    ]);
                }
                println!("{}", table.render());
            }
            print_footer(&page);
        }
        UsersCommands::Create {
            name,
            email,
            phone,
            password,
            roles,
            policies,
        } => {
            let password = match password {
                Some(password) => password,
                None => {
                    use dialoguer::Password;
                    Password::new()
                        .with_prompt("Initial password")
                        .with_confirmation("Confirm password", "Passwords do not match")
                        .interact()
                        .context("Failed to read password")?
                }
            };
            let request = CreateUserRequest {
                name,
                email,
                password,
                phone_number: phone,
                roles,
                policies,
            };
            let outcome = {
                let _spinner = app.spinner("Creating user...");
                app.users.create(&request).await?
            };
            let response = completed(outcome)?;
            if let Some(user) = response.data {
                println!("Created user {} ({})", user.email, user.id);
            }
        }
        UsersCommands::Delete { id } => {
            if !app.confirm(&format!("Delete user {}? This cannot be undone.", id)) {
                println!("Delete cancelled");
                return Ok(());
            }
            let outcome = {
                let _spinner = app.spinner("Deleting user...");
                app.users.delete(&id).await?
            };
            completed(outcome)?;
        }
        UsersCommands::Roles => {
            let outcome = {
                let _spinner = app.spinner("Loading roles...");
                app.users.roles().await?
            };
            print_grants("Roles", &completed(outcome)?);
        }
        UsersCommands::Policies => {
            let outcome = {
                let _spinner = app.spinner("Loading policies...");
                app.users.policies().await?
            };
            print_grants("Policies", &completed(outcome)?);
        }
    }

    Ok(())
}

fn print_grants(title: &str, grants: &[Grant]) {
    println!();
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    println!();
    if grants.is_empty() {
        println!("None available.");
    } else {
        let mut table = Table::new(["Key", "Name"]);
        for grant in grants {
            table.add_row([grant.key.clone(), grant.value.clone()]);
        }
        println!("{}", table.render());
    }
    println!();
}
