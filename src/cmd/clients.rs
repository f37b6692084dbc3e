//! Tenant client commands (`adminhub clients`).

use anyhow::Result;

use adminhub::resources::{Client, CreateClientRequest, UpdateClientRequest};
use adminhub::ui::Table;

use super::listing::{load_list, print_footer};
use super::{App, completed};
use crate::ClientsCommands;

pub async fn cmd_clients(app: &App, command: ClientsCommands) -> Result<()> {
    app.require_session()?;

    match command {
        ClientsCommands::List { list } => {
            let page =
                load_list::<Client>(app, "/clients", app.clients.crud().clone(), &list, "clients").await?;

            println!();
            if page.list.is_empty() {
                println!("No clients found.");
            } else {
                let mut table = Table::new(["ID", "Name", "Email", "Phone", "Paid", "Status"]);
                for client in &page.list.data {
                    table.add_row([
                        client.id.clone(),
                        client.full_name.clone(),
                        client.email.clone().unwrap_or_default(),
                        client.phone.clone().unwrap_or_default(),
                        yes_no(client.paid).to_string(),
                        status(client).to_string(),
                    ]);
                }
                println!("{}", table.render());
            }
            print_footer(&page);
        }
        ClientsCommands::Get { id } => {
            let client = fetch(app, &id).await?;
            print_client(&client);
        }
        ClientsCommands::Create {
            name,
            email,
            phone,
            document,
            zip,
            paid,
        } => {
            let request = CreateClientRequest {
                full_name: name,
                email,
                phone,
                document_number: document,
                zip_code: zip,
                paid,
            };
            let outcome = {
                let _spinner = app.spinner("Creating client...");
                app.clients.create(&request).await?
            };
            completed(outcome)?;
        }
        ClientsCommands::Update {
            id,
            name,
            email,
            phone,
            document,
            zip,
            paid,
        } => {
            let current = fetch(app, &id).await?;
            let mut request = UpdateClientRequest::from(&current);
            if let Some(name) = name {
                request.full_name = name;
            }
            if let Some(email) = email {
                request.email = email;
            }
            if let Some(phone) = phone {
                request.phone = phone;
            }
            if let Some(document) = document {
                request.document_number = document;
            }
            if let Some(zip) = zip {
                request.zip_code = zip;
            }
            if let Some(paid) = paid {
                request.paid = paid;
            }

            let outcome = {
                let _spinner = app.spinner("Updating client...");
                app.clients.update(&id, &request).await?
            };
            completed(outcome)?;
        }
        ClientsCommands::Deactivate { id } => {
            if !app.confirm(&format!("Deactivate client {}?", id)) {
                println!("Deactivation cancelled");
                return Ok(());
            }
            let outcome = {
                let _spinner = app.spinner("Deactivating client...");
                app.clients.deactivate(&id).await?
            };
            completed(outcome)?;
        }
        ClientsCommands::Delete { id } => {
            if !app.confirm(&format!("Permanently delete client {}? This cannot be undone.", id)) {
                println!("Delete cancelled");
                return Ok(());
            }
            let outcome = {
                let _spinner = app.spinner("Deleting client...");
                app.clients.delete(&id).await?
            };
            completed(outcome)?;
        }
    }

    Ok(())
}

async fn fetch(app: &App, id: &str) -> Result<Client> {
    let outcome = {
        let _spinner = app.spinner("Loading client...");
        app.clients.get(id).await?
    };
    let response = completed(outcome)?;
    let message = response.message.clone();
    match response.into_data() {
        Some(client) => Ok(client),
        None => anyhow::bail!(
            "Client {} not found{}",
            id,
            message.map(|m| format!(": {}", m)).unwrap_or_default()
        ),
    }
}

fn print_client(client: &Client) {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let when = |value: &Option<chrono::DateTime<chrono::Utc>>| {
        value
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    println!();
    println!("{}", client.full_name);
    println!("{}", "=".repeat(client.full_name.chars().count().max(3)));
    println!();
    println!("  id:        {}", client.id);
    println!("  email:     {}", field(&client.email));
    println!("  phone:     {}", field(&client.phone));
    println!("  document:  {}", field(&client.document_number));
    println!("  zip code:  {}", field(&client.zip_code));
    println!("  paid:      {}", yes_no(client.paid));
    println!("  status:    {}", status(client));
    println!("  created:   {}", when(&client.created_at));
    println!("  updated:   {}", when(&client.updated_at));
    println!();
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn status(client: &Client) -> &'static str {
    if client.is_active { "active" } else { "inactive" }
}
