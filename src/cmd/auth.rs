//! Sign-in and session commands.

use anyhow::{Context, Result};

use adminhub::auth::service::password_strength;
use adminhub::auth::{RegisterRequest, UserProfile};
use adminhub::ui::icons::{LINK, LOCK, USER};

use super::{App, completed};

/// `register` flags; missing values are prompted for.
pub struct RegisterFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

pub async fn cmd_login(
    app: &App,
    email: Option<String>,
    password: Option<String>,
    remember_me: bool,
) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_text("Email")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_password("Password")?,
    };

    let outcome = {
        let _spinner = app.spinner("Signing in...");
        app.auth.login(&email, &password, remember_me).await?
    };
    let profile = completed(outcome)?;
    print_profile(&profile);
    Ok(())
}

pub async fn cmd_logout(app: &App) -> Result<()> {
    if !app.auth.is_authenticated() {
        println!("No stored session; clearing credentials anyway.");
    }
    let _spinner = app.spinner("Signing out...");
    app.auth.logout().await?;
    Ok(())
}

pub fn cmd_whoami(app: &App) -> Result<()> {
    match app.session.user() {
        Some(profile) => print_profile(&profile),
        None => {
            println!("Not signed in.");
            println!();
            println!("Run 'adminhub login' or 'adminhub google-login' to start a session.");
        }
    }
    Ok(())
}

pub async fn cmd_register(app: &App, fields: RegisterFields) -> Result<()> {
    let full_name = fields.name.map_or_else(|| prompt_text("Full name"), Ok)?;
    let email = fields.email.map_or_else(|| prompt_text("Email"), Ok)?;
    let phone_number = fields.phone.map_or_else(|| prompt_text("Phone number"), Ok)?;
    let (password, confirmation) = match fields.password {
        Some(password) => (password.clone(), password),
        None => (
            prompt_password("Password")?,
            prompt_password("Confirm password")?,
        ),
    };

    let request = RegisterRequest {
        full_name,
        email,
        phone_number,
        password,
    };
    let problems = request.validate(&confirmation);
    if !problems.is_empty() {
        println!("Cannot register:");
        for problem in &problems {
            println!("  - {}", problem);
        }
        anyhow::bail!("{} invalid field(s)", problems.len());
    }
    println!(
        "{}Password strength: {}",
        LOCK,
        strength_label(password_strength(&request.password))
    );

    let outcome = {
        let _spinner = app.spinner("Creating account...");
        app.auth.register(&request).await?
    };
    completed(outcome)?;
    println!();
    println!("Sign in with: adminhub login --email {}", request.email);
    Ok(())
}

pub async fn cmd_google_login(app: &App, invite_code: Option<&str>) -> Result<()> {
    let outcome = {
        let _spinner = app.spinner("Requesting Google sign-in URL...");
        app.auth.login_with_google(invite_code).await?
    };
    let url = completed(outcome)?;
    println!();
    println!("{}Open this URL in your browser:", LINK);
    println!("  {}", url);
    println!();
    println!("Then run 'adminhub google-callback --code <code> --state <state>'");
    println!("with the values from the redirect.");
    Ok(())
}

pub async fn cmd_google_callback(app: &App, code: &str, state: &str) -> Result<()> {
    let outcome = {
        let _spinner = app.spinner("Completing Google sign-in...");
        app.auth.handle_google_callback(code, state).await?
    };
    let profile = completed(outcome)?;
    print_profile(&profile);
    Ok(())
}

fn print_profile(profile: &UserProfile) {
    println!();
    println!("{}{} <{}>", USER, profile.name, profile.email);
    if let Some(tenant) = &profile.tenant_id {
        println!("  tenant:   {}", tenant);
    }
    print_list("roles", &profile.roles);
    print_list("policies", &profile.policies);
    print_list("modules", &profile.modules);
    println!();
}

fn print_list(label: &str, values: &[String]) {
    if values.is_empty() {
        println!("  {:<9} -", format!("{}:", label));
    } else {
        println!("  {:<9} {}", format!("{}:", label), values.join(", "));
    }
}

fn strength_label(score: u8) -> &'static str {
    match score {
        0..=25 => "weak",
        26..=50 => "fair",
        51..=75 => "good",
        _ => "strong",
    }
}

fn prompt_text(prompt: &str) -> Result<String> {
    use dialoguer::Input;

    Input::new()
        .with_prompt(prompt)
        .interact_text()
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))
}

fn prompt_password(prompt: &str) -> Result<String> {
    use dialoguer::Password;

    Password::new()
        .with_prompt(prompt)
        .interact()
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))
}
