//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! SHOPFRONT_PASSWORD=secret shopfront login -u ada
//! shopfront profile edit --phone "(123) 456-7890"
//! shopfront logout
//! ```
//!
//! The user record and the backend's session cookie are kept in the store
//! and carry over between runs.

use secrecy::SecretString;

use shopfront_client::SessionManager;
use shopfront_client::api::RegisterRequest;
use shopfront_client::models::ProfileUpdate;
use shopfront_core::{Email, format_phone_number, valid_phone_number};

use super::{CliError, Context};

/// Arguments for `register`.
pub struct Registration {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub password: String,
}

/// Arguments for `profile edit`.
pub struct ProfileEdit {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

fn session(ctx: &Context) -> Result<SessionManager, CliError> {
    Ok(SessionManager::new(ctx.store.clone(), ctx.api.clone())?)
}

/// Log in as `username`.
pub async fn login(ctx: &Context, username: &str, password: String) -> Result<(), CliError> {
    let mut session = session(ctx)?;
    session.login(username, SecretString::from(password)).await?;

    if let Some(user) = session.user() {
        tracing::info!("Logged in as {} <{}>", user.username, user.email);
    }
    Ok(())
}

/// Create an account; the backend logs the new user in.
pub async fn register(ctx: &Context, args: Registration) -> Result<(), CliError> {
    let request = registration_request(args)?;

    let mut session = session(ctx)?;
    session.register(request).await?;

    if let Some(user) = session.user() {
        tracing::info!("Registered and logged in as {}", user.username);
    }
    Ok(())
}

/// Validate registration arguments and build the request.
fn registration_request(args: Registration) -> Result<RegisterRequest, CliError> {
    let email = Email::parse(&args.email).map_err(|_| CliError::InvalidArgument {
        field: "email",
        value: args.email.clone(),
    })?;
    if !valid_phone_number(args.phone.trim()) {
        return Err(CliError::InvalidArgument {
            field: "phone number",
            value: args.phone,
        });
    }

    Ok(RegisterRequest {
        username: args.username.trim().to_string(),
        full_name: args.full_name.trim().to_string(),
        email: email.into(),
        address: args.address.trim().to_string(),
        phone_number: format_phone_number(args.phone.trim()),
        password: SecretString::from(args.password),
    })
}

/// End the session and wipe local state.
pub async fn logout(ctx: &Context) -> Result<(), CliError> {
    let mut session = session(ctx)?;
    if !session.is_authenticated() {
        tracing::info!("Not logged in");
        return Ok(());
    }

    session.logout().await?;
    tracing::info!("Logged out");
    Ok(())
}

/// Show the stored user.
pub fn whoami(ctx: &Context) -> Result<(), CliError> {
    let session = session(ctx)?;
    match session.user() {
        Some(user) => {
            tracing::info!("{} ({})", user.username, user.full_name);
            tracing::info!("  Email: {}", user.email);
            tracing::info!("  Address: {}", user.address);
            tracing::info!("  Phone: {}", user.phone_number);
        }
        None => tracing::info!("Not logged in"),
    }
    Ok(())
}

/// Send a sparse profile update.
pub async fn edit_profile(ctx: &Context, args: ProfileEdit) -> Result<(), CliError> {
    let update = ProfileUpdate {
        username: args.username,
        full_name: args.full_name,
        email: args.email,
        address: args.address,
        phone_number: args.phone,
        password: args.password.map(SecretString::from),
    };

    let mut session = session(ctx)?;
    session.edit_profile(update).await?;
    tracing::info!("Profile updated");
    Ok(())
}
