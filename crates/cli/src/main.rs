//! Shopfront CLI - drive the storefront client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in, reading the password from SHOPFRONT_PASSWORD
//! SHOPFRONT_PASSWORD=secret shopfront login -u ada
//!
//! # Add two units of product 42 and look at the cart
//! shopfront cart add 42 -q 2 --name "Linen Tee"
//! shopfront cart show
//!
//! # Place the order
//! shopfront cart checkout --total 39.98
//! ```
//!
//! # Commands
//!
//! - `login`, `register`, `logout`, `whoami` - account session
//! - `profile edit` - send a sparse profile update
//! - `cart` - show, add, remove, clear, checkout
//! - `images` - fetch, find, clear the product image cache
//!
//! State lives under `SHOPFRONT_STORAGE_DIR`, so the cart and the logged-in
//! user carry over between invocations.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopfront_client::ClientError;
use shopfront_client::config::ClientConfig;

mod commands;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the storefront
    Login {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(long)]
        full_name: String,

        #[arg(short, long)]
        email: String,

        #[arg(long)]
        address: String,

        #[arg(long)]
        phone: String,

        #[arg(long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session and wipe local state
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Manage the account profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the product image cache
    Images {
        #[command(subcommand)]
        action: ImagesAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Update profile fields; omitted or blank fields are left unchanged
    Edit {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        full_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// New password
        #[arg(long, env = "SHOPFRONT_NEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines
    Show,
    /// Add a product (merges with an existing line)
    Add {
        /// Product ID; all-digit IDs are numeric
        product_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Display name stored with the line
        #[arg(long)]
        name: Option<String>,

        /// Unit price stored with the line
        #[arg(long)]
        price: Option<String>,
    },
    /// Remove a product's line
    Remove { product_id: String },
    /// Empty the cart
    Clear,
    /// Place the order for the whole cart
    Checkout {
        /// Order subtotal, e.g. 39.98
        #[arg(long)]
        total: String,
    },
}

#[derive(Subcommand)]
enum ImagesAction {
    /// Download all product images
    Fetch,
    /// Print a product's image data
    Find { product_id: String },
    /// Drop cached images
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::debug!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront=info,shopfront_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = ClientConfig::from_env();
    // Sentry must be up before the subscriber so its layer has a client
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(CliError::from(ClientError::from(e))),
    };

    if let Err(e) = result {
        // Captured errors were logged by `report`
        if e.report().is_none() {
            tracing::warn!("Command failed: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), CliError> {
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::account::login(&ctx, &username, password).await?;
        }
        Commands::Register {
            username,
            full_name,
            email,
            address,
            phone,
            password,
        } => {
            commands::account::register(
                &ctx,
                commands::account::Registration {
                    username,
                    full_name,
                    email,
                    address,
                    phone,
                    password,
                },
            )
            .await?;
        }
        Commands::Logout => commands::account::logout(&ctx).await?,
        Commands::Whoami => commands::account::whoami(&ctx)?,
        Commands::Profile { action } => match action {
            ProfileAction::Edit {
                username,
                full_name,
                email,
                address,
                phone,
                password,
            } => {
                commands::account::edit_profile(
                    &ctx,
                    commands::account::ProfileEdit {
                        username,
                        full_name,
                        email,
                        address,
                        phone,
                        password,
                    },
                )
                .await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx)?,
            CartAction::Add {
                product_id,
                quantity,
                name,
                price,
            } => commands::cart::add(&ctx, &product_id, quantity, name, price.as_deref())?,
            CartAction::Remove { product_id } => commands::cart::remove(&ctx, &product_id)?,
            CartAction::Clear => commands::cart::clear(&ctx)?,
            CartAction::Checkout { total } => commands::cart::checkout(&ctx, &total).await?,
        },
        Commands::Images { action } => match action {
            ImagesAction::Fetch => commands::images::fetch(&ctx).await?,
            ImagesAction::Find { product_id } => commands::images::find(&ctx, &product_id)?,
            ImagesAction::Clear => commands::images::clear(&ctx)?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cart_add_defaults_to_one() {
        let cli = Cli::try_parse_from(["shopfront", "cart", "add", "42"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: CartAction::Add { quantity: 1, .. }
            })
        ));
    }
}
