//! Soapery CLI - browse the catalog and manage the cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally only featured ones or one category
//! soap-cli products --featured
//! soap-cli products --category jabones --json
//!
//! # Manage the cart (persisted under CART_STORAGE_DIR)
//! soap-cli cart add 1 --size 100g
//! soap-cli cart update 1 3 --size 100g
//! soap-cli cart show
//!
//! # Place a simulated order
//! soap-cli checkout
//! ```
//!
//! # Commands
//!
//! - `products` / `product` / `categories` - Read the catalog
//! - `status` - Report whether the catalog is live or on fallback data
//! - `cart` - Show and change the cart
//! - `checkout` - Print the order summary and empty the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use soapery_storefront::cart::{CartStore, FileStorage};
use soapery_storefront::{Catalog, StorefrontConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "soap-cli")]
#[command(author, version, about = "Soapery storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only featured products
        #[arg(long)]
        featured: bool,

        /// Only products in this category (`todos` for all)
        #[arg(short, long)]
        category: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show a single product
    Product {
        /// Product ID
        id: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List categories
    Categories,
    /// Report where catalog data is coming from
    Status,
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
    /// Place a simulated order and empty the cart
    Checkout,
}

#[derive(Subcommand)]
enum CartCommand {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: String,

        /// Size to add (defaults to the product's first size)
        #[arg(short, long)]
        size: Option<String>,
    },
    /// Remove a line
    Remove {
        /// Product ID
        id: String,

        /// Size of the line
        #[arg(short, long)]
        size: Option<String>,
    },
    /// Set a line's quantity (0 or less removes it)
    Update {
        /// Product ID
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,

        /// Size of the line
        #[arg(short, long)]
        size: Option<String>,
    },
    /// Empty the cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "soapery_storefront=info,soapery_cli=info".into())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration is needed before Sentry, and Sentry before tracing
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_env_filter(env_filter()).init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let sentry_guard = init_sentry(&config);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        // process::exit skips destructors; flush Sentry first
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> soapery_storefront::Result<()> {
    let catalog = Catalog::from_config(&config.cms);

    match cli.command {
        Commands::Products {
            featured,
            category,
            json,
        } => commands::catalog::products(&catalog, featured, category.as_deref(), json).await?,
        Commands::Product { id, json } => commands::catalog::product(&catalog, &id, json).await?,
        Commands::Categories => commands::catalog::categories(&catalog).await,
        Commands::Status => commands::catalog::status(&catalog).await,
        Commands::Cart { action } => {
            let mut store = open_store(config);
            match action {
                CartCommand::Show => commands::cart::show(&store),
                CartCommand::Add { id, size } => {
                    commands::cart::add(&mut store, &catalog, &id, size).await?;
                }
                CartCommand::Remove { id, size } => commands::cart::remove(&mut store, &id, size)?,
                CartCommand::Update { id, quantity, size } => {
                    commands::cart::update(&mut store, &id, quantity, size)?;
                }
                CartCommand::Clear => commands::cart::clear(&mut store)?,
            }
        }
        Commands::Checkout => commands::cart::checkout(&mut open_store(config))?,
    }
    Ok(())
}

fn open_store(config: &StorefrontConfig) -> CartStore {
    CartStore::open(FileStorage::new(&config.cart_storage_dir))
}
