//! AmaStore CLI - catalog seeding and inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # Seed the sample catalog into an empty backend
//! ama-cli seed
//!
//! # Browse the catalog
//! ama-cli products list --category Electronics --sort price-asc
//! ama-cli products featured
//! ama-cli products get e89c02a4-8f4d-308c-5d8c-5ab8d77c13a4
//!
//! # Verify environment configuration
//! ama-cli config check
//! ```
//!
//! All commands read `SUPABASE_URL` and `SUPABASE_ANON_KEY` from the
//! environment (a `.env` file is honored).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "ama-cli")]
#[command(author, version, about = "AmaStore CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the sample catalog if the products table is empty
    Seed,
    /// Inspect the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products with optional filtering and sorting
    List {
        /// Restrict to one category
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive search over name, description, and category
        #[arg(short, long)]
        search: Option<String>,

        /// Sort order
        #[arg(long, value_enum, default_value_t = SortArg::Featured)]
        sort: SortArg,
    },
    /// List featured products
    Featured,
    /// Show a single product by ID
    Get {
        /// Product UUID
        id: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load configuration from the environment and report what was found
    Check,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Featured,
    PriceAsc,
    PriceDesc,
    Rating,
}

#[tokio::main]
async fn main() {
    // Load .env before the subscriber so RUST_LOG can come from it too.
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed => commands::seed::run().await?,
        Commands::Products { action } => match action {
            ProductsAction::List {
                category,
                search,
                sort,
            } => commands::products::list(category, search, sort).await?,
            ProductsAction::Featured => commands::products::featured().await?,
            ProductsAction::Get { id } => commands::products::get(&id).await?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Check => commands::config::check()?,
        },
    }
    Ok(())
}
