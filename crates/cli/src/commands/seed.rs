//! Catalog seeding command.
//!
//! Wraps the storefront's idempotent seeding: inserts the sample catalog
//! only when the products table is empty.

use tracing::info;

use amastore_storefront::seed::{SeedOutcome, seed_products};
use amastore_storefront::supabase::ProductsApi;

/// Seed the sample catalog.
///
/// # Errors
///
/// Returns an error if configuration is missing or the backend fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let client = super::client_from_env()?;
    let products = ProductsApi::new(client);

    match seed_products(&products).await? {
        SeedOutcome::Seeded { count } => info!(count, "seeded sample catalog"),
        SeedOutcome::AlreadyPopulated => info!("catalog already populated; nothing to do"),
    }

    Ok(())
}
