//! CLI command implementations.

pub mod config;
pub mod products;
pub mod seed;

use amastore_storefront::config::StorefrontConfig;
use amastore_storefront::supabase::SupabaseClient;

/// Build a backend client from the environment.
///
/// # Errors
///
/// Returns an error if required configuration is missing or invalid.
pub fn client_from_env() -> Result<SupabaseClient, Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    Ok(SupabaseClient::new(&config.supabase))
}
