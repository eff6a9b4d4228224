//! Configuration inspection command.

use amastore_storefront::config::StorefrontConfig;

/// Load configuration from the environment and report what was found.
///
/// The anonymous key is never printed.
///
/// # Errors
///
/// Returns an error if a required variable is missing, malformed, or a
/// known placeholder value.
#[allow(clippy::print_stdout)]
pub fn check() -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;

    println!("configuration OK");
    println!("backend url:  {}", config.supabase.project_url);
    println!("anon key:     [set, redacted]");
    println!("cache dir:    {}", config.cache_dir.display());

    Ok(())
}
