//! Catalog inspection commands.

use amastore_core::ProductId;
use amastore_storefront::catalog::{BrowseQuery, CatalogService, ProductSort};
use amastore_storefront::models::Product;
use amastore_storefront::supabase::ProductsApi;

use crate::SortArg;

impl From<SortArg> for ProductSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Featured => Self::Featured,
            SortArg::PriceAsc => Self::PriceAsc,
            SortArg::PriceDesc => Self::PriceDesc,
            SortArg::Rating => Self::Rating,
        }
    }
}

fn catalog() -> Result<CatalogService, Box<dyn std::error::Error>> {
    let client = super::client_from_env()?;
    Ok(CatalogService::new(ProductsApi::new(client)))
}

/// List products with optional filtering and sorting.
///
/// # Errors
///
/// Returns an error if configuration is missing or the backend fails.
pub async fn list(
    category: Option<String>,
    search: Option<String>,
    sort: SortArg,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = BrowseQuery {
        category,
        search,
        sort: sort.into(),
    };
    let products = catalog()?.browse(&query).await?;
    print_products(&products);
    Ok(())
}

/// List featured products.
///
/// # Errors
///
/// Returns an error if configuration is missing or the backend fails.
pub async fn featured() -> Result<(), Box<dyn std::error::Error>> {
    let products = catalog()?.featured().await?;
    print_products(&products);
    Ok(())
}

/// Show a single product.
///
/// # Errors
///
/// Returns an error for an invalid ID, missing configuration, or a backend
/// failure (including an unknown product).
pub async fn get(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let id: ProductId = id.parse().map_err(|_| format!("invalid product ID: {id}"))?;
    let product = catalog()?.get(id).await?;
    print_product_detail(&product);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("no products found");
        return;
    }
    for product in products {
        let featured = if product.is_featured() { " [featured]" } else { "" };
        println!(
            "{}  {:>9}  {}{}",
            product.id,
            product.price.display(),
            product.name,
            featured
        );
    }
    println!("{} product(s)", products.len());
}

#[allow(clippy::print_stdout)]
fn print_product_detail(product: &Product) {
    println!("id:        {}", product.id);
    println!("name:      {}", product.name);
    println!("price:     {}", product.price.display());
    println!("category:  {}", product.category);
    if let Some(description) = &product.description {
        println!("about:     {description}");
    }
    if let Some(rating) = product.rating {
        let reviews = product.reviews.unwrap_or(0);
        println!("rating:    {rating} ({reviews} reviews)");
    }
    println!("featured:  {}", product.is_featured());
}
