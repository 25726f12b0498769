//! Seed the catalog from a YAML file.
//!
//! # File format
//!
//! ```yaml
//! products:
//!   - id: phone-x
//!     name: Phone X
//!     description: Flagship phone
//!     price: "999.00"
//!     original_price: "1099.00"
//!     stock: 25
//!     image_url: /images/phone-x.png
//!     colors: [Black, Silver]
//!     storage_options: [128GB, 256GB]
//! bank_details:
//!   bank_name: First Bank
//!   account_holder: Sable Ltd
//!   account_number: "0123456789"
//!   bank_address: 1 Bank Street
//! ```

use std::path::Path;

use sable_core::{Price, ProductId};
use sable_storefront::db::{self, BankDetailsRepository, NewBankDetails, ProductRepository};
use sable_storefront::models::Product;
use serde::Deserialize;
use tracing::{error, info};

/// Contents of a catalog seed file.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub bank_details: Option<NewBankDetails>,
}

/// A product entry. Optional fields default to empty.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    /// Defaults to `price` (no savings shown).
    #[serde(default)]
    pub original_price: Option<Price>,
    pub stock: u32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub storage_options: Vec<String>,
}

impl From<SeedProduct> for Product {
    fn from(seed: SeedProduct) -> Self {
        Self {
            original_price: seed.original_price.unwrap_or(seed.price),
            id: seed.id,
            name: seed.name,
            description: seed.description,
            price: seed.price,
            stock: seed.stock,
            image_url: seed.image_url,
            colors: seed.colors,
            storage_options: seed.storage_options,
        }
    }
}

/// Check a seed file for mistakes the database would not catch.
///
/// Returns one message per problem; empty means valid.
#[must_use]
pub fn validate_seed(seed: &CatalogSeed) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for product in &seed.products {
        if !seen.insert(&product.id) {
            errors.push(format!("duplicate product id: {}", product.id));
        }
        if product.name.trim().is_empty() {
            errors.push(format!("{}: name is empty", product.id));
        }
        if product.price.is_negative() {
            errors.push(format!("{}: price is negative", product.id));
        }
        if let Some(original) = product.original_price
            && original < product.price
        {
            errors.push(format!(
                "{}: original_price {original} is below price {}",
                product.id, product.price
            ));
        }
    }

    if let Some(bank) = &seed.bank_details
        && (bank.bank_name.trim().is_empty() || bank.account_number.trim().is_empty())
    {
        errors.push("bank_details: bank_name and account_number are required".to_string());
    }

    errors
}

/// Seed products and bank details from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML catalog file
/// * `clear_existing` - If true, delete existing products first
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or is invalid, or database operations fail.
pub async fn catalog(
    file_path: &str,
    clear_existing: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;

    info!(products = seed.products.len(), "Parsed catalog");

    let errors = validate_seed(&seed);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let products = ProductRepository::new(&pool);
    if clear_existing {
        let removed = products.delete_all().await?;
        info!(removed, "Cleared existing products");
    }

    let count = seed.products.len();
    for product in seed.products {
        let product = Product::from(product);
        products.upsert(&product).await?;
        info!(product_id = %product.id, "Upserted product");
    }

    if let Some(bank) = &seed.bank_details {
        let details = BankDetailsRepository::new(&pool).replace_active(bank).await?;
        info!(bank_account_id = %details.id, "Replaced active bank details");
    }

    info!("Seeding complete!");
    info!("  Products upserted: {count}");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SEED: &str = r#"
products:
  - id: phone-x
    name: Phone X
    price: "999.00"
    original_price: "1099.00"
    stock: 25
    colors: [Black, Silver]
    storage_options: [128GB, 256GB]
  - id: case
    name: Case
    price: 19
    stock: 100
bank_details:
  bank_name: First Bank
  account_holder: Sable Ltd
  account_number: "0123456789"
  bank_address: 1 Bank Street
"#;

    #[test]
    fn test_parse_seed_file() {
        let seed: CatalogSeed = serde_yaml::from_str(SEED).unwrap();
        assert_eq!(seed.products.len(), 2);
        assert!(seed.bank_details.is_some());
        assert!(validate_seed(&seed).is_empty());

        let case = Product::from(seed.products.into_iter().nth(1).unwrap());
        assert_eq!(case.original_price, case.price);
        assert!(case.colors.is_empty());
    }

    #[test]
    fn test_validate_seed_reports_problems() {
        let mut seed: CatalogSeed = serde_yaml::from_str(SEED).unwrap();
        let mut products = seed.products.iter_mut();
        products.next().unwrap().original_price = Some(Price::from_units(1));
        products.next().unwrap().id = ProductId::from("phone-x");

        let errors = validate_seed(&seed);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("duplicate")));
        assert!(errors.iter().any(|e| e.contains("below price")));
    }
}
