//! Record source boundary.
//!
//! The engine consumes already materialized, in-memory record collections;
//! this store stands in for the remote API and reads one JSON file per
//! entity from a data directory before the UI starts. A missing file is an
//! empty collection, malformed JSON is a startup error.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::OpsError;
use crate::entities::{
    Category, Customer, Invoice, Product, PurchaseOrder, Quotation, SalesOrder, SalesPerson,
    Supplier,
};

pub struct Store {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub quotations: Vec<Quotation>,
    pub sales_orders: Vec<SalesOrder>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub invoices: Vec<Invoice>,
    pub customers: Vec<Customer>,
    pub suppliers: Vec<Supplier>,
    pub sales_persons: Vec<SalesPerson>,
}

impl Store {
    pub fn load(data_dir: &str) -> Result<Self, OpsError> {
        let expanded = shellexpand::full(data_dir)
            .map_err(|e| OpsError::LoadingFailed(format!("Bad data directory: {e}")))?;
        let dir = PathBuf::from(expanded.into_owned());
        if !dir.is_dir() {
            return Err(OpsError::LoadingFailed(format!(
                "Data directory {} does not exist",
                dir.display()
            )));
        }

        Ok(Store {
            products: Self::load_collection(&dir, "products")?,
            categories: Self::load_collection(&dir, "categories")?,
            quotations: Self::load_collection(&dir, "quotations")?,
            sales_orders: Self::load_collection(&dir, "sales_orders")?,
            purchase_orders: Self::load_collection(&dir, "purchase_orders")?,
            invoices: Self::load_collection(&dir, "invoices")?,
            customers: Self::load_collection(&dir, "customers")?,
            suppliers: Self::load_collection(&dir, "suppliers")?,
            sales_persons: Self::load_collection(&dir, "sales_persons")?,
        })
    }

    fn load_collection<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>, OpsError> {
        let path = dir.join(format!("{name}.json"));
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("No {name} file at {}, starting empty", path.display());
                return Ok(Vec::new());
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(OpsError::PermissionDenied(path));
            }
            Err(e) => return Err(OpsError::IoError(e)),
        };
        let records: Vec<T> = Self::parse_collection(&raw)?;
        debug!("Loaded {} {name} records", records.len());
        Ok(records)
    }

    fn parse_collection<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, OpsError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_product_collection() {
        let raw = r#"[
            {"id": 1, "name": "Hex Bolt", "sku": "HB-10", "quantity": 42,
             "cost_price": 2.5, "selling_price": 4.0},
            {"id": 2, "name": "Washer"}
        ]"#;
        let products: Vec<Product> = Store::parse_collection(raw).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].sku.as_deref(), Some("HB-10"));
        assert_eq!(products[1].quantity, 0.0);
    }

    #[test]
    fn rejects_malformed_json() {
        let result: Result<Vec<Product>, _> = Store::parse_collection("not json");
        assert!(matches!(result, Err(OpsError::ParseError(_))));
    }

    #[test]
    fn loads_the_bundled_fixture_directory() {
        let store = Store::load("tests/fixtures").unwrap();
        assert_eq!(store.products.len(), 8);
        assert_eq!(store.categories.len(), 4);
        assert_eq!(store.invoices.len(), 3);
        assert_eq!(store.sales_persons.len(), 2);
    }

    #[test]
    fn missing_directory_is_a_startup_error() {
        let result = Store::load("/definitely/not/a/real/dir");
        assert!(matches!(result, Err(OpsError::LoadingFailed(_))));
    }
}
