//! The record types of the console and their column schemas.
//!
//! Pages declare only what is in this module: a deserializable record shape
//! and an ordered column set. All filtering, sorting and rendering behavior
//! comes from the table engine.

use ratatui::style::Stylize;
use ratatui::text::Line;
use serde::Deserialize;

use crate::domain::{OpsError, Role};
use crate::table::{CellContent, Column, Record, Schema, Value};

const DEFAULT_LOW_STOCK: f64 = 10.0;

/// Money display in the default currency, grouped thousands and two
/// decimals ("₱1,234.50").
pub fn format_money(value: &Value) -> String {
    match value {
        Value::Number(n) if *n < 0.0 => format!("-₱{}", group_thousands(n.abs())),
        Value::Number(n) => format!("₱{}", group_thousands(*n)),
        Value::Text(s) => s.clone(),
        Value::Missing => String::new(),
    }
}

fn group_thousands(n: f64) -> String {
    let cents = (n.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{grouped}.{frac:02}")
}

fn money_cell<R>(value: &Value, _: &R) -> CellContent {
    CellContent::text(format_money(value))
}

pub fn stock_status(quantity: f64, low_stock_threshold: f64) -> &'static str {
    if quantity <= 0.0 {
        "Out of Stock"
    } else if quantity < low_stock_threshold {
        "Low Stock"
    } else {
        "In Stock"
    }
}

fn stock_badge(quantity: f64, low_stock_threshold: f64) -> CellContent {
    let label = stock_status(quantity, low_stock_threshold);
    let span = match label {
        "Out of Stock" => label.red(),
        "Low Stock" => label.yellow(),
        _ => label.green(),
    };
    CellContent::styled(Line::from(span))
}

// Document status coloring shared by quotations, orders and invoices.
fn status_cell<R>(value: &Value, _: &R) -> CellContent {
    let label = value.display();
    let span = match label.to_lowercase().as_str() {
        "paid" | "approved" | "delivered" | "received" | "active" => label.green(),
        "pending" | "draft" | "sent" => label.yellow(),
        "cancelled" | "rejected" | "overdue" => label.red(),
        _ => label.into(),
    };
    CellContent::styled(Line::from(span))
}

// The actions menu is a nested interactive control: activating a row from
// this cell must not open the record detail.
fn actions_cell<R>(_: &Value, _: &R) -> CellContent {
    CellContent::control(Line::from("⋯".dim()))
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub cost_price: f64,
    #[serde(default)]
    pub selling_price: f64,
}

impl Record for Product {
    fn field(&self, key: &str) -> Value {
        match key {
            "name" => self.name.clone().into(),
            "product_code" => self.product_code.clone().into(),
            "sku" => self.sku.clone().into(),
            "category_name" => self.category_name.clone().into(),
            "quantity" => self.quantity.into(),
            // Virtual field so the badge column stays searchable and
            // sortable by its label.
            "status" => stock_status(self.quantity, DEFAULT_LOW_STOCK).into(),
            "cost_price" => self.cost_price.into(),
            "selling_price" => self.selling_price.into(),
            _ => Value::Missing,
        }
    }

    fn identity(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

pub fn products_schema(role: Role, low_stock_threshold: f64) -> Result<Schema<Product>, OpsError> {
    let mut columns = vec![
        Column::new("name", "Name").sortable(),
        Column::new("product_code", "ID").sortable().render(
            |value: &Value, _: &Product| {
                if value.is_missing() {
                    CellContent::styled(Line::from("No Code".dim()))
                } else {
                    CellContent::text(value.display())
                }
            },
        ),
        Column::new("sku", "SKU").sortable(),
        Column::new("category_name", "Category").sortable().render(
            |value: &Value, _: &Product| {
                if value.is_missing() {
                    CellContent::text("Uncategorized")
                } else {
                    CellContent::text(value.display())
                }
            },
        ),
        Column::new("quantity", "Stock").sortable(),
        Column::new("status", "Status")
            .sortable()
            .render(move |_: &Value, product: &Product| {
                stock_badge(product.quantity, low_stock_threshold)
            }),
        Column::new("cost_price", "Cost Price").sortable().render(money_cell),
        Column::new("selling_price", "Selling Price")
            .sortable()
            .render(money_cell),
    ];
    // The sales role gets a read only view without the actions menu.
    if role != Role::Sales {
        columns.push(Column::new("actions", "Actions").render(actions_cell));
    }
    Schema::new(columns)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Record for Category {
    fn field(&self, key: &str) -> Value {
        match key {
            "name" => self.name.clone().into(),
            "description" => self.description.clone().into(),
            _ => Value::Missing,
        }
    }

    fn identity(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

pub fn categories_schema() -> Result<Schema<Category>, OpsError> {
    Schema::new(vec![
        Column::new("name", "Name").sortable(),
        Column::new("description", "Description"),
    ])
}

// ---------------------------------------------------------------------------
// Quotations, sales orders, purchase orders, invoices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Quotation {
    pub id: i64,
    pub quotation_number: String,
    pub customer_name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub status: Option<String>,
}

impl Record for Quotation {
    fn field(&self, key: &str) -> Value {
        match key {
            "quotation_number" => self.quotation_number.clone().into(),
            "customer_name" => self.customer_name.clone().into(),
            "date" => self.date.clone().into(),
            "total" => self.total.into(),
            "status" => self.status.clone().into(),
            _ => Value::Missing,
        }
    }

    fn identity(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

pub fn quotations_schema() -> Result<Schema<Quotation>, OpsError> {
    Ok(Schema::new(vec![
        Column::new("quotation_number", "Quotation #").sortable(),
        Column::new("customer_name", "Customer").sortable(),
        Column::new("date", "Date").sortable(),
        Column::new("total", "Total").sortable().render(money_cell),
        Column::new("status", "Status").sortable().render(status_cell),
    ])?
    // Searching digits of money amounts is noise, keep the term on the
    // identifying fields.
    .with_search_keys(["quotation_number", "customer_name", "status"]))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SalesOrder {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub status: Option<String>,
}

impl Record for SalesOrder {
    fn field(&self, key: &str) -> Value {
        match key {
            "order_number" => self.order_number.clone().into(),
            "customer_name" => self.customer_name.clone().into(),
            "date" => self.date.clone().into(),
            "total" => self.total.into(),
            "status" => self.status.clone().into(),
            _ => Value::Missing,
        }
    }

    fn identity(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

pub fn sales_orders_schema() -> Result<Schema<SalesOrder>, OpsError> {
    Ok(Schema::new(vec![
        Column::new("order_number", "Order #").sortable(),
        Column::new("customer_name", "Customer").sortable(),
        Column::new("date", "Date").sortable(),
        Column::new("total", "Total").sortable().render(money_cell),
        Column::new("status", "Status").sortable().render(status_cell),
    ])?
    .with_search_keys(["order_number", "customer_name", "status"]))
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseOrder {
    pub id: i64,
    pub po_number: String,
    pub supplier_name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub status: Option<String>,
}

impl Record for PurchaseOrder {
    fn field(&self, key: &str) -> Value {
        match key {
            "po_number" => self.po_number.clone().into(),
            "supplier_name" => self.supplier_name.clone().into(),
            "date" => self.date.clone().into(),
            "total" => self.total.into(),
            "status" => self.status.clone().into(),
            _ => Value::Missing,
        }
    }

    fn identity(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

pub fn purchase_orders_schema() -> Result<Schema<PurchaseOrder>, OpsError> {
    Ok(Schema::new(vec![
        Column::new("po_number", "PO #").sortable(),
        Column::new("supplier_name", "Supplier").sortable(),
        Column::new("date", "Date").sortable(),
        Column::new("total", "Total").sortable().render(money_cell),
        Column::new("status", "Status").sortable().render(status_cell),
    ])?
    .with_search_keys(["po_number", "supplier_name", "status"]))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub customer_name: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub status: Option<String>,
}

impl Record for Invoice {
    fn field(&self, key: &str) -> Value {
        match key {
            "invoice_number" => self.invoice_number.clone().into(),
            "customer_name" => self.customer_name.clone().into(),
            "due_date" => self.due_date.clone().into(),
            "total" => self.total.into(),
            "status" => self.status.clone().into(),
            _ => Value::Missing,
        }
    }

    fn identity(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

pub fn invoices_schema() -> Result<Schema<Invoice>, OpsError> {
    Ok(Schema::new(vec![
        Column::new("invoice_number", "Invoice #").sortable(),
        Column::new("customer_name", "Customer").sortable(),
        Column::new("due_date", "Due Date").sortable(),
        Column::new("total", "Total").sortable().render(money_cell),
        Column::new("status", "Status").sortable().render(status_cell),
    ])?
    .with_search_keys(["invoice_number", "customer_name", "status"]))
}

// ---------------------------------------------------------------------------
// Customers, suppliers, sales persons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Record for Customer {
    fn field(&self, key: &str) -> Value {
        match key {
            "name" => self.name.clone().into(),
            "email" => self.email.clone().into(),
            "phone" => self.phone.clone().into(),
            "address" => self.address.clone().into(),
            _ => Value::Missing,
        }
    }

    fn identity(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

pub fn customers_schema() -> Result<Schema<Customer>, OpsError> {
    Schema::new(vec![
        Column::new("name", "Name").sortable(),
        Column::new("email", "Email").sortable(),
        Column::new("phone", "Phone"),
        Column::new("address", "Address"),
    ])
}

#[derive(Debug, Clone, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Record for Supplier {
    fn field(&self, key: &str) -> Value {
        match key {
            "name" => self.name.clone().into(),
            "contact_person" => self.contact_person.clone().into(),
            "email" => self.email.clone().into(),
            "phone" => self.phone.clone().into(),
            _ => Value::Missing,
        }
    }

    fn identity(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

pub fn suppliers_schema() -> Result<Schema<Supplier>, OpsError> {
    Schema::new(vec![
        Column::new("name", "Name").sortable(),
        Column::new("contact_person", "Contact Person").sortable(),
        Column::new("email", "Email").sortable(),
        Column::new("phone", "Phone"),
    ])
}

#[derive(Debug, Clone, Deserialize)]
pub struct SalesPerson {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Record for SalesPerson {
    fn field(&self, key: &str) -> Value {
        match key {
            "name" => self.name.clone().into(),
            "email" => self.email.clone().into(),
            "phone" => self.phone.clone().into(),
            _ => Value::Missing,
        }
    }

    fn identity(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

pub fn sales_persons_schema() -> Result<Schema<SalesPerson>, OpsError> {
    Schema::new(vec![
        Column::new("name", "Name").sortable(),
        Column::new("email", "Email").sortable(),
        Column::new("phone", "Phone"),
    ])
}
