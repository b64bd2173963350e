// DTOs de l'API : requêtes (validées avec validator) et réponses structurées

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::party::PartyType;
use super::{gold_inventory, invoice, invoice_item, users};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

// ----------------------------------------------------------------------------
// Pagination
// ----------------------------------------------------------------------------

/// ?page=0&size=10&sortBy=createdAt&sortDir=desc
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl PageParams {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(0)
    }

    /// Taille bornée à [1, 100]
    pub fn size(&self) -> u64 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn is_desc(&self) -> bool {
        self.sort_dir
            .as_deref()
            .map(|d| d.eq_ignore_ascii_case("desc"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_pages: u64,
    pub total_elements: u64,
    pub size: u64,
    pub number: u64,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, total_pages: u64, size: u64, number: u64) -> Self {
        Self {
            content,
            total_pages,
            total_elements,
            size,
            number,
            first: number == 0,
            last: number + 1 >= total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            size: self.size,
            number: self.number,
            first: self.first,
            last: self.last,
        }
    }
}

// ----------------------------------------------------------------------------
// Auth / compte
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "Email must be valid"))]
    pub email: String,
    #[validate(length(min = 6, max = 120, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(max = 50))]
    pub first_name: Option<String>,
    #[validate(length(max = 50))]
    pub last_name: Option<String>,
}

/// `username` accepte aussi l'email
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 6, max = 120, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub user: users::Model,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Decimal,
}

// ----------------------------------------------------------------------------
// Clients / fournisseurs
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequest {
    #[validate(length(max = 50))]
    pub first_name: String,
    #[validate(length(max = 50))]
    pub last_name: String,
    #[validate(length(max = 20))]
    pub cedula: String,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 50))]
    pub city: Option<String>,
    #[validate(length(max = 50))]
    pub province: Option<String>,
    #[validate(length(max = 10))]
    pub zip_code: Option<String>,
    pub client_type: Option<PartyType>,
    #[validate(length(max = 100))]
    pub company_name: Option<String>,
    #[validate(length(max = 50))]
    pub tax_id: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRequest {
    #[validate(length(max = 50))]
    pub first_name: String,
    #[validate(length(max = 50))]
    pub last_name: String,
    #[validate(length(max = 20))]
    pub cedula: String,
    #[validate(email(message = "Email must be valid"), length(max = 100))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 50))]
    pub city: Option<String>,
    #[validate(length(max = 50))]
    pub province: Option<String>,
    #[validate(length(max = 10))]
    pub zip_code: Option<String>,
    pub provider_type: Option<PartyType>,
    #[validate(length(max = 100))]
    pub company_name: Option<String>,
    #[validate(length(max = 50))]
    pub tax_id: Option<String>,
    #[validate(length(max = 50))]
    pub bank_account: Option<String>,
    #[validate(length(max = 100))]
    pub bank_name: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

// ----------------------------------------------------------------------------
// Inventaire
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRequest {
    pub carat: i32,
    pub minimum_stock: Option<Decimal>,
    pub maximum_stock: Option<Decimal>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockRequest {
    pub new_quantity: Decimal,
    #[validate(length(min = 1, max = 200, message = "Reason is required"))]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct StockCheckQuery {
    pub quantity: Decimal,
}

/// Ligne d'inventaire + indicateurs calculés
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryResponse {
    #[serde(flatten)]
    pub inventory: gold_inventory::Model,
    pub low_stock: bool,
    pub over_stock: bool,
    pub inventory_value: Decimal,
}

impl From<gold_inventory::Model> for InventoryResponse {
    fn from(inventory: gold_inventory::Model) -> Self {
        Self {
            low_stock: inventory.is_low_stock(),
            over_stock: inventory.is_over_stock(),
            inventory_value: inventory.inventory_value(),
            inventory,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_carats: usize,
    pub total_grams: Decimal,
    pub total_value: Decimal,
    pub low_stock_count: usize,
    pub over_stock_count: usize,
    pub items: Vec<InventoryResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCheckResponse {
    pub carat: i32,
    pub requested: Decimal,
    pub available: Decimal,
    pub has_stock: bool,
}

// ----------------------------------------------------------------------------
// Transactions
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AmountQuery {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CaratTradeQuery {
    pub carat: i32,
    pub grams: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub provider_id: i32,
    pub carat: i32,
    pub grams: Decimal,
    pub price_per_gram: Decimal,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub client_id: i32,
    pub carat: i32,
    pub grams: Decimal,
    pub price_per_gram: Decimal,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ReasonQuery {
    pub reason: Option<String>,
}

// ----------------------------------------------------------------------------
// Factures
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub transaction_id: i32,
    pub tax_rate: Option<Decimal>,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    #[validate(length(max = 50))]
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
    #[validate(length(min = 1, max = 50, message = "Invoice number is required"))]
    pub invoice_number: String,
    pub tax_rate: Decimal,
    #[validate(length(min = 1, max = 10))]
    pub currency: String,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    #[validate(length(max = 500))]
    pub legal_terms: Option<String>,
    #[validate(length(max = 50))]
    pub customer_tax_id: Option<String>,
    #[validate(length(max = 200))]
    pub customer_address: Option<String>,
    #[validate(length(max = 50))]
    pub payment_method: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayQuery {
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    #[serde(flatten)]
    pub invoice: invoice::Model,
    pub overdue: bool,
    pub items: Vec<invoice_item::Model>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub paid_sales: Decimal,
    pub paid_purchases: Decimal,
    pub pending_sales: Decimal,
    pub overdue_count: u64,
}

// ----------------------------------------------------------------------------
// Prix
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldPriceUpdateQuery {
    pub buy_price: Decimal,
    pub sell_price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaratPriceRequest {
    pub price_per_gram: Decimal,
}
