// Services : logique métier, une fonction = une transaction base de données

pub mod pagination;
pub mod user_service;
pub mod client_service;
pub mod provider_service;
pub mod inventory_service;
pub mod transaction_service;
pub mod invoice_service;
pub mod gold_price_service;
pub mod carat_price_service;
