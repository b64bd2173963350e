// Base SQLite en mémoire + jeux de données pour les tests

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use crate::db;
use crate::models::party::PartyType;
use crate::models::{clients, gold_price, providers, users};

/// Une seule connexion : chaque connexion SQLite :memory: a sa propre base
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.expect("connect in-memory sqlite");
    db::create_schema(&db).await.expect("create schema");
    db
}

pub async fn seed_user(db: &DatabaseConnection, username: &str, balance: Decimal, holdings: Decimal) -> users::Model {
    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@oro.cr", username)),
        password_hash: Set("pbkdf2:sha256:1$c2FsdA$aGFzaA".to_string()),
        first_name: Set(None),
        last_name: Set(None),
        account_balance: Set(balance),
        gold_holdings: Set(holdings),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user")
}

pub async fn seed_gold_price(db: &DatabaseConnection, buy: Decimal, sell: Decimal) -> gold_price::Model {
    gold_price::ActiveModel {
        buy_price: Set(buy),
        sell_price: Set(sell),
        currency: Set(gold_price::DEFAULT_CURRENCY.to_string()),
        timestamp: Set(Utc::now()),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert gold price")
}

pub async fn seed_client(db: &DatabaseConnection, cedula: &str) -> clients::Model {
    let now = Utc::now();
    clients::ActiveModel {
        first_name: Set("María".to_string()),
        last_name: Set("Jiménez".to_string()),
        cedula: Set(cedula.to_string()),
        email: Set(None),
        phone_number: Set(Some("8888-0000".to_string())),
        address: Set(Some("Avenida Central".to_string())),
        city: Set(Some("San José".to_string())),
        province: Set(Some("San José".to_string())),
        zip_code: Set(None),
        client_type: Set(PartyType::Individual),
        company_name: Set(None),
        tax_id: Set(None),
        active: Set(true),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert client")
}

pub async fn seed_provider(db: &DatabaseConnection, cedula: &str) -> providers::Model {
    let now = Utc::now();
    providers::ActiveModel {
        first_name: Set("Luis".to_string()),
        last_name: Set("Solano".to_string()),
        cedula: Set(cedula.to_string()),
        email: Set(None),
        phone_number: Set(None),
        address: Set(Some("Calle 5".to_string())),
        city: Set(Some("Heredia".to_string())),
        province: Set(Some("Heredia".to_string())),
        zip_code: Set(None),
        provider_type: Set(PartyType::Business),
        company_name: Set(Some("Metales Solano S.A.".to_string())),
        tax_id: Set(Some("3-101-654321".to_string())),
        active: Set(true),
        notes: Set(None),
        bank_account: Set(None),
        bank_name: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert provider")
}
