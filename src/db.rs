// connexion BD + création du schéma depuis les entités

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::{
    carat_price, clients, gold_inventory, gold_price, inventory_movement, invoice, invoice_item,
    providers, transaction, users,
};

pub async fn establish_connection(config: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.db_max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}

/// Crée les tables manquantes, dans l'ordre des clés étrangères
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, clients::Entity).await?;
    create_table(db, providers::Entity).await?;
    create_table(db, gold_inventory::Entity).await?;
    create_table(db, gold_price::Entity).await?;
    create_table(db, carat_price::Entity).await?;
    create_table(db, transaction::Entity).await?;
    create_table(db, inventory_movement::Entity).await?;
    create_table(db, invoice::Entity).await?;
    create_table(db, invoice_item::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(backend.build(&statement)).await?;
    tracing::debug!(table = entity.table_name(), "table ready");
    Ok(())
}
