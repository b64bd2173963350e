use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Sens du mouvement de stock.
/// ADJUSTMENT_* = correction manuelle (inventaire physique)
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    #[sea_orm(string_value = "IN")]
    In,
    #[sea_orm(string_value = "OUT")]
    Out,
    #[sea_orm(string_value = "ADJUSTMENT_IN")]
    AdjustmentIn,
    #[sea_orm(string_value = "ADJUSTMENT_OUT")]
    AdjustmentOut,
}

// Journal en insertion seule : une ligne n'est jamais modifiée
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_movements")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub inventory_id: i32,
    pub transaction_id: Option<i32>,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub price_per_gram: Decimal,
    pub balance_after: Decimal, // stock du carat après le mouvement
    pub reason: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::gold_inventory::Entity",
        from = "Column::InventoryId",
        to = "super::gold_inventory::Column::Id"
    )]
    GoldInventory,
    #[sea_orm(
        belongs_to = "super::transaction::Entity",
        from = "Column::TransactionId",
        to = "super::transaction::Column::Id",
        on_delete = "Cascade"
    )]
    Transaction,
}

impl Related<super::gold_inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoldInventory.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
