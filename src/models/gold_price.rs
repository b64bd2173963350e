use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

pub const DEFAULT_CURRENCY: &str = "USD";

// Prix de l'or au gramme. Une seule ligne is_active = true à la fois,
// les anciennes lignes restent comme historique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gold_prices")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub currency: String,
    pub timestamp: DateTimeUtc,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
