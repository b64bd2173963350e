use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use crate::errors::AppResult;
use crate::utils::money::{checked_mul, money};

pub const DEFAULT_UNIT: &str = "gramos";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_items")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub invoice_id: i32,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub total: Decimal, // round2(quantity * unit_price)
    pub gold_carat: Option<i32>,
    pub item_details: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id",
        on_delete = "Cascade"
    )]
    Invoice,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn line_total(quantity: Decimal, unit_price: Decimal) -> AppResult<Decimal> {
    Ok(money(checked_mul(quantity, unit_price)?))
}
