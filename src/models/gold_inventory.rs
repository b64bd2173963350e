// ============================================================================
// MODÈLE : GOLD INVENTORY
// ============================================================================
//
// Description:
//   Stock d'or de la boutique, une ligne par carat (10, 14, 18, 22, 24).
//
// Colonnes:
//   - quantity_in_grams (scale 6) : toujours >= 0
//   - average_buy_price (scale 2) : coût moyen pondéré par gramme
//   - minimum_stock / maximum_stock : seuils d'alerte
//
// Coût moyen pondéré (recalculé à chaque entrée de stock):
//   (ancienneQté * ancienPrix + qtéAjoutée * prixAjouté) / (ancienneQté + qtéAjoutée)
//   arrondi HALF_UP à 2 décimales. Une sortie ne modifie jamais le prix moyen.
//
// Exemple (18k):
//   - départ 0g / 0
//   - add_stock(10, 60) → 10g, moyenne 60
//   - add_stock(5, 66)  → 15g, moyenne 62
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use crate::errors::{AppError, AppResult};
use crate::utils::money::{checked_add, checked_mul, grams, money};

pub const ALLOWED_CARATS: [i32; 5] = [10, 14, 18, 22, 24];

pub fn is_allowed_carat(carat: i32) -> bool {
    ALLOWED_CARATS.contains(&carat)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gold_inventory")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub carat: i32,
    pub quantity_in_grams: Decimal,
    pub average_buy_price: Decimal,
    pub minimum_stock: Decimal,
    pub maximum_stock: Decimal,
    pub notes: Option<String>,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_movement::Entity")]
    InventoryMovement,
}

impl Related<super::inventory_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryMovement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Entrée de stock : recalcule le prix moyen pondéré puis augmente la quantité
    pub fn add_stock(&mut self, quantity: Decimal, price_per_gram: Decimal) -> AppResult<()> {
        let quantity = grams(quantity);
        if quantity <= Decimal::ZERO {
            return Err(AppError::validation("Quantity must be positive"));
        }
        if price_per_gram < Decimal::ZERO {
            return Err(AppError::validation("Price per gram cannot be negative"));
        }

        let current_value = checked_mul(self.quantity_in_grams, self.average_buy_price)?;
        let added_value = checked_mul(quantity, price_per_gram)?;
        let total_quantity = checked_add(self.quantity_in_grams, quantity)?;

        if total_quantity > Decimal::ZERO {
            self.average_buy_price = money(checked_add(current_value, added_value)? / total_quantity);
        }

        self.quantity_in_grams = grams(total_quantity);
        Ok(())
    }

    /// Sortie de stock : le prix moyen reste inchangé
    pub fn remove_stock(&mut self, quantity: Decimal) -> AppResult<()> {
        let quantity = grams(quantity);
        if quantity <= Decimal::ZERO {
            return Err(AppError::validation("Quantity must be positive"));
        }

        if self.quantity_in_grams < quantity {
            return Err(AppError::InsufficientStock(format!(
                "Insufficient stock. Available: {}, Requested: {}",
                self.quantity_in_grams, quantity
            )));
        }

        self.quantity_in_grams = grams(self.quantity_in_grams - quantity);
        Ok(())
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity_in_grams <= self.minimum_stock
    }

    pub fn is_over_stock(&self) -> bool {
        self.quantity_in_grams > self.maximum_stock
    }

    /// Valeur au prix moyen, saturée à Decimal::MAX en cas de dépassement
    pub fn inventory_value(&self) -> Decimal {
        money(
            self.quantity_in_grams
                .checked_mul(self.average_buy_price)
                .unwrap_or(Decimal::MAX),
        )
    }
}

/// Vérifie carat autorisé et cohérence des seuils
pub fn validate_definition(carat: i32, minimum: Decimal, maximum: Decimal) -> AppResult<()> {
    if !is_allowed_carat(carat) {
        return Err(AppError::validation(format!(
            "Carat must be one of: {:?}",
            ALLOWED_CARATS
        )));
    }
    if minimum < Decimal::ZERO {
        return Err(AppError::validation("Minimum stock cannot be negative"));
    }
    if maximum < Decimal::ZERO {
        return Err(AppError::validation("Maximum stock cannot be negative"));
    }
    if minimum > maximum {
        return Err(AppError::validation(
            "Minimum stock cannot be greater than maximum stock",
        ));
    }
    Ok(())
}
