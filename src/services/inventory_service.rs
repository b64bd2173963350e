// ============================================================================
// SERVICE : INVENTAIRE D'OR
// ============================================================================
//
// Chaque entrée / sortie de stock met à jour la ligne du carat ET écrit un
// mouvement (journal) avec le stock résultant (balance_after).
//
// Les fonctions add_stock / remove_stock sont génériques sur la connexion
// pour s'exécuter dans la transaction BD ouverte par TransactionService.
//
// ============================================================================

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::*;

use crate::errors::{AppError, AppResult};
use crate::models::dto::{InventoryRequest, InventoryResponse, InventorySummary, Page, PageParams, StockCheckResponse};
use crate::models::gold_inventory::{self, is_allowed_carat, validate_definition, ALLOWED_CARATS};
use crate::models::inventory_movement::{self, MovementType};
use crate::services::pagination::fetch_page;
use crate::utils::money::{checked_sum, grams, money};

const DEFAULT_MAXIMUM_STOCK: i64 = 1000;

pub struct InventoryService;

impl InventoryService {
    /// Entrée de stock (achat fournisseur, réception...)
    pub async fn add_stock<C: ConnectionTrait>(
        db: &C,
        carat: i32,
        quantity: Decimal,
        price_per_gram: Decimal,
        reason: &str,
        transaction_id: Option<i32>,
    ) -> AppResult<gold_inventory::Model> {
        ensure_carat(carat)?;

        let current = match Self::find_by_carat(db, carat).await? {
            Some(inventory) => inventory,
            None => Self::insert_empty(db, carat, Decimal::ZERO, Decimal::from(DEFAULT_MAXIMUM_STOCK), None).await?,
        };

        let mut next = current.clone();
        next.add_stock(quantity, price_per_gram)?;

        let updated = Self::save_levels(db, current, &next).await?;
        Self::record_movement(
            db,
            &updated,
            MovementType::In,
            grams(quantity),
            money(price_per_gram),
            reason,
            transaction_id,
        )
        .await?;

        tracing::info!(
            carat,
            %quantity,
            balance = %updated.quantity_in_grams,
            average = %updated.average_buy_price,
            "stock in"
        );
        Ok(updated)
    }

    /// Sortie de stock, valorisée au prix moyen courant
    pub async fn remove_stock<C: ConnectionTrait>(
        db: &C,
        carat: i32,
        quantity: Decimal,
        reason: &str,
        transaction_id: Option<i32>,
    ) -> AppResult<gold_inventory::Model> {
        ensure_carat(carat)?;

        let current = Self::find_by_carat(db, carat)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No inventory found for carat {}", carat)))?;

        let mut next = current.clone();
        next.remove_stock(quantity)?;

        let updated = Self::save_levels(db, current, &next).await?;
        let average = updated.average_buy_price;
        Self::record_movement(
            db,
            &updated,
            MovementType::Out,
            grams(quantity),
            average,
            reason,
            transaction_id,
        )
        .await?;

        tracing::info!(carat, %quantity, balance = %updated.quantity_in_grams, "stock out");
        Ok(updated)
    }

    /// Fixe la quantité (inventaire physique) ; mouvement ADJUSTMENT_* de |écart|
    pub async fn adjust_stock(
        db: &DatabaseConnection,
        inventory_id: i32,
        new_quantity: Decimal,
        reason: &str,
    ) -> AppResult<gold_inventory::Model> {
        let new_quantity = grams(new_quantity);
        if new_quantity < Decimal::ZERO {
            return Err(AppError::validation("Quantity cannot be negative"));
        }

        let txn = db.begin().await?;
        let current = Self::get(&txn, inventory_id).await?;
        let difference = new_quantity - current.quantity_in_grams;

        if difference.is_zero() {
            txn.commit().await?;
            return Ok(current);
        }

        let movement_type = if difference > Decimal::ZERO {
            MovementType::AdjustmentIn
        } else {
            MovementType::AdjustmentOut
        };

        let mut next = current.clone();
        next.quantity_in_grams = new_quantity;
        let updated = Self::save_levels(&txn, current, &next).await?;
        let average = updated.average_buy_price;
        Self::record_movement(&txn, &updated, movement_type, difference.abs(), average, reason, None).await?;
        txn.commit().await?;

        tracing::info!(inventory_id, %difference, reason, "stock adjusted");
        Ok(updated)
    }

    pub async fn create(db: &DatabaseConnection, request: InventoryRequest) -> AppResult<gold_inventory::Model> {
        let minimum = request.minimum_stock.unwrap_or(Decimal::ZERO);
        let maximum = request.maximum_stock.unwrap_or(Decimal::from(DEFAULT_MAXIMUM_STOCK));
        validate_definition(request.carat, minimum, maximum)?;

        if Self::find_by_carat(db, request.carat).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Inventory for carat {} already exists",
                request.carat
            )));
        }

        Self::insert_empty(db, request.carat, minimum, maximum, request.notes).await
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        request: InventoryRequest,
    ) -> AppResult<gold_inventory::Model> {
        let existing = Self::get(db, id).await?;
        let minimum = request.minimum_stock.unwrap_or(existing.minimum_stock);
        let maximum = request.maximum_stock.unwrap_or(existing.maximum_stock);
        validate_definition(request.carat, minimum, maximum)?;

        if existing.carat != request.carat && Self::find_by_carat(db, request.carat).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Inventory for carat {} already exists",
                request.carat
            )));
        }

        let mut active: gold_inventory::ActiveModel = existing.into();
        active.carat = Set(request.carat);
        active.minimum_stock = Set(grams(minimum));
        active.maximum_stock = Set(grams(maximum));
        active.notes = Set(request.notes);
        active.last_updated = Set(Utc::now());
        Ok(active.update(db).await?)
    }

    /// Refusée tant qu'il reste du stock ; le journal du carat est supprimé avec la ligne
    pub async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<()> {
        let txn = db.begin().await?;
        let inventory = Self::get(&txn, id).await?;
        if inventory.quantity_in_grams > Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Cannot delete inventory for carat {} with remaining stock ({} g)",
                inventory.carat, inventory.quantity_in_grams
            )));
        }

        inventory_movement::Entity::delete_many()
            .filter(inventory_movement::Column::InventoryId.eq(id))
            .exec(&txn)
            .await?;
        gold_inventory::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<gold_inventory::Model> {
        gold_inventory::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Inventory not found: {}", id)))
    }

    pub async fn get_by_carat(db: &DatabaseConnection, carat: i32) -> AppResult<gold_inventory::Model> {
        Self::find_by_carat(db, carat)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No inventory found for carat {}", carat)))
    }

    pub async fn find_by_carat<C: ConnectionTrait>(db: &C, carat: i32) -> AppResult<Option<gold_inventory::Model>> {
        Ok(gold_inventory::Entity::find()
            .filter(gold_inventory::Column::Carat.eq(carat))
            .one(db)
            .await?)
    }

    pub async fn list(db: &DatabaseConnection) -> AppResult<Vec<gold_inventory::Model>> {
        Ok(gold_inventory::Entity::find()
            .order_by_asc(gold_inventory::Column::Carat)
            .all(db)
            .await?)
    }

    pub async fn low_stock(db: &DatabaseConnection) -> AppResult<Vec<gold_inventory::Model>> {
        let all = Self::list(db).await?;
        Ok(all.into_iter().filter(|i| i.is_low_stock()).collect())
    }

    pub async fn over_stock(db: &DatabaseConnection) -> AppResult<Vec<gold_inventory::Model>> {
        let all = Self::list(db).await?;
        Ok(all.into_iter().filter(|i| i.is_over_stock()).collect())
    }

    pub async fn summary(db: &DatabaseConnection) -> AppResult<InventorySummary> {
        let items: Vec<InventoryResponse> = Self::list(db)
            .await?
            .into_iter()
            .map(InventoryResponse::from)
            .collect();

        let total_grams = grams(checked_sum(items.iter().map(|i| i.inventory.quantity_in_grams))?);
        let total_value = money(checked_sum(items.iter().map(|i| i.inventory_value))?);

        Ok(InventorySummary {
            total_carats: items.len(),
            total_grams,
            total_value,
            low_stock_count: items.iter().filter(|i| i.low_stock).count(),
            over_stock_count: items.iter().filter(|i| i.over_stock).count(),
            items,
        })
    }

    /// 0 si aucun stock n'existe pour le carat
    pub async fn available_stock<C: ConnectionTrait>(db: &C, carat: i32) -> AppResult<Decimal> {
        Ok(Self::find_by_carat(db, carat)
            .await?
            .map(|i| i.quantity_in_grams)
            .unwrap_or(Decimal::ZERO))
    }

    pub async fn has_available_stock<C: ConnectionTrait>(db: &C, carat: i32, quantity: Decimal) -> AppResult<bool> {
        Ok(Self::available_stock(db, carat).await? >= quantity)
    }

    pub async fn check_stock(db: &DatabaseConnection, carat: i32, quantity: Decimal) -> AppResult<StockCheckResponse> {
        ensure_carat(carat)?;
        Ok(StockCheckResponse {
            carat,
            requested: quantity,
            available: Self::available_stock(db, carat).await?,
            has_stock: Self::has_available_stock(db, carat, quantity).await?,
        })
    }

    /// Journal d'un carat, plus récent d'abord
    pub async fn movements(
        db: &DatabaseConnection,
        inventory_id: i32,
        params: &PageParams,
    ) -> AppResult<Page<inventory_movement::Model>> {
        Self::get(db, inventory_id).await?;
        let query = inventory_movement::Entity::find()
            .filter(inventory_movement::Column::InventoryId.eq(inventory_id))
            .order_by_desc(inventory_movement::Column::CreatedAt)
            .order_by_desc(inventory_movement::Column::Id);
        fetch_page(db, query, params).await
    }

    pub async fn all_movements(
        db: &DatabaseConnection,
        params: &PageParams,
    ) -> AppResult<Page<inventory_movement::Model>> {
        let query = inventory_movement::Entity::find()
            .order_by_desc(inventory_movement::Column::CreatedAt)
            .order_by_desc(inventory_movement::Column::Id);
        fetch_page(db, query, params).await
    }

    async fn insert_empty<C: ConnectionTrait>(
        db: &C,
        carat: i32,
        minimum: Decimal,
        maximum: Decimal,
        notes: Option<String>,
    ) -> AppResult<gold_inventory::Model> {
        let inventory = gold_inventory::ActiveModel {
            carat: Set(carat),
            quantity_in_grams: Set(grams(Decimal::ZERO)),
            average_buy_price: Set(money(Decimal::ZERO)),
            minimum_stock: Set(grams(minimum)),
            maximum_stock: Set(grams(maximum)),
            notes: Set(notes),
            last_updated: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(carat, "inventory created");
        Ok(inventory)
    }

    async fn save_levels<C: ConnectionTrait>(
        db: &C,
        current: gold_inventory::Model,
        next: &gold_inventory::Model,
    ) -> AppResult<gold_inventory::Model> {
        let mut active: gold_inventory::ActiveModel = current.into();
        active.quantity_in_grams = Set(next.quantity_in_grams);
        active.average_buy_price = Set(next.average_buy_price);
        active.last_updated = Set(Utc::now());
        Ok(active.update(db).await?)
    }

    async fn record_movement<C: ConnectionTrait>(
        db: &C,
        inventory: &gold_inventory::Model,
        movement_type: MovementType,
        quantity: Decimal,
        price_per_gram: Decimal,
        reason: &str,
        transaction_id: Option<i32>,
    ) -> AppResult<inventory_movement::Model> {
        Ok(inventory_movement::ActiveModel {
            inventory_id: Set(inventory.id),
            transaction_id: Set(transaction_id),
            movement_type: Set(movement_type),
            quantity: Set(quantity),
            price_per_gram: Set(price_per_gram),
            balance_after: Set(inventory.quantity_in_grams),
            reason: Set(Some(reason.to_string())),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?)
    }
}

fn ensure_carat(carat: i32) -> AppResult<()> {
    if !is_allowed_carat(carat) {
        return Err(AppError::validation(format!(
            "Carat must be one of: {:?}",
            ALLOWED_CARATS
        )));
    }
    Ok(())
}
