use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::*;

use crate::errors::{AppError, AppResult};
use crate::models::carat_price;
use crate::models::gold_inventory::is_allowed_carat;
use crate::utils::money::money;

pub struct CaratPriceService;

impl CaratPriceService {
    pub async fn list(db: &DatabaseConnection) -> AppResult<Vec<carat_price::Model>> {
        Ok(carat_price::Entity::find()
            .order_by_asc(carat_price::Column::Carat)
            .all(db)
            .await?)
    }

    pub async fn find<C: ConnectionTrait>(db: &C, carat: i32) -> AppResult<Option<carat_price::Model>> {
        Ok(carat_price::Entity::find()
            .filter(carat_price::Column::Carat.eq(carat))
            .one(db)
            .await?)
    }

    pub async fn get<C: ConnectionTrait>(db: &C, carat: i32) -> AppResult<carat_price::Model> {
        Self::find(db, carat)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No price defined for carat {}", carat)))
    }

    /// Crée ou remplace le prix au gramme d'un carat
    pub async fn upsert(db: &DatabaseConnection, carat: i32, price_per_gram: Decimal) -> AppResult<carat_price::Model> {
        if !is_allowed_carat(carat) {
            return Err(AppError::validation(format!("Unsupported gold carat: {}", carat)));
        }
        if price_per_gram <= Decimal::ZERO {
            return Err(AppError::validation("Price per gram must be positive"));
        }

        let price = match Self::find(db, carat).await? {
            Some(existing) => {
                let mut active: carat_price::ActiveModel = existing.into();
                active.price_per_gram = Set(money(price_per_gram));
                active.updated_at = Set(Utc::now());
                active.update(db).await?
            }
            None => {
                carat_price::ActiveModel {
                    carat: Set(carat),
                    price_per_gram: Set(money(price_per_gram)),
                    updated_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(db)
                .await?
            }
        };

        tracing::info!(carat, price = %price.price_per_gram, "carat price set");
        Ok(price)
    }
}
