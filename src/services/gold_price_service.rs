use chrono::Utc;
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use std::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::models::gold_price;
use crate::utils::money::{checked_mul, money};

/// Prix par défaut quand aucun prix actif n'existe
pub const DEFAULT_BUY_PRICE: Decimal = Decimal::from_parts(200000, 0, 0, false, 2);
pub const DEFAULT_SELL_PRICE: Decimal = Decimal::from_parts(196000, 0, 0, false, 2);

/// Variation maximale d'un tick simulé (±2%)
const MAX_FLUCTUATION: f64 = 0.02;
/// Prix de vente = achat × 0.98
const SELL_RATIO: Decimal = Decimal::from_parts(98, 0, 0, false, 2);

pub struct GoldPriceService;

impl GoldPriceService {
    /// Dernier prix actif
    pub async fn current<C: ConnectionTrait>(db: &C) -> AppResult<Option<gold_price::Model>> {
        Ok(gold_price::Entity::find()
            .filter(gold_price::Column::IsActive.eq(true))
            .order_by_desc(gold_price::Column::Timestamp)
            .order_by_desc(gold_price::Column::Id)
            .one(db)
            .await?)
    }

    pub async fn require_current<C: ConnectionTrait>(db: &C) -> AppResult<gold_price::Model> {
        Self::current(db)
            .await?
            .ok_or_else(|| AppError::not_found("Gold price not available"))
    }

    /// Désactive le prix courant et enregistre le nouveau comme seul prix actif
    pub async fn update(db: &DatabaseConnection, buy_price: Decimal, sell_price: Decimal) -> AppResult<gold_price::Model> {
        if buy_price <= Decimal::ZERO || sell_price <= Decimal::ZERO {
            return Err(AppError::validation("Buy and sell prices must be positive"));
        }

        let txn = db.begin().await?;

        gold_price::Entity::update_many()
            .col_expr(gold_price::Column::IsActive, Expr::value(false))
            .filter(gold_price::Column::IsActive.eq(true))
            .exec(&txn)
            .await?;

        let price = gold_price::ActiveModel {
            buy_price: Set(money(buy_price)),
            sell_price: Set(money(sell_price)),
            currency: Set(gold_price::DEFAULT_CURRENCY.to_string()),
            timestamp: Set(Utc::now()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(buy = %price.buy_price, sell = %price.sell_price, "gold price updated");
        Ok(price)
    }

    /// 2000.00 / 1960.00 si aucun prix actif
    pub async fn initialize_default(db: &DatabaseConnection) -> AppResult<gold_price::Model> {
        match Self::current(db).await? {
            Some(price) => Ok(price),
            None => Self::update(db, DEFAULT_BUY_PRICE, DEFAULT_SELL_PRICE).await,
        }
    }

    /// Nouveau prix = prix courant ± 2% (marché simulé)
    pub async fn simulate_tick(db: &DatabaseConnection) -> AppResult<gold_price::Model> {
        let base = Self::current(db)
            .await?
            .map(|p| p.buy_price)
            .unwrap_or(DEFAULT_BUY_PRICE);

        let (buy, sell) = next_prices(base, random_fluctuation())?;
        Self::update(db, buy, sell).await
    }
}

/// (achat, vente) arrondis à 2 décimales
pub fn next_prices(base: Decimal, fluctuation: Decimal) -> AppResult<(Decimal, Decimal)> {
    let buy = money(checked_mul(base, Decimal::ONE + fluctuation)?);
    let sell = money(checked_mul(buy, SELL_RATIO)?);
    Ok((buy, sell))
}

fn random_fluctuation() -> Decimal {
    let value = rand::thread_rng().gen_range(-MAX_FLUCTUATION..=MAX_FLUCTUATION);
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Tick périodique ; une erreur est journalisée et le tick suivant a lieu quand même
pub async fn run_price_ticker(db: DatabaseConnection, period: Duration) {
    tracing::info!(seconds = period.as_secs(), "starting gold price ticker");

    let mut interval = tokio::time::interval(period);
    // le premier tick est immédiat
    interval.tick().await;

    loop {
        interval.tick().await;
        match GoldPriceService::simulate_tick(&db).await {
            Ok(price) => tracing::info!(buy = %price.buy_price, sell = %price.sell_price, "simulated price tick"),
            Err(e) => tracing::error!(error = %e, "gold price tick failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_db;
    use rust_decimal_macros::dec;

    #[test]
    fn next_prices_apply_fluctuation_and_spread() {
        let (buy, sell) = next_prices(dec!(2000), dec!(0.01)).unwrap();
        assert_eq!(buy, dec!(2020.00));
        assert_eq!(sell, dec!(1979.60));

        let (buy, _) = next_prices(dec!(2000), dec!(-0.02)).unwrap();
        assert_eq!(buy, dec!(1960.00));

        assert!(matches!(next_prices(Decimal::MAX, dec!(0.02)), Err(AppError::Validation(_))));
    }

    #[test]
    fn default_constants() {
        assert_eq!(DEFAULT_BUY_PRICE, dec!(2000.00));
        assert_eq!(DEFAULT_SELL_PRICE, dec!(1960.00));
        assert_eq!(SELL_RATIO, dec!(0.98));
    }

    #[tokio::test]
    async fn only_one_active_price() {
        let db = setup_db().await;
        assert!(GoldPriceService::current(&db).await.unwrap().is_none());

        let first = GoldPriceService::initialize_default(&db).await.unwrap();
        assert_eq!(first.buy_price, dec!(2000));

        // déjà initialisé : pas de nouvelle ligne
        let again = GoldPriceService::initialize_default(&db).await.unwrap();
        assert_eq!(again.id, first.id);

        let second = GoldPriceService::update(&db, dec!(2100), dec!(2050)).await.unwrap();
        let current = GoldPriceService::current(&db).await.unwrap().unwrap();
        assert_eq!(current.id, second.id);

        let active = gold_price::Entity::find()
            .filter(gold_price::Column::IsActive.eq(true))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(active, 1);
    }

    #[tokio::test]
    async fn simulated_tick_stays_within_two_percent() {
        let db = setup_db().await;
        GoldPriceService::initialize_default(&db).await.unwrap();

        let price = GoldPriceService::simulate_tick(&db).await.unwrap();
        assert!(price.buy_price >= dec!(1960) && price.buy_price <= dec!(2040));
        assert_eq!(price.sell_price, money(price.buy_price * dec!(0.98)));
    }

    #[tokio::test]
    async fn non_positive_prices_are_rejected() {
        let db = setup_db().await;
        let result = GoldPriceService::update(&db, dec!(0), dec!(10)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
