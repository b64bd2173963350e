// ============================================================================
// SERVICE : TRANSACTIONS
// ============================================================================
//
// Description:
//   Exécution des achats / ventes d'or. Chaque opération tourne dans UNE
//   transaction BD : en cas d'erreur la transaction n'est pas commitée et rien
//   n'est persisté (ni la transaction, ni les soldes, ni le stock).
//
// Opérations:
//   - buy_gold / sell_gold : compte utilisateur au prix de l'or courant
//   - buy_by_carat / sell_by_carat : compte utilisateur au prix du carat
//   - purchase_from_provider : achat fournisseur → entrée de stock (IN)
//   - sell_to_client : vente client → sortie de stock (OUT)
//   - cancel : PENDING → CANCELLED uniquement
//
// Points d'attention:
//   - total = round2(grammes × prix)
//   - Achat fournisseur / vente client ne touchent pas au solde de l'utilisateur
//     (caisse de la boutique hors périmètre), seulement au stock
//
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::*;

use crate::errors::{AppError, AppResult};
use crate::models::dto::{Page, PageParams, PurchaseRequest, SaleRequest};
use crate::models::gold_inventory::is_allowed_carat;
use crate::models::transaction::{self, TransactionStatus, TransactionType};
use crate::services::carat_price_service::CaratPriceService;
use crate::services::client_service::ClientService;
use crate::services::gold_price_service::GoldPriceService;
use crate::services::inventory_service::InventoryService;
use crate::services::pagination::fetch_page;
use crate::services::provider_service::ProviderService;
use crate::services::user_service::UserService;
use crate::utils::money::{checked_mul, grams, money};

/// Données d'une transaction avant insertion (statut PENDING)
struct NewTransaction {
    user_id: i32,
    client_id: Option<i32>,
    provider_id: Option<i32>,
    transaction_type: TransactionType,
    gold_carat: Option<i32>,
    gold_amount: Decimal,
    price_per_gram: Decimal,
    description: Option<String>,
}

pub struct TransactionService;

impl TransactionService {
    /// Achat d'or au prix d'achat courant : débite le solde, crédite l'avoir
    pub async fn buy_gold(db: &DatabaseConnection, user_id: i32, amount: Decimal) -> AppResult<transaction::Model> {
        let amount = positive_grams(amount)?;

        let txn = db.begin().await?;
        let price = GoldPriceService::require_current(&txn).await?;
        let result = Self::execute_buy(&txn, user_id, None, amount, price.buy_price).await?;
        txn.commit().await?;

        tracing::info!(user_id, transaction_id = result.id, %amount, total = %result.total_amount, "gold bought");
        Ok(result)
    }

    /// Vente d'or au prix de vente courant : débite l'avoir, crédite le solde
    pub async fn sell_gold(db: &DatabaseConnection, user_id: i32, amount: Decimal) -> AppResult<transaction::Model> {
        let amount = positive_grams(amount)?;

        let txn = db.begin().await?;
        let price = GoldPriceService::require_current(&txn).await?;
        let result = Self::execute_sell(&txn, user_id, None, amount, price.sell_price).await?;
        txn.commit().await?;

        tracing::info!(user_id, transaction_id = result.id, %amount, total = %result.total_amount, "gold sold");
        Ok(result)
    }

    pub async fn buy_by_carat(
        db: &DatabaseConnection,
        user_id: i32,
        carat: i32,
        amount: Decimal,
    ) -> AppResult<transaction::Model> {
        let amount = positive_grams(amount)?;
        ensure_carat(carat)?;

        let txn = db.begin().await?;
        let price = CaratPriceService::get(&txn, carat).await?;
        let result = Self::execute_buy(&txn, user_id, Some(carat), amount, price.price_per_gram).await?;
        txn.commit().await?;

        tracing::info!(user_id, carat, %amount, "gold bought by carat");
        Ok(result)
    }

    pub async fn sell_by_carat(
        db: &DatabaseConnection,
        user_id: i32,
        carat: i32,
        amount: Decimal,
    ) -> AppResult<transaction::Model> {
        let amount = positive_grams(amount)?;
        ensure_carat(carat)?;

        let txn = db.begin().await?;
        let price = CaratPriceService::get(&txn, carat).await?;
        let result = Self::execute_sell(&txn, user_id, Some(carat), amount, price.price_per_gram).await?;
        txn.commit().await?;

        tracing::info!(user_id, carat, %amount, "gold sold by carat");
        Ok(result)
    }

    /// Achat auprès d'un fournisseur : transaction BUY + entrée de stock liée
    pub async fn purchase_from_provider(
        db: &DatabaseConnection,
        user_id: i32,
        request: PurchaseRequest,
    ) -> AppResult<transaction::Model> {
        let amount = positive_grams(request.grams)?;
        let price = positive_price(request.price_per_gram)?;
        ensure_carat(request.carat)?;

        let txn = db.begin().await?;
        let provider = ProviderService::get_active(&txn, request.provider_id).await?;

        let pending = Self::insert_pending(
            &txn,
            NewTransaction {
                user_id,
                client_id: None,
                provider_id: Some(provider.id),
                transaction_type: TransactionType::Buy,
                gold_carat: Some(request.carat),
                gold_amount: amount,
                price_per_gram: price,
                description: request.description,
            },
        )
        .await?;

        let reason = format!("Compra a proveedor {} {}", provider.first_name, provider.last_name);
        InventoryService::add_stock(&txn, request.carat, amount, price, &reason, Some(pending.id)).await?;

        let completed = Self::complete(&txn, pending).await?;
        txn.commit().await?;

        tracing::info!(
            transaction_id = completed.id,
            provider_id = provider.id,
            carat = request.carat,
            %amount,
            "purchase from provider"
        );
        Ok(completed)
    }

    /// Vente à un client : transaction SELL + sortie de stock liée
    pub async fn sell_to_client(
        db: &DatabaseConnection,
        user_id: i32,
        request: SaleRequest,
    ) -> AppResult<transaction::Model> {
        let amount = positive_grams(request.grams)?;
        let price = positive_price(request.price_per_gram)?;
        ensure_carat(request.carat)?;

        let txn = db.begin().await?;
        let client = ClientService::get_active(&txn, request.client_id).await?;

        let pending = Self::insert_pending(
            &txn,
            NewTransaction {
                user_id,
                client_id: Some(client.id),
                provider_id: None,
                transaction_type: TransactionType::Sell,
                gold_carat: Some(request.carat),
                gold_amount: amount,
                price_per_gram: price,
                description: request.description,
            },
        )
        .await?;

        let reason = format!("Venta a cliente {} {}", client.first_name, client.last_name);
        InventoryService::remove_stock(&txn, request.carat, amount, &reason, Some(pending.id)).await?;

        let completed = Self::complete(&txn, pending).await?;
        txn.commit().await?;

        tracing::info!(
            transaction_id = completed.id,
            client_id = client.id,
            carat = request.carat,
            %amount,
            "sale to client"
        );
        Ok(completed)
    }

    /// PENDING → CANCELLED ; tout autre statut est terminal
    pub async fn cancel(
        db: &DatabaseConnection,
        user_id: i32,
        id: i32,
        reason: Option<String>,
    ) -> AppResult<transaction::Model> {
        let existing = Self::get_for_user(db, user_id, id).await?;
        if !existing.status.can_transition_to(TransactionStatus::Cancelled) {
            return Err(AppError::invalid_state(format!(
                "Transaction {} is {:?} and cannot be cancelled",
                id, existing.status
            )));
        }

        let description = match (existing.description.clone(), reason) {
            (Some(d), Some(r)) => Some(format!("{}\nCANCELLED: {}", d, r)),
            (None, Some(r)) => Some(format!("CANCELLED: {}", r)),
            (d, None) => d,
        };

        let mut active: transaction::ActiveModel = existing.into();
        active.status = Set(TransactionStatus::Cancelled);
        active.description = Set(description);
        let cancelled = active.update(db).await?;

        tracing::info!(transaction_id = id, "transaction cancelled");
        Ok(cancelled)
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<transaction::Model> {
        transaction::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Transaction not found: {}", id)))
    }

    /// Transaction appartenant à l'utilisateur (sinon 404)
    pub async fn get_for_user(db: &DatabaseConnection, user_id: i32, id: i32) -> AppResult<transaction::Model> {
        let found = Self::get(db, id).await?;
        if found.user_id != user_id {
            return Err(AppError::not_found(format!("Transaction not found: {}", id)));
        }
        Ok(found)
    }

    /// Historique paginé, plus récent d'abord
    pub async fn history(
        db: &DatabaseConnection,
        user_id: i32,
        params: &PageParams,
    ) -> AppResult<Page<transaction::Model>> {
        let query = transaction::Entity::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .order_by_desc(transaction::Column::CreatedAt)
            .order_by_desc(transaction::Column::Id);
        fetch_page(db, query, params).await
    }

    pub async fn history_between(
        db: &DatabaseConnection,
        user_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<transaction::Model>> {
        if start > end {
            return Err(AppError::validation("Start date must be before end date"));
        }

        Ok(transaction::Entity::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .filter(transaction::Column::CreatedAt.between(start, end))
            .order_by_desc(transaction::Column::CreatedAt)
            .all(db)
            .await?)
    }

    async fn execute_buy<C: ConnectionTrait>(
        txn: &C,
        user_id: i32,
        carat: Option<i32>,
        amount: Decimal,
        price_per_gram: Decimal,
    ) -> AppResult<transaction::Model> {
        let total = money(checked_mul(amount, price_per_gram)?);
        let user = UserService::find_by_id(txn, user_id).await?;
        if !user.can_afford(total) {
            return Err(AppError::InsufficientFunds(format!(
                "Insufficient funds. Balance: {}, required: {}",
                user.account_balance, total
            )));
        }

        let pending = Self::insert_pending(
            txn,
            NewTransaction {
                user_id,
                client_id: None,
                provider_id: None,
                transaction_type: TransactionType::Buy,
                gold_carat: carat,
                gold_amount: amount,
                price_per_gram,
                description: None,
            },
        )
        .await?;

        let user = UserService::adjust_balance(txn, user, -total).await?;
        UserService::adjust_holdings(txn, user, amount).await?;

        Self::complete(txn, pending).await
    }

    async fn execute_sell<C: ConnectionTrait>(
        txn: &C,
        user_id: i32,
        carat: Option<i32>,
        amount: Decimal,
        price_per_gram: Decimal,
    ) -> AppResult<transaction::Model> {
        let user = UserService::find_by_id(txn, user_id).await?;
        if !user.has_gold_holdings(amount) {
            return Err(AppError::InsufficientHoldings(format!(
                "Insufficient gold holdings. Available: {}, requested: {}",
                user.gold_holdings, amount
            )));
        }

        let pending = Self::insert_pending(
            txn,
            NewTransaction {
                user_id,
                client_id: None,
                provider_id: None,
                transaction_type: TransactionType::Sell,
                gold_carat: carat,
                gold_amount: amount,
                price_per_gram,
                description: None,
            },
        )
        .await?;

        let user = UserService::adjust_holdings(txn, user, -amount).await?;
        UserService::adjust_balance(txn, user, pending.total_amount).await?;

        Self::complete(txn, pending).await
    }

    async fn insert_pending<C: ConnectionTrait>(txn: &C, new: NewTransaction) -> AppResult<transaction::Model> {
        let price_per_gram = money(new.price_per_gram);
        let total = money(checked_mul(new.gold_amount, price_per_gram)?);

        Ok(transaction::ActiveModel {
            user_id: Set(new.user_id),
            client_id: Set(new.client_id),
            provider_id: Set(new.provider_id),
            transaction_type: Set(new.transaction_type),
            gold_carat: Set(new.gold_carat),
            gold_amount: Set(grams(new.gold_amount)),
            price_per_gram: Set(price_per_gram),
            total_amount: Set(total),
            status: Set(TransactionStatus::Pending),
            description: Set(new.description),
            created_at: Set(Utc::now()),
            completed_at: Set(None),
            ..Default::default()
        }
        .insert(txn)
        .await?)
    }

    async fn complete<C: ConnectionTrait>(txn: &C, pending: transaction::Model) -> AppResult<transaction::Model> {
        if !pending.status.can_transition_to(TransactionStatus::Completed) {
            return Err(AppError::invalid_state(format!(
                "Transaction {} is already {:?}",
                pending.id, pending.status
            )));
        }

        let mut active: transaction::ActiveModel = pending.into();
        active.status = Set(TransactionStatus::Completed);
        active.completed_at = Set(Some(Utc::now()));
        Ok(active.update(txn).await?)
    }
}

fn positive_grams(amount: Decimal) -> AppResult<Decimal> {
    let amount = grams(amount);
    if amount <= Decimal::ZERO {
        return Err(AppError::validation("Gold amount must be positive"));
    }
    Ok(amount)
}

fn positive_price(price: Decimal) -> AppResult<Decimal> {
    let price = money(price);
    if price <= Decimal::ZERO {
        return Err(AppError::validation("Price per gram must be positive"));
    }
    Ok(price)
}

fn ensure_carat(carat: i32) -> AppResult<()> {
    if !is_allowed_carat(carat) {
        return Err(AppError::validation(format!("Unsupported gold carat: {}", carat)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory_movement;
    use crate::test_support::{seed_client, seed_gold_price, seed_provider, seed_user, setup_db};
    use rust_decimal_macros::dec;

    async fn transaction_count(db: &DatabaseConnection) -> u64 {
        transaction::Entity::find().count(db).await.unwrap()
    }

    #[tokio::test]
    async fn buy_then_sell_restores_balance_and_holdings() {
        let db = setup_db().await;
        seed_gold_price(&db, dec!(55.25), dec!(55.25)).await;
        let user = seed_user(&db, "ana", dec!(1000), dec!(0)).await;

        let bought = TransactionService::buy_gold(&db, user.id, dec!(3.5)).await.unwrap();
        assert_eq!(bought.status, TransactionStatus::Completed);
        assert_eq!(bought.total_amount, dec!(193.38));
        assert!(bought.completed_at.is_some());

        let mid = UserService::find_by_id(&db, user.id).await.unwrap();
        assert_eq!(mid.account_balance, dec!(806.62));
        assert_eq!(mid.gold_holdings, dec!(3.5));

        TransactionService::sell_gold(&db, user.id, dec!(3.5)).await.unwrap();
        let after = UserService::find_by_id(&db, user.id).await.unwrap();
        assert_eq!(after.account_balance, dec!(1000));
        assert_eq!(after.gold_holdings, dec!(0));
    }

    #[tokio::test]
    async fn overselling_is_rejected_without_side_effects() {
        let db = setup_db().await;
        seed_gold_price(&db, dec!(60), dec!(58)).await;
        let user = seed_user(&db, "beto", dec!(10), dec!(1)).await;

        let result = TransactionService::sell_gold(&db, user.id, dec!(1.000001)).await;
        assert!(matches!(result, Err(AppError::InsufficientHoldings(_))));

        let unchanged = UserService::find_by_id(&db, user.id).await.unwrap();
        assert_eq!(unchanged.account_balance, dec!(10));
        assert_eq!(unchanged.gold_holdings, dec!(1));
        assert_eq!(transaction_count(&db).await, 0);
    }

    #[tokio::test]
    async fn buying_beyond_balance_persists_nothing() {
        let db = setup_db().await;
        seed_gold_price(&db, dec!(60), dec!(58)).await;
        let user = seed_user(&db, "carla", dec!(59.99), dec!(0)).await;

        let result = TransactionService::buy_gold(&db, user.id, dec!(1)).await;
        assert!(matches!(result, Err(AppError::InsufficientFunds(_))));
        assert_eq!(transaction_count(&db).await, 0);
    }

    #[tokio::test]
    async fn oversized_amount_is_a_validation_error() {
        let db = setup_db().await;
        seed_gold_price(&db, dec!(2000), dec!(1960)).await;
        let user = seed_user(&db, "elena", dec!(500), dec!(0)).await;
        let huge = Decimal::from_str_exact("40000000000000000000000000").unwrap();

        let result = TransactionService::buy_gold(&db, user.id, huge).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let unchanged = UserService::find_by_id(&db, user.id).await.unwrap();
        assert_eq!(unchanged.account_balance, dec!(500));
        assert_eq!(unchanged.gold_holdings, dec!(0));
        assert_eq!(transaction_count(&db).await, 0);
    }

    #[tokio::test]
    async fn no_price_means_not_found() {
        let db = setup_db().await;
        let user = seed_user(&db, "dani", dec!(100), dec!(0)).await;

        let result = TransactionService::buy_gold(&db, user.id, dec!(1)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let zero = TransactionService::buy_gold(&db, user.id, dec!(0)).await;
        assert!(matches!(zero, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn carat_trades_use_the_carat_price() {
        let db = setup_db().await;
        CaratPriceService::upsert(&db, 18, dec!(45)).await.unwrap();
        let user = seed_user(&db, "eva", dec!(100), dec!(0)).await;

        let bought = TransactionService::buy_by_carat(&db, user.id, 18, dec!(2)).await.unwrap();
        assert_eq!(bought.gold_carat, Some(18));
        assert_eq!(bought.total_amount, dec!(90));

        let sold = TransactionService::sell_by_carat(&db, user.id, 18, dec!(2)).await.unwrap();
        assert_eq!(sold.transaction_type, TransactionType::Sell);

        let missing = TransactionService::buy_by_carat(&db, user.id, 22, dec!(1)).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn provider_purchase_feeds_inventory() {
        let db = setup_db().await;
        let user = seed_user(&db, "cajero", dec!(0), dec!(0)).await;
        let provider = seed_provider(&db, "3-1010-0011").await;

        let purchase = TransactionService::purchase_from_provider(
            &db,
            user.id,
            PurchaseRequest {
                provider_id: provider.id,
                carat: 18,
                grams: dec!(10),
                price_per_gram: dec!(60),
                description: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(purchase.provider_id, Some(provider.id));
        assert_eq!(purchase.total_amount, dec!(600));

        let inventory = InventoryService::get_by_carat(&db, 18).await.unwrap();
        assert_eq!(inventory.quantity_in_grams, dec!(10));
        assert_eq!(inventory.average_buy_price, dec!(60));

        let movement = inventory_movement::Entity::find()
            .filter(inventory_movement::Column::TransactionId.eq(purchase.id))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(movement.quantity, dec!(10));

        // le solde de l'utilisateur n'est pas touché
        let unchanged = UserService::find_by_id(&db, user.id).await.unwrap();
        assert_eq!(unchanged.account_balance, dec!(0));
    }

    #[tokio::test]
    async fn client_sale_beyond_stock_rolls_back() {
        let db = setup_db().await;
        let user = seed_user(&db, "cajero", dec!(0), dec!(0)).await;
        let client = seed_client(&db, "1-2345-6789").await;
        InventoryService::add_stock(&db, 22, dec!(4), dec!(70), "inicial", None).await.unwrap();

        let sale = |grams| SaleRequest {
            client_id: client.id,
            carat: 22,
            grams,
            price_per_gram: dec!(90),
            description: None,
        };

        let refused = TransactionService::sell_to_client(&db, user.id, sale(dec!(5))).await;
        assert!(matches!(refused, Err(AppError::InsufficientStock(_))));
        assert_eq!(transaction_count(&db).await, 0);

        let sold = TransactionService::sell_to_client(&db, user.id, sale(dec!(1.5))).await.unwrap();
        assert_eq!(sold.client_id, Some(client.id));
        assert_eq!(InventoryService::available_stock(&db, 22).await.unwrap(), dec!(2.5));
    }

    #[tokio::test]
    async fn inactive_counterpart_is_rejected() {
        let db = setup_db().await;
        let user = seed_user(&db, "cajero", dec!(0), dec!(0)).await;
        let provider = seed_provider(&db, "3-1010-0011").await;
        ProviderService::set_active(&db, provider.id, false).await.unwrap();

        let result = TransactionService::purchase_from_provider(
            &db,
            user.id,
            PurchaseRequest {
                provider_id: provider.id,
                carat: 18,
                grams: dec!(1),
                price_per_gram: dec!(60),
                description: None,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(InventoryService::find_by_carat(&db, 18).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn only_pending_transactions_can_be_cancelled() {
        let db = setup_db().await;
        seed_gold_price(&db, dec!(10), dec!(10)).await;
        let user = seed_user(&db, "fer", dec!(100), dec!(0)).await;

        let completed = TransactionService::buy_gold(&db, user.id, dec!(1)).await.unwrap();
        let refused = TransactionService::cancel(&db, user.id, completed.id, None).await;
        assert!(matches!(refused, Err(AppError::InvalidState(_))));

        let pending = TransactionService::insert_pending(
            &db,
            NewTransaction {
                user_id: user.id,
                client_id: None,
                provider_id: None,
                transaction_type: TransactionType::PawnLoan,
                gold_carat: Some(14),
                gold_amount: dec!(5),
                price_per_gram: dec!(20),
                description: None,
            },
        )
        .await
        .unwrap();

        let cancelled = TransactionService::cancel(&db, user.id, pending.id, Some("cliente desistió".into()))
            .await
            .unwrap();
        assert_eq!(cancelled.status, TransactionStatus::Cancelled);
        assert_eq!(cancelled.description.as_deref(), Some("CANCELLED: cliente desistió"));

        let again = TransactionService::cancel(&db, user.id, pending.id, None).await;
        assert!(matches!(again, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn history_is_scoped_to_the_user() {
        let db = setup_db().await;
        seed_gold_price(&db, dec!(10), dec!(10)).await;
        let ana = seed_user(&db, "ana", dec!(100), dec!(0)).await;
        let beto = seed_user(&db, "beto", dec!(100), dec!(0)).await;

        TransactionService::buy_gold(&db, ana.id, dec!(1)).await.unwrap();
        let last = TransactionService::buy_gold(&db, ana.id, dec!(2)).await.unwrap();
        let other = TransactionService::buy_gold(&db, beto.id, dec!(1)).await.unwrap();

        let page = TransactionService::history(&db, ana.id, &PageParams::default()).await.unwrap();
        assert_eq!(page.total_elements, 2);
        assert_eq!(page.content[0].id, last.id);

        let foreign = TransactionService::get_for_user(&db, ana.id, other.id).await;
        assert!(matches!(foreign, Err(AppError::NotFound(_))));

        let range = TransactionService::history_between(
            &db,
            ana.id,
            Utc::now() - chrono::Duration::hours(1),
            Utc::now() + chrono::Duration::hours(1),
        )
        .await
        .unwrap();
        assert_eq!(range.len(), 2);
    }
}
