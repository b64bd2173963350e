// ============================================================================
// SERVICE : FACTURES
// ============================================================================
//
// Description:
//   Génère la facture d'une transaction COMPLETED (une seule par transaction)
//   et gère son cycle de vie DRAFT → ISSUED → PAID / CANCELLED.
//
// Points d'attention:
//   - Une facture PAID n'est plus modifiable, annulable ni supprimable
//   - Le numéro YYYY-MM-NNNNNN dépend du nombre de factures du mois ; en cas
//     de collision la création est refusée (pas de nouvel essai)
//
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::*;

use crate::errors::{AppError, AppResult};
use crate::models::dto::{CreateInvoiceRequest, InvoiceResponse, InvoiceSummary, Page, PageParams, UpdateInvoiceRequest};
use crate::models::invoice::{
    self, compute_totals, default_due_date, format_invoice_number, item_description, month_bounds,
    validate_tax_rate, InvoiceStatus, InvoiceType, DEFAULT_CURRENCY, LEGAL_TERMS,
};
use crate::models::invoice_item::{self, line_total, DEFAULT_UNIT};
use crate::models::party::{full_address, invoice_tax_id};
use crate::models::transaction::{self, TransactionStatus, TransactionType};
use crate::services::client_service::ClientService;
use crate::services::pagination::fetch_page;
use crate::services::provider_service::ProviderService;
use crate::services::transaction_service::TransactionService;
use crate::utils::money::{checked_sum, money};

/// Coordonnées fiscales de la contrepartie copiées sur la facture
/// Coordonnées fiscales copiées sur la facture, absentes sans client ni fournisseur
#[derive(Default)]
struct Counterparty {
    tax_id: Option<String>,
    address: Option<String>,
}

pub struct InvoiceService;

impl InvoiceService {
    pub async fn create_from_transaction(
        db: &DatabaseConnection,
        request: CreateInvoiceRequest,
        default_tax_rate: Decimal,
    ) -> AppResult<InvoiceResponse> {
        let tax_rate = request.tax_rate.unwrap_or(default_tax_rate);
        validate_tax_rate(tax_rate)?;

        let txn = db.begin().await?;
        let source = TransactionService::get(&txn, request.transaction_id).await?;

        if source.status != TransactionStatus::Completed {
            return Err(AppError::invalid_state(format!(
                "Only completed transactions can be invoiced (transaction {} is {:?})",
                source.id, source.status
            )));
        }

        let already_invoiced = invoice::Entity::find()
            .filter(invoice::Column::TransactionId.eq(source.id))
            .count(&txn)
            .await?
            > 0;
        if already_invoiced {
            return Err(AppError::invalid_state(format!(
                "Transaction {} already has an invoice",
                source.id
            )));
        }

        // SELL → SALE, tout autre type → PURCHASE
        let invoice_type = if source.transaction_type == TransactionType::Sell {
            InvoiceType::Sale
        } else {
            InvoiceType::Purchase
        };
        let counterparty = Self::counterparty(&txn, &source, invoice_type).await?;

        let issue_date = Utc::now();
        let invoice_number = Self::next_invoice_number(&txn, issue_date).await?;

        let subtotal = line_total(source.gold_amount, source.price_per_gram)?;
        let (tax_amount, total) = compute_totals(subtotal, tax_rate)?;

        let created = invoice::ActiveModel {
            invoice_number: Set(invoice_number),
            client_id: Set(source.client_id),
            provider_id: Set(source.provider_id),
            transaction_id: Set(source.id),
            invoice_type: Set(invoice_type),
            subtotal: Set(subtotal),
            tax_rate: Set(money(tax_rate)),
            tax_amount: Set(tax_amount),
            total: Set(total),
            currency: Set(DEFAULT_CURRENCY.to_string()),
            status: Set(InvoiceStatus::Draft),
            notes: Set(request.notes),
            legal_terms: Set(Some(LEGAL_TERMS.to_string())),
            customer_tax_id: Set(counterparty.tax_id),
            customer_address: Set(counterparty.address),
            payment_method: Set(request.payment_method),
            issue_date: Set(issue_date),
            due_date: Set(Some(request.due_date.unwrap_or_else(|| default_due_date(issue_date)))),
            paid_date: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let item = invoice_item::ActiveModel {
            invoice_id: Set(created.id),
            description: Set(item_description(source.gold_carat, source.gold_amount)),
            quantity: Set(source.gold_amount),
            unit: Set(DEFAULT_UNIT.to_string()),
            unit_price: Set(source.price_per_gram),
            total: Set(subtotal),
            gold_carat: Set(source.gold_carat),
            item_details: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(
            invoice_id = created.id,
            number = %created.invoice_number,
            transaction_id = source.id,
            total = %created.total,
            "invoice created"
        );
        Ok(to_response(created, vec![item]))
    }

    async fn counterparty<C: ConnectionTrait>(
        txn: &C,
        source: &transaction::Model,
        invoice_type: InvoiceType,
    ) -> AppResult<Counterparty> {
        let (tax_id, address) = match (invoice_type, source.client_id, source.provider_id) {
            (InvoiceType::Sale, Some(client_id), _) => {
                let client = ClientService::get(txn, client_id).await?;
                (
                    invoice_tax_id(client.tax_id.as_deref(), &client.cedula),
                    full_address(client.address.as_deref(), client.city.as_deref(), client.province.as_deref()),
                )
            }
            (InvoiceType::Purchase, _, Some(provider_id)) => {
                let provider = ProviderService::get(txn, provider_id).await?;
                (
                    invoice_tax_id(provider.tax_id.as_deref(), &provider.cedula),
                    full_address(provider.address.as_deref(), provider.city.as_deref(), provider.province.as_deref()),
                )
            }
            _ => return Ok(Counterparty::default()),
        };

        Ok(Counterparty {
            tax_id: Some(tax_id),
            address: Some(address).filter(|a| !a.is_empty()),
        })
    }

    /// Modifie une facture non payée et recalcule ses montants
    pub async fn update(db: &DatabaseConnection, id: i32, request: UpdateInvoiceRequest) -> AppResult<InvoiceResponse> {
        let existing = Self::find(db, id).await?;
        if existing.status == InvoiceStatus::Paid {
            return Err(AppError::invalid_state("Cannot update paid invoice"));
        }
        validate_tax_rate(request.tax_rate)?;

        let number = request.invoice_number.trim().to_string();
        if number != existing.invoice_number && Self::find_by_number(db, &number).await?.is_some() {
            return Err(AppError::Conflict(format!("Invoice number {} already exists", number)));
        }

        let items = Self::items(db, id).await?;
        let subtotal = if items.is_empty() {
            existing.subtotal
        } else {
            money(checked_sum(items.iter().map(|i| i.total))?)
        };
        let (tax_amount, total) = compute_totals(subtotal, request.tax_rate)?;

        let mut active: invoice::ActiveModel = existing.into();
        active.invoice_number = Set(number);
        active.tax_rate = Set(money(request.tax_rate));
        active.currency = Set(request.currency);
        active.notes = Set(request.notes);
        active.legal_terms = Set(request.legal_terms);
        active.customer_tax_id = Set(request.customer_tax_id);
        active.customer_address = Set(request.customer_address);
        active.payment_method = Set(request.payment_method);
        active.due_date = Set(request.due_date);
        active.subtotal = Set(subtotal);
        active.tax_amount = Set(tax_amount);
        active.total = Set(total);

        let updated = active.update(db).await?;
        Ok(to_response(updated, items))
    }

    /// DRAFT → ISSUED
    pub async fn issue(db: &DatabaseConnection, id: i32) -> AppResult<invoice::Model> {
        let existing = Self::find(db, id).await?;
        if existing.status != InvoiceStatus::Draft {
            return Err(AppError::invalid_state("Only draft invoices can be issued"));
        }

        let mut active: invoice::ActiveModel = existing.into();
        active.status = Set(InvoiceStatus::Issued);
        let issued = active.update(db).await?;

        tracing::info!(invoice_id = id, number = %issued.invoice_number, "invoice issued");
        Ok(issued)
    }

    /// DRAFT | ISSUED → PAID
    pub async fn pay(db: &DatabaseConnection, id: i32, payment_method: Option<String>) -> AppResult<invoice::Model> {
        let existing = Self::find(db, id).await?;
        match existing.status {
            InvoiceStatus::Paid => return Err(AppError::invalid_state("Invoice is already paid")),
            InvoiceStatus::Cancelled => return Err(AppError::invalid_state("Cannot pay a cancelled invoice")),
            _ => {}
        }

        let method = payment_method.or_else(|| existing.payment_method.clone());
        let mut active: invoice::ActiveModel = existing.into();
        active.status = Set(InvoiceStatus::Paid);
        active.paid_date = Set(Some(Utc::now()));
        active.payment_method = Set(method);
        let paid = active.update(db).await?;

        tracing::info!(invoice_id = id, total = %paid.total, "invoice paid");
        Ok(paid)
    }

    /// Tout statut non PAID → CANCELLED ; le motif est ajouté aux notes
    pub async fn cancel(db: &DatabaseConnection, id: i32, reason: Option<String>) -> AppResult<invoice::Model> {
        let existing = Self::find(db, id).await?;
        match existing.status {
            InvoiceStatus::Paid => return Err(AppError::invalid_state("Cannot cancel paid invoice")),
            InvoiceStatus::Cancelled => return Err(AppError::invalid_state("Invoice is already cancelled")),
            _ => {}
        }

        let line = format!("CANCELLED: {}", reason.unwrap_or_default());
        let notes = match existing.notes.as_deref() {
            Some(n) if !n.is_empty() => format!("{}\n{}", n, line),
            _ => line,
        };

        let mut active: invoice::ActiveModel = existing.into();
        active.status = Set(InvoiceStatus::Cancelled);
        active.notes = Set(Some(notes));
        let cancelled = active.update(db).await?;

        tracing::info!(invoice_id = id, "invoice cancelled");
        Ok(cancelled)
    }

    pub async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<()> {
        let existing = Self::find(db, id).await?;
        if existing.status == InvoiceStatus::Paid {
            return Err(AppError::invalid_state("Cannot delete paid invoice"));
        }

        let txn = db.begin().await?;
        invoice_item::Entity::delete_many()
            .filter(invoice_item::Column::InvoiceId.eq(id))
            .exec(&txn)
            .await?;
        invoice::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> AppResult<InvoiceResponse> {
        let found = Self::find(db, id).await?;
        let items = Self::items(db, id).await?;
        Ok(to_response(found, items))
    }

    pub async fn get_by_number(db: &DatabaseConnection, number: &str) -> AppResult<InvoiceResponse> {
        let found = Self::find_by_number(db, number)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice not found: {}", number)))?;
        let items = Self::items(db, found.id).await?;
        Ok(to_response(found, items))
    }

    pub async fn by_client(db: &DatabaseConnection, client_id: i32, params: &PageParams) -> AppResult<Page<invoice::Model>> {
        ClientService::get(db, client_id).await?;
        let query = invoice::Entity::find()
            .filter(invoice::Column::ClientId.eq(client_id))
            .order_by_desc(invoice::Column::IssueDate)
            .order_by_desc(invoice::Column::Id);
        fetch_page(db, query, params).await
    }

    pub async fn by_provider(db: &DatabaseConnection, provider_id: i32, params: &PageParams) -> AppResult<Page<invoice::Model>> {
        ProviderService::get(db, provider_id).await?;
        let query = invoice::Entity::find()
            .filter(invoice::Column::ProviderId.eq(provider_id))
            .order_by_desc(invoice::Column::IssueDate)
            .order_by_desc(invoice::Column::Id);
        fetch_page(db, query, params).await
    }

    /// OVERDUE est calculé, pas stocké
    pub async fn by_status(db: &DatabaseConnection, status: InvoiceStatus) -> AppResult<Vec<invoice::Model>> {
        if status == InvoiceStatus::Overdue {
            return Self::overdue(db).await;
        }
        Ok(invoice::Entity::find()
            .filter(invoice::Column::Status.eq(status))
            .order_by_desc(invoice::Column::IssueDate)
            .all(db)
            .await?)
    }

    pub async fn by_type(db: &DatabaseConnection, invoice_type: InvoiceType) -> AppResult<Vec<invoice::Model>> {
        Ok(invoice::Entity::find()
            .filter(invoice::Column::InvoiceType.eq(invoice_type))
            .order_by_desc(invoice::Column::IssueDate)
            .all(db)
            .await?)
    }

    pub async fn by_date_range(
        db: &DatabaseConnection,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<invoice::Model>> {
        if start > end {
            return Err(AppError::validation("Start date must be before end date"));
        }
        Ok(invoice::Entity::find()
            .filter(invoice::Column::IssueDate.between(start, end))
            .order_by_desc(invoice::Column::IssueDate)
            .all(db)
            .await?)
    }

    /// ISSUED dont l'échéance est passée
    pub async fn overdue(db: &DatabaseConnection) -> AppResult<Vec<invoice::Model>> {
        Ok(invoice::Entity::find()
            .filter(invoice::Column::Status.eq(InvoiceStatus::Issued))
            .filter(invoice::Column::DueDate.lt(Utc::now()))
            .order_by_asc(invoice::Column::DueDate)
            .all(db)
            .await?)
    }

    pub async fn summary(db: &DatabaseConnection) -> AppResult<InvoiceSummary> {
        let all = invoice::Entity::find().all(db).await?;
        let now = Utc::now();

        let total_of = |invoice_type: InvoiceType, status: InvoiceStatus| {
            checked_sum(
                all.iter()
                    .filter(|i| i.invoice_type == invoice_type && i.status == status)
                    .map(|i| i.total),
            )
            .map(money)
        };

        Ok(InvoiceSummary {
            paid_sales: total_of(InvoiceType::Sale, InvoiceStatus::Paid)?,
            paid_purchases: total_of(InvoiceType::Purchase, InvoiceStatus::Paid)?,
            pending_sales: total_of(InvoiceType::Sale, InvoiceStatus::Issued)?,
            overdue_count: all.iter().filter(|i| i.is_overdue(now)).count() as u64,
        })
    }

    async fn find(db: &DatabaseConnection, id: i32) -> AppResult<invoice::Model> {
        invoice::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice not found: {}", id)))
    }

    async fn find_by_number<C: ConnectionTrait>(db: &C, number: &str) -> AppResult<Option<invoice::Model>> {
        Ok(invoice::Entity::find()
            .filter(invoice::Column::InvoiceNumber.eq(number))
            .one(db)
            .await?)
    }

    async fn items(db: &DatabaseConnection, invoice_id: i32) -> AppResult<Vec<invoice_item::Model>> {
        Ok(invoice_item::Entity::find()
            .filter(invoice_item::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_item::Column::Id)
            .all(db)
            .await?)
    }

    /// Numéro = factures émises ce mois-ci + 1 ; refusé s'il existe déjà
    async fn next_invoice_number<C: ConnectionTrait>(db: &C, now: DateTime<Utc>) -> AppResult<String> {
        let (start, end) = month_bounds(now);
        let issued_this_month = invoice::Entity::find()
            .filter(invoice::Column::IssueDate.gte(start))
            .filter(invoice::Column::IssueDate.lt(end))
            .count(db)
            .await?;

        let number = format_invoice_number(now, issued_this_month + 1);
        if Self::find_by_number(db, &number).await?.is_some() {
            return Err(AppError::invalid_state(format!("Invoice number {} already exists", number)));
        }
        Ok(number)
    }
}

fn to_response(invoice: invoice::Model, items: Vec<invoice_item::Model>) -> InvoiceResponse {
    InvoiceResponse {
        overdue: invoice.effective_status(Utc::now()) == InvoiceStatus::Overdue,
        invoice,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dto::{PurchaseRequest, SaleRequest};
    use crate::services::inventory_service::InventoryService;
    use crate::test_support::{seed_client, seed_gold_price, seed_provider, seed_user, setup_db};
    use rust_decimal_macros::dec;

    fn create_request(transaction_id: i32) -> CreateInvoiceRequest {
        CreateInvoiceRequest {
            transaction_id,
            tax_rate: None,
            due_date: None,
            notes: None,
            payment_method: None,
        }
    }

    async fn completed_sale(db: &DatabaseConnection) -> transaction::Model {
        let user = seed_user(db, "cajero", dec!(0), dec!(0)).await;
        let client = seed_client(db, "1-2345-6789").await;
        InventoryService::add_stock(db, 18, dec!(20), dec!(55), "inicial", None).await.unwrap();

        TransactionService::sell_to_client(
            db,
            user.id,
            SaleRequest {
                client_id: client.id,
                carat: 18,
                grams: dec!(10.5),
                price_per_gram: dec!(62.30),
                description: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn sale_invoice_from_completed_transaction() {
        let db = setup_db().await;
        let sale = completed_sale(&db).await;

        let response = InvoiceService::create_from_transaction(&db, create_request(sale.id), dec!(13))
            .await
            .unwrap();
        let created = &response.invoice;

        assert_eq!(created.invoice_type, InvoiceType::Sale);
        assert_eq!(created.status, InvoiceStatus::Draft);
        assert!(created.invoice_number.ends_with("-000001"));
        // 10.5 × 62.30 = 654.15 ; IVA 13% = 85.0395 → 85.04
        assert_eq!(created.subtotal, dec!(654.15));
        assert_eq!(created.tax_amount, dec!(85.04));
        assert_eq!(created.total, dec!(739.19));
        assert_eq!(created.customer_tax_id.as_deref(), Some("1-2345-6789"));
        assert_eq!(
            created.customer_address.as_deref(),
            Some("Avenida Central, San José, San José, Costa Rica")
        );
        assert_eq!(created.due_date, Some(default_due_date(created.issue_date)));

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].description, "Oro 18k - 10.500 gramos");

        let duplicate = InvoiceService::create_from_transaction(&db, create_request(sale.id), dec!(13)).await;
        assert!(matches!(duplicate, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn purchase_invoice_uses_provider_tax_id() {
        let db = setup_db().await;
        let user = seed_user(&db, "cajero", dec!(0), dec!(0)).await;
        let provider = seed_provider(&db, "3-1010-0011").await;
        let purchase = TransactionService::purchase_from_provider(
            &db,
            user.id,
            PurchaseRequest {
                provider_id: provider.id,
                carat: 24,
                grams: dec!(2),
                price_per_gram: dec!(80),
                description: None,
            },
        )
        .await
        .unwrap();

        let mut request = create_request(purchase.id);
        request.tax_rate = Some(dec!(0));
        let response = InvoiceService::create_from_transaction(&db, request, dec!(13)).await.unwrap();

        assert_eq!(response.invoice.invoice_type, InvoiceType::Purchase);
        assert_eq!(response.invoice.customer_tax_id.as_deref(), Some("3-101-654321"));
        assert_eq!(response.invoice.total, dec!(160));
    }

    #[tokio::test]
    async fn account_trades_are_invoiced_without_tax_details() {
        let db = setup_db().await;
        seed_gold_price(&db, dec!(10), dec!(10)).await;
        let user = seed_user(&db, "ana", dec!(100), dec!(0)).await;
        let bought = TransactionService::buy_gold(&db, user.id, dec!(2)).await.unwrap();
        let sold = TransactionService::sell_gold(&db, user.id, dec!(1)).await.unwrap();

        let purchase = InvoiceService::create_from_transaction(&db, create_request(bought.id), dec!(13))
            .await
            .unwrap()
            .invoice;
        assert_eq!(purchase.invoice_type, InvoiceType::Purchase);
        assert_eq!(purchase.provider_id, None);
        assert_eq!(purchase.customer_tax_id, None);
        assert_eq!(purchase.customer_address, None);
        // 2 × 10 = 20 ; IVA 13% = 2.60
        assert_eq!(purchase.total, dec!(22.60));

        let sale = InvoiceService::create_from_transaction(&db, create_request(sold.id), dec!(13))
            .await
            .unwrap()
            .invoice;
        assert_eq!(sale.invoice_type, InvoiceType::Sale);
        assert_eq!(sale.client_id, None);
        assert_eq!(sale.customer_tax_id, None);
        assert!(sale.invoice_number.ends_with("-000002"));
    }

    #[tokio::test]
    async fn out_of_range_tax_rate_is_rejected() {
        let db = setup_db().await;
        let sale = completed_sale(&db).await;

        let mut request = create_request(sale.id);
        request.tax_rate = Some(dec!(101));
        let result = InvoiceService::create_from_transaction(&db, request, dec!(13)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn lifecycle_draft_issued_paid() {
        let db = setup_db().await;
        let sale = completed_sale(&db).await;
        let id = InvoiceService::create_from_transaction(&db, create_request(sale.id), dec!(13))
            .await
            .unwrap()
            .invoice
            .id;

        let issued = InvoiceService::issue(&db, id).await.unwrap();
        assert_eq!(issued.status, InvoiceStatus::Issued);
        assert!(matches!(InvoiceService::issue(&db, id).await, Err(AppError::InvalidState(_))));

        let paid = InvoiceService::pay(&db, id, Some("SINPE".into())).await.unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert!(paid.paid_date.is_some());
        assert_eq!(paid.payment_method.as_deref(), Some("SINPE"));

        assert!(matches!(InvoiceService::pay(&db, id, None).await, Err(AppError::InvalidState(_))));
        assert!(matches!(InvoiceService::cancel(&db, id, None).await, Err(AppError::InvalidState(_))));
        assert!(matches!(InvoiceService::delete(&db, id).await, Err(AppError::InvalidState(_))));

        let summary = InvoiceService::summary(&db).await.unwrap();
        assert_eq!(summary.paid_sales, dec!(739.19));
        assert_eq!(summary.pending_sales, dec!(0));
    }

    #[tokio::test]
    async fn cancel_appends_reason_and_update_recalculates() {
        let db = setup_db().await;
        let sale = completed_sale(&db).await;
        let created = InvoiceService::create_from_transaction(&db, create_request(sale.id), dec!(13))
            .await
            .unwrap()
            .invoice;

        let updated = InvoiceService::update(
            &db,
            created.id,
            UpdateInvoiceRequest {
                invoice_number: created.invoice_number.clone(),
                tax_rate: dec!(0),
                currency: "USD".into(),
                notes: Some("cliente frecuente".into()),
                legal_terms: None,
                customer_tax_id: created.customer_tax_id.clone(),
                customer_address: None,
                payment_method: None,
                due_date: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.invoice.tax_amount, dec!(0));
        assert_eq!(updated.invoice.total, dec!(654.15));

        let cancelled = InvoiceService::cancel(&db, created.id, Some("error de digitación".into()))
            .await
            .unwrap();
        assert_eq!(cancelled.status, InvoiceStatus::Cancelled);
        assert_eq!(
            cancelled.notes.as_deref(),
            Some("cliente frecuente\nCANCELLED: error de digitación")
        );

        InvoiceService::delete(&db, created.id).await.unwrap();
        assert!(matches!(InvoiceService::get(&db, created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn issued_invoice_past_due_shows_up_as_overdue() {
        let db = setup_db().await;
        let sale = completed_sale(&db).await;

        let mut request = create_request(sale.id);
        request.due_date = Some(Utc::now() - chrono::Duration::days(1));
        let id = InvoiceService::create_from_transaction(&db, request, dec!(13))
            .await
            .unwrap()
            .invoice
            .id;

        // DRAFT n'est jamais en retard
        assert!(InvoiceService::overdue(&db).await.unwrap().is_empty());

        InvoiceService::issue(&db, id).await.unwrap();
        let overdue = InvoiceService::by_status(&db, InvoiceStatus::Overdue).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert!(InvoiceService::get(&db, id).await.unwrap().overdue);
        assert_eq!(InvoiceService::summary(&db).await.unwrap().overdue_count, 1);
    }
}
