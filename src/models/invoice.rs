// ============================================================================
// MODÈLE : INVOICE (factura Costa Rica)
// ============================================================================
//
// Description:
//   Facture générée à partir d'une transaction COMPLETED.
//   SELL → SALE (client), BUY → PURCHASE (fournisseur).
//
// Numérotation:
//   YYYY-MM-NNNNNN, NNNNNN = nombre de factures du mois courant + 1
//
// Montants:
//   tax_amount = round2(subtotal * tax_rate / 100)
//   total      = subtotal + tax_amount
//
// Statuts:
//   DRAFT → ISSUED → PAID, CANCELLED depuis tout statut non PAID.
//   OVERDUE n'est jamais stocké : c'est une facture ISSUED dont due_date est
//   dépassée (voir `effective_status`).
//
// ============================================================================

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use crate::errors::{AppError, AppResult};
use crate::utils::money::{checked_add, checked_mul, money, with_scale};

pub const DEFAULT_CURRENCY: &str = "CRC";
pub const DEFAULT_PAYMENT_DAYS: i64 = 30;

pub const LEGAL_TERMS: &str = "Esta factura cumple con los requisitos establecidos por la Dirección General de Tributación de Costa Rica. \
IVA incluido según Ley del Impuesto General sobre las Ventas. \
Resolución DGT-R-48-2016 y sus reformas.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceType {
    #[sea_orm(string_value = "SALE")]
    Sale,
    #[sea_orm(string_value = "PURCHASE")]
    Purchase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "ISSUED")]
    Issued,
    #[sea_orm(string_value = "PAID")]
    Paid,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    #[sea_orm(string_value = "OVERDUE")]
    Overdue,
}

impl std::str::FromStr for InvoiceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SALE" => Ok(InvoiceType::Sale),
            "PURCHASE" => Ok(InvoiceType::Purchase),
            other => Err(AppError::validation(format!("Invalid invoice type: {}", other))),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(InvoiceStatus::Draft),
            "ISSUED" => Ok(InvoiceStatus::Issued),
            "PAID" => Ok(InvoiceStatus::Paid),
            "CANCELLED" => Ok(InvoiceStatus::Cancelled),
            "OVERDUE" => Ok(InvoiceStatus::Overdue),
            other => Err(AppError::validation(format!("Invalid invoice status: {}", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub client_id: Option<i32>,
    pub provider_id: Option<i32>,
    #[sea_orm(unique)]
    pub transaction_id: i32, // une seule facture par transaction
    pub invoice_type: InvoiceType,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub currency: String,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub legal_terms: Option<String>,
    pub customer_tax_id: Option<String>,
    pub customer_address: Option<String>,
    pub payment_method: Option<String>,
    pub issue_date: DateTimeUtc,
    pub due_date: Option<DateTimeUtc>,
    pub paid_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::providers::Entity",
        from = "Column::ProviderId",
        to = "super::providers::Column::Id"
    )]
    Provider,
    #[sea_orm(
        belongs_to = "super::transaction::Entity",
        from = "Column::TransactionId",
        to = "super::transaction::Column::Id",
        on_delete = "Cascade"
    )]
    Transaction,
    #[sea_orm(has_many = "super::invoice_item::Entity")]
    InvoiceItem,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::providers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Provider.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::invoice_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == InvoiceStatus::Issued
            && self.due_date.map(|due| due < now).unwrap_or(false)
    }

    /// Statut affiché : ISSUED échue → OVERDUE
    pub fn effective_status(&self, now: DateTime<Utc>) -> InvoiceStatus {
        if self.is_overdue(now) {
            InvoiceStatus::Overdue
        } else {
            self.status
        }
    }
}

/// (tax_amount, total) pour un sous-total et un taux en pourcentage
pub fn compute_totals(subtotal: Decimal, tax_rate: Decimal) -> AppResult<(Decimal, Decimal)> {
    let subtotal = money(subtotal);
    let tax_amount = money(checked_mul(subtotal, tax_rate)? / Decimal::ONE_HUNDRED);
    Ok((tax_amount, money(checked_add(subtotal, tax_amount)?)))
}

pub fn validate_tax_rate(tax_rate: Decimal) -> AppResult<()> {
    if tax_rate < Decimal::ZERO || tax_rate > Decimal::ONE_HUNDRED {
        return Err(AppError::validation("Tax rate must be between 0 and 100"));
    }
    Ok(())
}

/// Format YYYY-MM-NNNNNN
pub fn format_invoice_number(date: DateTime<Utc>, sequence: u64) -> String {
    format!("{}-{:02}-{:06}", date.year(), date.month(), sequence)
}

/// Bornes [début, fin) du mois de `date`
pub fn month_bounds(date: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date
        .date_naive()
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .unwrap_or(date);

    let (year, month) = if start.month() == 12 {
        (start.year() + 1, 1)
    } else {
        (start.year(), start.month() + 1)
    };
    let end = start
        .with_year(year)
        .and_then(|d| d.with_month(month))
        .unwrap_or(start + Duration::days(31));

    (start, end)
}

pub fn default_due_date(issue_date: DateTime<Utc>) -> DateTime<Utc> {
    issue_date + Duration::days(DEFAULT_PAYMENT_DAYS)
}

/// "Oro 18k - 10.500 gramos"
pub fn item_description(carat: Option<i32>, grams: Decimal) -> String {
    let grams = with_scale(grams, 3);
    match carat {
        Some(carat) => format!("Oro {}k - {} gramos", carat, grams),
        None => format!("Oro - {} gramos", grams),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn totals_follow_tax_rate() {
        let (tax, total) = compute_totals(dec!(600.00), dec!(13)).unwrap();
        assert_eq!(tax, dec!(78.00));
        assert_eq!(total, dec!(678.00));

        let (tax, total) = compute_totals(dec!(10.05), dec!(13)).unwrap();
        // 1.3065 → 1.31
        assert_eq!(tax, dec!(1.31));
        assert_eq!(total, dec!(11.36));
    }

    #[test]
    fn total_equals_rounded_gross() {
        for (subtotal, rate) in [
            (dec!(123.45), dec!(13)),
            (dec!(0.01), dec!(50)),
            (dec!(999.99), dec!(7.5)),
            (dec!(1000), dec!(0)),
        ] {
            let (_, total) = compute_totals(subtotal, rate).unwrap();
            let gross = money(subtotal * (Decimal::ONE + rate / Decimal::ONE_HUNDRED));
            assert_eq!(total, gross);
        }
    }

    #[test]
    fn totals_overflow_is_rejected() {
        let err = compute_totals(Decimal::MAX, dec!(13)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn tax_rate_bounds() {
        assert!(validate_tax_rate(dec!(0)).is_ok());
        assert!(validate_tax_rate(dec!(100)).is_ok());
        assert!(validate_tax_rate(dec!(-0.01)).is_err());
        assert!(validate_tax_rate(dec!(100.01)).is_err());
    }

    #[test]
    fn invoice_number_format() {
        let date = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        assert_eq!(format_invoice_number(date, 1), "2024-03-000001");
        assert_eq!(format_invoice_number(date, 42), "2024-03-000042");
    }

    #[test]
    fn month_bounds_wrap_december() {
        let date = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
        let (start, end) = month_bounds(date);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn item_description_uses_three_decimals() {
        assert_eq!(item_description(Some(18), dec!(10.5)), "Oro 18k - 10.500 gramos");
        assert_eq!(item_description(None, dec!(2)), "Oro - 2.000 gramos");
    }

    #[test]
    fn issued_invoice_past_due_is_overdue() {
        let now = Utc::now();
        let mut invoice = Model {
            id: 1,
            invoice_number: "2024-01-000001".into(),
            client_id: Some(1),
            provider_id: None,
            transaction_id: 1,
            invoice_type: InvoiceType::Sale,
            subtotal: dec!(100),
            tax_rate: dec!(13),
            tax_amount: dec!(13),
            total: dec!(113),
            currency: DEFAULT_CURRENCY.into(),
            status: InvoiceStatus::Issued,
            notes: None,
            legal_terms: None,
            customer_tax_id: None,
            customer_address: None,
            payment_method: None,
            issue_date: now - Duration::days(40),
            due_date: Some(now - Duration::days(10)),
            paid_date: None,
        };
        assert_eq!(invoice.effective_status(now), InvoiceStatus::Overdue);

        invoice.status = InvoiceStatus::Draft;
        assert_eq!(invoice.effective_status(now), InvoiceStatus::Draft);
    }
}
