use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateInvoiceRequest, DateRangeQuery, PageParams, PayQuery, ReasonQuery, UpdateInvoiceRequest};
use crate::models::invoice::{InvoiceStatus, InvoiceType};
use crate::services::invoice_service::InvoiceService;

/// POST /invoices - facture d'une transaction COMPLETED
#[post("")]
pub async fn create_invoice(
    _auth: AuthUser,
    body: web::Json<CreateInvoiceRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let invoice = InvoiceService::create_from_transaction(&db, body.into_inner(), config.default_tax_rate).await?;
    Ok(HttpResponse::Created().json(invoice))
}

#[get("/number/{number}")]
pub async fn get_by_number(
    _auth: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let invoice = InvoiceService::get_by_number(&db, &path).await?;
    Ok(HttpResponse::Ok().json(invoice))
}

#[get("/client/{client_id}")]
pub async fn by_client(
    _auth: AuthUser,
    path: web::Path<i32>,
    params: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let page = InvoiceService::by_client(&db, path.into_inner(), &params).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/provider/{provider_id}")]
pub async fn by_provider(
    _auth: AuthUser,
    path: web::Path<i32>,
    params: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let page = InvoiceService::by_provider(&db, path.into_inner(), &params).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /invoices/status/{status} - OVERDUE = ISSUED échues
#[get("/status/{status}")]
pub async fn by_status(
    _auth: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let status: InvoiceStatus = path.parse()?;
    let invoices = InvoiceService::by_status(&db, status).await?;
    Ok(HttpResponse::Ok().json(invoices))
}

#[get("/type/{invoice_type}")]
pub async fn by_type(
    _auth: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let invoice_type: InvoiceType = path.parse()?;
    let invoices = InvoiceService::by_type(&db, invoice_type).await?;
    Ok(HttpResponse::Ok().json(invoices))
}

/// GET /invoices/date-range?startDate=&endDate=
#[get("/date-range")]
pub async fn by_date_range(
    _auth: AuthUser,
    query: web::Query<DateRangeQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let invoices = InvoiceService::by_date_range(&db, query.start_date, query.end_date).await?;
    Ok(HttpResponse::Ok().json(invoices))
}

#[get("/overdue")]
pub async fn overdue(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let invoices = InvoiceService::overdue(&db).await?;
    Ok(HttpResponse::Ok().json(invoices))
}

#[get("/summary")]
pub async fn summary(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let summary = InvoiceService::summary(&db).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/{id}")]
pub async fn get_invoice(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let invoice = InvoiceService::get(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(invoice))
}

/// PUT /invoices/{id} - interdit sur une facture PAID
#[put("/{id}")]
pub async fn update_invoice(
    _auth: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateInvoiceRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let invoice = InvoiceService::update(&db, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(invoice))
}

#[delete("/{id}")]
pub async fn delete_invoice(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    InvoiceService::delete(&db, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[put("/{id}/issue")]
pub async fn issue_invoice(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let invoice = InvoiceService::issue(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(invoice))
}

/// PUT /invoices/{id}/pay?paymentMethod=
#[put("/{id}/pay")]
pub async fn pay_invoice(
    _auth: AuthUser,
    path: web::Path<i32>,
    query: web::Query<PayQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let invoice = InvoiceService::pay(&db, path.into_inner(), query.into_inner().payment_method).await?;
    Ok(HttpResponse::Ok().json(invoice))
}

/// PUT /invoices/{id}/cancel?reason=
#[put("/{id}/cancel")]
pub async fn cancel_invoice(
    _auth: AuthUser,
    path: web::Path<i32>,
    query: web::Query<ReasonQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let invoice = InvoiceService::cancel(&db, path.into_inner(), query.into_inner().reason).await?;
    Ok(HttpResponse::Ok().json(invoice))
}

pub fn invoices_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/invoices")
            .service(create_invoice)
            .service(get_by_number)
            .service(by_client)
            .service(by_provider)
            .service(by_status)
            .service(by_type)
            .service(by_date_range)
            .service(overdue)
            .service(summary)
            .service(get_invoice)
            .service(update_invoice)
            .service(delete_invoice)
            .service(issue_invoice)
            .service(pay_invoice)
            .service(cancel_invoice)
    );
}
