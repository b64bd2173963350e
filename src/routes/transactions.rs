use actix_web::{get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{AmountQuery, CaratTradeQuery, DateRangeQuery, PageParams, PurchaseRequest, ReasonQuery, SaleRequest};
use crate::services::transaction_service::TransactionService;

/// POST /transactions/buy?amount= - achat au prix courant
#[post("/buy")]
pub async fn buy_gold(
    auth_user: AuthUser,
    query: web::Query<AmountQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let transaction = TransactionService::buy_gold(&db, auth_user.user_id, query.amount).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

/// POST /transactions/sell?amount= - vente au prix courant
#[post("/sell")]
pub async fn sell_gold(
    auth_user: AuthUser,
    query: web::Query<AmountQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let transaction = TransactionService::sell_gold(&db, auth_user.user_id, query.amount).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

/// POST /transactions/purchase - achat à un fournisseur (entrée de stock)
#[post("/purchase")]
pub async fn purchase_from_provider(
    auth_user: AuthUser,
    body: web::Json<PurchaseRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let transaction = TransactionService::purchase_from_provider(&db, auth_user.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(transaction))
}

/// POST /transactions/sale - vente à un client (sortie de stock)
#[post("/sale")]
pub async fn sell_to_client(
    auth_user: AuthUser,
    body: web::Json<SaleRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let transaction = TransactionService::sell_to_client(&db, auth_user.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(transaction))
}

#[get("/history")]
pub async fn history(
    auth_user: AuthUser,
    params: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let page = TransactionService::history(&db, auth_user.user_id, &params).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /transactions/history/range?startDate=&endDate=
#[get("/history/range")]
pub async fn history_range(
    auth_user: AuthUser,
    query: web::Query<DateRangeQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let transactions =
        TransactionService::history_between(&db, auth_user.user_id, query.start_date, query.end_date).await?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[get("/{id}")]
pub async fn get_transaction(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let transaction = TransactionService::get_for_user(&db, auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

/// PUT /transactions/{id}/cancel?reason= - PENDING uniquement
#[put("/{id}/cancel")]
pub async fn cancel_transaction(
    auth_user: AuthUser,
    path: web::Path<i32>,
    query: web::Query<ReasonQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let reason = query.into_inner().reason;
    let transaction = TransactionService::cancel(&db, auth_user.user_id, path.into_inner(), reason).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

/// POST /carat-trade/buy?carat=&grams= - achat au prix du carat
#[post("/buy")]
pub async fn buy_by_carat(
    auth_user: AuthUser,
    query: web::Query<CaratTradeQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let transaction = TransactionService::buy_by_carat(&db, auth_user.user_id, query.carat, query.grams).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

/// POST /carat-trade/sell?carat=&grams=
#[post("/sell")]
pub async fn sell_by_carat(
    auth_user: AuthUser,
    query: web::Query<CaratTradeQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let transaction = TransactionService::sell_by_carat(&db, auth_user.user_id, query.carat, query.grams).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

pub fn transactions_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/transactions")
            .service(buy_gold)
            .service(sell_gold)
            .service(purchase_from_provider)
            .service(sell_to_client)
            .service(history)
            .service(history_range)
            .service(get_transaction)
            .service(cancel_transaction)
    )
    .service(
        web::scope("/carat-trade")
            .service(buy_by_carat)
            .service(sell_by_carat)
    );
}
