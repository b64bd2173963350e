use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::AmountRequest;
use crate::services::user_service::UserService;

/// GET /account - solde et avoir en or
#[get("")]
pub async fn get_account(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let user = UserService::find_by_id(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// POST /account/deposit
#[post("/deposit")]
pub async fn deposit(
    auth_user: AuthUser,
    body: web::Json<AmountRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = UserService::deposit(&db, auth_user.user_id, body.amount).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// POST /account/withdraw - refusé si le solde est insuffisant
#[post("/withdraw")]
pub async fn withdraw(
    auth_user: AuthUser,
    body: web::Json<AmountRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = UserService::withdraw(&db, auth_user.user_id, body.amount).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub fn account_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/account")
            .service(get_account)
            .service(deposit)
            .service(withdraw)
    );
}
