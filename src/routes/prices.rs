use actix_web::{get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{CaratPriceRequest, GoldPriceUpdateQuery};
use crate::services::carat_price_service::CaratPriceService;
use crate::services::gold_price_service::GoldPriceService;

/// GET /gold-prices/current - 404 si aucun prix actif
#[get("/current")]
pub async fn current_gold_price(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let price = GoldPriceService::require_current(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(price))
}

/// POST /gold-prices/update?buyPrice=&sellPrice=
#[post("/update")]
pub async fn update_gold_price(
    _auth: AuthUser,
    query: web::Query<GoldPriceUpdateQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let price = GoldPriceService::update(&db, query.buy_price, query.sell_price).await?;
    Ok(HttpResponse::Ok().json(price))
}

#[get("")]
pub async fn list_carat_prices(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let prices = CaratPriceService::list(&db).await?;
    Ok(HttpResponse::Ok().json(prices))
}

#[get("/{carat}")]
pub async fn get_carat_price(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let price = CaratPriceService::get(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(price))
}

#[put("/{carat}")]
pub async fn set_carat_price(
    _auth: AuthUser,
    path: web::Path<i32>,
    body: web::Json<CaratPriceRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let price = CaratPriceService::upsert(&db, path.into_inner(), body.price_per_gram).await?;
    Ok(HttpResponse::Ok().json(price))
}

pub fn prices_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/gold-prices")
            .service(current_gold_price)
            .service(update_gold_price)
    )
    .service(
        web::scope("/carat-prices")
            .service(list_carat_prices)
            .service(get_carat_price)
            .service(set_carat_price)
    );
}
