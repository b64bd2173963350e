use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{AdjustStockRequest, InventoryRequest, InventoryResponse, PageParams, StockCheckQuery};
use crate::services::inventory_service::InventoryService;

fn responses(items: Vec<crate::models::gold_inventory::Model>) -> Vec<InventoryResponse> {
    items.into_iter().map(InventoryResponse::from).collect()
}

/// GET /inventory - tous les carats (ordre croissant)
#[get("")]
pub async fn list_inventory(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let items = InventoryService::list(&db).await?;
    Ok(HttpResponse::Ok().json(responses(items)))
}

#[post("")]
pub async fn create_inventory(
    _auth: AuthUser,
    body: web::Json<InventoryRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let created = InventoryService::create(&db, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(InventoryResponse::from(created)))
}

#[get("/low-stock")]
pub async fn low_stock(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let items = InventoryService::low_stock(&db).await?;
    Ok(HttpResponse::Ok().json(responses(items)))
}

#[get("/over-stock")]
pub async fn over_stock(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let items = InventoryService::over_stock(&db).await?;
    Ok(HttpResponse::Ok().json(responses(items)))
}

#[get("/summary")]
pub async fn inventory_summary(_auth: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let summary = InventoryService::summary(&db).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// GET /inventory/movements - journal complet (paginé, plus récent d'abord)
#[get("/movements")]
pub async fn all_movements(
    _auth: AuthUser,
    params: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let page = InventoryService::all_movements(&db, &params).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/carat/{carat}")]
pub async fn get_by_carat(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let inventory = InventoryService::get_by_carat(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(InventoryResponse::from(inventory)))
}

/// GET /inventory/check-stock/{carat}?quantity=
#[get("/check-stock/{carat}")]
pub async fn check_stock(
    _auth: AuthUser,
    path: web::Path<i32>,
    query: web::Query<StockCheckQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let check = InventoryService::check_stock(&db, path.into_inner(), query.quantity).await?;
    Ok(HttpResponse::Ok().json(check))
}

#[get("/{id}")]
pub async fn get_inventory(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let inventory = InventoryService::get(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(InventoryResponse::from(inventory)))
}

#[put("/{id}")]
pub async fn update_inventory(
    _auth: AuthUser,
    path: web::Path<i32>,
    body: web::Json<InventoryRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let updated = InventoryService::update(&db, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(InventoryResponse::from(updated)))
}

#[delete("/{id}")]
pub async fn delete_inventory(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    InventoryService::delete(&db, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /inventory/{id}/adjust - inventaire physique
#[post("/{id}/adjust")]
pub async fn adjust_stock(
    _auth: AuthUser,
    path: web::Path<i32>,
    body: web::Json<AdjustStockRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let updated = InventoryService::adjust_stock(&db, path.into_inner(), body.new_quantity, &body.reason).await?;
    Ok(HttpResponse::Ok().json(InventoryResponse::from(updated)))
}

#[get("/{id}/movements")]
pub async fn movements(
    _auth: AuthUser,
    path: web::Path<i32>,
    params: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let page = InventoryService::movements(&db, path.into_inner(), &params).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub fn inventory_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/inventory")
            .service(list_inventory)
            .service(create_inventory)
            .service(low_stock)
            .service(over_stock)
            .service(inventory_summary)
            .service(all_movements)
            .service(get_by_carat)
            .service(check_stock)
            .service(get_inventory)
            .service(update_inventory)
            .service(delete_inventory)
            .service(adjust_stock)
            .service(movements)
    );
}
