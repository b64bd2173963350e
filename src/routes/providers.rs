use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{ProviderRequest, PageParams, SearchQuery};
use crate::models::party::PartyType;
use crate::services::provider_service::ProviderService;

/// GET /providers - fournisseurs actifs (paginé)
#[get("")]
pub async fn list_providers(
    _auth: AuthUser,
    params: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let page = ProviderService::list_active(&db, &params).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("")]
pub async fn create_provider(
    _auth: AuthUser,
    body: web::Json<ProviderRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let provider = ProviderService::create(&db, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(provider))
}

/// GET /providers/search?q= - nom, cédula, email ou entreprise
#[get("/search")]
pub async fn search_providers(
    _auth: AuthUser,
    query: web::Query<SearchQuery>,
    params: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let page = ProviderService::search(&db, &query.q, &params).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/cedula/{cedula}")]
pub async fn get_provider_by_cedula(
    _auth: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let cedula = path.into_inner();
    let provider = ProviderService::find_by_cedula(&db, &cedula)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Provider not found with cedula: {}", cedula)))?;
    Ok(HttpResponse::Ok().json(provider))
}

#[get("/type/{provider_type}")]
pub async fn list_providers_by_type(
    _auth: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let provider_type: PartyType = path.parse()?;
    let providers = ProviderService::list_by_type(&db, provider_type).await?;
    Ok(HttpResponse::Ok().json(providers))
}

#[get("/city/{city}")]
pub async fn list_providers_by_city(
    _auth: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let providers = ProviderService::list_by_city(&db, &path).await?;
    Ok(HttpResponse::Ok().json(providers))
}

#[get("/province/{province}")]
pub async fn list_providers_by_province(
    _auth: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let providers = ProviderService::list_by_province(&db, &path).await?;
    Ok(HttpResponse::Ok().json(providers))
}

#[get("/{id}")]
pub async fn get_provider(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let provider = ProviderService::get(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(provider))
}

#[put("/{id}")]
pub async fn update_provider(
    _auth: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ProviderRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let provider = ProviderService::update(&db, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(provider))
}

/// DELETE /providers/{id} - refusé si des transactions référencent le fournisseur
#[delete("/{id}")]
pub async fn delete_provider(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    ProviderService::delete(&db, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[put("/{id}/activate")]
pub async fn activate_provider(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let provider = ProviderService::set_active(&db, path.into_inner(), true).await?;
    Ok(HttpResponse::Ok().json(provider))
}

#[put("/{id}/deactivate")]
pub async fn deactivate_provider(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let provider = ProviderService::set_active(&db, path.into_inner(), false).await?;
    Ok(HttpResponse::Ok().json(provider))
}

// Routes fixes avant /{id}
pub fn providers_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/providers")
            .service(list_providers)
            .service(create_provider)
            .service(search_providers)
            .service(get_provider_by_cedula)
            .service(list_providers_by_type)
            .service(list_providers_by_city)
            .service(list_providers_by_province)
            .service(get_provider)
            .service(update_provider)
            .service(delete_provider)
            .service(activate_provider)
            .service(deactivate_provider)
    );
}
