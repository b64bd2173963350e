use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{ClientRequest, PageParams, SearchQuery};
use crate::models::party::PartyType;
use crate::services::client_service::ClientService;

/// GET /clients - clients actifs (paginé)
#[get("")]
pub async fn list_clients(
    _auth: AuthUser,
    params: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let page = ClientService::list_active(&db, &params).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("")]
pub async fn create_client(
    _auth: AuthUser,
    body: web::Json<ClientRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let client = ClientService::create(&db, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(client))
}

/// GET /clients/search?q= - nom, cédula, email ou entreprise
#[get("/search")]
pub async fn search_clients(
    _auth: AuthUser,
    query: web::Query<SearchQuery>,
    params: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let page = ClientService::search(&db, &query.q, &params).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/cedula/{cedula}")]
pub async fn get_client_by_cedula(
    _auth: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let cedula = path.into_inner();
    let client = ClientService::find_by_cedula(&db, &cedula)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Client not found with cedula: {}", cedula)))?;
    Ok(HttpResponse::Ok().json(client))
}

#[get("/type/{client_type}")]
pub async fn list_clients_by_type(
    _auth: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let client_type: PartyType = path.parse()?;
    let clients = ClientService::list_by_type(&db, client_type).await?;
    Ok(HttpResponse::Ok().json(clients))
}

#[get("/city/{city}")]
pub async fn list_clients_by_city(
    _auth: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let clients = ClientService::list_by_city(&db, &path).await?;
    Ok(HttpResponse::Ok().json(clients))
}

#[get("/province/{province}")]
pub async fn list_clients_by_province(
    _auth: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let clients = ClientService::list_by_province(&db, &path).await?;
    Ok(HttpResponse::Ok().json(clients))
}

#[get("/{id}")]
pub async fn get_client(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let client = ClientService::get(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(client))
}

#[put("/{id}")]
pub async fn update_client(
    _auth: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ClientRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let client = ClientService::update(&db, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(client))
}

/// DELETE /clients/{id} - refusé si des transactions référencent le client
#[delete("/{id}")]
pub async fn delete_client(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    ClientService::delete(&db, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[put("/{id}/activate")]
pub async fn activate_client(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let client = ClientService::set_active(&db, path.into_inner(), true).await?;
    Ok(HttpResponse::Ok().json(client))
}

#[put("/{id}/deactivate")]
pub async fn deactivate_client(
    _auth: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let client = ClientService::set_active(&db, path.into_inner(), false).await?;
    Ok(HttpResponse::Ok().json(client))
}

// Routes fixes avant /{id}
pub fn clients_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/clients")
            .service(list_clients)
            .service(create_client)
            .service(search_clients)
            .service(get_client_by_cedula)
            .service(list_clients_by_type)
            .service(list_clients_by_city)
            .service(list_clients_by_province)
            .service(get_client)
            .service(update_client)
            .service(delete_client)
            .service(activate_client)
            .service(deactivate_client)
    );
}
