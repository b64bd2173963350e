use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest, HttpResponse};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::utils::jwt;

/// Utilisateur authentifié (extrait du JWT).
/// À mettre en paramètre d'un handler pour protéger la route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

fn unauthorized(message: impl Into<String>) -> Error {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({
        "error": message.into()
    }));
    actix_web::error::InternalError::from_response("", response).into()
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, Error> {
    // 1. Secret JWT depuis la config de l'application
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Missing application config"))?;

    // 2. Header Authorization
    let auth_header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    // 3. Format "Bearer <token>"
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid Authorization format (expected: Bearer <token>)"))?;

    // 4. Signature + expiration
    let claims = jwt::verify_token(token, &config.jwt_secret).map_err(unauthorized)?;

    Ok(AuthUser {
        user_id: claims.sub,
        username: claims.username,
    })
}
