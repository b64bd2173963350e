pub mod health;
pub mod auth;
pub mod account;
pub mod clients;
pub mod providers;
pub mod inventory;
pub mod prices;
pub mod transactions;
pub mod invoices;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(account::account_routes)
            .configure(clients::clients_routes)
            .configure(providers::providers_routes)
            .configure(inventory::inventory_routes)
            .configure(prices::prices_routes)
            .configure(transactions::transactions_routes)
            .configure(invoices::invoices_routes)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::test_support::setup_db;
    use actix_web::{http::StatusCode, test, App};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use std::str::FromStr;

    fn decimal(value: &Value) -> Decimal {
        Decimal::from_str(value.as_str().unwrap_or_default()).unwrap()
    }

    #[actix_web::test]
    async fn health_reports_database_up() {
        let db = setup_db().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(AppConfig::for_tests()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "up");
    }

    #[actix_web::test]
    async fn protected_routes_require_a_token() {
        let db = setup_db().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(AppConfig::for_tests()))
                .configure(configure_routes),
        )
        .await;

        for uri in ["/api/account", "/api/inventory", "/api/invoices/summary"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }

        let req = test::TestRequest::get()
            .uri("/api/account")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn register_login_and_move_cash() {
        let db = setup_db().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(AppConfig::for_tests()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({"username": "ana", "email": "Ana@Oro.cr", "password": "secreto1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        // doublon
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({"username": "ana", "email": "otra@oro.cr", "password": "secreto1"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        // connexion par email
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"username": "ana@oro.cr", "password": "secreto1"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["tokenType"], "Bearer");
        assert!(body["user"].get("passwordHash").is_none());
        let bearer = format!("Bearer {}", body["token"].as_str().unwrap());

        let req = test::TestRequest::post()
            .uri("/api/account/deposit")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({"amount": "100.50"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(decimal(&body["accountBalance"]), Decimal::from_str("100.50").unwrap());

        let req = test::TestRequest::post()
            .uri("/api/account/withdraw")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(json!({"amount": "150"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("Insufficient funds"));

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"username": "ana", "password": "wrong-pass"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn unknown_invoice_status_is_a_bad_request() {
        let db = setup_db().await;
        let config = AppConfig::for_tests();
        let token = crate::utils::jwt::generate_token(1, "ana", &config.jwt_secret, 1).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(config))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/invoices/status/LOST")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/invoices/status/overdue")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
