use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::*;

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::models::dto::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest};
use crate::models::users;
use crate::utils::money::{checked_add, grams, money};
use crate::utils::{jwt, password};

pub struct UserService;

impl UserService {
    /// Crée un compte (username et email uniques), solde et avoir à zéro
    pub async fn register(
        db: &DatabaseConnection,
        config: &AppConfig,
        request: RegisterRequest,
    ) -> AppResult<AuthResponse> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_lowercase();

        if Self::find_by_username(db, &username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        let email_taken = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(db)
            .await?
            .is_some();
        if email_taken {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password_hash = password::hash_password(&request.password).map_err(AppError::Internal)?;

        let user = users::ActiveModel {
            username: Set(username),
            email: Set(email),
            password_hash: Set(password_hash),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            account_balance: Set(money(Decimal::ZERO)),
            gold_holdings: Set(grams(Decimal::ZERO)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Self::auth_response(config, user)
    }

    /// Connexion par username ou email
    pub async fn login(
        db: &DatabaseConnection,
        config: &AppConfig,
        request: LoginRequest,
    ) -> AppResult<AuthResponse> {
        let identifier = request.username.trim();
        let user = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(identifier))
                    .add(users::Column::Email.eq(identifier.to_lowercase())),
            )
            .one(db)
            .await?;

        let invalid = || AppError::Unauthorized("Invalid username or password".to_string());
        let user = user.ok_or_else(invalid)?;

        let valid = password::verify_password(&request.password, &user.password_hash).unwrap_or(false);
        if !valid {
            tracing::warn!(username = %identifier, "failed login attempt");
            return Err(invalid());
        }

        Self::auth_response(config, user)
    }

    pub async fn change_password(
        db: &DatabaseConnection,
        user_id: i32,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        let user = Self::find_by_id(db, user_id).await?;

        let valid = password::verify_password(&request.current_password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(AppError::Unauthorized("Current password is incorrect".to_string()));
        }

        let password_hash = password::hash_password(&request.new_password).map_err(AppError::Internal)?;
        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.update(db).await?;
        Ok(())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User not found: {}", user_id)))
    }

    pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await?)
    }

    /// Ajoute `delta` (positif ou négatif) au solde ; refuse un solde négatif
    pub async fn adjust_balance<C: ConnectionTrait>(
        db: &C,
        user: users::Model,
        delta: Decimal,
    ) -> AppResult<users::Model> {
        let new_balance = money(checked_add(user.account_balance, delta)?);
        if new_balance < Decimal::ZERO {
            return Err(AppError::InsufficientFunds(format!(
                "Insufficient funds. Balance: {}, required: {}",
                user.account_balance,
                money(-delta)
            )));
        }

        let mut active: users::ActiveModel = user.into();
        active.account_balance = Set(new_balance);
        Ok(active.update(db).await?)
    }

    /// Ajoute `delta` grammes à l'avoir en or ; refuse un avoir négatif
    pub async fn adjust_holdings<C: ConnectionTrait>(
        db: &C,
        user: users::Model,
        delta: Decimal,
    ) -> AppResult<users::Model> {
        let new_holdings = grams(checked_add(user.gold_holdings, delta)?);
        if new_holdings < Decimal::ZERO {
            return Err(AppError::InsufficientHoldings(format!(
                "Insufficient gold holdings. Available: {}, requested: {}",
                user.gold_holdings,
                grams(-delta)
            )));
        }

        let mut active: users::ActiveModel = user.into();
        active.gold_holdings = Set(new_holdings);
        Ok(active.update(db).await?)
    }

    pub async fn deposit(db: &DatabaseConnection, user_id: i32, amount: Decimal) -> AppResult<users::Model> {
        Self::ensure_positive(amount)?;

        let txn = db.begin().await?;
        let user = Self::find_by_id(&txn, user_id).await?;
        let user = Self::adjust_balance(&txn, user, amount).await?;
        txn.commit().await?;

        tracing::info!(user_id, %amount, "deposit");
        Ok(user)
    }

    pub async fn withdraw(db: &DatabaseConnection, user_id: i32, amount: Decimal) -> AppResult<users::Model> {
        Self::ensure_positive(amount)?;

        let txn = db.begin().await?;
        let user = Self::find_by_id(&txn, user_id).await?;
        let user = Self::adjust_balance(&txn, user, -amount).await?;
        txn.commit().await?;

        tracing::info!(user_id, %amount, "withdrawal");
        Ok(user)
    }

    fn ensure_positive(amount: Decimal) -> AppResult<()> {
        if amount <= Decimal::ZERO {
            return Err(AppError::validation("Amount must be positive"));
        }
        Ok(())
    }

    fn auth_response(config: &AppConfig, user: users::Model) -> AppResult<AuthResponse> {
        let token = jwt::generate_token(user.id, &user.username, &config.jwt_secret, config.jwt_ttl_hours)
            .map_err(AppError::Internal)?;

        Ok(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            user,
        })
    }
}
