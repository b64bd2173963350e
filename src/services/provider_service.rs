use chrono::Utc;
use sea_orm::*;

use crate::errors::{AppError, AppResult};
use crate::models::dto::{Page, PageParams, ProviderRequest};
use crate::models::party::{self, PartyFields, PartyType};
use crate::models::{providers, transaction};
use crate::services::pagination::{fetch_page, sorted};

pub struct ProviderService;

impl ProviderService {
    pub async fn create(db: &DatabaseConnection, request: ProviderRequest) -> AppResult<providers::Model> {
        let request = normalize(request);
        Self::validate(&request)?;

        if Self::find_by_cedula(db, &request.cedula).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Provider with cedula {} already exists",
                request.cedula
            )));
        }
        if let Some(email) = request.email.as_deref() {
            if Self::email_taken(db, email, None).await? {
                return Err(AppError::Conflict(format!("Provider with email {} already exists", email)));
            }
        }

        let now = Utc::now();
        let provider = providers::ActiveModel {
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            cedula: Set(request.cedula),
            email: Set(request.email),
            phone_number: Set(request.phone_number),
            address: Set(request.address),
            city: Set(request.city),
            province: Set(request.province),
            zip_code: Set(request.zip_code),
            provider_type: Set(request.provider_type.unwrap_or_default()),
            company_name: Set(request.company_name),
            tax_id: Set(request.tax_id),
            active: Set(true),
            notes: Set(request.notes),
            bank_account: Set(request.bank_account),
            bank_name: Set(request.bank_name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(provider_id = provider.id, cedula = %provider.cedula, "provider created");
        Ok(provider)
    }

    pub async fn update(db: &DatabaseConnection, id: i32, request: ProviderRequest) -> AppResult<providers::Model> {
        let existing = Self::get(db, id).await?;
        let request = normalize(request);
        Self::validate(&request)?;

        if existing.cedula != request.cedula && Self::find_by_cedula(db, &request.cedula).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Provider with cedula {} already exists",
                request.cedula
            )));
        }
        if let Some(email) = request.email.as_deref() {
            if Self::email_taken(db, email, Some(id)).await? {
                return Err(AppError::Conflict(format!("Provider with email {} already exists", email)));
            }
        }

        let mut active: providers::ActiveModel = existing.into();
        active.first_name = Set(request.first_name);
        active.last_name = Set(request.last_name);
        active.cedula = Set(request.cedula);
        active.email = Set(request.email);
        active.phone_number = Set(request.phone_number);
        active.address = Set(request.address);
        active.city = Set(request.city);
        active.province = Set(request.province);
        active.zip_code = Set(request.zip_code);
        active.provider_type = Set(request.provider_type.unwrap_or_default());
        active.company_name = Set(request.company_name);
        active.tax_id = Set(request.tax_id);
        active.bank_account = Set(request.bank_account);
        active.bank_name = Set(request.bank_name);
        active.notes = Set(request.notes);
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<providers::Model> {
        providers::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Provider not found: {}", id)))
    }

    /// Fournisseur existant et actif (contrepartie d'un achat)
    pub async fn get_active<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<providers::Model> {
        let provider = Self::get(db, id).await?;
        if !provider.active {
            return Err(AppError::validation(format!("Provider {} is inactive", id)));
        }
        Ok(provider)
    }

    pub async fn find_by_cedula(db: &DatabaseConnection, cedula: &str) -> AppResult<Option<providers::Model>> {
        Ok(providers::Entity::find()
            .filter(providers::Column::Cedula.eq(cedula.trim()))
            .one(db)
            .await?)
    }

    pub async fn list_active(db: &DatabaseConnection, params: &PageParams) -> AppResult<Page<providers::Model>> {
        let query = providers::Entity::find().filter(providers::Column::Active.eq(true));
        let query = sorted(query, params, sort_column, providers::Column::LastName);
        fetch_page(db, query, params).await
    }

    pub async fn search(db: &DatabaseConnection, term: &str, params: &PageParams) -> AppResult<Page<providers::Model>> {
        let term = term.trim();
        let query = providers::Entity::find()
            .filter(providers::Column::Active.eq(true))
            .filter(
                Condition::any()
                    .add(providers::Column::FirstName.contains(term))
                    .add(providers::Column::LastName.contains(term))
                    .add(providers::Column::Cedula.contains(term))
                    .add(providers::Column::Email.contains(term))
                    .add(providers::Column::CompanyName.contains(term)),
            );
        let query = sorted(query, params, sort_column, providers::Column::LastName);
        fetch_page(db, query, params).await
    }

    pub async fn list_by_type(db: &DatabaseConnection, provider_type: PartyType) -> AppResult<Vec<providers::Model>> {
        Ok(providers::Entity::find()
            .filter(providers::Column::ProviderType.eq(provider_type))
            .order_by_asc(providers::Column::LastName)
            .all(db)
            .await?)
    }

    pub async fn list_by_city(db: &DatabaseConnection, city: &str) -> AppResult<Vec<providers::Model>> {
        Ok(providers::Entity::find()
            .filter(providers::Column::City.eq(city))
            .order_by_asc(providers::Column::LastName)
            .all(db)
            .await?)
    }

    pub async fn list_by_province(db: &DatabaseConnection, province: &str) -> AppResult<Vec<providers::Model>> {
        Ok(providers::Entity::find()
            .filter(providers::Column::Province.eq(province))
            .order_by_asc(providers::Column::LastName)
            .all(db)
            .await?)
    }

    pub async fn set_active(db: &DatabaseConnection, id: i32, active: bool) -> AppResult<providers::Model> {
        let provider = Self::get(db, id).await?;
        let mut model: providers::ActiveModel = provider.into();
        model.active = Set(active);
        model.updated_at = Set(Utc::now());
        Ok(model.update(db).await?)
    }

    /// Suppression physique, refusée si le fournisseur a des transactions
    pub async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<()> {
        Self::get(db, id).await?;

        let linked = transaction::Entity::find()
            .filter(transaction::Column::ProviderId.eq(id))
            .count(db)
            .await?;
        if linked > 0 {
            return Err(AppError::Conflict(format!(
                "Provider {} has {} transactions, deactivate it instead",
                id, linked
            )));
        }

        providers::Entity::delete_by_id(id).exec(db).await?;
        Ok(())
    }

    fn validate(request: &ProviderRequest) -> AppResult<()> {
        party::validate_party(
            &PartyFields {
                first_name: &request.first_name,
                last_name: &request.last_name,
                cedula: &request.cedula,
                party_type: request.provider_type.unwrap_or_default(),
                company_name: request.company_name.as_deref(),
                tax_id: request.tax_id.as_deref(),
            },
            "providers",
        )
    }

    async fn email_taken(db: &DatabaseConnection, email: &str, except: Option<i32>) -> AppResult<bool> {
        let mut query = providers::Entity::find().filter(providers::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(providers::Column::Id.ne(id));
        }
        Ok(query.count(db).await? > 0)
    }
}

fn sort_column(name: &str) -> Option<providers::Column> {
    match name {
        "id" => Some(providers::Column::Id),
        "firstName" => Some(providers::Column::FirstName),
        "lastName" => Some(providers::Column::LastName),
        "cedula" => Some(providers::Column::Cedula),
        "companyName" => Some(providers::Column::CompanyName),
        "city" => Some(providers::Column::City),
        "createdAt" => Some(providers::Column::CreatedAt),
        _ => None,
    }
}

fn normalize(mut request: ProviderRequest) -> ProviderRequest {
    request.first_name = request.first_name.trim().to_string();
    request.last_name = request.last_name.trim().to_string();
    request.cedula = request.cedula.trim().to_string();
    request.email = party::non_blank(request.email);
    request.company_name = party::non_blank(request.company_name);
    request.tax_id = party::non_blank(request.tax_id);
    request
}
