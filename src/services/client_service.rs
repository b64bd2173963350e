use chrono::Utc;
use sea_orm::*;

use crate::errors::{AppError, AppResult};
use crate::models::clients;
use crate::models::dto::{ClientRequest, Page, PageParams};
use crate::models::party::{self, PartyFields, PartyType};
use crate::models::transaction;
use crate::services::pagination::{fetch_page, sorted};

pub struct ClientService;

impl ClientService {
    pub async fn create(db: &DatabaseConnection, request: ClientRequest) -> AppResult<clients::Model> {
        let request = normalize(request);
        Self::validate(&request)?;

        if Self::find_by_cedula(db, &request.cedula).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Client with cedula {} already exists",
                request.cedula
            )));
        }
        if let Some(email) = request.email.as_deref() {
            if Self::email_taken(db, email, None).await? {
                return Err(AppError::Conflict(format!("Client with email {} already exists", email)));
            }
        }

        let now = Utc::now();
        let client = clients::ActiveModel {
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            cedula: Set(request.cedula),
            email: Set(request.email),
            phone_number: Set(request.phone_number),
            address: Set(request.address),
            city: Set(request.city),
            province: Set(request.province),
            zip_code: Set(request.zip_code),
            client_type: Set(request.client_type.unwrap_or_default()),
            company_name: Set(request.company_name),
            tax_id: Set(request.tax_id),
            active: Set(true),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(client_id = client.id, cedula = %client.cedula, "client created");
        Ok(client)
    }

    pub async fn update(db: &DatabaseConnection, id: i32, request: ClientRequest) -> AppResult<clients::Model> {
        let existing = Self::get(db, id).await?;
        let request = normalize(request);
        Self::validate(&request)?;

        if existing.cedula != request.cedula && Self::find_by_cedula(db, &request.cedula).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Client with cedula {} already exists",
                request.cedula
            )));
        }
        if let Some(email) = request.email.as_deref() {
            if Self::email_taken(db, email, Some(id)).await? {
                return Err(AppError::Conflict(format!("Client with email {} already exists", email)));
            }
        }

        let mut active: clients::ActiveModel = existing.into();
        active.first_name = Set(request.first_name);
        active.last_name = Set(request.last_name);
        active.cedula = Set(request.cedula);
        active.email = Set(request.email);
        active.phone_number = Set(request.phone_number);
        active.address = Set(request.address);
        active.city = Set(request.city);
        active.province = Set(request.province);
        active.zip_code = Set(request.zip_code);
        active.client_type = Set(request.client_type.unwrap_or_default());
        active.company_name = Set(request.company_name);
        active.tax_id = Set(request.tax_id);
        active.notes = Set(request.notes);
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<clients::Model> {
        clients::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Client not found: {}", id)))
    }

    /// Client existant et actif (contrepartie d'une vente)
    pub async fn get_active<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<clients::Model> {
        let client = Self::get(db, id).await?;
        if !client.active {
            return Err(AppError::validation(format!("Client {} is inactive", id)));
        }
        Ok(client)
    }

    pub async fn find_by_cedula(db: &DatabaseConnection, cedula: &str) -> AppResult<Option<clients::Model>> {
        Ok(clients::Entity::find()
            .filter(clients::Column::Cedula.eq(cedula.trim()))
            .one(db)
            .await?)
    }

    /// Clients actifs, triés par nom par défaut
    pub async fn list_active(db: &DatabaseConnection, params: &PageParams) -> AppResult<Page<clients::Model>> {
        let query = clients::Entity::find().filter(clients::Column::Active.eq(true));
        let query = sorted(query, params, sort_column, clients::Column::LastName);
        fetch_page(db, query, params).await
    }

    /// Recherche sur nom, prénom, cédula, email et raison sociale
    pub async fn search(db: &DatabaseConnection, term: &str, params: &PageParams) -> AppResult<Page<clients::Model>> {
        let term = term.trim();
        let query = clients::Entity::find()
            .filter(clients::Column::Active.eq(true))
            .filter(
                Condition::any()
                    .add(clients::Column::FirstName.contains(term))
                    .add(clients::Column::LastName.contains(term))
                    .add(clients::Column::Cedula.contains(term))
                    .add(clients::Column::Email.contains(term))
                    .add(clients::Column::CompanyName.contains(term)),
            );
        let query = sorted(query, params, sort_column, clients::Column::LastName);
        fetch_page(db, query, params).await
    }

    pub async fn list_by_type(db: &DatabaseConnection, client_type: PartyType) -> AppResult<Vec<clients::Model>> {
        Ok(clients::Entity::find()
            .filter(clients::Column::ClientType.eq(client_type))
            .order_by_asc(clients::Column::LastName)
            .all(db)
            .await?)
    }

    pub async fn list_by_city(db: &DatabaseConnection, city: &str) -> AppResult<Vec<clients::Model>> {
        Ok(clients::Entity::find()
            .filter(clients::Column::City.eq(city))
            .order_by_asc(clients::Column::LastName)
            .all(db)
            .await?)
    }

    pub async fn list_by_province(db: &DatabaseConnection, province: &str) -> AppResult<Vec<clients::Model>> {
        Ok(clients::Entity::find()
            .filter(clients::Column::Province.eq(province))
            .order_by_asc(clients::Column::LastName)
            .all(db)
            .await?)
    }

    pub async fn set_active(db: &DatabaseConnection, id: i32, active: bool) -> AppResult<clients::Model> {
        let client = Self::get(db, id).await?;
        let mut model: clients::ActiveModel = client.into();
        model.active = Set(active);
        model.updated_at = Set(Utc::now());
        Ok(model.update(db).await?)
    }

    /// Suppression physique, refusée si le client a des transactions
    pub async fn delete(db: &DatabaseConnection, id: i32) -> AppResult<()> {
        Self::get(db, id).await?;

        let linked = transaction::Entity::find()
            .filter(transaction::Column::ClientId.eq(id))
            .count(db)
            .await?;
        if linked > 0 {
            return Err(AppError::Conflict(format!(
                "Client {} has {} transactions, deactivate it instead",
                id, linked
            )));
        }

        clients::Entity::delete_by_id(id).exec(db).await?;
        Ok(())
    }

    fn validate(request: &ClientRequest) -> AppResult<()> {
        party::validate_party(
            &PartyFields {
                first_name: &request.first_name,
                last_name: &request.last_name,
                cedula: &request.cedula,
                party_type: request.client_type.unwrap_or_default(),
                company_name: request.company_name.as_deref(),
                tax_id: request.tax_id.as_deref(),
            },
            "clients",
        )
    }

    async fn email_taken(db: &DatabaseConnection, email: &str, except: Option<i32>) -> AppResult<bool> {
        let mut query = clients::Entity::find().filter(clients::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(clients::Column::Id.ne(id));
        }
        Ok(query.count(db).await? > 0)
    }
}

fn sort_column(name: &str) -> Option<clients::Column> {
    match name {
        "id" => Some(clients::Column::Id),
        "firstName" => Some(clients::Column::FirstName),
        "lastName" => Some(clients::Column::LastName),
        "cedula" => Some(clients::Column::Cedula),
        "city" => Some(clients::Column::City),
        "province" => Some(clients::Column::Province),
        "createdAt" => Some(clients::Column::CreatedAt),
        _ => None,
    }
}

// trim + chaînes vides → None
fn normalize(mut request: ClientRequest) -> ClientRequest {
    request.first_name = request.first_name.trim().to_string();
    request.last_name = request.last_name.trim().to_string();
    request.cedula = request.cedula.trim().to_string();
    request.email = party::non_blank(request.email);
    request.company_name = party::non_blank(request.company_name);
    request.tax_id = party::non_blank(request.tax_id);
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_client, setup_db};

    fn request(cedula: &str) -> ClientRequest {
        ClientRequest {
            first_name: "Carlos".into(),
            last_name: "Vargas".into(),
            cedula: cedula.into(),
            email: Some("carlos@correo.cr".into()),
            phone_number: None,
            address: Some("Barrio Escalante".into()),
            city: Some("San José".into()),
            province: Some("San José".into()),
            zip_code: None,
            client_type: None,
            company_name: None,
            tax_id: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_to_individual_and_active() {
        let db = setup_db().await;
        let client = ClientService::create(&db, request("1-1111-1111")).await.unwrap();

        assert!(client.active);
        assert_eq!(client.client_type, PartyType::Individual);
        assert!(ClientService::find_by_cedula(&db, "1-1111-1111").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_cedula_or_email_is_rejected() {
        let db = setup_db().await;
        ClientService::create(&db, request("1-1111-1111")).await.unwrap();

        let same_cedula = ClientService::create(&db, request("1-1111-1111")).await;
        assert!(matches!(same_cedula, Err(AppError::Conflict(_))));

        let same_email = ClientService::create(&db, request("222222222")).await;
        assert!(matches!(same_email, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn invalid_cedula_is_a_validation_error() {
        let db = setup_db().await;
        let result = ClientService::create(&db, request("12-34")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn deactivated_clients_leave_the_active_listing() {
        let db = setup_db().await;
        let kept = seed_client(&db, "1-0000-0001").await;
        let hidden = seed_client(&db, "1-0000-0002").await;

        ClientService::set_active(&db, hidden.id, false).await.unwrap();

        let page = ClientService::list_active(&db, &PageParams::default()).await.unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].id, kept.id);

        assert!(matches!(
            ClientService::get_active(&db, hidden.id).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn search_matches_partial_names() {
        let db = setup_db().await;
        ClientService::create(&db, request("1-1111-1111")).await.unwrap();

        let page = ClientService::search(&db, "Varg", &PageParams::default()).await.unwrap();
        assert_eq!(page.total_elements, 1);

        let page = ClientService::search(&db, "Rojas", &PageParams::default()).await.unwrap();
        assert_eq!(page.total_elements, 0);
    }
}
