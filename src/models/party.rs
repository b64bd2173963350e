// ============================================================================
// CONTREPARTIES (clients / fournisseurs)
// ============================================================================
//
// Description:
//   Éléments communs aux tables clients et providers : type de contrepartie,
//   validation de la cédula costaricienne, adresse complète pour les factures.
//
// Points d'attention:
//   - La cédula est la clé naturelle unique (format X-XXXX-XXXX ou 9 chiffres)
//   - Une contrepartie BUSINESS exige company_name ET tax_id
//   - Pas de suppression physique côté métier : active = false (soft delete)
//
// ============================================================================

use regex::Regex;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::errors::{AppError, AppResult};

static CEDULA_DASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d-\d{4}-\d{4}$").expect("valid cedula regex"));
static CEDULA_PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{9}$").expect("valid cedula regex"));

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyType {
    #[default]
    #[sea_orm(string_value = "INDIVIDUAL")]
    Individual,
    #[sea_orm(string_value = "BUSINESS")]
    Business,
}

impl std::str::FromStr for PartyType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INDIVIDUAL" => Ok(PartyType::Individual),
            "BUSINESS" => Ok(PartyType::Business),
            other => Err(AppError::validation(format!("Invalid type: {}", other))),
        }
    }
}

pub fn is_valid_cedula(cedula: &str) -> bool {
    CEDULA_DASHED.is_match(cedula) || CEDULA_PLAIN.is_match(cedula)
}

/// Champs soumis à validation pour un client ou un fournisseur
pub struct PartyFields<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub cedula: &'a str,
    pub party_type: PartyType,
    pub company_name: Option<&'a str>,
    pub tax_id: Option<&'a str>,
}

/// `label` = "clients" ou "providers" pour les messages d'erreur
pub fn validate_party(fields: &PartyFields<'_>, label: &str) -> AppResult<()> {
    if fields.first_name.trim().is_empty() {
        return Err(AppError::validation("First name is required"));
    }
    if fields.last_name.trim().is_empty() {
        return Err(AppError::validation("Last name is required"));
    }
    if fields.cedula.trim().is_empty() {
        return Err(AppError::validation("Cedula is required"));
    }
    if !is_valid_cedula(fields.cedula) {
        return Err(AppError::validation("Invalid Costa Rica cedula format"));
    }

    if fields.party_type == PartyType::Business {
        if is_blank(fields.company_name) {
            return Err(AppError::validation(format!(
                "Company name is required for business {}",
                label
            )));
        }
        if is_blank(fields.tax_id) {
            return Err(AppError::validation(format!(
                "Tax ID is required for business {}",
                label
            )));
        }
    }

    Ok(())
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// Trim ; une chaîne vide devient None
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// "adresse, ville, province, Costa Rica" (vide si aucune partie renseignée)
pub fn full_address(address: Option<&str>, city: Option<&str>, province: Option<&str>) -> String {
    let parts: Vec<&str> = [address, city, province]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        return String::new();
    }

    format!("{}, Costa Rica", parts.join(", "))
}

/// Pour la facture : tax_id si présent, sinon la cédula
pub fn invoice_tax_id(tax_id: Option<&str>, cedula: &str) -> String {
    match tax_id {
        Some(t) if !t.trim().is_empty() => t.to_string(),
        _ => cedula.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn individual<'a>(cedula: &'a str) -> PartyFields<'a> {
        PartyFields {
            first_name: "Ana",
            last_name: "Mora",
            cedula,
            party_type: PartyType::Individual,
            company_name: None,
            tax_id: None,
        }
    }

    #[test]
    fn accepts_both_cedula_formats() {
        assert!(is_valid_cedula("1-2345-6789"));
        assert!(is_valid_cedula("123456789"));
        assert!(!is_valid_cedula("12-345-6789"));
        assert!(!is_valid_cedula("12345678"));
        assert!(!is_valid_cedula("1-2345-678a"));
    }

    #[test]
    fn business_party_requires_company_and_tax_id() {
        let mut fields = individual("1-2345-6789");
        fields.party_type = PartyType::Business;
        fields.company_name = Some("Oro Fino S.A.");

        let err = validate_party(&fields, "clients").unwrap_err();
        assert_eq!(err.to_string(), "Tax ID is required for business clients");

        fields.tax_id = Some("3-101-123456");
        assert!(validate_party(&fields, "clients").is_ok());
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut fields = individual("123456789");
        fields.first_name = "  ";
        assert!(matches!(
            validate_party(&fields, "providers"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn full_address_skips_blank_parts() {
        assert_eq!(
            full_address(Some("Avenida 2"), Some(" "), Some("San José")),
            "Avenida 2, San José, Costa Rica"
        );
        assert_eq!(full_address(None, None, None), "");
    }

    #[test]
    fn invoice_tax_id_falls_back_to_cedula() {
        assert_eq!(invoice_tax_id(None, "1-2345-6789"), "1-2345-6789");
        assert_eq!(invoice_tax_id(Some(""), "1-2345-6789"), "1-2345-6789");
        assert_eq!(invoice_tax_id(Some("3-101-1"), "1-2345-6789"), "3-101-1");
    }
}
