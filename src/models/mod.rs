// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table (PostgreSQL en production,
//   SQLite en mémoire pour les tests) avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - dto : Requêtes / réponses de l'API, pagination
//   - users : Utilisateurs (solde en argent + avoir en or)
//   - party : Éléments communs clients / fournisseurs (cédula, type)
//   - clients : Clients de la boutique
//   - providers : Fournisseurs d'or
//   - gold_inventory : Stock par carat (prix moyen pondéré)
//   - inventory_movement : Journal des entrées / sorties de stock
//   - transaction : Achats / ventes (machine d'états PENDING → terminal)
//   - invoice / invoice_item : Factures Costa Rica et leurs lignes
//   - gold_price : Prix de l'or (une seule ligne active)
//   - carat_price : Prix au gramme par carat
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Montants en Decimal échelle 2, grammes en échelle 6 (HALF_UP)
//   - Suppression d'une transaction → mouvements et facture supprimés (cascade)
//
// ============================================================================

pub mod health;
pub mod dto;
pub mod users;
pub mod party;
pub mod clients;
pub mod providers;
pub mod gold_inventory;
pub mod inventory_movement;
pub mod transaction;
pub mod invoice;
pub mod invoice_item;
pub mod gold_price;
pub mod carat_price;
