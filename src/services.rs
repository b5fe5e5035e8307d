pub mod auth;
pub mod user_service;
pub mod tenancy_service;
pub mod client_service;
pub mod portfolio_service;
pub mod collection_service;
pub mod dashboard_service;

// Núcleo transversal: escopo, filtros e guards.
pub mod scope_service;
pub mod filter_service;
pub mod guard_service;
