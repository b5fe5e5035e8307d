pub mod auth;
pub mod users;
pub mod tenancy;
pub mod clients;
pub mod portfolios;
pub mod collection;
pub mod dashboard;
