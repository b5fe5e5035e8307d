pub mod auth;
pub mod client;
pub mod collection;
pub mod dashboard;
pub mod portfolio;
pub mod tenancy;
