pub mod query;

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod portfolio_repo;
pub use portfolio_repo::PortfolioRepository;
pub mod collection_repo;
pub use collection_repo::CollectionRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;

pub mod guard_repo;
pub use guard_repo::GuardRepository;
pub mod scope_repo;
pub use scope_repo::ScopeRepository;
