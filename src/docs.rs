// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::common::pagination::{PageMeta, PageWindow};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Tenancy ---
        handlers::tenancy::create_tenant,
        handlers::tenancy::list_tenants,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::create_client,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::clients::list_contracts,
        handlers::clients::create_contract,
        handlers::clients::get_contract,
        handlers::clients::update_contract,
        handlers::clients::delete_contract,

        // --- Portfolios ---
        handlers::portfolios::list_portfolios,
        handlers::portfolios::create_portfolio,
        handlers::portfolios::get_portfolio,
        handlers::portfolios::update_portfolio,
        handlers::portfolios::delete_portfolio,

        // --- Debtors ---
        handlers::portfolios::list_debtors,
        handlers::portfolios::create_debtor,
        handlers::portfolios::get_debtor,
        handlers::portfolios::update_debtor,
        handlers::portfolios::delete_debtor,

        // --- Obligations ---
        handlers::portfolios::list_obligations,
        handlers::portfolios::create_obligation,
        handlers::portfolios::get_obligation,
        handlers::portfolios::update_obligation,
        handlers::portfolios::delete_obligation,

        // --- Collection ---
        handlers::collection::list_programs,
        handlers::collection::create_program,
        handlers::collection::get_program,
        handlers::collection::update_program,
        handlers::collection::delete_program,
        handlers::collection::list_assignments,
        handlers::collection::create_assignment,
        handlers::collection::get_assignment,
        handlers::collection::update_assignment,
        handlers::collection::delete_assignment,
        handlers::collection::list_managements,
        handlers::collection::create_management,
        handlers::collection::get_management,
        handlers::collection::update_management,
        handlers::collection::delete_management,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,
    ),
    components(
        schemas(
            // --- Paginação ---
            PageMeta,
            PageWindow,

            // --- Auth ---
            models::auth::User,
            models::auth::Group,
            models::auth::LoginUserPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::AuthResponse,
            models::auth::UserProfile,

            // --- Tenancy ---
            models::tenancy::Tenant,
            models::tenancy::CreateTenantPayload,

            // --- Clients ---
            models::client::Client,
            models::client::ClientPayload,
            models::client::Contract,
            models::client::ContractTerms,
            models::client::CreateContractPayload,

            // --- Portfolios ---
            models::portfolio::PortfolioStatus,
            models::portfolio::Portfolio,
            models::portfolio::PortfolioSummary,
            models::portfolio::PortfolioFields,
            models::portfolio::CreatePortfolioPayload,
            models::portfolio::Debtor,
            models::portfolio::DebtorPayload,
            models::portfolio::PortfolioType,
            models::portfolio::Obligation,
            models::portfolio::ObligationFields,
            models::portfolio::CreateObligationPayload,

            // --- Collection ---
            models::collection::Program,
            models::collection::ProgramPayload,
            models::collection::Assignment,
            models::collection::AssignmentPayload,
            models::collection::Management,
            models::collection::ManagementFields,
            models::collection::CreateManagementPayload,

            // --- Dashboard ---
            models::dashboard::DashboardStats,
            models::dashboard::TypeBreakdown,
            models::dashboard::AgentRanking,
            models::dashboard::ManagementStats,
            models::dashboard::UpcomingObligation,
            models::dashboard::MonthlyRecovery,
            models::dashboard::TypeBalance,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação"),
        (name = "Users", description = "Usuários e Perfil"),
        (name = "Tenancy", description = "Gestão de Tenants"),
        (name = "Clients", description = "Clientes e Contratos"),
        (name = "Portfolios", description = "Carteiras e seus Indicadores"),
        (name = "Debtors", description = "Devedores"),
        (name = "Obligations", description = "Obrigações (Dívidas)"),
        (name = "Collection", description = "Programas, Atribuições e Gestões"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
