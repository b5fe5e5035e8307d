// src/handlers/clients.rs

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Page},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireGroup, Staff},
    },
    models::client::{Client, ClientPayload, Contract, ContractTerms, CreateContractPayload},
    services::scope_service::EntityKind,
};

// =============================================================================
//  ÁREA 1: CLIENTES
// =============================================================================

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    params(
        ("nombre" = Option<String>, Query, description = "Parte do nome do cliente"),
        ("page" = Option<u32>, Query, description = "Página (1..)"),
        ("page_size" = Option<u32>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Clientes visíveis", body = Page<Client>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.client_service.list_clients(&actor, &params).await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = ClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos ou nome duplicado"),
        (status = 403, description = "Sem permissão ou sem tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let client = app_state.client_service.create_client(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Client),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state.client_service.get_client(&actor, id).await?;
    Ok((StatusCode::OK, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = ClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 400, description = "Dados inválidos ou nome duplicado"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let client = app_state.client_service.update_client(&actor, id, &payload).await?;
    Ok((StatusCode::OK, Json(client)))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente removido"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.client_service.delete(&actor, EntityKind::Client, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: CONTRATOS
// =============================================================================

// GET /api/contracts
#[utoipa::path(
    get,
    path = "/api/contracts",
    tag = "Clients",
    params(
        ("cliente_id" = Option<Uuid>, Query, description = "Cliente do contrato"),
        ("fecha_inicio" = Option<String>, Query, description = "Início a partir de (YYYY-MM-DD)"),
        ("fecha_fin" = Option<String>, Query, description = "Fim até (YYYY-MM-DD)"),
        ("page" = Option<u32>, Query, description = "Página (1..)"),
        ("page_size" = Option<u32>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Contratos visíveis", body = Page<Contract>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contracts(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.client_service.list_contracts(&actor, &params).await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/contracts
#[utoipa::path(
    post,
    path = "/api/contracts",
    tag = "Clients",
    request_body = CreateContractPayload,
    responses(
        (status = 201, description = "Contrato criado", body = Contract),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Json(payload): Json<CreateContractPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let contract = app_state.client_service.create_contract(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

// GET /api/contracts/{id}
#[utoipa::path(
    get,
    path = "/api/contracts/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do contrato")),
    responses(
        (status = 200, description = "Contrato", body = Contract),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_contract(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let contract = app_state.client_service.get_contract(&actor, id).await?;
    Ok((StatusCode::OK, Json(contract)))
}

// PUT /api/contracts/{id}
#[utoipa::path(
    put,
    path = "/api/contracts/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do contrato")),
    request_body = ContractTerms,
    responses(
        (status = 200, description = "Contrato atualizado", body = Contract),
        (status = 400, description = "Datas inválidas"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contract(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
    Json(terms): Json<ContractTerms>,
) -> Result<impl IntoResponse, AppError> {
    terms.validate()?;
    let contract = app_state.client_service.update_contract(&actor, id, &terms).await?;
    Ok((StatusCode::OK, Json(contract)))
}

// DELETE /api/contracts/{id}
#[utoipa::path(
    delete,
    path = "/api/contracts/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do contrato")),
    responses(
        (status = 204, description = "Contrato removido"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contract(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.client_service.delete(&actor, EntityKind::Contract, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
