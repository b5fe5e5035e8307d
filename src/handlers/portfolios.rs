// src/handlers/portfolios.rs

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
    models::portfolio::{
        CreateObligationPayload, CreatePortfolioPayload, Debtor, DebtorPayload, Obligation,
        ObligationFields, Portfolio, PortfolioFields, PortfolioSummary,
    },
    services::scope_service::EntityKind,
};

// =============================================================================
//  ÁREA 1: CARTEIRAS
// =============================================================================

// GET /api/portfolios
#[utoipa::path(
    get,
    path = "/api/portfolios",
    tag = "Portfolios",
    params(
        ("nombre" = Option<String>, Query, description = "Parte do nome da carteira"),
        ("estado" = Option<String>, Query, description = "active | inactive"),
        ("cliente_id" = Option<Uuid>, Query, description = "Cliente do contrato"),
        ("contrato_id" = Option<Uuid>, Query, description = "Contrato da carteira"),
        ("page" = Option<u32>, Query, description = "Página (1..)"),
        ("page_size" = Option<u32>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Carteiras com totais e inadimplência", body = Page<PortfolioSummary>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_portfolios(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.portfolio_service.list_portfolios(&actor, &params).await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/portfolios
#[utoipa::path(
    post,
    path = "/api/portfolios",
    tag = "Portfolios",
    request_body = CreatePortfolioPayload,
    responses(
        (status = 201, description = "Carteira criada", body = Portfolio),
        (status = 400, description = "Dados inválidos ou nome duplicado"),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_portfolio(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Json(payload): Json<CreatePortfolioPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let portfolio = app_state.portfolio_service.create_portfolio(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(portfolio)))
}

// GET /api/portfolios/{id}
#[utoipa::path(
    get,
    path = "/api/portfolios/{id}",
    tag = "Portfolios",
    params(("id" = Uuid, Path, description = "ID da carteira")),
    responses(
        (status = 200, description = "Carteira com totais", body = PortfolioSummary),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_portfolio(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let portfolio = app_state.portfolio_service.get_portfolio(&actor, id).await?;
    Ok((StatusCode::OK, Json(portfolio)))
}

// PUT /api/portfolios/{id}
#[utoipa::path(
    put,
    path = "/api/portfolios/{id}",
    tag = "Portfolios",
    params(("id" = Uuid, Path, description = "ID da carteira")),
    request_body = PortfolioFields,
    responses(
        (status = 200, description = "Carteira atualizada", body = Portfolio),
        (status = 400, description = "Dados inválidos ou nome duplicado"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_portfolio(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
    Json(fields): Json<PortfolioFields>,
) -> Result<impl IntoResponse, AppError> {
    fields.validate()?;
    let portfolio = app_state.portfolio_service.update_portfolio(&actor, id, &fields).await?;
    Ok((StatusCode::OK, Json(portfolio)))
}

// DELETE /api/portfolios/{id}
#[utoipa::path(
    delete,
    path = "/api/portfolios/{id}",
    tag = "Portfolios",
    params(("id" = Uuid, Path, description = "ID da carteira")),
    responses(
        (status = 204, description = "Carteira removida"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_portfolio(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.portfolio_service.delete(&actor, EntityKind::Portfolio, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: DEVEDORES
// =============================================================================

// GET /api/debtors
#[utoipa::path(
    get,
    path = "/api/debtors",
    tag = "Debtors",
    params(
        ("nombre" = Option<String>, Query, description = "Parte do nome"),
        ("identificacion" = Option<String>, Query, description = "Parte da identificação"),
        ("email" = Option<String>, Query, description = "Parte do e-mail"),
        ("cartera_id" = Option<Uuid>, Query, description = "Devedores com obrigações nesta carteira"),
        ("page" = Option<u32>, Query, description = "Página (1..)"),
        ("page_size" = Option<u32>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Devedores visíveis", body = Page<Debtor>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_debtors(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.portfolio_service.list_debtors(&actor, &params).await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/debtors
#[utoipa::path(
    post,
    path = "/api/debtors",
    tag = "Debtors",
    request_body = DebtorPayload,
    responses(
        (status = 201, description = "Devedor criado", body = Debtor),
        (status = 400, description = "Dados inválidos, identificação ou e-mail duplicados")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_debtor(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Json(payload): Json<DebtorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let debtor = app_state.portfolio_service.create_debtor(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(debtor)))
}

// GET /api/debtors/{id}
#[utoipa::path(
    get,
    path = "/api/debtors/{id}",
    tag = "Debtors",
    params(("id" = Uuid, Path, description = "ID do devedor")),
    responses(
        (status = 200, description = "Devedor", body = Debtor),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_debtor(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let debtor = app_state.portfolio_service.get_debtor(&actor, id).await?;
    Ok((StatusCode::OK, Json(debtor)))
}

// PUT /api/debtors/{id}
#[utoipa::path(
    put,
    path = "/api/debtors/{id}",
    tag = "Debtors",
    params(("id" = Uuid, Path, description = "ID do devedor")),
    request_body = DebtorPayload,
    responses(
        (status = 200, description = "Devedor atualizado", body = Debtor),
        (status = 400, description = "Dados inválidos, identificação ou e-mail duplicados"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_debtor(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DebtorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let debtor = app_state.portfolio_service.update_debtor(&actor, id, &payload).await?;
    Ok((StatusCode::OK, Json(debtor)))
}

// DELETE /api/debtors/{id}
#[utoipa::path(
    delete,
    path = "/api/debtors/{id}",
    tag = "Debtors",
    params(("id" = Uuid, Path, description = "ID do devedor")),
    responses(
        (status = 204, description = "Devedor removido"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_debtor(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.portfolio_service.delete(&actor, EntityKind::Debtor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 3: OBRIGAÇÕES
// =============================================================================

// GET /api/obligations
#[utoipa::path(
    get,
    path = "/api/obligations",
    tag = "Obligations",
    params(
        ("cartera_id" = Option<Uuid>, Query, description = "Carteira"),
        ("deudor" = Option<String>, Query, description = "Parte do nome do devedor"),
        ("tipo_cartera" = Option<String>, Query, description = "ADMINISTRATIVE | PRELEGAL | LEGAL"),
        ("estado" = Option<String>, Query, description = "Parte do estado"),
        ("vence_desde" = Option<String>, Query, description = "Vencimento a partir de (YYYY-MM-DD)"),
        ("vence_hasta" = Option<String>, Query, description = "Vencimento até (YYYY-MM-DD)"),
        ("page" = Option<u32>, Query, description = "Página (1..)"),
        ("page_size" = Option<u32>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Obrigações visíveis", body = Page<Obligation>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_obligations(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.portfolio_service.list_obligations(&actor, &params).await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/obligations
#[utoipa::path(
    post,
    path = "/api/obligations",
    tag = "Obligations",
    request_body = CreateObligationPayload,
    responses(
        (status = 201, description = "Obrigação criada", body = Obligation),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Carteira ou devedor não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_obligation(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Json(payload): Json<CreateObligationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let obligation = app_state.portfolio_service.create_obligation(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(obligation)))
}

// GET /api/obligations/{id}
#[utoipa::path(
    get,
    path = "/api/obligations/{id}",
    tag = "Obligations",
    params(("id" = Uuid, Path, description = "ID da obrigação")),
    responses(
        (status = 200, description = "Obrigação", body = Obligation),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_obligation(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let obligation = app_state.portfolio_service.get_obligation(&actor, id).await?;
    Ok((StatusCode::OK, Json(obligation)))
}

// PUT /api/obligations/{id}
#[utoipa::path(
    put,
    path = "/api/obligations/{id}",
    tag = "Obligations",
    params(("id" = Uuid, Path, description = "ID da obrigação")),
    request_body = ObligationFields,
    responses(
        (status = 200, description = "Obrigação atualizada", body = Obligation),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_obligation(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
    Json(fields): Json<ObligationFields>,
) -> Result<impl IntoResponse, AppError> {
    fields.validate()?;
    let obligation = app_state.portfolio_service.update_obligation(&actor, id, &fields).await?;
    Ok((StatusCode::OK, Json(obligation)))
}

// DELETE /api/obligations/{id}
#[utoipa::path(
    delete,
    path = "/api/obligations/{id}",
    tag = "Obligations",
    params(("id" = Uuid, Path, description = "ID da obrigação")),
    responses(
        (status = 204, description = "Obrigação removida"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_obligation(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.portfolio_service.delete(&actor, EntityKind::Obligation, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
