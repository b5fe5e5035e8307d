// src/handlers/collection.rs

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
    models::collection::{
        Assignment, AssignmentPayload, CreateManagementPayload, Management, ManagementFields,
        Program, ProgramPayload,
    },
    services::scope_service::EntityKind,
};

// =============================================================================
//  ÁREA 1: PROGRAMAS
// =============================================================================

// GET /api/programs
#[utoipa::path(
    get,
    path = "/api/programs",
    tag = "Collection",
    params(
        ("titulo" = Option<String>, Query, description = "Parte do título"),
        ("page" = Option<u32>, Query, description = "Página (1..)"),
        ("page_size" = Option<u32>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Programas visíveis", body = Page<Program>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_programs(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.collection_service.list_programs(&actor, &params).await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/programs
#[utoipa::path(
    post,
    path = "/api/programs",
    tag = "Collection",
    request_body = ProgramPayload,
    responses(
        (status = 201, description = "Programa criado", body = Program),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Supervisor não encontrado no tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_program(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Json(payload): Json<ProgramPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let program = app_state.collection_service.create_program(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(program)))
}

// GET /api/programs/{id}
#[utoipa::path(
    get,
    path = "/api/programs/{id}",
    tag = "Collection",
    params(("id" = Uuid, Path, description = "ID do programa")),
    responses(
        (status = 200, description = "Programa", body = Program),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_program(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let program = app_state.collection_service.get_program(&actor, id).await?;
    Ok((StatusCode::OK, Json(program)))
}

// PUT /api/programs/{id}
#[utoipa::path(
    put,
    path = "/api/programs/{id}",
    tag = "Collection",
    params(("id" = Uuid, Path, description = "ID do programa")),
    request_body = ProgramPayload,
    responses(
        (status = 200, description = "Programa atualizado", body = Program),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_program(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProgramPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let program = app_state.collection_service.update_program(&actor, id, &payload).await?;
    Ok((StatusCode::OK, Json(program)))
}

// DELETE /api/programs/{id}
#[utoipa::path(
    delete,
    path = "/api/programs/{id}",
    tag = "Collection",
    params(("id" = Uuid, Path, description = "ID do programa")),
    responses(
        (status = 204, description = "Programa removido"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_program(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.collection_service.delete(&actor, EntityKind::Program, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: ATRIBUIÇÕES
// =============================================================================

// GET /api/assignments
#[utoipa::path(
    get,
    path = "/api/assignments",
    tag = "Collection",
    params(
        ("programa_id" = Option<Uuid>, Query, description = "Programa"),
        ("programa" = Option<String>, Query, description = "Parte do título do programa"),
        ("agente" = Option<String>, Query, description = "Parte do usuário do agente"),
        ("deudor" = Option<String>, Query, description = "Parte do nome do devedor"),
        ("page" = Option<u32>, Query, description = "Página (1..)"),
        ("page_size" = Option<u32>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Atribuições visíveis", body = Page<Assignment>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_assignments(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.collection_service.list_assignments(&actor, &params).await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/assignments
#[utoipa::path(
    post,
    path = "/api/assignments",
    tag = "Collection",
    request_body = AssignmentPayload,
    responses(
        (status = 201, description = "Atribuição criada", body = Assignment),
        (status = 400, description = "Usuário não é agente"),
        (status = 404, description = "Programa, devedor ou agente não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_assignment(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Json(payload): Json<AssignmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let assignment = app_state.collection_service.create_assignment(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

// GET /api/assignments/{id}
#[utoipa::path(
    get,
    path = "/api/assignments/{id}",
    tag = "Collection",
    params(("id" = Uuid, Path, description = "ID da atribuição")),
    responses(
        (status = 200, description = "Atribuição", body = Assignment),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_assignment(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = app_state.collection_service.get_assignment(&actor, id).await?;
    Ok((StatusCode::OK, Json(assignment)))
}

// PUT /api/assignments/{id}
#[utoipa::path(
    put,
    path = "/api/assignments/{id}",
    tag = "Collection",
    params(("id" = Uuid, Path, description = "ID da atribuição")),
    request_body = AssignmentPayload,
    responses(
        (status = 200, description = "Atribuição atualizada", body = Assignment),
        (status = 400, description = "Usuário não é agente"),
        (status = 403, description = "Atribuição de outro tenant"),
        (status = 404, description = "Atribuição, programa, devedor ou agente não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_assignment(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let assignment = app_state
        .collection_service
        .update_assignment(&actor, id, &payload)
        .await?;
    Ok((StatusCode::OK, Json(assignment)))
}

// DELETE /api/assignments/{id}
#[utoipa::path(
    delete,
    path = "/api/assignments/{id}",
    tag = "Collection",
    params(("id" = Uuid, Path, description = "ID da atribuição")),
    responses(
        (status = 204, description = "Atribuição removida"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_assignment(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.collection_service.delete(&actor, EntityKind::Assignment, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 3: GESTÕES
// =============================================================================

// GET /api/managements
#[utoipa::path(
    get,
    path = "/api/managements",
    tag = "Collection",
    params(
        ("asignacion_id" = Option<Uuid>, Query, description = "Atribuição"),
        ("accion" = Option<String>, Query, description = "Parte da ação"),
        ("contacto" = Option<String>, Query, description = "Parte do contato"),
        ("telefono" = Option<String>, Query, description = "Parte do telefone"),
        ("fecha" = Option<String>, Query, description = "Data do contato (YYYY-MM-DD)"),
        ("page" = Option<u32>, Query, description = "Página (1..)"),
        ("page_size" = Option<u32>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Gestões visíveis", body = Page<Management>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_managements(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.collection_service.list_managements(&actor, &params).await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/managements
// Qualquer usuário autenticado; o escopo da atribuição decide.
#[utoipa::path(
    post,
    path = "/api/managements",
    tag = "Collection",
    request_body = CreateManagementPayload,
    responses(
        (status = 201, description = "Gestão registrada", body = Management),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Atribuição não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_management(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CreateManagementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let management = app_state.collection_service.create_management(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(management)))
}

// GET /api/managements/{id}
#[utoipa::path(
    get,
    path = "/api/managements/{id}",
    tag = "Collection",
    params(("id" = Uuid, Path, description = "ID da gestão")),
    responses(
        (status = 200, description = "Gestão", body = Management),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_management(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let management = app_state.collection_service.get_management(&actor, id).await?;
    Ok((StatusCode::OK, Json(management)))
}

// PUT /api/managements/{id}
#[utoipa::path(
    put,
    path = "/api/managements/{id}",
    tag = "Collection",
    params(("id" = Uuid, Path, description = "ID da gestão")),
    request_body = ManagementFields,
    responses(
        (status = 200, description = "Gestão atualizada", body = Management),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_management(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(fields): Json<ManagementFields>,
) -> Result<impl IntoResponse, AppError> {
    fields.validate()?;
    let management = app_state.collection_service.update_management(&actor, id, &fields).await?;
    Ok((StatusCode::OK, Json(management)))
}

// DELETE /api/managements/{id}
#[utoipa::path(
    delete,
    path = "/api/managements/{id}",
    tag = "Collection",
    params(("id" = Uuid, Path, description = "ID da gestão")),
    responses(
        (status = 204, description = "Gestão removida"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_management(
    State(app_state): State<AppState>,
    RequireGroup(actor, _): RequireGroup<Staff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.collection_service.delete(&actor, EntityKind::Management, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
