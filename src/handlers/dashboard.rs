// src/handlers/dashboard.rs

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::dashboard::DashboardStats,
    services::filter_service::{parse_date, today},
};

// Data de referência: `fecha` quando válida, senão hoje.
fn reference_date(params: &HashMap<String, String>) -> NaiveDate {
    params
        .get("fecha")
        .and_then(|raw| parse_date(raw.trim()))
        .unwrap_or_else(today)
}

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    params(
        ("fecha" = Option<String>, Query, description = "Data de referência (YYYY-MM-DD); padrão hoje"),
        ("tenant_id" = Option<Uuid>, Query, description = "Outro tenant (apenas superusuários)")
    ),
    responses(
        (status = 200, description = "Indicadores do tenant", body = DashboardStats),
        (status = 401, description = "Não autorizado"),
        (status = 404, description = "Tenant não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let as_of = reference_date(&params);
    let requested = params
        .get("tenant_id")
        .and_then(|raw| raw.trim().parse::<Uuid>().ok());

    let stats = app_state
        .dashboard_service
        .stats_for(&actor, requested, as_of)
        .await?;

    Ok((StatusCode::OK, Json(stats)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_reference_date_is_used() {
        let params = HashMap::from([("fecha".to_string(), "2024-03-15".to_string())]);
        assert_eq!(reference_date(&params), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn malformed_reference_date_falls_back_to_today() {
        let params = HashMap::from([("fecha".to_string(), "15/03/2024".to_string())]);
        let before = today();
        let got = reference_date(&params);
        // Tolera a virada do dia entre as duas leituras do relógio.
        assert!(got == before || got == before.succ_opt().unwrap());
    }
}
