use axum::{extract::State, http::StatusCode, Json};
use chrono::Local;
use serde_json::json;

use crate::{
    error::{api_error, ApiError},
    middleware::admin::AdminAuth,
    models::sync::{SyncKind, SyncReport, SyncRequest},
    services::sync::SyncService,
    AppState,
};

pub fn parse_kind(req: &SyncRequest, default_days: u32) -> Result<SyncKind, String> {
    match req.kind.as_str() {
        "daily" => Ok(SyncKind::Daily),
        "weekly" => SyncKind::weekly(req.days.unwrap_or(default_days)).map_err(|e| e.to_string()),
        other => Err(format!("Unknown sync kind: {other}")),
    }
}

/// POST /admin/sync: run one menu sync pass now.
pub async fn trigger_sync(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Json(body): Json<SyncRequest>,
) -> Result<Json<SyncReport>, ApiError> {
    let kind = parse_kind(&body, state.config.sync_weekly_days)
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e }))))?;
    let start = body.date.unwrap_or_else(|| Local::now().date_naive());
    let restaurants = body
        .restaurants
        .clone()
        .unwrap_or_else(|| state.config.sync_restaurants.clone());

    SyncService::run(&state.db, &state.menu_source, kind, start, &restaurants)
        .await
        .map(Json)
        .map_err(api_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(kind: &str, days: Option<u32>) -> SyncRequest {
        SyncRequest {
            kind: kind.into(),
            date: None,
            days,
            restaurants: None,
        }
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind(&req("daily", None), 7), Ok(SyncKind::Daily));
        assert_eq!(parse_kind(&req("weekly", None), 7), Ok(SyncKind::Weekly { days: 7 }));
        assert_eq!(parse_kind(&req("weekly", Some(3)), 7), Ok(SyncKind::Weekly { days: 3 }));
        assert!(parse_kind(&req("weekly", Some(0)), 7).is_err());
        assert!(parse_kind(&req("weekly", Some(90)), 7).is_err());
        assert!(parse_kind(&req("hourly", None), 7).is_err());
    }
}
