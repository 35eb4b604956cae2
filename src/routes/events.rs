use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::{
    error::{api_error, ApiError},
    models::event::{Event, EventQuery},
    services::events::EventService,
    AppState,
};

/// GET /events?restaurant=...
pub async fn list_upcoming(
    State(state): State<AppState>,
    Query(params): Query<EventQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    EventService::upcoming(&state.db, params.restaurant.as_deref(), Utc::now())
        .await
        .map(Json)
        .map_err(api_error)
}
