use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::{api_error, ApiError},
    models::{
        auth::AuthenticatedUser,
        entry::{EntryQuery, MergedEntry},
    },
    services::entries::EntryService,
    AppState,
};

/// GET /me/entries?location=...&search=...&sort=recent|oldest|alphabetical|most_rated
pub async fn list_entries(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<EntryQuery>,
) -> Result<Json<Vec<MergedEntry>>, ApiError> {
    EntryService::list(&state.db, &user.user_id, &query)
        .await
        .map(Json)
        .map_err(api_error)
}
