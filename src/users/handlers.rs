use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{debug, error, instrument};

use crate::{error::ApiError, state::AppState};

use super::dto::{Pagination, UserListResponse};
use super::repo_types::User;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/", get(missing_id))
        .route("/users/:id", get(get_user))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    // an id that does not decode to UTF-8 cannot name a row
    let id = match path {
        Ok(Path(id)) => id,
        Err(rejection) => {
            debug!(%rejection, "undecodable user id");
            return Err(ApiError::NotFound);
        }
    };
    if id.is_empty() {
        return Err(ApiError::MissingId);
    }

    match state.users.get_user_by_id(&id).await {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => {
            debug!(%id, "user not found");
            Err(ApiError::NotFound)
        }
        Err(e) => {
            error!(error = ?e, %id, "get_user failed");
            Err(ApiError::Internal(e))
        }
    }
}

/// `GET /users/` matches no `:id` segment.
pub async fn missing_id() -> ApiError {
    ApiError::MissingId
}

/// Lists a page of users plus the table total. The two reads are independent,
/// so `total` can drift from `items` under concurrent writes.
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<UserListResponse>, ApiError> {
    let page = Pagination::from_query(&params);

    let items = state
        .users
        .list_users(page.limit, page.offset)
        .await
        .map_err(|e| {
            error!(error = ?e, limit = page.limit, offset = page.offset, "list_users failed");
            ApiError::Internal(e)
        })?;

    let total = state.users.count_users().await.map_err(|e| {
        error!(error = ?e, "count_users failed");
        ApiError::Internal(e)
    })?;

    Ok(Json(UserListResponse {
        items,
        limit: page.limit,
        offset: page.offset,
        total,
    }))
}
