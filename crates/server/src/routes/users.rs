use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use common::types::ApiResponse;
use models::{User, UserInput};
use service::{
    pagination::{PageMeta, PageRequest},
    query::{SortField, SortOrder, UserQuery},
};

use crate::errors::ApiError;
use crate::state::AppState;

pub const MSG_CREATED: &str = "User created successfully";
pub const MSG_UPDATED: &str = "User updated successfully";
pub const MSG_DELETED: &str = "User deleted successfully";

/// Raw query string of `GET /api/users`; numbers are parsed leniently.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok()).filter(|n| *n >= 1)
}

impl From<ListParams> for UserQuery {
    fn from(p: ListParams) -> Self {
        UserQuery {
            page: PageRequest { page: parse_positive(p.page.as_deref()), limit: parse_positive(p.limit.as_deref()) },
            sort_by: SortField::parse_lenient(p.sort_by.as_deref()),
            order: SortOrder::parse_lenient(p.order.as_deref()),
            search: p.search.unwrap_or_default(),
        }
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<User>, PageMeta>>, ApiError> {
    let Query(params) = params?;
    let page = state.users.list(&UserQuery::from(params)).await?;
    Ok(Json(ApiResponse::paginated(page.items, page.meta)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users.get(&id).await?;
    Ok(Json(ApiResponse::data(user)))
}

pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<UserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let Json(input) = body?;
    let user = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::with_message(user, MSG_CREATED))))
}

/// Unknown ids answer 404 before the body is even looked at.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    // an unparsable body still has to lose to a missing id
    let input = match body {
        Ok(Json(input)) => input,
        Err(rejection) => {
            state.users.get(&id).await?;
            return Err(rejection.into());
        }
    };
    let user = state.users.update(&id, input).await?;
    Ok(Json(ApiResponse::with_message(user, MSG_UPDATED)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users.delete(&id).await?;
    Ok(Json(ApiResponse::with_message(user, MSG_DELETED)))
}
