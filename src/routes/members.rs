use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::members::{JoinRequest, UpdateMemberRequest},
    error::AppResult,
    middleware::{auth::AuthMember, json::ValidJson},
    models::MemberInfo,
    response::ApiResponse,
    services::member_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/join", post(join))
        .route("/member", get(member_info).patch(update_member))
}

#[utoipa::path(
    post,
    path = "/api/join",
    request_body = JoinRequest,
    responses(
        (status = 200, description = "Register member", body = ApiResponse<MemberInfo>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already taken")
    ),
    tag = "Members"
)]
pub async fn join(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<JoinRequest>,
) -> AppResult<Json<ApiResponse<MemberInfo>>> {
    let resp = member_service::join_member(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/member",
    responses(
        (status = 200, description = "Own profile", body = ApiResponse<MemberInfo>)
    ),
    security(("bearer_auth" = [])),
    tag = "Members"
)]
pub async fn member_info(
    State(state): State<AppState>,
    member: AuthMember,
) -> AppResult<Json<ApiResponse<MemberInfo>>> {
    let resp = member_service::get_member_info(&state, &member).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/member",
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<MemberInfo>)
    ),
    security(("bearer_auth" = [])),
    tag = "Members"
)]
pub async fn update_member(
    State(state): State<AppState>,
    member: AuthMember,
    ValidJson(payload): ValidJson<UpdateMemberRequest>,
) -> AppResult<Json<ApiResponse<MemberInfo>>> {
    let resp = member_service::update_member(&state, &member, payload).await?;
    Ok(Json(resp))
}
