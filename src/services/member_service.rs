use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, EntityTrait, IntoActiveModel, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    audit,
    dto::members::{JoinRequest, UpdateMemberRequest},
    entity::{
        Members,
        members::{self, MemberRole, MemberStatus},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::MemberInfo,
    response::ApiResponse,
    services::auth_service::hash_password,
    state::AppState,
};

pub async fn join_member(state: &AppState, payload: JoinRequest) -> AppResult<ApiResponse<MemberInfo>> {
    let gender = payload.validate()?;
    let password_hash = hash_password(&payload.password)?;

    let member = members::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(payload.username.trim().to_string()),
        password_hash: Set(password_hash),
        phone: Set(payload.phone.trim().to_string()),
        email: Set(payload.email.trim().to_string()),
        zip_code: Set(payload.zip_code.trim().to_string()),
        city: Set(payload.city.trim().to_string()),
        street: Set(payload.street.trim().to_string()),
        mileage: Set(0),
        gender: Set(gender),
        status: Set(MemberStatus::Active),
        role: Set(MemberRole::Member),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| AppError::from_unique(err, "Email is already taken"))?;

    audit::record(
        &state.pool,
        Some(member.id),
        "member_join",
        "members",
        serde_json::json!({ "member_id": member.id }),
    )
    .await;

    Ok(ApiResponse::success("Member created", member.into(), None))
}

pub async fn get_member_info(state: &AppState, member: &AuthMember) -> AppResult<ApiResponse<MemberInfo>> {
    let found = Members::find_by_id(member.member_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("member"))?;
    Ok(ApiResponse::success("Member", found.into(), None))
}

/// Password changes only when a non-blank one is sent; the address only when
/// zip code, city and street are all present.
pub async fn update_member(
    state: &AppState,
    member: &AuthMember,
    payload: UpdateMemberRequest,
) -> AppResult<ApiResponse<MemberInfo>> {
    let password_hash = payload.new_password()?.map(hash_password).transpose()?;
    let address = payload.address();

    let txn = state.orm.begin().await?;
    let found = Members::find_by_id(member.member_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("member"))?;

    let mut active = found.into_active_model();
    if let Some(hash) = password_hash {
        active.password_hash = Set(hash);
    }
    if let Some(address) = address {
        active.zip_code = Set(address.zip_code.to_string());
        active.city = Set(address.city.to_string());
        active.street = Set(address.street.to_string());
    }
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success("Member updated", updated.into(), None))
}
