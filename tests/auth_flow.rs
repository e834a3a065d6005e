mod common;

use chrono::{Duration, Utc};
use furniture_shop_api::{
    dto::auth::{LoginRequest, LoginResponse, RefreshRequest},
    entity::{
        Members, RefreshTokens, RevokedTokens,
        members,
        revoked_tokens,
    },
    error::{AppError, AuthFailure},
    services::auth_service,
    state::AppState,
    worker,
};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use common::create_member;

const PASSWORD: &str = "correct horse";

async fn member_with_password(state: &AppState) -> anyhow::Result<members::Model> {
    let member = create_member(state, 0).await?;
    Members::update_many()
        .col_expr(
            members::Column::PasswordHash,
            Expr::value(auth_service::hash_password(PASSWORD)?),
        )
        .filter(members::Column::Id.eq(member.id))
        .exec(&state.orm)
        .await?;
    Ok(member)
}

async fn login(state: &AppState, member: &members::Model) -> anyhow::Result<LoginResponse> {
    let resp = auth_service::login(
        state,
        LoginRequest {
            email: member.email.clone(),
            password: PASSWORD.into(),
        },
    )
    .await?;
    Ok(resp.result.expect("tokens"))
}

fn access(resp: &LoginResponse) -> &str {
    resp.token.strip_prefix("Bearer ").expect("bearer prefix")
}

async fn refresh(state: &AppState, token: &str) -> Result<LoginResponse, AppError> {
    let resp = auth_service::refresh(
        state,
        RefreshRequest {
            refresh_token: token.to_string(),
        },
    )
    .await?;
    Ok(resp.result.expect("tokens"))
}

#[tokio::test]
async fn login_hands_out_a_working_token_pair() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = member_with_password(&state).await?;

    let tokens = login(&state, &member).await?;
    let caller = auth_service::authenticate(&state, access(&tokens)).await?;
    assert_eq!(caller.member_id, member.id);
    assert_eq!(caller.email, member.email);

    let stored = RefreshTokens::find_by_id(member.id).one(&state.orm).await?;
    assert!(stored.is_some());

    let err = auth_service::authenticate(&state, &tokens.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(AuthFailure::InvalidToken)));
    Ok(())
}

#[tokio::test]
async fn refresh_rotates_and_the_old_refresh_token_dies() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = member_with_password(&state).await?;
    let first = login(&state, &member).await?;

    let second = refresh(&state, &first.refresh_token).await?;
    assert_ne!(second.refresh_token, first.refresh_token);
    let caller = auth_service::authenticate(&state, access(&second)).await?;
    assert_eq!(caller.member_id, member.id);

    let err = refresh(&state, &first.refresh_token).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(AuthFailure::Revoked)));

    let err = refresh(&state, access(&second)).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(AuthFailure::InvalidToken)));

    refresh(&state, &second.refresh_token).await?;
    Ok(())
}

#[tokio::test]
async fn logout_revokes_the_access_token_and_drops_refresh() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = member_with_password(&state).await?;
    let tokens = login(&state, &member).await?;

    auth_service::logout(&state, access(&tokens)).await?;

    let err = auth_service::authenticate(&state, access(&tokens))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(AuthFailure::Revoked)));
    assert_eq!(err.code(), "JWT_REVOKED");

    let err = refresh(&state, &tokens.refresh_token).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(AuthFailure::Revoked)));
    assert!(RefreshTokens::find_by_id(member.id).one(&state.orm).await?.is_none());

    // Logging out twice with the same token is harmless.
    auth_service::logout(&state, access(&tokens)).await?;

    // A fresh login is unaffected by the earlier revocation.
    let again = login(&state, &member).await?;
    auth_service::authenticate(&state, access(&again)).await?;
    Ok(())
}

#[tokio::test]
async fn refresh_for_a_stopped_member_is_forbidden() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = member_with_password(&state).await?;
    let tokens = login(&state, &member).await?;

    Members::update_many()
        .col_expr(members::Column::Status, Expr::value("STOP"))
        .filter(members::Column::Id.eq(member.id))
        .exec(&state.orm)
        .await?;

    let err = refresh(&state, &tokens.refresh_token).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    Ok(())
}

#[tokio::test]
async fn expired_revocations_are_swept() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = member_with_password(&state).await?;
    let tokens = login(&state, &member).await?;
    auth_service::logout(&state, access(&tokens)).await?;

    let past = (Utc::now() - Duration::hours(1)).fixed_offset();
    RevokedTokens::update_many()
        .col_expr(revoked_tokens::Column::ExpiresAt, Expr::value(past))
        .filter(revoked_tokens::Column::MemberId.eq(member.id))
        .exec(&state.orm)
        .await?;

    assert!(worker::sweep_tokens_once(&state.orm).await >= 1);
    let left = RevokedTokens::find()
        .filter(revoked_tokens::Column::MemberId.eq(member.id))
        .all(&state.orm)
        .await?;
    assert!(left.is_empty());
    Ok(())
}
