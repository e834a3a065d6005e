use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    config::JwtConfig,
    db::OrmConn,
    dto::auth::{Claims, LoginRequest, LoginResponse, RefreshRequest, TokenKind},
    entity::{Members, RefreshTokens, RevokedTokens, members, refresh_tokens, revoked_tokens},
    error::{AppError, AppResult, AuthFailure},
    middleware::auth::AuthMember,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn sign(
    jwt: &JwtConfig,
    member: &members::Model,
    kind: TokenKind,
    lifetime: Duration,
) -> AppResult<(String, Claims)> {
    let expiration = Utc::now()
        .checked_add_signed(lifetime)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: member.id.to_string(),
        email: member.email.clone(),
        role: member.role,
        exp: expiration.timestamp() as usize,
        jti: Uuid::new_v4(),
        kind,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
    Ok((token, claims))
}

pub fn issue_token(jwt: &JwtConfig, member: &members::Model) -> AppResult<String> {
    sign(jwt, member, TokenKind::Access, Duration::hours(jwt.expiry_hours)).map(|(token, _)| token)
}

pub fn issue_refresh_token(jwt: &JwtConfig, member: &members::Model) -> AppResult<(String, Claims)> {
    sign(
        jwt,
        member,
        TokenKind::Refresh,
        Duration::hours(jwt.refresh_expiry_hours),
    )
}

pub fn decode_token(jwt: &JwtConfig, token: &str) -> AppResult<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| {
        let failure = match err.kind() {
            ErrorKind::ExpiredSignature => AuthFailure::Expired,
            ErrorKind::InvalidSignature => AuthFailure::BadSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                AuthFailure::Unsupported
            }
            _ => AuthFailure::InvalidToken,
        };
        tracing::debug!(error = %err, code = failure.code(), "token rejected");
        AppError::Unauthorized(failure)
    })
}

/// Decodes a token and insists on its kind.
pub fn decode_kind(jwt: &JwtConfig, token: &str, kind: TokenKind) -> AppResult<Claims> {
    let claims = decode_token(jwt, token)?;
    if claims.kind != kind {
        tracing::debug!(expected = ?kind, got = ?claims.kind, "token of the wrong kind");
        return Err(AppError::Unauthorized(AuthFailure::InvalidToken));
    }
    Ok(claims)
}

fn subject(claims: &Claims) -> AppResult<Uuid> {
    Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized(AuthFailure::InvalidToken))
}

fn expires_at(claims: &Claims) -> AppResult<DateTime<FixedOffset>> {
    DateTime::from_timestamp(claims.exp as i64, 0)
        .map(|at| at.fixed_offset())
        .ok_or(AppError::Unauthorized(AuthFailure::InvalidToken))
}

/// Resolves the caller behind an access token. Tokens given up at logout are refused.
pub async fn authenticate(state: &AppState, token: &str) -> AppResult<AuthMember> {
    let claims = decode_kind(&state.jwt, token, TokenKind::Access)?;
    let member_id = subject(&claims)?;

    if RevokedTokens::find_by_id(claims.jti)
        .one(&state.orm)
        .await?
        .is_some()
    {
        tracing::debug!(%member_id, jti = %claims.jti, "revoked token presented");
        return Err(AppError::Unauthorized(AuthFailure::Revoked));
    }

    Ok(AuthMember {
        member_id,
        email: claims.email,
        role: claims.role,
    })
}

async fn store_refresh_token<C: ConnectionTrait>(
    conn: &C,
    member_id: Uuid,
    claims: &Claims,
) -> AppResult<()> {
    RefreshTokens::delete_many()
        .filter(refresh_tokens::Column::MemberId.eq(member_id))
        .exec(conn)
        .await?;
    refresh_tokens::ActiveModel {
        member_id: Set(member_id),
        jti: Set(claims.jti),
        expires_at: Set(expires_at(claims)?),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Issues an access/refresh pair and makes the refresh token the member's only live one.
async fn issue_pair<C: ConnectionTrait>(
    conn: &C,
    jwt: &JwtConfig,
    member: &members::Model,
) -> AppResult<LoginResponse> {
    let token = issue_token(jwt, member)?;
    let (refresh_token, refresh_claims) = issue_refresh_token(jwt, member)?;
    store_refresh_token(conn, member.id, &refresh_claims).await?;
    Ok(LoginResponse {
        token: format!("Bearer {}", token),
        refresh_token,
    })
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let member = Members::find()
        .filter(members::Column::Email.eq(email.trim()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::Unauthorized(AuthFailure::BadCredentials))?;

    if !verify_password(&password, &member.password_hash)? {
        tracing::info!(member_id = %member.id, "login rejected: wrong password");
        return Err(AppError::Unauthorized(AuthFailure::BadCredentials));
    }
    if !member.is_active() {
        tracing::info!(member_id = %member.id, status = ?member.status, "login rejected: inactive member");
        return Err(AppError::Forbidden);
    }

    let txn = state.orm.begin().await?;
    let resp = issue_pair(&txn, &state.jwt, &member).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(member.id),
        "member_login",
        "members",
        serde_json::json!({ "member_id": member.id }),
    )
    .await;

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

/// Trades the current refresh token for a new pair. The old refresh token stops working.
pub async fn refresh(state: &AppState, payload: RefreshRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let claims = decode_kind(&state.jwt, payload.refresh_token.trim(), TokenKind::Refresh)?;
    let member_id = subject(&claims)?;

    let txn = state.orm.begin().await?;
    let stored = RefreshTokens::find_by_id(member_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    if stored.as_ref().map(|row| row.jti) != Some(claims.jti) {
        tracing::info!(%member_id, jti = %claims.jti, "refresh rejected: token is not the current one");
        return Err(AppError::Unauthorized(AuthFailure::Revoked));
    }

    let member = Members::find_by_id(member_id)
        .one(&txn)
        .await?
        .ok_or(AppError::Unauthorized(AuthFailure::InvalidToken))?;
    if !member.is_active() {
        tracing::info!(%member_id, status = ?member.status, "refresh rejected: inactive member");
        return Err(AppError::Forbidden);
    }

    let resp = issue_pair(&txn, &state.jwt, &member).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(member_id),
        "member_token_refresh",
        "members",
        serde_json::json!({ "member_id": member_id }),
    )
    .await;

    Ok(ApiResponse::success("Token refreshed", resp, None))
}

/// Revokes the presented access token until its expiry and drops the member's refresh token.
pub async fn logout(state: &AppState, token: &str) -> AppResult<ApiResponse<serde_json::Value>> {
    let claims = decode_kind(&state.jwt, token, TokenKind::Access)?;
    let member_id = subject(&claims)?;

    let txn = state.orm.begin().await?;
    RevokedTokens::insert(revoked_tokens::ActiveModel {
        jti: Set(claims.jti),
        member_id: Set(member_id),
        expires_at: Set(expires_at(&claims)?),
    })
    .on_conflict(
        OnConflict::column(revoked_tokens::Column::Jti)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(&txn)
    .await?;
    RefreshTokens::delete_many()
        .filter(refresh_tokens::Column::MemberId.eq(member_id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(member_id),
        "member_logout",
        "members",
        serde_json::json!({ "member_id": member_id, "jti": claims.jti }),
    )
    .await;

    Ok(ApiResponse::ok("Logged out"))
}

/// Deletes revocations and refresh tokens whose expiry has passed.
pub async fn purge_expired_tokens(orm: &OrmConn, now: DateTime<Utc>) -> AppResult<u64> {
    let cutoff = now.fixed_offset();
    let revoked = RevokedTokens::delete_many()
        .filter(revoked_tokens::Column::ExpiresAt.lt(cutoff))
        .exec(orm)
        .await?
        .rows_affected;
    let refresh = RefreshTokens::delete_many()
        .filter(refresh_tokens::Column::ExpiresAt.lt(cutoff))
        .exec(orm)
        .await?
        .rows_affected;
    Ok(revoked + refresh)
}
