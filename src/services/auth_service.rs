use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    audit,
    db::is_unique_violation,
    dto::auth::{
        AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, ForgotPasswordResponse,
        LoginRequest, RegisterRequest, ResetPasswordRequest, UpdateProfileRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Role, USER_COLUMNS, User, UserCredentials},
    response::ApiResponse,
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const USER_EXISTS: &str = "User already exists";
const RESET_TOKEN_TTL_MINUTES: i64 = 60;

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let RegisterRequest {
        name,
        email,
        password,
        phone,
        role,
    } = payload;
    let email = normalize_email(&email);
    let exist: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::Conflict(USER_EXISTS.to_string()));
    }

    let password_hash = state.credentials.hash_password(&password)?;
    let role = role.unwrap_or(Role::Client);

    let user: User = sqlx::query_as(&format!(
        "INSERT INTO users (name, email, password_hash, phone, role) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
    ))
    .bind(name.trim())
    .bind(email.as_str())
    .bind(password_hash)
    .bind(phone)
    .bind(role.as_str())
    .fetch_one(&state.pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::Conflict(USER_EXISTS.to_string())
        } else {
            err.into()
        }
    })?;

    let token = state.credentials.issue_token(user.id, &user.role)?;
    tracing::info!(user_id = user.id, role = %user.role, "user registered");

    audit::record(
        &state.pool,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "role": user.role }),
    )
    .await;

    Ok(ApiResponse::success(
        "User registered successfully",
        AuthResponse { user, token },
        None,
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let LoginRequest { email, password } = payload;
    let email = normalize_email(&email);
    let credentials: Option<UserCredentials> = sqlx::query_as(
        "SELECT id, role, password_hash, is_active FROM users WHERE email = $1",
    )
    .bind(email.as_str())
    .fetch_optional(&state.pool)
    .await?;

    // Unknown email, inactive account and wrong password are indistinguishable to the caller.
    let credentials = match credentials {
        Some(c) if c.is_active => c,
        _ => return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into())),
    };

    if !state
        .credentials
        .verify_password(&password, &credentials.password_hash)?
    {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let token = state
        .credentials
        .issue_token(credentials.id, &credentials.role)?;
    let user = fetch_user(state, credentials.id).await?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Login successful",
        AuthResponse { user, token },
        None,
    ))
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let profile = fetch_user(state, user.user_id).await?;
    Ok(ApiResponse::success("Profile", profile, None))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    if user.user_id != id {
        return Err(AppError::Forbidden(
            "Not authorized to update this profile".into(),
        ));
    }

    let existing = fetch_user(state, id).await?;
    let name = payload
        .name
        .map(|n| n.trim().to_string())
        .unwrap_or(existing.name);
    let phone = payload.phone.or(existing.phone);
    let address = payload.address.or(existing.address);

    let updated: User = sqlx::query_as(&format!(
        "UPDATE users SET name = $2, phone = $3, address = $4, updated_at = now() \
         WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(phone)
    .bind(address)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Profile updated successfully",
        updated,
        None,
    ))
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<()>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?;
    let (current_hash,) = row.ok_or_else(|| AppError::not_found("User"))?;

    if !state
        .credentials
        .verify_password(&payload.current_password, &current_hash)?
    {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".into(),
        ));
    }

    let new_hash = state.credentials.hash_password(&payload.new_password)?;
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
        .bind(user.user_id)
        .bind(new_hash)
        .execute(&state.pool)
        .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "password_change",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::message("Password changed successfully"))
}

/// Issue a one-hour reset token. Delivery is stubbed: the token is returned to the caller.
pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<ForgotPasswordResponse>> {
    let email = normalize_email(&payload.email);
    let user: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    let (user_id,) = user.ok_or_else(|| {
        AppError::NotFound("No user found with this email".into())
    })?;

    let reset_token = Uuid::new_v4().simple().to_string();
    let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

    sqlx::query("INSERT INTO password_resets (email, token, expires_at) VALUES ($1, $2, $3)")
        .bind(email.as_str())
        .bind(reset_token.as_str())
        .bind(expires_at)
        .execute(&state.pool)
        .await?;

    tracing::info!(user_id, "password reset token issued");

    Ok(ApiResponse::success(
        "Password reset token generated",
        ForgotPasswordResponse {
            reset_token,
            expires_at,
        },
        None,
    ))
}

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<()>> {
    // Deleting up front makes the token single-use even under concurrent redemption.
    let row: Option<(String, DateTime<Utc>)> = sqlx::query_as(
        "DELETE FROM password_resets WHERE token = $1 RETURNING email, expires_at",
    )
    .bind(payload.token.as_str())
    .fetch_optional(&state.pool)
    .await?;

    let email = match row {
        Some((email, expires_at)) if expires_at > Utc::now() => email,
        _ => return Err(AppError::BadRequest("Invalid or expired token".into())),
    };

    let new_hash = state.credentials.hash_password(&payload.new_password)?;
    let updated: Option<(i64,)> = sqlx::query_as(
        "UPDATE users SET password_hash = $2, updated_at = now() WHERE email = $1 RETURNING id",
    )
    .bind(email.as_str())
    .bind(new_hash)
    .fetch_optional(&state.pool)
    .await?;
    let (user_id,) = updated.ok_or_else(|| AppError::BadRequest("Invalid or expired token".into()))?;

    audit::record(
        &state.pool,
        Some(user_id),
        "password_reset",
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::message("Password reset successful"))
}

pub(crate) async fn fetch_user(state: &AppState, id: i64) -> AppResult<User> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
