use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Duration;

use crate::{
    dto::{
        auth_dto::{ForgetPasswordPayload, LoginPayload, ResetPasswordPayload, SignupPayload},
        present, ApiResponse,
    },
    error::{Error, Result},
    middleware::{
        auth::{presented_token, RequestContext},
        validate::Validated,
    },
    models::{
        account::NewAccount,
        enums::{AccountStatus, Enumeration, Role},
    },
    services::token_service::TokenPurpose,
    utils::{
        crypto::{hash_password, otp_matches, verify_password},
        messages::{already_exists, created, not_found, updated, INVALID_CREDENTIALS, NOT_AUTHORIZED},
        time::{now, parse_dob},
        token::new_otp,
    },
    AppState,
};

const OTP_TTL_MINUTES: i64 = 5;

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    responses(
        (status = 201, description = "Account created, verification mail sent"),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email or phone already registered")
    )
)]
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Validated(payload): Validated<SignupPayload>,
) -> Result<impl IntoResponse> {
    let email = present(payload.email, "email")?;
    let phone = present(payload.phone, "phone")?;
    if state.account_service.contact_taken(&email, &phone, None).await? {
        return Err(Error::Conflict(already_exists("user")));
    }

    let role = match payload.role.as_deref() {
        Some(raw) => Role::lookup(raw).map_err(|e| Error::Validation(vec![format!("role {}", e)]))?,
        None => Role::default(),
    };
    let password = present(payload.password, "password")?;

    let account = state
        .account_service
        .create(NewAccount {
            first_name: present(payload.first_name, "firstName")?,
            last_name: present(payload.last_name, "lastName")?,
            email,
            recovery_email: payload.recovery_email,
            password_hash: hash_password(&password)?,
            phone,
            dob: payload.dob.as_deref().and_then(parse_dob),
            role,
        })
        .await?;

    let token = state
        .tokens
        .issue(&account.id, &account.email, TokenPurpose::VerifyAccount)?;
    state
        .mailer
        .dispatch(state.mailer.verification(&account.email, &token));

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(account).with_message(created("user"))),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "Session token issued"),
        (status = 400, description = "Invalid payload or already logged in"),
        (status = 401, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Validated(payload): Validated<LoginPayload>,
) -> Result<impl IntoResponse> {
    let account = state
        .account_service
        .find_for_login(
            payload.email.as_deref(),
            payload.recovery_email.as_deref(),
            payload.phone.as_deref(),
        )
        .await?
        .ok_or_else(|| Error::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    match account.status {
        AccountStatus::Offline => {}
        AccountStatus::Online => return Err(Error::BadRequest("already logged in".to_string())),
        AccountStatus::Blocked => return Err(Error::Unauthorized(NOT_AUTHORIZED.to_string())),
    }

    let password = present(payload.password, "password")?;
    if !verify_password(&password, &account.password_hash)? {
        return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    state
        .account_service
        .set_status(&account.id, AccountStatus::Online)
        .await?;
    let token = state
        .tokens
        .issue(&account.id, &account.email, TokenPurpose::Session)?;
    tracing::info!(account_id = %account.id, "account logged in");

    Ok(Json(ApiResponse::token("login successfully", token)))
}

#[utoipa::path(
    get,
    path = "/api/auth/verify/{token}",
    params(
        ("token" = String, Path, description = "Verification token from the mail link")
    ),
    responses(
        (status = 200, description = "Account or company verified"),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "Nothing left to verify")
    )
)]
#[axum::debug_handler]
pub async fn verify(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let claims = state.tokens.decode_any(&token)?;
    let message = match claims.purpose {
        TokenPurpose::VerifyAccount => {
            if !state.account_service.mark_verified(&claims.sub).await? {
                return Err(Error::NotFound(not_found("user")));
            }
            "account verified successfully"
        }
        TokenPurpose::VerifyOrganization => {
            if !state.organization_service.mark_verified(&claims.sub).await? {
                return Err(Error::NotFound(not_found("company")));
            }
            "company verified successfully"
        }
        TokenPurpose::Session | TokenPurpose::PasswordReset => {
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()))
        }
    };
    tracing::info!(subject = %claims.sub, purpose = ?claims.purpose, "verification accepted");
    Ok(Json(ApiResponse::message(message)))
}

/// Mails a one-time code to an offline account and returns the token that pairs with it.
#[utoipa::path(
    post,
    path = "/api/auth/forget-password",
    responses(
        (status = 200, description = "Code mailed, reset token returned"),
        (status = 404, description = "No offline account with that email")
    )
)]
#[axum::debug_handler]
pub async fn forget_password(
    State(state): State<AppState>,
    Validated(payload): Validated<ForgetPasswordPayload>,
) -> Result<impl IntoResponse> {
    let email = present(payload.email, "email")?;
    let account = state
        .account_service
        .find_by_email_with_status(&email, AccountStatus::Offline)
        .await?
        .ok_or_else(|| Error::NotFound(not_found("user")))?;

    let otp = new_otp();
    state
        .account_service
        .store_otp(&account.id, &otp, now() + Duration::minutes(OTP_TTL_MINUTES))
        .await?;
    state
        .mailer
        .dispatch(state.mailer.password_reset(&account.email, &otp));

    let token = state
        .tokens
        .issue(&account.id, &account.email, TokenPurpose::PasswordReset)?;
    Ok(Json(ApiResponse::token("otp sent to your email", token)))
}

#[utoipa::path(
    patch,
    path = "/api/auth/forget-password",
    responses(
        (status = 200, description = "Password replaced"),
        (status = 400, description = "Wrong or expired code, or unchanged password"),
        (status = 401, description = "Missing or invalid reset token")
    )
)]
#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Validated(payload): Validated<ResetPasswordPayload>,
) -> Result<impl IntoResponse> {
    let token = presented_token(&headers)?;
    let claims = state.tokens.verify(&token, TokenPurpose::PasswordReset)?;
    let account = state
        .account_service
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| Error::NotFound(not_found("user")))?;

    let otp = present(payload.otp, "otp")?;
    let expires_at = match (account.otp.as_deref(), account.otp_expires_at) {
        (Some(stored), Some(expires_at)) if otp_matches(stored, &otp) => expires_at,
        _ => return Err(Error::BadRequest("invalid otp".to_string())),
    };
    if expires_at < now() {
        return Err(Error::BadRequest("otp expired".to_string()));
    }

    let new_password = present(payload.new_password, "newPassword")?;
    if verify_password(&new_password, &account.password_hash)? {
        return Err(Error::BadRequest(
            "new password must differ from the old one".to_string(),
        ));
    }
    state
        .account_service
        .set_password(&account.id, &hash_password(&new_password)?)
        .await?;
    tracing::info!(account_id = %account.id, "password reset");

    Ok(Json(ApiResponse::message(updated("password"))))
}

#[utoipa::path(
    get,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session closed"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> Result<impl IntoResponse> {
    state
        .account_service
        .set_status(&context.account.id, AccountStatus::Offline)
        .await?;
    tracing::info!(account_id = %context.account.id, "account logged out");
    Ok(Json(ApiResponse::message("logged out successfully")))
}
