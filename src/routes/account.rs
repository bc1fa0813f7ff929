use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::{
        account_dto::{ChangePasswordPayload, RecoveryPayload, UpdateAccountPayload, UserIdParams},
        present, ApiResponse,
    },
    error::{Error, Result},
    middleware::{auth::RequestContext, validate::Validated},
    models::account::ProfileChanges,
    services::token_service::TokenPurpose,
    utils::{
        crypto::{hash_password, verify_password},
        messages::{already_exists, deleted, not_found, updated, INVALID_CREDENTIALS},
        time::parse_dob,
    },
    AppState,
};

/// Changing the email drops verification and mails a fresh link.
#[utoipa::path(
    patch,
    path = "/api/user/update-account",
    responses(
        (status = 200, description = "Account updated"),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email or phone belongs to another account")
    )
)]
pub async fn update_account(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Validated(payload): Validated<UpdateAccountPayload>,
) -> Result<impl IntoResponse> {
    let current = context.account;
    let email = payload.email.unwrap_or_else(|| current.email.clone());
    let phone = payload.phone.unwrap_or_else(|| current.phone.clone());

    if state
        .account_service
        .contact_taken(&email, &phone, Some(&current.id))
        .await?
    {
        return Err(Error::Conflict(already_exists("user")));
    }

    let email_changed = email != current.email;
    let changes = ProfileChanges {
        first_name: payload.first_name.unwrap_or_else(|| current.first_name.clone()),
        last_name: payload.last_name.unwrap_or_else(|| current.last_name.clone()),
        email,
        recovery_email: payload.recovery_email.or_else(|| current.recovery_email.clone()),
        phone,
        dob: payload.dob.as_deref().and_then(parse_dob).or(current.dob),
        verified: current.verified && !email_changed,
    };
    let account = state.account_service.update_profile(&current.id, changes).await?;

    if email_changed {
        let token = state
            .tokens
            .issue(&account.id, &account.email, TokenPurpose::VerifyAccount)?;
        state
            .mailer
            .dispatch(state.mailer.verification(&account.email, &token));
    }

    Ok(Json(ApiResponse::data(account).with_message(updated("user"))))
}

#[utoipa::path(
    delete,
    path = "/api/user/delete-account",
    responses(
        (status = 200, description = "Account and everything it owns removed"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> Result<impl IntoResponse> {
    state
        .account_service
        .delete_with_dependents(&context.account)
        .await?;
    tracing::info!(account_id = %context.account.id, "account deleted");
    Ok(Json(ApiResponse::message(deleted("user"))))
}

#[utoipa::path(
    get,
    path = "/api/user/my-account",
    responses(
        (status = 200, description = "Caller's own account"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn my_account(Extension(context): Extension<RequestContext>) -> impl IntoResponse {
    Json(ApiResponse::data(context.account))
}

#[utoipa::path(
    patch,
    path = "/api/user/change-password",
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Invalid payload or unchanged password"),
        (status = 401, description = "Old password does not match")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Validated(payload): Validated<ChangePasswordPayload>,
) -> Result<impl IntoResponse> {
    let account = context.account;
    let old_password = present(payload.old_password, "oldPassword")?;
    let new_password = present(payload.new_password, "newPassword")?;

    if !verify_password(&old_password, &account.password_hash)? {
        return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }
    if verify_password(&new_password, &account.password_hash)? {
        return Err(Error::BadRequest(
            "new password must differ from the old one".to_string(),
        ));
    }

    state
        .account_service
        .set_password(&account.id, &hash_password(&new_password)?)
        .await?;
    Ok(Json(ApiResponse::message(updated("password"))))
}

#[utoipa::path(
    get,
    path = "/api/user/{userId}",
    params(
        ("userId" = String, Path, description = "24 character account id")
    ),
    responses(
        (status = 200, description = "Public profile"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Account not found")
    )
)]
#[axum::debug_handler]
pub async fn public_profile(
    State(state): State<AppState>,
    Validated(params): Validated<UserIdParams>,
) -> Result<impl IntoResponse> {
    let user_id = present(params.user_id, "userId")?;
    let profile = state
        .account_service
        .public_profile(&user_id)
        .await?
        .ok_or_else(|| Error::NotFound(not_found("user")))?;
    Ok(Json(ApiResponse::data(profile)))
}

#[utoipa::path(
    post,
    path = "/api/user/recovery-account",
    responses(
        (status = 200, description = "Accounts sharing the recovery email"),
        (status = 404, description = "No account uses that recovery email")
    )
)]
#[axum::debug_handler]
pub async fn recovery_accounts(
    State(state): State<AppState>,
    Validated(payload): Validated<RecoveryPayload>,
) -> Result<impl IntoResponse> {
    let recovery_email = present(payload.recovery_email, "recoveryEmail")?;
    let accounts = state.account_service.by_recovery_email(&recovery_email).await?;
    if accounts.is_empty() {
        return Err(Error::NotFound(not_found("user")));
    }
    Ok(Json(ApiResponse::data(accounts)))
}
