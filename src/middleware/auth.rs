use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::{
    error::{Error, Result},
    models::{
        account::Account,
        enums::{AccountStatus, Role},
        organization::Organization,
    },
    services::token_service::TokenPurpose,
    utils::messages::{NOT_AUTHORIZED, TOKEN_NOT_FOUND},
    AppState,
};

pub const TOKEN_HEADER: &str = "token";

/// Who is calling, resolved once per request and handed to handlers as an extension.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub account: Account,
    /// Attached by authorization for HR callers that own an organization.
    pub organization: Option<Organization>,
}

/// Raw token from the `token` header. A leading `Bearer ` is tolerated.
pub fn presented_token(headers: &HeaderMap) -> Result<String> {
    let raw = headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::Unauthorized(TOKEN_NOT_FOUND.to_string()))?;
    Ok(raw.strip_prefix("Bearer ").unwrap_or(raw).trim().to_string())
}

/// Only verified accounts that are currently online hold a usable session.
pub fn admit(account: Option<Account>) -> Result<Account> {
    match account {
        Some(account) if account.verified => match account.status {
            AccountStatus::Online => Ok(account),
            AccountStatus::Offline | AccountStatus::Blocked => {
                Err(Error::Unauthorized(NOT_AUTHORIZED.to_string()))
            }
        },
        Some(_) | None => Err(Error::Unauthorized(NOT_AUTHORIZED.to_string())),
    }
}

pub fn permits(allowed: &[Role], role: Role) -> bool {
    allowed.contains(&role)
}

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = presented_token(req.headers())?;
    let claims = state.tokens.verify(&token, TokenPurpose::Session)?;
    let account = admit(state.account_service.find_by_id(&claims.sub).await?)?;

    req.extensions_mut().insert(RequestContext {
        account,
        organization: None,
    });
    Ok(next.run(req).await)
}

pub async fn authorize(
    state: &AppState,
    allowed: &[Role],
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let mut context = req
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .ok_or_else(|| Error::Unauthorized(NOT_AUTHORIZED.to_string()))?;

    if !permits(allowed, context.account.role) {
        return Err(Error::Unauthorized(NOT_AUTHORIZED.to_string()));
    }

    match context.account.role {
        Role::CompanyHr => {
            match state
                .organization_service
                .find_by_owner(&context.account.id)
                .await
            {
                Ok(organization) => context.organization = organization,
                Err(e) => {
                    tracing::warn!(account_id = %context.account.id, error = ?e, "organization lookup failed");
                }
            }
        }
        Role::User | Role::Admin => {}
    }

    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

pub async fn hr_only(State(state): State<AppState>, req: Request, next: Next) -> Result<Response> {
    authorize(&state, &[Role::CompanyHr], req, next).await
}

pub async fn admin_or_hr(State(state): State<AppState>, req: Request, next: Next) -> Result<Response> {
    authorize(&state, &[Role::Admin, Role::CompanyHr], req, next).await
}

pub async fn hr_or_user(State(state): State<AppState>, req: Request, next: Next) -> Result<Response> {
    authorize(&state, &[Role::CompanyHr, Role::User], req, next).await
}

pub async fn user_only(State(state): State<AppState>, req: Request, next: Next) -> Result<Response> {
    authorize(&state, &[Role::User], req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;

    fn account(status: AccountStatus, verified: bool) -> Account {
        Account {
            id: "65a1f0c2b4d3e5f6a7b8c9d0".into(),
            first_name: "ada".into(),
            last_name: "lovelace".into(),
            user_name: "ada_lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: String::new(),
            recovery_email: None,
            dob: None,
            phone: "01012345678".into(),
            role: Role::User,
            status,
            verified,
            otp: None,
            otp_expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_verified_online_accounts_are_admitted() {
        assert!(admit(Some(account(AccountStatus::Online, true))).is_ok());
        for _ in 0..3 {
            assert!(admit(Some(account(AccountStatus::Offline, true))).is_err());
        }
        assert!(admit(Some(account(AccountStatus::Online, false))).is_err());
        assert!(admit(Some(account(AccountStatus::Blocked, true))).is_err());
        assert!(matches!(admit(None), Err(Error::Unauthorized(m)) if m == NOT_AUTHORIZED));
    }

    #[test]
    fn user_role_never_passes_an_hr_allow_list() {
        assert!(!permits(&[Role::CompanyHr], Role::User));
        assert!(permits(&[Role::CompanyHr, Role::User], Role::User));
        assert!(!permits(&[], Role::Admin));
    }

    #[test]
    fn token_header_is_required() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            presented_token(&headers),
            Err(Error::Unauthorized(m)) if m == TOKEN_NOT_FOUND
        ));
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(presented_token(&headers).unwrap(), "abc.def");
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("abc.def"));
        assert_eq!(presented_token(&headers).unwrap(), "abc.def");
    }
}
