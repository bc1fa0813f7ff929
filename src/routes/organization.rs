use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::{
        listing_dto::{ApplicantResponse, JobIdParams},
        organization_dto::{AddCompanyPayload, CompanyIdParams, CompanyNamePayload, UpdateCompanyPayload},
        present, ApiResponse,
    },
    error::{Error, Result},
    middleware::{auth::RequestContext, validate::Validated},
    models::{listing::Listing, organization::Organization},
    services::token_service::TokenPurpose,
    utils::messages::{already_exists, created, deleted, not_found, updated, NOT_AUTHORIZED},
    AppState,
};

fn attached(context: &RequestContext) -> Result<&Organization> {
    context
        .organization
        .as_ref()
        .ok_or_else(|| Error::NotFound(not_found("company")))
}

/// A listing is reviewable by its creator or by the owner of the organization it was posted under.
pub fn may_review(context: &RequestContext, listing: &Listing) -> bool {
    if listing.added_by == context.account.id {
        return true;
    }
    match (&context.organization, &listing.organization_id) {
        (Some(organization), Some(owner)) => &organization.id == owner,
        _ => false,
    }
}

#[utoipa::path(
    post,
    path = "/api/company/add-company",
    responses(
        (status = 201, description = "Company created, verification mail sent"),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Name or email already registered")
    )
)]
pub async fn add_company(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Validated(payload): Validated<AddCompanyPayload>,
) -> Result<impl IntoResponse> {
    let draft = payload.into_draft()?;
    if state
        .organization_service
        .name_or_email_taken(&draft.name, &draft.email, None)
        .await?
    {
        return Err(Error::Conflict(already_exists("company")));
    }

    let organization = state
        .organization_service
        .create(&context.account.id, draft)
        .await?;
    let token = state.tokens.issue(
        &organization.id,
        &organization.email,
        TokenPurpose::VerifyOrganization,
    )?;
    state
        .mailer
        .dispatch(state.mailer.verification(&organization.email, &token));

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(organization).with_message(created("company"))),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/company/update-company",
    responses(
        (status = 200, description = "Company updated"),
        (status = 404, description = "Caller owns no company"),
        (status = 409, description = "Name or email belongs to another company")
    )
)]
pub async fn update_company(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Validated(payload): Validated<UpdateCompanyPayload>,
) -> Result<impl IntoResponse> {
    let current = attached(&context)?;
    let draft = payload.merged_with(current);

    if state
        .organization_service
        .name_or_email_taken(&draft.name, &draft.email, Some(&current.id))
        .await?
    {
        return Err(Error::Conflict(already_exists("company")));
    }

    let email_changed = draft.email != current.email;
    let organization = state
        .organization_service
        .update(&current.id, draft, current.verified && !email_changed)
        .await?;

    if email_changed {
        let token = state.tokens.issue(
            &organization.id,
            &organization.email,
            TokenPurpose::VerifyOrganization,
        )?;
        state
            .mailer
            .dispatch(state.mailer.verification(&organization.email, &token));
    }

    Ok(Json(ApiResponse::data(organization).with_message(updated("company"))))
}

#[utoipa::path(
    delete,
    path = "/api/company/delete-company",
    responses(
        (status = 200, description = "Company, its listings and their applications removed"),
        (status = 404, description = "Caller owns no company")
    )
)]
pub async fn delete_company(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> Result<impl IntoResponse> {
    let organization = attached(&context)?;
    state
        .organization_service
        .delete_with_dependents(&organization.id)
        .await?;
    tracing::info!(organization_id = %organization.id, "company deleted");
    Ok(Json(ApiResponse::message(deleted("company"))))
}

#[utoipa::path(
    get,
    path = "/api/company/{id}",
    params(
        ("id" = String, Path, description = "24 character company id")
    ),
    responses(
        (status = 200, description = "Company"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn get_company(
    State(state): State<AppState>,
    Validated(params): Validated<CompanyIdParams>,
) -> Result<impl IntoResponse> {
    let id = present(params.id, "id")?;
    let organization = state
        .organization_service
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::NotFound(not_found("company")))?;
    Ok(Json(ApiResponse::data(organization)))
}

#[utoipa::path(
    post,
    path = "/api/company/get-company",
    responses(
        (status = 200, description = "Company with exactly that name"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn get_company_by_name(
    State(state): State<AppState>,
    Validated(payload): Validated<CompanyNamePayload>,
) -> Result<impl IntoResponse> {
    let name = present(payload.name, "name")?;
    let organization = state
        .organization_service
        .find_by_name(&name)
        .await?
        .ok_or_else(|| Error::NotFound(not_found("company")))?;
    Ok(Json(ApiResponse::data(organization)))
}

#[utoipa::path(
    get,
    path = "/api/company/job-applications/{jobId}",
    params(
        ("jobId" = String, Path, description = "24 character listing id")
    ),
    responses(
        (status = 200, description = "Applications with applicant summaries"),
        (status = 401, description = "Listing belongs to someone else"),
        (status = 404, description = "Listing or applications not found")
    )
)]
pub async fn job_applications(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Validated(params): Validated<JobIdParams>,
) -> Result<impl IntoResponse> {
    let job_id = present(params.job_id, "jobId")?;
    let listing = state
        .listing_service
        .find_by_id(&job_id)
        .await?
        .ok_or_else(|| Error::NotFound(not_found("job")))?;
    if !may_review(&context, &listing) {
        return Err(Error::Unauthorized(NOT_AUTHORIZED.to_string()));
    }

    let applications: Vec<ApplicantResponse> = state
        .candidacy_service
        .applicants(&listing.id)
        .await?
        .into_iter()
        .map(ApplicantResponse::from)
        .collect();
    if applications.is_empty() {
        return Err(Error::NotFound(not_found("application")));
    }
    Ok(Json(ApiResponse::data(applications)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        account::Account,
        enums::{AccountStatus, JobLocation, Role, SeniorityLevel, WorkingTime},
    };
    use chrono::Utc;

    fn context(account_id: &str, organization_id: Option<&str>) -> RequestContext {
        RequestContext {
            account: Account {
                id: account_id.into(),
                first_name: "grace".into(),
                last_name: "hopper".into(),
                user_name: "grace_hopper".into(),
                email: "grace@example.com".into(),
                password_hash: String::new(),
                recovery_email: None,
                dob: None,
                phone: "01112345678".into(),
                role: Role::CompanyHr,
                status: AccountStatus::Online,
                verified: true,
                otp: None,
                otp_expires_at: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            organization: organization_id.map(|id| Organization {
                id: id.into(),
                name: "acme".into(),
                description: None,
                industry: "software".into(),
                address: None,
                number_of_employees: Some(10),
                email: "hr@acme.io".into(),
                owner_id: account_id.into(),
                verified: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }),
        }
    }

    fn listing(added_by: &str, organization_id: Option<&str>) -> Listing {
        Listing {
            id: "65a1f0c2b4d3e5f6a7b8c9d0".into(),
            job_title: "backend engineer".into(),
            job_location: JobLocation::Remotely,
            working_time: WorkingTime::FullTime,
            seniority_level: SeniorityLevel::Senior,
            job_description: "build services".into(),
            technical_skills: vec!["rust".into()],
            soft_skills: Vec::new(),
            added_by: added_by.into(),
            organization_id: organization_id.map(Into::into),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn creator_may_review_own_listing() {
        let ctx = context("aaaaaaaaaaaaaaaaaaaaaaaa", None);
        assert!(may_review(&ctx, &listing("aaaaaaaaaaaaaaaaaaaaaaaa", None)));
    }

    #[test]
    fn organization_owner_may_review_colleague_listing() {
        let ctx = context("aaaaaaaaaaaaaaaaaaaaaaaa", Some("cccccccccccccccccccccccc"));
        assert!(may_review(
            &ctx,
            &listing("bbbbbbbbbbbbbbbbbbbbbbbb", Some("cccccccccccccccccccccccc"))
        ));
    }

    #[test]
    fn strangers_are_refused() {
        let ctx = context("aaaaaaaaaaaaaaaaaaaaaaaa", Some("dddddddddddddddddddddddd"));
        assert!(!may_review(
            &ctx,
            &listing("bbbbbbbbbbbbbbbbbbbbbbbb", Some("cccccccccccccccccccccccc"))
        ));
        assert!(!may_review(&ctx, &listing("bbbbbbbbbbbbbbbbbbbbbbbb", None)));
    }
}
