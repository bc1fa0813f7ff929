use std::collections::HashMap;
use std::path::{Path as FsPath, PathBuf};

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::{Map, Value};

use crate::{
    database::filter::QueryDescriptor,
    dto::{
        listing_dto::{
            AddJobPayload, ApplyPayload, ByCompanyQuery, CandidacyResponse, JobIdParams,
            UpdateJobPayload,
        },
        present, ApiResponse,
    },
    error::{Error, Result},
    middleware::{
        auth::RequestContext,
        funnel::UploadLedger,
        validate::{validate_sources, Sources, Validated},
    },
    models::candidacy::CandidacyDraft,
    utils::messages::{already_exists, created, deleted, not_found, updated},
    AppState,
};

pub const RESUME_FIELD: &str = "userResume";
const RESUME_FOLDER: &str = "resumes";

pub fn check_resume(content_type: Option<&str>, bytes: &[u8]) -> Result<()> {
    if content_type != Some("application/pdf") {
        return Err(Error::BadRequest(format!("{} must be a PDF document", RESUME_FIELD)));
    }
    if !bytes.starts_with(b"%PDF") {
        return Err(Error::BadRequest("Invalid PDF file content".to_string()));
    }
    Ok(())
}

async fn stage_resume(uploads_dir: &FsPath, bytes: &[u8]) -> Result<PathBuf> {
    let staging = uploads_dir.join("staging");
    tokio::fs::create_dir_all(&staging).await?;
    let path = staging.join(format!("{}.pdf", uuid::Uuid::new_v4()));
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

#[utoipa::path(
    post,
    path = "/api/job/add-job",
    responses(
        (status = 201, description = "Listing created"),
        (status = 404, description = "Caller owns no company"),
        (status = 409, description = "Caller already posted a listing with that title")
    )
)]
pub async fn add_job(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Validated(payload): Validated<AddJobPayload>,
) -> Result<impl IntoResponse> {
    let organization = context
        .organization
        .as_ref()
        .ok_or_else(|| Error::NotFound(not_found("company")))?;
    let draft = payload.into_draft()?;

    if state
        .listing_service
        .title_taken(&draft.job_title, &context.account.id)
        .await?
    {
        return Err(Error::Conflict(already_exists("job")));
    }

    let listing = state
        .listing_service
        .create(&context.account.id, &organization.id, draft)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(listing).with_message(created("job"))),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/job/update-job/{jobId}",
    params(
        ("jobId" = String, Path, description = "24 character listing id")
    ),
    responses(
        (status = 200, description = "Listing updated"),
        (status = 404, description = "Caller has no listing with that id")
    )
)]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Validated(payload): Validated<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    let (job_id, patch) = payload.into_parts()?;
    let listing = state
        .listing_service
        .update(&job_id, &context.account.id, patch)
        .await?
        .ok_or_else(|| Error::NotFound(not_found("job")))?;
    Ok(Json(ApiResponse::data(listing).with_message(updated("job"))))
}

#[utoipa::path(
    delete,
    path = "/api/job/delete-job/{jobId}",
    params(
        ("jobId" = String, Path, description = "24 character listing id")
    ),
    responses(
        (status = 200, description = "Listing and its applications removed"),
        (status = 404, description = "Caller has no listing with that id")
    )
)]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Validated(params): Validated<JobIdParams>,
) -> Result<impl IntoResponse> {
    let job_id = present(params.job_id, "jobId")?;
    if !state
        .listing_service
        .delete(&job_id, &context.account.id)
        .await?
    {
        return Err(Error::NotFound(not_found("job")));
    }
    Ok(Json(ApiResponse::message(deleted("job"))))
}

/// Pagination, sorting, projection and filters all come from the query string.
#[utoipa::path(
    get,
    path = "/api/job",
    params(
        ("page" = Option<i64>, Query, description = "1-based page, default 1"),
        ("size" = Option<i64>, Query, description = "page size, default 3"),
        ("sort" = Option<String>, Query, description = "comma separated fields, `-` prefix for descending"),
        ("select" = Option<String>, Query, description = "comma separated fields to return")
    ),
    responses(
        (status = 200, description = "Listings with their company"),
        (status = 400, description = "Unknown field or malformed filter")
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    descriptor: QueryDescriptor,
) -> Result<impl IntoResponse> {
    let listings = state.listing_service.list(&descriptor).await?;
    Ok(Json(ApiResponse::data(listings)))
}

#[utoipa::path(
    get,
    path = "/api/job/by-company",
    params(
        ("companyName" = String, Query, description = "Exact company name")
    ),
    responses(
        (status = 200, description = "Listings of the company with their creator"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn by_company(
    State(state): State<AppState>,
    Validated(query): Validated<ByCompanyQuery>,
) -> Result<impl IntoResponse> {
    let company_name = present(query.company_name, "companyName")?;
    let organization = state
        .organization_service
        .find_by_name(&company_name)
        .await?
        .ok_or_else(|| Error::NotFound(not_found("company")))?;
    let listings = state.listing_service.by_organization(&organization.id).await?;
    Ok(Json(ApiResponse::data(listings)))
}

/// Multipart form: `userResume` (PDF) plus `userTechSkills` and `userSoftSkills`.
///
/// The resume is staged locally and uploaded only after every check passes; both copies are
/// recorded on the request's [`UploadLedger`] so a failure further down is rolled back.
#[utoipa::path(
    post,
    path = "/api/job/apply/{jobId}",
    params(
        ("jobId" = String, Path, description = "24 character listing id")
    ),
    responses(
        (status = 201, description = "Application stored"),
        (status = 400, description = "Invalid form or resume"),
        (status = 404, description = "Listing not found"),
        (status = 409, description = "Caller already applied")
    )
)]
pub async fn apply(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Extension(ledger): Extension<UploadLedger>,
    Path(job_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut body = Map::new();
    let mut resume: Option<PathBuf> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == RESUME_FIELD {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            check_resume(content_type.as_deref(), &bytes)?;
            let staged = stage_resume(&state.uploads_dir, &bytes).await?;
            ledger.stage_local(staged.clone()).await;
            resume = Some(staged);
        } else {
            let text = field.text().await?;
            body.insert(name, Value::String(text));
        }
    }

    let payload = validate_sources::<ApplyPayload>(Sources {
        body,
        path: HashMap::from([("jobId".to_string(), job_id)]),
        query: Vec::new(),
    })?;
    let job_id = present(payload.job_id, "jobId")?;
    let tech_skills = present(payload.user_tech_skills, "userTechSkills")?.into_list()?;
    let soft_skills = present(payload.user_soft_skills, "userSoftSkills")?.into_list()?;

    let listing = state
        .listing_service
        .find_by_id(&job_id)
        .await?
        .ok_or_else(|| Error::NotFound(not_found("job")))?;
    if state
        .candidacy_service
        .exists(&listing.id, &context.account.id)
        .await?
    {
        return Err(Error::Conflict(already_exists("application")));
    }
    let resume = resume.ok_or_else(|| Error::BadRequest(format!("{} is required", RESUME_FIELD)))?;

    let stored = state.storage.upload(&resume, RESUME_FOLDER).await?;
    ledger.stage_remote(stored.public_id.clone()).await;

    let candidacy = state
        .candidacy_service
        .create(CandidacyDraft {
            listing_id: listing.id,
            account_id: context.account.id.clone(),
            tech_skills,
            soft_skills,
            resume: stored,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(CandidacyResponse::from(candidacy)).with_message(created("application"))),
    ))
}
