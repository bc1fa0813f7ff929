pub mod account;
pub mod auth;
pub mod health;
pub mod listing;
pub mod organization;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    middleware::{
        auth::{admin_or_hr, authenticate, hr_only, hr_or_user, user_only},
        cors::api_cors,
        funnel::error_funnel,
    },
    AppState,
};

/// Authentication only.
macro_rules! signed_in {
    ($state:expr, $route:expr) => {
        $route.route_layer(from_fn_with_state($state.clone(), authenticate))
    };
}

/// Authentication, then the role policy.
macro_rules! guarded {
    ($state:expr, $route:expr, $policy:path) => {
        $route
            .route_layer(from_fn_with_state($state.clone(), $policy))
            .route_layer(from_fn_with_state($state.clone(), authenticate))
    };
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/verify/:token", get(auth::verify))
        .route(
            "/forget-password",
            post(auth::forget_password).patch(auth::reset_password),
        )
        .route("/logout", signed_in!(state, get(auth::logout)))
}

fn account_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/update-account",
            signed_in!(state, patch(account::update_account)),
        )
        .route(
            "/delete-account",
            signed_in!(state, delete(account::delete_account)),
        )
        .route("/my-account", signed_in!(state, get(account::my_account)))
        .route(
            "/change-password",
            signed_in!(state, patch(account::change_password)),
        )
        .route("/recovery-account", post(account::recovery_accounts))
        .route("/:userId", get(account::public_profile))
}

fn organization_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/add-company",
            guarded!(state, post(organization::add_company), admin_or_hr),
        )
        .route(
            "/update-company",
            guarded!(state, patch(organization::update_company), hr_only),
        )
        .route(
            "/delete-company",
            guarded!(state, delete(organization::delete_company), hr_only),
        )
        .route(
            "/get-company",
            guarded!(state, post(organization::get_company_by_name), hr_or_user),
        )
        .route(
            "/job-applications/:jobId",
            guarded!(state, get(organization::job_applications), hr_only),
        )
        .route(
            "/:id",
            guarded!(state, get(organization::get_company), hr_only),
        )
}

fn listing_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", guarded!(state, get(listing::list_jobs), hr_or_user))
        .route(
            "/add-job",
            guarded!(state, post(listing::add_job), hr_only),
        )
        .route(
            "/update-job/:jobId",
            guarded!(state, patch(listing::update_job), hr_only),
        )
        .route(
            "/delete-job/:jobId",
            guarded!(state, delete(listing::delete_job), hr_only),
        )
        .route(
            "/by-company",
            guarded!(state, get(listing::by_company), hr_or_user),
        )
        .route(
            "/apply/:jobId",
            guarded!(state, post(listing::apply), user_only),
        )
}

/// The whole HTTP surface. The error funnel sits outside everything but CORS and tracing so that
/// panics, body-limit rejections and extractor failures all leave in the same shape.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    let uploads = ServeDir::new(&state.uploads_dir);
    let store = state.storage.clone();

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/auth", auth_routes(&state))
        .nest("/api/user", account_routes(&state))
        .nest("/api/company", organization_routes(&state))
        .nest("/api/job", listing_routes(&state))
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CatchPanicLayer::new())
        .layer(from_fn_with_state(store, error_funnel))
        .layer(TraceLayer::new_for_http())
        .layer(api_cors())
}
