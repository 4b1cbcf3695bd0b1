//! Route definitions for the MSME Business Directory

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::middleware::{auth_middleware, require_admin};
use crate::services::upload::{UploadAccess, UPLOAD_DESTINATIONS};
use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        .nest("/msme", msme_routes(state.clone()))
        .nest("/admin", admin_routes())
        .nest("/uploads", upload_routes(state))
}

/// Business directory routes: public reads, member updates, admin moderation
fn msme_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route(
            "/",
            get(handlers::list_businesses).post(handlers::register_business),
        )
        .route("/login", post(handlers::login_user))
        .route("/email-exists/:email_address", get(handlers::check_email_exists))
        .route("/category/:business_category_id", get(handlers::list_businesses_by_category))
        .route(
            "/v2/category/:business_category_id",
            get(handlers::list_businesses_by_category_v2),
        )
        .route(
            "/search/name/:name_of_organization",
            get(handlers::search_businesses_by_name),
        )
        .route("/search/region/:region", get(handlers::search_businesses_by_region))
        .route("/filters", get(handlers::filter_businesses))
        .route(
            "/forgot-password/:email_address",
            post(handlers::forgot_password_send),
        )
        .route(
            "/forgot-password/:email_address/verify/:otp",
            post(handlers::forgot_password_verify),
        )
        .route("/reset-password", post(handlers::reset_password))
        .route("/:id", get(handlers::get_business_details));

    // Ownership of the record is checked in the handler
    let member = Router::new()
        .route("/:id", put(handlers::update_business))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin = Router::new()
        .route("/web/:is_verified", get(handlers::list_businesses_by_status))
        .route("/export", get(handlers::export_businesses))
        .route("/verify/:id", put(handlers::verify_business))
        .route("/:id", delete(handlers::delete_business))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(member).merge(admin)
}

/// Administrator routes (public login)
fn admin_routes() -> Router<AppState> {
    Router::new().route("/login", post(handlers::login_admin))
}

/// One route per upload destination, each with its own body limit
fn upload_routes(state: AppState) -> Router<AppState> {
    let mut public = Router::new();
    let mut admin = Router::new();

    for dest in UPLOAD_DESTINATIONS.iter() {
        let handler = post(move |state: State<AppState>, multipart: Multipart| {
            handlers::upload_file(dest, state, multipart)
        })
        .layer(DefaultBodyLimit::max(dest.body_limit()));

        match dest.access {
            UploadAccess::Public => public = public.route(dest.path, handler),
            UploadAccess::Admin => admin = admin.route(dest.path, handler),
        }
    }

    let admin = admin
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(admin)
}
