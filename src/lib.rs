use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, HeaderValue, Method, header},
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod models;
pub mod multipart;
pub mod repository;
pub mod response;
pub mod storage;
pub mod validate;

// Module for routing segregation (Public, Session, Admin).
pub mod routes;
use auth::AuthUser; // The resolved authenticated user identity.
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::{AppConfig, Env};
pub use error::ApiError;
pub use mailer::{HttpMailer, MailerState, MockMailer};
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// This struct auto-generates the OpenAPI documentation (Swagger JSON) for the application.
/// It aggregates all API paths and data schemas that have been decorated with
/// the `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    // List all public handler functions here for documentation generation.
    paths(
        handlers::users::register_user, handlers::users::login_user,
        handlers::users::logout_user, handlers::users::current_session,
        handlers::artists::create_artist, handlers::artists::update_artist,
        handlers::artists::delete_artist, handlers::artists::get_artist,
        handlers::artists::list_artists,
        handlers::artworks::create_artwork, handlers::artworks::update_artwork,
        handlers::artworks::delete_artwork, handlers::artworks::list_artworks_by_artist,
        handlers::artworks::list_artworks,
        handlers::exhibitions::create_exhibition, handlers::exhibitions::update_exhibition,
        handlers::exhibitions::delete_exhibition, handlers::exhibitions::get_exhibition,
        handlers::exhibitions::list_exhibitions,
        handlers::banners::create_banner, handlers::banners::update_banner,
        handlers::banners::delete_banner, handlers::banners::list_banners,
        handlers::contacts::create_contact, handlers::contacts::delete_contact,
        handlers::contacts::list_contacts,
    ),
    // List all models (schemas) used in the request/response bodies.
    components(
        schemas(
            models::Role, models::User, models::Artist, models::ArtWork,
            models::Exhibition, models::Banner, models::Contact,
            models::RegisterUserRequest, models::LoginRequest,
            models::CreateContactRequest, models::CreateExhibitionRequest,
            models::UpdateExhibitionRequest,
            models::PublicArtist, models::ArtistRef, models::ArtistTeaser,
            models::ArtWorkResponse, models::ArtWorkWithArtist, models::LimitedArtWork,
            models::ExhibitionWithArtWork,
        )
    ),
    tags(
        (name = "gallery-cms", description = "Art Gallery CMS API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**. This is the single, thread-safe, and immutable
/// container holding all essential application services and configuration.
/// The application state is shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: Abstracts database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Storage Layer: Abstracts S3/MinIO access for image uploads and deletes.
    pub storage: StorageState,
    /// Mailer Layer: Abstracts the outbound notification email service.
    pub mailer: MailerState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow handlers to selectively pull components from the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for MailerState {
    fn from_ref(app_state: &AppState) -> MailerState {
        app_state.mailer.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// A middleware function that enforces authentication for the `session_routes`.
///
/// *Mechanism*: It attempts to extract `AuthUser` from the request. Since `AuthUser`
/// implements `FromRequestParts`, if authentication (JWT validation, DB lookup) fails,
/// the extractor immediately rejects the request with a 401 Unauthorized status,
/// preventing execution of the handler. If successful, it allows the request to proceed.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and scoped middleware,
/// and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration (origin-restricted so session cookies survive browsers).
    let cors = build_cors(&state.config);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. API Route Assembly
    // Public, session-gated, and admin routers all share the `/api/v1` prefix.
    // The admin router is merged without a middleware layer because its paths
    // overlap with public ones (GET /artists vs POST /artists); the role check
    // lives at the top of every admin handler instead.
    let api_routes = Router::new()
        // Public Routes: No middleware applied.
        .merge(public::public_routes())
        // Session Routes: Protected by the `auth_middleware`.
        .merge(
            authenticated::session_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Admin Routes: Role enforcement happens inside each handler.
        .merge(admin::admin_routes());

    // 3. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // All API traffic is versioned under a single prefix.
        .nest("/api/v1", api_routes)
        // Apply the Unified State to all routes.
        .with_state(state);

    // 4. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 4a. Request ID Generation: Generates a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 4b. Request Tracing: Wraps the entire request/response lifecycle in a tracing span.
                // Uses the `trace_span_logger` to include the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 4c. Request ID Propagation: Ensures the generated x-request-id header is
                // returned to the client and injected into subsequent service calls.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 5. CORS Layer (Applied last so preflight requests short-circuit here)
        .layer(cors)
}

/// build_cors
///
/// Builds the CORS layer from the configured frontend origin. Cookie-based
/// authentication requires `allow_credentials(true)`, which tower-http forbids
/// in combination with wildcard origins/methods/headers, so the allowed values
/// are spelled out. If the configured origin is not a valid header value the
/// layer falls back to a permissive, credential-less policy.
fn build_cors(config: &AppConfig) -> CorsLayer {
    match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(_) => {
            tracing::warn!(
                origin = %config.cors_origin,
                "invalid CORS origin, falling back to permissive policy without credentials"
            );
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// trace_span_logger
///
/// Helper function used by `TraceLayer` to customize the tracing span creation.
/// It extracts the `x-request-id` header (if present) and includes it in the
/// structured logging metadata alongside the HTTP method and URI.
///
/// *Goal*: Ensure every log line for a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    // The structured log format used by the tracing macros.
    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
