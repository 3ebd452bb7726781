use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints accessible to any client, anonymous or logged-in:
/// registration and login, the contact form, and the read side of the
/// gallery content.
///
/// Two of these routes are identity-aware without requiring one: the artwork
/// listing and the single-artist fetch resolve an optional caller and widen
/// their response shape for admins. A bad credential on them degrades to
/// anonymous instead of rejecting.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load
        // balancer checks. Returns "ok" immediately.
        .route("/health", get(|| async { "ok" }))
        // POST /users/register
        // New account creation. The optional role field defaults to visitor.
        .route("/users/register", post(handlers::users::register_user))
        // POST /users/login
        // Credential check; issues the access token as cookie and body field.
        .route("/users/login", post(handlers::users::login_user))
        // GET /artists
        // All artists, newest first.
        .route("/artists", get(handlers::artists::list_artists))
        // GET /artists/{id}
        // One artist. Email included only when the caller is an admin.
        .route("/artists/{id}", get(handlers::artists::get_artist))
        // GET /artworks
        // All artworks. Admins get full records with the artist embedded;
        // everyone else gets the limited shape with an artist teaser.
        .route("/artworks", get(handlers::artworks::list_artworks))
        // GET /artworks/artist/{artistId}
        // Every piece by one artist; 404 when the artist does not exist.
        .route(
            "/artworks/artist/{artistId}",
            get(handlers::artworks::list_artworks_by_artist),
        )
        // GET /exhibitions
        // All exhibitions with their artwork embedded.
        .route("/exhibitions", get(handlers::exhibitions::list_exhibitions))
        // GET /exhibitions/{id}
        // One exhibition with its artwork embedded.
        .route(
            "/exhibitions/{id}",
            get(handlers::exhibitions::get_exhibition),
        )
        // GET /banners
        // All homepage banners.
        .route("/banners", get(handlers::banners::list_banners))
        // POST /contacts + GET /contacts
        // The visitor inquiry form and the inquiry listing. Submitting may
        // also notify the gallery inbox (newsletter opt-in only).
        .route(
            "/contacts",
            post(handlers::contacts::create_contact).get(handlers::contacts::list_contacts),
        )
}
