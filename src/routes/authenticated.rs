use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Session Router Module
///
/// Defines the routes that require a valid session but no particular role.
/// These routes are mounted behind the `auth_middleware` layer, so every
/// request reaching a handler here has already presented a valid access
/// token (cookie or bearer) and resolved to a live user row.
///
/// Access Control Strategy:
/// The `AuthUser` extractor runs again inside each handler; the middleware
/// layer exists so that a missing or expired token is rejected before the
/// handler body executes.
pub fn session_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /users/logout
        // Ends the current session by overwriting the `accessToken` cookie
        // with an empty, immediately-expiring value.
        .route("/users/logout", post(handlers::users::logout_user))
        // GET /users/session
        // Returns the profile of the currently authenticated user, resolved
        // fresh from the database rather than from token claims.
        .route("/users/session", get(handlers::users::current_session))
}
