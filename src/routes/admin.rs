use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, post, put},
};

/// Admin Router Module
///
/// Defines the mutating routes reserved for users with the 'admin' role.
/// The routes share their paths with the public catalogue (POST /artists
/// lives next to GET /artists) rather than living under an /admin prefix,
/// so this router is merged unlayered and each handler enforces the role
/// itself via `require_admin` before doing any work.
///
/// Access Control:
/// Every handler takes the `AuthUser` extractor, which rejects requests
/// without a valid token, and then checks `role == Role::Admin` as its
/// first statement. A visitor with a valid session gets 403 before any
/// parsing, lookup, or upload happens.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Artist Management ---
        // POST /artists
        // Registers a new artist with a required portrait image upload.
        .route("/artists", post(handlers::artists::create_artist))
        // PUT/DELETE /artists/{id}
        // Merge-patch update (optionally replacing the portrait) and removal.
        // Deleting an artist does NOT cascade to their artworks.
        .route(
            "/artists/{id}",
            put(handlers::artists::update_artist).delete(handlers::artists::delete_artist),
        )
        // --- ArtWork Management ---
        // POST /artworks
        // Catalogues a new artwork with one or more images. The owning artist
        // must already exist.
        .route("/artworks", post(handlers::artworks::create_artwork))
        // PUT/DELETE /artworks/{id}
        // Merge-patch update (optionally replacing the whole image set) and
        // removal. Stored images are cleaned up best-effort after the row is gone.
        .route(
            "/artworks/{id}",
            put(handlers::artworks::update_artwork).delete(handlers::artworks::delete_artwork),
        )
        // --- Exhibition Management ---
        // POST /exhibitions
        // Schedules an exhibition. The date range and the artist/artwork
        // pairing are validated before the row is written.
        .route("/exhibitions", post(handlers::exhibitions::create_exhibition))
        // PUT/DELETE /exhibitions/{id}
        // Merge-patch update that re-validates the merged date range and the
        // merged pairing whenever either reference moves.
        .route(
            "/exhibitions/{id}",
            put(handlers::exhibitions::update_exhibition)
                .delete(handlers::exhibitions::delete_exhibition),
        )
        // --- Banner Management ---
        // POST /banners
        // Uploads a homepage banner image with its link metadata.
        .route("/banners", post(handlers::banners::create_banner))
        // PUT/DELETE /banners/{id}
        .route(
            "/banners/{id}",
            put(handlers::banners::update_banner).delete(handlers::banners::delete_banner),
        )
        // --- Contact Moderation ---
        // DELETE /contacts/{id}
        // Removes a contact inquiry once it has been handled.
        .route("/contacts/{id}", delete(handlers::contacts::delete_contact))
}
