use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::{AuthUser, MaybeUser},
    error::ApiError,
    handlers::require_admin,
    models::{
        ArtWork, ArtWorkChanges, ArtWorkResponse, ArtWorkWithArtist, Artist, LimitedArtWork,
        NewArtWork,
    },
    multipart::FormData,
    response::envelope,
    storage::storage_keys_from_urls,
    validate,
};

/// create_artwork
///
/// **Admin**: Registers an artwork from a multipart form. The referenced
/// artist must exist at creation time; the response expands the artist to a
/// short reference (name and email).
#[utoipa::path(
    post,
    path = "/api/v1/artworks",
    request_body(content_type = "multipart/form-data", description = "Fields: name, artistId, price, description; one or more image files"),
    responses(
        (status = 201, description = "Artwork created, artist expanded", body = ArtWorkResponse),
        (status = 400, description = "Missing field, bad price format, or no image"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Referenced artist not found")
    )
)]
pub async fn create_artwork(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(role, "add artworks")?;

    let mut form = FormData::read(multipart).await?;
    let name = form.require("name")?;
    let raw_artist_id = form.require("artistId")?;
    let price = form.require("price")?;
    let description = form.require("description")?;

    let artist_id = validate::parse_id(&raw_artist_id, "artist")?;
    validate::validate_price(&price)?;

    let artist = state
        .repo
        .get_artist(artist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist not found.".to_string()))?;

    let attachment = form.take_attachment().ok_or_else(|| {
        ApiError::InvalidInput("At least one artwork image is required.".to_string())
    })?;

    let images = state
        .storage
        .upload_many(&attachment.into_files(), "artworks")
        .await?;

    let artwork = state
        .repo
        .create_artwork(NewArtWork {
            name,
            images,
            artist_id,
            price,
            description,
        })
        .await?;

    tracing::info!("created artwork {} for artist {}", artwork.id, artist.id);

    Ok((
        StatusCode::CREATED,
        envelope(
            "Artwork added successfully.",
            "artwork",
            ArtWorkResponse::from_parts(artwork, &artist),
        ),
    ))
}

/// update_artwork
///
/// **Admin**: Merge-patches an artwork. A new `artistId` must point at an
/// existing artist; new files replace the whole image set, with the old
/// objects removed best-effort after the swap is stored.
#[utoipa::path(
    put,
    path = "/api/v1/artworks/{id}",
    params(("id" = String, Path, description = "Artwork id")),
    request_body(content_type = "multipart/form-data", description = "Any subset of the creation fields; files replace the full image set"),
    responses(
        (status = 200, description = "Artwork updated", body = ArtWork),
        (status = 400, description = "Invalid id, empty form, or bad field format"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Artwork or referenced artist not found")
    )
)]
pub async fn update_artwork(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(role, "edit artworks")?;
    let artwork_id = validate::parse_id(&id, "artwork")?;

    let mut form = FormData::read(multipart).await?;
    if form.is_empty() {
        return Err(ApiError::InvalidInput(
            "At least one field is required to update.".to_string(),
        ));
    }

    let existing = state
        .repo
        .get_artwork(artwork_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artwork not found.".to_string()))?;

    // A re-assignment only goes through when the target artist exists.
    let artist_id = match form.optional("artistId") {
        Some(raw) => {
            let parsed = validate::parse_id(&raw, "artist")?;
            state
                .repo
                .get_artist(parsed)
                .await?
                .ok_or_else(|| ApiError::NotFound("Artist not found.".to_string()))?;
            Some(parsed)
        }
        None => None,
    };

    let price = form.optional("price");
    if let Some(price) = price.as_deref() {
        validate::validate_price(price)?;
    }

    let new_images = match form.take_attachment() {
        Some(attachment) => Some(
            state
                .storage
                .upload_many(&attachment.into_files(), "artworks")
                .await?,
        ),
        None => None,
    };
    let replacing_images = new_images.is_some();

    let updated = state
        .repo
        .update_artwork(
            artwork_id,
            ArtWorkChanges {
                name: form.optional("name"),
                images: new_images,
                artist_id,
                price,
                description: form.optional("description"),
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Artwork not found.".to_string()))?;

    if replacing_images {
        let old_keys = storage_keys_from_urls(&existing.images);
        state.storage.delete_many(&old_keys).await;
    }

    Ok((
        StatusCode::OK,
        envelope("Artwork updated successfully.", "artwork", updated),
    ))
}

/// delete_artwork
///
/// **Admin**: Removes an artwork, then its stored images best-effort.
/// Exhibitions referencing the piece are left in place and expand to a null
/// artwork from then on.
#[utoipa::path(
    delete,
    path = "/api/v1/artworks/{id}",
    params(("id" = String, Path, description = "Artwork id")),
    responses(
        (status = 200, description = "Artwork deleted; the removed record is returned", body = ArtWork),
        (status = 400, description = "Invalid id"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Artwork not found")
    )
)]
pub async fn delete_artwork(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(role, "delete artworks")?;
    let artwork_id = validate::parse_id(&id, "artwork")?;

    let artwork = state
        .repo
        .delete_artwork(artwork_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artwork not found.".to_string()))?;

    let keys = storage_keys_from_urls(&artwork.images);
    state.storage.delete_many(&keys).await;

    tracing::info!("deleted artwork {}", artwork.id);

    Ok((
        StatusCode::OK,
        envelope("Artwork deleted successfully.", "artwork", artwork),
    ))
}

/// list_artworks_by_artist
///
/// **Public**: Every piece by one artist. The artist must exist; an artist
/// with no pieces yet answers with an empty list.
#[utoipa::path(
    get,
    path = "/api/v1/artworks/artist/{artistId}",
    params(("artistId" = String, Path, description = "Artist id")),
    responses(
        (status = 200, description = "The artist's artworks", body = Vec<ArtWork>),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Artist not found")
    )
)]
pub async fn list_artworks_by_artist(
    State(state): State<AppState>,
    Path(artist_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let artist_id = validate::parse_id(&artist_id, "artist")?;

    state
        .repo
        .get_artist(artist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist not found.".to_string()))?;

    let artworks = state.repo.list_artworks_by_artist(artist_id).await?;

    Ok((
        StatusCode::OK,
        envelope("Artworks fetched successfully.", "artworks", artworks),
    ))
}

/// list_artworks
///
/// **Public, shape depends on caller**: Admins receive full records with the
/// complete artist embedded; everyone else receives the same artworks with
/// the artist reduced to a name-and-description teaser. A dangling artist
/// reference expands to null in either shape.
#[utoipa::path(
    get,
    path = "/api/v1/artworks",
    responses(
        (status = 200, description = "All artworks; artist expansion depends on the caller's role", body = Vec<LimitedArtWork>)
    )
)]
pub async fn list_artworks(
    caller: MaybeUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let artworks = state.repo.list_artworks().await?;

    let mut artist_ids: Vec<Uuid> = artworks.iter().map(|piece| piece.artist_id).collect();
    artist_ids.sort_unstable();
    artist_ids.dedup();

    let artists: HashMap<Uuid, Artist> = state
        .repo
        .list_artists_by_ids(&artist_ids)
        .await?
        .into_iter()
        .map(|artist| (artist.id, artist))
        .collect();

    let body = if caller.is_admin() {
        let expanded: Vec<ArtWorkWithArtist> = artworks
            .into_iter()
            .map(|piece| {
                let artist = artists.get(&piece.artist_id).cloned();
                ArtWorkWithArtist::from_parts(piece, artist)
            })
            .collect();
        envelope("Artworks fetched successfully.", "artworks", expanded)
    } else {
        let limited: Vec<LimitedArtWork> = artworks
            .into_iter()
            .map(|piece| {
                let artist = artists.get(&piece.artist_id);
                LimitedArtWork::from_parts(piece, artist)
            })
            .collect();
        envelope("Artworks fetched successfully.", "artworks", limited)
    };

    Ok((StatusCode::OK, body))
}
