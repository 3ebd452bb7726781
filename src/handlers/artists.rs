use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    auth::{AuthUser, MaybeUser},
    error::ApiError,
    handlers::require_admin,
    models::{Artist, ArtistChanges, NewArtist, PublicArtist},
    multipart::FormData,
    response::envelope,
    storage::storage_keys_from_urls,
    validate,
};

/// create_artist
///
/// **Admin**: Registers an artist from a multipart form. The order of
/// operations is deliberate: authorization, then field and format checks,
/// then the duplicate-email check, and only after everything else has passed
/// are the images uploaded and the record persisted. An upload failure
/// therefore never leaves a record behind, and a validation failure never
/// leaves objects behind.
#[utoipa::path(
    post,
    path = "/api/v1/artists",
    request_body(content_type = "multipart/form-data", description = "Fields: firstName, lastName, email, dateOfBirth, presentAddress, description; one or more image files"),
    responses(
        (status = 201, description = "Artist created", body = Artist),
        (status = 400, description = "Missing field, bad email/date format, or no image"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "An artist with this email already exists")
    )
)]
pub async fn create_artist(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(role, "add artists")?;

    let mut form = FormData::read(multipart).await?;
    let first_name = form.require("firstName")?;
    let last_name = form.require("lastName")?;
    let email = form.require("email")?;
    let raw_dob = form.require("dateOfBirth")?;
    let present_address = form.require("presentAddress")?;
    let description = form.require("description")?;

    validate::validate_email(&email)?;
    let date_of_birth = validate::parse_artist_dob(&raw_dob)?;

    if state.repo.find_artist_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(
            "An artist with this email already exists.".to_string(),
        ));
    }

    let attachment = form.take_attachment().ok_or_else(|| {
        ApiError::InvalidInput("At least one artist image is required.".to_string())
    })?;

    let images = state
        .storage
        .upload_many(&attachment.into_files(), "artists")
        .await?;

    let artist = state
        .repo
        .create_artist(NewArtist {
            first_name,
            last_name,
            email,
            images,
            date_of_birth,
            present_address,
            description,
        })
        .await?;

    tracing::info!("created artist {}", artist.id);

    Ok((
        StatusCode::CREATED,
        envelope("Artist added successfully.", "artist", artist),
    ))
}

/// update_artist
///
/// **Admin**: Merge-patches an artist. Replacement images are uploaded
/// *before* the record is touched and the old objects are removed only after
/// the swap is stored, so a failure at any point leaves the record pointing
/// at images that exist. Old-object removal is best-effort.
#[utoipa::path(
    put,
    path = "/api/v1/artists/{id}",
    params(("id" = String, Path, description = "Artist id")),
    request_body(content_type = "multipart/form-data", description = "Any subset of the creation fields; files replace the full image set"),
    responses(
        (status = 200, description = "Artist updated", body = Artist),
        (status = 400, description = "Invalid id, empty form, or bad field format"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Artist not found")
    )
)]
pub async fn update_artist(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(role, "edit artists")?;
    let artist_id = validate::parse_id(&id, "artist")?;

    let mut form = FormData::read(multipart).await?;
    if form.is_empty() {
        return Err(ApiError::InvalidInput(
            "At least one field is required to update.".to_string(),
        ));
    }

    let existing = state
        .repo
        .get_artist(artist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist not found.".to_string()))?;

    let email = form.optional("email");
    if let Some(email) = email.as_deref() {
        validate::validate_email(email)?;
        if let Some(holder) = state.repo.find_artist_by_email(email).await? {
            if holder.id != artist_id {
                return Err(ApiError::Conflict(
                    "An artist with this email already exists.".to_string(),
                ));
            }
        }
    }

    let date_of_birth = match form.optional("dateOfBirth") {
        Some(raw) => Some(validate::parse_artist_dob(&raw)?),
        None => None,
    };

    let new_images = match form.take_attachment() {
        Some(attachment) => Some(
            state
                .storage
                .upload_many(&attachment.into_files(), "artists")
                .await?,
        ),
        None => None,
    };
    let replacing_images = new_images.is_some();

    let updated = state
        .repo
        .update_artist(
            artist_id,
            ArtistChanges {
                first_name: form.optional("firstName"),
                last_name: form.optional("lastName"),
                email,
                images: new_images,
                date_of_birth,
                present_address: form.optional("presentAddress"),
                description: form.optional("description"),
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist not found.".to_string()))?;

    if replacing_images {
        let old_keys = storage_keys_from_urls(&existing.images);
        state.storage.delete_many(&old_keys).await;
    }

    Ok((
        StatusCode::OK,
        envelope("Artist updated successfully.", "artist", updated),
    ))
}

/// delete_artist
///
/// **Admin**: Removes an artist and then their stored images, best-effort.
/// The artist's artworks are deliberately left untouched; their records keep
/// referencing the removed artist.
#[utoipa::path(
    delete,
    path = "/api/v1/artists/{id}",
    params(("id" = String, Path, description = "Artist id")),
    responses(
        (status = 200, description = "Artist deleted; the removed record is returned", body = Artist),
        (status = 400, description = "Invalid id"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Artist not found")
    )
)]
pub async fn delete_artist(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(role, "delete artists")?;
    let artist_id = validate::parse_id(&id, "artist")?;

    let artist = state
        .repo
        .delete_artist(artist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist not found.".to_string()))?;

    let keys = storage_keys_from_urls(&artist.images);
    state.storage.delete_many(&keys).await;

    tracing::info!("deleted artist {}", artist.id);

    Ok((
        StatusCode::OK,
        envelope("Artist deleted successfully.", "artist", artist),
    ))
}

/// get_artist
///
/// **Public**: Fetches one artist. Admin callers see the full record;
/// everyone else gets it with the email redacted.
#[utoipa::path(
    get,
    path = "/api/v1/artists/{id}",
    params(("id" = String, Path, description = "Artist id")),
    responses(
        (status = 200, description = "The artist; email only for admins", body = PublicArtist),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Artist not found")
    )
)]
pub async fn get_artist(
    caller: MaybeUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let artist_id = validate::parse_id(&id, "artist")?;

    let artist = state
        .repo
        .get_artist(artist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist not found.".to_string()))?;

    let body = if caller.is_admin() {
        envelope("Artist fetched successfully.", "artist", artist)
    } else {
        envelope(
            "Artist fetched successfully.",
            "artist",
            PublicArtist::from(artist),
        )
    };

    Ok((StatusCode::OK, body))
}

/// list_artists
///
/// **Public**: All artists, newest first. An empty gallery is an empty list,
/// not an error.
#[utoipa::path(
    get,
    path = "/api/v1/artists",
    responses(
        (status = 200, description = "All artists", body = Vec<Artist>)
    )
)]
pub async fn list_artists(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let artists = state.repo.list_artists().await?;

    Ok((
        StatusCode::OK,
        envelope("Artists fetched successfully.", "artists", artists),
    ))
}
