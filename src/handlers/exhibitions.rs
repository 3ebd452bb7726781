use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    handlers::{require_admin, require_field},
    models::{
        ArtWork, CreateExhibitionRequest, Exhibition, ExhibitionChanges, ExhibitionWithArtWork,
        NewExhibition, UpdateExhibitionRequest,
    },
    response::envelope,
    validate,
};

/// Confirms the artist exists and the artwork belongs to them. Exhibitions
/// may only ever pair an artist with their own piece, and the check always
/// runs against fresh lookups.
async fn check_pairing(state: &AppState, artist_id: Uuid, artwork_id: Uuid) -> Result<(), ApiError> {
    state
        .repo
        .get_artist(artist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist not found.".to_string()))?;

    state
        .repo
        .find_artwork_owned_by(artwork_id, artist_id)
        .await?
        .ok_or_else(|| {
            ApiError::InvalidInput("Artwork does not belong to this artist.".to_string())
        })?;

    Ok(())
}

/// create_exhibition
///
/// **Admin**: Schedules an exhibition. Both dates must parse, the end may not
/// precede the start (a single-day exhibition is fine), and the artwork must
/// belong to the artist.
#[utoipa::path(
    post,
    path = "/api/v1/exhibitions",
    request_body = CreateExhibitionRequest,
    responses(
        (status = 201, description = "Exhibition created", body = Exhibition),
        (status = 400, description = "Missing field, bad date, reversed range, or mismatched pairing"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Referenced artist not found")
    )
)]
pub async fn create_exhibition(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateExhibitionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(role, "add exhibitions")?;

    let raw_artist_id = require_field(payload.artist_id.as_deref(), "artistId")?;
    let raw_artwork_id = require_field(payload.artwork_id.as_deref(), "artworkId")?;
    let raw_start = require_field(payload.start_date.as_deref(), "startDate")?;
    let raw_end = require_field(payload.end_date.as_deref(), "endDate")?;
    let description = require_field(payload.description.as_deref(), "description")?;

    let artist_id = validate::parse_id(&raw_artist_id, "artist")?;
    let artwork_id = validate::parse_id(&raw_artwork_id, "artwork")?;
    let start_date = validate::parse_exhibition_date(&raw_start)?;
    let end_date = validate::parse_exhibition_date(&raw_end)?;

    if end_date < start_date {
        return Err(ApiError::InvalidInput(
            "End date cannot be before start date.".to_string(),
        ));
    }

    check_pairing(&state, artist_id, artwork_id).await?;

    let exhibition = state
        .repo
        .create_exhibition(NewExhibition {
            artist_id,
            artwork_id,
            start_date,
            end_date,
            description,
        })
        .await?;

    tracing::info!("created exhibition {}", exhibition.id);

    Ok((
        StatusCode::CREATED,
        envelope("Exhibition added successfully.", "exhibition", exhibition),
    ))
}

/// update_exhibition
///
/// **Admin**: Merge-patches an exhibition. Date and pairing rules are
/// re-validated against the post-update values: a patch that touches either
/// date is checked against the merged range, and a patch that touches either
/// reference re-proves ownership for the merged pair.
#[utoipa::path(
    put,
    path = "/api/v1/exhibitions/{id}",
    params(("id" = String, Path, description = "Exhibition id")),
    request_body = UpdateExhibitionRequest,
    responses(
        (status = 200, description = "Exhibition updated", body = Exhibition),
        (status = 400, description = "Invalid id, empty patch, bad date, reversed range, or mismatched pairing"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Exhibition or referenced artist not found")
    )
)]
pub async fn update_exhibition(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateExhibitionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(role, "edit exhibitions")?;
    let exhibition_id = validate::parse_id(&id, "exhibition")?;

    if payload.is_empty() {
        return Err(ApiError::InvalidInput(
            "At least one field is required to update.".to_string(),
        ));
    }

    let existing = state
        .repo
        .get_exhibition(exhibition_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Exhibition not found.".to_string()))?;

    let artist_id = match payload.artist_id.as_deref() {
        Some(raw) => Some(validate::parse_id(raw, "artist")?),
        None => None,
    };
    let artwork_id = match payload.artwork_id.as_deref() {
        Some(raw) => Some(validate::parse_id(raw, "artwork")?),
        None => None,
    };
    let start_date = match payload.start_date.as_deref() {
        Some(raw) => Some(validate::parse_exhibition_date(raw)?),
        None => None,
    };
    let end_date = match payload.end_date.as_deref() {
        Some(raw) => Some(validate::parse_exhibition_date(raw)?),
        None => None,
    };

    // Range check against the values the row will hold after the patch.
    let merged_start = start_date.unwrap_or(existing.start_date);
    let merged_end = end_date.unwrap_or(existing.end_date);
    if merged_end < merged_start {
        return Err(ApiError::InvalidInput(
            "End date cannot be before start date.".to_string(),
        ));
    }

    // Pairing check for the post-update pair whenever either side moves.
    if artist_id.is_some() || artwork_id.is_some() {
        let merged_artist = artist_id.unwrap_or(existing.artist_id);
        let merged_artwork = artwork_id.unwrap_or(existing.artwork_id);
        check_pairing(&state, merged_artist, merged_artwork).await?;
    }

    let updated = state
        .repo
        .update_exhibition(
            exhibition_id,
            ExhibitionChanges {
                artist_id,
                artwork_id,
                start_date,
                end_date,
                description: payload.description,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Exhibition not found.".to_string()))?;

    Ok((
        StatusCode::OK,
        envelope("Exhibition updated successfully.", "exhibition", updated),
    ))
}

/// delete_exhibition
///
/// **Admin**: Removes an exhibition. Nothing else is touched; exhibitions
/// own no storage objects.
#[utoipa::path(
    delete,
    path = "/api/v1/exhibitions/{id}",
    params(("id" = String, Path, description = "Exhibition id")),
    responses(
        (status = 200, description = "Exhibition deleted; the removed record is returned", body = Exhibition),
        (status = 400, description = "Invalid id"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Exhibition not found")
    )
)]
pub async fn delete_exhibition(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(role, "delete exhibitions")?;
    let exhibition_id = validate::parse_id(&id, "exhibition")?;

    let exhibition = state
        .repo
        .delete_exhibition(exhibition_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Exhibition not found.".to_string()))?;

    tracing::info!("deleted exhibition {}", exhibition.id);

    Ok((
        StatusCode::OK,
        envelope("Exhibition deleted successfully.", "exhibition", exhibition),
    ))
}

/// get_exhibition
///
/// **Public**: Fetches one exhibition with its artwork embedded. A reference
/// to a piece that has since been removed embeds as null.
#[utoipa::path(
    get,
    path = "/api/v1/exhibitions/{id}",
    params(("id" = String, Path, description = "Exhibition id")),
    responses(
        (status = 200, description = "The exhibition with its artwork", body = ExhibitionWithArtWork),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Exhibition not found")
    )
)]
pub async fn get_exhibition(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let exhibition_id = validate::parse_id(&id, "exhibition")?;

    let exhibition = state
        .repo
        .get_exhibition(exhibition_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Exhibition not found.".to_string()))?;

    let artwork = state.repo.get_artwork(exhibition.artwork_id).await?;

    Ok((
        StatusCode::OK,
        envelope(
            "Exhibition fetched successfully.",
            "exhibition",
            ExhibitionWithArtWork::from_parts(exhibition, artwork),
        ),
    ))
}

/// list_exhibitions
///
/// **Public**: All exhibitions, newest first, each with its artwork embedded.
#[utoipa::path(
    get,
    path = "/api/v1/exhibitions",
    responses(
        (status = 200, description = "All exhibitions with artworks", body = Vec<ExhibitionWithArtWork>)
    )
)]
pub async fn list_exhibitions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let exhibitions = state.repo.list_exhibitions().await?;

    let mut artwork_ids: Vec<Uuid> = exhibitions.iter().map(|e| e.artwork_id).collect();
    artwork_ids.sort_unstable();
    artwork_ids.dedup();

    let artworks: HashMap<Uuid, ArtWork> = state
        .repo
        .list_artworks_by_ids(&artwork_ids)
        .await?
        .into_iter()
        .map(|piece| (piece.id, piece))
        .collect();

    let expanded: Vec<ExhibitionWithArtWork> = exhibitions
        .into_iter()
        .map(|exhibition| {
            let artwork = artworks.get(&exhibition.artwork_id).cloned();
            ExhibitionWithArtWork::from_parts(exhibition, artwork)
        })
        .collect();

    Ok((
        StatusCode::OK,
        envelope(
            "Exhibitions fetched successfully.",
            "exhibitions",
            expanded,
        ),
    ))
}
