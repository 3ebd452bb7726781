use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    handlers::require_admin,
    models::{Banner, BannerChanges, NewBanner},
    multipart::FormData,
    response::envelope,
    storage::storage_keys_from_urls,
    validate,
};

/// create_banner
///
/// **Admin**: Publishes a homepage banner. Images are the only required
/// input; the title is optional.
#[utoipa::path(
    post,
    path = "/api/v1/banners",
    request_body(content_type = "multipart/form-data", description = "Optional field: title; one or more image files"),
    responses(
        (status = 201, description = "Banner created", body = Banner),
        (status = 400, description = "No image attached"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn create_banner(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(role, "add banners")?;

    let mut form = FormData::read(multipart).await?;
    let title = form.optional("title");

    let attachment = form.take_attachment().ok_or_else(|| {
        ApiError::InvalidInput("At least one banner image is required.".to_string())
    })?;

    let images = state
        .storage
        .upload_many(&attachment.into_files(), "banners")
        .await?;

    let banner = state.repo.create_banner(NewBanner { title, images }).await?;

    tracing::info!("created banner {}", banner.id);

    Ok((
        StatusCode::CREATED,
        envelope("Banner added successfully.", "banner", banner),
    ))
}

/// update_banner
///
/// **Admin**: Merge-patches a banner. New files replace the whole image set;
/// the displaced objects are removed best-effort after the swap is stored.
#[utoipa::path(
    put,
    path = "/api/v1/banners/{id}",
    params(("id" = String, Path, description = "Banner id")),
    request_body(content_type = "multipart/form-data", description = "Optional field: title; files replace the full image set"),
    responses(
        (status = 200, description = "Banner updated", body = Banner),
        (status = 400, description = "Invalid id or empty form"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Banner not found")
    )
)]
pub async fn update_banner(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(role, "edit banners")?;
    let banner_id = validate::parse_id(&id, "banner")?;

    let mut form = FormData::read(multipart).await?;
    if form.is_empty() {
        return Err(ApiError::InvalidInput(
            "At least one field is required to update.".to_string(),
        ));
    }

    let existing = state
        .repo
        .get_banner(banner_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Banner not found.".to_string()))?;

    let new_images = match form.take_attachment() {
        Some(attachment) => Some(
            state
                .storage
                .upload_many(&attachment.into_files(), "banners")
                .await?,
        ),
        None => None,
    };
    let replacing_images = new_images.is_some();

    let updated = state
        .repo
        .update_banner(
            banner_id,
            BannerChanges {
                title: form.optional("title"),
                images: new_images,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Banner not found.".to_string()))?;

    if replacing_images {
        let old_keys = storage_keys_from_urls(&existing.images);
        state.storage.delete_many(&old_keys).await;
    }

    Ok((
        StatusCode::OK,
        envelope("Banner updated successfully.", "banner", updated),
    ))
}

/// delete_banner
///
/// **Admin**: Removes a banner, then its stored images best-effort. Deleting
/// the same banner twice answers 404 the second time.
#[utoipa::path(
    delete,
    path = "/api/v1/banners/{id}",
    params(("id" = String, Path, description = "Banner id")),
    responses(
        (status = 200, description = "Banner deleted; the removed record is returned", body = Banner),
        (status = 400, description = "Invalid id"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Banner not found")
    )
)]
pub async fn delete_banner(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(role, "delete banners")?;
    let banner_id = validate::parse_id(&id, "banner")?;

    let banner = state
        .repo
        .delete_banner(banner_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Banner not found.".to_string()))?;

    let keys = storage_keys_from_urls(&banner.images);
    state.storage.delete_many(&keys).await;

    tracing::info!("deleted banner {}", banner.id);

    Ok((
        StatusCode::OK,
        envelope("Banner deleted successfully.", "banner", banner),
    ))
}

/// list_banners
///
/// **Public**: All banners, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/banners",
    responses(
        (status = 200, description = "All banners", body = Vec<Banner>)
    )
)]
pub async fn list_banners(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let banners = state.repo.list_banners().await?;

    Ok((
        StatusCode::OK,
        envelope("Banners fetched successfully.", "banners", banners),
    ))
}
