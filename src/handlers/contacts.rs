use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    handlers::{require_admin, require_field},
    mailer::contact_inquiry_email,
    models::{Contact, CreateContactRequest, NewContact},
    response::envelope,
    validate,
};

/// create_contact
///
/// **Public**: Stores a visitor inquiry, one per email address. When the
/// visitor opts into the newsletter, the gallery inbox is notified before the
/// response goes out; a mail-transport failure fails the request with a 500
/// even though the inquiry is already stored at that point.
#[utoipa::path(
    post,
    path = "/api/v1/contacts",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Inquiry stored", body = Contact),
        (status = 400, description = "Missing field or invalid email"),
        (status = 409, description = "An inquiry with this email already exists"),
        (status = 500, description = "Inquiry stored but the notification could not be sent")
    )
)]
pub async fn create_contact(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let full_name = require_field(payload.full_name.as_deref(), "fullName")?;
    let email = require_field(payload.email.as_deref(), "email")?;
    let phone_number = require_field(payload.phone_number.as_deref(), "phoneNumber")?;
    let message_text = require_field(payload.message.as_deref(), "message")?;
    validate::validate_email(&email)?;

    if state.repo.find_contact_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(
            "An inquiry with this email already exists.".to_string(),
        ));
    }

    let contact = state
        .repo
        .create_contact(NewContact {
            full_name,
            email,
            phone_number,
            newsletter_opt_in: payload.newsletter_opt_in.unwrap_or(false),
            message: message_text,
        })
        .await?;

    if contact.newsletter_opt_in {
        let (subject, html_body) = contact_inquiry_email(&contact);
        state
            .mailer
            .send(&state.config.mail_recipient, &subject, &html_body)
            .await?;
    }

    tracing::info!("stored contact inquiry {}", contact.id);

    Ok((
        StatusCode::CREATED,
        envelope(
            "Your inquiry has been submitted successfully.",
            "contact",
            contact,
        ),
    ))
}

/// delete_contact
///
/// **Admin**: Removes an inquiry, freeing its email address for a new one.
#[utoipa::path(
    delete,
    path = "/api/v1/contacts/{id}",
    params(("id" = String, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Inquiry deleted; the removed record is returned", body = Contact),
        (status = 400, description = "Invalid id"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Inquiry not found")
    )
)]
pub async fn delete_contact(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(role, "delete contact inquiries")?;
    let contact_id = validate::parse_id(&id, "contact")?;

    let contact = state
        .repo
        .delete_contact(contact_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact inquiry not found.".to_string()))?;

    Ok((
        StatusCode::OK,
        envelope("Contact inquiry deleted successfully.", "contact", contact),
    ))
}

/// list_contacts
///
/// **Public**: All stored inquiries, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/contacts",
    responses(
        (status = 200, description = "All contact inquiries", body = Vec<Contact>)
    )
)]
pub async fn list_contacts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let contacts = state.repo.list_contacts().await?;

    Ok((
        StatusCode::OK,
        envelope("Contacts fetched successfully.", "contacts", contacts),
    ))
}
