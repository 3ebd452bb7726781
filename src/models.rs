use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Roles ---

/// Role
///
/// The RBAC field carried on every user record and inside access tokens.
/// Authorization decisions go through `is_admin()` rather than comparing
/// role strings at call sites.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default,
)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Visitor,
}

impl Role {
    /// The single capability check behind every mutating endpoint.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Visitor => "visitor",
        }
    }
}

/// Decodes the TEXT `role` column into the enum.
impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "admin" => Ok(Role::Admin),
            "visitor" => Ok(Role::Visitor),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record from the `users` table. The password hash never
/// leaves the server: it is skipped during serialization entirely.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    // The user's primary identifier, unique.
    pub email: String,
    // Argon2 hash of the password. Never serialized into a response body.
    #[serde(skip)]
    pub password_hash: String,
    // Secondary unique identifier.
    pub phone_number: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub newsletter_opt_in: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Artist
///
/// A gallery artist from the `artists` table. `images` holds public object
/// storage URLs uploaded under the `artists/` folder.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    // Unique across artists. Redacted for non-admin single fetches.
    pub email: String,
    pub images: Vec<String>,
    // Kept as the exact string that passed format validation on the way in.
    pub date_of_birth: String,
    pub present_address: String,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ArtWork
///
/// A piece from the `artworks` table. `artist_id` references an artist but is
/// not enforced with a foreign key: removing an artist intentionally leaves
/// their pieces in place.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ArtWork {
    pub id: Uuid,
    pub name: String,
    pub images: Vec<String>,
    pub artist_id: Uuid,
    // Display price, "$400" or "$200-500".
    pub price: String,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Exhibition
///
/// A dated pairing of one artist with one of their artworks, from the
/// `exhibitions` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Exhibition {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub artwork_id: Uuid,
    #[ts(type = "string")]
    pub start_date: NaiveDate,
    #[ts(type = "string")]
    pub end_date: NaiveDate,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Banner
///
/// A homepage banner from the `banners` table. Only the images are required.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: Uuid,
    pub title: Option<String>,
    pub images: Vec<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Contact
///
/// A visitor inquiry from the `contacts` table. One inquiry per email address.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub newsletter_opt_in: bool,
    pub message: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterUserRequest
///
/// Input payload for the public registration endpoint (POST /users/register).
/// All fields arrive as options so required-field violations surface as
/// envelope errors rather than deserialization rejections.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub full_name: Option<String>,
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    // Defaults to `visitor` when omitted.
    pub role: Option<Role>,
    pub newsletter_opt_in: Option<bool>,
}

/// LoginRequest
///
/// Input payload for POST /users/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// CreateContactRequest
///
/// Input payload for the public inquiry form (POST /contacts).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub newsletter_opt_in: Option<bool>,
    pub message: Option<String>,
}

/// CreateExhibitionRequest
///
/// Input payload for scheduling an exhibition (POST /exhibitions). Identifiers
/// and dates arrive as strings and are format-checked in the handler.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateExhibitionRequest {
    pub artist_id: Option<String>,
    pub artwork_id: Option<String>,
    #[schema(example = "2025-06-01")]
    pub start_date: Option<String>,
    #[schema(example = "2025-06-30")]
    pub end_date: Option<String>,
    pub description: Option<String>,
}

/// UpdateExhibitionRequest
///
/// Partial update payload for PUT /exhibitions/{id}. Only provided fields are
/// touched; omitted ones keep their stored values.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExhibitionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateExhibitionRequest {
    /// An update that names no field at all is rejected up front.
    pub fn is_empty(&self) -> bool {
        self.artist_id.is_none()
            && self.artwork_id.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.description.is_none()
    }
}

// --- Repository Input Records ---

/// NewUser
///
/// Insert record assembled by the registration handler after validation and
/// password hashing.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: String,
    pub role: Role,
    pub newsletter_opt_in: bool,
}

/// Insert record for an artist, built after uploads succeed.
#[derive(Debug, Clone, Default)]
pub struct NewArtist {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub images: Vec<String>,
    pub date_of_birth: String,
    pub present_address: String,
    pub description: String,
}

/// Insert record for an artwork, built after uploads succeed.
#[derive(Debug, Clone, Default)]
pub struct NewArtWork {
    pub name: String,
    pub images: Vec<String>,
    pub artist_id: Uuid,
    pub price: String,
    pub description: String,
}

/// Insert record for an exhibition.
#[derive(Debug, Clone, Default)]
pub struct NewExhibition {
    pub artist_id: Uuid,
    pub artwork_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
}

/// Insert record for a banner.
#[derive(Debug, Clone, Default)]
pub struct NewBanner {
    pub title: Option<String>,
    pub images: Vec<String>,
}

/// Insert record for a contact inquiry.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub newsletter_opt_in: bool,
    pub message: String,
}

/// ArtistChanges
///
/// Merge-patch for an artist. `None` leaves the stored value alone; the
/// repository applies these with COALESCE so the update stays a single
/// statement.
#[derive(Debug, Clone, Default)]
pub struct ArtistChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub images: Option<Vec<String>>,
    pub date_of_birth: Option<String>,
    pub present_address: Option<String>,
    pub description: Option<String>,
}

/// Merge-patch for an artwork.
#[derive(Debug, Clone, Default)]
pub struct ArtWorkChanges {
    pub name: Option<String>,
    pub images: Option<Vec<String>>,
    pub artist_id: Option<Uuid>,
    pub price: Option<String>,
    pub description: Option<String>,
}

/// Merge-patch for an exhibition.
#[derive(Debug, Clone, Default)]
pub struct ExhibitionChanges {
    pub artist_id: Option<Uuid>,
    pub artwork_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// Merge-patch for a banner.
#[derive(Debug, Clone, Default)]
pub struct BannerChanges {
    pub title: Option<String>,
    pub images: Option<Vec<String>>,
}

// --- Response Projections (Output Schemas) ---

/// PublicArtist
///
/// Artist record with the email redacted, served to non-admin callers of the
/// single-artist endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PublicArtist {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub images: Vec<String>,
    pub date_of_birth: String,
    pub present_address: String,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<Artist> for PublicArtist {
    fn from(artist: Artist) -> Self {
        Self {
            id: artist.id,
            first_name: artist.first_name,
            last_name: artist.last_name,
            images: artist.images,
            date_of_birth: artist.date_of_birth,
            present_address: artist.present_address,
            description: artist.description,
            created_at: artist.created_at,
            updated_at: artist.updated_at,
        }
    }
}

/// ArtistRef
///
/// Restricted artist expansion stamped onto a freshly created artwork:
/// identity and contact fields only.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ArtistRef {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&Artist> for ArtistRef {
    fn from(artist: &Artist) -> Self {
        Self {
            id: artist.id,
            first_name: artist.first_name.clone(),
            last_name: artist.last_name.clone(),
            email: artist.email.clone(),
        }
    }
}

/// ArtistTeaser
///
/// Name-and-blurb projection attached to artworks in the public listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ArtistTeaser {
    pub first_name: String,
    pub last_name: String,
    pub description: String,
}

impl From<&Artist> for ArtistTeaser {
    fn from(artist: &Artist) -> Self {
        Self {
            first_name: artist.first_name.clone(),
            last_name: artist.last_name.clone(),
            description: artist.description.clone(),
        }
    }
}

/// ArtWorkResponse
///
/// Creation response: the stored artwork with its artist expanded to the
/// restricted reference.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ArtWorkResponse {
    pub id: Uuid,
    pub name: String,
    pub images: Vec<String>,
    pub artist: ArtistRef,
    pub price: String,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl ArtWorkResponse {
    pub fn from_parts(artwork: ArtWork, artist: &Artist) -> Self {
        Self {
            id: artwork.id,
            name: artwork.name,
            images: artwork.images,
            artist: ArtistRef::from(artist),
            price: artwork.price,
            description: artwork.description,
            created_at: artwork.created_at,
            updated_at: artwork.updated_at,
        }
    }
}

/// ArtWorkWithArtist
///
/// Admin listing row: every artwork field plus the full artist record.
/// The artist is optional because nothing stops an artist row from being
/// removed while pieces still reference it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ArtWorkWithArtist {
    pub id: Uuid,
    pub name: String,
    pub images: Vec<String>,
    pub artist: Option<Artist>,
    pub price: String,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl ArtWorkWithArtist {
    pub fn from_parts(artwork: ArtWork, artist: Option<Artist>) -> Self {
        Self {
            id: artwork.id,
            name: artwork.name,
            images: artwork.images,
            artist,
            price: artwork.price,
            description: artwork.description,
            created_at: artwork.created_at,
            updated_at: artwork.updated_at,
        }
    }
}

/// LimitedArtWork
///
/// Public listing row: full artwork fields, artist reduced to the teaser.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LimitedArtWork {
    pub id: Uuid,
    pub name: String,
    pub images: Vec<String>,
    pub artist: Option<ArtistTeaser>,
    pub price: String,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl LimitedArtWork {
    pub fn from_parts(artwork: ArtWork, artist: Option<&Artist>) -> Self {
        Self {
            id: artwork.id,
            name: artwork.name,
            images: artwork.images,
            artist: artist.map(ArtistTeaser::from),
            price: artwork.price,
            description: artwork.description,
            created_at: artwork.created_at,
            updated_at: artwork.updated_at,
        }
    }
}

/// ExhibitionWithArtWork
///
/// Read model for exhibitions: the referenced artwork is embedded in place of
/// its identifier. `None` marks a dangling reference to a removed piece.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionWithArtWork {
    pub id: Uuid,
    pub artist_id: Uuid,
    pub artwork: Option<ArtWork>,
    #[ts(type = "string")]
    pub start_date: NaiveDate,
    #[ts(type = "string")]
    pub end_date: NaiveDate,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl ExhibitionWithArtWork {
    pub fn from_parts(exhibition: Exhibition, artwork: Option<ArtWork>) -> Self {
        Self {
            id: exhibition.id,
            artist_id: exhibition.artist_id,
            artwork,
            start_date: exhibition.start_date,
            end_date: exhibition.end_date,
            description: exhibition.description,
            created_at: exhibition.created_at,
            updated_at: exhibition.updated_at,
        }
    }
}
