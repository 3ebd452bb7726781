use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    ArtWork, ArtWorkChanges, Artist, ArtistChanges, Banner, BannerChanges, Contact, Exhibition,
    ExhibitionChanges, NewArtWork, NewArtist, NewBanner, NewContact, NewExhibition, NewUser, User,
};

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, so handlers
/// interact with the data layer without knowing the concrete implementation
/// (Postgres, in-memory, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
///
/// Every method returns `Result` so driver failures travel up as `ApiError`
/// instead of being flattened into empty values. Uniqueness (user email and
/// phone, artist email, contact email) is enforced both by explicit handler
/// pre-checks and by database constraints; the database wins when they race.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---

    /// Inserts a registered user with an already-hashed password.
    async fn create_user(&self, new_user: NewUser) -> Result<User, ApiError>;
    /// Fetches a user by primary key.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    /// Looks a user up by email, for login and duplicate checks.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    /// Looks a user up by phone number, for duplicate checks.
    async fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<User>, ApiError>;

    // --- Artists ---

    /// Inserts an artist whose images are already uploaded.
    async fn create_artist(&self, new_artist: NewArtist) -> Result<Artist, ApiError>;
    /// Fetches an artist by primary key.
    async fn get_artist(&self, id: Uuid) -> Result<Option<Artist>, ApiError>;
    /// Looks an artist up by email, for duplicate checks.
    async fn find_artist_by_email(&self, email: &str) -> Result<Option<Artist>, ApiError>;
    /// Lists all artists, newest first.
    async fn list_artists(&self) -> Result<Vec<Artist>, ApiError>;
    /// Fetches the artists behind a set of ids, for relation expansion.
    async fn list_artists_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Artist>, ApiError>;
    /// Applies a merge-patch; `None` means the artist does not exist.
    async fn update_artist(
        &self,
        id: Uuid,
        changes: ArtistChanges,
    ) -> Result<Option<Artist>, ApiError>;
    /// Removes an artist, returning the deleted row.
    async fn delete_artist(&self, id: Uuid) -> Result<Option<Artist>, ApiError>;

    // --- ArtWorks ---

    /// Inserts an artwork whose images are already uploaded.
    async fn create_artwork(&self, new_artwork: NewArtWork) -> Result<ArtWork, ApiError>;
    /// Fetches an artwork by primary key.
    async fn get_artwork(&self, id: Uuid) -> Result<Option<ArtWork>, ApiError>;
    /// Fetches an artwork only if it belongs to the given artist. The
    /// artist/artwork pairing rule for exhibitions rests on this lookup.
    async fn find_artwork_owned_by(
        &self,
        artwork_id: Uuid,
        artist_id: Uuid,
    ) -> Result<Option<ArtWork>, ApiError>;
    /// Lists all artworks, newest first.
    async fn list_artworks(&self) -> Result<Vec<ArtWork>, ApiError>;
    /// Lists the artworks of one artist, newest first.
    async fn list_artworks_by_artist(&self, artist_id: Uuid) -> Result<Vec<ArtWork>, ApiError>;
    /// Fetches the artworks behind a set of ids, for relation expansion.
    async fn list_artworks_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ArtWork>, ApiError>;
    /// Applies a merge-patch; `None` means the artwork does not exist.
    async fn update_artwork(
        &self,
        id: Uuid,
        changes: ArtWorkChanges,
    ) -> Result<Option<ArtWork>, ApiError>;
    /// Removes an artwork, returning the deleted row.
    async fn delete_artwork(&self, id: Uuid) -> Result<Option<ArtWork>, ApiError>;

    // --- Exhibitions ---

    /// Inserts an exhibition whose relations have been validated.
    async fn create_exhibition(
        &self,
        new_exhibition: NewExhibition,
    ) -> Result<Exhibition, ApiError>;
    /// Fetches an exhibition by primary key.
    async fn get_exhibition(&self, id: Uuid) -> Result<Option<Exhibition>, ApiError>;
    /// Lists all exhibitions, newest first.
    async fn list_exhibitions(&self) -> Result<Vec<Exhibition>, ApiError>;
    /// Applies a merge-patch; `None` means the exhibition does not exist.
    async fn update_exhibition(
        &self,
        id: Uuid,
        changes: ExhibitionChanges,
    ) -> Result<Option<Exhibition>, ApiError>;
    /// Removes an exhibition, returning the deleted row.
    async fn delete_exhibition(&self, id: Uuid) -> Result<Option<Exhibition>, ApiError>;

    // --- Banners ---

    /// Inserts a banner whose images are already uploaded.
    async fn create_banner(&self, new_banner: NewBanner) -> Result<Banner, ApiError>;
    /// Fetches a banner by primary key.
    async fn get_banner(&self, id: Uuid) -> Result<Option<Banner>, ApiError>;
    /// Lists all banners, newest first.
    async fn list_banners(&self) -> Result<Vec<Banner>, ApiError>;
    /// Applies a merge-patch; `None` means the banner does not exist.
    async fn update_banner(
        &self,
        id: Uuid,
        changes: BannerChanges,
    ) -> Result<Option<Banner>, ApiError>;
    /// Removes a banner, returning the deleted row.
    async fn delete_banner(&self, id: Uuid) -> Result<Option<Banner>, ApiError>;

    // --- Contacts ---

    /// Inserts a contact inquiry.
    async fn create_contact(&self, new_contact: NewContact) -> Result<Contact, ApiError>;
    /// Looks an inquiry up by email, for the one-inquiry-per-address rule.
    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, ApiError>;
    /// Lists all inquiries, newest first.
    async fn list_contacts(&self) -> Result<Vec<Contact>, ApiError>;
    /// Removes an inquiry, returning the deleted row.
    async fn delete_contact(&self, id: Uuid) -> Result<Option<Contact>, ApiError>;
}

/// RepositoryState
///
/// The concrete type used to share persistence access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Queries use the runtime API with explicit binds; merge-patches are single
/// COALESCE statements, never a read-modify-write round trip.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- User Queries ---

    async fn create_user(&self, new_user: NewUser) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, password_hash, phone_number, role, newsletter_opt_in)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, full_name, email, password_hash, phone_number, role,
                      newsletter_opt_in, created_at, updated_at
            "#,
        )
        .bind(new_user.full_name)
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .bind(new_user.phone_number)
        .bind(new_user.role.as_str())
        .bind(new_user.newsletter_opt_in)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, phone_number, role,
                   newsletter_opt_in, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, phone_number, role,
                   newsletter_opt_in, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, phone_number, role,
                   newsletter_opt_in, created_at, updated_at
            FROM users
            WHERE phone_number = $1
            "#,
        )
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // --- Artist Queries ---

    async fn create_artist(&self, new_artist: NewArtist) -> Result<Artist, ApiError> {
        let artist = sqlx::query_as::<_, Artist>(
            r#"
            INSERT INTO artists (first_name, last_name, email, images, date_of_birth,
                                 present_address, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, first_name, last_name, email, images, date_of_birth,
                      present_address, description, created_at, updated_at
            "#,
        )
        .bind(new_artist.first_name)
        .bind(new_artist.last_name)
        .bind(new_artist.email)
        .bind(new_artist.images)
        .bind(new_artist.date_of_birth)
        .bind(new_artist.present_address)
        .bind(new_artist.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(artist)
    }

    async fn get_artist(&self, id: Uuid) -> Result<Option<Artist>, ApiError> {
        let artist = sqlx::query_as::<_, Artist>(
            r#"
            SELECT id, first_name, last_name, email, images, date_of_birth,
                   present_address, description, created_at, updated_at
            FROM artists
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(artist)
    }

    async fn find_artist_by_email(&self, email: &str) -> Result<Option<Artist>, ApiError> {
        let artist = sqlx::query_as::<_, Artist>(
            r#"
            SELECT id, first_name, last_name, email, images, date_of_birth,
                   present_address, description, created_at, updated_at
            FROM artists
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(artist)
    }

    async fn list_artists(&self) -> Result<Vec<Artist>, ApiError> {
        let artists = sqlx::query_as::<_, Artist>(
            r#"
            SELECT id, first_name, last_name, email, images, date_of_birth,
                   present_address, description, created_at, updated_at
            FROM artists
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(artists)
    }

    async fn list_artists_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Artist>, ApiError> {
        let artists = sqlx::query_as::<_, Artist>(
            r#"
            SELECT id, first_name, last_name, email, images, date_of_birth,
                   present_address, description, created_at, updated_at
            FROM artists
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(artists)
    }

    async fn update_artist(
        &self,
        id: Uuid,
        changes: ArtistChanges,
    ) -> Result<Option<Artist>, ApiError> {
        let artist = sqlx::query_as::<_, Artist>(
            r#"
            UPDATE artists
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                images = COALESCE($5, images),
                date_of_birth = COALESCE($6, date_of_birth),
                present_address = COALESCE($7, present_address),
                description = COALESCE($8, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, first_name, last_name, email, images, date_of_birth,
                      present_address, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.email)
        .bind(changes.images)
        .bind(changes.date_of_birth)
        .bind(changes.present_address)
        .bind(changes.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(artist)
    }

    async fn delete_artist(&self, id: Uuid) -> Result<Option<Artist>, ApiError> {
        let artist = sqlx::query_as::<_, Artist>(
            r#"
            DELETE FROM artists
            WHERE id = $1
            RETURNING id, first_name, last_name, email, images, date_of_birth,
                      present_address, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(artist)
    }

    // --- ArtWork Queries ---

    async fn create_artwork(&self, new_artwork: NewArtWork) -> Result<ArtWork, ApiError> {
        let artwork = sqlx::query_as::<_, ArtWork>(
            r#"
            INSERT INTO artworks (name, images, artist_id, price, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, images, artist_id, price, description, created_at, updated_at
            "#,
        )
        .bind(new_artwork.name)
        .bind(new_artwork.images)
        .bind(new_artwork.artist_id)
        .bind(new_artwork.price)
        .bind(new_artwork.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(artwork)
    }

    async fn get_artwork(&self, id: Uuid) -> Result<Option<ArtWork>, ApiError> {
        let artwork = sqlx::query_as::<_, ArtWork>(
            r#"
            SELECT id, name, images, artist_id, price, description, created_at, updated_at
            FROM artworks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(artwork)
    }

    async fn find_artwork_owned_by(
        &self,
        artwork_id: Uuid,
        artist_id: Uuid,
    ) -> Result<Option<ArtWork>, ApiError> {
        let artwork = sqlx::query_as::<_, ArtWork>(
            r#"
            SELECT id, name, images, artist_id, price, description, created_at, updated_at
            FROM artworks
            WHERE id = $1 AND artist_id = $2
            "#,
        )
        .bind(artwork_id)
        .bind(artist_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(artwork)
    }

    async fn list_artworks(&self) -> Result<Vec<ArtWork>, ApiError> {
        let artworks = sqlx::query_as::<_, ArtWork>(
            r#"
            SELECT id, name, images, artist_id, price, description, created_at, updated_at
            FROM artworks
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(artworks)
    }

    async fn list_artworks_by_artist(&self, artist_id: Uuid) -> Result<Vec<ArtWork>, ApiError> {
        let artworks = sqlx::query_as::<_, ArtWork>(
            r#"
            SELECT id, name, images, artist_id, price, description, created_at, updated_at
            FROM artworks
            WHERE artist_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(artworks)
    }

    async fn list_artworks_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ArtWork>, ApiError> {
        let artworks = sqlx::query_as::<_, ArtWork>(
            r#"
            SELECT id, name, images, artist_id, price, description, created_at, updated_at
            FROM artworks
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(artworks)
    }

    async fn update_artwork(
        &self,
        id: Uuid,
        changes: ArtWorkChanges,
    ) -> Result<Option<ArtWork>, ApiError> {
        let artwork = sqlx::query_as::<_, ArtWork>(
            r#"
            UPDATE artworks
            SET name = COALESCE($2, name),
                images = COALESCE($3, images),
                artist_id = COALESCE($4, artist_id),
                price = COALESCE($5, price),
                description = COALESCE($6, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, images, artist_id, price, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.images)
        .bind(changes.artist_id)
        .bind(changes.price)
        .bind(changes.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(artwork)
    }

    async fn delete_artwork(&self, id: Uuid) -> Result<Option<ArtWork>, ApiError> {
        let artwork = sqlx::query_as::<_, ArtWork>(
            r#"
            DELETE FROM artworks
            WHERE id = $1
            RETURNING id, name, images, artist_id, price, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(artwork)
    }

    // --- Exhibition Queries ---

    async fn create_exhibition(
        &self,
        new_exhibition: NewExhibition,
    ) -> Result<Exhibition, ApiError> {
        let exhibition = sqlx::query_as::<_, Exhibition>(
            r#"
            INSERT INTO exhibitions (artist_id, artwork_id, start_date, end_date, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, artist_id, artwork_id, start_date, end_date, description,
                      created_at, updated_at
            "#,
        )
        .bind(new_exhibition.artist_id)
        .bind(new_exhibition.artwork_id)
        .bind(new_exhibition.start_date)
        .bind(new_exhibition.end_date)
        .bind(new_exhibition.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(exhibition)
    }

    async fn get_exhibition(&self, id: Uuid) -> Result<Option<Exhibition>, ApiError> {
        let exhibition = sqlx::query_as::<_, Exhibition>(
            r#"
            SELECT id, artist_id, artwork_id, start_date, end_date, description,
                   created_at, updated_at
            FROM exhibitions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exhibition)
    }

    async fn list_exhibitions(&self) -> Result<Vec<Exhibition>, ApiError> {
        let exhibitions = sqlx::query_as::<_, Exhibition>(
            r#"
            SELECT id, artist_id, artwork_id, start_date, end_date, description,
                   created_at, updated_at
            FROM exhibitions
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(exhibitions)
    }

    async fn update_exhibition(
        &self,
        id: Uuid,
        changes: ExhibitionChanges,
    ) -> Result<Option<Exhibition>, ApiError> {
        let exhibition = sqlx::query_as::<_, Exhibition>(
            r#"
            UPDATE exhibitions
            SET artist_id = COALESCE($2, artist_id),
                artwork_id = COALESCE($3, artwork_id),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                description = COALESCE($6, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, artist_id, artwork_id, start_date, end_date, description,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.artist_id)
        .bind(changes.artwork_id)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(changes.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exhibition)
    }

    async fn delete_exhibition(&self, id: Uuid) -> Result<Option<Exhibition>, ApiError> {
        let exhibition = sqlx::query_as::<_, Exhibition>(
            r#"
            DELETE FROM exhibitions
            WHERE id = $1
            RETURNING id, artist_id, artwork_id, start_date, end_date, description,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exhibition)
    }

    // --- Banner Queries ---

    async fn create_banner(&self, new_banner: NewBanner) -> Result<Banner, ApiError> {
        let banner = sqlx::query_as::<_, Banner>(
            r#"
            INSERT INTO banners (title, images)
            VALUES ($1, $2)
            RETURNING id, title, images, created_at, updated_at
            "#,
        )
        .bind(new_banner.title)
        .bind(new_banner.images)
        .fetch_one(&self.pool)
        .await?;

        Ok(banner)
    }

    async fn get_banner(&self, id: Uuid) -> Result<Option<Banner>, ApiError> {
        let banner = sqlx::query_as::<_, Banner>(
            r#"
            SELECT id, title, images, created_at, updated_at
            FROM banners
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(banner)
    }

    async fn list_banners(&self) -> Result<Vec<Banner>, ApiError> {
        let banners = sqlx::query_as::<_, Banner>(
            r#"
            SELECT id, title, images, created_at, updated_at
            FROM banners
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(banners)
    }

    async fn update_banner(
        &self,
        id: Uuid,
        changes: BannerChanges,
    ) -> Result<Option<Banner>, ApiError> {
        let banner = sqlx::query_as::<_, Banner>(
            r#"
            UPDATE banners
            SET title = COALESCE($2, title),
                images = COALESCE($3, images),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, images, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.images)
        .fetch_optional(&self.pool)
        .await?;

        Ok(banner)
    }

    async fn delete_banner(&self, id: Uuid) -> Result<Option<Banner>, ApiError> {
        let banner = sqlx::query_as::<_, Banner>(
            r#"
            DELETE FROM banners
            WHERE id = $1
            RETURNING id, title, images, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(banner)
    }

    // --- Contact Queries ---

    async fn create_contact(&self, new_contact: NewContact) -> Result<Contact, ApiError> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (full_name, email, phone_number, newsletter_opt_in, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, full_name, email, phone_number, newsletter_opt_in, message,
                      created_at, updated_at
            "#,
        )
        .bind(new_contact.full_name)
        .bind(new_contact.email)
        .bind(new_contact.phone_number)
        .bind(new_contact.newsletter_opt_in)
        .bind(new_contact.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(contact)
    }

    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, ApiError> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, full_name, email, phone_number, newsletter_opt_in, message,
                   created_at, updated_at
            FROM contacts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, ApiError> {
        let contacts = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, full_name, email, phone_number, newsletter_opt_in, message,
                   created_at, updated_at
            FROM contacts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(contacts)
    }

    async fn delete_contact(&self, id: Uuid) -> Result<Option<Contact>, ApiError> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            DELETE FROM contacts
            WHERE id = $1
            RETURNING id, full_name, email, phone_number, newsletter_opt_in, message,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }
}
