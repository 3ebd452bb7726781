use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use gallery_cms::{
    AppConfig, AppState, MockStorageService, create_router,
    error::ApiError,
    mailer::{MailerState, MockMailer},
    models::{
        ArtWork, ArtWorkChanges, Artist, ArtistChanges, Banner, BannerChanges, Contact, Exhibition,
        ExhibitionChanges, NewArtWork, NewArtist, NewBanner, NewContact, NewExhibition, NewUser,
        Role, User,
    },
    repository::{Repository, RepositoryState},
    storage::StorageState,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, MutexGuard};
use tower::util::ServiceExt;
use uuid::Uuid;

// --- In-Memory Repository ---

// Backs full request lifecycles without a database. Rows live in plain Vecs;
// "newest first" is the reverse of insertion order, which matches the
// created_at ordering the real queries use.
#[derive(Default)]
struct InMemoryRepository {
    users: Mutex<Vec<User>>,
    artists: Mutex<Vec<Artist>>,
    artworks: Mutex<Vec<ArtWork>>,
    exhibitions: Mutex<Vec<Exhibition>>,
    banners: Mutex<Vec<Banner>>,
    contacts: Mutex<Vec<Contact>>,
}

fn lock<T>(store: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn newest_first<T: Clone>(rows: &[T]) -> Vec<T> {
    rows.iter().rev().cloned().collect()
}

fn unique_violation() -> ApiError {
    ApiError::Conflict("A record with this value already exists.".to_string())
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_user(&self, new_user: NewUser) -> Result<User, ApiError> {
        let mut users = lock(&self.users);
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(unique_violation());
        }
        if users.iter().any(|u| u.phone_number == new_user.phone_number) {
            return Err(unique_violation());
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            full_name: new_user.full_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            phone_number: new_user.phone_number,
            role: new_user.role,
            newsletter_opt_in: new_user.newsletter_opt_in,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(lock(&self.users).iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(lock(&self.users).iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<User>, ApiError> {
        Ok(lock(&self.users)
            .iter()
            .find(|u| u.phone_number == phone_number)
            .cloned())
    }

    async fn create_artist(&self, new_artist: NewArtist) -> Result<Artist, ApiError> {
        let mut artists = lock(&self.artists);
        if artists.iter().any(|a| a.email == new_artist.email) {
            return Err(unique_violation());
        }
        let now = Utc::now();
        let artist = Artist {
            id: Uuid::new_v4(),
            first_name: new_artist.first_name,
            last_name: new_artist.last_name,
            email: new_artist.email,
            images: new_artist.images,
            date_of_birth: new_artist.date_of_birth,
            present_address: new_artist.present_address,
            description: new_artist.description,
            created_at: now,
            updated_at: now,
        };
        artists.push(artist.clone());
        Ok(artist)
    }

    async fn get_artist(&self, id: Uuid) -> Result<Option<Artist>, ApiError> {
        Ok(lock(&self.artists).iter().find(|a| a.id == id).cloned())
    }

    async fn find_artist_by_email(&self, email: &str) -> Result<Option<Artist>, ApiError> {
        Ok(lock(&self.artists)
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn list_artists(&self) -> Result<Vec<Artist>, ApiError> {
        Ok(newest_first(&lock(&self.artists)))
    }

    async fn list_artists_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Artist>, ApiError> {
        Ok(lock(&self.artists)
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn update_artist(
        &self,
        id: Uuid,
        changes: ArtistChanges,
    ) -> Result<Option<Artist>, ApiError> {
        let mut artists = lock(&self.artists);
        let Some(artist) = artists.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(v) = changes.first_name {
            artist.first_name = v;
        }
        if let Some(v) = changes.last_name {
            artist.last_name = v;
        }
        if let Some(v) = changes.email {
            artist.email = v;
        }
        if let Some(v) = changes.images {
            artist.images = v;
        }
        if let Some(v) = changes.date_of_birth {
            artist.date_of_birth = v;
        }
        if let Some(v) = changes.present_address {
            artist.present_address = v;
        }
        if let Some(v) = changes.description {
            artist.description = v;
        }
        artist.updated_at = Utc::now();
        Ok(Some(artist.clone()))
    }

    async fn delete_artist(&self, id: Uuid) -> Result<Option<Artist>, ApiError> {
        let mut artists = lock(&self.artists);
        match artists.iter().position(|a| a.id == id) {
            Some(pos) => Ok(Some(artists.remove(pos))),
            None => Ok(None),
        }
    }

    async fn create_artwork(&self, new_artwork: NewArtWork) -> Result<ArtWork, ApiError> {
        let now = Utc::now();
        let artwork = ArtWork {
            id: Uuid::new_v4(),
            name: new_artwork.name,
            images: new_artwork.images,
            artist_id: new_artwork.artist_id,
            price: new_artwork.price,
            description: new_artwork.description,
            created_at: now,
            updated_at: now,
        };
        lock(&self.artworks).push(artwork.clone());
        Ok(artwork)
    }

    async fn get_artwork(&self, id: Uuid) -> Result<Option<ArtWork>, ApiError> {
        Ok(lock(&self.artworks).iter().find(|w| w.id == id).cloned())
    }

    async fn find_artwork_owned_by(
        &self,
        artwork_id: Uuid,
        artist_id: Uuid,
    ) -> Result<Option<ArtWork>, ApiError> {
        Ok(lock(&self.artworks)
            .iter()
            .find(|w| w.id == artwork_id && w.artist_id == artist_id)
            .cloned())
    }

    async fn list_artworks(&self) -> Result<Vec<ArtWork>, ApiError> {
        Ok(newest_first(&lock(&self.artworks)))
    }

    async fn list_artworks_by_artist(&self, artist_id: Uuid) -> Result<Vec<ArtWork>, ApiError> {
        Ok(lock(&self.artworks)
            .iter()
            .rev()
            .filter(|w| w.artist_id == artist_id)
            .cloned()
            .collect())
    }

    async fn list_artworks_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ArtWork>, ApiError> {
        Ok(lock(&self.artworks)
            .iter()
            .filter(|w| ids.contains(&w.id))
            .cloned()
            .collect())
    }

    async fn update_artwork(
        &self,
        id: Uuid,
        changes: ArtWorkChanges,
    ) -> Result<Option<ArtWork>, ApiError> {
        let mut artworks = lock(&self.artworks);
        let Some(artwork) = artworks.iter_mut().find(|w| w.id == id) else {
            return Ok(None);
        };
        if let Some(v) = changes.name {
            artwork.name = v;
        }
        if let Some(v) = changes.images {
            artwork.images = v;
        }
        if let Some(v) = changes.artist_id {
            artwork.artist_id = v;
        }
        if let Some(v) = changes.price {
            artwork.price = v;
        }
        if let Some(v) = changes.description {
            artwork.description = v;
        }
        artwork.updated_at = Utc::now();
        Ok(Some(artwork.clone()))
    }

    async fn delete_artwork(&self, id: Uuid) -> Result<Option<ArtWork>, ApiError> {
        let mut artworks = lock(&self.artworks);
        match artworks.iter().position(|w| w.id == id) {
            Some(pos) => Ok(Some(artworks.remove(pos))),
            None => Ok(None),
        }
    }

    async fn create_exhibition(
        &self,
        new_exhibition: NewExhibition,
    ) -> Result<Exhibition, ApiError> {
        let now = Utc::now();
        let exhibition = Exhibition {
            id: Uuid::new_v4(),
            artist_id: new_exhibition.artist_id,
            artwork_id: new_exhibition.artwork_id,
            start_date: new_exhibition.start_date,
            end_date: new_exhibition.end_date,
            description: new_exhibition.description,
            created_at: now,
            updated_at: now,
        };
        lock(&self.exhibitions).push(exhibition.clone());
        Ok(exhibition)
    }

    async fn get_exhibition(&self, id: Uuid) -> Result<Option<Exhibition>, ApiError> {
        Ok(lock(&self.exhibitions).iter().find(|e| e.id == id).cloned())
    }

    async fn list_exhibitions(&self) -> Result<Vec<Exhibition>, ApiError> {
        Ok(newest_first(&lock(&self.exhibitions)))
    }

    async fn update_exhibition(
        &self,
        id: Uuid,
        changes: ExhibitionChanges,
    ) -> Result<Option<Exhibition>, ApiError> {
        let mut exhibitions = lock(&self.exhibitions);
        let Some(exhibition) = exhibitions.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(v) = changes.artist_id {
            exhibition.artist_id = v;
        }
        if let Some(v) = changes.artwork_id {
            exhibition.artwork_id = v;
        }
        if let Some(v) = changes.start_date {
            exhibition.start_date = v;
        }
        if let Some(v) = changes.end_date {
            exhibition.end_date = v;
        }
        if let Some(v) = changes.description {
            exhibition.description = v;
        }
        exhibition.updated_at = Utc::now();
        Ok(Some(exhibition.clone()))
    }

    async fn delete_exhibition(&self, id: Uuid) -> Result<Option<Exhibition>, ApiError> {
        let mut exhibitions = lock(&self.exhibitions);
        match exhibitions.iter().position(|e| e.id == id) {
            Some(pos) => Ok(Some(exhibitions.remove(pos))),
            None => Ok(None),
        }
    }

    async fn create_banner(&self, new_banner: NewBanner) -> Result<Banner, ApiError> {
        let now = Utc::now();
        let banner = Banner {
            id: Uuid::new_v4(),
            title: new_banner.title,
            images: new_banner.images,
            created_at: now,
            updated_at: now,
        };
        lock(&self.banners).push(banner.clone());
        Ok(banner)
    }

    async fn get_banner(&self, id: Uuid) -> Result<Option<Banner>, ApiError> {
        Ok(lock(&self.banners).iter().find(|b| b.id == id).cloned())
    }

    async fn list_banners(&self) -> Result<Vec<Banner>, ApiError> {
        Ok(newest_first(&lock(&self.banners)))
    }

    async fn update_banner(
        &self,
        id: Uuid,
        changes: BannerChanges,
    ) -> Result<Option<Banner>, ApiError> {
        let mut banners = lock(&self.banners);
        let Some(banner) = banners.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        if let Some(v) = changes.title {
            banner.title = Some(v);
        }
        if let Some(v) = changes.images {
            banner.images = v;
        }
        banner.updated_at = Utc::now();
        Ok(Some(banner.clone()))
    }

    async fn delete_banner(&self, id: Uuid) -> Result<Option<Banner>, ApiError> {
        let mut banners = lock(&self.banners);
        match banners.iter().position(|b| b.id == id) {
            Some(pos) => Ok(Some(banners.remove(pos))),
            None => Ok(None),
        }
    }

    async fn create_contact(&self, new_contact: NewContact) -> Result<Contact, ApiError> {
        let mut contacts = lock(&self.contacts);
        if contacts.iter().any(|c| c.email == new_contact.email) {
            return Err(unique_violation());
        }
        let now = Utc::now();
        let contact = Contact {
            id: Uuid::new_v4(),
            full_name: new_contact.full_name,
            email: new_contact.email,
            phone_number: new_contact.phone_number,
            newsletter_opt_in: new_contact.newsletter_opt_in,
            message: new_contact.message,
            created_at: now,
            updated_at: now,
        };
        contacts.push(contact.clone());
        Ok(contact)
    }

    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, ApiError> {
        Ok(lock(&self.contacts)
            .iter()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, ApiError> {
        Ok(newest_first(&lock(&self.contacts)))
    }

    async fn delete_contact(&self, id: Uuid) -> Result<Option<Contact>, ApiError> {
        let mut contacts = lock(&self.contacts);
        match contacts.iter().position(|c| c.id == id) {
            Some(pos) => Ok(Some(contacts.remove(pos))),
            None => Ok(None),
        }
    }
}

// --- Test App Setup ---

struct TestApp {
    router: Router,
    repo: Arc<InMemoryRepository>,
    storage: Arc<MockStorageService>,
    mailer: Arc<MockMailer>,
    admin_id: Uuid,
    visitor_id: Uuid,
}

async fn spawn_app() -> TestApp {
    spawn_app_with(MockStorageService::new(), MockMailer::new()).await
}

async fn spawn_app_with(storage: MockStorageService, mailer: MockMailer) -> TestApp {
    let repo = Arc::new(InMemoryRepository::default());
    let storage = Arc::new(storage);
    let mailer = Arc::new(mailer);
    // Default config runs in Env::Local, which enables the x-user-id bypass
    // the requests below lean on.
    let config = AppConfig::default();

    let admin = repo
        .create_user(NewUser {
            full_name: "Gallery Admin".to_string(),
            email: "admin@gallery.test".to_string(),
            password_hash: "seeded".to_string(),
            phone_number: "+10000000001".to_string(),
            role: Role::Admin,
            newsletter_opt_in: false,
        })
        .await
        .unwrap();
    let visitor = repo
        .create_user(NewUser {
            full_name: "Plain Visitor".to_string(),
            email: "visitor@gallery.test".to_string(),
            password_hash: "seeded".to_string(),
            phone_number: "+10000000002".to_string(),
            role: Role::Visitor,
            newsletter_opt_in: false,
        })
        .await
        .unwrap();

    let state = AppState {
        repo: repo.clone() as RepositoryState,
        storage: storage.clone() as StorageState,
        mailer: mailer.clone() as MailerState,
        config,
    };

    TestApp {
        router: create_router(state),
        repo,
        storage,
        mailer,
        admin_id: admin.id,
        visitor_id: visitor.id,
    }
}

// Seeds bypass the HTTP layer on purpose: the lifecycle under test should be
// the only thing exercising the endpoint being asserted.
async fn seed_artist(app: &TestApp, email: &str) -> Artist {
    app.repo
        .create_artist(NewArtist {
            first_name: "Frida".to_string(),
            last_name: "Kahlo".to_string(),
            email: email.to_string(),
            images: vec!["http://localhost:9000/mock-bucket/artists/seed-portrait-99".to_string()],
            date_of_birth: "1907-07-06".to_string(),
            present_address: "Coyoacan, Mexico City".to_string(),
            description: "Painter of unflinching self-portraits.".to_string(),
        })
        .await
        .unwrap()
}

async fn seed_artwork(app: &TestApp, artist_id: Uuid) -> ArtWork {
    app.repo
        .create_artwork(NewArtWork {
            name: "The Two Fridas".to_string(),
            images: vec!["http://localhost:9000/mock-bucket/artworks/seed-piece-98".to_string()],
            artist_id,
            price: "$400".to_string(),
            description: "Double self-portrait, oil on canvas.".to_string(),
        })
        .await
        .unwrap()
}

// --- Request Builders ---

const BOUNDARY: &str = "gallery-test-boundary";

fn multipart_body(fields: &[(&str, &str)], files: &[&str]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    for filename in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\nfake image bytes\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn multipart_request(
    method: &str,
    uri: &str,
    user: Option<Uuid>,
    fields: &[(&str, &str)],
    files: &[&str],
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(id) = user {
        builder = builder.header("x-user-id", id.to_string());
    }
    builder
        .body(Body::from(multipart_body(fields, files)))
        .unwrap()
}

fn json_request(method: &str, uri: &str, user: Option<Uuid>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(id) = user {
        builder = builder.header("x-user-id", id.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn bare_request(method: &str, uri: &str, user: Option<Uuid>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        builder = builder.header("x-user-id", id.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

// --- Tests ---

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = app
        .router
        .clone()
        .oneshot(bare_request("GET", "/api/v1/health", None))
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_register_login_session_flow() {
    let app = spawn_app().await;

    // Register a fresh account.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/users/register",
            None,
            json!({
                "fullName": "Nora Nilsen",
                "email": "nora@example.com",
                "password": "S3curePass!",
                "phoneNumber": "+4740000000",
                "newsletterOptIn": true
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "nora@example.com");
    assert_eq!(body["user"]["role"], "visitor");
    // The stored hash must never surface in a response body.
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());

    // Same email again is a conflict.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/users/register",
            None,
            json!({
                "fullName": "Nora Again",
                "email": "nora@example.com",
                "password": "other",
                "phoneNumber": "+4740000099"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email is already registered.");

    // A missing required field answers with the envelope, not a 422.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/users/register",
            None,
            json!({ "email": "short@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Missing required field: fullName.");

    // Wrong password and unknown email reject identically.
    let (status, wrong_pw) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/users/login",
            None,
            json!({ "email": "nora@example.com", "password": "not-it" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, unknown) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/users/login",
            None,
            json!({ "email": "ghost@example.com", "password": "not-it" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw["message"], unknown["message"]);

    // Correct credentials issue a token in both the body and a cookie.
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users/login",
            None,
            json!({ "email": "nora@example.com", "password": "S3curePass!" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("accessToken="));
    assert!(cookie.contains("HttpOnly"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], true);
    let token = body["accessToken"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["fullName"], "Nora Nilsen");

    // The cookie alone is enough to resolve the session.
    let session_request = Request::builder()
        .method("GET")
        .uri("/api/v1/users/session")
        .header(header::COOKIE, format!("accessToken={token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, session_request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "nora@example.com");

    // So is the bearer header.
    let bearer_request = Request::builder()
        .method("GET")
        .uri("/api/v1/users/session")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, bearer_request).await;
    assert_eq!(status, StatusCode::OK);

    // Logout clears the cookie.
    let logout_request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/logout")
        .header(header::COOKIE, format!("accessToken={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(logout_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cleared.contains("Max-Age=0"));

    // Without any credential the session endpoint rejects.
    let (status, body) = send(&app, bare_request("GET", "/api/v1/users/session", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing access token.");
}

#[tokio::test]
async fn test_artist_lifecycle() {
    let app = spawn_app().await;

    // Create through the multipart endpoint as the admin.
    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/v1/artists",
            Some(app.admin_id),
            &[
                ("firstName", "Vincent"),
                ("lastName", "van Gogh"),
                ("email", "vincent@gallery.test"),
                ("dateOfBirth", "1853-03-30"),
                ("presentAddress", "Arles, France"),
                ("description", "Post-impressionist."),
            ],
            &["portrait.png"],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Artist added successfully.");
    let artist_id = body["artist"]["id"].as_str().unwrap().to_string();
    let images = body["artist"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert!(images[0].as_str().unwrap().contains("artists/portrait-"));
    assert_eq!(app.storage.uploaded_keys().len(), 1);

    // Newest first: a second artist heads the listing.
    seed_artist(&app, "second@gallery.test").await;
    let (status, body) = send(&app, bare_request("GET", "/api/v1/artists", None)).await;
    assert_eq!(status, StatusCode::OK);
    let artists = body["artists"].as_array().unwrap();
    assert_eq!(artists.len(), 2);
    assert_eq!(artists[0]["email"], "second@gallery.test");

    // Single fetch: anonymous callers get the record without the email.
    let uri = format!("/api/v1/artists/{artist_id}");
    let (status, body) = send(&app, bare_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artist"]["firstName"], "Vincent");
    assert!(body["artist"].get("email").is_none());

    // Admins get the full record.
    let (_, body) = send(&app, bare_request("GET", &uri, Some(app.admin_id))).await;
    assert_eq!(body["artist"]["email"], "vincent@gallery.test");

    // Merge-patch one field; everything else stays.
    let (status, body) = send(
        &app,
        multipart_request(
            "PUT",
            &uri,
            Some(app.admin_id),
            &[("presentAddress", "Auvers-sur-Oise, France")],
            &[],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artist"]["presentAddress"], "Auvers-sur-Oise, France");
    assert_eq!(body["artist"]["firstName"], "Vincent");

    // Replacing the portrait uploads first, then drops the old object.
    let (status, body) = send(
        &app,
        multipart_request("PUT", &uri, Some(app.admin_id), &[], &["new-portrait.png"]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let images = body["artist"]["images"].as_array().unwrap();
    assert!(images[0].as_str().unwrap().contains("artists/new-portrait-"));
    assert!(
        app.storage
            .deleted_keys()
            .iter()
            .any(|key| key.contains("artists/portrait-"))
    );

    // An empty form is rejected outright.
    let (status, body) = send(
        &app,
        multipart_request("PUT", &uri, Some(app.admin_id), &[], &[]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "At least one field is required to update.");

    // Delete returns the removed record and clears its images.
    let (status, body) = send(&app, bare_request("DELETE", &uri, Some(app.admin_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artist"]["firstName"], "Vincent");
    assert!(
        app.storage
            .deleted_keys()
            .iter()
            .any(|key| key.contains("artists/new-portrait-"))
    );

    // Gone means 404 from here on.
    let (status, _) = send(&app, bare_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, bare_request("DELETE", &uri, Some(app.admin_id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_artist_admin_gate() {
    let app = spawn_app().await;
    let fields = [
        ("firstName", "X"),
        ("lastName", "Y"),
        ("email", "x@y.test"),
        ("dateOfBirth", "1990-01-01"),
        ("presentAddress", "Z"),
        ("description", "D"),
    ];

    // A logged-in visitor is forbidden.
    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/v1/artists",
            Some(app.visitor_id),
            &fields,
            &["p.png"],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Only admins can add artists.");

    // An anonymous caller is unauthorized before the form is even read.
    let (status, _) = send(
        &app,
        multipart_request("POST", "/api/v1/artists", None, &fields, &["p.png"]),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Neither attempt uploaded anything.
    assert!(app.storage.uploaded_keys().is_empty());
}

#[tokio::test]
async fn test_bad_bearer_token_reads_as_anonymous() {
    let app = spawn_app().await;
    let artist = seed_artist(&app, "redact-me@gallery.test").await;

    // A broken credential on a public route never rejects; the caller is
    // simply treated as anonymous and gets the redacted shape.
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/v1/artists/{}", artist.id))
        .header(header::AUTHORIZATION, "Bearer not-a-real-token")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artist"]["firstName"], "Frida");
    assert!(body["artist"].get("email").is_none());
}

#[tokio::test]
async fn test_artist_validation_and_conflicts() {
    let app = spawn_app().await;
    seed_artist(&app, "taken@gallery.test").await;

    // Duplicate email conflicts before anything is uploaded.
    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/v1/artists",
            Some(app.admin_id),
            &[
                ("firstName", "A"),
                ("lastName", "B"),
                ("email", "taken@gallery.test"),
                ("dateOfBirth", "1990-01-01"),
                ("presentAddress", "C"),
                ("description", "D"),
            ],
            &["p.png"],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "An artist with this email already exists.");
    assert!(app.storage.uploaded_keys().is_empty());

    // The spelled-out birth date format is accepted and stored verbatim.
    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/v1/artists",
            Some(app.admin_id),
            &[
                ("firstName", "Mary"),
                ("lastName", "Cassatt"),
                ("email", "mary@gallery.test"),
                ("dateOfBirth", "22 May 1844"),
                ("presentAddress", "Paris"),
                ("description", "Impressionist."),
            ],
            &["p.png"],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["artist"]["dateOfBirth"], "22 May 1844");

    // A date in neither format is a 400.
    let (status, _) = send(
        &app,
        multipart_request(
            "POST",
            "/api/v1/artists",
            Some(app.admin_id),
            &[
                ("firstName", "E"),
                ("lastName", "F"),
                ("email", "ef@gallery.test"),
                ("dateOfBirth", "05/22/1844"),
                ("presentAddress", "G"),
                ("description", "H"),
            ],
            &["p.png"],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing image: everything valid except no file part.
    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/v1/artists",
            Some(app.admin_id),
            &[
                ("firstName", "I"),
                ("lastName", "J"),
                ("email", "ij@gallery.test"),
                ("dateOfBirth", "1990-01-01"),
                ("presentAddress", "K"),
                ("description", "L"),
            ],
            &[],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "At least one artist image is required.");

    // A malformed path id is a 400, not a 404.
    let (status, body) = send(
        &app,
        bare_request("GET", "/api/v1/artists/not-a-uuid", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid artist id.");
}

#[tokio::test]
async fn test_artwork_lifecycle_and_listing_shapes() {
    let app = spawn_app().await;
    let artist = seed_artist(&app, "frida@gallery.test").await;

    // Create with two images.
    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/v1/artworks",
            Some(app.admin_id),
            &[
                ("name", "Self-Portrait with Thorn Necklace"),
                ("artistId", &artist.id.to_string()),
                ("price", "$200-500"),
                ("description", "Oil on canvas."),
            ],
            &["front.png", "detail.png"],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Artwork added successfully.");
    let artwork_id = body["artwork"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["artwork"]["images"].as_array().unwrap().len(), 2);
    // The creation response embeds the short artist reference.
    assert_eq!(body["artwork"]["artist"]["email"], "frida@gallery.test");
    assert!(body["artwork"]["artist"].get("description").is_none());

    // A bad price never reaches storage.
    let uploads_before = app.storage.uploaded_keys().len();
    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/v1/artworks",
            Some(app.admin_id),
            &[
                ("name", "N"),
                ("artistId", &artist.id.to_string()),
                ("price", "400"),
                ("description", "D"),
            ],
            &["x.png"],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Price must look like $400 or $200-500.");
    assert_eq!(app.storage.uploaded_keys().len(), uploads_before);

    // An unknown artist is a 404.
    let (status, _) = send(
        &app,
        multipart_request(
            "POST",
            "/api/v1/artworks",
            Some(app.admin_id),
            &[
                ("name", "N"),
                ("artistId", &Uuid::new_v4().to_string()),
                ("price", "$400"),
                ("description", "D"),
            ],
            &["x.png"],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Public listing: artist reduced to the teaser, no email or id.
    let (status, body) = send(&app, bare_request("GET", "/api/v1/artworks", None)).await;
    assert_eq!(status, StatusCode::OK);
    let listed = &body["artworks"].as_array().unwrap()[0];
    assert_eq!(listed["artist"]["firstName"], "Frida");
    assert!(listed["artist"].get("email").is_none());
    assert!(listed["artist"].get("id").is_none());

    // Admin listing: the artist comes through whole.
    let (_, body) = send(
        &app,
        bare_request("GET", "/api/v1/artworks", Some(app.admin_id)),
    )
    .await;
    let listed = &body["artworks"].as_array().unwrap()[0];
    assert_eq!(listed["artist"]["email"], "frida@gallery.test");

    // Per-artist listing works and requires the artist to exist.
    let (status, body) = send(
        &app,
        bare_request(
            "GET",
            &format!("/api/v1/artworks/artist/{}", artist.id),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artworks"].as_array().unwrap().len(), 1);
    let (status, _) = send(
        &app,
        bare_request(
            "GET",
            &format!("/api/v1/artworks/artist/{}", Uuid::new_v4()),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Update the price; replace the image set and check old-object cleanup.
    let uri = format!("/api/v1/artworks/{artwork_id}");
    let (status, body) = send(
        &app,
        multipart_request("PUT", &uri, Some(app.admin_id), &[("price", "$300")], &[]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artwork"]["price"], "$300");

    let (status, _) = send(
        &app,
        multipart_request("PUT", &uri, Some(app.admin_id), &[], &["replacement.png"]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        app.storage
            .deleted_keys()
            .iter()
            .any(|key| key.contains("artworks/front-"))
    );

    // Delete and verify the images go with it.
    let (status, _) = send(&app, bare_request("DELETE", &uri, Some(app.admin_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        app.storage
            .deleted_keys()
            .iter()
            .any(|key| key.contains("artworks/replacement-"))
    );
}

#[tokio::test]
async fn test_artwork_admin_gate() {
    let app = spawn_app().await;
    let artist = seed_artist(&app, "gatekeeper@gallery.test").await;
    let artist_id = artist.id.to_string();
    let fields = [
        ("name", "Unsanctioned"),
        ("artistId", artist_id.as_str()),
        ("price", "$400"),
        ("description", "Should never land."),
    ];

    // A logged-in visitor is forbidden.
    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/v1/artworks",
            Some(app.visitor_id),
            &fields,
            &["piece.png"],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Only admins can add artworks.");

    // An anonymous caller is unauthorized.
    let (status, _) = send(
        &app,
        multipart_request("POST", "/api/v1/artworks", None, &fields, &["piece.png"]),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Neither attempt uploaded or persisted anything.
    assert!(app.storage.uploaded_keys().is_empty());
    assert!(app.repo.list_artworks().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_dangling_artist_reference_lists_as_null() {
    let app = spawn_app().await;
    let artist = seed_artist(&app, "soon-gone@gallery.test").await;
    seed_artwork(&app, artist.id).await;

    // Removing the artist leaves the piece behind.
    app.repo.delete_artist(artist.id).await.unwrap();

    let (status, body) = send(&app, bare_request("GET", "/api/v1/artworks", None)).await;
    assert_eq!(status, StatusCode::OK);
    let listed = &body["artworks"].as_array().unwrap()[0];
    assert_eq!(listed["name"], "The Two Fridas");
    assert!(listed["artist"].is_null());
}

#[tokio::test]
async fn test_exhibition_lifecycle() {
    let app = spawn_app().await;
    let artist = seed_artist(&app, "frida@gallery.test").await;
    let artwork = seed_artwork(&app, artist.id).await;

    // Happy path, with the two-date formats mixed.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/exhibitions",
            Some(app.admin_id),
            json!({
                "artistId": artist.id.to_string(),
                "artworkId": artwork.id.to_string(),
                "startDate": "2026-09-01",
                "endDate": "30-09-2026",
                "description": "A month of Fridas."
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let exhibition_id = body["exhibition"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["exhibition"]["startDate"], "2026-09-01");
    assert_eq!(body["exhibition"]["endDate"], "2026-09-30");

    // Fetch embeds the artwork.
    let uri = format!("/api/v1/exhibitions/{exhibition_id}");
    let (status, body) = send(&app, bare_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exhibition"]["artwork"]["name"], "The Two Fridas");

    // Patch just the end date; the merged range must stay valid.
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &uri,
            Some(app.admin_id),
            json!({ "endDate": "2026-10-15" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exhibition"]["endDate"], "2026-10-15");

    // A patch that would reverse the merged range is rejected.
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &uri,
            Some(app.admin_id),
            json!({ "endDate": "2026-08-01" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "End date cannot be before start date.");

    // An empty patch is rejected up front.
    let (status, body) = send(&app, json_request("PUT", &uri, Some(app.admin_id), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "At least one field is required to update.");

    // Listing embeds artworks too.
    let (_, body) = send(&app, bare_request("GET", "/api/v1/exhibitions", None)).await;
    assert_eq!(
        body["exhibitions"][0]["artwork"]["name"],
        "The Two Fridas"
    );

    // Removing the piece leaves the exhibition with a null artwork.
    app.repo.delete_artwork(artwork.id).await.unwrap();
    let (status, body) = send(&app, bare_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["exhibition"]["artwork"].is_null());

    // Delete ends the lifecycle.
    let (status, _) = send(&app, bare_request("DELETE", &uri, Some(app.admin_id))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, bare_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_exhibition_pairing_rules() {
    let app = spawn_app().await;
    let artist = seed_artist(&app, "frida@gallery.test").await;
    let other_artist = seed_artist(&app, "diego@gallery.test").await;
    let artwork = seed_artwork(&app, artist.id).await;

    // Single-day exhibitions are allowed.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/exhibitions",
            Some(app.admin_id),
            json!({
                "artistId": artist.id.to_string(),
                "artworkId": artwork.id.to_string(),
                "startDate": "2026-09-01",
                "endDate": "2026-09-01",
                "description": "One-day show."
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Reversed range is rejected.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/exhibitions",
            Some(app.admin_id),
            json!({
                "artistId": artist.id.to_string(),
                "artworkId": artwork.id.to_string(),
                "startDate": "2026-09-02",
                "endDate": "2026-09-01",
                "description": "Backwards."
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "End date cannot be before start date.");

    // Pairing an artist with someone else's piece is a 400.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/exhibitions",
            Some(app.admin_id),
            json!({
                "artistId": other_artist.id.to_string(),
                "artworkId": artwork.id.to_string(),
                "startDate": "2026-09-01",
                "endDate": "2026-09-02",
                "description": "Mismatched."
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Artwork does not belong to this artist.");

    // A missing artist is a 404, checked before ownership.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/exhibitions",
            Some(app.admin_id),
            json!({
                "artistId": Uuid::new_v4().to_string(),
                "artworkId": artwork.id.to_string(),
                "startDate": "2026-09-01",
                "endDate": "2026-09-02",
                "description": "No such artist."
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Re-pointing an existing exhibition re-proves ownership for the pair.
    let exhibition = app
        .repo
        .create_exhibition(NewExhibition {
            artist_id: artist.id,
            artwork_id: artwork.id,
            start_date: "2026-09-01".parse().unwrap(),
            end_date: "2026-09-05".parse().unwrap(),
            description: "To be re-pointed.".to_string(),
        })
        .await
        .unwrap();
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/v1/exhibitions/{}", exhibition.id),
            Some(app.admin_id),
            json!({ "artistId": other_artist.id.to_string() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Artwork does not belong to this artist.");

    // Visitors cannot schedule anything.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/exhibitions",
            Some(app.visitor_id),
            json!({
                "artistId": artist.id.to_string(),
                "artworkId": artwork.id.to_string(),
                "startDate": "2026-09-01",
                "endDate": "2026-09-02",
                "description": "Nope."
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_banner_lifecycle() {
    let app = spawn_app().await;

    // Images are mandatory, the title is not.
    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/v1/banners",
            Some(app.admin_id),
            &[("title", "Summer Opening")],
            &[],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "At least one banner image is required.");

    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/v1/banners",
            Some(app.admin_id),
            &[],
            &["hero.png"],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let banner_id = body["banner"]["id"].as_str().unwrap().to_string();
    assert!(body["banner"]["title"].is_null());

    let (status, body) = send(&app, bare_request("GET", "/api/v1/banners", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["banners"].as_array().unwrap().len(), 1);

    // Patch the title without touching the image.
    let uri = format!("/api/v1/banners/{banner_id}");
    let (status, body) = send(
        &app,
        multipart_request(
            "PUT",
            &uri,
            Some(app.admin_id),
            &[("title", "Autumn Opening")],
            &[],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["banner"]["title"], "Autumn Opening");
    assert!(app.storage.deleted_keys().is_empty());

    // Replace the image; the old object goes away.
    let (status, _) = send(
        &app,
        multipart_request("PUT", &uri, Some(app.admin_id), &[], &["hero-v2.png"]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        app.storage
            .deleted_keys()
            .iter()
            .any(|key| key.contains("banners/hero-"))
    );

    // Delete twice: the second answers 404.
    let (status, _) = send(&app, bare_request("DELETE", &uri, Some(app.admin_id))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, bare_request("DELETE", &uri, Some(app.admin_id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contact_flow() {
    let app = spawn_app().await;

    // Without the newsletter opt-in no mail goes out.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/contacts",
            None,
            json!({
                "fullName": "Quiet Visitor",
                "email": "quiet@example.com",
                "phoneNumber": "+4711111111",
                "message": "When do you open?"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["contact"]["newsletterOptIn"], false);
    assert!(app.mailer.sent_mail().is_empty());

    // Opting in notifies the gallery inbox.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/contacts",
            None,
            json!({
                "fullName": "Eager Visitor",
                "email": "eager@example.com",
                "phoneNumber": "+4722222222",
                "newsletterOptIn": true,
                "message": "Sign me up."
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["contact"]["newsletterOptIn"], true);
    let sent = app.mailer.sent_mail();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "curator@gallery.local");
    assert!(sent[0].html_body.contains("Eager Visitor"));

    // One inquiry per address.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/contacts",
            None,
            json!({
                "fullName": "Quiet Again",
                "email": "quiet@example.com",
                "phoneNumber": "+4733333333",
                "message": "Me again."
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "An inquiry with this email already exists.");

    // Listing is public; deletion is admin-only.
    let (status, body) = send(&app, bare_request("GET", "/api/v1/contacts", None)).await;
    assert_eq!(status, StatusCode::OK);
    let contacts = body["contacts"].as_array().unwrap();
    assert_eq!(contacts.len(), 2);
    let first_id = contacts[1]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/contacts/{first_id}");
    let (status, _) = send(&app, bare_request("DELETE", &uri, Some(app.visitor_id))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, bare_request("DELETE", &uri, Some(app.admin_id))).await;
    assert_eq!(status, StatusCode::OK);

    // The freed address may inquire again.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/contacts",
            None,
            json!({
                "fullName": "Quiet Third",
                "email": "quiet@example.com",
                "phoneNumber": "+4744444444",
                "message": "Third time."
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_contact_mail_failure_keeps_inquiry() {
    let app = spawn_app_with(MockStorageService::new(), MockMailer::new_failing()).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/contacts",
            None,
            json!({
                "fullName": "Unlucky Visitor",
                "email": "unlucky@example.com",
                "phoneNumber": "+4755555555",
                "newsletterOptIn": true,
                "message": "Hope this arrives."
            }),
        ),
    )
    .await;

    // The transport failure surfaces as a 500, but the inquiry is already
    // stored by the time the mail is attempted.
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to send notification email")
    );
    assert_eq!(app.repo.list_contacts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_failure_rolls_nothing_into_the_catalog() {
    let app = spawn_app_with(MockStorageService::new_failing(), MockMailer::new()).await;

    let (status, body) = send(
        &app,
        multipart_request(
            "POST",
            "/api/v1/artists",
            Some(app.admin_id),
            &[
                ("firstName", "Never"),
                ("lastName", "Stored"),
                ("email", "never@gallery.test"),
                ("dateOfBirth", "1990-01-01"),
                ("presentAddress", "Nowhere"),
                ("description", "Should not persist."),
            ],
            &["p.png"],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Image upload failed")
    );
    assert!(app.repo.list_artists().await.unwrap().is_empty());
}
