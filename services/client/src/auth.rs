//! Authentication and account operations
//!
//! `AuthService` talks to the auth and profile endpoints and keeps the
//! `SessionState` in step with the results. Sign-out style operations are
//! local-first: the session is cleared even when the backend call fails.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{ApiClient, ApiRequest, FormPart};
use crate::error::{ClientError, ClientResult};
use crate::models::user::ProfilePatch;
use crate::models::{Envelope, PictureUpload, Profile, ProfileUpdate, User};
use crate::session::{Session, SessionState};
use crate::validation;

/// Request for user login
#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Request for user registration
#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Request for a password change
#[derive(Serialize)]
struct PasswordRequest<'a> {
    password: &'a str,
    password_confirmation: &'a str,
}

/// `data` of login and register responses
#[derive(Deserialize)]
struct AuthPayload {
    token: String,
    user: User,
}

/// User record inside the profile update response
#[derive(Deserialize)]
struct UserRecord {
    #[serde(deserialize_with = "crate::models::deserialize_id")]
    id: i64,
    name: String,
    email: String,
    #[serde(default)]
    created_at: Option<String>,
}

/// `data` of `POST /profile`: `[profile, user]`
#[derive(Deserialize)]
struct ProfileUpdatePayload(Profile, UserRecord);

/// Outcome of a local-first sign-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOutReport {
    /// The backend confirmed the operation
    pub backend_acknowledged: bool,
    /// Why the backend call failed, if it did
    pub backend_error: Option<String>,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: SessionState,
}

impl AuthService {
    pub fn new(api: ApiClient, session: SessionState) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Sign in with email and password
    ///
    /// On failure the current session is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        validation::validate_login(email, password)?;
        info!("Login attempt for user: {}", email.trim());

        let request = ApiRequest::post("/auth/login")
            .fallback("Login failed")
            .json(&LoginRequest {
                email: email.trim(),
                password,
            })?;
        let payload = self.authenticate(request, "Login failed").await?;

        self.session.establish(payload.user, payload.token).await
    }

    /// Create an account and sign in
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ClientResult<Session> {
        validation::validate_registration(name, email, password)?;
        info!("Registration attempt for user: {}", email.trim());

        let request = ApiRequest::post("/auth/register")
            .fallback("Registration failed")
            .json(&RegisterRequest {
                name: name.trim(),
                email: email.trim(),
                password,
            })?;
        let payload = self.authenticate(request, "Registration failed").await?;

        self.session.establish(payload.user, payload.token).await
    }

    /// Sign out
    ///
    /// The backend is notified first, but the local session is cleared
    /// whatever the outcome. Only a failure to clear local storage is
    /// returned as an error.
    pub async fn logout(&self) -> ClientResult<SignOutReport> {
        info!("Logout request");
        self.sign_out(ApiRequest::post("/logout").fallback("Logout failed"))
            .await
    }

    /// Delete the account, then sign out locally whatever the backend said
    pub async fn delete_account(&self) -> ClientResult<SignOutReport> {
        info!("Account deletion request");
        self.sign_out(ApiRequest::post("/account/delete").fallback("Account deletion failed"))
            .await
    }

    /// Update profile fields
    ///
    /// Nothing changes locally until the backend accepts the update. If the
    /// session ends while the call is in flight the result is discarded
    /// and `SessionEnded` is returned.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<User> {
        validation::validate_profile(&update.name, &update.email)?;
        let current = self.session.user().ok_or(ClientError::NotSignedIn)?;
        let generation = self.session.generation();
        info!("Updating profile for user: {}", current.id);

        let request = ApiRequest::post("/profile")
            .fallback("Profile update failed")
            .json(update)?;
        let envelope: Envelope<ProfileUpdatePayload> = self.api.send(request).await?;
        let ProfileUpdatePayload(profile, record) = envelope.into_data("Profile update failed", || {
            ClientError::Decode("profile update response has no data".to_string())
        })?;

        let user = User {
            id: record.id,
            name: record.name,
            profile: Some(Profile {
                email: Some(record.email.clone()),
                ..profile
            }),
            email: record.email,
            created_at: record.created_at.or(current.created_at),
        };

        if !self.session.replace_user(user.clone(), generation).await? {
            return Err(ClientError::SessionEnded);
        }

        Ok(user)
    }

    /// Upload a new profile picture
    ///
    /// Returns `false` when the backend reports the upload as unsuccessful;
    /// the stored user is then left as it was.
    pub async fn update_picture(&self, picture: PictureUpload) -> ClientResult<bool> {
        let current = self.session.user().ok_or(ClientError::NotSignedIn)?;
        let generation = self.session.generation();
        info!("Uploading profile picture for user: {}", current.id);

        let request = ApiRequest::post("/profile/picture")
            .fallback("Profile picture upload failed")
            .form(vec![FormPart::file(
                "picture",
                picture.bytes,
                picture.file_name,
                picture.mime_type,
            )]);
        let envelope: Envelope<ProfilePatch> = self.api.send(request).await?;

        if !envelope.succeeded() {
            warn!(
                "Profile picture upload rejected: {}",
                envelope.message.as_deref().unwrap_or("no message")
            );
            return Ok(false);
        }

        let mut user = current;
        user.apply_profile_patch(envelope.data.unwrap_or_default());

        if !self.session.replace_user(user, generation).await? {
            return Err(ClientError::SessionEnded);
        }

        Ok(true)
    }

    /// Change the account password
    pub async fn update_password(&self, password: &str, confirmation: &str) -> ClientResult<()> {
        validation::validate_password_confirmation(password, confirmation)?;
        if !self.session.is_authenticated() {
            return Err(ClientError::NotSignedIn);
        }

        let request = ApiRequest::post("/profile/password")
            .fallback("Password update failed")
            .json(&PasswordRequest {
                password,
                password_confirmation: confirmation,
            })?;
        let envelope: Envelope<serde_json::Value> = self.api.send(request).await?;

        if !envelope.succeeded() {
            return Err(ClientError::Api {
                status: 200,
                message: envelope
                    .message
                    .unwrap_or_else(|| "Password update failed".to_string()),
            });
        }

        info!("Password updated");
        Ok(())
    }

    async fn authenticate(
        &self,
        request: ApiRequest,
        fallback: &'static str,
    ) -> ClientResult<AuthPayload> {
        let envelope: Envelope<AuthPayload> = self.api.send(request).await?;
        envelope.into_data(fallback, || {
            ClientError::Decode("authentication response has no data".to_string())
        })
    }

    async fn sign_out(&self, request: ApiRequest) -> ClientResult<SignOutReport> {
        let report = if self.session.token().is_some() {
            match self.api.send::<serde_json::Value>(request).await {
                Ok(_) => SignOutReport {
                    backend_acknowledged: true,
                    backend_error: None,
                },
                Err(e) => {
                    warn!("Backend sign-out failed, clearing local session anyway: {}", e);
                    SignOutReport {
                        backend_acknowledged: false,
                        backend_error: Some(e.user_message()),
                    }
                }
            }
        } else {
            SignOutReport {
                backend_acknowledged: false,
                backend_error: None,
            }
        };

        self.session.clear().await?;
        Ok(report)
    }
}
