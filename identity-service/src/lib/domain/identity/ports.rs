use async_trait::async_trait;

use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::AccessGrant;
use crate::domain::identity::models::AuthorizedPrincipal;
use crate::domain::identity::models::ChangePasswordCommand;
use crate::domain::identity::models::LoginCommand;
use crate::domain::identity::models::NewUser;
use crate::domain::identity::models::Profile;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::UpdateProfileCommand;
use crate::domain::identity::models::User;
use crate::domain::identity::models::UserId;

/// Port for identity domain service operations.
#[async_trait]
pub trait IdentityServicePort: Send + Sync + 'static {
    /// Register a new user and sign them in.
    ///
    /// # Arguments
    /// * `command` - Validated names, email and password
    ///
    /// # Returns
    /// Access grant for the new user
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Email is already registered
    /// * `Crypto` - Hashing or token signing failed
    /// * `Store` - Store operation failed or timed out
    async fn register(&self, command: RegisterCommand) -> Result<AccessGrant, IdentityError>;

    /// Exchange an email/password pair for an access token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password, indistinguishably
    /// * `Crypto` - Token signing failed
    /// * `Store` - Store operation failed or timed out
    async fn login(&self, command: LoginCommand) -> Result<AccessGrant, IdentityError>;

    /// Read the caller's profile.
    ///
    /// # Errors
    /// * `NotFound` - Principal refers to a record that no longer exists
    /// * `Store` - Store operation failed or timed out
    async fn get_profile(&self, user_id: &UserId) -> Result<Profile, IdentityError>;

    /// Replace the caller's names, email and bio.
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Another record already uses the email
    /// * `NotFound` - Principal refers to a record that no longer exists
    /// * `Store` - Store operation failed or timed out
    async fn update_profile(
        &self,
        user_id: &UserId,
        command: UpdateProfileCommand,
    ) -> Result<Profile, IdentityError>;

    /// Replace the caller's password after re-checking the current one.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Current password does not match
    /// * `NotFound` - Principal refers to a record that no longer exists
    /// * `Crypto` - Hashing failed
    /// * `Store` - Store operation failed or timed out
    async fn change_password(
        &self,
        user_id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), IdentityError>;

    /// Verify an access token without touching the store.
    ///
    /// # Errors
    /// * `Unauthenticated` - Token is malformed, tampered with or expired
    fn verify_token(&self, token: &str) -> Result<AuthorizedPrincipal, IdentityError>;
}

/// Persistence operations for user records.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user; the store assigns id and timestamps.
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Email is already registered
    /// * `Store` - Store operation failed
    async fn create(&self, user: NewUser) -> Result<User, IdentityError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user record (None if not found)
    ///
    /// # Errors
    /// * `Store` - Store operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, IdentityError>;

    /// Retrieve user by exact email match.
    ///
    /// # Errors
    /// * `Store` - Store operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, IdentityError>;

    /// Retrieve a user holding `email` other than `excluded`.
    ///
    /// # Errors
    /// * `Store` - Store operation failed
    async fn find_by_email_excluding(
        &self,
        email: &str,
        excluded: &UserId,
    ) -> Result<Option<User>, IdentityError>;

    /// Overwrite the mutable profile fields and refresh `updated_at`.
    ///
    /// # Returns
    /// Updated record, or None when no row matched
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Email taken by another record
    /// * `Store` - Store operation failed
    async fn update_profile(
        &self,
        id: &UserId,
        changes: &UpdateProfileCommand,
    ) -> Result<Option<User>, IdentityError>;

    /// Replace the stored password hash and refresh `updated_at`.
    ///
    /// # Returns
    /// Whether a row matched
    ///
    /// # Errors
    /// * `Store` - Store operation failed
    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, IdentityError>;
}
