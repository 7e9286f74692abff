use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Claims;

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
use crate::domain::identity::ports::IdentityServicePort;
use crate::domain::identity::ports::UserRepository;

/// Domain service implementation for identity operations.
///
/// Every store call runs under `operation_timeout`. Password hashing and
/// verification run on the blocking pool.
pub struct IdentityService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    operation_timeout: Duration,
}

impl<UR> IdentityService<UR>
where
    UR: UserRepository,
{
    /// Create a new identity service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token codec
    /// * `operation_timeout` - Deadline for each individual store call
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            authenticator,
            operation_timeout,
        }
    }

    async fn store<T, F>(&self, operation: &'static str, call: F) -> Result<T, IdentityError>
    where
        F: Future<Output = Result<T, IdentityError>>,
    {
        match tokio::time::timeout(self.operation_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout_ms = self.operation_timeout.as_millis() as u64,
                    "Store call timed out"
                );
                Err(IdentityError::Store(format!("{} timed out", operation)))
            }
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, IdentityError> {
        let authenticator = Arc::clone(&self.authenticator);
        let hash = tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| IdentityError::Crypto(format!("Hashing task failed: {}", e)))??;

        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: String,
        stored_hash: String,
    ) -> Result<bool, IdentityError> {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || authenticator.verify_password(&password, &stored_hash))
            .await
            .map_err(|e| IdentityError::Crypto(format!("Verification task failed: {}", e)))
    }

    fn claims_for(user: &User) -> Claims {
        Claims::for_user(user.id).with_names(user.first_name.as_str(), user.last_name.as_str())
    }

    fn grant(user: &User, access_token: String) -> AccessGrant {
        AccessGrant {
            access_token,
            user_id: user.id,
            first_name: user.first_name.as_str().to_string(),
            last_name: user.last_name.as_str().to_string(),
        }
    }

    fn missing_principal(user_id: &UserId) -> IdentityError {
        tracing::error!(user_id = %user_id, "Authenticated principal has no user record");
        IdentityError::NotFound(user_id.to_string())
    }
}

#[async_trait]
impl<UR> IdentityServicePort for IdentityService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<AccessGrant, IdentityError> {
        let existing = self
            .store(
                "find_by_email",
                self.repository.find_by_email(command.email.as_str()),
            )
            .await?;
        if existing.is_some() {
            tracing::info!("Registration rejected: email already registered");
            return Err(IdentityError::DuplicateIdentity(
                command.email.as_str().to_string(),
            ));
        }

        let password_hash = self.hash_password(command.password).await?;

        let new_user = NewUser {
            first_name: command.first_name,
            last_name: command.last_name,
            email: command.email,
            password_hash,
        };
        let user = self
            .store("create", self.repository.create(new_user))
            .await?;

        let access_token = self
            .authenticator
            .issue_token(Self::claims_for(&user))
            .map_err(|e| IdentityError::Crypto(format!("Token signing failed: {}", e)))?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(Self::grant(&user, access_token))
    }

    async fn login(&self, command: LoginCommand) -> Result<AccessGrant, IdentityError> {
        let user = self
            .store("find_by_email", self.repository.find_by_email(&command.email))
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let stored_hash = user.password_hash.clone();
        let claims = Self::claims_for(&user);
        let outcome = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, claims)
        })
        .await
        .map_err(|e| IdentityError::Crypto(format!("Verification task failed: {}", e)))?;

        match outcome {
            Ok(result) => {
                tracing::info!(user_id = %user.id, "User logged in");
                Ok(Self::grant(&user, result.access_token))
            }
            Err(AuthenticationError::InvalidCredentials) => {
                tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
                Err(IdentityError::InvalidCredentials)
            }
            Err(AuthenticationError::JwtError(e)) => Err(IdentityError::Crypto(format!(
                "Token signing failed: {}",
                e
            ))),
        }
    }

    async fn get_profile(&self, user_id: &UserId) -> Result<Profile, IdentityError> {
        let user = self
            .store("find_by_id", self.repository.find_by_id(user_id))
            .await?
            .ok_or_else(|| Self::missing_principal(user_id))?;

        Ok(Profile::from(&user))
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        command: UpdateProfileCommand,
    ) -> Result<Profile, IdentityError> {
        let clash = self
            .store(
                "find_by_email_excluding",
                self.repository
                    .find_by_email_excluding(command.email.as_str(), user_id),
            )
            .await?;
        if clash.is_some() {
            tracing::info!(user_id = %user_id, "Profile update rejected: email in use");
            return Err(IdentityError::DuplicateIdentity(
                command.email.as_str().to_string(),
            ));
        }

        let updated = self
            .store(
                "update_profile",
                self.repository.update_profile(user_id, &command),
            )
            .await?
            .ok_or_else(|| Self::missing_principal(user_id))?;

        tracing::info!(user_id = %user_id, "Profile updated");

        Ok(Profile::from(&updated))
    }

    async fn change_password(
        &self,
        user_id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), IdentityError> {
        let user = self
            .store("find_by_id", self.repository.find_by_id(user_id))
            .await?
            .ok_or_else(|| Self::missing_principal(user_id))?;

        let matches = self
            .verify_password(command.current_password, user.password_hash)
            .await?;
        if !matches {
            tracing::info!(user_id = %user_id, "Password change rejected: wrong current password");
            return Err(IdentityError::InvalidCredentials);
        }

        let password_hash = self.hash_password(command.new_password).await?;
        let updated = self
            .store(
                "update_password_hash",
                self.repository.update_password_hash(user_id, &password_hash),
            )
            .await?;
        if !updated {
            return Err(Self::missing_principal(user_id));
        }

        tracing::info!(user_id = %user_id, "Password changed");

        Ok(())
    }

    fn verify_token(&self, token: &str) -> Result<AuthorizedPrincipal, IdentityError> {
        let claims = self.authenticator.validate_token(token).map_err(|e| {
            tracing::warn!(error = %e, "Access token rejected");
            IdentityError::Unauthenticated(e)
        })?;

        AuthorizedPrincipal::try_from(claims).map_err(|e| {
            tracing::warn!(error = %e, "Access token carries an unusable subject");
            IdentityError::Unauthenticated(e)
        })
    }
}
