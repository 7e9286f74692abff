use std::fmt;
use std::str::FromStr;

use auth::Claims;
use auth::JwtError;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::identity::errors::EmailError;
use crate::domain::identity::errors::PasswordPolicyError;
use crate::domain::identity::errors::PersonNameError;
use crate::domain::identity::errors::UserIdError;

/// User record aggregate.
///
/// Email is unique across all records. The password hash never leaves the
/// domain; outward-facing data goes through [`Profile`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub password_hash: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User unique identifier type, assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// First or last name: non-empty after trimming, at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 100;

    pub fn first_name(value: String) -> Result<Self, PersonNameError> {
        Self::new("First name", value)
    }

    pub fn last_name(value: String) -> Result<Self, PersonNameError> {
        Self::new("Last name", value)
    }

    fn new(field: &'static str, value: String) -> Result<Self, PersonNameError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PersonNameError::Missing { field });
        }

        let length = trimmed.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(PersonNameError::TooLong {
                field,
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Rebuild a name read back from the store without re-validating it.
    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser. The address is
/// kept exactly as supplied; uniqueness is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `Missing` - Email is empty
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        if email.trim().is_empty() {
            return Err(EmailError::Missing);
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub(crate) fn from_stored(email: String) -> Self {
        Self(email)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Minimum length for passwords chosen at registration or password change.
pub const MIN_PASSWORD_LENGTH: usize = 6;

fn check_new_password(field: &'static str, password: &str) -> Result<(), PasswordPolicyError> {
    if password.is_empty() {
        return Err(PasswordPolicyError::Missing { field });
    }

    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort {
            min: MIN_PASSWORD_LENGTH,
            actual: length,
        });
    }

    Ok(())
}

/// Row to insert; id and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub password_hash: String,
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub password: String,
}

impl RegisterCommand {
    /// Construct a register command, enforcing the password policy.
    ///
    /// # Errors
    /// * `Missing` / `TooShort` - Password does not meet the policy
    pub fn new(
        first_name: PersonName,
        last_name: PersonName,
        email: EmailAddress,
        password: String,
    ) -> Result<Self, PasswordPolicyError> {
        check_new_password("Password", &password)?;
        Ok(Self {
            first_name,
            last_name,
            email,
            password,
        })
    }
}

/// Login attempt. The email is looked up verbatim and never validated, so a
/// malformed address fails the same way an unknown one does.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

/// Full replacement of the caller's mutable profile fields
#[derive(Debug, Clone)]
pub struct UpdateProfileCommand {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub bio: Option<String>,
}

/// Command to change the caller's password
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordCommand {
    /// # Errors
    /// * `Missing` - Either password is empty
    /// * `TooShort` - New password shorter than [`MIN_PASSWORD_LENGTH`]
    pub fn new(
        current_password: String,
        new_password: String,
    ) -> Result<Self, PasswordPolicyError> {
        if current_password.is_empty() {
            return Err(PasswordPolicyError::Missing {
                field: "Current password",
            });
        }
        check_new_password("New password", &new_password)?;

        Ok(Self {
            current_password,
            new_password,
        })
    }
}

/// Externally visible projection of a user record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub bio: Option<String>,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.as_str().to_string(),
            last_name: user.last_name.as_str().to_string(),
            email: user.email.as_str().to_string(),
            bio: user.bio.clone(),
        }
    }
}

/// Outcome of a successful registration or login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub access_token: String,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
}

/// Identity resolved from a verified access token, scoped to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedPrincipal {
    pub user_id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<Claims> for AuthorizedPrincipal {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = UserId::from_string(&claims.sub)
            .map_err(|e| JwtError::Malformed(format!("subject: {}", e)))?;
        let issued_at = claims
            .issued_at_utc()
            .ok_or_else(|| JwtError::Malformed("iat out of range".to_string()))?;
        let expires_at = claims
            .expires_at_utc()
            .ok_or_else(|| JwtError::Malformed("exp out of range".to_string()))?;

        Ok(Self {
            user_id,
            first_name: claims.first_name,
            last_name: claims.last_name,
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_name_is_trimmed() {
        let name = PersonName::first_name("  Ann ".to_string()).unwrap();
        assert_eq!(name.as_str(), "Ann");
    }

    #[test]
    fn test_person_name_rejects_blank() {
        assert_eq!(
            PersonName::last_name("   ".to_string()),
            Err(PersonNameError::Missing { field: "Last name" })
        );
    }

    #[test]
    fn test_person_name_rejects_too_long() {
        let result = PersonName::first_name("a".repeat(101));
        assert!(matches!(result, Err(PersonNameError::TooLong { actual: 101, .. })));
    }

    #[test]
    fn test_email_keeps_case() {
        let email = EmailAddress::new("Ann@X.com".to_string()).unwrap();
        assert_eq!(email.as_str(), "Ann@X.com");
    }

    #[test]
    fn test_email_rejects_empty_and_malformed() {
        assert_eq!(EmailAddress::new(String::new()), Err(EmailError::Missing));
        assert!(matches!(
            EmailAddress::new("not-an-email".to_string()),
            Err(EmailError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_change_password_command_policy() {
        assert_eq!(
            ChangePasswordCommand::new("secret1".to_string(), "short".to_string()).unwrap_err(),
            PasswordPolicyError::TooShort { min: 6, actual: 5 }
        );
        assert_eq!(
            ChangePasswordCommand::new(String::new(), "secret12".to_string()).unwrap_err(),
            PasswordPolicyError::Missing {
                field: "Current password"
            }
        );
        assert!(ChangePasswordCommand::new("secret1".to_string(), "secret".to_string()).is_ok());
    }

    #[test]
    fn test_principal_from_claims() {
        let user_id = UserId::new();
        let claims = Claims::for_user(user_id)
            .with_names("Ann", "Lee")
            .issued_at(Utc::now(), chrono::Duration::hours(1));

        let principal = AuthorizedPrincipal::try_from(claims).unwrap();
        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.first_name.as_deref(), Some("Ann"));
        assert!(principal.expires_at > principal.issued_at);
    }

    #[test]
    fn test_principal_rejects_non_uuid_subject() {
        let claims = Claims::for_user("42").issued_at(Utc::now(), chrono::Duration::hours(1));
        assert!(matches!(
            AuthorizedPrincipal::try_from(claims),
            Err(JwtError::Malformed(_))
        ));
    }
}
