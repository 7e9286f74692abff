use auth::JwtError;
use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for first/last name validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersonNameError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} too long: maximum {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email is required")]
    Missing,

    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// Input rejected before any store access
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error(transparent)]
    UserId(#[from] UserIdError),

    #[error(transparent)]
    Name(#[from] PersonNameError),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Password(#[from] PasswordPolicyError),
}

/// Top-level error for all identity operations
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Identity already exists: {0}")]
    DuplicateIdentity(String),

    /// Deliberately identical for an unknown email and a wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] JwtError),

    #[error("User not found: {0}")]
    NotFound(String),

    // Infrastructure errors
    #[error("Store error: {0}")]
    Store(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl From<UserIdError> for IdentityError {
    fn from(err: UserIdError) -> Self {
        IdentityError::Validation(err.into())
    }
}

impl From<PersonNameError> for IdentityError {
    fn from(err: PersonNameError) -> Self {
        IdentityError::Validation(err.into())
    }
}

impl From<EmailError> for IdentityError {
    fn from(err: EmailError) -> Self {
        IdentityError::Validation(err.into())
    }
}

impl From<PasswordPolicyError> for IdentityError {
    fn from(err: PasswordPolicyError) -> Self {
        IdentityError::Validation(err.into())
    }
}

impl From<auth::PasswordError> for IdentityError {
    fn from(err: auth::PasswordError) -> Self {
        IdentityError::Crypto(err.to_string())
    }
}
