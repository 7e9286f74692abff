use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity claims carried by an access token.
///
/// `iat` and `exp` are stamped by [`JwtHandler::issue`](super::JwtHandler::issue);
/// claims built with [`Claims::for_user`] carry zeroes until then.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Denormalized display name
    #[serde(
        rename = "firstName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub first_name: Option<String>,

    #[serde(rename = "lastName", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a user, without display names.
    pub fn for_user(user_id: impl ToString) -> Self {
        Self {
            sub: user_id.to_string(),
            first_name: None,
            last_name: None,
            iat: 0,
            exp: 0,
        }
    }

    /// Attach denormalized display names.
    pub fn with_names(mut self, first_name: impl ToString, last_name: impl ToString) -> Self {
        self.first_name = Some(first_name.to_string());
        self.last_name = Some(last_name.to_string());
        self
    }

    /// Set issued-at and expiration from a reference instant and a lifetime.
    pub fn issued_at(mut self, now: DateTime<Utc>, ttl: Duration) -> Self {
        self.iat = now.timestamp();
        self.exp = (now + ttl).timestamp();
        self
    }

    /// Check if token is expired.
    ///
    /// A token is expired from the second its `exp` is reached.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    pub fn issued_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_user() {
        let claims = Claims::for_user("user123");
        assert_eq!(claims.sub, "user123");
        assert!(claims.first_name.is_none());
        assert!(claims.last_name.is_none());
    }

    #[test]
    fn test_issued_at_sets_lifetime() {
        let now = Utc::now();
        let claims = Claims::for_user("user123")
            .with_names("Ann", "Lee")
            .issued_at(now, Duration::hours(1));

        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 60 * 60);
        assert_eq!(claims.first_name.as_deref(), Some("Ann"));
        assert_eq!(claims.last_name.as_deref(), Some("Lee"));
    }

    #[test]
    fn test_is_expired() {
        let claims = Claims::for_user("user123").issued_at(
            DateTime::from_timestamp(900, 0).expect("valid timestamp"),
            Duration::seconds(100),
        );

        assert!(!claims.is_expired(999)); // Not expired
        assert!(claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001)); // Expired
    }

    #[test]
    fn test_names_serialize_camel_case() {
        let claims = Claims::for_user("42").with_names("Ann", "Lee");
        let json = serde_json::to_value(&claims).expect("Failed to serialize claims");

        assert_eq!(json["firstName"], "Ann");
        assert_eq!(json["lastName"], "Lee");
        assert_eq!(json["sub"], "42");
    }

    #[test]
    fn test_names_are_optional_on_the_wire() {
        let json = serde_json::json!({ "sub": "42", "iat": 1, "exp": 2 });
        let claims: Claims = serde_json::from_value(json).expect("Failed to deserialize claims");

        assert!(claims.first_name.is_none());
        assert_eq!(claims.exp, 2);
    }
}
