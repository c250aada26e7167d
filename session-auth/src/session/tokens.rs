//! Credential pair types.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

/// Access/refresh token pair as returned by the auth endpoints.
///
/// Either half may be missing; the refresh endpoint is allowed to return only one.
#[derive(Debug, Clone, Default)]
pub struct Tokens {
    /// Bearer credential sent with each authenticated request.
    pub access: Option<SecretString>,
    /// Credential exchanged for a new pair at the refresh endpoint.
    pub refresh: Option<SecretString>,
}

impl Tokens {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: Some(SecretString::from(access.into())),
            refresh: Some(SecretString::from(refresh.into())),
        }
    }

    /// Extract `{ access: { token }, refresh: { token } }` from a response body.
    ///
    /// Missing, non-string, or empty tokens are treated as absent.
    pub fn from_token_pair(body: &Value) -> Self {
        Self {
            access: token_at(body, "access"),
            refresh: token_at(body, "refresh"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access.as_ref().map(|s| s.expose_secret().as_str())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh.as_ref().map(|s| s.expose_secret().as_str())
    }
}

fn token_at(body: &Value, field: &str) -> Option<SecretString> {
    body.get(field)
        .and_then(|v| v.get("token"))
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(|token| SecretString::from(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_pair() {
        let tokens =
            Tokens::from_token_pair(&json!({"access": {"token": "A2"}, "refresh": {"token": "R2"}}));
        assert_eq!(tokens.access_token(), Some("A2"));
        assert_eq!(tokens.refresh_token(), Some("R2"));
    }

    #[test]
    fn test_partial_pair() {
        let tokens = Tokens::from_token_pair(&json!({"access": {"token": "A2"}}));
        assert_eq!(tokens.access_token(), Some("A2"));
        assert_eq!(tokens.refresh_token(), None);
    }

    #[test]
    fn test_empty_and_wrong_shapes_are_absent() {
        let tokens = Tokens::from_token_pair(&json!({"access": {"token": ""}, "refresh": "R2"}));
        assert!(tokens.is_empty());

        assert!(Tokens::from_token_pair(&Value::Null).is_empty());
    }

    #[test]
    fn test_debug_does_not_leak_tokens() {
        let tokens = Tokens::new("super-secret-access", "super-secret-refresh");
        let debug = format!("{:?}", tokens);
        assert!(!debug.contains("super-secret"));
    }
}
