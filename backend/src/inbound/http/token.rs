//! Access-token issuance and validation.
//!
//! Tokens are HS256 JWTs carrying the username as subject plus issue and
//! expiry timestamps. Validation is stateless; the identity extractor
//! confirms the subject still names a registered user afterwards.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::Error;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated username.
    pub sub: String,
    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,
    /// Expiry timestamp (Unix epoch seconds).
    pub exp: i64,
}

/// Signs and validates access tokens with a shared secret.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from the configured secret and token lifetime.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a token for the given username.
    pub fn issue(&self, username: &str) -> Result<String, Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|error| Error::internal(format!("token signing failed: {error}")))
    }

    /// Validate a token and return its claims. Any failure (bad signature,
    /// expiry, malformed payload) reads as unauthorised.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|_| Error::unauthorized("invalid or expired token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret", Duration::minutes(15))
    }

    #[test]
    fn issued_tokens_verify_and_carry_the_subject() {
        let codec = codec();
        let token = codec.issue("reader42").expect("issue token");
        let claims = codec.verify(&token).expect("verify token");
        assert_eq!(claims.sub, "reader42");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let token = TokenCodec::new("other-secret", Duration::minutes(15))
            .issue("reader42")
            .expect("issue token");
        let err = codec().verify(&token).expect_err("foreign token");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let codec = TokenCodec::new("test-secret", Duration::minutes(-5));
        let token = codec.issue("reader42").expect("issue token");
        let err = codec.verify(&token).expect_err("expired token");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        let err = codec()
            .verify("not-a-jwt")
            .expect_err("garbage token");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
