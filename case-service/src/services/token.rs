use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::models::Role;

/// Issues and verifies stateless, HMAC-signed session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Identity recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: Uuid,
    pub role: Role,
}

/// Why a token was refused. Every variant means "invalid"; the reason only
/// feeds logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidToken {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry: Duration::try_hours(config.expiry_hours).unwrap_or(Duration::MAX),
        }
    }

    /// Issue a token for `subject_id` valid for the configured window.
    pub fn issue(&self, subject_id: Uuid, role: Role) -> Result<String, anyhow::Error> {
        self.issue_at(subject_id, role, Utc::now())
    }

    /// Issue a token as if the current time were `issued_at`.
    pub fn issue_at(
        &self,
        subject_id: Uuid,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, anyhow::Error> {
        let expires_at = issued_at
            .checked_add_signed(self.expiry)
            .ok_or_else(|| anyhow::anyhow!("Token expiry is out of range"))?;

        let claims = SessionClaims {
            sub: subject_id.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode session token: {}", e))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Identity, InvalidToken> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against `now`. The token is expired once `now >= exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, InvalidToken> {
        // Expiry is checked below against `now`, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => InvalidToken::BadSignature,
                ErrorKind::ExpiredSignature => InvalidToken::Expired,
                _ => InvalidToken::Malformed,
            })?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(InvalidToken::Expired);
        }

        let subject_id = Uuid::parse_str(&claims.sub).map_err(|_| InvalidToken::Malformed)?;

        Ok(Identity {
            subject_id,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn service(secret: &str, expiry_hours: i64) -> TokenService {
        TokenService::new(&TokenConfig {
            secret: Secret::new(secret.to_string()),
            expiry_hours,
        })
    }

    #[test]
    fn test_issue_and_verify() -> Result<(), anyhow::Error> {
        let tokens = service("test-secret", 1);
        let subject = Uuid::new_v4();

        let token = tokens.issue(subject, Role::Advogado)?;
        assert!(!token.is_empty());

        let identity = tokens.verify(&token).expect("fresh token must verify");
        assert_eq!(identity.subject_id, subject);
        assert_eq!(identity.role, Role::Advogado);

        Ok(())
    }

    #[test]
    fn test_expired_token_is_invalid() -> Result<(), anyhow::Error> {
        let tokens = service("test-secret", 1);
        let issued = Utc::now() - Duration::hours(2);

        let token = tokens.issue_at(Uuid::new_v4(), Role::Admin, issued)?;

        assert_eq!(tokens.verify(&token), Err(InvalidToken::Expired));
        Ok(())
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() -> Result<(), anyhow::Error> {
        let tokens = service("test-secret", 1);
        let issued = Utc::now();
        let token = tokens.issue_at(Uuid::new_v4(), Role::Admin, issued)?;

        let just_before = issued + Duration::hours(1) - Duration::seconds(1);
        assert!(tokens.verify_at(&token, just_before).is_ok());

        let at_expiry = issued + Duration::hours(1);
        assert_eq!(
            tokens.verify_at(&token, at_expiry),
            Err(InvalidToken::Expired)
        );
        Ok(())
    }

    #[test]
    fn test_tampered_payload_is_invalid() -> Result<(), anyhow::Error> {
        let tokens = service("test-secret", 1);
        let token = tokens.issue(Uuid::new_v4(), Role::Assistente)?;

        // Swap in a payload claiming a different role, keeping the signature.
        let forged = tokens.issue(Uuid::new_v4(), Role::Admin)?;
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(tokens.verify(&tampered), Err(InvalidToken::BadSignature));
        Ok(())
    }

    #[test]
    fn test_tampered_signature_is_invalid() -> Result<(), anyhow::Error> {
        let tokens = service("test-secret", 1);
        let token = tokens.issue(Uuid::new_v4(), Role::Advogado)?;

        let (head, signature) = token.rsplit_once('.').expect("three segments");
        let mut sig: Vec<char> = signature.chars().collect();
        sig[0] = if sig[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}", head, sig.into_iter().collect::<String>());

        assert!(tokens.verify(&tampered).is_err());
        Ok(())
    }

    #[test]
    fn test_rotated_secret_invalidates_tokens() -> Result<(), anyhow::Error> {
        let token = service("old-secret", 1).issue(Uuid::new_v4(), Role::Admin)?;

        assert_eq!(
            service("new-secret", 1).verify(&token),
            Err(InvalidToken::BadSignature)
        );
        Ok(())
    }

    #[test]
    fn test_garbage_is_classified_not_panicking() {
        let tokens = service("test-secret", 1);

        for input in ["", "abc", "a.b.c", "...", "Bearer x.y.z", "\u{0}\u{1}"] {
            assert_eq!(tokens.verify(input), Err(InvalidToken::Malformed), "{input:?}");
        }
    }

    #[test]
    fn test_out_of_range_expiry_is_an_error() {
        for expiry_hours in [1_000_000_000_000, i64::MAX] {
            let tokens = service("test-secret", expiry_hours);
            assert!(tokens.issue(Uuid::new_v4(), Role::Admin).is_err());
        }
    }

    #[test]
    fn test_unknown_role_is_malformed() {
        let tokens = service("test-secret", 1);
        let claims = serde_json::json!({
            "sub": Uuid::new_v4().to_string(),
            "role": "ESTAGIARIO",
            "iat": Utc::now().timestamp(),
            "exp": (Utc::now() + Duration::hours(1)).timestamp(),
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(tokens.verify(&token), Err(InvalidToken::Malformed));
    }
}
