/// Token verification
///
/// Cadence never mints sessions itself; the external auth provider issues
/// JWTs signed with a secret shared with this server. We only verify and
/// read the subject and role claims.
use crate::error::{Result, ServerError};
use cadence_core::{Role, UserId};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub role: Role,  // Authorization role resolved by the auth provider
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
}

impl AuthService {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Verify a token and extract the caller identity
    pub fn verify_access_token(&self, token: &str) -> Result<(UserId, Role)> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        let claims = token_data.claims;

        if claims.sub.is_empty() {
            return Err(ServerError::Auth("Token has no subject".to_string()));
        }

        Ok((UserId::new(claims.sub), claims.role))
    }

    /// Mint an access token the way the auth provider would (used in tests
    /// and by local tooling; production tokens come from the provider)
    pub fn create_access_token(&self, user_id: &UserId, role: Role) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(24);

        let claims = Claims {
            sub: user_id.as_str().to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip_preserves_identity_and_role() {
        let auth = AuthService::new("secret".to_string());
        let user_id = UserId::new("user-123");

        let token = auth.create_access_token(&user_id, Role::Admin).unwrap();
        let (verified_id, role) = auth.verify_access_token(&token).unwrap();

        assert_eq!(verified_id, user_id);
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn token_signed_with_wrong_secret_is_rejected() {
        let issuer = AuthService::new("secret-a".to_string());
        let verifier = AuthService::new("secret-b".to_string());

        let token = issuer
            .create_access_token(&UserId::new("user-123"), Role::User)
            .unwrap();

        assert!(verifier.verify_access_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let auth = AuthService::new("secret".to_string());
        assert!(auth.verify_access_token("not-a-jwt").is_err());
    }
}
