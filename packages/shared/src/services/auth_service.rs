use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::models::auth::{IssuedToken, TokenClaims};
use crate::services::errors::auth_service_errors::AuthServiceError;

const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Verifies bearer tokens issued by the identity provider. The `sub` claim is
/// the user id seen by the lobby and session services.
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: &str) -> Self {
        AuthService {
            jwt_secret: jwt_secret.to_string(),
        }
    }

    /// Mints a token for `user_id`; used by local tooling and tests.
    pub fn generate_token(&self, user_id: &str) -> Result<IssuedToken, AuthServiceError> {
        let now = Utc::now();
        let exp = (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize;
        let iat = now.timestamp() as usize;

        let claims = TokenClaims {
            sub: user_id.to_string(),
            exp,
            iat,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(|e| AuthServiceError::JwtError(format!("{:#?}", e)))?;

        Ok(IssuedToken {
            token,
            token_type: "Bearer".to_string(),
            expires_in: TOKEN_LIFETIME_HOURS * 60 * 60,
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let validation = Validation::default();

        match decode::<TokenClaims>(token, &decoding_key, &validation) {
            Ok(token_data) => Ok(token_data.claims),
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    Err(AuthServiceError::ExpiredToken)
                }
                _ => Err(AuthServiceError::InvalidToken),
            },
        }
    }

    pub fn extract_user_id_from_token(&self, token: &str) -> Result<String, AuthServiceError> {
        let claims = self.verify_token(token)?;
        if claims.sub.is_empty() {
            return Err(AuthServiceError::InvalidToken);
        }
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation_and_verification_roundtrip() {
        let auth_service = AuthService::new("test-secret-key");

        let issued = auth_service.generate_token("roundtrip-user-id").unwrap();

        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 24 * 60 * 60);

        let claims = auth_service.verify_token(&issued.token).unwrap();
        assert_eq!(claims.sub, "roundtrip-user-id");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_token_invalid() {
        let auth_service = AuthService::new("test-secret-key");

        let result = auth_service.verify_token("not-a-jwt");

        assert_eq!(result.unwrap_err(), AuthServiceError::InvalidToken);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = AuthService::new("secret-one");
        let verifier = AuthService::new("secret-two");
        let issued = issuer.generate_token("user").unwrap();

        let result = verifier.extract_user_id_from_token(&issued.token);

        assert_eq!(result.unwrap_err(), AuthServiceError::InvalidToken);
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let auth_service = AuthService::new("test-secret-key");
        let past = (Utc::now() - Duration::hours(2)).timestamp() as usize;
        let claims = TokenClaims {
            sub: "user".to_string(),
            exp: past,
            iat: past - 60,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret-key".as_ref()),
        )
        .unwrap();

        let result = auth_service.verify_token(&token);

        assert_eq!(result.unwrap_err(), AuthServiceError::ExpiredToken);
    }

    #[test]
    fn test_extract_user_id() {
        let auth_service = AuthService::new("test-secret-key");
        let issued = auth_service.generate_token("user-42").unwrap();

        let user_id = auth_service
            .extract_user_id_from_token(&issued.token)
            .unwrap();

        assert_eq!(user_id, "user-42");
    }
}
