//! Stateless session tokens: HS256-signed JWTs carrying identity and role,
//! valid for one hour. There is no refresh flow and no revocation list.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::Role;

const TOKEN_VALIDITY_SECS: usize = 3600;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        TokenService {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn issue(
        &self,
        user_id: &str,
        email: &str,
        role: Role,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat,
            exp: iat + TOKEN_VALIDITY_SECS,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    // Accepts the raw Authorization header value, with or without a
    // "Bearer " prefix.
    pub fn verify(&self, raw: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token = strip_bearer(raw);
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

pub fn strip_bearer(raw: &str) -> &str {
    match raw.strip_prefix("Bearer ") {
        Some(rest) => rest.trim(),
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret")
    }

    #[test]
    fn issued_tokens_verify_and_carry_the_identity() {
        let tokens = service();
        let token = tokens.issue("user-1", "a@b.com", Role::Admin).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn tokens_expire_after_exactly_one_hour() {
        let tokens = service();
        let token = tokens.issue("user-1", "a@b.com", Role::User).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn bearer_prefix_is_stripped_before_verification() {
        let tokens = service();
        let token = tokens.issue("user-1", "a@b.com", Role::User).unwrap();

        assert!(tokens.verify(&format!("Bearer {}", token)).is_ok());
        assert!(tokens.verify(&format!("Bearer {} ", token)).is_ok());
        // raw tokens are accepted too
        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn strip_bearer_leaves_raw_tokens_alone() {
        assert_eq!(strip_bearer("Bearer abc.def"), "abc.def");
        assert_eq!(strip_bearer("abc.def"), "abc.def");
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let tokens = service();
        let token = tokens.issue("user-1", "a@b.com", Role::User).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(tokens.verify(&tampered).is_err());

        // signed with a different secret
        let other = TokenService::new("other-secret")
            .issue("user-1", "a@b.com", Role::User)
            .unwrap();
        assert!(tokens.verify(&other).is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let tokens = service();
        let iat = Utc::now().timestamp() as usize - 7200;
        let claims = Claims {
            sub: "user-1".into(),
            email: "a@b.com".into(),
            role: Role::User,
            iat,
            exp: iat + 3600,
        };
        let token = encode(&Header::default(), &claims, &tokens.encoding_key).unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(service().verify("not-a-token").is_err());
    }
}
