use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::models::poll_model::{AuthUser, User};

#[derive(Deserialize, Serialize, Debug)]
pub struct Claims {
    pub uuid: String,
    pub username: String,
    pub is_staff: bool,
    pub exp: usize,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            id: claims.uuid,
            username: claims.username,
            is_staff: claims.is_staff,
        }
    }
}

/// Signs and checks the HS256 tokens kept in cookies.
pub struct JWT {
    secret: String,
    session_lifetime: Duration,
}

pub fn expires_in(lifetime: Duration) -> usize {
    (Utc::now() + lifetime).timestamp().max(0) as usize
}

impl JWT {
    pub fn init(secret: &str, session_days: i64) -> Self {
        JWT {
            secret: secret.to_string(),
            session_lifetime: Duration::days(session_days),
        }
    }

    pub fn session_lifetime(&self) -> Duration {
        self.session_lifetime
    }

    pub fn sign(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            uuid: user.id.clone(),
            username: user.username.clone(),
            is_staff: user.is_staff,
            exp: expires_in(self.session_lifetime),
        };
        self.sign_payload(&claims)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        self.decode_payload(token)
    }

    /// Signs any payload carrying its own `exp` claim.
    pub fn sign_payload<T: Serialize>(&self, payload: &T) -> Result<String, jsonwebtoken::errors::Error> {
        let encoded_secret = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), payload, &encoded_secret)
    }

    pub fn decode_payload<T: DeserializeOwned>(&self, token: &str) -> Result<T, jsonwebtoken::errors::Error> {
        let mut validations = Validation::new(Algorithm::HS256);
        validations.validate_exp = true;
        let decoded_token = decode::<T>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validations,
        )?;
        Ok(decoded_token.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "test-uuid".to_string(),
            username: "tester".to_string(),
            password_hash: String::new(),
            is_staff: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_sign_and_decode() {
        let jwt = JWT::init("secret", 1);
        let token = jwt.sign(&user()).unwrap();
        let claims = jwt.decode(&token).unwrap();
        assert_eq!(claims.uuid, "test-uuid");
        assert_eq!(claims.username, "tester");
        assert!(claims.is_staff);
    }

    #[test]
    fn test_rejects_other_secret() {
        let token = JWT::init("secret", 1).sign(&user()).unwrap();
        assert!(JWT::init("other", 1).decode(&token).is_err());
        assert!(JWT::init("secret", 1).decode("not-a-token").is_err());
    }

    #[test]
    fn test_rejects_expired_token() {
        let jwt = JWT::init("secret", -1);
        let token = jwt.sign(&user()).unwrap();
        assert!(jwt.decode(&token).is_err());
    }
}
