//! JWT-signed session cookie codec.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use lectern_core::domain::{Session, SessionUser};
use lectern_core::ports::{AuthError, SessionCodec};

const DEFAULT_SECRET: &str = "lectern-dev-session-secret";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub lifetime_hours: i64,
    pub issuer: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            lifetime_hours: 24,
            issuer: "lectern-web".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let secret = std::env::var("SESSION_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());

        if secret == DEFAULT_SECRET {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default session secret in production! Set SESSION_SECRET."
                );
            } else {
                tracing::warn!("Using default session secret. Set SESSION_SECRET for production use.");
            }
        }

        Self {
            secret,
            lifetime_hours: std::env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24),
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "lectern-web".to_string()),
        }
    }
}

/// Cookie payload. Field names are short to keep the cookie small.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // mb_id
    name: String,
    nick: String,
    lvl: u8,
    npu: bool, // needProfileUpdate
    tok: String, // backend bearer token
    exp: i64,
    iat: i64,
    iss: String,
}

pub struct JwtSessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: SessionConfig,
}

impl JwtSessionCodec {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            config,
        }
    }
}

impl SessionCodec for JwtSessionCodec {
    fn issue(&self, session: &Session) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::hours(self.config.lifetime_hours);
        let user = &session.user;

        let claims = Claims {
            sub: user.mb_id.clone(),
            name: user.mb_name.clone(),
            nick: user.mb_nick.clone(),
            lvl: user.mb_level,
            npu: user.need_profile_update,
            tok: session.access_token.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    fn verify(&self, value: &str) -> Result<Session, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let data = decode::<Claims>(value, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid(e.to_string()),
            }
        })?;
        let claims = data.claims;

        if claims.tok.is_empty() {
            return Err(AuthError::Invalid("missing access token".to_string()));
        }

        Ok(Session::new(
            SessionUser {
                mb_id: claims.sub,
                mb_name: claims.name,
                mb_nick: claims.nick,
                mb_level: claims.lvl,
                need_profile_update: claims.npu,
            },
            claims.tok,
        ))
    }

    fn lifetime_seconds(&self) -> i64 {
        self.config.lifetime_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SessionConfig {
        SessionConfig {
            secret: "test-secret-key".to_string(),
            lifetime_hours: 1,
            issuer: "test-issuer".to_string(),
        }
    }

    fn admin_session() -> Session {
        Session::new(
            SessionUser {
                mb_id: "admin".to_string(),
                mb_name: "관리자".to_string(),
                mb_nick: "운영자".to_string(),
                mb_level: 10,
                need_profile_update: false,
            },
            "backend-token",
        )
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = JwtSessionCodec::new(test_config());
        let session = admin_session();

        let value = codec.issue(&session).unwrap();
        assert_eq!(codec.verify(&value).unwrap(), session);
    }

    #[test]
    fn test_garbage_cookie_is_invalid() {
        let codec = JwtSessionCodec::new(test_config());
        assert!(matches!(
            codec.verify("{\"mb_level\":10}"),
            Err(AuthError::Invalid(_))
        ));
    }

    #[test]
    fn test_tampered_secret_is_rejected() {
        let issuer = JwtSessionCodec::new(test_config());
        let other = JwtSessionCodec::new(SessionConfig {
            secret: "another-secret".to_string(),
            ..test_config()
        });

        let value = issuer.issue(&admin_session()).unwrap();
        assert!(other.verify(&value).is_err());
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let issuer = JwtSessionCodec::new(test_config());
        let other = JwtSessionCodec::new(SessionConfig {
            issuer: "someone-else".to_string(),
            ..test_config()
        });

        let value = issuer.issue(&admin_session()).unwrap();
        assert!(other.verify(&value).is_err());
    }

    #[test]
    fn test_lifetime_seconds() {
        let codec = JwtSessionCodec::new(SessionConfig {
            lifetime_hours: 24,
            ..test_config()
        });
        assert_eq!(codec.lifetime_seconds(), 86400);
    }
}
