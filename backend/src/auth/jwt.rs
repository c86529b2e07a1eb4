use super::{AuthError, Identity, IdentityVerifier};
use crate::config::ServiceConfig;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;

/// Claims read from an identity provider token.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    /// Custom claim; only a literal `true` grants admin access
    #[serde(default)]
    admin: Option<Value>,
}

/// Verifies JWT bearer tokens signed with a shared secret (HS256) or an RSA key
/// pair (RS256).
pub struct JwtIdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    pub fn hs256(secret: &[u8]) -> Self {
        Self::new(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    pub fn rs256_pem(pem: &[u8]) -> Result<Self, AuthError> {
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|e| AuthError::Misconfigured(format!("invalid RSA public key: {}", e)))?;
        Ok(Self::new(key, Algorithm::RS256))
    }

    fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // Audience is only checked once one is configured
        validation.validate_aud = false;
        Self { key, validation }
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }

    /// Builds the verifier from `CERTS_AUTH_*` settings. An RSA key wins over a
    /// shared secret when both are present.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, AuthError> {
        let verifier = match (&config.auth_rsa_public_key_pem, &config.auth_hs256_secret) {
            // Keys passed through a single-line env var carry escaped newlines
            (Some(pem), _) => Self::rs256_pem(pem.replace("\\n", "\n").as_bytes())?,
            (None, Some(secret)) => Self::hs256(secret.as_bytes()),
            (None, None) => {
                return Err(AuthError::Misconfigured(
                    "set CERTS_AUTH_RSA_PUBLIC_KEY_PEM or CERTS_AUTH_HS256_SECRET".to_string(),
                ))
            }
        };

        let verifier = match &config.auth_issuer {
            Some(issuer) => verifier.with_issuer(issuer),
            None => verifier,
        };
        Ok(match &config.auth_audience {
            Some(audience) => verifier.with_audience(audience),
            None => verifier,
        })
    }
}

impl IdentityVerifier for JwtIdentityVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<IdTokenClaims>(token, &self.key, &self.validation).map_err(|e| {
            AuthError::InvalidToken {
                reason: e.to_string(),
            }
        })?;

        Ok(Identity {
            is_admin: matches!(data.claims.admin, Some(Value::Bool(true))),
            subject: data.claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &[u8] = b"test-secret-key";

    fn token(claims: Value, secret: &[u8]) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn exp_in(seconds: i64) -> i64 {
        chrono::Utc::now().timestamp() + seconds
    }

    #[test]
    fn admin_claim_is_read() {
        let verifier = JwtIdentityVerifier::hs256(SECRET);
        let token = token(json!({"sub": "uid-1", "admin": true, "exp": exp_in(3600)}), SECRET);

        let identity = verifier.verify(&token).unwrap();
        assert_eq!(identity.subject, "uid-1");
        assert!(identity.is_admin);
    }

    #[test]
    fn missing_or_non_boolean_admin_claim_is_not_admin() {
        let verifier = JwtIdentityVerifier::hs256(SECRET);
        for claims in [
            json!({"sub": "uid-2", "exp": exp_in(3600)}),
            json!({"sub": "uid-2", "admin": "true", "exp": exp_in(3600)}),
            json!({"sub": "uid-2", "admin": false, "exp": exp_in(3600)}),
        ] {
            let identity = verifier.verify(&token(claims, SECRET)).unwrap();
            assert!(!identity.is_admin);
        }
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let verifier = JwtIdentityVerifier::hs256(SECRET);
        let token = token(json!({"sub": "uid-1", "admin": true, "exp": exp_in(3600)}), b"other");
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = JwtIdentityVerifier::hs256(SECRET);
        let token = token(json!({"sub": "uid-1", "admin": true, "exp": exp_in(-3600)}), SECRET);
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn issuer_and_audience_are_enforced_when_configured() {
        let verifier = JwtIdentityVerifier::hs256(SECRET)
            .with_issuer("https://issuer.example")
            .with_audience("certs");

        let good = token(
            json!({"sub": "uid-1", "admin": true, "exp": exp_in(3600),
                   "iss": "https://issuer.example", "aud": "certs"}),
            SECRET,
        );
        assert!(verifier.verify(&good).is_ok());

        let wrong_audience = token(
            json!({"sub": "uid-1", "admin": true, "exp": exp_in(3600),
                   "iss": "https://issuer.example", "aud": "other"}),
            SECRET,
        );
        assert!(verifier.verify(&wrong_audience).is_err());
    }

    #[test]
    fn from_config_requires_a_key() {
        let config = ServiceConfig::default();
        assert!(matches!(
            JwtIdentityVerifier::from_config(&config),
            Err(AuthError::Misconfigured(_))
        ));

        let config = ServiceConfig {
            auth_hs256_secret: Some("test-secret-key".to_string()),
            ..ServiceConfig::default()
        };
        assert!(JwtIdentityVerifier::from_config(&config).is_ok());
    }

    #[test]
    fn garbage_rsa_key_is_a_configuration_error() {
        assert!(matches!(
            JwtIdentityVerifier::rs256_pem(b"not a pem"),
            Err(AuthError::Misconfigured(_))
        ));
    }
}
