//! Subscriber passes: signed, expiring proof that an email already signed up.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::errors::AuthError;

const SUBSCRIBER_TOKEN_KIND: &str = "subscriber";
pub const DEFAULT_SUBSCRIBER_NAME: &str = "Subscriber";

#[derive(Debug, Serialize, Deserialize)]
struct PassClaims {
    sub: String,
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    iat: usize,
    exp: usize,
}

/// A minted pass as handed to the visitor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberPass {
    pub token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Who a verified pass speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub email: String,
    pub first_name: String,
}

#[derive(Clone)]
pub struct SubscriberPassIssuer {
    secret: String,
    ttl: Duration,
}

impl SubscriberPassIssuer {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self { secret: secret.into(), ttl }
    }

    /// Mint a pass for an email captured elsewhere (e.g. a newsletter redirect).
    pub fn issue_for_email(&self, email: &str) -> Result<SubscriberPass, AuthError> {
        self.issue(email, None)
    }

    pub fn issue(&self, email: &str, first_name: Option<&str>) -> Result<SubscriberPass, AuthError> {
        let email = email.trim();
        if !models::lead::is_valid_email(email) {
            return Err(AuthError::Validation("please enter a valid email address".into()));
        }
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = PassClaims {
            sub: email.to_string(),
            kind: SUBSCRIBER_TOKEN_KIND.into(),
            name: first_name.map(str::trim).filter(|n| !n.is_empty()).map(String::from),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };
        let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok(SubscriberPass { token, email: email.to_string(), expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<Subscriber, AuthError> {
        let data = decode::<PassClaims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &Validation::default())
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        if data.claims.kind != SUBSCRIBER_TOKEN_KIND {
            return Err(AuthError::Unauthorized);
        }
        Ok(Subscriber {
            email: data.claims.sub,
            first_name: data.claims.name.unwrap_or_else(|| DEFAULT_SUBSCRIBER_NAME.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> SubscriberPassIssuer {
        SubscriberPassIssuer::new("test-secret-0123456789", Duration::days(30))
    }

    #[test]
    fn pass_roundtrip() {
        let pass = issuer().issue("jo@example.com", Some("Jo")).unwrap();
        assert!(pass.expires_at > Utc::now() + Duration::days(29));
        let who = issuer().verify(&pass.token).unwrap();
        assert_eq!(who, Subscriber { email: "jo@example.com".into(), first_name: "Jo".into() });
    }

    #[test]
    fn email_only_pass_uses_default_name() {
        let pass = issuer().issue_for_email("jo@example.com").unwrap();
        assert_eq!(issuer().verify(&pass.token).unwrap().first_name, "Subscriber");
        assert!(matches!(issuer().issue_for_email("nope"), Err(AuthError::Validation(_))));
    }

    #[test]
    fn foreign_or_expired_tokens_fail() {
        let other = SubscriberPassIssuer::new("another-secret-0123456789", Duration::days(30));
        let pass = other.issue_for_email("jo@example.com").unwrap();
        assert!(issuer().verify(&pass.token).is_err());

        let expired = SubscriberPassIssuer::new("test-secret-0123456789", Duration::days(-2));
        let pass = expired.issue_for_email("jo@example.com").unwrap();
        assert!(issuer().verify(&pass.token).is_err());
    }
}
