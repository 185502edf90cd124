use std::collections::HashMap;
use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{AdminIdentity, AdminSession, ChangePasswordInput, LoginInput};
use super::errors::AuthError;
use super::repository::CredentialRepository;

const ADMIN_TOKEN_KIND: &str = "admin";
pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub password_algorithm: String,
    pub session_ttl: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    sid: String,
    kind: String,
    iat: usize,
    exp: usize,
}

struct SessionEntry {
    username: String,
    expires_at: DateTime<Utc>,
}

/// Admin authentication independent of web framework.
///
/// Tokens are HS256 JWTs carrying a session id; the id must still be in the
/// live session table for the token to verify, which is what makes logout
/// and password rotation effective before `exp`.
pub struct AuthService {
    repo: Arc<dyn CredentialRepository>,
    cfg: AuthConfig,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn CredentialRepository>, cfg: AuthConfig) -> Self {
        Self { repo, cfg, sessions: RwLock::new(HashMap::new()) }
    }

    /// Seed the admin account if it does not exist yet. Returns whether it was created.
    #[instrument(skip(self, password))]
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::Validation("admin username required".into()));
        }
        if self.repo.get_credentials(username).await?.is_some() {
            debug!(%username, "admin already present");
            return Ok(false);
        }
        validate_new_password(password)?;
        let hash = hash_password(password)?;
        self.repo.upsert_password(username, hash, self.cfg.password_algorithm.clone()).await?;
        info!(%username, "admin_bootstrapped");
        Ok(true)
    }

    /// Authenticate and open a session.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, AuthConfig, domain::LoginInput, repository::JsonCredentialRepository};
    /// use std::sync::Arc;
    /// let dir = std::env::temp_dir().join(format!("auth_doc_{}", uuid::Uuid::new_v4()));
    /// let repo = Arc::new(tokio_test::block_on(JsonCredentialRepository::open(&dir)).unwrap());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: "0123456789abcdef0123".into(), password_algorithm: "argon2".into(), session_ttl: chrono::Duration::hours(1) });
    /// tokio_test::block_on(svc.bootstrap_admin("admin", "Passw0rd!")).unwrap();
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "admin".into(), password: "Passw0rd!".into() })).unwrap();
    /// assert_eq!(session.username, "admin");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AdminSession, AuthError> {
        let cred = self.repo
            .get_credentials(&input.username)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        verify_password(&input.password, &cred.password_hash)?;

        let now = Utc::now();
        let expires_at = now + self.cfg.session_ttl;
        let session_id = Uuid::new_v4().to_string();
        let claims = Claims {
            sub: cred.username.clone(),
            sid: session_id.clone(),
            kind: ADMIN_TOKEN_KIND.into(),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };
        let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))?;

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session_id.clone(), SessionEntry { username: cred.username.clone(), expires_at });
        info!(username = %cred.username, session_id = %session_id, "admin_logged_in");

        Ok(AdminSession { username: cred.username, token, expires_at })
    }

    /// Check signature, expiry and that the session is still open.
    pub async fn verify(&self, token: &str) -> Result<AdminIdentity, AuthError> {
        let claims = self.decode_claims(token, true)?;
        let sessions = self.sessions.read().await;
        match sessions.get(&claims.sid) {
            Some(s) if s.username == claims.sub && s.expires_at > Utc::now() => {
                Ok(AdminIdentity { username: claims.sub, session_id: claims.sid })
            }
            _ => Err(AuthError::SessionRevoked),
        }
    }

    /// Close the session behind `token`. Unknown or already closed sessions are fine.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.decode_claims(token, false)?;
        if self.sessions.write().await.remove(&claims.sid).is_some() {
            info!(username = %claims.sub, session_id = %claims.sid, "admin_logged_out");
        }
        Ok(())
    }

    /// Rotate the password after re-checking the current one.
    /// Every other session of the same admin is closed.
    #[instrument(skip(self, identity, input), fields(username = %identity.username))]
    pub async fn change_password(&self, identity: &AdminIdentity, input: ChangePasswordInput) -> Result<(), AuthError> {
        validate_new_password(&input.new_password)?;
        let cred = self.repo
            .get_credentials(&identity.username)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        verify_password(&input.current_password, &cred.password_hash)?;

        let hash = hash_password(&input.new_password)?;
        self.repo.upsert_password(&identity.username, hash, self.cfg.password_algorithm.clone()).await?;

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|sid, s| s.username != identity.username || *sid == identity.session_id);
        info!(revoked_sessions = before - sessions.len(), "admin_password_changed");
        Ok(())
    }

    fn decode_claims(&self, token: &str, check_exp: bool) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.validate_exp = check_exp;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()), &validation)
            .map_err(|e| {
                debug!(error = %e, "admin token rejected");
                AuthError::TokenError(e.to_string())
            })?;
        if data.claims.kind != ADMIN_TOKEN_KIND {
            warn!(kind = %data.claims.kind, "non-admin token presented to admin auth");
            return Err(AuthError::Unauthorized);
        }
        Ok(data.claims)
    }
}

fn validate_new_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::JsonCredentialRepository;
    use crate::test_support::temp_data_dir;

    async fn service() -> anyhow::Result<(AuthService, std::path::PathBuf)> {
        let dir = temp_data_dir();
        let repo = Arc::new(JsonCredentialRepository::open(&dir).await?);
        let svc = AuthService::new(
            repo,
            AuthConfig { jwt_secret: "test-secret-0123456789".into(), password_algorithm: "argon2".into(), session_ttl: Duration::hours(1) },
        );
        svc.bootstrap_admin("admin", "Passw0rd!").await?;
        Ok((svc, dir))
    }

    fn login(password: &str) -> LoginInput {
        LoginInput { username: "admin".into(), password: password.into() }
    }

    #[tokio::test]
    async fn login_verify_logout_roundtrip() -> anyhow::Result<()> {
        let (svc, dir) = service().await?;
        assert!(matches!(svc.login(login("wrong-password")).await, Err(AuthError::Unauthorized)));
        assert!(matches!(
            svc.login(LoginInput { username: "nobody".into(), password: "Passw0rd!".into() }).await,
            Err(AuthError::Unauthorized)
        ));

        let session = svc.login(login("Passw0rd!")).await?;
        let identity = svc.verify(&session.token).await?;
        assert_eq!(identity.username, "admin");

        svc.logout(&session.token).await?;
        assert!(matches!(svc.verify(&session.token).await, Err(AuthError::SessionRevoked)));
        // second logout is a no-op
        svc.logout(&session.token).await?;
        assert!(svc.verify("garbage").await.is_err());

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn bootstrap_is_idempotent() -> anyhow::Result<()> {
        let (svc, dir) = service().await?;
        assert!(!svc.bootstrap_admin("admin", "Different1!").await?);
        // original password still works
        svc.login(login("Passw0rd!")).await?;
        assert!(matches!(svc.bootstrap_admin("second", "short").await, Err(AuthError::Validation(_))));
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn change_password_requires_current_and_revokes_others() -> anyhow::Result<()> {
        let (svc, dir) = service().await?;
        let first = svc.login(login("Passw0rd!")).await?;
        let second = svc.login(login("Passw0rd!")).await?;
        let me = svc.verify(&first.token).await?;

        let bad = ChangePasswordInput { current_password: "nope-nope".into(), new_password: "NewPassw0rd".into() };
        assert!(matches!(svc.change_password(&me, bad).await, Err(AuthError::Unauthorized)));
        let short = ChangePasswordInput { current_password: "Passw0rd!".into(), new_password: "short".into() };
        assert!(matches!(svc.change_password(&me, short).await, Err(AuthError::Validation(_))));

        let ok = ChangePasswordInput { current_password: "Passw0rd!".into(), new_password: "NewPassw0rd".into() };
        svc.change_password(&me, ok).await?;

        assert!(svc.verify(&first.token).await.is_ok());
        assert!(matches!(svc.verify(&second.token).await, Err(AuthError::SessionRevoked)));
        assert!(svc.login(login("Passw0rd!")).await.is_err());
        svc.login(login("NewPassw0rd")).await?;

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
