//! Administrator sign-in.
//!
//! There is a single administrative identity. Its password is checked against an
//! Argon2 PHC hash; each successful sign-in gets an opaque session token that lives
//! for [`SESSION_TTL`]. At most [`MAX_SESSIONS`] are live at once, the oldest is
//! evicted first. The `authenticated` gate stays open while at least one session is live.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::CinemaError;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@cinecornelio.com";
pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);
pub const MAX_SESSIONS: usize = 16;

#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub token: String,
    pub email: String,
}

/// Hash a plaintext password with Argon2id and a random salt (PHC string).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub struct AdminAuth {
    email: String,
    password_hash: String,
    /// Token to expiry.
    sessions: RwLock<HashMap<String, Instant>>,
    authenticated: watch::Sender<bool>,
}

impl AdminAuth {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let (authenticated, _) = watch::channel(false);
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            sessions: RwLock::new(HashMap::new()),
            authenticated,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub async fn sign_in(&self, credential: &Credential) -> Result<AdminSession, CinemaError> {
        if credential.password.trim().is_empty() {
            return Err(CinemaError::validation("password is required"));
        }

        let parsed_hash = PasswordHash::new(&self.password_hash).map_err(|err| {
            tracing::error!(error = %err, "Stored admin password hash is invalid");
            CinemaError::Auth
        })?;
        if Argon2::default()
            .verify_password(credential.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!(email = %self.email, "Rejected admin sign-in");
            return Err(CinemaError::Auth);
        }

        let token = Uuid::new_v4().to_string();
        {
            let now = Instant::now();
            let mut sessions = self.sessions.write().await;
            sessions.retain(|_, expires| *expires > now);
            if sessions.len() >= MAX_SESSIONS {
                let oldest = sessions
                    .iter()
                    .min_by_key(|(_, expires)| **expires)
                    .map(|(token, _)| token.clone());
                if let Some(oldest) = oldest {
                    sessions.remove(&oldest);
                    tracing::debug!("Evicted the oldest admin session");
                }
            }
            sessions.insert(token.clone(), now + SESSION_TTL);
        }
        self.set_gate(true);
        tracing::info!(email = %self.email, "Admin signed in");

        Ok(AdminSession {
            token,
            email: self.email.clone(),
        })
    }

    /// Forgets the session. Unknown tokens are ignored.
    pub async fn sign_out(&self, token: &str) {
        self.sessions.write().await.remove(token);
        self.expire().await;
        tracing::info!(email = %self.email, "Admin signed out");
    }

    /// `true` for a known, unexpired token.
    pub async fn verify(&self, token: &str) -> bool {
        let live = self
            .sessions
            .read()
            .await
            .get(token)
            .is_some_and(|expires| *expires > Instant::now());
        if !live {
            self.expire().await;
        }
        live
    }

    pub async fn is_authenticated(&self) -> bool {
        self.expire().await
    }

    /// Drops expired sessions and syncs the gate. Returns whether any session is live.
    async fn expire(&self) -> bool {
        let now = Instant::now();
        let any_live = {
            let mut sessions = self.sessions.write().await;
            sessions.retain(|_, expires| *expires > now);
            !sessions.is_empty()
        };
        self.set_gate(any_live);
        any_live
    }

    fn set_gate(&self, open: bool) {
        self.authenticated.send_if_modified(|current| {
            let changed = *current != open;
            *current = open;
            changed
        });
    }

    pub fn watch(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }
}
