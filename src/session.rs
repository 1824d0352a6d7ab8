//! session.rs
//!
//! Учётные данные посетителя, общие для всех контроллеров.
//! Одна `Session` на посетителя, клоны делят одно состояние. Контроллеры
//! только читают её, входит и выходит лишь `Account`.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

use crate::models::Identity;

#[derive(Debug, Clone)]
struct Credentials {
    token: String,
    identity: Identity,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct AccessClaims {
    exp: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<Option<Credentials>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Сессия с уже известным токеном, например из прошлого запуска.
    pub fn with_token(token: impl Into<String>, identity: Identity) -> Self {
        let session = Self::new();
        session.sign_in(token, identity);
        session
    }

    pub fn sign_in(&self, token: impl Into<String>, identity: Identity) {
        let token = token.into();
        let expires_at = token_expiry(&token);
        info!("Signed in as {}", identity.username);
        *self.write() = Some(Credentials { token, identity, expires_at });
    }

    /// Забывает токен. Все владельцы клонов видят выход сразу.
    pub fn logout(&self) {
        if let Some(credentials) = self.write().take() {
            info!("Logged out {}", credentials.identity.username);
        }
    }

    /// Токен есть и его `exp` (если указан) ещё не наступил.
    pub fn is_authenticated(&self) -> bool {
        self.read()
            .as_ref()
            .map(|c| c.expires_at.map_or(true, |exp| exp > Utc::now()))
            .unwrap_or(false)
    }

    /// Bearer-токен, только пока сессия активна.
    pub fn token(&self) -> Option<String> {
        if !self.is_authenticated() {
            return None;
        }
        self.read().as_ref().map(|c| c.token.clone())
    }

    pub fn identity(&self) -> Option<Identity> {
        self.read().as_ref().map(|c| c.identity.clone())
    }

    pub fn is_privileged(&self) -> bool {
        self.is_authenticated() && self.identity().map_or(false, |i| i.privileged)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.read().as_ref().and_then(|c| c.expires_at)
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Credentials>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Credentials>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// Подпись проверяет сервер, здесь читаем только `exp`.
// Токен не в формате JWT считается бессрочным.
fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.exp)
        .and_then(|exp| DateTime::from_timestamp(exp, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims {
        exp: i64,
        user_id: i64,
    }

    fn jwt_expiring_in(seconds: i64) -> String {
        let claims = Claims { exp: Utc::now().timestamp() + seconds, user_id: 1 };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-secret")).unwrap()
    }

    fn visitor() -> Identity {
        Identity { username: "visitor".to_string(), privileged: false }
    }

    #[test]
    fn starts_signed_out() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(session.identity(), None);
    }

    #[test]
    fn clones_share_logout() {
        let session = Session::with_token("opaque-token", visitor());
        let view = session.clone();
        assert_eq!(view.token().as_deref(), Some("opaque-token"));
        session.logout();
        assert!(!view.is_authenticated());
    }

    #[test]
    fn expired_jwt_is_not_authenticated() {
        let session = Session::with_token(jwt_expiring_in(-60), visitor());
        assert!(session.expires_at().is_some());
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);

        let fresh = Session::with_token(jwt_expiring_in(3600), visitor());
        assert!(fresh.is_authenticated());
    }

    #[test]
    fn privilege_follows_identity() {
        let admin = Identity { username: "admin".to_string(), privileged: true };
        assert!(Session::with_token("t", admin).is_privileged());
        assert!(!Session::with_token("t", visitor()).is_privileged());
    }
}
