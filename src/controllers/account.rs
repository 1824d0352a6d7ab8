//! Вход, регистрация и профиль.

use tracing::{info, warn};
use validator::Validate;

use crate::{
    error::ClientResult,
    models::{Identity, Profile, ProfileUpdate, Registration},
    services::api::ApiClient,
    session::Session,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Registered {
    pub profile: Profile,
    /// `false`, если аккаунт создан, а автоматический вход не удался.
    pub signed_in: bool,
}

#[derive(Clone)]
pub struct Account {
    api: ApiClient,
}

impl Account {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn session(&self) -> &Session {
        self.api.session()
    }

    /// Меняет логин и пароль на токен, затем спрашивает у сервера, кто мы.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Identity> {
        let tokens = self.api.obtain_token(username, password).await?;
        let profile = self.api.profile_with_token(&tokens.access).await?;
        let identity = Identity::from(&profile);
        self.session().sign_in(tokens.access, identity.clone());
        Ok(identity)
    }

    pub async fn register(&self, registration: &Registration) -> ClientResult<Registered> {
        registration.validate()?;
        let profile = self.api.register(registration).await?;

        let signed_in = match self.login(&registration.username, &registration.password).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Account {} created but auto-login failed: {}", registration.username, e);
                false
            }
        };
        Ok(Registered { profile, signed_in })
    }

    pub async fn profile(&self) -> ClientResult<Profile> {
        self.api.profile().await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<Profile> {
        update.validate()?;
        let profile = self.api.update_profile(update).await?;
        info!("Profile of {} updated", profile.username);
        Ok(profile)
    }

    pub fn logout(&self) {
        self.session().logout();
    }
}
