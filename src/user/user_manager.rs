use super::auth::PasswordHasherKind;
use super::user_models::{
    User, NICKNAME_MAX_CHARS, NICKNAME_MIN_CHARS, PASSWORD_MAX_CHARS, PASSWORD_MIN_CHARS,
};
use crate::error::{CoreError, CoreResult};
use crate::store::UserStore;
use tracing::{info, warn};

pub fn validate_nickname(nickname: &str) -> CoreResult<()> {
    let chars = nickname.chars().count();
    if !(NICKNAME_MIN_CHARS..=NICKNAME_MAX_CHARS).contains(&chars) {
        return Err(CoreError::Validation(format!(
            "Nickname must be between {} and {} characters",
            NICKNAME_MIN_CHARS, NICKNAME_MAX_CHARS
        )));
    }
    if nickname
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(CoreError::Validation(
            "Nickname must not contain whitespace or control characters".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> CoreResult<()> {
    let chars = password.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&chars) {
        return Err(CoreError::Validation(format!(
            "Password must be between {} and {} characters",
            PASSWORD_MIN_CHARS, PASSWORD_MAX_CHARS
        )));
    }
    Ok(())
}

/// Account operations over one store session.
pub struct UserManager<'a> {
    store: &'a dyn UserStore,
    hasher: PasswordHasherKind,
}

impl<'a> UserManager<'a> {
    pub fn new(store: &'a dyn UserStore) -> Self {
        Self {
            store,
            hasher: PasswordHasherKind::default(),
        }
    }

    pub fn signup(&self, nickname: &str, password: &str) -> CoreResult<User> {
        validate_nickname(nickname)?;
        validate_password(password)?;

        let hash = self
            .hasher
            .hash(password)
            .map_err(|err| CoreError::Internal(format!("Password hashing failed: {}", err)))?;
        let user = self.store.create_user(nickname, Some(&hash))?;
        info!("Created user {} ({})", user.nickname, user.id);
        Ok(user)
    }

    /// Unknown nickname, wrong password and password-less accounts all fail
    /// with the same [`CoreError::InvalidCredentials`].
    pub fn login(&self, nickname: &str, password: &str) -> CoreResult<User> {
        let Some(credentials) = self.store.get_user_credentials(nickname)? else {
            return Err(CoreError::InvalidCredentials);
        };
        let Some(hash) = credentials.password_hash else {
            return Err(CoreError::InvalidCredentials);
        };

        match self.hasher.verify(password, &hash) {
            Ok(true) => {}
            Ok(false) => return Err(CoreError::InvalidCredentials),
            Err(err) => {
                warn!(
                    "Unreadable password hash for user {}: {}",
                    credentials.user_id, err
                );
                return Err(CoreError::InvalidCredentials);
            }
        }

        self.store
            .get_user(credentials.user_id)?
            .ok_or(CoreError::InvalidCredentials)
    }

    pub fn change_nickname(&self, user: &User, nickname: &str) -> CoreResult<User> {
        validate_nickname(nickname)?;
        if nickname == user.nickname {
            return Ok(user.clone());
        }

        self.store.rename_user(user.id, nickname)?;
        info!(
            "User {} renamed from {} to {}",
            user.id, user.nickname, nickname
        );
        self.store
            .get_user(user.id)?
            .ok_or_else(|| CoreError::not_found("User", user.id))
    }

    /// Resolves a decoded session to a live user.
    pub fn resolve(&self, user_id: usize) -> CoreResult<Option<User>> {
        self.store.get_user(user_id)
    }
}
