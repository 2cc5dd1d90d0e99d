pub mod auth;
pub mod session_token;
mod user_manager;
pub mod user_models;

pub use auth::PasswordHasherKind;
pub use session_token::{SessionTokenCodec, SessionTokenError};
pub use user_manager::{validate_nickname, validate_password, UserManager};
pub use user_models::{
    ChangeNicknameBody, LoginBody, SignupBody, User, UserCredentials, UserSummary,
    PLATFORM_NICKNAME,
};
