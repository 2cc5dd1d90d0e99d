use serde::{Deserialize, Serialize};

pub const PLATFORM_NICKNAME: &str = "Platform";

pub const NICKNAME_MIN_CHARS: usize = 3;
pub const NICKNAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 4;
pub const PASSWORD_MAX_CHARS: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: usize,
    pub nickname: String,
    /// Unix seconds.
    pub created: i64,
}

/// Stored credential of a user, only ever read by the login path.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: usize,
    /// `None` for accounts without a password, which can never log in.
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupBody {
    pub nickname: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginBody {
    pub nickname: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeNicknameBody {
    pub nickname: String,
}

/// Public projection of a user, as found by profile search and on profile pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: usize,
    pub nickname: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id,
            nickname: user.nickname.clone(),
        }
    }
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            nickname: user.nickname,
        }
    }
}
