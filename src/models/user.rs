use serde::{Deserialize, Serialize};

/// Account login as known to the trading server.
pub type Login = i64;

/// Credentials posted to `/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    #[serde(default)]
    pub login: Option<Login>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Identity bound to an authenticated request (inserted into request extensions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub login: Login,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLoginResponse {
    pub code: u16,
    pub token: String,
    // RFC 3339
    pub expire: String,
}
