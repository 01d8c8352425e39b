use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    config::Settings,
    error::GatewayError,
    models::{CurrentUser, Login},
};

use super::capabilities::CredentialVerifier;

const BAD_CREDENTIALS: &str = "incorrect login or password";
const EXPIRED: &str = "token is expired";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub login: Login,
    // issued-at / expiry (unix timestamp seconds)
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expire: DateTime<Utc>,
}

/// Issues and checks signed session tokens. Holds no per-session state.
#[derive(Clone)]
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    timeout: Duration,
    max_refresh: Duration,
}

impl SessionManager {
    pub fn new(secret: &[u8], timeout: Duration, max_refresh: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            timeout,
            max_refresh,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.jwt_secret.as_bytes(),
            Duration::seconds(settings.jwt_timeout),
            Duration::seconds(settings.jwt_max_refresh),
        )
    }

    pub async fn authenticate(
        &self,
        verifier: &dyn CredentialVerifier,
        login: Login,
        password: &str,
    ) -> Result<SessionToken, GatewayError> {
        self.authenticate_at(verifier, login, password, Utc::now()).await
    }

    /// Unknown login and wrong password produce the same error.
    pub async fn authenticate_at(
        &self,
        verifier: &dyn CredentialVerifier,
        login: Login,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, GatewayError> {
        let matched = verifier.check_password(login, password).await.map_err(|e| {
            tracing::warn!(login, error = %e, "credential check failed");
            GatewayError::from(e)
        })?;

        if !matched {
            tracing::debug!(login, "rejected credentials");
            return Err(GatewayError::Authentication(BAD_CREDENTIALS.to_string()));
        }

        self.issue_at(login, now)
    }

    pub fn issue_at(&self, login: Login, now: DateTime<Utc>) -> Result<SessionToken, GatewayError> {
        let expire = now + self.timeout;
        let claims = Claims {
            login,
            iat: now.timestamp(),
            exp: expire.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| GatewayError::Internal(format!("sign session token: {e}")))?;

        Ok(SessionToken { token, expire })
    }

    pub fn verify(&self, token: &str) -> Result<CurrentUser, GatewayError> {
        self.verify_at(token, Utc::now())
    }

    /// Valid only within `[iat, exp)`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<CurrentUser, GatewayError> {
        let claims = self.decode_signed(token)?;
        let ts = now.timestamp();

        if ts < claims.iat || ts >= claims.exp {
            return Err(GatewayError::Authentication(EXPIRED.to_string()));
        }

        Ok(CurrentUser { login: claims.login })
    }

    pub fn refresh(&self, token: &str) -> Result<SessionToken, GatewayError> {
        self.refresh_at(token, Utc::now())
    }

    /// An expired token may still be refreshed, but only strictly before
    /// `iat + max_refresh`.
    pub fn refresh_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionToken, GatewayError> {
        let claims = self.decode_signed(token)?;
        let ts = now.timestamp();

        if ts < claims.iat || ts >= claims.iat + self.max_refresh.num_seconds() {
            return Err(GatewayError::Authentication(EXPIRED.to_string()));
        }

        self.issue_at(claims.login, now)
    }

    // Signature and shape only; time windows are checked by the callers
    // against their own clock.
    fn decode_signed(&self, token: &str) -> Result<Claims, GatewayError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| GatewayError::Authentication(format!("invalid token: {e}")))
    }
}

pub fn auth_cookie(settings: &Settings, session: &SessionToken) -> Cookie<'static> {
    let mut cookie = Cookie::new(settings.jwt_cookie_name.clone(), session.token.clone());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if settings.cookie_secure {
        cookie.set_secure(true);
    }
    cookie
}
