use std::env;

use crate::models::{Login, Quote};

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub jwt_realm: String,
    pub jwt_secret: String,
    // seconds
    pub jwt_timeout: i64,
    pub jwt_max_refresh: i64,
    pub jwt_cookie_name: String,
    pub jwt_send_cookie: bool,
    pub cookie_secure: bool,

    pub paper_accounts: Vec<(Login, String)>,
    pub paper_quotes: Vec<Quote>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: "127.0.0.1".to_string(),
            port: 8080,
            jwt_realm: "mt trader api".to_string(),
            jwt_secret: "change-me-dev-secret".to_string(),
            jwt_timeout: 3600,
            jwt_max_refresh: 3600,
            jwt_cookie_name: "jwt".to_string(),
            jwt_send_cookie: false,
            cookie_secure: false,
            paper_accounts: Vec::new(),
            paper_quotes: vec![Quote {
                symbol: "EURUSD".to_string(),
                bid: 1.1000,
                ask: 1.1002,
            }],
        }
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_secs(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|s| *s > 0)
        .unwrap_or(default)
}

/// Parses `login:password,login:password`.
pub fn parse_accounts(raw: &str) -> Vec<(Login, String)> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let parsed = part
                .split_once(':')
                .and_then(|(login, pw)| Some((login.trim().parse::<Login>().ok()?, pw.to_string())));
            if parsed.is_none() {
                tracing::warn!(entry = part, "skipping malformed PAPER_ACCOUNTS entry");
            }
            parsed
        })
        .collect()
}

fn parse_quote(part: &str) -> Option<Quote> {
    let mut it = part.splitn(3, ':');
    let symbol = it.next()?.trim();
    let bid = it.next()?.trim().parse::<f64>().ok()?;
    let ask = it.next()?.trim().parse::<f64>().ok()?;
    if symbol.is_empty() || bid <= 0.0 || ask < bid {
        return None;
    }
    Some(Quote {
        symbol: symbol.to_uppercase(),
        bid,
        ask,
    })
}

/// Parses `SYMBOL:bid:ask,SYMBOL:bid:ask`.
pub fn parse_quotes(raw: &str) -> Vec<Quote> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let parsed = parse_quote(part);
            if parsed.is_none() {
                tracing::warn!(entry = part, "skipping malformed PAPER_QUOTES entry");
            }
            parsed
        })
        .collect()
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let defaults = Settings::default();

    let host = env::var("HOST").unwrap_or(defaults.host);

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(defaults.port);

    let jwt_realm = env::var("JWT_REALM").unwrap_or(defaults.jwt_realm);
    let jwt_secret = env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret);
    let jwt_timeout = env_secs("JWT_TIMEOUT_SECS", defaults.jwt_timeout);
    let jwt_max_refresh = env_secs("JWT_MAX_REFRESH_SECS", defaults.jwt_max_refresh);
    let jwt_cookie_name = env::var("JWT_COOKIE_NAME").unwrap_or(defaults.jwt_cookie_name);
    let jwt_send_cookie = env_flag("JWT_SEND_COOKIE", defaults.jwt_send_cookie);
    let cookie_secure = env_flag("COOKIE_SECURE", defaults.cookie_secure);

    let paper_accounts = env::var("PAPER_ACCOUNTS")
        .map(|raw| parse_accounts(&raw))
        .unwrap_or(defaults.paper_accounts);
    let paper_quotes = env::var("PAPER_QUOTES")
        .map(|raw| parse_quotes(&raw))
        .unwrap_or(defaults.paper_quotes);

    Settings {
        host,
        port,
        jwt_realm,
        jwt_secret,
        jwt_timeout,
        jwt_max_refresh,
        jwt_cookie_name,
        jwt_send_cookie,
        cookie_secure,
        paper_accounts,
        paper_quotes,
    }
}
